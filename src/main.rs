use clap::{Arg, ArgGroup, Command};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let matches = Command::new("medscript")
        .about("Evaluates MedScript clinical decision rules")
        .arg(
            Arg::new("file")
                .help("The rule file to evaluate")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("eval")
                .short('e')
                .long("eval")
                .help("Evaluate rule source given on the command line")
                .value_name("SOURCE"),
        )
        .arg(
            Arg::new("example")
                .long("example")
                .help("Evaluate the bundled hypertension example")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Only check syntax, do not evaluate")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log parsing and evaluation steps to stderr")
                .action(clap::ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("input")
                .args(["file", "eval", "example"])
                .required(true),
        )
        .get_matches();

    init_tracing(matches.get_flag("verbose"));

    let (source, filename) = if let Some(file_path) = matches.get_one::<String>("file") {
        match read_file(file_path) {
            Some(source) => (source, Some(file_path.as_str())),
            None => return ExitCode::FAILURE,
        }
    } else if let Some(source) = matches.get_one::<String>("eval") {
        (source.clone(), None)
    } else {
        (medscript::EXAMPLE_PROGRAM.to_string(), Some("<example>"))
    };

    let succeeded = if matches.get_flag("check") {
        medscript::check(&source, filename)
    } else {
        medscript::run(&source, filename)
    };

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// `RUST_LOG` wins when set; otherwise warnings only, or debug with `-v`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "medscript=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_file(path: &str) -> Option<String> {
    let path = Path::new(path);

    if !path.exists() {
        eprintln!("Error: File '{}' not found", path.display());
        return None;
    }

    match fs::read_to_string(path) {
        Ok(source) => Some(source),
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            None
        }
    }
}

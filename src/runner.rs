use crate::error::MedScriptError;
use crate::evaluator::Evaluator;
use crate::parser;

/// Outcome of one run: every line emitted before evaluation stopped, plus
/// the error that stopped it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub outputs: Vec<String>,
    pub error: Option<MedScriptError>,
}

impl Evaluation {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Vec<String>, MedScriptError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.outputs),
        }
    }
}

/// Parse and execute `source` with a fresh environment.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn evaluate(source: &str) -> Evaluation {
    let program = match parser::parse(source) {
        Ok(program) => program,
        Err(error) => {
            tracing::debug!(%error, "syntax failure");
            return Evaluation {
                outputs: Vec::new(),
                error: Some(error),
            };
        }
    };

    let mut evaluator = Evaluator::new();
    let result = evaluator.evaluate_program(&program);
    if let Err(ref error) = result {
        tracing::debug!(%error, "evaluation halted");
    }

    Evaluation {
        outputs: evaluator.into_outputs(),
        error: result.err(),
    }
}

/// Evaluate, print emitted lines to stdout and render any error to stderr.
/// Returns whether the run succeeded.
pub fn run(source: &str, filename: Option<&str>) -> bool {
    let evaluation = evaluate(source);

    for line in &evaluation.outputs {
        println!("{}", line);
    }

    match evaluation.error {
        Some(error) => {
            error.report(source, filename);
            false
        }
        None => true,
    }
}

/// Parse without evaluating.
pub fn check(source: &str, filename: Option<&str>) -> bool {
    match parser::parse(source) {
        Ok(program) => {
            tracing::info!(statements = program.statements.len(), "syntax ok");
            true
        }
        Err(error) => {
            error.report(source, filename);
            false
        }
    }
}

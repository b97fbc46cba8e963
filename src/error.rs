use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;
use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Semantic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    TypeMismatch,
    UnknownVariable,
    InvalidProperty,
    DivisionByZero,
    MalformedLiteral,
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::Syntax => ErrorCategory::Syntax,
            _ => ErrorCategory::Semantic,
        }
    }

    fn color(&self) -> Color {
        match self.category() {
            ErrorCategory::Syntax => Color::Yellow,
            ErrorCategory::Semantic => Color::Magenta,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "Syntax Error",
            ErrorKind::TypeMismatch => "Type Mismatch",
            ErrorKind::UnknownVariable => "Unknown Variable",
            ErrorKind::InvalidProperty => "Invalid Property",
            ErrorKind::DivisionByZero => "Division By Zero",
            ErrorKind::MalformedLiteral => "Malformed Literal",
        };
        write!(f, "{}", name)
    }
}

/// A terminal failure of one evaluation run.
///
/// Syntax errors carry the offending lexeme; semantic errors carry the span
/// of the construct that failed to evaluate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct MedScriptError {
    pub kind: ErrorKind,
    pub span: Span,
    pub message: String,
    pub lexeme: Option<String>,
    pub help: Option<String>,
}

impl MedScriptError {
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self {
            kind,
            span,
            message,
            lexeme: None,
            help: None,
        }
    }

    pub fn syntax_error(span: Span, lexeme: &str, message: String) -> Self {
        Self {
            lexeme: Some(lexeme.to_string()),
            ..Self::new(ErrorKind::Syntax, span, message)
        }
    }

    pub fn syntax_error_with_help(span: Span, lexeme: &str, message: String, help: String) -> Self {
        Self::syntax_error(span, lexeme, message).with_help(help)
    }

    pub fn type_mismatch(span: Span, message: String) -> Self {
        Self::new(ErrorKind::TypeMismatch, span, message)
    }

    pub fn unknown_variable(span: Span, name: &str) -> Self {
        Self::new(
            ErrorKind::UnknownVariable,
            span,
            format!("Undefined variable '{}'", name),
        )
        .with_help("Variables must be declared with 'let name: Type = value' before use.".to_string())
    }

    pub fn invalid_property(span: Span, message: String) -> Self {
        Self::new(ErrorKind::InvalidProperty, span, message)
    }

    pub fn division_by_zero(span: Span) -> Self {
        Self::new(ErrorKind::DivisionByZero, span, "Division by zero".to_string())
    }

    pub fn malformed_literal(span: Span, literal: &str) -> Self {
        Self::new(
            ErrorKind::MalformedLiteral,
            span,
            format!("Numeric literal '{}' is not a finite number", literal),
        )
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn is_syntax(&self) -> bool {
        self.category() == ErrorCategory::Syntax
    }

    /// 1-based line and column of the start of the error span.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let mut line = 1;
        let mut column = 1;
        for c in source.chars().take(self.span.start) {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        (line, column)
    }

    pub fn write_report<W: Write>(&self, source: &str, filename: Option<&str>, out: W) -> io::Result<()> {
        let filename = filename.unwrap_or("<inline>");
        let color = self.kind.color();

        let mut report_builder = Report::build(ReportKind::Error, filename, self.span.start)
            .with_message(format!("{}: {}", self.kind.fg(color), self.message))
            .with_label(
                Label::new((filename, self.span.start..self.span.end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder = report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        report_builder
            .finish()
            .write((filename, Source::from(source)), out)
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        if let Err(error) = self.write_report(source, filename, io::stderr()) {
            tracing::warn!(%error, "failed to render diagnostic");
            eprintln!("{}", self);
        }
    }
}

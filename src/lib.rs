// MedScript Rule Language Library
//
// A small rule language for clinical decision logic: typed declarations
// (plain numbers, blood pressure pairs, glucose readings) and conditional
// blocks that emit alerts and recommendations.

// Public modules
pub mod ast;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod runner;
pub mod value;
pub mod vocabulary;

// Re-export commonly used items
pub use ast::{Expr, Program, Stmt};
pub use error::{ErrorCategory, ErrorKind, MedScriptError, Span};
pub use evaluator::{Environment, Evaluator};
pub use lexer::{Lexer, Token, TokenType};
pub use parser::{parse, Parser};
pub use value::Value;
pub use vocabulary::{DeclaredType, Property};

// Re-export main functions
pub use runner::{check, evaluate, run, Evaluation};

/// The hypertension screening rule, bundled for `--example`.
pub const EXAMPLE_PROGRAM: &str = r#"let patient_age: Years = 65
let blood_pressure: mmHg = 160/100

if blood_pressure.systolic > 140 and patient_age > 60 {
    alert "Stage 2 Hypertension"
    recommend "Start antihypertensive therapy"
}
"#;

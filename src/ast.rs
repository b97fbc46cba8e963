use crate::error::Span;
use crate::vocabulary::{DeclaredType, Property};

#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Let {
        name: String,
        declared_type: &'static DeclaredType,
        initializer: Expr,
        span: Span,
    },
    If {
        condition: Condition,
        body: Vec<Stmt>,
        span: Span,
    },
    Alert {
        message: String,
        span: Span,
    },
    Recommend {
        message: String,
        span: Span,
    },
}

/// One or more comparisons joined by `and`.
#[derive(Debug, Clone)]
pub struct Condition {
    pub comparisons: Vec<Comparison>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub left: Expr,
    pub operator: ComparisonOp,
    pub right: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Expr {
    /// Numeric literal kept as written; converted when evaluated.
    Number {
        literal: String,
        span: Span,
    },
    Text {
        value: String,
        span: Span,
    },
    Variable {
        name: String,
        span: Span,
    },
    PropertyAccess {
        object: String,
        property: Property,
        span: Span,
    },
    BloodPressure {
        systolic: String,
        diastolic: String,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        operator: ArithmeticOp,
        right: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Number { span, .. } => span,
            Expr::Text { span, .. } => span,
            Expr::Variable { span, .. } => span,
            Expr::PropertyAccess { span, .. } => span,
            Expr::BloodPressure { span, .. } => span,
            Expr::Binary { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl ComparisonOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Equal => "==",
            ComparisonOp::NotEqual => "!=",
            ComparisonOp::Less => "<",
            ComparisonOp::LessEqual => "<=",
            ComparisonOp::Greater => ">",
            ComparisonOp::GreaterEqual => ">=",
        }
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, ComparisonOp::Equal | ComparisonOp::NotEqual)
    }
}

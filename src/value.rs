use crate::ast::{ArithmeticOp, ComparisonOp};
use crate::vocabulary::Property;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    BloodPressure { systolic: f64, diastolic: f64 },
    Glucose { value: f64 },
    /// Result of a condition. Never bound to a variable.
    Boolean(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Text,
    BloodPressure,
    Glucose,
    Boolean,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::BloodPressure => "blood pressure",
            ValueKind::Glucose => "glucose",
            ValueKind::Boolean => "boolean",
        }
    }
}

/// Why an operation on values was rejected. The evaluator attaches spans.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueError {
    TypeMismatch(String),
    DivisionByZero,
}

type CompareFn = fn(&Value, &Value) -> Option<Ordering>;

struct ComparisonRule {
    left: ValueKind,
    right: ValueKind,
    ordered: bool,
    compare: CompareFn,
}

/// Every operand pairing a comparison accepts. Pairs missing here are
/// type mismatches, including anything involving a whole blood pressure.
const COMPARISON_RULES: &[ComparisonRule] = &[
    ComparisonRule {
        left: ValueKind::Number,
        right: ValueKind::Number,
        ordered: true,
        compare: compare_scalars,
    },
    ComparisonRule {
        left: ValueKind::Glucose,
        right: ValueKind::Number,
        ordered: true,
        compare: compare_scalars,
    },
    ComparisonRule {
        left: ValueKind::Number,
        right: ValueKind::Glucose,
        ordered: true,
        compare: compare_scalars,
    },
    ComparisonRule {
        left: ValueKind::Glucose,
        right: ValueKind::Glucose,
        ordered: true,
        compare: compare_scalars,
    },
    ComparisonRule {
        left: ValueKind::Text,
        right: ValueKind::Text,
        ordered: false,
        compare: compare_texts,
    },
];

fn compare_scalars(left: &Value, right: &Value) -> Option<Ordering> {
    left.scalar()?.partial_cmp(&right.scalar()?)
}

fn compare_texts(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Text(l), Value::Text(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

impl ComparisonOp {
    /// Whether the operator holds for an ordering. An unordered pair (NaN)
    /// only satisfies `!=`.
    pub fn holds(&self, ordering: Option<Ordering>) -> bool {
        match self {
            ComparisonOp::Equal => ordering == Some(Ordering::Equal),
            ComparisonOp::NotEqual => ordering != Some(Ordering::Equal),
            ComparisonOp::Less => ordering == Some(Ordering::Less),
            ComparisonOp::LessEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            ComparisonOp::Greater => ordering == Some(Ordering::Greater),
            ComparisonOp::GreaterEqual => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Text(_) => ValueKind::Text,
            Value::BloodPressure { .. } => ValueKind::BloodPressure,
            Value::Glucose { .. } => ValueKind::Glucose,
            Value::Boolean(_) => ValueKind::Boolean,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// The plain number behind a numeric value, if it has exactly one.
    pub fn scalar(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Glucose { value } => Some(*value),
            _ => None,
        }
    }

    pub fn property(&self, property: Property) -> Option<f64> {
        match (self, property) {
            (Value::BloodPressure { systolic, .. }, Property::Systolic) => Some(*systolic),
            (Value::BloodPressure { diastolic, .. }, Property::Diastolic) => Some(*diastolic),
            _ => None,
        }
    }

    pub fn compare(&self, operator: ComparisonOp, other: &Value) -> Result<Value, ValueError> {
        let rule = COMPARISON_RULES
            .iter()
            .find(|rule| rule.left == self.kind() && rule.right == other.kind())
            .filter(|rule| rule.ordered || operator.is_equality())
            .ok_or_else(|| {
                ValueError::TypeMismatch(format!(
                    "Cannot compare {} {} {}",
                    self.type_name(),
                    operator.symbol(),
                    other.type_name()
                ))
            })?;

        Ok(Value::Boolean(operator.holds((rule.compare)(self, other))))
    }

    pub fn arithmetic(&self, operator: ArithmeticOp, other: &Value) -> Result<Value, ValueError> {
        let (l, r) = match (self.scalar(), other.scalar()) {
            (Some(l), Some(r)) => (l, r),
            _ => {
                return Err(ValueError::TypeMismatch(format!(
                    "Cannot apply '{}' to {} and {}",
                    operator.symbol(),
                    self.type_name(),
                    other.type_name()
                )))
            }
        };

        let result = match operator {
            ArithmeticOp::Add => l + r,
            ArithmeticOp::Subtract => l - r,
            ArithmeticOp::Multiply => l * r,
            ArithmeticOp::Divide => {
                if r == 0.0 {
                    return Err(ValueError::DivisionByZero);
                }
                l / r
            }
        };
        Ok(Value::Number(result))
    }
}

fn write_number(f: &mut fmt::Formatter, n: f64) -> fmt::Result {
    if n.fract() == 0.0 {
        write!(f, "{:.1}", n)
    } else {
        write!(f, "{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => write_number(f, *n),
            Value::Text(s) => write!(f, "{}", s),
            Value::BloodPressure { systolic, diastolic } => {
                write_number(f, *systolic)?;
                write!(f, "/")?;
                write_number(f, *diastolic)?;
                write!(f, " mmHg")
            }
            Value::Glucose { value } => {
                write_number(f, *value)?;
                write!(f, " mg/dL")
            }
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

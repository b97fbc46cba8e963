use crate::ast::{Comparison, Condition, Expr, Program, Stmt};
use crate::error::{MedScriptError, Span};
use crate::value::{Value, ValueError};
use crate::vocabulary::{Coercion, DeclaredType};
use std::collections::HashMap;

/// Variable bindings for a single run. Declarations overwrite silently and
/// there is no nested scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    values: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

pub struct Evaluator {
    environment: Environment,
    outputs: Vec<String>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            environment: Environment::new(),
            outputs: Vec::new(),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Lines emitted so far, in execution order.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn into_outputs(self) -> Vec<String> {
        self.outputs
    }

    /// Execute statements top to bottom. Stops at the first failure; lines
    /// emitted before it stay in `outputs`.
    pub fn evaluate_program(&mut self, program: &Program) -> Result<(), MedScriptError> {
        self.execute_statements(&program.statements)
    }

    fn execute_statements(&mut self, statements: &[Stmt]) -> Result<(), MedScriptError> {
        for statement in statements {
            self.execute_statement(statement)?;
        }
        Ok(())
    }

    fn execute_statement(&mut self, stmt: &Stmt) -> Result<(), MedScriptError> {
        match stmt {
            Stmt::Let {
                name,
                declared_type,
                initializer,
                ..
            } => {
                let value = self.evaluate_expression(initializer)?;
                let value = coerce(declared_type, value, initializer.span())?;
                tracing::trace!(%name, %value, "bind");
                self.environment.define(name, value);
                Ok(())
            }
            Stmt::If { condition, body, .. } => {
                if self.evaluate_condition(condition)? {
                    self.execute_statements(body)
                } else {
                    Ok(())
                }
            }
            Stmt::Alert { message, .. } => {
                self.emit(format!("ALERT: {}", message));
                Ok(())
            }
            Stmt::Recommend { message, .. } => {
                self.emit(format!("RECOMMENDATION: {}", message));
                Ok(())
            }
        }
    }

    fn emit(&mut self, line: String) {
        tracing::debug!(%line, "output");
        self.outputs.push(line);
    }

    /// Every comparison is resolved before the results are combined, so a
    /// failing operand aborts the condition even after a false comparison.
    pub fn evaluate_condition(&mut self, condition: &Condition) -> Result<bool, MedScriptError> {
        let mut results = Vec::with_capacity(condition.comparisons.len());
        for comparison in &condition.comparisons {
            results.push(self.evaluate_comparison(comparison)?);
        }
        Ok(results.into_iter().all(|result| result))
    }

    fn evaluate_comparison(&mut self, comparison: &Comparison) -> Result<bool, MedScriptError> {
        let left = self.evaluate_expression(&comparison.left)?;
        let right = self.evaluate_expression(&comparison.right)?;

        match left.compare(comparison.operator, &right) {
            Ok(Value::Boolean(result)) => Ok(result),
            Ok(other) => Err(MedScriptError::type_mismatch(
                comparison.span.clone(),
                format!("Comparison produced {} instead of a boolean", other.type_name()),
            )),
            Err(error) => Err(value_error(error, &comparison.span)),
        }
    }

    pub fn evaluate_expression(&mut self, expr: &Expr) -> Result<Value, MedScriptError> {
        match expr {
            Expr::Number { literal, span } => Ok(Value::Number(number(literal, span)?)),
            Expr::Text { value, .. } => Ok(Value::Text(value.clone())),
            Expr::Variable { name, span } => self
                .environment
                .get(name)
                .cloned()
                .ok_or_else(|| MedScriptError::unknown_variable(span.clone(), name)),
            Expr::PropertyAccess {
                object,
                property,
                span,
            } => {
                let value = self
                    .environment
                    .get(object)
                    .ok_or_else(|| MedScriptError::unknown_variable(span.clone(), object))?;

                value.property(*property).map(Value::Number).ok_or_else(|| {
                    MedScriptError::invalid_property(
                        span.clone(),
                        format!(
                            "'{}' is {}, which has no property '{}'",
                            object,
                            value.type_name(),
                            property
                        ),
                    )
                    .with_help("Only blood pressure values have 'systolic' and 'diastolic'.".to_string())
                })
            }
            Expr::BloodPressure {
                systolic,
                diastolic,
                span,
            } => Ok(Value::BloodPressure {
                systolic: number(systolic, span)?,
                diastolic: number(diastolic, span)?,
            }),
            Expr::Binary {
                left,
                operator,
                right,
                span,
            } => {
                let left_val = self.evaluate_expression(left)?;
                let right_val = self.evaluate_expression(right)?;
                left_val
                    .arithmetic(*operator, &right_val)
                    .map_err(|error| value_error(error, span))
            }
        }
    }
}

/// Apply the declared type's coercion to an initializer value.
fn coerce(declared_type: &DeclaredType, value: Value, span: &Span) -> Result<Value, MedScriptError> {
    match (declared_type.coercion, value) {
        (Coercion::BloodPressure, value @ Value::BloodPressure { .. }) => Ok(value),
        (Coercion::Glucose, Value::Number(value)) => Ok(Value::Glucose { value }),
        (Coercion::Glucose, value @ Value::Glucose { .. }) => Ok(value),
        (Coercion::Plain, value @ (Value::Number(_) | Value::Text(_))) => Ok(value),
        (_, value) => Err(MedScriptError::type_mismatch(
            span.clone(),
            format!("Cannot declare a {} value as {}", value.type_name(), declared_type),
        )),
    }
}

fn number(literal: &str, span: &Span) -> Result<f64, MedScriptError> {
    literal
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| MedScriptError::malformed_literal(span.clone(), literal))
}

fn value_error(error: ValueError, span: &Span) -> MedScriptError {
    match error {
        ValueError::TypeMismatch(message) => MedScriptError::type_mismatch(span.clone(), message),
        ValueError::DivisionByZero => MedScriptError::division_by_zero(span.clone()),
    }
}

use crate::ast::{ArithmeticOp, Comparison, ComparisonOp, Condition, Expr, Program, Stmt};
use crate::error::{MedScriptError, Span};
use crate::lexer::{Lexer, Token, TokenType};
use crate::vocabulary::{self, Coercion, Property};

/// Tokenize and parse a complete program.
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse(source: &str) -> Result<Program, MedScriptError> {
    let tokens = Lexer::new(source).scan_tokens()?;
    tracing::trace!(count = tokens.len(), "scanned tokens");
    Parser::new(tokens).parse()
}

/// Deepest chain of `if` blocks a program may contain.
pub const MAX_NESTING_DEPTH: usize = 100;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Program, MedScriptError> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.statement()?);
        }

        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Stmt, MedScriptError> {
        if self.match_types(&[TokenType::Let]) {
            self.variable_declaration()
        } else if self.match_types(&[TokenType::If]) {
            self.if_statement()
        } else if self.match_types(&[TokenType::Alert]) {
            let (message, span) = self.message("alert")?;
            Ok(Stmt::Alert { message, span })
        } else if self.match_types(&[TokenType::Recommend]) {
            let (message, span) = self.message("recommend")?;
            Ok(Stmt::Recommend { message, span })
        } else {
            let token = self.peek();
            let help = match token.token_type {
                TokenType::RightBrace => "Found '}' without matching '{'. Check for unbalanced braces.",
                _ => "Statements start with 'let', 'if', 'alert' or 'recommend'.",
            };
            Err(MedScriptError::syntax_error_with_help(
                token.span.clone(),
                &token.lexeme,
                format!("Expected statement, found '{}'", token.lexeme),
                help.to_string(),
            ))
        }
    }

    fn variable_declaration(&mut self) -> Result<Stmt, MedScriptError> {
        let start_span = self.previous().span.start;

        let name = self
            .consume_with_help(
                TokenType::Identifier,
                "Expected variable name after 'let'",
                "Declarations look like: let age: Years = 65".to_string(),
            )?
            .lexeme
            .clone();

        self.consume_with_help(
            TokenType::Colon,
            &format!("Expected ':' and a type after '{}'", name),
            format!("Every declaration names its type, e.g. 'let {}: Years = 65'.", name),
        )?;

        let type_token = self.peek().clone();
        let declared_type = match type_token.token_type {
            TokenType::TypeName(declared) => {
                self.advance();
                declared
            }
            _ => {
                return Err(MedScriptError::syntax_error_with_help(
                    type_token.span.clone(),
                    &type_token.lexeme,
                    format!("Unknown type '{}'", type_token.lexeme),
                    format!("Known types are: {}.", vocabulary::type_names()),
                ));
            }
        };

        self.consume_with_help(
            TokenType::Equal,
            &format!("Expected '=' after type '{}'", declared_type),
            format!("Declarations look like: let {}: {} = value", name, declared_type),
        )?;

        let initializer = match declared_type.coercion {
            Coercion::BloodPressure => self.blood_pressure_initializer()?,
            Coercion::Plain | Coercion::Glucose => self.expression()?,
        };

        let end_span = initializer.span().end;
        Ok(Stmt::Let {
            name,
            declared_type,
            initializer,
            span: Span::new(start_span, end_span),
        })
    }

    /// `mmHg` declarations take a `systolic/diastolic` literal or the name of
    /// another blood pressure variable, never an arbitrary expression.
    fn blood_pressure_initializer(&mut self) -> Result<Expr, MedScriptError> {
        let help = "Blood pressure values are written as systolic/diastolic, e.g. 120/80.";

        if self.check(&TokenType::Identifier) && !self.check_next(&TokenType::Dot) {
            let token = self.advance();
            return Ok(Expr::Variable {
                name: token.lexeme.clone(),
                span: token.span.clone(),
            });
        }

        let systolic = self
            .consume_with_help(
                TokenType::Number,
                "Expected blood pressure literal",
                help.to_string(),
            )?
            .clone();
        self.consume_with_help(
            TokenType::Slash,
            "Expected '/' in blood pressure literal",
            help.to_string(),
        )?;
        let diastolic = self
            .consume_with_help(
                TokenType::Number,
                "Expected diastolic value after '/'",
                help.to_string(),
            )?
            .clone();

        Ok(Expr::BloodPressure {
            systolic: systolic.lexeme,
            diastolic: diastolic.lexeme,
            span: systolic.span.to(&diastolic.span),
        })
    }

    fn if_statement(&mut self) -> Result<Stmt, MedScriptError> {
        let start_span = self.previous().span.start;

        let condition = self.condition()?;

        self.consume_with_help(
            TokenType::LeftBrace,
            "Expected '{' after if condition",
            "The body of an if statement must be enclosed in braces: if condition { ... }".to_string(),
        )?;

        if self.depth >= MAX_NESTING_DEPTH {
            let token = self.previous();
            return Err(MedScriptError::syntax_error_with_help(
                token.span.clone(),
                &token.lexeme,
                format!("If blocks nested too deeply (more than {} levels)", MAX_NESTING_DEPTH),
                "Combine conditions with 'and' instead of nesting another if.".to_string(),
            ));
        }

        self.depth += 1;
        let body = self.block_body();
        self.depth -= 1;
        let body = body?;

        let end_token = self.consume_with_help(
            TokenType::RightBrace,
            "Expected '}' after if body",
            "Blocks must be closed with '}' after the opening '{'.".to_string(),
        )?;

        Ok(Stmt::If {
            condition,
            body,
            span: Span::new(start_span, end_token.span.end),
        })
    }

    fn block_body(&mut self) -> Result<Vec<Stmt>, MedScriptError> {
        let mut body = Vec::new();
        while !self.check(&TokenType::RightBrace) && !self.is_at_end() {
            body.push(self.statement()?);
        }
        Ok(body)
    }

    fn condition(&mut self) -> Result<Condition, MedScriptError> {
        let mut comparisons = vec![self.comparison()?];

        while self.match_types(&[TokenType::And]) {
            comparisons.push(self.comparison()?);
        }

        let span = comparisons[0].span.to(&comparisons[comparisons.len() - 1].span);
        Ok(Condition { comparisons, span })
    }

    fn comparison(&mut self) -> Result<Comparison, MedScriptError> {
        let left = self.expression()?;

        let operator = match self.peek().token_type {
            TokenType::EqualEqual => ComparisonOp::Equal,
            TokenType::BangEqual => ComparisonOp::NotEqual,
            TokenType::Less => ComparisonOp::Less,
            TokenType::LessEqual => ComparisonOp::LessEqual,
            TokenType::Greater => ComparisonOp::Greater,
            TokenType::GreaterEqual => ComparisonOp::GreaterEqual,
            _ => {
                let token = self.peek();
                return Err(MedScriptError::syntax_error_with_help(
                    token.span.clone(),
                    &token.lexeme,
                    format!("Expected comparison operator, found '{}'", token.lexeme),
                    "Conditions compare two values with one of > < >= <= == !=.".to_string(),
                ));
            }
        };
        let operator_token = self.advance().clone();

        let right = self.right_operand(
            &operator_token,
            Self::expression,
            "Comparison operators require expressions on both sides.",
        )?;

        let span = left.span().to(right.span());
        Ok(Comparison {
            left,
            operator,
            right,
            span,
        })
    }

    fn expression(&mut self) -> Result<Expr, MedScriptError> {
        self.term()
    }

    fn term(&mut self) -> Result<Expr, MedScriptError> {
        let mut expr = self.factor()?;

        while self.match_types(&[TokenType::Minus, TokenType::Plus]) {
            let operator_token = self.previous().clone();
            let operator = match operator_token.token_type {
                TokenType::Minus => ArithmeticOp::Subtract,
                _ => ArithmeticOp::Add,
            };

            let right = self.right_operand(
                &operator_token,
                Self::factor,
                "Arithmetic operators like '+' and '-' require expressions on both sides.",
            )?;

            let span = expr.span().to(right.span());
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, MedScriptError> {
        let mut expr = self.primary()?;

        while self.match_types(&[TokenType::Slash, TokenType::Star]) {
            let operator_token = self.previous().clone();
            let operator = match operator_token.token_type {
                TokenType::Slash => ArithmeticOp::Divide,
                _ => ArithmeticOp::Multiply,
            };

            let right = self.right_operand(
                &operator_token,
                Self::primary,
                "Multiplication and division operators require expressions on both sides.",
            )?;

            let span = expr.span().to(right.span());
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    /// Parses what follows a binary operator. Only a token that cannot start
    /// an operand is blamed on the operator; deeper failures keep their own
    /// lexeme and span.
    fn right_operand(
        &mut self,
        operator_token: &Token,
        operand: fn(&mut Self) -> Result<Expr, MedScriptError>,
        help: &str,
    ) -> Result<Expr, MedScriptError> {
        let starts_operand = matches!(
            self.peek().token_type,
            TokenType::Number | TokenType::String | TokenType::Identifier
        );
        if starts_operand {
            return operand(self);
        }

        let token = self.peek();
        let (span, found) = if self.is_at_end() {
            (Span::single(operator_token.span.end), "end of input".to_string())
        } else {
            (token.span.clone(), format!("'{}'", token.lexeme))
        };
        Err(MedScriptError::syntax_error_with_help(
            span,
            &token.lexeme,
            format!("Expected expression after '{}', found {}", operator_token.lexeme, found),
            help.to_string(),
        ))
    }

    fn primary(&mut self) -> Result<Expr, MedScriptError> {
        if self.is_at_end() {
            let token = self.peek();
            return Err(MedScriptError::syntax_error_with_help(
                token.span.clone(),
                &token.lexeme,
                "Unexpected end of input".to_string(),
                "Expected a number, string or variable here.".to_string(),
            ));
        }

        let token = self.advance().clone();

        match token.token_type {
            TokenType::Number => Ok(Expr::Number {
                literal: token.lexeme,
                span: token.span,
            }),
            TokenType::String => Ok(Expr::Text {
                value: token.lexeme,
                span: token.span,
            }),
            TokenType::Identifier => {
                if self.match_types(&[TokenType::Dot]) {
                    self.property_access(token)
                } else {
                    Ok(Expr::Variable {
                        name: token.lexeme,
                        span: token.span,
                    })
                }
            }
            _ => Err(MedScriptError::syntax_error_with_help(
                token.span.clone(),
                &token.lexeme,
                format!("Expected expression, found '{}'", token.lexeme),
                "Expected a number, string, variable or property access here.".to_string(),
            )),
        }
    }

    fn property_access(&mut self, object: Token) -> Result<Expr, MedScriptError> {
        let property_token = self.peek().clone();

        let property = match property_token.token_type {
            TokenType::PropertyName(property) => {
                self.advance();
                property
            }
            _ => {
                let known = Property::ALL.map(|property| property.name()).join(", ");
                let message = if self.is_at_end() {
                    "Expected property name after '.', found end of input".to_string()
                } else {
                    format!("Unknown property '{}'", property_token.lexeme)
                };
                return Err(MedScriptError::syntax_error_with_help(
                    property_token.span.clone(),
                    &property_token.lexeme,
                    message,
                    format!("Known properties are: {}.", known),
                ));
            }
        };

        Ok(Expr::PropertyAccess {
            object: object.lexeme,
            property,
            span: object.span.to(&property_token.span),
        })
    }

    /// The quoted text following `alert` or `recommend`.
    fn message(&mut self, keyword: &str) -> Result<(String, Span), MedScriptError> {
        let start_span = self.previous().span.start;
        let token = self.consume_with_help(
            TokenType::String,
            &format!("Expected quoted text after '{}'", keyword),
            format!("Write the message in double quotes: {} \"...\"", keyword),
        )?;
        Ok((token.lexeme.clone(), Span::new(start_span, token.span.end)))
    }

    fn match_types(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.check(token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, token_type: &TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            &self.peek().token_type == token_type
        }
    }

    fn check_next(&self, token_type: &TokenType) -> bool {
        self.tokens
            .get(self.current + 1)
            .is_some_and(|token| &token.token_type == token_type)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn consume_with_help(&mut self, token_type: TokenType, message: &str, help: String) -> Result<&Token, MedScriptError> {
        if self.check(&token_type) {
            Ok(self.advance())
        } else {
            let token = self.peek();
            let error_span = if self.is_at_end() && self.current > 0 {
                // Point just past the last real token
                Span::single(self.tokens[self.current - 1].span.end)
            } else {
                token.span.clone()
            };

            let found = if self.is_at_end() {
                "end of input".to_string()
            } else {
                format!("'{}'", token.lexeme)
            };

            Err(MedScriptError::syntax_error_with_help(
                error_span,
                &token.lexeme,
                format!("{}, found {}", message, found),
                help,
            ))
        }
    }
}

use crate::error::{MedScriptError, Span};
use crate::vocabulary::{self, DeclaredType, Property};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Single-character tokens
    LeftBrace,
    RightBrace,
    Colon,
    Dot,
    Minus,
    Plus,
    Slash,
    Star,
    Equal,

    // Comparison operators
    BangEqual,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String,
    Number,
    TypeName(&'static DeclaredType),
    PropertyName(Property),

    // Keywords
    Let,
    If,
    Alert,
    Recommend,
    And,

    // Special
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, span: Span) -> Self {
        Self {
            token_type,
            lexeme,
            span,
        }
    }
}

/// Spans are character offsets into the source.
pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    keywords: HashMap<&'static str, TokenType>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        let mut keywords = HashMap::new();
        keywords.insert("let", TokenType::Let);
        keywords.insert("if", TokenType::If);
        keywords.insert("alert", TokenType::Alert);
        keywords.insert("recommend", TokenType::Recommend);
        keywords.insert("and", TokenType::And);

        Self {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            keywords,
        }
    }

    pub fn scan_tokens(mut self) -> Result<Vec<Token>, MedScriptError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.tokens.push(Token::new(
            TokenType::Eof,
            String::new(),
            Span::single(self.current),
        ));

        Ok(self.tokens)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn scan_token(&mut self) -> Result<(), MedScriptError> {
        let c = self.advance();

        match c {
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            ':' => {
                self.add_token(TokenType::Colon);
                self.declared_type();
            }
            '.' => self.add_token(TokenType::Dot),
            '-' => self.add_token(TokenType::Minus),
            '+' => self.add_token(TokenType::Plus),
            '*' => self.add_token(TokenType::Star),
            '!' => {
                if self.match_char('=') {
                    self.add_token(TokenType::BangEqual);
                } else {
                    return Err(MedScriptError::syntax_error_with_help(
                        Span::new(self.start, self.current),
                        "!",
                        "Unexpected character: '!'".to_string(),
                        "Use '!=' to test for inequality.".to_string(),
                    ));
                }
            }
            '=' => {
                let token_type = if self.match_char('=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                };
                self.add_token(token_type);
            }
            '<' => {
                let token_type = if self.match_char('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.add_token(token_type);
            }
            '>' => {
                let token_type = if self.match_char('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(token_type);
            }
            '/' => {
                if self.match_char('/') {
                    // Comment goes until end of line
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenType::Slash);
                }
            }
            ' ' | '\r' | '\t' | '\n' => {}
            '"' => self.string()?,
            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),
            _ => {
                return Err(MedScriptError::syntax_error(
                    Span::single(self.current - 1),
                    &c.to_string(),
                    format!("Unexpected character: '{}'", c),
                ));
            }
        }

        Ok(())
    }

    /// Type names are only recognized right after the `:` of a declaration,
    /// which lets units such as `mg/dL` contain characters that are operators
    /// elsewhere. Anything else is left for the regular scanner.
    fn declared_type(&mut self) {
        loop {
            while self.peek().is_whitespace() {
                self.advance();
            }
            if self.peek() == '/' && self.peek_next() == '/' {
                while self.peek() != '\n' && !self.is_at_end() {
                    self.advance();
                }
            } else {
                break;
            }
        }

        if let Some(declared) = vocabulary::match_type_prefix(&self.source[self.current..]) {
            self.start = self.current;
            self.current += declared.name.chars().count();
            self.add_token(TokenType::TypeName(declared));
        }
    }

    fn previous_is(&self, token_type: &TokenType) -> bool {
        self.tokens
            .last()
            .is_some_and(|token| &token.token_type == token_type)
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        self.current += 1;
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.current += 1;
            true
        }
    }

    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.source[start..end].iter().collect()
    }

    fn string(&mut self) -> Result<(), MedScriptError> {
        while self.peek() != '"' && !self.is_at_end() {
            self.advance();
        }

        if self.is_at_end() {
            return Err(MedScriptError::syntax_error(
                Span::new(self.start, self.current),
                &self.text(self.start, self.current),
                "Unterminated string".to_string(),
            ));
        }

        // Consume the closing "
        self.advance();

        let content = self.text(self.start + 1, self.current - 1);
        self.add_token_with_content(TokenType::String, content);
        Ok(())
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            // Consume the "."
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        self.add_token(TokenType::Number);
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text = self.text(self.start, self.current);
        let token_type = if self.previous_is(&TokenType::Dot) {
            Property::from_name(&text)
                .map(TokenType::PropertyName)
                .unwrap_or(TokenType::Identifier)
        } else {
            self.keywords
                .get(text.as_str())
                .cloned()
                .unwrap_or(TokenType::Identifier)
        };

        self.add_token_with_content(token_type, text);
    }

    fn add_token(&mut self, token_type: TokenType) {
        let text = self.text(self.start, self.current);
        self.add_token_with_content(token_type, text);
    }

    fn add_token_with_content(&mut self, token_type: TokenType, lexeme: String) {
        self.tokens.push(Token::new(
            token_type,
            lexeme,
            Span::new(self.start, self.current),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Coercion;

    fn token_types(source: &str) -> Vec<TokenType> {
        Lexer::new(source)
            .scan_tokens()
            .unwrap()
            .into_iter()
            .map(|token| token.token_type)
            .collect()
    }

    #[test]
    fn glucose_unit_is_a_single_type_token() {
        let types = token_types("let g: mg/dL = 90");
        assert!(matches!(
            types[3],
            TokenType::TypeName(DeclaredType { coercion: Coercion::Glucose, .. })
        ));
        assert_eq!(types[4], TokenType::Equal);
    }

    #[test]
    fn type_found_after_spaces_and_comment_following_colon() {
        let spaced = token_types("let g :  mg/dL = 1");
        assert!(matches!(spaced[3], TokenType::TypeName(DeclaredType { name: "mg/dL", .. })));

        let commented = token_types("let g: // fasting\n mg/dL = 1");
        assert!(matches!(commented[3], TokenType::TypeName(DeclaredType { name: "mg/dL", .. })));
        assert_eq!(commented[4], TokenType::Equal);
    }

    #[test]
    fn unknown_type_after_colon_scans_as_identifier() {
        let tokens = Lexer::new("let a: Weeks = 1").scan_tokens().unwrap();
        assert_eq!(tokens[3].token_type, TokenType::Identifier);
        assert_eq!(tokens[3].span, Span::new(7, 12));
    }

    #[test]
    fn slash_outside_declaration_type_is_an_operator() {
        let types = token_types("mg/dL");
        assert_eq!(
            types,
            vec![TokenType::Identifier, TokenType::Slash, TokenType::Identifier, TokenType::Eof]
        );
    }

    #[test]
    fn property_names_only_after_dot() {
        let types = token_types("bp.systolic systolic bp.pulse");
        assert_eq!(types[2], TokenType::PropertyName(Property::Systolic));
        assert_eq!(types[3], TokenType::Identifier);
        assert_eq!(types[6], TokenType::Identifier);
    }

    #[test]
    fn decimal_numbers_and_comments() {
        let tokens = Lexer::new("37.5 // temperature\n120").scan_tokens().unwrap();
        assert_eq!(tokens[0].lexeme, "37.5");
        assert_eq!(tokens[1].lexeme, "120");
        assert_eq!(tokens[1].span, Span::new(20, 23));
    }

    #[test]
    fn unterminated_string_fails() {
        let error = Lexer::new("alert \"oops").scan_tokens().unwrap_err();
        assert!(error.is_syntax());
        assert_eq!(error.message, "Unterminated string");
    }
}

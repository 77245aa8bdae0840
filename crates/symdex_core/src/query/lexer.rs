//! Filter expression lexer.

use crate::error::{CoreError, CoreResult};

/// A lexical token of a filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Property name, function name or keyword (`eq`, `or`, ...).
    Ident(String),
    /// String literal including its quotes, or a bare number.
    Literal(String),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// End of input.
    Eof,
}

/// Splits a filter expression into tokens.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    /// Creates a lexer over `input`.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Reads all tokens; the last one is always [`Token::Eof`].
    pub fn tokenize(&mut self) -> CoreResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token == Token::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    /// Reads the next token.
    pub fn next_token(&mut self) -> CoreResult<Token> {
        self.skip_whitespace();

        let Some(ch) = self.current() else {
            return Ok(Token::Eof);
        };

        match ch {
            '(' => {
                self.advance();
                Ok(Token::LParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RParen)
            }
            ',' => {
                self.advance();
                Ok(Token::Comma)
            }
            '\'' => self.read_string(),
            '0'..='9' | '-' => Ok(self.read_number()),
            c if c.is_alphabetic() || c == '_' => Ok(self.read_identifier()),
            other => Err(CoreError::query(format!(
                "unexpected character {other:?} at {}",
                self.position
            ))),
        }
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.current().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Reads a single-quoted literal. A doubled quote (`''`) is an escaped
    /// quote and does not end the literal. The quotes are kept.
    fn read_string(&mut self) -> CoreResult<Token> {
        let start = self.position;
        self.advance();
        loop {
            match self.current() {
                None => {
                    return Err(CoreError::query(format!(
                        "unterminated string literal at {start}"
                    )))
                }
                Some('\'') if self.peek() == Some('\'') => {
                    self.advance();
                    self.advance();
                }
                Some('\'') => {
                    self.advance();
                    break;
                }
                Some(_) => self.advance(),
            }
        }
        Ok(Token::Literal(self.input[start..self.position].iter().collect()))
    }

    fn read_number(&mut self) -> Token {
        let start = self.position;
        self.advance();
        while self
            .current()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.advance();
        }
        Token::Literal(self.input[start..self.position].iter().collect())
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.position;
        while self
            .current()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == '/')
        {
            self.advance();
        }
        Token::Ident(self.input[start..self.position].iter().collect())
    }
}

/// Tokenizes `input`.
pub fn tokenize(input: &str) -> CoreResult<Vec<Token>> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> Token {
        Token::Ident(s.to_string())
    }

    fn literal(s: &str) -> Token {
        Token::Literal(s.to_string())
    }

    #[test]
    fn comparison() {
        assert_eq!(
            tokenize("Color eq 'Green'").unwrap(),
            vec![ident("Color"), ident("eq"), literal("'Green'"), Token::Eof]
        );
    }

    #[test]
    fn function_call() {
        assert_eq!(
            tokenize("startswith(Color,'Gr')").unwrap(),
            vec![
                ident("startswith"),
                Token::LParen,
                ident("Color"),
                Token::Comma,
                literal("'Gr'"),
                Token::RParen,
                Token::Eof
            ]
        );
    }

    #[test]
    fn escaped_quote_stays_in_literal() {
        assert_eq!(
            tokenize("Name eq 'O''Neil'").unwrap()[2],
            literal("'O''Neil'")
        );
    }

    #[test]
    fn numbers_and_paths() {
        assert_eq!(
            tokenize("Address/City eq 42").unwrap(),
            vec![ident("Address/City"), ident("eq"), literal("42"), Token::Eof]
        );
    }

    #[test]
    fn unterminated_string() {
        assert!(matches!(
            tokenize("Color eq 'Gre"),
            Err(CoreError::Query { .. })
        ));
    }

    #[test]
    fn unexpected_character() {
        assert!(matches!(tokenize("Color == 'x'"), Err(CoreError::Query { .. })));
    }

    #[test]
    fn empty_input() {
        assert_eq!(tokenize("   ").unwrap(), vec![Token::Eof]);
    }
}

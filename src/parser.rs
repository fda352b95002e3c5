// src/parser.rs
use serde_json::Value;
use crate::errors::GroupError;

#[derive(Debug, PartialEq)]
pub enum ParseError {
    InvalidSyntax(String),
}

impl From<ParseError> for GroupError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::InvalidSyntax(msg) => GroupError::Config(msg),
        }
    }
}

/// Parse `name=<value>`.
///
/// The value is read as JSON; a single-quoted literal is a string with the
/// usual escapes, and anything else that is not valid JSON is kept as a
/// plain string.
pub fn parse_assignment(input: &str) -> Result<(String, Value), ParseError> {
    let mut p = Parser::new(input);
    p.skip_ws();
    let name = p.parse_identifier()?;
    p.skip_ws();
    p.expect('=')?;
    p.skip_ws();
    let value = p.parse_value()?;
    Ok((name, value))
}

/// Parse a bare value with the same rules as the right-hand side of
/// [`parse_assignment`].
pub fn parse_literal(input: &str) -> Result<Value, ParseError> {
    let mut p = Parser::new(input);
    p.skip_ws();
    p.parse_value()
}

pub struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn parse_identifier(&mut self) -> Result<String, ParseError> {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_ascii_alphanumeric() {
                self.i += 1;
            } else {
                break;
            }
        }
        if self.i == start {
            return Err(ParseError::InvalidSyntax("identifier expected".into()));
        }
        Ok(self.s[start..self.i].to_string())
    }

    /// Consume the rest of the input as a value.
    pub fn parse_value(&mut self) -> Result<Value, ParseError> {
        if self.peek_char() == Some('\'') {
            let s = self.parse_quoted_string()?;
            self.skip_ws();
            if !self.eof() {
                return Err(ParseError::InvalidSyntax("trailing input".into()));
            }
            return Ok(Value::String(s));
        }
        let rest = self.s[self.i..].trim_end();
        self.i = self.s.len();
        if rest.is_empty() {
            return Err(ParseError::InvalidSyntax("value expected".into()));
        }
        Ok(serde_json::from_str(rest).unwrap_or_else(|_| Value::String(rest.to_string())))
    }

    /// Single-quoted string with backslash escapes.
    pub fn parse_quoted_string(&mut self) -> Result<String, ParseError> {
        self.expect('\'')?;
        let mut out = String::new();
        while let Some(c) = self.peek_char() {
            self.i += c.len_utf8();
            if c == '\'' {
                return Ok(out);
            }
            if c == '\\' {
                if let Some(nc) = self.peek_char() {
                    self.i += nc.len_utf8();
                    match nc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '\\' => out.push('\\'),
                        '\'' => out.push('\''),
                        _ => {
                            out.push('\\');
                            out.push(nc);
                        }
                    }
                } else {
                    break;
                }
            } else {
                out.push(c);
            }
        }
        Err(ParseError::InvalidSyntax("unterminated string".into()))
    }

    pub fn expect(&mut self, c: char) -> Result<(), ParseError> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(ParseError::InvalidSyntax(format!("expected '{}'", c)))
        }
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn skip_ws(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}

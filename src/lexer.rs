use crate::error::FormulaError;
use std::fmt;

/// Numeric literal value. Integers stay integers so the host can keep exact
/// arithmetic; a literal containing a `.` is a float.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            // Debug keeps the trailing ".0" on whole floats
            Number::Float(v) => write!(f, "{v:?}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Token {
    Case,
    When,
    Then,
    Else,
    Ident(String),
    Field(String),
    Number(Number),
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
    Plus,
    Minus,
    Mul,
    Div,
    LParen,
    RParen,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Case => f.write_str("CASE"),
            Token::When => f.write_str("WHEN"),
            Token::Then => f.write_str("THEN"),
            Token::Else => f.write_str("ELSE"),
            Token::Ident(s) => write!(f, "identifier '{s}'"),
            Token::Field(s) => write!(f, "field [{s}]"),
            Token::Number(n) => write!(f, "number {n}"),
            Token::Gt => f.write_str("'>'"),
            Token::Lt => f.write_str("'<'"),
            Token::Ge => f.write_str("'>='"),
            Token::Le => f.write_str("'<='"),
            Token::Eq => f.write_str("'=='"),
            Token::Ne => f.write_str("'!='"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Mul => f.write_str("'*'"),
            Token::Div => f.write_str("'/'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

/// Cursor-based scanner over formula text.
///
/// Once the input is exhausted every further call to [`Lexer::next_token`]
/// returns [`Token::Eof`].
pub struct Lexer<'a> {
    src: &'a str,
    i: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { src: s, i: 0 }
    }

    /// Byte offset of the cursor.
    pub fn position(&self) -> usize {
        self.i
    }

    fn peek(&self) -> Option<char> {
        self.src[self.i..].chars().next()
    }
    fn bump(&mut self) -> Option<char> {
        let ch = self.peek();
        if let Some(c) = ch {
            self.i += c.len_utf8();
        }
        ch
    }
    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, FormulaError> {
        self.skip_ws();
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };
        match c {
            c if c.is_ascii_digit() => self.lex_number(),
            '+' => {
                self.bump();
                Ok(Token::Plus)
            }
            '-' => {
                self.bump();
                Ok(Token::Minus)
            }
            '*' => {
                self.bump();
                Ok(Token::Mul)
            }
            '/' => {
                self.bump();
                Ok(Token::Div)
            }
            '(' => {
                self.bump();
                Ok(Token::LParen)
            }
            ')' => {
                self.bump();
                Ok(Token::RParen)
            }
            '[' => self.lex_field(),
            '>' | '<' | '=' | '!' => self.lex_comparison(),
            c if c.is_alphabetic() => Ok(self.lex_word()),
            c => Err(FormulaError::UnexpectedChar { ch: c, pos: self.i }),
        }
    }

    fn lex_number(&mut self) -> Result<Token, FormulaError> {
        let start = self.i;
        let mut dots = 0usize;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else if c == '.' {
                dots += 1;
                self.i += 1;
            } else {
                break;
            }
        }
        let text = &self.src[start..self.i];
        let invalid = || FormulaError::InvalidNumber {
            text: text.to_string(),
            pos: start,
        };
        let number = match dots {
            0 => Number::Int(text.parse().map_err(|_| invalid())?),
            1 => match text.parse::<f64>() {
                Ok(v) if v.is_finite() => Number::Float(v),
                _ => return Err(invalid()),
            },
            _ => return Err(invalid()),
        };
        Ok(Token::Number(number))
    }

    fn lex_field(&mut self) -> Result<Token, FormulaError> {
        let start = self.i;
        self.bump(); // '['
        let body = self.i;
        match self.src[body..].find(']') {
            Some(len) => {
                let name = self.src[body..body + len].to_string();
                self.i = body + len + 1;
                Ok(Token::Field(name))
            }
            None => Err(FormulaError::UnterminatedField { pos: start }),
        }
    }

    // The second character joins the operator whenever it is present and not
    // whitespace, so "< =" is two tokens and "[x]>1" is the bad operator ">1".
    fn lex_comparison(&mut self) -> Result<Token, FormulaError> {
        let start = self.i;
        let mut op = String::with_capacity(2);
        if let Some(c) = self.bump() {
            op.push(c);
        }
        if let Some(next) = self.peek()
            && !next.is_whitespace()
        {
            self.bump();
            op.push(next);
        }
        match op.as_str() {
            ">" => Ok(Token::Gt),
            "<" => Ok(Token::Lt),
            ">=" => Ok(Token::Ge),
            "<=" => Ok(Token::Le),
            "==" => Ok(Token::Eq),
            "!=" => Ok(Token::Ne),
            _ => Err(FormulaError::UnknownOperator { op, pos: start }),
        }
    }

    fn lex_word(&mut self) -> Token {
        let start = self.i;
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                break;
            }
            self.i += c.len_utf8();
        }
        match &self.src[start..self.i] {
            "CASE" => Token::Case,
            "WHEN" => Token::When,
            "THEN" => Token::Then,
            "ELSE" => Token::Else,
            other => Token::Ident(other.to_string()),
        }
    }
}

/// Scans the whole formula. The returned stream always ends with
/// [`Token::Eof`]; the first lex error aborts the scan.
pub fn tokenize(formula: &str) -> Result<Vec<Token>, FormulaError> {
    let mut lex = Lexer::new(formula);
    let mut out = Vec::new();
    loop {
        let tok = lex.next_token()?;
        let done = tok == Token::Eof;
        out.push(tok);
        if done {
            return Ok(out);
        }
    }
}

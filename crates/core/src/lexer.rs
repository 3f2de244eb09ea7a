use std::fmt;

use crate::ast::Span;
use crate::error::LexError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare identifier; `let` and `in` are told apart by the parser
    Ident(String),
    /// `$name`, name stored without the sigil
    Var(String),
    /// Quoted string literal, content verbatim
    Str(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Eq,
    Comma,
    Dot,
    /// `..`
    Spread,
    // End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(w) => write!(f, "identifier '{}'", w),
            Token::Var(name) => write!(f, "variable '${}'", name),
            Token::Str(_) => f.write_str("string literal"),
            Token::Integer(n) => write!(f, "number {}", n),
            Token::Float(x) => write!(f, "number {:?}", x),
            Token::Bool(b) => write!(f, "'{}'", b),
            Token::Null => f.write_str("'null'"),
            Token::LBrace => f.write_str("'{'"),
            Token::RBrace => f.write_str("'}'"),
            Token::LBracket => f.write_str("'['"),
            Token::RBracket => f.write_str("']'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Eq => f.write_str("'='"),
            Token::Comma => f.write_str("','"),
            Token::Dot => f.write_str("'.'"),
            Token::Spread => f.write_str("'..'"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    col: u32,
}

impl Lexer {
    fn new(src: &str) -> Self {
        Lexer {
            chars: src.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.at(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn span(&self) -> Span {
        Span::new(self.line, self.col)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut s = String::new();
        while let Some(c) = self.at(0) {
            if !pred(c) {
                break;
            }
            s.push(c);
            self.bump();
        }
        s
    }

    fn run(mut self) -> Result<Vec<Spanned>, LexError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.at(0) {
            // Line comment
            if c == '/' && self.at(1) == Some('/') {
                while self.at(0).is_some_and(|c| c != '\n') {
                    self.bump();
                }
                continue;
            }

            if c.is_whitespace() {
                self.bump();
                continue;
            }

            let start = self.span();
            let token = match c {
                '"' => self.string(start)?,
                '$' => self.variable(start)?,
                '-' if self.at(1).is_some_and(|d| d.is_ascii_digit()) => self.number(start)?,
                c if c.is_ascii_digit() => self.number(start)?,
                c if is_ident_start(c) => {
                    let word = self.eat_while(is_ident_continue);
                    match word.as_str() {
                        "true" => Token::Bool(true),
                        "false" => Token::Bool(false),
                        "null" => Token::Null,
                        _ => Token::Ident(word),
                    }
                }
                '.' if self.at(1) == Some('.') => {
                    self.bump();
                    self.bump();
                    Token::Spread
                }
                _ => {
                    let punct = match c {
                        '{' => Token::LBrace,
                        '}' => Token::RBrace,
                        '[' => Token::LBracket,
                        ']' => Token::RBracket,
                        '(' => Token::LParen,
                        ')' => Token::RParen,
                        '=' => Token::Eq,
                        ',' => Token::Comma,
                        '.' => Token::Dot,
                        other => {
                            return Err(LexError::new(
                                start,
                                format!("unexpected character '{}'", other),
                            ))
                        }
                    };
                    self.bump();
                    punct
                }
            };
            tokens.push(Spanned { token, span: start });
        }

        tokens.push(Spanned {
            token: Token::Eof,
            span: self.span(),
        });
        Ok(tokens)
    }

    /// Everything up to the closing quote is kept as written, newlines
    /// and backslashes included.
    fn string(&mut self, start: Span) -> Result<Token, LexError> {
        self.bump();
        let content = self.eat_while(|c| c != '"');
        if self.bump().is_none() {
            return Err(LexError::new(start, "unterminated string literal"));
        }
        Ok(Token::Str(content))
    }

    fn variable(&mut self, start: Span) -> Result<Token, LexError> {
        self.bump();
        if !self.at(0).is_some_and(is_ident_start) {
            return Err(LexError::new(
                start,
                "expected a variable name after '$'",
            ));
        }
        Ok(Token::Var(self.eat_while(is_ident_continue)))
    }

    fn number(&mut self, start: Span) -> Result<Token, LexError> {
        let mut text = String::new();
        if self.at(0) == Some('-') {
            text.push('-');
            self.bump();
        }
        text.push_str(&self.eat_while(|c| c.is_ascii_digit()));

        let mut fractional = false;
        if self.at(0) == Some('.') && self.at(1).is_some_and(|c| c.is_ascii_digit()) {
            fractional = true;
            text.push('.');
            self.bump();
            text.push_str(&self.eat_while(|c| c.is_ascii_digit()));
        }

        if matches!(self.at(0), Some('e' | 'E')) {
            let signed = matches!(self.at(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                fractional = true;
                for _ in 0..digit_at {
                    if let Some(c) = self.bump() {
                        text.push(c);
                    }
                }
                text.push_str(&self.eat_while(|c| c.is_ascii_digit()));
            }
        }

        // `1.2.3`, `12abc`, `1.` and friends
        let trailing = self.at(0);
        if trailing.is_some_and(is_ident_continue)
            || (trailing == Some('.') && self.at(1) != Some('.'))
        {
            let rest = self.eat_while(|c| is_ident_continue(c) || c == '.');
            return Err(LexError::new(
                start,
                format!("invalid number '{}{}'", text, rest),
            ));
        }

        if fractional {
            match text.parse::<f64>() {
                Ok(x) if x.is_finite() => Ok(Token::Float(x)),
                Ok(_) => Err(LexError::new(
                    start,
                    format!("number '{}' is out of range", text),
                )),
                Err(_) => Err(LexError::new(start, format!("invalid number '{}'", text))),
            }
        } else {
            text.parse::<i64>().map(Token::Integer).map_err(|_| {
                LexError::new(start, format!("integer '{}' is out of range", text))
            })
        }
    }
}

/// Turn source text into tokens, ending with [`Token::Eof`].
/// Comments and whitespace are dropped.
pub fn tokenize(src: &str) -> Result<Vec<Spanned>, LexError> {
    let tokens = Lexer::new(src).run()?;
    tracing::debug!(count = tokens.len(), "lexed source");
    Ok(tokens)
}

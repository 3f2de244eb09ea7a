use super::Parser;
use crate::ast::{KeyPath, ListItem, MapItem, Node, NodeKind};
use crate::error::ParseError;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    // -- Values --------------------------------------------------

    pub(super) fn parse_value(&mut self) -> Result<Node, ParseError> {
        let span = self.cur_span();
        let kind = match self.peek() {
            Token::Str(s) => NodeKind::Str(s.clone()),
            Token::Integer(n) => NodeKind::Integer(*n),
            Token::Float(x) => NodeKind::Float(*x),
            Token::Bool(b) => NodeKind::Bool(*b),
            Token::Null => NodeKind::Null,
            Token::Var(name) => NodeKind::VarRef(name.clone()),
            Token::LBracket => return self.parse_list(),
            Token::LBrace => return self.parse_map(),
            _ => return Err(self.err("a value")),
        };
        self.advance();
        Ok(Node::new(kind, span))
    }

    fn starts_value(&self) -> bool {
        matches!(
            self.peek(),
            Token::Str(_)
                | Token::Integer(_)
                | Token::Float(_)
                | Token::Bool(_)
                | Token::Null
                | Token::Var(_)
                | Token::LBracket
                | Token::LBrace
        )
    }

    // -- Lists ---------------------------------------------------

    fn parse_list(&mut self) -> Result<Node, ParseError> {
        let span = self.expect(Token::LBracket, "'['")?;
        self.enter()?;

        let mut items = Vec::new();
        loop {
            match self.peek() {
                Token::RBracket => break,
                Token::Spread => {
                    let (name, span) = self.parse_spread()?;
                    items.push(ListItem::Spread { name, span });
                }
                _ if self.starts_value() => items.push(ListItem::Value(self.parse_value()?)),
                _ => return Err(self.err("a value or ']'")),
            }
            self.skip_separator();
        }
        self.advance();

        self.leave();
        Ok(Node::new(NodeKind::List(items), span))
    }

    // -- Maps ----------------------------------------------------

    fn parse_map(&mut self) -> Result<Node, ParseError> {
        let span = self.expect(Token::LBrace, "'{'")?;
        self.enter()?;

        let mut items = Vec::new();
        loop {
            match self.peek() {
                Token::RBrace => break,
                Token::Spread => {
                    let (name, span) = self.parse_spread()?;
                    items.push(MapItem::Spread { name, span });
                }
                Token::Ident(_) => {
                    let path = self.parse_key_path()?;
                    self.expect(Token::Eq, &format!("'=' after key '{}'", path))?;
                    let value = self.parse_value()?;
                    items.push(MapItem::Entry { path, value });
                }
                _ => return Err(self.err("a key or '}'")),
            }
            self.skip_separator();
        }
        self.advance();

        self.leave();
        Ok(Node::new(NodeKind::Map(items), span))
    }

    fn parse_key_path(&mut self) -> Result<KeyPath, ParseError> {
        let (first, span) = self.take_ident("a key")?;
        let mut segments = vec![first];
        while self.peek() == &Token::Dot {
            self.advance();
            let (segment, _) = self.take_ident("a key segment after '.'")?;
            segments.push(segment);
        }
        Ok(KeyPath { segments, span })
    }

    fn parse_spread(&mut self) -> Result<(String, crate::ast::Span), ParseError> {
        self.expect(Token::Spread, "'..'")?;
        self.take_var("a variable after '..'")
    }
}

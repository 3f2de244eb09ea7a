//! Recursive-descent parser from tokens to a [`Document`].
//!
//! ```text
//! document := ("let" "{" binding* "}" "in")? value EOF
//! binding  := VAR "=" value
//! value    := STRING | INTEGER | FLOAT | BOOL | NULL | VAR | list | map
//! list     := "[" ((value | ".." VAR) ","?)* "]"
//! map      := "{" ((key_path "=" value | ".." VAR) ","?)* "}"
//! key_path := IDENT ("." IDENT)*
//! ```
//!
//! Entries need no separators: a map entry starts at an identifier and a
//! list item at any value token. One trailing `,` per item is tolerated;
//! anything else after a complete item is an error.
use crate::ast::{Document, Node, NodeKind, Span};
use crate::error::ParseError;
use crate::lexer::{Spanned, Token};
use crate::scope::Bindings;

mod bindings;
mod values;

static EOF: Token = Token::Eof;

/// Default for [`ParseOptions::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest allowed nesting of lists and maps.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
    options: ParseOptions,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned], options: ParseOptions) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
            options,
        }
    }

    fn cur(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.pos).or_else(|| self.tokens.last())
    }

    fn peek(&self) -> &'a Token {
        self.cur().map_or(&EOF, |s| &s.token)
    }

    fn peek_at(&self, offset: usize) -> &'a Token {
        self.tokens
            .get(self.pos + offset)
            .map_or(&EOF, |s| &s.token)
    }

    fn cur_span(&self) -> Span {
        self.cur().map_or(Span::new(1, 1), |s| s.span)
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn err(&self, expected: impl Into<String>) -> ParseError {
        ParseError::new(self.cur_span(), expected, self.peek().to_string())
    }

    fn is_word(&self, w: &str) -> bool {
        matches!(self.peek(), Token::Ident(x) if x == w)
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<Span, ParseError> {
        if self.peek() == &token {
            let span = self.cur_span();
            self.advance();
            Ok(span)
        } else {
            Err(self.err(expected))
        }
    }

    fn expect_word(&mut self, word: &str, expected: &str) -> Result<Span, ParseError> {
        if self.is_word(word) {
            let span = self.cur_span();
            self.advance();
            Ok(span)
        } else {
            Err(self.err(expected))
        }
    }

    fn take_ident(&mut self, expected: &str) -> Result<(String, Span), ParseError> {
        if let Token::Ident(w) = self.peek() {
            let span = self.cur_span();
            self.advance();
            Ok((w.clone(), span))
        } else {
            Err(self.err(expected))
        }
    }

    fn take_var(&mut self, expected: &str) -> Result<(String, Span), ParseError> {
        if let Token::Var(name) = self.peek() {
            let span = self.cur_span();
            self.advance();
            Ok((name.clone(), span))
        } else {
            Err(self.err(expected))
        }
    }

    /// Skip one optional `,` between items.
    fn skip_separator(&mut self) {
        if self.peek() == &Token::Comma {
            self.advance();
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.options.max_depth {
            return Err(ParseError::new(
                self.cur_span(),
                format!("nesting depth of at most {}", self.options.max_depth),
                "a deeper list or map",
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // -- Top level ----------------------------------------------

    fn parse_document(&mut self) -> Result<Document, ParseError> {
        let bindings = if self.is_word("let") && self.peek_at(1) == &Token::LBrace {
            self.parse_let_block()?
        } else {
            Bindings::new()
        };

        let body = self.parse_value()?;
        if self.peek() != &Token::Eof {
            return Err(self.err("end of input"));
        }
        Ok(Document { bindings, body })
    }
}

/// Parse a token stream (as produced by [`crate::lexer::tokenize`]) with
/// default options.
pub fn parse(tokens: &[Spanned]) -> Result<Document, ParseError> {
    parse_with(tokens, ParseOptions::default())
}

pub fn parse_with(tokens: &[Spanned], options: ParseOptions) -> Result<Document, ParseError> {
    let doc = Parser::new(tokens, options).parse_document()?;
    tracing::debug!(
        bindings = doc.bindings.len(),
        body = body_kind(&doc.body),
        "parsed document"
    );
    Ok(doc)
}

fn body_kind(node: &Node) -> &'static str {
    match node.kind {
        NodeKind::Map(_) => "map",
        NodeKind::List(_) => "list",
        NodeKind::VarRef(_) => "variable",
        _ => "scalar",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{KeyPath, ListItem, MapItem};
    use crate::lexer::tokenize;

    fn parse_src(src: &str) -> Result<Document, ParseError> {
        let tokens = tokenize(src).expect("lex should succeed");
        parse(&tokens)
    }

    fn entries(node: &Node) -> &[MapItem] {
        match &node.kind {
            NodeKind::Map(items) => items,
            other => panic!("expected map, got {:?}", other),
        }
    }

    fn path(item: &MapItem) -> &KeyPath {
        match item {
            MapItem::Entry { path, .. } => path,
            other => panic!("expected entry, got {:?}", other),
        }
    }

    #[test]
    fn document_without_let_is_just_the_body() {
        let doc = parse_src("{ position = \"top\" height = 32 }").unwrap();
        assert!(doc.bindings.is_empty());
        let items = entries(&doc.body);
        assert_eq!(items.len(), 2);
        assert_eq!(path(&items[0]).segments, ["position"]);
        assert_eq!(path(&items[1]).segments, ["height"]);
    }

    #[test]
    fn let_block_records_bindings_in_order() {
        let doc = parse_src(
            r#"
let {
    $clock = { type = "clock" }
    $end = [ $clock ]
} in {
    end = $end
}
"#,
        )
        .unwrap();
        let names: Vec<_> = doc.bindings.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["clock", "end"]);
        assert_eq!(doc.bindings.get("clock").unwrap().span, Span::new(3, 5));
        match &doc.bindings.lookup("end").unwrap().kind {
            NodeKind::List(items) => {
                assert!(matches!(&items[0], ListItem::Value(Node { kind: NodeKind::VarRef(n), .. }) if n == "clock"));
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn dotted_and_literal_keys_are_kept_unmerged() {
        let doc = parse_src(r#"{ icons.a = "A" icons = { b = "B" } icons.c.d = 1 }"#).unwrap();
        let items = entries(&doc.body);
        assert_eq!(items.len(), 3);
        assert_eq!(path(&items[0]).segments, ["icons", "a"]);
        assert_eq!(path(&items[1]).segments, ["icons"]);
        assert_eq!(path(&items[2]).segments, ["icons", "c", "d"]);
    }

    #[test]
    fn optional_commas_are_accepted() {
        let doc = parse_src("{ a = [1, 2, 3,], b = 2, }").unwrap();
        assert_eq!(entries(&doc.body).len(), 2);
    }

    #[test]
    fn spreads_parse_in_lists_and_maps() {
        let doc = parse_src("let { $a = { x = 1 } $l = [] } in { ..$a y = [ ..$l 2 ] }").unwrap();
        let items = entries(&doc.body);
        assert!(matches!(&items[0], MapItem::Spread { name, .. } if name == "a"));
    }

    #[test]
    fn duplicate_binding_is_an_error() {
        let err = parse_src("let { $x = 1 $x = 2 } in { v = $x }").unwrap_err();
        assert_eq!(err.span, Span::new(1, 14));
        assert!(err.found.contains("duplicate binding '$x'"), "{}", err.found);
        assert!(err.found.contains("1:7"), "{}", err.found);
    }

    #[test]
    fn let_without_in_is_an_error() {
        let err = parse_src("let { $x = 1 } { v = $x }").unwrap_err();
        assert_eq!(err.expected, "'in' after the let block");
        assert_eq!(err.found, "'{'");
    }

    #[test]
    fn unbalanced_bracket_reports_end_of_input() {
        let err = parse_src("{ a = [ 1 2 }").unwrap_err();
        assert_eq!(err.found, "'}'");
        let err = parse_src("{ a = { b = 1 }").unwrap_err();
        assert_eq!(err.found, "end of input");
    }

    #[test]
    fn adjacent_values_in_a_map_are_rejected() {
        let err = parse_src("{ a = 1 2 }").unwrap_err();
        assert_eq!(err.span, Span::new(1, 9));
        assert_eq!(err.found, "number 2");
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = parse_src("{ } { }").unwrap_err();
        assert_eq!(err.expected, "end of input");
    }

    #[test]
    fn depth_limit() {
        let tokens = tokenize("[[[[1]]]]").unwrap();
        assert!(parse_with(&tokens, ParseOptions { max_depth: 4 }).is_ok());
        let err = parse_with(&tokens, ParseOptions { max_depth: 3 }).unwrap_err();
        assert!(err.expected.contains("at most 3"));
    }

    #[test]
    fn let_may_be_a_key_name() {
        let doc = parse_src("{ let = 1 in = 2 }").unwrap();
        assert_eq!(path(&entries(&doc.body)[0]).segments, ["let"]);
    }
}

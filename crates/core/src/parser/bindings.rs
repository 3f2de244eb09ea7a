use super::Parser;
use crate::error::ParseError;
use crate::lexer::Token;
use crate::scope::Bindings;

impl<'a> Parser<'a> {
    /// `let { $name = value ... } in`. The table is filled as entries are
    /// read, so a repeated name fails at its second definition.
    pub(super) fn parse_let_block(&mut self) -> Result<Bindings, ParseError> {
        self.expect_word("let", "'let'")?;
        self.expect(Token::LBrace, "'{' after 'let'")?;

        let mut bindings = Bindings::new();
        while self.peek() != &Token::RBrace {
            if self.peek() == &Token::Eof {
                return Err(self.err("'}' to close the let block"));
            }
            let (name, span) = self.take_var("a binding like '$name = value' or '}'")?;
            self.expect(Token::Eq, "'=' after the binding name")?;
            let value = self.parse_value()?;

            if let Err(first) = bindings.insert(name.clone(), value, span) {
                return Err(ParseError::new(
                    span,
                    "a unique binding name",
                    format!("duplicate binding '${}' (first bound at {})", name, first.span),
                ));
            }
            tracing::trace!(name = %name, "bound variable");
            self.skip_separator();
        }
        self.advance();

        self.expect_word("in", "'in' after the let block")?;
        Ok(bindings)
    }
}

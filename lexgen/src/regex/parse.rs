//! Recursive-descent parser over the token stream produced by [`super::token`].
//!
//! Holds a cursor into a flat token vector: `peek` looks at the head
//! without consuming it, `expect` advances past a specific token kind or
//! raises a [`ParseError`].

use super::token::{tokenize, Token};
use super::{Ast, ParseError, MAX_CHILDREN};

pub fn parse(expression: &str) -> Result<Ast, ParseError> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser {
        expression,
        tokens,
        pos: 0,
    };
    let ast = parser.parse_start()?;
    validate(&ast, expression)?;
    Ok(ast)
}

struct Parser<'a> {
    expression: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn accept(&mut self, tok: &Token) -> bool {
        if self.peek() == tok {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Token, expected: &'static str) -> Result<(), ParseError> {
        if self.accept(&tok) {
            Ok(())
        } else {
            Err(ParseError::ExpectedToken {
                expression: self.expression.to_string(),
                position: self.pos,
                expected,
            })
        }
    }

    fn expect_string(&mut self) -> Result<Box<[u8]>, ParseError> {
        match self.peek().clone() {
            Token::String(s) => {
                self.advance();
                Ok(s)
            }
            _ => Err(ParseError::ExpectedToken {
                expression: self.expression.to_string(),
                position: self.pos,
                expected: "a string",
            }),
        }
    }

    fn parse_start(&mut self) -> Result<Ast, ParseError> {
        let seq = self.parse_sequence()?;
        self.expect(Token::End, "end of expression")?;
        Ok(seq)
    }

    fn parse_sequence(&mut self) -> Result<Ast, ParseError> {
        let mut components = Vec::new();
        while !matches!(self.peek(), Token::End | Token::RParen | Token::RBracket) {
            components.push(self.parse_component()?);
            if components.len() > MAX_CHILDREN {
                return Err(ParseError::TooManyChildren {
                    expression: self.expression.to_string(),
                });
            }
        }
        if components.is_empty() {
            return Err(ParseError::EmptySequence {
                expression: self.expression.to_string(),
                position: self.pos,
            });
        }
        Ok(Ast::Sequence(components))
    }

    /// `Factor ('|' Component)?`, right-associative.
    fn parse_component(&mut self) -> Result<Ast, ParseError> {
        let factor = self.parse_factor()?;
        if self.accept(&Token::Pipe) {
            let rhs = self.parse_component()?;
            Ok(Ast::Or(Box::new(factor), Box::new(rhs)))
        } else {
            Ok(factor)
        }
    }

    /// `Term ('?' | '*' | '+')?`. Stacked postfixes (`a**`) are rejected
    /// because after consuming one, the loop returns to `parse_sequence`,
    /// which starts a fresh `parse_term` that doesn't accept `*`/`+`/`?`
    /// as a term start.
    fn parse_factor(&mut self) -> Result<Ast, ParseError> {
        let term = self.parse_term()?;
        Ok(match self.peek() {
            Token::Question => {
                self.advance();
                Ast::Optional(Box::new(term))
            }
            Token::Star => {
                self.advance();
                Ast::ZeroOrMore(Box::new(term))
            }
            Token::Plus => {
                self.advance();
                Ast::OneOrMore(Box::new(term))
            }
            _ => term,
        })
    }

    fn parse_term(&mut self) -> Result<Ast, ParseError> {
        match self.peek().clone() {
            Token::String(s) => {
                self.advance();
                Ok(Ast::String(s))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_sequence()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::LBracket => {
                self.advance();
                let list = self.parse_list()?;
                self.expect(Token::RBracket, "']'")?;
                Ok(list)
            }
            Token::Star | Token::Plus | Token::Question => Err(ParseError::StackedPostfix {
                expression: self.expression.to_string(),
                position: self.pos,
            }),
            _ => Err(ParseError::ExpectedTerm {
                expression: self.expression.to_string(),
                position: self.pos,
            }),
        }
    }

    fn parse_list(&mut self) -> Result<Ast, ParseError> {
        let mut alts = vec![self.parse_list_component()?];
        while self.accept(&Token::Comma) {
            alts.push(self.parse_list_component()?);
            if alts.len() > MAX_CHILDREN {
                return Err(ParseError::TooManyChildren {
                    expression: self.expression.to_string(),
                });
            }
        }
        Ok(Ast::OneOf(alts))
    }

    fn parse_list_component(&mut self) -> Result<Ast, ParseError> {
        let left = self.expect_string()?;
        if self.accept(&Token::Dash) {
            let right = self.expect_string()?;
            Ok(Ast::Range(
                Box::new(Ast::String(left)),
                Box::new(Ast::String(right)),
            ))
        } else {
            Ok(Ast::String(left))
        }
    }
}

/// Post-parse validation pass: every `Range` node must have single-byte
/// `String` endpoints with `left <= right`.
fn validate(ast: &Ast, expression: &str) -> Result<(), ParseError> {
    match ast {
        Ast::Sequence(children) | Ast::OneOf(children) => {
            children.iter().try_for_each(|c| validate(c, expression))
        }
        Ast::Or(l, r) => {
            validate(l, expression)?;
            validate(r, expression)
        }
        Ast::Optional(c) | Ast::ZeroOrMore(c) | Ast::OneOrMore(c) => validate(c, expression),
        Ast::Range(lo, hi) => {
            let (Ast::String(l), Ast::String(h)) = (lo.as_ref(), hi.as_ref()) else {
                return Err(ParseError::InvalidRange {
                    expression: expression.to_string(),
                    position: 0,
                    reason: "range endpoints must be literal strings",
                });
            };
            if l.len() != 1 || h.len() != 1 {
                return Err(ParseError::InvalidRange {
                    expression: expression.to_string(),
                    position: 0,
                    reason: "range endpoints must each be a single character",
                });
            }
            if l[0] > h[0] {
                return Err(ParseError::InvalidRange {
                    expression: expression.to_string(),
                    position: 0,
                    reason: "range's left endpoint exceeds its right endpoint",
                });
            }
            Ok(())
        }
        Ast::String(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(bytes: &[u8]) -> Ast {
        Ast::String(bytes.to_vec().into_boxed_slice())
    }

    #[test]
    fn alternation_is_right_associative() {
        let ast = parse("a|b|c").unwrap();
        assert_eq!(
            ast,
            Ast::Or(
                Box::new(Ast::Sequence(vec![s(b"a")])),
                Box::new(Ast::Or(
                    Box::new(Ast::Sequence(vec![s(b"b")])),
                    Box::new(Ast::Sequence(vec![s(b"c")])),
                )),
            )
        );
    }

    #[test]
    fn stacked_postfix_is_rejected() {
        assert!(matches!(parse("a**"), Err(ParseError::StackedPostfix { .. })));
    }

    #[test]
    fn range_without_right_endpoint_is_rejected() {
        assert!(parse("[a-]").is_err());
    }

    #[test]
    fn unclosed_bracket_is_rejected() {
        assert!(matches!(parse("["), Err(ParseError::ExpectedTerm { .. }) | Err(ParseError::ExpectedToken { .. })));
    }

    #[test]
    fn empty_group_is_rejected() {
        assert!(matches!(parse("()"), Err(ParseError::EmptySequence { .. })));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(matches!(parse("[z-a]"), Err(ParseError::InvalidRange { .. })));
    }

    #[test]
    fn bracket_list_with_range_and_literal() {
        let ast = parse("[0-9,a]").unwrap();
        match ast {
            Ast::Sequence(mut seq) if seq.len() == 1 => match seq.remove(0) {
                Ast::OneOf(alts) => {
                    assert_eq!(alts.len(), 2);
                    assert_eq!(alts[0], Ast::Range(Box::new(s(b"0")), Box::new(s(b"9"))));
                    assert_eq!(alts[1], s(b"a"));
                }
                other => panic!("expected OneOf, got {other:?}"),
            },
            other => panic!("expected singleton Sequence, got {other:?}"),
        }
    }
}

//! Tokenizer: turns expression bytes into a flat [`Token`] stream.
//!
//! The alphabet is 8-bit, not Unicode, so tokenizing operates on `&[u8]`,
//! not `&str` graphemes.

use super::ParseError;
use nom::branch::alt;
use nom::bytes::complete::{tag, take};
use nom::combinator::{map, verify};
use nom::multi::many1;
use nom::IResult;

/// Maximum number of tokens (including the trailing [`Token::End`]) in one expression.
pub const MAX_TOKENS: usize = 100;
/// Maximum length, in bytes, of a single [`Token::String`] run.
pub const MAX_STRING_LEN: usize = 100;
/// Maximum length, in bytes, of an expression after escape processing.
pub const MAX_EXPRESSION_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dash,
    Question,
    Star,
    Plus,
    Pipe,
    String(Box<[u8]>),
    End,
}

impl Token {
    /// A short, human-readable name for error messages.
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::LBracket => "'['",
            Token::RBracket => "']'",
            Token::Comma => "','",
            Token::Dash => "'-'",
            Token::Question => "'?'",
            Token::Star => "'*'",
            Token::Plus => "'+'",
            Token::Pipe => "'|'",
            Token::String(_) => "a string",
            Token::End => "end of expression",
        }
    }
}

fn is_operator_byte(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'[' | b']' | b',' | b'-' | b'?' | b'*' | b'+' | b'|'
    )
}

fn operator_token(input: &[u8]) -> IResult<&[u8], Token> {
    map(verify(take(1usize), |b: &[u8]| is_operator_byte(b[0])), |b: &[u8]| {
        match b[0] {
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'[' => Token::LBracket,
            b']' => Token::RBracket,
            b',' => Token::Comma,
            b'-' => Token::Dash,
            b'?' => Token::Question,
            b'*' => Token::Star,
            b'+' => Token::Plus,
            b'|' => Token::Pipe,
            _ => unreachable!("verified to be an operator byte"),
        }
    })(input)
}

fn escaped_byte(input: &[u8]) -> IResult<&[u8], u8> {
    map(
        nom::sequence::preceded(tag(&[b'\\'][..]), take(1usize)),
        |b: &[u8]| b[0],
    )(input)
}

fn plain_byte(input: &[u8]) -> IResult<&[u8], u8> {
    map(verify(take(1usize), |b: &[u8]| !is_operator_byte(b[0])), |b: &[u8]| {
        b[0]
    })(input)
}

fn string_token(input: &[u8]) -> IResult<&[u8], Token> {
    map(many1(alt((escaped_byte, plain_byte))), |bytes: Vec<u8>| {
        Token::String(bytes.into_boxed_slice())
    })(input)
}

/// Tokenizes `expr`, appending a trailing [`Token::End`] sentinel.
pub(crate) fn tokenize(expr: &str) -> Result<Vec<Token>, ParseError> {
    let mut rest = expr.as_bytes();
    let mut tokens = Vec::new();
    let mut decoded_len = 0usize;

    while !rest.is_empty() {
        let (next, tok) = alt((operator_token, string_token))(rest)
            .map_err(|_| ParseError::unterminated_escape(expr))?;

        match &tok {
            Token::String(s) if s.len() > MAX_STRING_LEN => {
                return Err(ParseError::string_too_long(expr, s.len()));
            }
            Token::String(s) => decoded_len += s.len(),
            _ => decoded_len += 1,
        }

        tokens.push(tok);
        rest = next;

        if tokens.len() > MAX_TOKENS {
            return Err(ParseError::too_many_tokens(expr));
        }
    }

    if decoded_len > MAX_EXPRESSION_LEN {
        return Err(ParseError::expression_too_long(expr, decoded_len));
    }

    tokens.push(Token::End);
    Ok(tokens)
}

//! The lexer runtime: longest-match scanning over a built [`Dfa`].
//!
//! `lexgen` only builds the automaton; it does not run it. A `Dfa` state
//! only records "this state accepts expression i", so remembering the best
//! accepting state seen so far during a scan, and applying the longest-match
//! discipline on top of that, is this module's job.

use lexgen::dfa::{Dfa, NO_STATE};
use thiserror::Error;

/// One recognized token: which expression matched, and how many bytes of
/// input it consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub output_value: usize,
    pub length: usize,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    #[error("no expression matches the input at byte offset {offset}")]
    NoMatch { offset: usize },
}

/// Wraps a built [`Dfa`] and drives it over a byte stream, applying the
/// longest-match/priority discipline: on each call, advance byte by byte,
/// remembering the most recent `(length, output_value)` pair observed at an
/// accepting state, and report that token at the first dead transition or
/// end of input. Ties at equal length are already resolved inside the DFA
/// itself (the lowest output value wins a shared accepting state), so the
/// runtime only has to track the *longest* match, not break ties.
pub struct Lexer<'a> {
    dfa: &'a Dfa,
}

impl<'a> Lexer<'a> {
    pub fn new(dfa: &'a Dfa) -> Self {
        Lexer { dfa }
    }

    /// Scans one token starting at the beginning of `input`.
    pub fn next_token(&self, input: &[u8]) -> Result<Token, ScanError> {
        let mut state = self.dfa.start_state();
        let mut best = self.accepting_token(state, 0);

        for (consumed, &b) in input.iter().enumerate() {
            let next = self.dfa.transition(state, b);
            if next == NO_STATE {
                break;
            }
            state = next;
            if let Some(tok) = self.accepting_token(state, consumed + 1) {
                best = Some(tok);
            }
        }

        best.ok_or(ScanError::NoMatch { offset: 0 })
    }

    fn accepting_token(&self, state: usize, length: usize) -> Option<Token> {
        self.dfa.is_accepting(state).then(|| Token {
            output_value: self.dfa.output_value(state),
            length,
        })
    }

    /// Scans the entire input into a sequence of tokens, greedily consuming
    /// the longest match at each position. Fails at the first position with
    /// no match at all (a single dead byte does not abort earlier tokens).
    pub fn tokenize(&self, input: &[u8]) -> Result<Vec<Token>, ScanError> {
        let mut tokens = Vec::new();
        let mut pos = 0;
        while pos < input.len() {
            let tok = self
                .next_token(&input[pos..])
                .map_err(|_| ScanError::NoMatch { offset: pos })?;
            if tok.length == 0 {
                // An accepting start state (an expression like "a*" or "x?"
                // that matches empty) makes every position "match" with zero
                // length. Without a byte consumed here, pos would never
                // advance.
                return Err(ScanError::NoMatch { offset: pos });
            }
            pos += tok.length;
            tokens.push(tok);
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexgen::generate_lexer;

    #[test]
    fn single_expression_literal_match() {
        let dfa = generate_lexer(&["cat"]).unwrap();
        let lexer = Lexer::new(&dfa);
        let tok = lexer.next_token(b"cat").unwrap();
        assert_eq!(tok, Token { output_value: 0, length: 3 });
    }

    #[test]
    fn digit_run_matches_greedily() {
        let dfa = generate_lexer(&["[0-9]+"]).unwrap();
        let lexer = Lexer::new(&dfa);
        let tok = lexer.next_token(b"00042").unwrap();
        assert_eq!(tok, Token { output_value: 0, length: 5 });
    }

    #[test]
    fn star_loop_with_terminator() {
        let dfa = generate_lexer(&["a(b|c)*d"]).unwrap();
        let lexer = Lexer::new(&dfa);
        assert_eq!(lexer.next_token(b"abcbd").unwrap(), Token { output_value: 0, length: 5 });
        assert_eq!(lexer.next_token(b"ad").unwrap(), Token { output_value: 0, length: 2 });
        assert!(lexer.next_token(b"ae").is_err());
    }

    #[test]
    fn longest_match_prefers_the_longer_expression() {
        let dfa = generate_lexer(&["int", "[a-z]+"]).unwrap();
        let lexer = Lexer::new(&dfa);
        let tok = lexer.next_token(b"integer").unwrap();
        assert_eq!(tok, Token { output_value: 1, length: 7 });
    }

    #[test]
    fn tie_at_equal_length_prefers_the_earlier_expression() {
        let dfa = generate_lexer(&["a+", "a"]).unwrap();
        let lexer = Lexer::new(&dfa);
        let tok = lexer.next_token(b"aaa").unwrap();
        assert_eq!(tok, Token { output_value: 0, length: 3 });
    }

    #[test]
    fn nested_repetition_and_alternation() {
        let dfa = generate_lexer(&["ba(g|d|[h,2])?(ab(hg)+)*"]).unwrap();
        let lexer = Lexer::new(&dfa);
        assert_eq!(lexer.next_token(b"ba").unwrap(), Token { output_value: 0, length: 2 });
        assert_eq!(lexer.next_token(b"bagabhg").unwrap(), Token { output_value: 0, length: 7 });
        assert_eq!(lexer.next_token(b"bah").unwrap(), Token { output_value: 0, length: 3 });
    }

    #[test]
    fn tokenize_splits_a_run_of_tokens() {
        let dfa = generate_lexer(&["[0-9]+", "[a-z]+", " "]).unwrap();
        let lexer = Lexer::new(&dfa);
        let tokens = lexer.tokenize(b"12 ab").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token { output_value: 0, length: 2 },
                Token { output_value: 2, length: 1 },
                Token { output_value: 1, length: 2 },
            ]
        );
    }

    #[test]
    fn tokenize_fails_at_the_first_dead_byte() {
        let dfa = generate_lexer(&["[a-z]+"]).unwrap();
        let lexer = Lexer::new(&dfa);
        assert!(lexer.tokenize(b"ab1").is_err());
    }

    #[test]
    fn tokenize_terminates_when_the_start_state_itself_accepts() {
        // "a*" accepts the empty string, so the start state is accepting
        // with length 0. A byte that doesn't extend the match must be
        // reported as a failure to scan, not looped over forever.
        let dfa = generate_lexer(&["a*"]).unwrap();
        let lexer = Lexer::new(&dfa);
        assert!(lexer.tokenize(b"b").is_err());
    }
}

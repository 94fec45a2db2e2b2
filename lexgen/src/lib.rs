//!# lexgen
//!
//! `lexgen` compiles a finite, ordered list of regular expressions into a
//! deterministic lexer automaton. Each expression is tagged with its
//! position in the list, which doubles as both its output value and its
//! priority when two expressions match the same input of equal length.
//!
//! ## Pipeline
//!
//! ```text
//! &[&str] → [Token] → Ast → Nfa → Dfa
//! ```
//!
//! 1. [`regex::parse`] tokenizes and parses one expression into an [`regex::Ast`].
//! 2. [`nfa::Nfa::build_combined`] applies Thompson's construction to every
//!    AST, merging them into one NFA whose accepting states remember which
//!    expression they came from.
//! 3. [`dfa::Dfa::from_nfa`] subset-constructs a DFA from that NFA and
//!    merges observably-equivalent states.
//!
//! ## Usage
//!
//! ```rust
//! use lexgen::generate_lexer;
//!
//! let dfa = generate_lexer(&["int", "[a-z]+"]).unwrap();
//! // Walk the DFA by hand: "integer" should end up accepting as
//! // expression 1 ([a-z]+), the longer of the two matches.
//! let mut state = dfa.start_state();
//! for b in b"integer" {
//!     state = dfa.transition(state, *b);
//! }
//! assert!(dfa.is_accepting(state));
//! assert_eq!(dfa.output_value(state), 1);
//! ```
//!
//! ## What this crate does not do
//!
//! Per its non-goals: it does not itself scan input (see the companion
//! `lexgen-cli` crate's runtime for that), it does not support Unicode
//! beyond an 8-bit alphabet, anchors, backreferences, lookaround or counted
//! repetition, it does not perform Hopcroft-style partition minimization
//! (only an equivalence-merge pass), and it does not persist automata to
//! disk.

pub mod bitset;
pub mod dfa;
mod error;
pub mod nfa;
mod print;
pub mod regex;
mod table;

pub use dfa::Dfa;
pub use error::GenerateError;

/// Maximum number of expressions `generate_lexer` accepts in one call,
/// bounded by the NFA/DFA state caps: even at one state per expression
/// dispatch, more than this can never fit.
pub const MAX_EXPRESSIONS: usize = nfa::MAX_STATES;

/// Compiles `expressions` into a DFA, in priority order: `expressions[i]`'s
/// output value is `i`. Fails immediately (no partial DFA is returned) on
/// the first malformed expression, or on an NFA/DFA construction conflict
/// or capacity overrun.
pub fn generate_lexer(expressions: &[&str]) -> Result<Dfa, GenerateError> {
    let asts: Vec<regex::Ast> = expressions
        .iter()
        .enumerate()
        .map(|(index, expr)| {
            regex::parse(expr).map_err(|source| GenerateError::Parse {
                index,
                expression: (*expr).to_string(),
                source,
            })
        })
        .collect::<Result<_, _>>()?;

    let nfa = nfa::Nfa::build_combined(&asts)?;
    let dfa = dfa::Dfa::from_nfa(&nfa)?;
    Ok(dfa)
}

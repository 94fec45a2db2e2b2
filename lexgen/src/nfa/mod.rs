//! # Nondeterministic finite automaton (Thompson's construction)
//!
//! Builds an [`Nfa`] from a single [`Ast`](crate::regex::Ast), or merges many
//! into one combined automaton whose accepting states remember which
//! expression (by index, which doubles as priority) they belong to.
//!
//! Each [`NfaState`] carries a dense 256-entry transition table (one slot
//! per possible input byte) plus a [`Bitset`] of ε-targets. The alphabet is
//! fixed at 256 bytes, so a dense array is both simpler and a closer fit
//! than a transition map keyed by a dynamically-sized alphabet.

use crate::bitset::Bitset;
use crate::regex::Ast;
use std::fmt;
use thiserror::Error;

/// Sentinel meaning "no transition"; reserved outside the valid index range.
pub const NO_STATE: usize = usize::MAX;
/// Number of input bytes in the alphabet.
pub const ALPHABET_SIZE: usize = 256;
/// Hard cap on the number of states in one NFA.
pub const MAX_STATES: usize = 64;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    #[error("NFA exceeded its {MAX_STATES}-state capacity while compiling expression {expression_index}")]
    StatesExceeded { expression_index: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NfaState {
    pub(crate) transitions: Vec<usize>,
    pub(crate) epsilon: Bitset,
    pub(crate) accepting: bool,
    pub(crate) output_value: usize,
}

impl NfaState {
    fn new() -> Self {
        NfaState {
            transitions: vec![NO_STATE; ALPHABET_SIZE],
            epsilon: Bitset::new(),
            accepting: false,
            output_value: 0,
        }
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    pub fn output_value(&self) -> usize {
        self.output_value
    }

    pub fn transition(&self, c: u8) -> usize {
        self.transitions[c as usize]
    }

    pub fn epsilon_transitions(&self) -> &Bitset {
        &self.epsilon
    }
}

/// A nondeterministic finite automaton with ε-transitions, addressed by
/// contiguous small-integer state indices. Owns every state outright:
/// dropping the `Nfa` frees the whole automaton.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nfa {
    pub(crate) states: Vec<NfaState>,
    pub(crate) start: usize,
}

impl Nfa {
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn start_state(&self) -> usize {
        self.start
    }

    pub fn state(&self, idx: usize) -> &NfaState {
        &self.states[idx]
    }

    /// Builds an NFA for a single expression with output value `output_value`.
    pub fn build(ast: &Ast, output_value: usize) -> Result<Nfa, BuildError> {
        let mut builder = Builder::new(output_value);
        let start = builder
            .alloc()
            .map_err(|_| BuildError::StatesExceeded { expression_index: output_value })?;
        let body = builder.build(ast)?;
        let accept = builder
            .alloc()
            .map_err(|_| BuildError::StatesExceeded { expression_index: output_value })?;
        builder.states[accept].accepting = true;
        builder.states[accept].output_value = output_value;
        builder.add_epsilon(start, body.entry);
        builder.add_epsilon(body.exit, accept);
        Ok(Nfa {
            states: builder.states,
            start,
        })
    }

    /// Merges `asts[i]` (output value `i`) into one combined NFA sharing a
    /// single start state: each branch is isolated behind its own
    /// per-expression dispatch state, preserving priority order by index.
    pub fn build_combined(asts: &[Ast]) -> Result<Nfa, BuildError> {
        let mut builder = Builder::new(0);
        let start = builder.alloc_for(0)?;
        for (i, ast) in asts.iter().enumerate() {
            builder.current_expr = i;
            let dispatch = builder.alloc_for(i)?;
            let body = builder.build(ast)?;
            let accept = builder.alloc_for(i)?;
            builder.states[accept].accepting = true;
            builder.states[accept].output_value = i;
            builder.add_epsilon(start, dispatch);
            builder.add_epsilon(dispatch, body.entry);
            builder.add_epsilon(body.exit, accept);
        }
        Ok(Nfa {
            states: builder.states,
            start,
        })
    }

    /// Pretty-prints this NFA for diagnostics (informative only; no
    /// consumer parses this format back).
    pub fn to_table(&self) -> String {
        crate::print::nfa_table(self)
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_table())
    }
}

struct Fragment {
    entry: usize,
    exit: usize,
}

struct Builder {
    states: Vec<NfaState>,
    current_expr: usize,
}

impl Builder {
    fn new(current_expr: usize) -> Self {
        Builder {
            states: Vec::new(),
            current_expr,
        }
    }

    fn alloc(&mut self) -> Result<usize, ()> {
        if self.states.len() >= MAX_STATES {
            return Err(());
        }
        let idx = self.states.len();
        self.states.push(NfaState::new());
        Ok(idx)
    }

    fn alloc_for(&mut self, expression_index: usize) -> Result<usize, BuildError> {
        self.alloc()
            .map_err(|_| BuildError::StatesExceeded { expression_index })
    }

    fn add_epsilon(&mut self, from: usize, to: usize) {
        self.states[from].epsilon.insert(to);
    }

    fn set_transition(&mut self, from: usize, c: u8, to: usize) {
        self.states[from].transitions[c as usize] = to;
    }

    fn alloc_checked(&mut self) -> Result<usize, BuildError> {
        let expression_index = self.current_expr;
        self.alloc_for(expression_index)
    }

    fn build(&mut self, ast: &Ast) -> Result<Fragment, BuildError> {
        match ast {
            Ast::String(bytes) => self.build_string(bytes),
            Ast::Sequence(children) => self.build_sequence(children),
            Ast::Or(l, r) => self.build_or(l, r),
            Ast::Optional(c) => self.build_optional(c),
            Ast::ZeroOrMore(c) => self.build_zero_or_more(c),
            Ast::OneOrMore(c) => self.build_one_or_more(c),
            Ast::OneOf(children) => self.build_one_of(children),
            Ast::Range(lo, hi) => self.build_range(lo, hi),
        }
    }

    /// `c0 c1 ... c(n-1)`: n+1 states chained by character transitions.
    fn build_string(&mut self, bytes: &[u8]) -> Result<Fragment, BuildError> {
        let entry = self.alloc_checked()?;
        let mut prev = entry;
        for &c in bytes {
            let next = self.alloc_checked()?;
            self.set_transition(prev, c, next);
            prev = next;
        }
        Ok(Fragment { entry, exit: prev })
    }

    /// `a1 a2 ... ak`: chain each child's exit to the next child's entry via ε.
    fn build_sequence(&mut self, children: &[Ast]) -> Result<Fragment, BuildError> {
        let mut iter = children.iter();
        let first = self.build(iter.next().expect("Sequence has at least one child"))?;
        let mut exit = first.exit;
        for child in iter {
            let frag = self.build(child)?;
            self.add_epsilon(exit, frag.entry);
            exit = frag.exit;
        }
        Ok(Fragment {
            entry: first.entry,
            exit,
        })
    }

    /// New entry `E` and exit `X`; ε: `E→L.entry`, `E→R.entry`, `L.exit→X`, `R.exit→X`.
    fn build_or(&mut self, l: &Ast, r: &Ast) -> Result<Fragment, BuildError> {
        let entry = self.alloc_checked()?;
        let l_frag = self.build(l)?;
        let r_frag = self.build(r)?;
        let exit = self.alloc_checked()?;
        self.add_epsilon(entry, l_frag.entry);
        self.add_epsilon(entry, r_frag.entry);
        self.add_epsilon(l_frag.exit, exit);
        self.add_epsilon(r_frag.exit, exit);
        Ok(Fragment { entry, exit })
    }

    /// New `E`, `X`; ε: `E→X` (skip), `E→C.entry`, `C.exit→X`.
    fn build_optional(&mut self, c: &Ast) -> Result<Fragment, BuildError> {
        let entry = self.alloc_checked()?;
        let body = self.build(c)?;
        let exit = self.alloc_checked()?;
        self.add_epsilon(entry, exit);
        self.add_epsilon(entry, body.entry);
        self.add_epsilon(body.exit, exit);
        Ok(Fragment { entry, exit })
    }

    /// New `E`, `X`; ε: `E→X`, `E→C.entry`, `C.exit→X`, `C.exit→C.entry` (loop back).
    fn build_zero_or_more(&mut self, c: &Ast) -> Result<Fragment, BuildError> {
        let entry = self.alloc_checked()?;
        let body = self.build(c)?;
        let exit = self.alloc_checked()?;
        self.add_epsilon(entry, exit);
        self.add_epsilon(entry, body.entry);
        self.add_epsilon(body.exit, exit);
        self.add_epsilon(body.exit, body.entry);
        Ok(Fragment { entry, exit })
    }

    /// Like [`Self::build_zero_or_more`] but without the `E→X` skip edge.
    fn build_one_or_more(&mut self, c: &Ast) -> Result<Fragment, BuildError> {
        let entry = self.alloc_checked()?;
        let body = self.build(c)?;
        let exit = self.alloc_checked()?;
        self.add_epsilon(entry, body.entry);
        self.add_epsilon(body.exit, exit);
        self.add_epsilon(body.exit, body.entry);
        Ok(Fragment { entry, exit })
    }

    /// New `E`, `X`; for each child: ε `E→child.entry`, `child.exit→X`.
    fn build_one_of(&mut self, children: &[Ast]) -> Result<Fragment, BuildError> {
        let entry = self.alloc_checked()?;
        let exit = self.alloc_checked()?;
        for child in children {
            let frag = self.build(child)?;
            self.add_epsilon(entry, frag.entry);
            self.add_epsilon(frag.exit, exit);
        }
        Ok(Fragment { entry, exit })
    }

    /// New `E`, `X`; for every byte `c` with `lo <= c <= hi`, `E --c--> X`.
    fn build_range(&mut self, lo: &Ast, hi: &Ast) -> Result<Fragment, BuildError> {
        let (Ast::String(l), Ast::String(h)) = (lo, hi) else {
            unreachable!("Range children are always single-byte Strings after validation")
        };
        let entry = self.alloc_checked()?;
        let exit = self.alloc_checked()?;
        for c in l[0]..=h[0] {
            self.set_transition(entry, c, exit);
        }
        Ok(Fragment { entry, exit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::parse;

    #[test]
    fn single_char_string_has_two_states() {
        let ast = parse("a").unwrap();
        let nfa = Nfa::build(&ast, 0).unwrap();
        // wrapper start + (n+1) string states + accept = 2 + 2 = 4
        assert_eq!(nfa.num_states(), 4);
    }

    #[test]
    fn combined_nfa_preserves_priority_order() {
        let a = parse("a+").unwrap();
        let b = parse("a").unwrap();
        let nfa = Nfa::build_combined(&[a, b]).unwrap();
        let accepting_values: Vec<_> = nfa
            .states
            .iter()
            .filter(|s| s.accepting)
            .map(|s| s.output_value)
            .collect();
        assert_eq!(accepting_values, vec![0, 1]);
    }

    #[test]
    fn capacity_exceeded_is_reported() {
        // A sequence of 64 one-char strings easily blows the 64-state cap.
        let text = "a".repeat(64);
        let ast = crate::regex::Ast::Sequence(
            text.bytes()
                .map(|b| crate::regex::Ast::String(vec![b].into_boxed_slice()))
                .collect(),
        );
        assert!(matches!(Nfa::build(&ast, 0), Err(BuildError::StatesExceeded { .. })));
    }
}

//! # Deterministic finite automaton (subset construction + equivalence merge)
//!
//! Converts an [`Nfa`] into a [`Dfa`] via full power-set-keyed subset
//! construction, then repeatedly merges observably-equal states until a
//! fixpoint. This is *not* Myhre-Nerode minimization: there is no partition
//! refinement à la Hopcroft, only pairwise merging of states that are
//! already fully equal.
//!
//! When a power set contains accepting NFA states from more than one
//! expression, this implementation resolves the conflict by priority: the
//! lowest output value present wins, matching the tie-break an expression
//! list's ordering promises.

use crate::bitset::Bitset;
use crate::nfa::{Nfa, ALPHABET_SIZE};
use std::collections::HashMap;
use thiserror::Error;

/// Sentinel meaning "no transition"; reserved outside the valid index range.
pub const NO_STATE: usize = usize::MAX;
/// Hard cap on the number of states in one DFA.
pub const MAX_STATES: usize = 64;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    #[error("DFA exceeded its {MAX_STATES}-state capacity during subset construction")]
    StatesExceeded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DfaState {
    pub(crate) transitions: Vec<usize>,
    pub(crate) accepting: bool,
    pub(crate) output_value: usize,
}

/// A deterministic finite automaton, index-addressed, start state always 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dfa {
    pub(crate) states: Vec<DfaState>,
    pub(crate) start: usize,
}

impl Dfa {
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn start_state(&self) -> usize {
        self.start
    }

    pub fn is_accepting(&self, state: usize) -> bool {
        self.states[state].accepting
    }

    pub fn output_value(&self, state: usize) -> usize {
        self.states[state].output_value
    }

    pub fn transition(&self, state: usize, c: u8) -> usize {
        self.states[state].transitions[c as usize]
    }

    /// Builds a DFA from `nfa` by subset construction, then minimizes it by
    /// equivalence merge. This is the pipeline's final stage.
    pub fn from_nfa(nfa: &Nfa) -> Result<Dfa, BuildError> {
        let mut dfa = subset_construct(nfa)?;
        merge_equivalent_states(&mut dfa);
        Ok(dfa)
    }

    pub fn to_table(&self) -> String {
        crate::print::dfa_table(self)
    }
}

impl std::fmt::Display for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_table())
    }
}

/// Smallest ε-closed set containing `s`: a worklist over ε-edges.
pub(crate) fn epsilon_closure(nfa: &Nfa, s: usize) -> Bitset {
    let mut closure = Bitset::new();
    closure.insert(s);
    let mut worklist = vec![s];
    while let Some(q) = worklist.pop() {
        for t in nfa.state(q).epsilon_transitions().iterate() {
            if !closure.contains(t) {
                closure.insert(t);
                worklist.push(t);
            }
        }
    }
    closure
}

/// Full power-set-keyed subset construction: DFA states are keyed by their
/// power-set identity (a [`Bitset`] of NFA states), not by a single seed NFA
/// state index, so two different seeds that happen to reach the same
/// power-set collapse into one DFA state rather than conflicting.
fn subset_construct(nfa: &Nfa) -> Result<Dfa, BuildError> {
    let mut states: Vec<DfaState> = Vec::new();
    let mut power_sets: Vec<Bitset> = Vec::new();
    let mut index_of: HashMap<Bitset, usize> = HashMap::new();

    let start_set = epsilon_closure(nfa, nfa.start_state());
    let start = alloc_dfa_state(nfa, &mut states, &mut power_sets, &mut index_of, start_set)?;

    let mut frontier = vec![start];
    while let Some(d) = frontier.pop() {
        let set = power_sets[d];
        for c in 0..ALPHABET_SIZE {
            let c = c as u8;
            let mut target: Bitset = Bitset::new();
            for q in set.iterate() {
                let t = nfa.state(q).transition(c);
                if t != crate::nfa::NO_STATE {
                    target.union_with(&epsilon_closure(nfa, t));
                }
            }
            if target.is_empty() {
                continue;
            }
            let target_idx = match index_of.get(&target) {
                Some(&idx) => idx,
                None => {
                    let idx = alloc_dfa_state(nfa, &mut states, &mut power_sets, &mut index_of, target)?;
                    frontier.push(idx);
                    idx
                }
            };
            states[d].transitions[c as usize] = target_idx;
        }
    }

    Ok(Dfa { states, start })
}

fn alloc_dfa_state(
    nfa: &Nfa,
    states: &mut Vec<DfaState>,
    power_sets: &mut Vec<Bitset>,
    index_of: &mut HashMap<Bitset, usize>,
    set: Bitset,
) -> Result<usize, BuildError> {
    if states.len() >= MAX_STATES {
        return Err(BuildError::StatesExceeded);
    }

    // Priority-wins: when two expressions' accepting states land in the same
    // power set, the lower output value (the higher-priority, earlier-listed
    // expression) is the one this DFA state remembers.
    let mut output: Option<usize> = None;
    for q in set.iterate() {
        let state = nfa.state(q);
        if state.is_accepting() {
            output = Some(match output {
                Some(v) => v.min(state.output_value()),
                None => state.output_value(),
            });
        }
    }

    let idx = states.len();
    states.push(DfaState {
        transitions: vec![NO_STATE; ALPHABET_SIZE],
        accepting: output.is_some(),
        output_value: output.unwrap_or(0),
    });
    power_sets.push(set);
    index_of.insert(set, idx);
    Ok(idx)
}

/// Repeatedly merges pairs of observably-equal states (same `accepting`,
/// `output_value`, and all 256 transition targets) until a full pass finds
/// none left. Each merge moves the last state into the vacated slot so
/// state indices stay contiguous.
fn merge_equivalent_states(dfa: &mut Dfa) {
    loop {
        let mut merged_any = false;
        let mut i = 0;
        while i < dfa.states.len() {
            let mut j = i + 1;
            while j < dfa.states.len() {
                if states_equal(&dfa.states[i], &dfa.states[j]) {
                    merge_states(dfa, i, j);
                    merged_any = true;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        if !merged_any {
            break;
        }
    }
}

fn states_equal(a: &DfaState, b: &DfaState) -> bool {
    a.accepting == b.accepting && a.output_value == b.output_value && a.transitions == b.transitions
}

fn merge_states(dfa: &mut Dfa, i: usize, j: usize) {
    let last = dfa.states.len() - 1;
    remap_transitions(dfa, j, i);
    if dfa.start == j {
        dfa.start = i;
    }
    if j != last {
        dfa.states[j] = dfa.states[last].clone();
        remap_transitions(dfa, last, j);
        if dfa.start == last {
            dfa.start = j;
        }
    }
    dfa.states.pop();
}

fn remap_transitions(dfa: &mut Dfa, from: usize, to: usize) {
    for state in dfa.states.iter_mut() {
        for t in state.transitions.iter_mut() {
            if *t == from {
                *t = to;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa::Nfa;
    use crate::regex::parse;

    fn build(exprs: &[&str]) -> Dfa {
        let asts: Vec<_> = exprs.iter().map(|e| parse(e).unwrap()).collect();
        let nfa = Nfa::build_combined(&asts).unwrap();
        Dfa::from_nfa(&nfa).unwrap()
    }

    #[test]
    fn every_transition_is_a_single_valid_index_or_no_state() {
        let dfa = build(&["a(b|c)*d"]);
        for k in 0..dfa.num_states() {
            for c in 0..=255u8 {
                let t = dfa.transition(k, c);
                assert!(t == NO_STATE || t < dfa.num_states());
            }
        }
    }

    #[test]
    fn digits_plus_matches_digit_runs() {
        let dfa = build(&["[0-9]+"]);
        let mut state = dfa.start_state();
        for b in b"00042" {
            state = dfa.transition(state, *b);
            assert_ne!(state, NO_STATE);
        }
        assert!(dfa.is_accepting(state));
    }

    #[test]
    fn conflicting_outputs_resolve_to_the_lowest_index() {
        let asts: Vec<_> = ["abc", "abc"].iter().map(|e| parse(e).unwrap()).collect();
        let nfa = Nfa::build_combined(&asts).unwrap();
        let dfa = Dfa::from_nfa(&nfa).unwrap();
        let mut state = dfa.start_state();
        for b in b"abc" {
            state = dfa.transition(state, *b);
            assert_ne!(state, NO_STATE);
        }
        assert!(dfa.is_accepting(state));
        assert_eq!(dfa.output_value(state), 0);
    }

    #[test]
    fn tie_at_equal_length_prefers_the_earlier_expression() {
        let dfa = build(&["a+", "a"]);
        let mut state = dfa.start_state();
        state = dfa.transition(state, b'a');
        assert_ne!(state, NO_STATE);
        assert!(dfa.is_accepting(state));
        assert_eq!(dfa.output_value(state), 0);
    }

    #[test]
    fn equivalence_merge_reaches_a_fixpoint() {
        let mut dfa = build(&["int", "[a-z]+"]);
        let before = dfa.num_states();
        merge_equivalent_states(&mut dfa);
        assert_eq!(dfa.num_states(), before, "already at a fixpoint, a second pass should change nothing");
        for i in 0..dfa.num_states() {
            for j in (i + 1)..dfa.num_states() {
                assert!(!states_equal(&dfa.states[i], &dfa.states[j]), "states {i} and {j} should not be equal after merging");
            }
        }
    }
}

//! Read-only debug pretty-printers for the NFA and DFA. Their format is
//! informative only; nothing parses it back.

use crate::dfa::Dfa;
use crate::nfa::{Nfa, NO_STATE};
use crate::table::Table;

/// Groups a 256-entry transition row into contiguous `(lo, hi, target)`
/// runs, since printing one column per byte would be unreadable.
fn compact_ranges(transitions: &[usize]) -> Vec<(u8, u8, usize)> {
    let mut ranges = Vec::new();
    let mut c = 0usize;
    while c < transitions.len() {
        let target = transitions[c];
        if target == NO_STATE {
            c += 1;
            continue;
        }
        let lo = c as u8;
        let mut hi = c as u8;
        while c + 1 < transitions.len() && transitions[c + 1] == target {
            c += 1;
            hi = c as u8;
        }
        ranges.push((lo, hi, target));
        c += 1;
    }
    ranges
}

fn byte_label(b: u8) -> String {
    if b.is_ascii_graphic() {
        (b as char).to_string()
    } else {
        format!("\\x{b:02x}")
    }
}

fn range_label(lo: u8, hi: u8) -> String {
    if lo == hi {
        byte_label(lo)
    } else {
        format!("{}-{}", byte_label(lo), byte_label(hi))
    }
}

pub(crate) fn nfa_table(nfa: &Nfa) -> String {
    let mut table = Table::default();
    table.push_row(vec![
        "state".to_string(),
        "start".to_string(),
        "accept".to_string(),
        "value".to_string(),
        "eps".to_string(),
        "transitions".to_string(),
    ]);
    for (idx, state) in nfa.states.iter().enumerate() {
        let eps = state
            .epsilon_transitions()
            .iterate()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let transitions = compact_ranges(&state.transitions)
            .into_iter()
            .map(|(lo, hi, target)| format!("{}->{target}", range_label(lo, hi)))
            .collect::<Vec<_>>()
            .join(" ");
        table.push_row(vec![
            idx.to_string(),
            if idx == nfa.start_state() { "->".to_string() } else { String::new() },
            if state.is_accepting() { "*".to_string() } else { String::new() },
            if state.is_accepting() { state.output_value().to_string() } else { String::new() },
            format!("{{{eps}}}"),
            transitions,
        ]);
    }
    table.to_string("  ")
}

pub(crate) fn dfa_table(dfa: &Dfa) -> String {
    let mut table = Table::default();
    table.push_row(vec![
        "state".to_string(),
        "start".to_string(),
        "accept".to_string(),
        "value".to_string(),
        "transitions".to_string(),
    ]);
    for (idx, state) in dfa.states.iter().enumerate() {
        let transitions = compact_ranges(&state.transitions)
            .into_iter()
            .map(|(lo, hi, target)| format!("{}->{target}", range_label(lo, hi)))
            .collect::<Vec<_>>()
            .join(" ");
        table.push_row(vec![
            idx.to_string(),
            if idx == dfa.start_state() { "->".to_string() } else { String::new() },
            if state.accepting { "*".to_string() } else { String::new() },
            if state.accepting { state.output_value.to_string() } else { String::new() },
            transitions,
        ]);
    }
    table.to_string("  ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::parse;

    #[test]
    fn dfa_table_mentions_every_state() {
        let ast = parse("a+").unwrap();
        let nfa = Nfa::build(&ast, 0).unwrap();
        let dfa = Dfa::from_nfa(&nfa).unwrap();
        let printed = dfa.to_table();
        for idx in 0..dfa.num_states() {
            assert!(printed.contains(&idx.to_string()));
        }
    }
}

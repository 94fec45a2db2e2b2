use crate::{dfa, nfa, regex};
use thiserror::Error;

/// Top-level error for [`crate::generate_lexer`], uniting the ways compiling
/// a lexer can fail: a malformed expression (tagged with which expression,
/// by index, failed) or a capacity overrun in the NFA or DFA stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("expression {index} (\"{expression}\") failed to parse: {source}")]
    Parse {
        index: usize,
        expression: String,
        #[source]
        source: regex::ParseError,
    },
    #[error(transparent)]
    NfaBuild(#[from] nfa::BuildError),
    #[error(transparent)]
    DfaBuild(#[from] dfa::BuildError),
}

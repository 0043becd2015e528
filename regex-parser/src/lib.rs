#![warn(missing_docs)]

//! Minimal regex front end: parses `* | ( )` expressions, builds an NFA with Thompson's
//! construction and converts it to a DFA through subset construction.
//!
//! ```text
//! text -> parse -> Regex -> compile -> Nfa -> Dfa::from_nfa -> Dfa
//! ```

pub mod ast;
pub mod compile;
pub mod parser;

pub use ast::Regex;
pub use compile::compile;
pub use gerber;
pub use parser::{MAX_DEPTH, ParseError, ParseErrorKind, parse};

use gerber::{AutomatonError, Dfa, Nfa};

/// Any failure along the regex to DFA pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The expression itself is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Building or reading an automaton failed.
    #[error(transparent)]
    Automaton(#[from] AutomatonError),
}

/// Parses and compiles `regex` into its numbered NFA.
pub fn regex_to_nfa(regex: &str) -> Result<Nfa, Error> {
    let tree = parse(regex)?;
    Ok(compile(&tree)?)
}

/// Runs the whole pipeline for `regex`.
pub fn regex_to_dfa(regex: &str) -> Result<Dfa, Error> {
    let nfa = regex_to_nfa(regex)?;
    Ok(Dfa::from_nfa(&nfa)?)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pipeline_errors() {
        assert!(matches!(regex_to_dfa("a|"), Err(Error::Parse(_))));
        assert!(matches!(
            regex_to_nfa(&"ab".repeat(20)),
            Err(Error::Automaton(AutomatonError::CapacityExceeded { .. }))
        ));
        assert_eq!(
            regex_to_dfa("(a").unwrap_err().to_string(),
            "malformed expression at 0: unclosed `(`"
        );
    }

    #[test]
    fn test_regex_to_dfa() {
        let dfa = regex_to_dfa("(a|b)*abb").unwrap();
        assert!(dfa.simulate_iter("abb".chars()));
        assert!(dfa.simulate_iter("babaabb".chars()));
        assert!(!dfa.simulate_iter("abba".chars()));
        assert!(!dfa.simulate_iter("".chars()));
        assert_eq!(dfa.symbols(), &['a', 'b']);
    }
}

//! Alphabet model: which characters are operators, which are symbols, and how edges are labelled.

use std::fmt;

/// Character standing for the empty move in every textual automaton format.
pub const EPSILON: char = '#';

/// The regex operator characters. Everything else (except [`EPSILON`]) is a literal symbol.
pub const OPERATORS: [char; 4] = ['*', '|', '(', ')'];

/// Returns true for `*`, `|`, `(` and `)`.
pub fn is_operator(c: char) -> bool {
    OPERATORS.contains(&c)
}

/// Returns true if `c` can label a non-epsilon transition. Whitespace is excluded because the
/// textual formats are whitespace-separated.
pub fn is_symbol(c: char) -> bool {
    !is_operator(c) && c != EPSILON && !c.is_whitespace()
}

/// Label of an automaton edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    /// Traversable without consuming input.
    Epsilon,
    /// Consumes exactly this symbol.
    Symbol(char),
}

impl Label {
    /// Reads a label from its serialized character, [`EPSILON`] mapping to [`Label::Epsilon`].
    pub fn from_char(c: char) -> Self {
        if c == EPSILON {
            Label::Epsilon
        } else {
            Label::Symbol(c)
        }
    }

    /// The serialized character of this label.
    pub fn as_char(self) -> char {
        match self {
            Label::Epsilon => EPSILON,
            Label::Symbol(c) => c,
        }
    }

    /// Returns the consumed symbol, if any.
    pub fn symbol(self) -> Option<char> {
        match self {
            Label::Epsilon => None,
            Label::Symbol(c) => Some(c),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_classification() {
        for op in OPERATORS {
            assert!(is_operator(op));
            assert!(!is_symbol(op));
        }
        assert!(is_symbol('a'));
        assert!(is_symbol('.'));
        assert!(is_symbol('0'));
        assert!(!is_symbol(EPSILON));
        assert!(!is_operator(EPSILON));
        assert!(!is_symbol(' '));
        assert!(!is_symbol('\t'));
    }

    #[test]
    fn test_label_chars() {
        assert_eq!(Label::from_char('#'), Label::Epsilon);
        assert_eq!(Label::from_char('x'), Label::Symbol('x'));
        assert_eq!(Label::Epsilon.to_string(), "#");
        assert_eq!(Label::Symbol('b').symbol(), Some('b'));
        assert_eq!(Label::Epsilon.symbol(), None);
    }
}

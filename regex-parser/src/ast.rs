//! Expression tree produced by the parser.

use std::fmt;

/// A parsed regular expression. Trees are built once by the parser and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Regex {
    /// Matches exactly one symbol.
    Literal(char),
    /// `head` followed by `tail`.
    Concat(Box<Regex>, Box<Regex>),
    /// Either side.
    Alternation(Box<Regex>, Box<Regex>),
    /// Zero or more repetitions.
    Closure(Box<Regex>),
}

impl Regex {
    /// `head` then `tail`.
    pub fn concat(head: Regex, tail: Regex) -> Regex {
        Regex::Concat(Box::new(head), Box::new(tail))
    }

    /// `left | right`.
    pub fn alternation(left: Regex, right: Regex) -> Regex {
        Regex::Alternation(Box::new(left), Box::new(right))
    }

    /// `inner*`. Starring a closure returns it unchanged, since `(a*)*` and `a*` match the
    /// same strings.
    pub fn closure(inner: Regex) -> Regex {
        match inner {
            Regex::Closure(_) => inner,
            _ => Regex::Closure(Box::new(inner)),
        }
    }

    /// Distinct literal symbols in left-to-right order of first appearance.
    pub fn symbols(&self) -> Vec<char> {
        let mut symbols = Vec::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols(&self, out: &mut Vec<char>) {
        match self {
            Regex::Literal(c) => {
                if !out.contains(c) {
                    out.push(*c);
                }
            }
            Regex::Concat(a, b) | Regex::Alternation(a, b) => {
                a.collect_symbols(out);
                b.collect_symbols(out);
            }
            Regex::Closure(inner) => inner.collect_symbols(out),
        }
    }

    /// Number of Thompson nodes this expression compiles to.
    pub fn node_count(&self) -> usize {
        match self {
            Regex::Literal(_) => 2,
            Regex::Concat(a, b) => a.node_count() + b.node_count(),
            Regex::Alternation(a, b) => a.node_count() + b.node_count() + 2,
            Regex::Closure(inner) => inner.node_count() + 2,
        }
    }
}

/// Canonical form: alternations are wrapped as `(a|b)`, closures as `(a)*`, and
/// concatenation is plain adjacency. Parsing the canonical form yields the same tree.
impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regex::Literal(c) => write!(f, "{c}"),
            Regex::Concat(head, tail) => write!(f, "{head}{tail}"),
            Regex::Alternation(left, right) => write!(f, "({left}|{right})"),
            Regex::Closure(inner) => write!(f, "({inner})*"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lit(c: char) -> Regex {
        Regex::Literal(c)
    }

    #[test]
    fn test_display() {
        let abc = Regex::concat(Regex::concat(lit('a'), lit('b')), lit('c'));
        assert_eq!(abc.to_string(), "abc");

        let alt = Regex::alternation(lit('1'), lit('1'));
        assert_eq!(alt.to_string(), "(1|1)");

        let star = Regex::closure(Regex::alternation(lit('0'), lit('1')));
        assert_eq!(star.to_string(), "((0|1))*");
        assert_eq!(Regex::concat(lit('x'), star).to_string(), "x((0|1))*");
    }

    #[test]
    fn test_closure_collapses() {
        let once = Regex::closure(lit('a'));
        let twice = Regex::closure(once.clone());
        assert_eq!(once, twice);
        assert_eq!(twice.to_string(), "(a)*");
    }

    #[test]
    fn test_symbols() {
        let regex = Regex::concat(
            Regex::closure(Regex::alternation(lit('b'), lit('a'))),
            Regex::concat(lit('a'), lit('c')),
        );
        assert_eq!(regex.symbols(), vec!['b', 'a', 'c']);
        assert_eq!(regex.node_count(), 12);
    }
}

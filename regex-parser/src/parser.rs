//! Recursive-descent parser.
//!
//! ```text
//! Expr   := Term ('|' Term)*
//! Term   := Atomic+
//! Atomic := Symbol Star? | '(' Expr ')' Star?
//! Star   := '*'+
//! ```
//!
//! `*` binds tightest, then concatenation, then `|`. Both binary forms are left-associative.
//!
//! Group nesting and the depth of the resulting tree are both capped at [`MAX_DEPTH`], so
//! neither the parser nor the recursive walks over [`Regex`] can exhaust the stack.

use std::iter::Peekable;
use std::str::Chars;

use gerber::{EPSILON, is_symbol};
use log::debug;

use crate::ast::Regex;

/// Deepest group nesting, and deepest expression tree, the parser accepts. Far above anything
/// that fits in a 64-state automaton.
pub const MAX_DEPTH: usize = 256;

/// What went wrong while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    /// The input has no characters.
    #[error("empty expression")]
    Empty,
    /// An operator appeared where an operand was required.
    #[error("unexpected `{0}`")]
    UnexpectedToken(char),
    /// The input stopped where an operand was required.
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    /// A `(` was never closed.
    #[error("unclosed `(`")]
    UnclosedGroup,
    /// A `)` has no matching `(`.
    #[error("unmatched `)`")]
    UnmatchedClose,
    /// Groups or operators nest deeper than [`MAX_DEPTH`].
    #[error("expression nests deeper than {} levels", MAX_DEPTH)]
    TooDeep,
    /// A character that cannot be a literal symbol.
    #[error("`{}` is reserved and cannot be a symbol", .0.escape_default())]
    ReservedSymbol(char),
}

/// A malformed expression, with the character offset where the problem was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("malformed expression at {position}: {kind}")]
pub struct ParseError {
    /// Zero-based character offset into the input.
    pub position: usize,
    /// The failure.
    pub kind: ParseErrorKind,
}

/// Parses `input` into an expression tree.
pub fn parse(input: &str) -> Result<Regex, ParseError> {
    let mut parser = Parser {
        chars: input.chars().peekable(),
        position: 0,
        nesting: 0,
    };

    if parser.peek().is_none() {
        return Err(parser.error(ParseErrorKind::Empty));
    }

    let (regex, _) = parser.parse_expr()?;
    match parser.peek() {
        None => {
            debug!("parsed `{input}` as `{regex}`");
            Ok(regex)
        }
        Some(')') => Err(parser.error(ParseErrorKind::UnmatchedClose)),
        Some(c) => Err(parser.error(ParseErrorKind::UnexpectedToken(c))),
    }
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
    nesting: usize,
}

impl Parser<'_> {
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position += 1;
        Some(c)
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            position: self.position,
            kind,
        }
    }

    /// Depth of a node whose deepest child has depth `child`.
    fn deeper(&self, child: usize) -> Result<usize, ParseError> {
        if child >= MAX_DEPTH {
            return Err(self.error(ParseErrorKind::TooDeep));
        }
        Ok(child + 1)
    }

    fn parse_expr(&mut self) -> Result<(Regex, usize), ParseError> {
        let (mut regex, mut depth) = self.parse_term()?;
        while self.peek() == Some('|') {
            self.bump();
            let (rhs, rhs_depth) = self.parse_term()?;
            depth = self.deeper(depth.max(rhs_depth))?;
            regex = Regex::alternation(regex, rhs);
        }
        Ok((regex, depth))
    }

    fn parse_term(&mut self) -> Result<(Regex, usize), ParseError> {
        let (mut regex, mut depth) = self.parse_atomic()?;
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            let (rhs, rhs_depth) = self.parse_atomic()?;
            depth = self.deeper(depth.max(rhs_depth))?;
            regex = Regex::concat(regex, rhs);
        }
        Ok((regex, depth))
    }

    fn parse_atomic(&mut self) -> Result<(Regex, usize), ParseError> {
        let (base, depth) = match self.peek() {
            None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
            Some('(') => {
                if self.nesting >= MAX_DEPTH {
                    return Err(self.error(ParseErrorKind::TooDeep));
                }
                let open = self.position;
                self.bump();
                self.nesting += 1;
                let inner = self.parse_expr()?;
                self.nesting -= 1;
                if self.bump() != Some(')') {
                    return Err(ParseError {
                        position: open,
                        kind: ParseErrorKind::UnclosedGroup,
                    });
                }
                inner
            }
            Some(c) if c == EPSILON || c.is_whitespace() => {
                return Err(self.error(ParseErrorKind::ReservedSymbol(c)));
            }
            Some(c) if is_symbol(c) => {
                self.bump();
                (Regex::Literal(c), 1)
            }
            Some(c) => return Err(self.error(ParseErrorKind::UnexpectedToken(c))),
        };

        // any run of stars is a single closure
        let mut starred = false;
        while self.peek() == Some('*') {
            self.bump();
            starred = true;
        }
        if !starred || matches!(base, Regex::Closure(_)) {
            return Ok((base, depth));
        }
        Ok((Regex::closure(base), self.deeper(depth)?))
    }
}

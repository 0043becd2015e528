#![warn(missing_docs)]

//! Finite automata for regular languages: a Thompson node graph built on a [`corrida`] arena,
//! a transition-table NFA with epsilon-closure and move, and subset construction into a DFA.
//!
//! State sets are fixed 64-bit bitsets, so every automaton is limited to 64 states.

pub mod bitset;
pub mod dfa;
pub mod error;
pub mod graph;
pub mod nfa;
pub mod symbol;
pub mod text;

pub use bitset::{StateId, StateSet};
pub use dfa::{Dfa, DfaState};
pub use error::{AutomatonError, Result};
pub use graph::{Edge, Edges, Fragment, NfaGraph, Node, NodeRef};
pub use nfa::Nfa;
pub use symbol::{EPSILON, Label, OPERATORS, is_operator, is_symbol};

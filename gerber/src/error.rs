//! Failures raised while building, reading or transforming automata.

/// Every variant is fatal for the automaton being processed; nothing is repaired or retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutomatonError {
    /// A third outgoing edge was requested on a Thompson node. Indicates a construction bug.
    #[error("structural invariant violated: node {node} already has two outgoing edges")]
    StructuralInvariantViolation {
        /// Arena index of the offending node.
        node: usize,
    },

    /// A textual automaton or state-set literal could not be read.
    #[error("malformed serialization: {0}")]
    MalformedSerialization(String),

    /// A transition, closure or header referenced a state outside `0..count`.
    #[error("state {state} is out of range for an automaton with {count} states")]
    OutOfRangeState {
        /// The referenced id.
        state: usize,
        /// Number of states in the automaton.
        count: usize,
    },

    /// The automaton is larger than the representation allows: [`crate::StateSet::CAPACITY`]
    /// for NFAs, [`crate::Dfa::MAX_STATES`] for DFA descriptions.
    #[error("{count} states exceed the capacity of {capacity}")]
    CapacityExceeded {
        /// Number of states requested.
        count: usize,
        /// Hard ceiling of the representation.
        capacity: usize,
    },
}

impl AutomatonError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        AutomatonError::MalformedSerialization(message.into())
    }
}

/// Shorthand used throughout the crate.
pub type Result<T, E = AutomatonError> = std::result::Result<T, E>;

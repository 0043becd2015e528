//! Node arena for automata built by Thompson's construction.
//!
//! Every node has at most two outgoing edges. That bound is a structural property of the
//! construction, so a third edge is reported as [`AutomatonError::StructuralInvariantViolation`]
//! instead of being stored. Nodes live in a [`Corrida`] and refer to each other by handle,
//! which keeps the back-edges created by closures free of ownership cycles.

use corrida::{Corrida, Handle};
use log::debug;
use smallvec::SmallVec;

use crate::bitset::{StateId, StateSet};
use crate::error::{AutomatonError, Result};
use crate::nfa::Nfa;
use crate::symbol::Label;

/// Handle of a node inside an [`NfaGraph`].
pub type NodeRef = Handle<Node>;

/// A labelled edge to another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// What the edge consumes.
    pub label: Label,
    /// Destination node.
    pub to: NodeRef,
}

/// The zero, one or two outgoing edges of a node, in insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Edges {
    /// Terminal node.
    #[default]
    None,
    /// A single edge.
    One(Edge),
    /// Both slots used.
    Two(Edge, Edge),
}

impl Edges {
    /// Edges in slot order.
    pub fn iter(&self) -> impl Iterator<Item = Edge> + use<> {
        let slots: [Option<Edge>; 2] = match *self {
            Edges::None => [None, None],
            Edges::One(first) => [Some(first), None],
            Edges::Two(first, second) => [Some(first), Some(second)],
        };
        slots.into_iter().flatten()
    }

    /// Number of used slots.
    pub fn len(&self) -> usize {
        match self {
            Edges::None => 0,
            Edges::One(_) => 1,
            Edges::Two(..) => 2,
        }
    }

    /// Whether no slot is used.
    pub fn is_empty(&self) -> bool {
        matches!(self, Edges::None)
    }
}

/// A node of the graph. Nodes carry no data besides their edges.
#[derive(Debug, Clone, Default)]
pub struct Node {
    edges: Edges,
}

/// A sub-automaton with exactly one entry node and one terminal accept node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    /// Entry node.
    pub start: NodeRef,
    /// Accept node; has no outgoing edges until the fragment is composed.
    pub accept: NodeRef,
}

/// Arena of Thompson nodes.
#[derive(Debug, Default)]
pub struct NfaGraph {
    nodes: Corrida<Node>,
}

impl NfaGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: Corrida::new(),
        }
    }

    /// Allocates a node without edges.
    pub fn add_node(&mut self) -> NodeRef {
        self.nodes.alloc(Node::default())
    }

    /// Adds `from --label--> to`, filling the first free slot of `from`.
    pub fn connect(&mut self, from: NodeRef, label: Label, to: NodeRef) -> Result<()> {
        let count = self.nodes.len();
        let node = self
            .nodes
            .get_mut(from)
            .ok_or(AutomatonError::OutOfRangeState {
                state: from.index(),
                count,
            })?;

        let edge = Edge { label, to };
        node.edges = match node.edges {
            Edges::None => Edges::One(edge),
            Edges::One(first) => Edges::Two(first, edge),
            Edges::Two(..) => {
                return Err(AutomatonError::StructuralInvariantViolation { node: from.index() });
            }
        };
        Ok(())
    }

    /// Outgoing edges of `node`.
    pub fn edges(&self, node: NodeRef) -> Edges {
        self.nodes.get(node).map(|n| n.edges).unwrap_or_default()
    }

    /// Whether `node` has no outgoing edges.
    pub fn is_terminal(&self, node: NodeRef) -> bool {
        self.edges(node).is_empty()
    }

    /// Every allocated node, in allocation order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef> + use<> {
        self.nodes.handles()
    }

    /// Number of allocated nodes, reachable or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node was allocated.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Assigns dense ids `0..N` to the nodes reachable from `fragment.start` and lowers the
    /// graph into a transition-table [`Nfa`].
    ///
    /// Numbering is a depth-first pre-order walk that follows the first edge slot before the
    /// second, so the start node is always state 0 and the result is reproducible.
    pub fn number(&self, fragment: Fragment) -> Result<Nfa> {
        let mut ids: Vec<Option<StateId>> = vec![None; self.nodes.len()];
        let mut order: Vec<NodeRef> = Vec::new();
        let mut stack: SmallVec<[NodeRef; 16]> = SmallVec::new();
        stack.push(fragment.start);

        while let Some(node) = stack.pop() {
            let slot = ids.get_mut(node.index()).ok_or(AutomatonError::OutOfRangeState {
                state: node.index(),
                count: self.nodes.len(),
            })?;
            if slot.is_some() {
                continue;
            }
            *slot = Some(order.len());
            order.push(node);

            // second slot below first so the first is explored first
            let edges: SmallVec<[Edge; 2]> = self.edges(node).iter().collect();
            stack.extend(edges.into_iter().rev().map(|edge| edge.to));
        }

        if order.len() > StateSet::CAPACITY {
            return Err(AutomatonError::CapacityExceeded {
                count: order.len(),
                capacity: StateSet::CAPACITY,
            });
        }

        let end = ids
            .get(fragment.accept.index())
            .copied()
            .flatten()
            .ok_or(AutomatonError::OutOfRangeState {
                state: fragment.accept.index(),
                count: order.len(),
            })?;

        let mut nfa = Nfa::new(0, end, order.len())?;
        for (from, &node) in order.iter().enumerate() {
            for edge in self.edges(node).iter() {
                // every edge target was pushed, so it has an id
                if let Some(to) = ids[edge.to.index()] {
                    nfa.add_transition(from, edge.label, to)?;
                }
            }
        }

        debug!(
            "numbered {} of {} nodes, accept state {}",
            order.len(),
            self.nodes.len(),
            end
        );
        Ok(nfa)
    }
}

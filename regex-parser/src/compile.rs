//! Thompson's construction: one fragment per tree node, composed with epsilon edges.

use gerber::{AutomatonError, Fragment, Label, Nfa, NfaGraph, StateSet};
use log::debug;

use crate::ast::Regex;

/// Compiles `regex` to a numbered NFA. State 0 is the start state.
pub fn compile(regex: &Regex) -> Result<Nfa, AutomatonError> {
    let nodes = regex.node_count();
    if nodes > StateSet::CAPACITY {
        return Err(AutomatonError::CapacityExceeded {
            count: nodes,
            capacity: StateSet::CAPACITY,
        });
    }

    let mut graph = NfaGraph::new();
    let fragment = build(&mut graph, regex)?;
    let nfa = graph.number(fragment)?;
    debug!("compiled `{regex}` into {} nfa states", nfa.len());
    Ok(nfa)
}

/// Adds the nodes for `regex` to `graph` and returns the fragment's entry and accept nodes.
/// The accept node of the returned fragment has no outgoing edges.
pub fn build(graph: &mut NfaGraph, regex: &Regex) -> Result<Fragment, AutomatonError> {
    match regex {
        Regex::Literal(c) => {
            let start = graph.add_node();
            let accept = graph.add_node();
            graph.connect(start, Label::Symbol(*c), accept)?;
            Ok(Fragment { start, accept })
        }
        Regex::Concat(head, tail) => {
            let head = build(graph, head)?;
            let tail = build(graph, tail)?;
            graph.connect(head.accept, Label::Epsilon, tail.start)?;
            Ok(Fragment {
                start: head.start,
                accept: tail.accept,
            })
        }
        Regex::Alternation(left, right) => {
            let start = graph.add_node();
            let left = build(graph, left)?;
            let right = build(graph, right)?;
            let accept = graph.add_node();
            graph.connect(start, Label::Epsilon, left.start)?;
            graph.connect(start, Label::Epsilon, right.start)?;
            graph.connect(left.accept, Label::Epsilon, accept)?;
            graph.connect(right.accept, Label::Epsilon, accept)?;
            Ok(Fragment { start, accept })
        }
        Regex::Closure(inner) => {
            let start = graph.add_node();
            let inner = build(graph, inner)?;
            let accept = graph.add_node();
            graph.connect(start, Label::Epsilon, inner.start)?;
            graph.connect(start, Label::Epsilon, accept)?;
            // repeat, then exit
            graph.connect(inner.accept, Label::Epsilon, inner.start)?;
            graph.connect(inner.accept, Label::Epsilon, accept)?;
            Ok(Fragment { start, accept })
        }
    }
}

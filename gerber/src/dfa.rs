//! Deterministic automata and the subset construction that produces them.

use std::fmt;
use std::str::FromStr;

use hashbrown::HashMap;
use log::{debug, trace};
use smallvec::{SmallVec, smallvec};

use crate::bitset::{StateId, StateSet};
use crate::error::{AutomatonError, Result};
use crate::nfa::Nfa;
use crate::symbol::EPSILON;
use crate::text::{check_range, content_lines, expect_line, header, parse_id};

type Transitions = SmallVec<[(char, StateId); 4]>;

/// A node in the DFA: accept flag, partial transition list and, when built from an NFA,
/// the set of NFA states it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfaState {
    nfa_states: Option<StateSet>,
    transitions: Transitions,
    is_accept: bool,
}

impl DfaState {
    /// The NFA states this state represents. `None` for a DFA read from text.
    pub fn nfa_states(&self) -> Option<StateSet> {
        self.nfa_states
    }

    /// Returns the accept state flag.
    pub fn is_accept(&self) -> bool {
        self.is_accept
    }

    /// Returns the next state on `symbol`, if a transition exists.
    pub fn get_transition(&self, symbol: char) -> Option<StateId> {
        self.transitions
            .iter()
            .find(|(on, _)| *on == symbol)
            .map(|&(_, to)| to)
    }

    /// Outgoing transitions in alphabet order.
    pub fn transitions(&self) -> &[(char, StateId)] {
        &self.transitions
    }

    /// Adds a transition. Returns false if `symbol` already leads somewhere else.
    fn add_transition(&mut self, symbol: char, to: StateId) -> bool {
        match self.get_transition(symbol) {
            Some(existing) => existing == to,
            None => {
                self.transitions.push((symbol, to));
                true
            }
        }
    }
}

// MARK: DFA
/// A deterministic finite automaton with dense state ids. The transition function is
/// partial: a missing transition rejects the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    start: StateId,
    symbols: Vec<char>,
    states: Vec<DfaState>,
}

impl Dfa {
    /// Largest `count:` a textual DFA description may declare. Reading allocates every
    /// declared state up front, so larger headers are rejected before allocating.
    pub const MAX_STATES: usize = 1 << 16;

    /// Subset construction.
    ///
    /// The epsilon-closure of the NFA start state becomes DFA state 0. For every unexplored
    /// state and every symbol, `closure(move(state, symbol))` is either dropped (empty),
    /// matched against an existing state with the same NFA-state set, or registered as a new
    /// state. States containing the NFA accept state are accepting. Ids are finally reassigned
    /// in depth-first pre-order from the start state, following symbols in alphabet order, so
    /// the output only depends on the NFA.
    pub fn from_nfa(nfa: &Nfa) -> Result<Dfa> {
        let symbols = nfa.symbols().to_vec();
        debug_assert!(
            !symbols.contains(&EPSILON),
            "epsilon must never be a move symbol"
        );

        let initial = nfa.epsilon_closure(nfa.start())?;
        let mut subsets: Vec<StateSet> = vec![initial];
        let mut edges: Vec<Transitions> = vec![Transitions::new()];
        let mut known: HashMap<StateSet, StateId> = HashMap::new();
        known.insert(initial, 0);
        let mut worklist: SmallVec<[StateId; 16]> = smallvec![0];

        while let Some(current) = worklist.pop() {
            for &symbol in &symbols {
                let target = nfa.epsilon_closure_of(&nfa.move_on(&subsets[current], symbol)?)?;
                if target.is_empty() {
                    continue;
                }

                let next = match known.get(&target) {
                    Some(&existing) => existing,
                    None => {
                        let created = subsets.len();
                        trace!("dfa state {created} = {target} via {current} --{symbol}-->");
                        subsets.push(target);
                        edges.push(Transitions::new());
                        known.insert(target, created);
                        worklist.push(created);
                        created
                    }
                };
                edges[current].push((symbol, next));
            }
        }

        // Renumber by reachability so ids do not depend on worklist order.
        let mut renumbered: Vec<Option<StateId>> = vec![None; subsets.len()];
        let mut order: Vec<StateId> = Vec::with_capacity(subsets.len());
        let mut stack: SmallVec<[StateId; 16]> = smallvec![0];
        while let Some(raw) = stack.pop() {
            if renumbered[raw].is_some() {
                continue;
            }
            renumbered[raw] = Some(order.len());
            order.push(raw);
            stack.extend(edges[raw].iter().rev().map(|&(_, to)| to));
        }

        let mut states = Vec::with_capacity(order.len());
        for &raw in &order {
            let transitions = edges[raw]
                .iter()
                .filter_map(|&(symbol, to)| renumbered[to].map(|id| (symbol, id)))
                .collect();
            states.push(DfaState {
                nfa_states: Some(subsets[raw]),
                transitions,
                is_accept: subsets[raw].contains(nfa.end()),
            });
        }

        debug!(
            "subset construction: {} nfa states -> {} dfa states over {:?}",
            nfa.len(),
            states.len(),
            symbols
        );

        Ok(Dfa {
            start: 0,
            symbols,
            states,
        })
    }

    /// The start state.
    pub fn start(&self) -> StateId {
        self.start
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the DFA has no states. Never true for a constructed DFA.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All states, indexed by id.
    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    /// The state with id `state`.
    pub fn state(&self, state: StateId) -> Option<&DfaState> {
        self.states.get(state)
    }

    /// The alphabet in first-appearance order.
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Returns the next state from `state` on `symbol`, if it exists.
    pub fn transition(&self, state: StateId, symbol: char) -> Option<StateId> {
        self.states.get(state)?.get_transition(symbol)
    }

    /// Ids of the accepting states, ascending.
    pub fn accepting(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, state)| state.is_accept)
            .map(|(id, _)| id)
    }

    /// Tests the provided input sequence on an iterator, returning true if the DFA ends at an accept state.
    pub fn simulate_iter(&self, input: impl IntoIterator<Item = char>) -> bool {
        let mut cur = self.start;
        for symbol in input {
            match self.transition(cur, symbol) {
                Some(next) => cur = next,
                None => return false,
            }
        }
        self.states.get(cur).is_some_and(DfaState::is_accept)
    }

    /// Tests the provided input sequence, returning true if the DFA ends at an accept state.
    pub fn simulate_slice(&self, input: &[char]) -> bool {
        self.simulate_iter(input.iter().copied())
    }
}

/// Reads the textual description:
///
/// ```text
/// start: <int>
/// end: <comma-separated ints>
/// count: <int>
/// <from>--<symbol>--><to>
/// ```
impl FromStr for Dfa {
    type Err = AutomatonError;

    fn from_str(input: &str) -> Result<Self> {
        let mut lines = content_lines(input);

        let (line, text) = expect_line(&mut lines, "start")?;
        let start = parse_id(header(text, "start", line)?, line)?;
        let (end_line, text) = expect_line(&mut lines, "end")?;
        let ends = header(text, "end", end_line)?;
        let (line, text) = expect_line(&mut lines, "count")?;
        let count = parse_id(header(text, "count", line)?, line)?;
        if count > Dfa::MAX_STATES {
            return Err(AutomatonError::CapacityExceeded {
                count,
                capacity: Dfa::MAX_STATES,
            });
        }

        check_range(start, count)?;
        let mut states = vec![
            DfaState {
                nfa_states: None,
                transitions: Transitions::new(),
                is_accept: false,
            };
            count
        ];

        let ends = ends.strip_suffix(',').unwrap_or(ends);
        if !ends.trim().is_empty() {
            for id in ends.split(',') {
                let id = check_range(parse_id(id, end_line)?, count)?;
                states[id].is_accept = true;
            }
        }

        let mut symbols = Vec::new();
        for (line, text) in lines {
            let (from, symbol, to) = split_arrow(text).ok_or_else(|| {
                AutomatonError::malformed(format!(
                    "line {line}: expected `<from>--<symbol>--><to>`, found `{text}`"
                ))
            })?;
            if symbol == EPSILON || symbol.is_whitespace() {
                return Err(AutomatonError::malformed(format!(
                    "line {line}: `{symbol}` cannot label a dfa transition"
                )));
            }

            let from = check_range(parse_id(from, line)?, count)?;
            let to = check_range(parse_id(to, line)?, count)?;
            if !states[from].add_transition(symbol, to) {
                return Err(AutomatonError::malformed(format!(
                    "line {line}: state {from} already has a different transition on `{symbol}`"
                )));
            }
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }

        debug!("read dfa with {count} states over {symbols:?}");
        Ok(Dfa {
            start,
            symbols,
            states,
        })
    }
}

/// Splits `<from>--<symbol>--><to>`. The symbol may itself be `-`.
fn split_arrow(text: &str) -> Option<(&str, char, &str)> {
    let (from, rest) = text.split_once("--")?;
    let mut chars = rest.chars();
    let symbol = chars.next()?;
    let to = chars.as_str().strip_prefix("-->")?;
    Some((from, symbol, to))
}

impl fmt::Display for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start: {}", self.start)?;
        let ends: Vec<String> = self.accepting().map(|id| id.to_string()).collect();
        writeln!(f, "end: {}", ends.join(","))?;
        writeln!(f, "count: {}", self.len())?;
        for (from, state) in self.states.iter().enumerate() {
            for &(symbol, to) in &state.transitions {
                writeln!(f, "{from}--{symbol}-->{to}")?;
            }
        }
        Ok(())
    }
}

// MARK: Tests
#[cfg(test)]
mod test {
    use super::*;
    use crate::nfa::test::TEXTBOOK;
    use crate::symbol::Label;
    use indoc::indoc;

    fn set(states: &[StateId]) -> StateSet {
        states.iter().copied().collect()
    }

    fn textbook_dfa() -> Dfa {
        let nfa: Nfa = TEXTBOOK.parse().unwrap();
        Dfa::from_nfa(&nfa).unwrap()
    }

    #[test]
    fn test_textbook_subsets() {
        let dfa = textbook_dfa();
        let subsets: Vec<StateSet> = dfa
            .states()
            .iter()
            .map(|state| state.nfa_states().unwrap())
            .collect();

        assert_eq!(
            subsets,
            vec![
                set(&[0]),
                set(&[1, 2, 3, 4, 6, 9]),
                set(&[3, 4, 5, 6, 8, 9]),
                set(&[3, 4, 6, 7, 8, 9]),
            ]
        );
        assert_eq!(dfa.start(), 0);
        assert_eq!(dfa.accepting().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_textbook_output() {
        let expected = indoc! {"
            start: 0
            end: 1,2,3
            count: 4
            0--a-->1
            1--b-->2
            1--c-->3
            2--b-->2
            2--c-->3
            3--b-->2
            3--c-->3
        "};
        assert_eq!(textbook_dfa().to_string(), expected);
    }

    #[test]
    fn test_deterministic_and_distinct() {
        let dfa = textbook_dfa();
        for state in dfa.states() {
            for &symbol in dfa.symbols() {
                let count = state.transitions().iter().filter(|(on, _)| *on == symbol).count();
                assert!(count <= 1);
            }
        }
        for (i, a) in dfa.states().iter().enumerate() {
            for b in &dfa.states()[i + 1..] {
                assert_ne!(a.nfa_states(), b.nfa_states());
            }
        }
    }

    #[test]
    fn test_reproducible() {
        let first = textbook_dfa();
        let second = textbook_dfa();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_simulate() {
        let dfa = textbook_dfa();
        assert!(dfa.simulate_slice(&['a']));
        assert!(dfa.simulate_iter("abccb".chars()));
        assert!(!dfa.simulate_iter("".chars()));
        assert!(!dfa.simulate_iter("aa".chars()));
        assert!(!dfa.simulate_iter("b".chars()));
    }

    #[test]
    fn test_start_is_closure_of_declared_start() {
        // start 2, 2 -#-> 0, 0 -x-> 1
        let mut nfa = Nfa::new(2, 1, 3).unwrap();
        nfa.add_transition(2, Label::Epsilon, 0).unwrap();
        nfa.add_transition(0, Label::Symbol('x'), 1).unwrap();

        let dfa = Dfa::from_nfa(&nfa).unwrap();
        assert_eq!(dfa.state(0).unwrap().nfa_states(), Some(set(&[0, 2])));
        assert!(dfa.simulate_iter("x".chars()));
        assert!(!dfa.simulate_iter("".chars()));
    }

    #[test]
    fn test_no_transitions() {
        let nfa = Nfa::new(0, 0, 1).unwrap();
        let dfa = Dfa::from_nfa(&nfa).unwrap();
        assert_eq!(dfa.to_string(), "start: 0\nend: 0\ncount: 1\n");
        assert!(dfa.simulate_iter("".chars()));
    }

    #[test]
    fn test_parse() {
        let text = textbook_dfa().to_string();
        let parsed: Dfa = text.parse().unwrap();
        assert_eq!(parsed.to_string(), text);
        assert_eq!(parsed.state(1).unwrap().nfa_states(), None);
        assert!(parsed.simulate_iter("acb".chars()));
        assert!(!parsed.simulate_iter("ca".chars()));
    }

    #[test]
    fn test_parse_dash_symbol_and_empty_end() {
        let dfa: Dfa = "start: 0\nend: \ncount: 2\n0----->1\n".parse().unwrap();
        assert_eq!(dfa.transition(0, '-'), Some(1));
        assert_eq!(dfa.accepting().count(), 0);
        assert!(!dfa.simulate_iter("-".chars()));
    }

    #[test]
    fn test_parse_oversized_count() {
        for count in [usize::MAX, Dfa::MAX_STATES + 1] {
            let input = format!("start: 0\nend: 0\ncount: {count}\n");
            assert_eq!(
                input.parse::<Dfa>(),
                Err(AutomatonError::CapacityExceeded {
                    count,
                    capacity: Dfa::MAX_STATES
                })
            );
        }
        let largest = format!("start: 0\nend: 0\ncount: {}\n", Dfa::MAX_STATES);
        assert_eq!(largest.parse::<Dfa>().unwrap().len(), Dfa::MAX_STATES);
    }

    #[test]
    fn test_parse_errors() {
        let malformed = [
            "start: 0\nend: 1\ncount: 2\n0-a->1\n",
            "start: 0\nend: 1\ncount: 2\n0--#-->1\n",
            "start: 0\nend: 1\ncount: 2\n0--a-->1\n0--a-->0\n",
            "start: 0\nend: x\ncount: 2\n",
            "start: 0\ncount: 2\n",
        ];
        for input in malformed {
            assert!(
                matches!(input.parse::<Dfa>(), Err(AutomatonError::MalformedSerialization(_))),
                "{input}"
            );
        }
        assert_eq!(
            "start: 0\nend: 1\ncount: 2\n0--a-->2\n".parse::<Dfa>(),
            Err(AutomatonError::OutOfRangeState { state: 2, count: 2 })
        );
        assert_eq!(
            "start: 0\nend: 3\ncount: 2\n".parse::<Dfa>(),
            Err(AutomatonError::OutOfRangeState { state: 3, count: 2 })
        );
        // repeating an identical transition is harmless
        assert!("start: 0\nend: 1\ncount: 2\n0--a-->1\n0--a-->1\n".parse::<Dfa>().is_ok());
    }
}

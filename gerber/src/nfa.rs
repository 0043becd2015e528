//! Transition-table NFA: the serialized form consumed by subset construction.
//!
//! States are dense ids `0..len`. Every state maps each [`Label`] to the [`StateSet`] of its
//! destinations. The alphabet never contains epsilon: epsilon only exists as [`Label::Epsilon`].

use std::fmt;
use std::str::FromStr;

use hashbrown::HashMap;
use log::debug;
use smallvec::SmallVec;

use crate::bitset::{StateId, StateSet};
use crate::error::{AutomatonError, Result};
use crate::symbol::{EPSILON, Label};
use crate::text::{check_range, content_lines, expect_line, header, parse_id};

/// Outgoing transitions of one NFA state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct NfaState {
    to: HashMap<Label, StateSet>,
}

/// A non-deterministic finite automaton with a single start and a single accepting state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    start: StateId,
    end: StateId,
    symbols: Vec<char>,
    states: Vec<NfaState>,
}

impl Nfa {
    /// Creates an NFA with `count` states and no transitions.
    pub fn new(start: StateId, end: StateId, count: usize) -> Result<Self> {
        if count > StateSet::CAPACITY {
            return Err(AutomatonError::CapacityExceeded {
                count,
                capacity: StateSet::CAPACITY,
            });
        }
        check_range(start, count)?;
        check_range(end, count)?;

        Ok(Self {
            start,
            end,
            symbols: Vec::new(),
            states: vec![NfaState::default(); count],
        })
    }

    /// Adds `from --label--> to`. Symbols join the alphabet in first-appearance order.
    pub fn add_transition(&mut self, from: StateId, label: Label, to: StateId) -> Result<()> {
        check_range(from, self.len())?;
        check_range(to, self.len())?;

        if let Label::Symbol(c) = label {
            if c == EPSILON {
                return Err(AutomatonError::malformed(format!(
                    "`{EPSILON}` is reserved for epsilon and cannot be a symbol"
                )));
            }
            if !self.symbols.contains(&c) {
                self.symbols.push(c);
            }
        }
        self.states[from].to.entry(label).or_default().insert(to);
        Ok(())
    }

    /// The single start state.
    pub fn start(&self) -> StateId {
        self.start
    }

    /// The single accepting state.
    pub fn end(&self) -> StateId {
        self.end
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the automaton has no states. Never true for a constructed NFA, whose
    /// start state must exist.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The alphabet, excluding epsilon, in first-appearance order.
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Destinations of `state` under `label`. Absent entries are the empty set.
    pub fn transitions(&self, state: StateId, label: Label) -> StateSet {
        self.states
            .get(state)
            .and_then(|s| s.to.get(&label))
            .copied()
            .unwrap_or_default()
    }

    /// Every transition as `(from, label, to)`, ordered by source state, then alphabet
    /// order with epsilon last, then ascending destination.
    pub fn edges(&self) -> impl Iterator<Item = (StateId, Label, StateId)> + '_ {
        let labels: Vec<Label> = self
            .symbols
            .iter()
            .map(|&c| Label::Symbol(c))
            .chain(std::iter::once(Label::Epsilon))
            .collect();

        (0..self.len()).flat_map(move |from| {
            labels.clone().into_iter().flat_map(move |label| {
                self.transitions(from, label)
                    .into_iter()
                    .map(move |to| (from, label, to))
            })
        })
    }

    /// States reachable from `state` through zero or more epsilon edges.
    pub fn epsilon_closure(&self, state: StateId) -> Result<StateSet> {
        check_range(state, self.len())?;
        Ok(self.close(StateSet::singleton(state)))
    }

    /// States reachable from any member of `seeds` through zero or more epsilon edges.
    pub fn epsilon_closure_of(&self, seeds: &StateSet) -> Result<StateSet> {
        self.check_members(seeds)?;
        Ok(self.close(*seeds))
    }

    /// Union of the `symbol` transitions of every member of `states`. Not epsilon-closed.
    pub fn move_on(&self, states: &StateSet, symbol: char) -> Result<StateSet> {
        self.check_members(states)?;
        Ok(self.step(states, symbol))
    }

    /// Tests the provided input sequence, returning true if some path ends in the accepting state.
    pub fn simulate_iter(&self, input: impl IntoIterator<Item = char>) -> bool {
        let mut current = self.close(StateSet::singleton(self.start));
        for symbol in input {
            current = self.close(self.step(&current, symbol));
            if current.is_empty() {
                return false;
            }
        }
        current.contains(self.end)
    }

    /// Tests the provided input sequence, returning true if some path ends in the accepting state.
    pub fn simulate_slice(&self, input: &[char]) -> bool {
        self.simulate_iter(input.iter().copied())
    }

    /// Reads the transition-table layout:
    ///
    /// ```text
    /// <start>
    /// <end>
    /// <total>
    /// <symbols>                  e.g. `ab#`, one column per character
    /// <set> <set> ...            one row per state, one `{..}` literal per column
    /// ```
    ///
    /// Only blank lines are skipped here: the symbol row may legitimately start with `#`.
    pub fn from_table_str(input: &str) -> Result<Self> {
        let mut lines = input
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (line, text) = expect_line(&mut lines, "start")?;
        let start = parse_id(text, line)?;
        let (line, text) = expect_line(&mut lines, "end")?;
        let end = parse_id(text, line)?;
        let (line, text) = expect_line(&mut lines, "total")?;
        let count = parse_id(text, line)?;

        let (line, text) = expect_line(&mut lines, "symbols")?;
        let columns: Vec<Label> = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(Label::from_char)
            .collect();
        for (i, label) in columns.iter().enumerate() {
            if columns[..i].contains(label) {
                return Err(AutomatonError::malformed(format!(
                    "line {line}: symbol `{label}` appears twice"
                )));
            }
        }

        let mut nfa = Nfa::new(start, end, count)?;
        for from in 0..count {
            let (line, text) = expect_line(&mut lines, "state row")?;
            let cells: Vec<&str> = text.split_whitespace().collect();
            if cells.len() != columns.len() {
                return Err(AutomatonError::malformed(format!(
                    "line {line}: expected {} state sets, found {}",
                    columns.len(),
                    cells.len()
                )));
            }
            for (&label, cell) in columns.iter().zip(cells) {
                let targets: StateSet = cell.parse().map_err(|err| match err {
                    AutomatonError::MalformedSerialization(message) => {
                        AutomatonError::malformed(format!("line {line}: {message}"))
                    }
                    other => other,
                })?;
                for to in &targets {
                    nfa.add_transition(from, label, to)?;
                }
            }
        }

        if let Some((line, _)) = lines.next() {
            return Err(AutomatonError::malformed(format!(
                "line {line}: more rows than the {count} declared states"
            )));
        }

        // Columns declared without any transition still belong to the alphabet.
        for label in columns {
            if let Label::Symbol(c) = label {
                if !nfa.symbols.contains(&c) {
                    nfa.symbols.push(c);
                }
            }
        }

        debug!("read tabular nfa with {} states over {:?}", nfa.len(), nfa.symbols);
        Ok(nfa)
    }

    fn close(&self, seeds: StateSet) -> StateSet {
        let mut closure = seeds;
        let mut worklist: SmallVec<[StateId; 16]> = seeds.iter().collect();

        while let Some(state) = worklist.pop() {
            for next in &self.transitions(state, Label::Epsilon) {
                if closure.insert(next) {
                    worklist.push(next);
                }
            }
        }
        closure
    }

    fn step(&self, states: &StateSet, symbol: char) -> StateSet {
        let mut reached = StateSet::new();
        for state in states {
            reached |= self.transitions(state, Label::Symbol(symbol));
        }
        reached
    }

    fn check_members(&self, states: &StateSet) -> Result<()> {
        match states.last() {
            Some(state) if state >= self.len() => Err(AutomatonError::OutOfRangeState {
                state,
                count: self.len(),
            }),
            _ => Ok(()),
        }
    }
}

/// Reads the textual description:
///
/// ```text
/// start: <int>
/// end: <int>
/// count: <int>
/// <from> <to> <symbol>      `#` is epsilon
/// ```
impl FromStr for Nfa {
    type Err = AutomatonError;

    fn from_str(input: &str) -> Result<Self> {
        let mut lines = content_lines(input);

        let (line, text) = expect_line(&mut lines, "start")?;
        let start = parse_id(header(text, "start", line)?, line)?;
        let (line, text) = expect_line(&mut lines, "end")?;
        let end = parse_id(header(text, "end", line)?, line)?;
        let (line, text) = expect_line(&mut lines, "count")?;
        let count = parse_id(header(text, "count", line)?, line)?;

        let mut nfa = Nfa::new(start, end, count)?;
        for (line, text) in lines {
            let fields: Vec<&str> = text.split_whitespace().collect();
            let [from, to, symbol] = fields[..] else {
                return Err(AutomatonError::malformed(format!(
                    "line {line}: expected `<from> <to> <symbol>`, found `{text}`"
                )));
            };

            let mut chars = symbol.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return Err(AutomatonError::malformed(format!(
                    "line {line}: symbol `{symbol}` must be a single character"
                )));
            };

            nfa.add_transition(parse_id(from, line)?, Label::from_char(c), parse_id(to, line)?)?;
        }

        debug!("read nfa with {} states over {:?}", nfa.len(), nfa.symbols);
        Ok(nfa)
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start: {}", self.start)?;
        writeln!(f, "end: {}", self.end)?;
        writeln!(f, "count: {}", self.len())?;
        for (from, label, to) in self.edges() {
            writeln!(f, "{from} {to} {label}")?;
        }
        Ok(())
    }
}

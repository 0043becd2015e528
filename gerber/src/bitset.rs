//! Fixed-capacity set of automaton state ids, one bit per state.
//!
//! The capacity is the width of a machine word (64). This is a hard ceiling of the
//! representation: automata that need more states are rejected with
//! [`AutomatonError::CapacityExceeded`] rather than silently widened.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use crate::error::AutomatonError;

/// Dense integer id of an automaton state.
pub type StateId = usize;

/// A set of state ids below [`StateSet::CAPACITY`].
///
/// Equality and hashing are set-based, which makes a `StateSet` usable as the
/// deduplication key of subset construction.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateSet {
    bits: u64,
}

impl StateSet {
    /// Largest number of distinct states a set can hold.
    pub const CAPACITY: usize = u64::BITS as usize;

    /// The empty set.
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// A set holding only `state`.
    pub fn singleton(state: StateId) -> Self {
        let mut set = Self::new();
        set.insert(state);
        set
    }

    /// Every id in `0..count`.
    ///
    /// # Panics
    /// If `count` exceeds [`StateSet::CAPACITY`].
    pub fn universe(count: usize) -> Self {
        assert!(count <= Self::CAPACITY, "state count {count} exceeds capacity");
        match count {
            0 => Self::new(),
            Self::CAPACITY => Self { bits: u64::MAX },
            _ => Self {
                bits: (1u64 << count) - 1,
            },
        }
    }

    /// Adds `state`, returning whether it was newly inserted.
    ///
    /// # Panics
    /// If `state` is not below [`StateSet::CAPACITY`]. Automata validate their state
    /// count on construction, so ids coming from an [`crate::Nfa`] never trip this.
    pub fn insert(&mut self, state: StateId) -> bool {
        assert!(
            state < Self::CAPACITY,
            "state {state} does not fit in a {}-state set",
            Self::CAPACITY
        );
        let was_absent = !self.contains(state);
        self.bits |= 1u64 << state;
        was_absent
    }

    /// Removes `state`, returning whether it was present.
    pub fn remove(&mut self, state: StateId) -> bool {
        let was_present = self.contains(state);
        if was_present {
            self.bits &= !(1u64 << state);
        }
        was_present
    }

    /// Membership test. Ids past the capacity are never members.
    pub fn contains(&self, state: StateId) -> bool {
        state < Self::CAPACITY && self.bits & (1u64 << state) != 0
    }

    /// Returns the union of both sets.
    pub fn union(&self, other: &StateSet) -> StateSet {
        StateSet {
            bits: self.bits | other.bits,
        }
    }

    /// In-place union.
    pub fn union_with(&mut self, other: &StateSet) {
        self.bits |= other.bits;
    }

    /// Whether the two sets share a member.
    pub fn intersects(&self, other: &StateSet) -> bool {
        self.bits & other.bits != 0
    }

    /// Whether every member of `self` is in `other`.
    pub fn is_subset(&self, other: &StateSet) -> bool {
        self.bits & !other.bits == 0
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Smallest member.
    pub fn first(&self) -> Option<StateId> {
        (!self.is_empty()).then(|| self.bits.trailing_zeros() as StateId)
    }

    /// Largest member.
    pub fn last(&self) -> Option<StateId> {
        (!self.is_empty()).then(|| (Self::CAPACITY - 1) - self.bits.leading_zeros() as StateId)
    }

    /// Members in ascending order.
    pub fn iter(&self) -> Iter {
        Iter { rest: self.bits }
    }
}

/// Ascending iterator over a [`StateSet`].
#[derive(Clone)]
pub struct Iter {
    rest: u64,
}

impl Iterator for Iter {
    type Item = StateId;

    fn next(&mut self) -> Option<StateId> {
        if self.rest == 0 {
            return None;
        }
        let state = self.rest.trailing_zeros() as StateId;
        // clear lowest set bit
        self.rest &= self.rest - 1;
        Some(state)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.rest.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Iter {}

impl IntoIterator for StateSet {
    type Item = StateId;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        self.iter()
    }
}

impl IntoIterator for &StateSet {
    type Item = StateId;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        self.iter()
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        let mut set = StateSet::new();
        for state in iter {
            set.insert(state);
        }
        set
    }
}

impl Extend<StateId> for StateSet {
    fn extend<I: IntoIterator<Item = StateId>>(&mut self, iter: I) {
        for state in iter {
            self.insert(state);
        }
    }
}

impl BitOr for StateSet {
    type Output = StateSet;

    fn bitor(self, rhs: StateSet) -> StateSet {
        self.union(&rhs)
    }
}

impl BitOrAssign for StateSet {
    fn bitor_assign(&mut self, rhs: StateSet) {
        self.union_with(&rhs);
    }
}

/// Reads `{n1,n2,...}`. Member order is irrelevant, whitespace around members and a
/// single trailing comma are accepted.
impl FromStr for StateSet {
    type Err = AutomatonError;

    fn from_str(literal: &str) -> Result<Self, Self::Err> {
        let trimmed = literal.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| {
                AutomatonError::malformed(format!("state set `{trimmed}` must be wrapped in braces"))
            })?;

        let mut set = StateSet::new();
        let inner = inner.trim();
        if inner.is_empty() {
            return Ok(set);
        }

        let inner = inner.strip_suffix(',').unwrap_or(inner);
        for item in inner.split(',') {
            let item = item.trim();
            let state: StateId = item.parse().map_err(|_| {
                AutomatonError::malformed(format!("`{item}` in `{trimmed}` is not a state id"))
            })?;
            if state >= StateSet::CAPACITY {
                return Err(AutomatonError::CapacityExceeded {
                    count: state + 1,
                    capacity: StateSet::CAPACITY,
                });
            }
            set.insert(state);
        }
        Ok(set)
    }
}

impl fmt::Display for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, state) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{state}")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#![warn(missing_docs)]

//! Typed Index Arena
//!
//! Values of one type are pushed into a single growable block and addressed by [`Handle`]s.
//! Handles are plain indices: they are `Copy`, carry no lifetime, and can freely form cycles
//! (back-edges in a graph are just handles pointing at earlier fighters), which sidesteps
//! the self-referential borrow problems of reference-based arenas.
//!
//! Nothing is ever removed, so a handle stays valid for as long as its arena lives.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// An index into a [`Corrida`], typed by the value it points at.
pub struct Handle<F> {
    index: usize,
    _boo: PhantomData<fn() -> F>,
}

impl<F> Handle<F> {
    /// Builds a handle from a raw index. The index is only meaningful for the arena it came from.
    pub const fn from_index(index: usize) -> Self {
        Self {
            index,
            _boo: PhantomData,
        }
    }

    /// Position of the fighter in allocation order.
    pub const fn index(self) -> usize {
        self.index
    }
}

// Manual impls so that `F` itself does not need to be Clone/Eq/Hash.
impl<F> Clone for Handle<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for Handle<F> {}

impl<F> PartialEq for Handle<F> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<F> Eq for Handle<F> {}

impl<F> PartialOrd for Handle<F> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<F> Ord for Handle<F> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl<F> Hash for Handle<F> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<F> fmt::Debug for Handle<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// One time use arena.
/// Useful for many values with the same lifetime that reference each other, such as graph nodes.
/// Values are only dropped when the whole arena is dropped.
pub struct Corrida<F> {
    fighters: Vec<F>,
}

impl<F> Corrida<F> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            fighters: Vec::new(),
        }
    }

    /// Creates an empty arena with room for `capacity` fighters before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fighters: Vec::with_capacity(capacity),
        }
    }

    /// Moves the value into the arena and returns its handle.
    pub fn alloc(&mut self, fighter: F) -> Handle<F> {
        let handle = Handle::from_index(self.fighters.len());
        self.fighters.push(fighter);
        handle
    }

    /// Returns the fighter behind `handle`, or `None` if the handle is past the end of this arena.
    pub fn get(&self, handle: Handle<F>) -> Option<&F> {
        self.fighters.get(handle.index())
    }

    /// Mutable version of [`Corrida::get`].
    pub fn get_mut(&mut self, handle: Handle<F>) -> Option<&mut F> {
        self.fighters.get_mut(handle.index())
    }

    /// Number of fighters allocated so far.
    pub fn len(&self) -> usize {
        self.fighters.len()
    }

    /// Whether nothing has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.fighters.is_empty()
    }

    /// Iterates handles and fighters in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<F>, &F)> + '_ {
        self.fighters
            .iter()
            .enumerate()
            .map(|(index, fighter)| (Handle::from_index(index), fighter))
    }

    /// Iterates every handle in allocation order.
    pub fn handles(&self) -> impl Iterator<Item = Handle<F>> + use<F> {
        (0..self.fighters.len()).map(Handle::from_index)
    }
}

impl<F> Default for Corrida<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: fmt::Debug> fmt::Debug for Corrida<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<F> Index<Handle<F>> for Corrida<F> {
    type Output = F;

    fn index(&self, handle: Handle<F>) -> &F {
        &self.fighters[handle.index()]
    }
}

impl<F> IndexMut<Handle<F>> for Corrida<F> {
    fn index_mut(&mut self, handle: Handle<F>) -> &mut F {
        &mut self.fighters[handle.index()]
    }
}

use std::fmt;

/// Handle of a record in a [`SpatialIndex`](super::SpatialIndex) arena.
///
/// The generation changes whenever a slot is reused, so a handle kept past
/// [`take_record`](super::SpatialIndex::take_record) never aliases a newer
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl RecordId {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Candidate pair from the broad phase. `a` sits at the same node as `b` or
/// at a descendant of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    pub a: RecordId,
    pub b: RecordId,
}

impl CollisionPair {
    pub fn contains(&self, id: RecordId) -> bool {
        self.a == id || self.b == id
    }

    pub fn other(&self, id: RecordId) -> Option<RecordId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }

    /// Same pair with the smaller handle first.
    pub fn ordered(self) -> Self {
        if self.a <= self.b {
            self
        } else {
            Self {
                a: self.b,
                b: self.a,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Cell {
    /// Most recently registered member.
    pub(crate) head: Option<u32>,
    pub(crate) len: u32,
}

/// Intrusive list node. Links are arena slot indices of live records.
#[derive(Debug)]
pub(crate) struct Record<T> {
    pub(crate) payload: T,
    pub(crate) cell: Option<u32>,
    pub(crate) prev: Option<u32>,
    pub(crate) next: Option<u32>,
}

impl<T> Record<T> {
    pub(crate) fn detached(payload: T) -> Self {
        Self {
            payload,
            cell: None,
            prev: None,
            next: None,
        }
    }
}

#![forbid(unsafe_code)]

//! Bounded FIFO of recent values.

use std::collections::VecDeque;
use std::fmt;

/// Keeps the last `capacity` values pushed; older ones are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugRing<T> {
    capacity: usize,
    values: VecDeque<T>,
}

impl<T> DebugRing<T> {
    /// Ring holding at most `capacity` values. A zero capacity keeps nothing.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Append `value`, dropping the oldest entry when full.
    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Maximum number of retained values.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.values.iter()
    }

    /// Most recent value.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.values.back()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl<T: fmt::Display> fmt::Display for DebugRing<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}

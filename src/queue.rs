//! A small double-ended list.

use std::collections::VecDeque;

/// A generic double-ended list.
///
/// Decoding uses it as a stack of scope start offsets, but elements can be
/// pushed and popped from either end.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Queue<T> {
    items: VecDeque<T>,
}

impl<T> Queue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Pushes an item to the front of the queue.
    pub fn push_front(&mut self, item: T) {
        self.items.push_front(item);
    }

    /// Pushes an item to the back of the queue.
    pub fn push_back(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Removes and returns the item at the front of the queue.
    pub fn pop_front(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Removes and returns the item at the back of the queue.
    pub fn pop_back(&mut self) -> Option<T> {
        self.items.pop_back()
    }

    /// Returns the item at the front of the queue without removing it.
    pub fn peek_front(&self) -> Option<&T> {
        self.items.front()
    }

    /// Returns the item at the back of the queue without removing it.
    pub fn peek_back(&self) -> Option<&T> {
        self.items.back()
    }

    /// Returns the number of items in the queue.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the queue holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns an iterator over the items from front to back.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

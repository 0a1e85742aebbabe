//! Bounded LIFO history used for camera navigation and removal undo.
//!
//! Owned by the engine and handed to whoever needs it; there is no global
//! history state.

use std::collections::VecDeque;

/// A stack that forgets its oldest entry once `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct BoundedStack<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedStack<T> {
    /// Create an empty stack. A zero capacity stores nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Push an entry, evicting the oldest one when full.
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut stack = BoundedStack::new(4);
        stack.push(1);
        stack.push(2);
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_evicts_oldest() {
        let mut stack = BoundedStack::new(2);
        stack.push(1);
        stack.push(2);
        stack.push(3);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_zero_capacity() {
        let mut stack = BoundedStack::new(0);
        stack.push("a");
        assert!(stack.is_empty());
    }
}

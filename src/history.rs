// Copyright (c) 2022 Frank Fischer <frank-fischer@shadow-soft.de>
//
// This program is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see  <http://www.gnu.org/licenses/>
//

//! A bounded undo stack.

use std::collections::VecDeque;

/// A stack that forgets its oldest items once it is full.
///
/// Items are pushed and popped at the top. If a push exceeds the capacity
/// the item at the bottom is dropped.
///
/// # Example
///
/// ```
/// use flowscope::history::History;
///
/// let mut h = History::new(2);
/// h.push(1);
/// h.push(2);
/// h.push(3);
/// assert_eq!(h.len(), 2);
/// assert_eq!(h.pop(), Some(3));
/// assert_eq!(h.pop(), Some(2));
/// assert_eq!(h.pop(), None);
/// ```
#[derive(Debug, Clone)]
pub struct History<I> {
    items: VecDeque<I>,
    capacity: usize,
}

impl<I> History<I> {
    /// Create an empty history holding at most `capacity` items.
    pub fn new(capacity: usize) -> Self {
        History {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear()
    }

    /// Push a new item on top, evicting the bottom item if necessary.
    pub fn push(&mut self, item: I) {
        if self.capacity == 0 {
            return;
        }
        self.items.push_back(item);
        while self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    /// Remove and return the top item.
    pub fn pop(&mut self) -> Option<I> {
        self.items.pop_back()
    }

    pub fn top(&self) -> Option<&I> {
        self.items.back()
    }
}

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

//! One-to-many notification of typed snapshots.
//!
//! An [`Observable`] only keeps weak references to its observers. Dropping
//! an observer is therefore equivalent to unsubscribing it (without the
//! `on_unsubscribe` callback).
//!
//! # Example
//!
//! ```
//! use flowscope::observer::{Observable, Observer};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! #[derive(Default)]
//! struct Sum(i32);
//!
//! impl Observer<i32> for Sum {
//!     fn on_notify(&mut self, data: &i32) {
//!         self.0 += *data;
//!     }
//! }
//!
//! let sum = Rc::new(RefCell::new(Sum::default()));
//! let mut observable = Observable::new();
//! observable.subscribe(&sum, &0).unwrap();
//! observable.notify(&3);
//! observable.notify_with(|| 4);
//! assert_eq!(sum.borrow().0, 7);
//! ```

use crate::error::{Error, Result};

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Receiver of notifications of type `D`.
pub trait Observer<D> {
    /// Called once on subscription with the current state.
    fn on_subscribe(&mut self, _data: &D) {}

    /// Called for every notification.
    fn on_notify(&mut self, data: &D);

    /// Called when the observer is unsubscribed or the observable is dropped.
    fn on_unsubscribe(&mut self) {}
}

/// Handle of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

struct Subscriber<D> {
    id: SubscriberId,
    observer: Weak<RefCell<dyn Observer<D>>>,
}

/// A list of observers of data `D`.
pub struct Observable<D> {
    subscribers: Vec<Subscriber<D>>,
    next_id: usize,
}

impl<D> Default for Observable<D> {
    fn default() -> Self {
        Observable::new()
    }
}

impl<D> Observable<D> {
    pub fn new() -> Self {
        Observable {
            subscribers: vec![],
            next_id: 0,
        }
    }

    /// Return the number of live subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.iter().filter(|s| s.observer.strong_count() > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribe a new observer.
    ///
    /// The observer immediately receives `current` via `on_subscribe`.
    /// Subscribing the same observer twice fails.
    pub fn subscribe<O>(&mut self, observer: &Rc<RefCell<O>>, current: &D) -> Result<SubscriberId>
    where
        O: Observer<D> + 'static,
    {
        self.subscribers.retain(|s| s.observer.strong_count() > 0);

        let addr = Rc::as_ptr(observer) as *const u8;
        if self.subscribers.iter().any(|s| s.observer.as_ptr() as *const u8 == addr) {
            return Err(Error::AlreadySubscribed);
        }

        let observer_dyn: Rc<RefCell<dyn Observer<D>>> = observer.clone();
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            observer: Rc::downgrade(&observer_dyn),
        });
        observer.borrow_mut().on_subscribe(current);
        Ok(id)
    }

    /// Remove a subscription.
    ///
    /// Returns `false` if there was no such subscription.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        if let Some(pos) = self.subscribers.iter().position(|s| s.id == id) {
            let sub = self.subscribers.remove(pos);
            if let Some(observer) = sub.observer.upgrade() {
                observer.borrow_mut().on_unsubscribe();
            }
            true
        } else {
            false
        }
    }

    /// Send `data` to all live observers.
    pub fn notify(&self, data: &D) {
        for sub in &self.subscribers {
            if let Some(observer) = sub.observer.upgrade() {
                observer.borrow_mut().on_notify(data);
            }
        }
    }

    /// Send the data produced by `producer` to all live observers.
    ///
    /// The producer is only called if there is at least one observer.
    pub fn notify_with<P>(&self, producer: P)
    where
        P: FnOnce() -> D,
    {
        if self.subscribers.iter().any(|s| s.observer.strong_count() > 0) {
            self.notify(&producer());
        }
    }
}

impl<D> Drop for Observable<D> {
    fn drop(&mut self) {
        for sub in self.subscribers.drain(..).rev() {
            if let Some(observer) = sub.observer.upgrade() {
                observer.borrow_mut().on_unsubscribe();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Observable, Observer};
    use crate::error::Error;
    use std::cell::RefCell;
    use std::rc::Rc;

    const SUBSCRIBE_DELTA: i32 = 3;

    #[derive(Default)]
    struct Counter {
        value: i32,
    }

    impl Observer<i32> for Counter {
        fn on_subscribe(&mut self, _data: &i32) {
            self.value += SUBSCRIBE_DELTA;
        }

        fn on_notify(&mut self, _data: &i32) {
            self.value += 1;
        }

        fn on_unsubscribe(&mut self) {
            self.value -= SUBSCRIBE_DELTA;
        }
    }

    #[test]
    fn test_subscribe_notify_unsubscribe() {
        let counter = Rc::new(RefCell::new(Counter::default()));
        let mut observable = Observable::new();

        let id = observable.subscribe(&counter, &0).unwrap();
        assert_eq!(counter.borrow().value, 3);
        observable.notify(&0);
        observable.notify(&0);
        assert_eq!(counter.borrow().value, 5);
        assert!(observable.unsubscribe(id));
        assert_eq!(counter.borrow().value, 2);
        assert!(!observable.unsubscribe(id));
        observable.notify(&0);
        assert_eq!(counter.borrow().value, 2);
    }

    #[test]
    fn test_duplicate_subscription() {
        let counter = Rc::new(RefCell::new(Counter::default()));
        let mut observable = Observable::new();
        observable.subscribe(&counter, &0).unwrap();
        assert_eq!(observable.subscribe(&counter, &0), Err(Error::AlreadySubscribed));
        assert_eq!(observable.len(), 1);
    }

    #[test]
    fn test_dropped_observer() {
        let mut observable = Observable::new();
        {
            let counter = Rc::new(RefCell::new(Counter::default()));
            observable.subscribe(&counter, &0).unwrap();
            assert_eq!(observable.len(), 1);
        }
        assert!(observable.is_empty());
        let mut called = false;
        observable.notify_with(|| {
            called = true;
            0
        });
        assert!(!called);
    }

    #[test]
    fn test_drop_observable_unsubscribes() {
        let counter = Rc::new(RefCell::new(Counter::default()));
        {
            let mut observable = Observable::new();
            observable.subscribe(&counter, &0).unwrap();
            observable.notify(&1);
        }
        assert_eq!(counter.borrow().value, 1);
    }
}

//! Cross-component signaling.
//!
//! # Design
//! The original UI broadcast a payload-free DOM event named `lists:changed`
//! so independently mounted views (the sidebar, an open creation form) would
//! re-fetch their list collections. Here that becomes a typed observable the
//! host wires between components. Delivery is fire-and-forget: an event
//! reaches exactly the listeners subscribed at emit time, and nothing is
//! replayed to listeners added afterwards.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Application-level signals independent components react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The set of lists changed; any view caching list names should re-fetch.
    ListsChanged,
}

/// Handle returned by [`Bus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

/// Single-threaded observable carrying events of type `E`.
pub struct Bus<E> {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, Rc<dyn Fn(&E)>)>>,
}

impl<E> Bus<E> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }

    /// Deliver `event` to every current listener.
    ///
    /// Listeners are snapshotted first, so a handler may subscribe or
    /// unsubscribe without poisoning the iteration; a handler subscribed
    /// during delivery does not receive the event being delivered.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Rc<dyn Fn(&E)>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, f)| Rc::clone(f))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }
}

impl<E> Default for Bus<E> {
    fn default() -> Self {
        Self::new()
    }
}

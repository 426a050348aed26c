//! Credential ownership and durable session state.
//!
//! # Design
//! The credential lives in a key-value `CredentialStore` (the browser's
//! localStorage in the original host; `MemoryStore` elsewhere). `Session`
//! owns one store and is injected into the façade at construction, replacing
//! the original's ambient module state. `Session::token` re-reads the store
//! on every call, so a credential persisted by another code path — a fresh
//! login elsewhere, a manual storage write — takes effect on the very next
//! request without any explicit hand-off.
//!
//! Components that must react to login/logout (the sidebar, for one)
//! subscribe to `SessionEvent`s instead of polling storage.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::bus::{Bus, ListenerId};

/// Storage key for the bearer credential.
pub const TOKEN_KEY: &str = "token";
/// Storage key for the opaque user descriptor.
pub const USER_KEY: &str = "user";

/// Durable key-value storage for the credential and user descriptor.
///
/// Methods take `&self`; implementations provide their own interior
/// mutability, mirroring the storage APIs hosts actually wrap.
pub trait CredentialStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory `CredentialStore`.
///
/// Clones share one underlying map, so a host (or test) can keep a handle
/// and write beside the session — the same aliasing a second localStorage
/// reference gives.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// Session lifecycle changes observable by components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
}

/// The owned credential object. Exactly one credential is active at a time;
/// writes are last-write-wins.
pub struct Session {
    store: Box<dyn CredentialStore>,
    events: Bus<SessionEvent>,
}

impl Session {
    pub fn new(store: Box<dyn CredentialStore>) -> Self {
        Self {
            store,
            events: Bus::new(),
        }
    }

    /// The currently persisted credential, if any. Empty strings count as
    /// absent. Reads the store every call by contract.
    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// The persisted user descriptor (opaque JSON), if any.
    pub fn user(&self) -> Option<String> {
        self.store.get(USER_KEY)
    }

    /// Persist a fresh credential (and user descriptor when provided) and
    /// notify subscribers.
    pub fn sign_in(&self, token: &str, user: Option<&str>) {
        self.store.set(TOKEN_KEY, token);
        if let Some(user) = user {
            self.store.set(USER_KEY, user);
        }
        tracing::debug!("session signed in");
        self.events.emit(&SessionEvent::SignedIn);
    }

    /// Persist the user descriptor alone. Not a lifecycle change, so no
    /// event is emitted.
    pub fn set_user(&self, user: &str) {
        self.store.set(USER_KEY, user);
    }

    /// Remove the credential and the user descriptor together (logout or
    /// rejected credential). Subscribers are notified only when a credential
    /// was actually present, so repeated clears stay quiet.
    pub fn clear(&self) {
        let had_token = self.token().is_some();
        self.store.remove(TOKEN_KEY);
        self.store.remove(USER_KEY);
        if had_token {
            tracing::debug!("session cleared");
            self.events.emit(&SessionEvent::SignedOut);
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionEvent) + 'static) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.events.unsubscribe(id)
    }
}

//! Credential pair and its write-through store.
//!
//! SYSTEM CONTEXT
//! ==============
//! The store is the only holder of the access/refresh pair. Every `set`
//! mirrors into durable storage immediately; the first `get` of a process
//! hydrates from it.
//!
//! ERROR HANDLING
//! ==============
//! Storage failures never reach callers. The first failure is logged and the
//! store continues memory-only for the rest of the process.

#[cfg(test)]
#[path = "credentials_test.rs"]
mod credentials_test;

use std::cell::{Cell, RefCell};

use serde::{Deserialize, Serialize};

use super::storage::{KeyValueStorage, StorageError};
use crate::config::StorageKeys;

/// Access + refresh bearer credentials. Both halves are non-empty.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl CredentialPair {
    /// Returns `None` if either half is empty.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Option<Self> {
        let access_token = access_token.into();
        let refresh_token = refresh_token.into();
        if access_token.is_empty() || refresh_token.is_empty() {
            return None;
        }
        Some(Self { access_token, refresh_token })
    }
}

// Tokens stay out of logs and panic messages.
impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

pub struct CredentialStore {
    storage: Box<dyn KeyValueStorage>,
    keys: StorageKeys,
    current: RefCell<Option<CredentialPair>>,
    hydrated: Cell<bool>,
    durable: Cell<bool>,
}

impl CredentialStore {
    pub fn new(storage: Box<dyn KeyValueStorage>, keys: StorageKeys) -> Self {
        Self {
            storage,
            keys,
            current: RefCell::new(None),
            hydrated: Cell::new(false),
            durable: Cell::new(true),
        }
    }

    /// Current pair, hydrating from durable storage on first use.
    pub fn get(&self) -> Option<CredentialPair> {
        self.hydrate();
        self.current.borrow().clone()
    }

    /// Replace the pair (`Some`) or clear it (`None`), writing through to durable storage.
    pub fn set(&self, pair: Option<CredentialPair>) {
        self.hydrate();
        if pair.is_none() && self.current.borrow().is_none() {
            return;
        }
        self.persist(pair.as_ref());
        *self.current.borrow_mut() = pair;
    }

    pub fn clear(&self) {
        self.set(None);
    }

    pub fn access_token(&self) -> Option<String> {
        self.get().map(|pair| pair.access_token)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.get().map(|pair| pair.refresh_token)
    }

    pub fn has_session(&self) -> bool {
        self.hydrate();
        self.current.borrow().is_some()
    }

    /// False once durable storage has failed and the store went memory-only.
    pub fn is_durable(&self) -> bool {
        self.durable.get()
    }

    /// Load the durable copy into memory. Later calls are no-ops.
    pub fn hydrate(&self) {
        if self.hydrated.replace(true) {
            return;
        }
        let loaded = match self.read_durable() {
            Ok(loaded) => loaded,
            Err(e) => {
                self.degrade(&e);
                None
            }
        };
        *self.current.borrow_mut() = loaded;
    }

    fn read_durable(&self) -> Result<Option<CredentialPair>, StorageError> {
        let access = non_empty(self.storage.get_item(&self.keys.access_token)?);
        let refresh = non_empty(self.storage.get_item(&self.keys.refresh_token)?);
        match (access, refresh) {
            (Some(access), Some(refresh)) => Ok(CredentialPair::new(access, refresh)),
            (None, None) => Ok(None),
            _ => {
                // A lone half is not a session; drop it so the next load agrees.
                self.storage.remove_item(&self.keys.access_token)?;
                self.storage.remove_item(&self.keys.refresh_token)?;
                Ok(None)
            }
        }
    }

    fn persist(&self, pair: Option<&CredentialPair>) {
        if !self.durable.get() {
            return;
        }
        let result = match pair {
            Some(pair) => self.write_pair(pair),
            None => self.remove_pair(),
        };
        if let Err(e) = result {
            // Leave no half-written pair behind for the next page load.
            let _ = self.remove_pair();
            self.degrade(&e);
        }
    }

    fn write_pair(&self, pair: &CredentialPair) -> Result<(), StorageError> {
        self.storage.set_item(&self.keys.access_token, &pair.access_token)?;
        self.storage.set_item(&self.keys.refresh_token, &pair.refresh_token)
    }

    fn remove_pair(&self) -> Result<(), StorageError> {
        self.storage.remove_item(&self.keys.access_token)?;
        self.storage.remove_item(&self.keys.refresh_token)
    }

    fn degrade(&self, error: &StorageError) {
        if self.durable.replace(false) {
            log::warn!("credential storage unavailable, continuing memory-only: {error}");
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

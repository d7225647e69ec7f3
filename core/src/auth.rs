//! Read side of the persisted authentication state.
//!
//! The request layer only ever reads `auth.current.token`. A missing entry,
//! a missing `current`, an empty token, or a value of the wrong shape all
//! mean "no credential": requests go out without an `Authorization` header.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const AUTH_KEY: &str = "auth";

/// Key/value persisted state owned by the application.
pub trait PersistedState: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
}

/// The persisted `auth` entry. Fields beyond the token are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSnapshot {
    #[serde(default)]
    pub current: Option<CurrentSession>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentSession {
    #[serde(default)]
    pub token: Option<String>,
}

impl AuthSnapshot {
    pub fn signed_in(token: impl Into<String>) -> Self {
        Self {
            current: Some(CurrentSession {
                token: Some(token.into()),
            }),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.current
            .as_ref()
            .and_then(|current| current.token.as_deref())
            .filter(|token| !token.is_empty())
    }
}

/// Reads the current bearer token. Re-read on every call, never cached.
pub fn bearer_token<S: PersistedState + ?Sized>(state: &S) -> Option<String> {
    let Some(value) = state.get(AUTH_KEY) else {
        debug!("no persisted auth state");
        return None;
    };
    match serde_json::from_value::<AuthSnapshot>(value) {
        Ok(snapshot) => snapshot.token().map(str::to_string),
        Err(err) => {
            debug!(error = %err, "ignoring malformed auth state");
            None
        }
    }
}

/// In-memory `PersistedState`.
#[derive(Debug, Default)]
pub struct MemoryState {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auth(snapshot: &AuthSnapshot) -> Self {
        let state = Self::new();
        state.store_auth(snapshot);
        state
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.into(), value);
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.remove(key)
    }

    pub fn store_auth(&self, snapshot: &AuthSnapshot) {
        // AuthSnapshot only holds strings and options; serialization is total.
        if let Ok(value) = serde_json::to_value(snapshot) {
            self.set(AUTH_KEY, value);
        }
    }
}

impl PersistedState for MemoryState {
    fn get(&self, key: &str) -> Option<Value> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.get(key).cloned()
    }
}

//! Single-entry cache for detection results.
//!
//! Detection itself is a pure read and safe to run concurrently; the cache
//! only exists so repeated callers share one `Installation` value instead of
//! re-enumerating interpreters on every invocation. It is an owned component
//! the caller instantiates and scopes, not a hidden static.

use std::sync::{Arc, Mutex};

use crate::env::EnvSnapshot;

use super::Installation;

/// Thread-safe cache holding the most recently detected installation.
///
/// `get_or_detect` always re-runs detection and compares the fresh result
/// with the cached entry by kind and root path: a match reuses the cached
/// `Arc`, a mismatch (including detection now finding nothing) replaces or
/// clears the entry. Writes are serialized by the mutex, so readers never
/// observe a half-constructed installation.
#[derive(Debug, Default)]
pub struct InstallationCache {
    slot: Mutex<Option<Arc<Installation>>>,
}

impl InstallationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `detect` against `env` and reconcile the result with the cache.
    pub fn get_or_detect<F>(&self, env: &EnvSnapshot, detect: F) -> Option<Arc<Installation>>
    where
        F: FnOnce(&EnvSnapshot) -> Option<Installation>,
    {
        let fresh = detect(env);
        let mut slot = self.slot.lock().unwrap();
        match fresh {
            None => {
                if slot.take().is_some() {
                    tracing::debug!("cached installation no longer detected; cache cleared");
                }
                None
            }
            Some(fresh) => match slot.as_ref() {
                Some(cached) if cached.kind() == fresh.kind() && cached.root() == fresh.root() => {
                    Some(Arc::clone(cached))
                }
                _ => {
                    let fresh = Arc::new(fresh);
                    *slot = Some(Arc::clone(&fresh));
                    Some(fresh)
                }
            },
        }
    }

    /// The cached installation, if any, without re-detecting.
    pub fn cached(&self) -> Option<Arc<Installation>> {
        self.slot.lock().unwrap().clone()
    }

    pub fn invalidate(&self) {
        self.slot.lock().unwrap().take();
    }
}

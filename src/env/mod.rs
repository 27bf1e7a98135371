//! Immutable snapshots of a process environment.
//!
//! Detection and patching both operate on [`EnvSnapshot`] values rather than
//! on the ambient process environment, so their behavior is a pure function
//! of explicit inputs. The calling process's own environment is never
//! mutated; patched snapshots are handed to spawned children explicitly.

use std::collections::{BTreeMap, HashMap};

/// An immutable name-to-value mapping of environment variables.
///
/// Backed by a `BTreeMap` so iteration order is deterministic. All
/// combinators return a new snapshot; the receiver is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the ambient environment of the calling process.
    pub fn current() -> Self {
        std::env::vars().collect()
    }

    /// An empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Return a new snapshot with a single variable overridden.
    pub fn with_var(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut vars = self.vars.clone();
        vars.insert(name.into(), value.into());
        Self { vars }
    }

    /// Return a new snapshot with `overrides` merged on top of this one.
    ///
    /// Overrides always replace an existing value wholesale; callers that
    /// need append semantics (PATH prepending) compute the combined value
    /// themselves before merging.
    pub fn merged<I>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars = self.vars.clone();
        vars.extend(overrides);
        Self { vars }
    }

    /// Copy the snapshot into the map shape the subprocess layer consumes.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl FromIterator<(String, String)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<String, String>> for EnvSnapshot {
    fn from(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }
}

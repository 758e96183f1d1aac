// SPDX-License-Identifier: MIT OR Apache-2.0
//! Insertion-ordered environment variable maps.

use std::ffi::{OsStr, OsString};

/// An ordered set of environment variables with map semantics.
///
/// Inserting a key that is already present replaces its value in place, so
/// iteration order is the order in which keys were first seen. Diagnostics
/// list variables in this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: Vec<(OsString, OsString)>,
}

impl Environment {
    /// An empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment.
    pub fn capture() -> Self {
        std::env::vars_os().collect()
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True when no variables are set.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Look up a variable.
    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        let key = key.as_ref();
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Set a variable, returning the previous value if there was one.
    pub fn insert(
        &mut self,
        key: impl Into<OsString>,
        value: impl Into<OsString>,
    ) -> Option<OsString> {
        let key = key.into();
        let value = value.into();
        match self.vars.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.vars.push((key, value));
                None
            }
        }
    }

    /// Apply `overlay` on top of this environment. Overlay values win.
    pub fn update(&mut self, overlay: &Environment) {
        for (k, v) in overlay.iter() {
            self.insert(k, v);
        }
    }

    /// Copy of this environment with `overlay` applied on top.
    pub fn merged_with(&self, overlay: &Environment) -> Environment {
        let mut merged = self.clone();
        merged.update(overlay);
        merged
    }

    /// Iterate `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut env = Environment::new();
        for (k, v) in iter {
            env.insert(k, v);
        }
        env
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Environment
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for Environment {
    type Item = (OsString, OsString);
    type IntoIter = std::vec::IntoIter<(OsString, OsString)>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.into_iter()
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State storage seam towards the host automation platform.
//!
//! The host platform (its object tree, subscriptions, persistence) is an
//! external collaborator. This module defines the three calls the poller
//! needs from it (declare, write, read) plus an in-memory implementation
//! used in tests and for running the library without a host.

use std::collections::HashMap;

use parking_lot::RwLock;

/// A value published to the host state store.
///
/// Values are either display text (labels, sentinels, trimmed volume
/// strings) or plain numbers (voltages, temperatures, counts).
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    /// A textual value.
    Text(String),
    /// A numeric value.
    Number(f64),
}

impl StateValue {
    /// Convenience constructor for a text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Convenience constructor for a numeric value.
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::Number(value)
    }

    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// Returns the numeric content, if this is a numeric value.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl std::fmt::Display for StateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Value type of a declared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    /// Textual state.
    Text,
    /// Numeric state.
    Number,
}

/// Declaration metadata for one state path.
///
/// Declarations are idempotent and happen once at startup; the device never
/// causes states to be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDeclaration {
    /// Value type of the state.
    pub kind: StateKind,
    /// Display unit, if any.
    pub unit: Option<&'static str>,
    /// Whether the host may write the state back.
    pub writable: bool,
}

impl StateDeclaration {
    /// A read-only text state.
    #[must_use]
    pub const fn text() -> Self {
        Self {
            kind: StateKind::Text,
            unit: None,
            writable: false,
        }
    }

    /// A read-only numeric state.
    #[must_use]
    pub const fn number() -> Self {
        Self {
            kind: StateKind::Number,
            unit: None,
            writable: false,
        }
    }

    /// Sets the display unit.
    #[must_use]
    pub const fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Marks the state as writable by the host.
    #[must_use]
    pub const fn writable(mut self) -> Self {
        self.writable = true;
        self
    }
}

/// Interface to the host platform's state storage.
///
/// `ack = true` on a write signals that the value originated from the
/// device, not from a user command.
pub trait StateStore {
    /// Declares a state path. Idempotent; called once per path at startup.
    fn declare(
        &self,
        path: &str,
        declaration: StateDeclaration,
    ) -> impl Future<Output = ()> + Send;

    /// Writes a value to a state path.
    fn write(&self, path: &str, value: StateValue, ack: bool) -> impl Future<Output = ()> + Send;

    /// Reads the current value of a state path, if any has been written.
    fn read(&self, path: &str) -> impl Future<Output = Option<StateValue>> + Send;
}

#[derive(Debug, Clone)]
struct StoredState {
    declaration: Option<StateDeclaration>,
    value: Option<StateValue>,
    ack: bool,
}

/// In-memory [`StateStore`] backed by a `parking_lot` map.
///
/// # Examples
///
/// ```
/// use safetec_lib::state::{MemoryStateStore, StateStore, StateValue};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = MemoryStateStore::new();
/// store.write("Conditions.Alarm", StateValue::text("NO ALARM"), true).await;
/// assert_eq!(
///     store.read("Conditions.Alarm").await,
///     Some(StateValue::text("NO ALARM"))
/// );
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    inner: RwLock<HashMap<String, StoredState>>,
}

impl MemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a path has been declared.
    #[must_use]
    pub fn is_declared(&self, path: &str) -> bool {
        self.inner
            .read()
            .get(path)
            .is_some_and(|s| s.declaration.is_some())
    }

    /// Returns the declaration for a path, if any.
    #[must_use]
    pub fn declaration(&self, path: &str) -> Option<StateDeclaration> {
        self.inner.read().get(path).and_then(|s| s.declaration)
    }

    /// Synchronous read used by tests.
    #[must_use]
    pub fn value(&self, path: &str) -> Option<StateValue> {
        self.inner.read().get(path).and_then(|s| s.value.clone())
    }

    /// Returns whether the last write to a path was acknowledged.
    #[must_use]
    pub fn is_acknowledged(&self, path: &str) -> bool {
        self.inner.read().get(path).is_some_and(|s| s.ack)
    }

    /// Number of declared paths.
    #[must_use]
    pub fn declared_count(&self) -> usize {
        self.inner
            .read()
            .values()
            .filter(|s| s.declaration.is_some())
            .count()
    }
}

impl StateStore for MemoryStateStore {
    async fn declare(&self, path: &str, declaration: StateDeclaration) {
        let mut inner = self.inner.write();
        let entry = inner.entry(path.to_string()).or_insert(StoredState {
            declaration: None,
            value: None,
            ack: false,
        });
        // First declaration wins, matching the host's create-if-not-exists.
        if entry.declaration.is_none() {
            entry.declaration = Some(declaration);
        }
    }

    async fn write(&self, path: &str, value: StateValue, ack: bool) {
        let mut inner = self.inner.write();
        let entry = inner.entry(path.to_string()).or_insert(StoredState {
            declaration: None,
            value: None,
            ack: false,
        });
        entry.value = Some(value);
        entry.ack = ack;
    }

    async fn read(&self, path: &str) -> Option<StateValue> {
        self.value(path)
    }
}

impl<S: StateStore + Sync> StateStore for &S {
    fn declare(
        &self,
        path: &str,
        declaration: StateDeclaration,
    ) -> impl Future<Output = ()> + Send {
        (**self).declare(path, declaration)
    }

    fn write(&self, path: &str, value: StateValue, ack: bool) -> impl Future<Output = ()> + Send {
        (**self).write(path, value, ack)
    }

    fn read(&self, path: &str) -> impl Future<Output = Option<StateValue>> + Send {
        (**self).read(path)
    }
}

impl<S: StateStore + Sync + Send> StateStore for std::sync::Arc<S> {
    fn declare(
        &self,
        path: &str,
        declaration: StateDeclaration,
    ) -> impl Future<Output = ()> + Send {
        (**self).declare(path, declaration)
    }

    fn write(&self, path: &str, value: StateValue, ack: bool) -> impl Future<Output = ()> + Send {
        (**self).write(path, value, ack)
    }

    fn read(&self, path: &str) -> impl Future<Output = Option<StateValue>> + Send {
        (**self).read(path)
    }
}

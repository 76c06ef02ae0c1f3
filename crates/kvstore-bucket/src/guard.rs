//! Open/closed lifecycle plus reader/writer exclusion for a store handle.
//!
//! Read operations share the lock; mutations and lifecycle changes take it
//! exclusively, so a read-modify-write of a counter never interleaves with
//! another mutation, and nothing runs against a handle while it is closed.

use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};

/// Externally visible lifecycle state of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Unopened,
    Open,
    Closed,
}

enum Lifecycle<H> {
    Unopened,
    Open(H),
    Closed,
}

pub struct ConcurrencyGuard<H> {
    state: RwLock<Lifecycle<H>>,
}

impl<H> ConcurrencyGuard<H> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(Lifecycle::Unopened),
        }
    }

    pub fn state(&self) -> StoreState {
        match &*self.state.read() {
            Lifecycle::Unopened => StoreState::Unopened,
            Lifecycle::Open(_) => StoreState::Open,
            Lifecycle::Closed => StoreState::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == StoreState::Open
    }

    /// Install the handle produced by `open`. Fails with `AlreadyOpen` if a
    /// handle is installed; if `open` fails the previous state is kept.
    pub fn open_with<F>(&self, open: F) -> StoreResult<()>
    where
        F: FnOnce() -> StoreResult<H>,
    {
        let mut state = self.state.write();
        if let Lifecycle::Open(_) = &*state {
            return Err(StoreError::AlreadyOpen);
        }
        *state = Lifecycle::Open(open()?);
        Ok(())
    }

    /// Take the handle out and pass it to `release`. Returns false (and does
    /// nothing) if the store was not open.
    pub fn close_with<F>(&self, release: F) -> bool
    where
        F: FnOnce(H),
    {
        let mut state = self.state.write();
        if !matches!(&*state, Lifecycle::Open(_)) {
            return false;
        }
        if let Lifecycle::Open(handle) = std::mem::replace(&mut *state, Lifecycle::Closed) {
            release(handle);
        }
        true
    }

    /// Run `f` under the shared lock.
    pub fn read<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&H) -> StoreResult<T>,
    {
        match &*self.state.read() {
            Lifecycle::Open(handle) => f(handle),
            _ => Err(StoreError::Closed),
        }
    }

    /// Run `f` under the exclusive lock.
    pub fn write<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&H) -> StoreResult<T>,
    {
        match &*self.state.write() {
            Lifecycle::Open(handle) => f(handle),
            _ => Err(StoreError::Closed),
        }
    }
}

impl<H> Default for ConcurrencyGuard<H> {
    fn default() -> Self {
        Self::new()
    }
}

//! In-memory result store
//!
//! Shared between the controller and running step loops. Every mutation goes
//! through [`AgentResultStore::update`], which applies a closure under the
//! write lock so a loop's check-then-mutate sequences are atomic with
//! respect to user commands.

use muse_domain::{AgentResult, ResultId};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
pub struct AgentResultStore {
    results: RwLock<HashMap<ResultId, AgentResult>>,
}

impl AgentResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ResultId, AgentResult>> {
        self.results.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ResultId, AgentResult>> {
        self.results.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert or replace a result.
    pub fn insert(&self, result: AgentResult) {
        self.write().insert(result.id.clone(), result);
    }

    /// Snapshot of a result.
    pub fn get(&self, id: &ResultId) -> Option<AgentResult> {
        self.read().get(id).cloned()
    }

    /// Apply `f` to the stored result. `None` if the result is gone.
    pub fn update<R>(&self, id: &ResultId, f: impl FnOnce(&mut AgentResult) -> R) -> Option<R> {
        self.write().get_mut(id).map(f)
    }

    pub fn remove(&self, id: &ResultId) -> Option<AgentResult> {
        self.write().remove(id)
    }

    /// Snapshots of every result, oldest first.
    pub fn list(&self) -> Vec<AgentResult> {
        let mut results: Vec<_> = self.read().values().cloned().collect();
        results.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        results
    }
}

//! Execution registry
//!
//! Tracks which results currently have a live step loop. Each registration
//! hands out a [`RunTicket`] carrying a cancellation token and a generation
//! number; a later registration for the same result supersedes (and
//! cancels) the earlier one.

use muse_domain::ResultId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle owned by one run of the step loop.
#[derive(Debug, Clone)]
pub struct RunTicket {
    pub id: ResultId,
    pub generation: u64,
    pub token: CancellationToken,
}

impl RunTicket {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Default)]
pub struct ExecutionRegistry {
    runs: Mutex<HashMap<ResultId, (u64, CancellationToken)>>,
    next_generation: AtomicU64,
}

impl ExecutionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn runs(&self) -> MutexGuard<'_, HashMap<ResultId, (u64, CancellationToken)>> {
        self.runs.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a new run for `id`, cancelling any run already registered.
    pub fn register(&self, id: &ResultId) -> RunTicket {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let token = CancellationToken::new();
        let previous = self
            .runs()
            .insert(id.clone(), (generation, token.clone()));
        if let Some((old_generation, old_token)) = previous {
            debug!(
                "Superseding run {} of {} with run {}",
                old_generation, id, generation
            );
            old_token.cancel();
        }
        RunTicket {
            id: id.clone(),
            generation,
            token,
        }
    }

    /// Remove `id` and cancel its run. Returns whether a run was registered.
    pub fn deregister(&self, id: &ResultId) -> bool {
        match self.runs().remove(id) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self, id: &ResultId) -> bool {
        self.runs().contains_key(id)
    }

    /// The ticket is still the registered run for its result and has not
    /// been cancelled.
    pub fn is_active(&self, ticket: &RunTicket) -> bool {
        !ticket.is_cancelled()
            && self
                .runs()
                .get(&ticket.id)
                .is_some_and(|(generation, _)| *generation == ticket.generation)
    }

    /// Drop the ticket's registration when its loop exits.
    ///
    /// Returns `false` only when a newer run has taken over the result; the
    /// caller must then leave the result alone.
    pub fn release(&self, ticket: &RunTicket) -> bool {
        let mut runs = self.runs();
        match runs.get(&ticket.id) {
            Some((generation, _)) if *generation != ticket.generation => false,
            Some(_) => {
                runs.remove(&ticket.id);
                true
            }
            None => true,
        }
    }
}

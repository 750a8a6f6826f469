//! Clip waiter registry.
//!
//! Every in-flight `play_clip` call parks on a [`ClipWaiter`]. The registry
//! owns the sending half until the waiter is resolved, and removes it from
//! the pending set under the same lock that picks it for resolution, so a
//! waiter can never be resolved twice.
//!
//! Senders are taken out under the lock and fired after it is released.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chorus_core::ClipError;
use tokio::sync::oneshot;

/// Outcome delivered to a waiter.
pub type ClipOutcome = Result<(), ClipError>;

/// How newly registered waiters are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaiterPolicy {
    /// Waiters stay pending until completion, stop or interruption.
    #[default]
    DrainOnStop,

    /// Waiters resolve with success at registration. For no-op drivers
    /// that will never report completion (headless runs, tests).
    ResumeOnRegister,
}

#[derive(Debug, Default)]
struct Pending {
    next_id: u64,
    entries: Vec<(u64, oneshot::Sender<ClipOutcome>)>,
}

/// Tracks pending clip waiters and resolves each exactly once.
#[derive(Debug, Default)]
pub struct ClipWaiterRegistry {
    policy: WaiterPolicy,
    pending: Mutex<Pending>,
}

/// The receiving half of a registered waiter.
#[derive(Debug)]
pub struct ClipWaiter {
    id: u64,
    rx: oneshot::Receiver<ClipOutcome>,
}

impl ClipWaiter {
    /// Registry-assigned id, usable with [`ClipWaiterRegistry::resolve`].
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the outcome.
    ///
    /// If the registry goes away without resolving, this reports
    /// [`ClipError::Stopped`].
    pub async fn wait(self) -> ClipOutcome {
        self.rx.await.unwrap_or(Err(ClipError::Stopped))
    }
}

impl ClipWaiterRegistry {
    /// Create an empty registry.
    pub fn new(policy: WaiterPolicy) -> Self {
        Self {
            policy,
            pending: Mutex::new(Pending::default()),
        }
    }

    pub const fn policy(&self) -> WaiterPolicy {
        self.policy
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new waiter.
    pub fn register(&self) -> ClipWaiter {
        let (tx, rx) = oneshot::channel();
        let mut pending = self.lock();
        let id = pending.next_id;
        pending.next_id += 1;

        if self.policy == WaiterPolicy::ResumeOnRegister {
            drop(pending);
            // The receiver is alive in this scope, so the send cannot fail.
            let _ = tx.send(Ok(()));
            tracing::debug!(waiter = id, "Clip waiter resumed on register");
            return ClipWaiter { id, rx };
        }

        // Waiters whose caller gave up are dead weight.
        pending.entries.retain(|(_, tx)| !tx.is_closed());
        pending.entries.push((id, tx));
        ClipWaiter { id, rx }
    }

    /// Resolve every pending waiter with `outcome` and empty the set.
    /// Returns how many were resolved.
    pub fn resolve_all(&self, outcome: ClipOutcome) -> usize {
        let drained = std::mem::take(&mut self.lock().entries);
        let count = drained.len();
        for (_, tx) in drained {
            let _ = tx.send(outcome);
        }
        if count > 0 {
            tracing::debug!(count, ?outcome, "Resolved clip waiters");
        }
        count
    }

    /// Resolve one waiter by id. Returns `false` if it was not pending.
    pub fn resolve(&self, id: u64, outcome: ClipOutcome) -> bool {
        let entry = {
            let mut pending = self.lock();
            pending
                .entries
                .iter()
                .position(|(waiter, _)| *waiter == id)
                .map(|pos| pending.entries.swap_remove(pos))
        };
        entry.is_some_and(|(_, tx)| {
            let _ = tx.send(outcome);
            true
        })
    }

    /// Fail every pending waiter with [`ClipError::Stopped`].
    pub fn clear(&self) -> usize {
        self.resolve_all(Err(ClipError::Stopped))
    }

    /// Waiters registered and not yet resolved.
    pub fn pending_count(&self) -> usize {
        self.lock().entries.len()
    }
}

impl Drop for ClipWaiterRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}

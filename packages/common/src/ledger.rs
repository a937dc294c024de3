//! # Mutation Ledger
//!
//! Ordered queue of directives waiting to be sent to a remote store.
//!
//! ## Ordering
//!
//! Queue order is commit order is remote application order. Directives queued
//! later embed positions that assume every earlier directive has already landed,
//! so the queue is never reordered, deduplicated or partially drained.
//!
//! ## Lifecycle
//!
//! ```text
//! load ──► request() … request() ──► commit succeeds ──► clear()
//!                                 └─► commit fails ───► kept for retry
//! ```

use tracing::debug;

/// Pending directives for one editing session
#[derive(Debug, Clone)]
pub struct MutationLedger<D> {
    pending: Vec<D>,
}

impl<D: std::fmt::Debug> MutationLedger<D> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Queue a directive and return its index within the next batch.
    ///
    /// The index correlates per-directive results (e.g. generated ids) in the
    /// batch reply back to the directive that produced them.
    pub fn request(&mut self, directive: D) -> usize {
        let index = self.pending.len();
        debug!(index, directive = ?directive, "Queued directive");
        self.pending.push(directive);
        index
    }

    /// Queue several directives in order
    pub fn extend(&mut self, directives: impl IntoIterator<Item = D>) {
        for directive in directives {
            self.request(directive);
        }
    }

    /// Directives in application order
    pub fn pending(&self) -> &[D] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop everything; called after a successful commit or on reload
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl<D: std::fmt::Debug> Default for MutationLedger<D> {
    fn default() -> Self {
        Self::new()
    }
}

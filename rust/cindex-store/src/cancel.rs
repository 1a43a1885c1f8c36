//! Cooperative cancellation for long-running writes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cindex_common::{Result, error::Error};

/// A cheaply cloneable cancellation flag shared between a writer and its
/// caller.
///
/// The writer checks the token at the start of every storage call; it never
/// interrupts a call already in flight. Cancellation during a flush leaves
/// the backing transaction in the caller's abort state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> CancellationToken {
        Default::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Fails with a `Cancelled` error when cancellation has been requested.
    pub fn check(&self, operation: &str) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::cancelled(operation))
        } else {
            Ok(())
        }
    }
}

//! Cancellation handed down to the tree-sitter parser boundary.
//!
//! Per the concurrency model: the core has no suspension points of its own,
//! so cancellation is only honored where lowering actually calls out to a
//! library that can take a while — the parser. Everywhere else, a
//! cancelled token simply never gets checked, by design.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicUsize>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(1, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) != 0
    }

    pub(super) fn flag(&self) -> &AtomicUsize {
        &self.flag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled() {
        assert!(!CancellationToken::new().is_cancelled());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }
}

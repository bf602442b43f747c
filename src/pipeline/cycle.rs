use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Sequence number of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct CycleToken(u64);

impl CycleToken {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Hands out increasing tokens; only the newest one may publish results.
#[derive(Debug, Default)]
pub struct CycleGuard {
    latest: AtomicU64,
}

impl CycleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a cycle, superseding every earlier one.
    pub fn begin(&self) -> CycleToken {
        CycleToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: CycleToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    pub fn latest(&self) -> Option<CycleToken> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            n => Some(CycleToken(n)),
        }
    }
}

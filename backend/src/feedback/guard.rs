//! In-process claim on a submission key.
//!
//! The store offers no conditional insert, so check-then-insert is serialised
//! per key inside this process: a second submission for a key that is still
//! being processed is rejected as a duplicate instead of racing the first.
//! Instances running side by side can still both insert.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct SubmissionGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

/// Held while a submission runs; releases the key on drop.
pub struct SubmissionPermit {
    key: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when another submission holds `key`.
    pub fn claim(&self, key: impl Into<String>) -> Option<SubmissionPermit> {
        let key = key.into();
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !in_flight.insert(key.clone()) {
            return None;
        }
        Some(SubmissionPermit {
            key,
            in_flight: Arc::clone(&self.in_flight),
        })
    }
}

impl Drop for SubmissionPermit {
    fn drop(&mut self) {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        in_flight.remove(&self.key);
    }
}

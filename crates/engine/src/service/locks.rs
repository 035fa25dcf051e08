//! Per-user write serialization

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One async mutex per user id. Writes for the same user queue up behind
/// each other; different users never contend.
#[derive(Default)]
pub struct LedgerLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl LedgerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding `user_id`, created on first use
    pub fn lock_for(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

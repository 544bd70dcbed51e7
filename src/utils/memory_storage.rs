//! In-memory storage implementation for testing and development

use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::traits::ExpenseStorage;
use crate::types::*;

/// In-memory storage backend.
///
/// Clones share the same underlying data, so a test can hold one handle and
/// hand another to the store. `fail_writes` simulates a broken backend to
/// exercise the store's lenient persistence policy.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    transactions: Arc<RwLock<Vec<Transaction>>>,
    settings: Arc<RwLock<Option<Settings>>>,
    fail_writes: Arc<RwLock<bool>>,
}

impl MemoryStorage {
    /// Create a new, empty memory storage instance.
    pub fn new() -> Self {
        Self {
            transactions: Arc::new(RwLock::new(Vec::new())),
            settings: Arc::new(RwLock::new(None)),
            fail_writes: Arc::new(RwLock::new(false)),
        }
    }

    /// Clear all data (useful for testing).
    pub fn clear(&self) {
        self.transactions.write().unwrap().clear();
        *self.settings.write().unwrap() = None;
    }

    /// Make every subsequent save fail with `PersistenceFailed`.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.write().unwrap() = fail;
    }

    fn check_writable(&self) -> StoreResult<()> {
        if *self.fail_writes.read().unwrap() {
            Err(StoreError::PersistenceFailed {
                cause: "simulated write failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseStorage for MemoryStorage {
    fn load_transactions(&self) -> StoreResult<Vec<Transaction>> {
        Ok(self.transactions.read().unwrap().clone())
    }

    fn save_transactions(&mut self, transactions: &[Transaction]) -> StoreResult<()> {
        self.check_writable()?;
        *self.transactions.write().unwrap() = transactions.to_vec();
        Ok(())
    }

    fn load_settings(&self) -> StoreResult<Settings> {
        Ok(self.settings.read().unwrap().clone().unwrap_or_default())
    }

    fn save_settings(&mut self, settings: &Settings) -> StoreResult<()> {
        self.check_writable()?;
        *self.settings.write().unwrap() = Some(settings.clone());
        Ok(())
    }

    fn generate_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

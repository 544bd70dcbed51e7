//! Traits for the store's external collaborators

use chrono::{DateTime, Utc};

use crate::types::*;

/// Persistence seam for the expense store.
///
/// The store treats this as a local key-value byte store: two documents
/// (transactions and settings) written whole after every successful mutation.
/// The system model is single-threaded and cooperative, so the trait is
/// synchronous; implementations are expected to be effectively local
/// (in-memory, a JSON file, a browser-style key-value store).
pub trait ExpenseStorage {
    /// Load the full transaction list.
    ///
    /// Callers apply the lenient policy: absence or corruption becomes an
    /// empty list at the store layer, never a startup failure.
    fn load_transactions(&self) -> StoreResult<Vec<Transaction>>;

    /// Persist the full transaction list, replacing what was there.
    fn save_transactions(&mut self, transactions: &[Transaction]) -> StoreResult<()>;

    /// Load settings; implementations merge defaults into missing fields.
    fn load_settings(&self) -> StoreResult<Settings>;

    /// Persist settings, replacing what was there.
    fn save_settings(&mut self, settings: &Settings) -> StoreResult<()>;

    /// Produce a fresh unique transaction id. Ids are opaque and never reused.
    fn generate_id(&self) -> String;

    /// Current timestamp for `created_at` / `updated_at`.
    fn now(&self) -> DateTime<Utc>;
}

/// Human-in-the-loop yes/no gate guarding destructive operations.
///
/// The store takes the gate as a parameter instead of owning a UI, so the
/// decision stays separate from the mutation and the store remains testable
/// headless. The gate is consulted before any state changes; a declined
/// prompt leaves the store untouched.
pub trait ConfirmationGate {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Gate that approves every prompt. For tests and non-interactive callers.
pub struct AlwaysConfirm;

impl ConfirmationGate for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Gate that declines every prompt.
pub struct NeverConfirm;

impl ConfirmationGate for NeverConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// Observer of store changes.
///
/// Dispatch is synchronous and in subscription order, after the mutation,
/// recomputation, and persistence have completed. Observers must not mutate
/// the store from inside `store_changed` — notification is re-entrant-unsafe
/// by design and the store does not guard against it.
pub trait StoreObserver {
    fn store_changed(&self);
}

impl<F: Fn()> StoreObserver for F {
    fn store_changed(&self) {
        self()
    }
}

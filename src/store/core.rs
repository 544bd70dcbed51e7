//! The expense store: single source of truth with a derived view
//!
//! Every mutation runs the same sequence to completion before anything else
//! observes the store: validate, mutate the canonical list, recompute the
//! derived view, persist, notify. The model is single-threaded and
//! cooperative; there is no interleaving to reason about.

use chrono::Local;
use tracing::{debug, warn};

use crate::rules::{self, SearchState};
use crate::store::{stats, view};
use crate::traits::*;
use crate::types::*;

/// Reactive container for transactions and settings.
///
/// Owns the canonical list, the settings, the ephemeral search/sort state,
/// and the derived (filtered, sorted) view. Construct one per composition
/// root and inject the storage backend; there is no global instance.
pub struct ExpenseStore<S: ExpenseStorage> {
    storage: S,
    transactions: Vec<Transaction>,
    settings: Settings,
    search: SearchState,
    sort: Option<SortKey>,
    view: Vec<Transaction>,
    observers: Vec<Box<dyn StoreObserver>>,
}

impl<S: ExpenseStorage> ExpenseStore<S> {
    /// Create an empty store over the given storage backend.
    ///
    /// Call [`init`](Self::init) to load persisted state.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            transactions: Vec::new(),
            settings: Settings::default(),
            search: SearchState::Inactive,
            sort: None,
            view: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Load transactions and settings from persistence and notify.
    ///
    /// Never fails: a load error is logged and yields empty/default data.
    /// The derived view starts as a full copy in insertion order.
    pub fn init(&mut self) {
        self.transactions = match self.storage.load_transactions() {
            Ok(transactions) => transactions,
            Err(err) => {
                warn!(error = %err, "could not load transactions, starting empty");
                Vec::new()
            }
        };
        self.settings = match self.storage.load_settings() {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, "could not load settings, using defaults");
                Settings::default()
            }
        };
        self.recompute();
        self.notify();
    }

    /// Register an observer. Dispatch is synchronous, in subscription order.
    pub fn subscribe(&mut self, observer: Box<dyn StoreObserver>) {
        self.observers.push(observer);
    }

    /// Validate a draft and prepend the resulting transaction.
    ///
    /// On validation failure the store is untouched and the field errors are
    /// returned in [`StoreError::ValidationFailed`]. New records go to the
    /// front of the canonical list, so unsorted views show newest first.
    pub fn add_transaction(&mut self, draft: &TransactionDraft) -> StoreResult<Transaction> {
        let clean = rules::validate_draft(draft)
            .into_typed()
            .map_err(|fields| StoreError::ValidationFailed { fields })?;
        let transaction = Transaction::new(
            self.storage.generate_id(),
            clean.description,
            clean.amount,
            clean.category,
            clean.date,
            self.storage.now(),
        );
        self.transactions.insert(0, transaction.clone());
        self.recompute();
        self.persist_transactions();
        self.notify();
        Ok(transaction)
    }

    /// Validate a draft and replace the transaction with the given id,
    /// preserving its id and creation timestamp.
    pub fn update_transaction(
        &mut self,
        id: &str,
        draft: &TransactionDraft,
    ) -> StoreResult<Transaction> {
        let clean = rules::validate_draft(draft)
            .into_typed()
            .map_err(|fields| StoreError::ValidationFailed { fields })?;
        let now = self.storage.now();
        let existing = self
            .transactions
            .iter_mut()
            .find(|txn| txn.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        existing.description = clean.description;
        existing.amount = clean.amount;
        existing.category = clean.category;
        existing.date = clean.date;
        existing.updated_at = now;
        let updated = existing.clone();
        self.recompute();
        self.persist_transactions();
        self.notify();
        Ok(updated)
    }

    /// Remove a transaction after the gate approves.
    ///
    /// Returns `Ok(false)` without touching any state when the user
    /// declines, and [`StoreError::NotFound`] when the id is absent.
    pub fn delete_transaction(
        &mut self,
        id: &str,
        gate: &dyn ConfirmationGate,
    ) -> StoreResult<bool> {
        if !gate.confirm("Delete this transaction?") {
            return Ok(false);
        }
        let position = self
            .transactions
            .iter()
            .position(|txn| txn.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        self.transactions.remove(position);
        self.recompute();
        self.persist_transactions();
        self.notify();
        Ok(true)
    }

    /// Compile a search pattern and recompute the view.
    ///
    /// Always succeeds at this layer: a malformed pattern is kept as an
    /// error marker and the view falls back to the unfiltered list. Search
    /// state is ephemeral and never persisted.
    pub fn set_search(&mut self, pattern: &str, case_sensitive: bool) {
        self.search = SearchState::compile(pattern, case_sensitive);
        if let Some(error) = self.search.error() {
            debug!(pattern, error, "search pattern failed to compile");
        }
        self.recompute();
        self.notify();
    }

    /// Change the sort key and recompute the view.
    pub fn set_sort(&mut self, key: SortKey) {
        self.sort = Some(key);
        self.recompute();
        self.notify();
    }

    /// Shallow-merge a settings patch, persist, and notify.
    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.settings.merge(patch);
        self.persist_settings();
        self.notify();
    }

    /// Prepend imported records verbatim, ahead of existing ones.
    ///
    /// No id de-duplication happens here; filtering belongs to the import
    /// parser and its per-record validator.
    pub fn import_transactions(&mut self, mut list: Vec<Transaction>) {
        list.append(&mut self.transactions);
        self.transactions = list;
        self.recompute();
        self.persist_transactions();
        self.notify();
    }

    /// Remove every transaction after the gate approves.
    ///
    /// Returns `Ok(false)` without touching any state when the user declines.
    pub fn clear_all(&mut self, gate: &dyn ConfirmationGate) -> StoreResult<bool> {
        if !gate.confirm("Delete all transactions?") {
            return Ok(false);
        }
        self.transactions.clear();
        self.recompute();
        self.persist_transactions();
        self.notify();
        Ok(true)
    }

    /// Aggregate statistics for the canonical list as of the local day.
    pub fn stats(&self) -> Stats {
        self.stats_at(Local::now().date_naive())
    }

    /// [`stats`](Self::stats) with an injected current day.
    pub fn stats_at(&self, today: chrono::NaiveDate) -> Stats {
        stats::compute_stats(&self.transactions, &self.settings, today)
    }

    /// Look up a transaction by id in the canonical list.
    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    /// The derived (filtered, sorted) view.
    pub fn view(&self) -> &[Transaction] {
        &self.view
    }

    /// The canonical list in insertion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn sort(&self) -> Option<SortKey> {
        self.sort
    }

    /// Rebuild the derived view. The replacement is built complete and then
    /// swapped in, so observers never read a half-recomputed view.
    fn recompute(&mut self) {
        self.view = view::apply_search_and_sort(&self.transactions, &self.search, self.sort);
        debug!(
            canonical = self.transactions.len(),
            derived = self.view.len(),
            "recomputed derived view"
        );
    }

    /// Persist the canonical list under the lenient policy: a write failure
    /// is logged and swallowed, and the in-memory state stands.
    fn persist_transactions(&mut self) {
        if let Err(err) = self.storage.save_transactions(&self.transactions) {
            warn!(error = %err, "failed to persist transactions, keeping in-memory state");
        }
    }

    fn persist_settings(&mut self) {
        if let Err(err) = self.storage.save_settings(&self.settings) {
            warn!(error = %err, "failed to persist settings, keeping in-memory state");
        }
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer.store_changed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryStorage;
    use bigdecimal::BigDecimal;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::str::FromStr;

    fn store() -> ExpenseStore<MemoryStorage> {
        let mut store = ExpenseStore::new(MemoryStorage::new());
        store.init();
        store
    }

    fn draft(description: &str, amount: &str, date: &str) -> TransactionDraft {
        TransactionDraft::new(description, amount, "Food", date)
    }

    #[test]
    fn add_prepends_and_returns_the_created_record() {
        let mut store = store();
        let first = store.add_transaction(&draft("Lunch", "10", "2025-01-10")).unwrap();
        let second = store.add_transaction(&draft("Dinner", "20", "2025-01-11")).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(store.transactions()[0].id, second.id);
        assert_eq!(store.transactions()[1].id, first.id);
        assert_eq!(second.created_at, second.updated_at);
    }

    #[test]
    fn add_rejects_invalid_drafts_without_mutating() {
        let mut store = store();
        let err = store
            .add_transaction(&draft("Lunch", "10.555", "2025-01-10"))
            .unwrap_err();
        match err {
            StoreError::ValidationFailed { fields } => {
                assert!(fields.contains_key(&Field::Amount));
            }
            other => panic!("expected ValidationFailed, got {other:?}"),
        }
        assert!(store.transactions().is_empty());
        assert!(store.view().is_empty());
    }

    #[test]
    fn update_preserves_id_and_created_at() {
        let mut store = store();
        let created = store.add_transaction(&draft("Lunch", "10", "2025-01-10")).unwrap();
        let updated = store
            .update_transaction(&created.id, &draft("Brunch", "12.50", "2025-01-11"))
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.description, "Brunch");
        assert_eq!(updated.amount, BigDecimal::from_str("12.50").unwrap());
        assert_eq!(store.transactions().len(), 1);
    }

    #[test]
    fn update_of_unknown_id_is_not_found() {
        let mut store = store();
        let err = store
            .update_transaction("missing", &draft("Lunch", "10", "2025-01-10"))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn delete_respects_the_gate() {
        let mut store = store();
        let created = store.add_transaction(&draft("Lunch", "10", "2025-01-10")).unwrap();

        assert_eq!(store.delete_transaction(&created.id, &NeverConfirm).unwrap(), false);
        assert_eq!(store.transactions().len(), 1);

        assert_eq!(store.delete_transaction(&created.id, &AlwaysConfirm).unwrap(), true);
        assert!(store.transaction(&created.id).is_none());
        assert!(store.transactions().is_empty());
    }

    #[test]
    fn confirmed_delete_of_unknown_id_is_not_found() {
        let mut store = store();
        let err = store.delete_transaction("missing", &AlwaysConfirm).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn clear_all_respects_the_gate() {
        let mut store = store();
        store.add_transaction(&draft("Lunch", "10", "2025-01-10")).unwrap();
        store.add_transaction(&draft("Dinner", "20", "2025-01-11")).unwrap();

        assert_eq!(store.clear_all(&NeverConfirm).unwrap(), false);
        assert_eq!(store.transactions().len(), 2);

        assert_eq!(store.clear_all(&AlwaysConfirm).unwrap(), true);
        assert!(store.transactions().is_empty());
        assert!(store.view().is_empty());
    }

    #[test]
    fn search_state_is_ephemeral_and_not_persisted() {
        let storage = MemoryStorage::new();
        let mut store = ExpenseStore::new(storage.clone());
        store.init();
        store.add_transaction(&draft("Coffee", "3.50", "2025-01-10")).unwrap();
        store.set_search("coffee", false);
        assert_eq!(store.view().len(), 1);

        // A store reloaded from the same backend starts unfiltered
        let mut reloaded = ExpenseStore::new(storage);
        reloaded.init();
        assert!(reloaded.search().pattern().is_none());
        assert_eq!(reloaded.view().len(), 1);
    }

    #[test]
    fn malformed_search_keeps_the_full_sorted_view() {
        let mut store = store();
        store.add_transaction(&draft("Lunch", "10", "2025-01-10")).unwrap();
        store.add_transaction(&draft("Dinner", "20", "2025-01-11")).unwrap();
        store.set_sort("amount-asc".parse().unwrap());
        store.set_search("(unterminated", false);

        assert!(store.search().error().is_some());
        assert_eq!(store.view().len(), 2);
        assert!(store.view()[0].amount <= store.view()[1].amount);
    }

    #[test]
    fn import_prepends_verbatim_without_deduplication() {
        let mut store = store();
        let existing = store.add_transaction(&draft("Lunch", "10", "2025-01-10")).unwrap();
        let incoming = vec![
            store.transactions()[0].clone(), // same id on purpose
            Transaction::new(
                "imported".to_string(),
                "Bus".to_string(),
                BigDecimal::from(2),
                "Transport".to_string(),
                chrono::NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(),
                chrono::Utc::now(),
            ),
        ];
        store.import_transactions(incoming);

        let ids: Vec<&str> = store.transactions().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, [existing.id.as_str(), "imported", existing.id.as_str()]);
    }

    #[test]
    fn observers_are_notified_in_subscription_order() {
        let order = Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut store = store();
        for label in ["first", "second"] {
            let order = Rc::clone(&order);
            store.subscribe(Box::new(move || order.borrow_mut().push(label)));
        }
        store.add_transaction(&draft("Lunch", "10", "2025-01-10")).unwrap();
        assert_eq!(*order.borrow(), ["first", "second"]);
    }

    #[test]
    fn failed_validation_does_not_notify() {
        let notified = Rc::new(Cell::new(0usize));
        let mut store = store();
        {
            let notified = Rc::clone(&notified);
            store.subscribe(Box::new(move || notified.set(notified.get() + 1)));
        }
        let _ = store.add_transaction(&draft("", "x", "nope"));
        assert_eq!(notified.get(), 0);
    }

    #[test]
    fn persistence_failure_is_lenient() {
        let storage = MemoryStorage::new();
        storage.fail_writes(true);
        let mut store = ExpenseStore::new(storage.clone());
        store.init();

        // The write fails, the mutation still lands in memory
        let created = store.add_transaction(&draft("Lunch", "10", "2025-01-10")).unwrap();
        assert!(store.transaction(&created.id).is_some());
        assert!(storage.load_transactions().unwrap().is_empty());
    }
}

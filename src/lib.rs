//! # Expense Core
//!
//! A single-user expense tracking core: a reactive store of transactions
//! with a derived (search-filtered, sorted) view, a validation and search
//! rule engine, aggregate statistics, and JSON/CSV import-export.
//!
//! ## Features
//!
//! - **Reactive store**: one source of truth for transactions and settings;
//!   every mutation re-derives the view and notifies observers synchronously
//! - **Rule engine**: pure field validators with cleaned values and
//!   non-blocking warnings, plus safe compilation of user search patterns
//! - **Statistics**: totals, top category, a 7-day spend trend, and budget
//!   status
//! - **Exchange**: JSON export/import and CSV export
//! - **Storage abstraction**: trait-based persistence with in-memory and
//!   JSON-file backends
//!
//! ## Quick Start
//!
//! ```rust
//! use expense_core::{ExpenseStore, TransactionDraft};
//! use expense_core::utils::MemoryStorage;
//!
//! let mut store = ExpenseStore::new(MemoryStorage::new());
//! store.init();
//! let draft = TransactionDraft::new("Coffee", "3.50", "Food", "2025-01-10");
//! let created = store.add_transaction(&draft)?;
//! assert_eq!(created.category, "Food");
//! # Ok::<(), expense_core::StoreError>(())
//! ```

pub mod exchange;
pub mod rules;
pub mod store;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use exchange::*;
pub use rules::*;
pub use store::*;
pub use traits::*;
pub use types::*;

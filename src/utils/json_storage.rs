//! File-backed storage: two JSON documents with atomic writes

use chrono::{DateTime, Utc};
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::traits::ExpenseStorage;
use crate::types::*;

const TRANSACTIONS_FILE: &str = "transactions.json";
const SETTINGS_FILE: &str = "settings.json";
const TMP_SUFFIX: &str = "tmp";

/// Local key-value persistence as JSON files in a directory.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-write leaves the previous document intact. Load errors are
/// reported as `PersistenceFailed`; the store's lenient policy turns them
/// into empty/default state.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    transactions_file: PathBuf,
    settings_file: PathBuf,
}

impl JsonFileStorage {
    /// Open (and create if needed) a storage directory.
    pub fn new(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(persistence)?;
        Ok(Self {
            transactions_file: dir.join(TRANSACTIONS_FILE),
            settings_file: dir.join(SETTINGS_FILE),
        })
    }
}

impl ExpenseStorage for JsonFileStorage {
    fn load_transactions(&self) -> StoreResult<Vec<Transaction>> {
        if !self.transactions_file.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.transactions_file).map_err(persistence)?;
        serde_json::from_str(&data).map_err(persistence)
    }

    fn save_transactions(&mut self, transactions: &[Transaction]) -> StoreResult<()> {
        let data = serde_json::to_string_pretty(transactions).map_err(persistence)?;
        write_atomic(&self.transactions_file, &data)
    }

    fn load_settings(&self) -> StoreResult<Settings> {
        if !self.settings_file.exists() {
            return Ok(Settings::default());
        }
        let data = fs::read_to_string(&self.settings_file).map_err(persistence)?;
        // Container-level serde defaults fill in any missing fields
        serde_json::from_str(&data).map_err(persistence)
    }

    fn save_settings(&mut self, settings: &Settings) -> StoreResult<()> {
        let data = serde_json::to_string_pretty(settings).map_err(persistence)?;
        write_atomic(&self.settings_file, &data)
    }

    fn generate_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

fn write_atomic(path: &Path, data: &str) -> StoreResult<()> {
    let tmp_path = path.with_extension(TMP_SUFFIX);
    let mut file = File::create(&tmp_path).map_err(persistence)?;
    file.write_all(data.as_bytes()).map_err(persistence)?;
    file.sync_all().map_err(persistence)?;
    fs::rename(&tmp_path, path).map_err(persistence)
}

fn persistence(err: impl fmt::Display) -> StoreError {
    StoreError::PersistenceFailed {
        cause: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn txn(storage: &JsonFileStorage, description: &str) -> Transaction {
        Transaction::new(
            storage.generate_id(),
            description.to_string(),
            BigDecimal::from(10),
            "Food".to_string(),
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            storage.now(),
        )
    }

    #[test]
    fn round_trips_transactions_and_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonFileStorage::new(dir.path()).unwrap();

        let transactions = vec![txn(&storage, "Lunch"), txn(&storage, "Dinner")];
        storage.save_transactions(&transactions).unwrap();

        let mut settings = Settings::default();
        settings.monthly_budget = BigDecimal::from(750);
        storage.save_settings(&settings).unwrap();

        let reopened = JsonFileStorage::new(dir.path()).unwrap();
        assert_eq!(reopened.load_transactions().unwrap(), transactions);
        assert_eq!(reopened.load_settings().unwrap(), settings);
    }

    #[test]
    fn missing_files_load_as_empty_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path()).unwrap();
        assert!(storage.load_transactions().unwrap().is_empty());
        assert_eq!(storage.load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn corrupt_documents_surface_persistence_errors() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path()).unwrap();
        fs::write(dir.path().join(TRANSACTIONS_FILE), "not json").unwrap();
        let err = storage.load_transactions().unwrap_err();
        assert!(matches!(err, StoreError::PersistenceFailed { .. }));
    }

    #[test]
    fn settings_document_with_missing_fields_gets_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path()).unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"monthlyBudget":"750"}"#,
        )
        .unwrap();
        let settings = storage.load_settings().unwrap();
        assert_eq!(settings.monthly_budget, BigDecimal::from(750));
        assert_eq!(settings.currency, "USD");
        assert!(!settings.categories.is_empty());
    }
}

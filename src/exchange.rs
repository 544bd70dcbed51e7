//! JSON and CSV import/export

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;
use tracing::debug;

use crate::types::*;

/// Version stamp written into JSON export documents.
pub const EXPORT_VERSION: &str = "1.0";

const CSV_HEADER: [&str; 7] = [
    "ID",
    "Description",
    "Amount",
    "Category",
    "Date",
    "Created At",
    "Updated At",
];

/// Shape of a JSON export: the full transaction list, the settings, when the
/// export happened, and a format version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub transactions: Vec<Transaction>,
    pub settings: Settings,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

/// What an import produced: the accepted records, any settings carried in
/// the document, and how many records the per-record validator dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub transactions: Vec<Transaction>,
    pub settings: Option<Settings>,
    pub invalid_count: usize,
}

/// Serialize transactions and settings into a JSON export document.
pub fn export_to_json(transactions: &[Transaction], settings: &Settings) -> StoreResult<String> {
    let document = ExportDocument {
        transactions: transactions.to_vec(),
        settings: settings.clone(),
        export_date: Utc::now(),
        version: EXPORT_VERSION.to_string(),
    };
    serde_json::to_string_pretty(&document).map_err(|err| StoreError::PersistenceFailed {
        cause: err.to_string(),
    })
}

/// Serialize transactions into CSV with a fixed header row. Field quoting
/// and escaping are handled by the writer.
pub fn export_to_csv(transactions: &[Transaction]) -> StoreResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_error = |err: csv::Error| StoreError::PersistenceFailed {
        cause: err.to_string(),
    };
    writer.write_record(CSV_HEADER).map_err(csv_error)?;
    for txn in transactions {
        writer
            .write_record([
                txn.id.clone(),
                txn.description.clone(),
                txn.amount.to_string(),
                txn.category.clone(),
                txn.date.to_string(),
                txn.created_at.to_rfc3339(),
                txn.updated_at.to_rfc3339(),
            ])
            .map_err(csv_error)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| StoreError::PersistenceFailed {
            cause: err.to_string(),
        })?;
    String::from_utf8(bytes).map_err(|err| StoreError::PersistenceFailed {
        cause: err.to_string(),
    })
}

/// Parse a JSON export, filtering each raw record through `record_filter`.
///
/// The document must carry a `transactions` array or the whole import fails
/// with `ImportFormatInvalid` and nothing is merged. Records rejected by the
/// filter, or that fail to deserialize, are dropped and counted; accepted
/// records come back verbatim (no id de-duplication — that is the caller's
/// call, see [`crate::store::ExpenseStore::import_transactions`]).
pub fn import_from_json<R, F>(reader: R, record_filter: F) -> StoreResult<ImportOutcome>
where
    R: Read,
    F: Fn(&Value) -> bool,
{
    let document: Value =
        serde_json::from_reader(reader).map_err(|err| StoreError::ImportFormatInvalid {
            reason: format!("not valid JSON: {err}"),
        })?;
    let records = document
        .get("transactions")
        .and_then(Value::as_array)
        .ok_or_else(|| StoreError::ImportFormatInvalid {
            reason: "missing 'transactions' array".to_string(),
        })?;

    let mut transactions = Vec::with_capacity(records.len());
    let mut invalid_count = 0;
    for record in records {
        if !record_filter(record) {
            invalid_count += 1;
            continue;
        }
        match serde_json::from_value::<Transaction>(record.clone()) {
            Ok(txn) => transactions.push(txn),
            Err(err) => {
                debug!(error = %err, "dropping undeserializable import record");
                invalid_count += 1;
            }
        }
    }

    let settings = document
        .get("settings")
        .and_then(|value| serde_json::from_value(value.clone()).ok());

    Ok(ImportOutcome {
        transactions,
        settings,
        invalid_count,
    })
}

/// Default per-record validator: id, description, category, and date must be
/// present as non-null strings, and the amount must be numeric (a JSON
/// number or a numeric string).
pub fn default_record_filter(record: &Value) -> bool {
    let has_string = |key: &str| record.get(key).and_then(Value::as_str).is_some();
    let amount_is_numeric = record.get("amount").is_some_and(|value| {
        value.is_number()
            || value
                .as_str()
                .is_some_and(|raw| raw.parse::<f64>().is_ok())
    });
    has_string("id")
        && has_string("description")
        && has_string("category")
        && has_string("date")
        && amount_is_numeric
}

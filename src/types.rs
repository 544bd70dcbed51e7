//! Core types and data structures for the expense tracker

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Currency codes the settings accept as a base currency.
pub const SUPPORTED_CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "JPY", "INR"];

/// Monthly budget applied when settings carry none.
pub const DEFAULT_MONTHLY_BUDGET: u32 = 500;

/// Upper bound on a single transaction amount.
pub const MAX_AMOUNT: u32 = 1_000_000;

/// A recorded expense.
///
/// Created only through [`crate::store::ExpenseStore::add_transaction`], which
/// runs the rule engine first, so a `Transaction` always holds cleaned values:
/// collapsed description whitespace, normalized category casing, an amount
/// within bounds, and a real calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier, opaque, never reused
    pub id: String,
    /// What the money was spent on
    pub description: String,
    /// Non-negative amount with at most two fractional digits
    pub amount: BigDecimal,
    /// Category name, capitalized-first/lowercase-rest
    pub category: String,
    /// Calendar date of the expense
    pub date: NaiveDate,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction with both timestamps set to `now`.
    pub fn new(
        id: String,
        description: String,
        amount: BigDecimal,
        category: String,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            description,
            amount,
            category,
            date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Text the search matcher runs against: description, amount, category,
    /// and date, space-joined in that order.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.description, self.amount, self.category, self.date
        )
    }
}

/// Raw form input for a transaction, exactly as the user typed it.
///
/// Drafts pass through [`crate::rules::validate_draft`] before they touch
/// the store; the cleaned values become a [`Transaction`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub description: String,
    pub amount: String,
    pub category: String,
    pub date: String,
}

impl TransactionDraft {
    /// Convenience constructor for form handlers and tests.
    pub fn new(description: &str, amount: &str, category: &str, date: &str) -> Self {
        Self {
            description: description.to_string(),
            amount: amount.to_string(),
            category: category.to_string(),
            date: date.to_string(),
        }
    }
}

/// Singleton user settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Base currency code, one of [`SUPPORTED_CURRENCIES`]
    pub currency: String,
    /// Conversion rates relative to the base currency
    pub conversion_rates: HashMap<String, f64>,
    /// Monthly spending budget
    pub monthly_budget: BigDecimal,
    /// Category names offered to the user
    pub categories: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut conversion_rates = HashMap::new();
        conversion_rates.insert("USD".to_string(), 1.0);
        Self {
            currency: "USD".to_string(),
            conversion_rates,
            monthly_budget: BigDecimal::from(DEFAULT_MONTHLY_BUDGET),
            categories: vec![
                "Food".to_string(),
                "Transport".to_string(),
                "Entertainment".to_string(),
                "Utilities".to_string(),
                "Shopping".to_string(),
                "Other".to_string(),
            ],
        }
    }
}

impl Settings {
    /// Shallow-merge a patch into these settings; later keys win.
    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        if let Some(conversion_rates) = patch.conversion_rates {
            self.conversion_rates = conversion_rates;
        }
        if let Some(monthly_budget) = patch.monthly_budget {
            self.monthly_budget = monthly_budget;
        }
        if let Some(categories) = patch.categories {
            self.categories = categories;
        }
    }

    /// Display symbol for the base currency.
    pub fn currency_symbol(&self) -> &'static str {
        match self.currency.as_str() {
            "EUR" => "€",
            "GBP" => "£",
            "JPY" => "¥",
            "INR" => "₹",
            _ => "$",
        }
    }
}

/// Partial settings update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub currency: Option<String>,
    pub conversion_rates: Option<HashMap<String, f64>>,
    pub monthly_budget: Option<BigDecimal>,
    pub categories: Option<Vec<String>>,
}

/// Transaction fields the rule engine reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Description,
    Amount,
    Category,
    Date,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Description => write!(f, "description"),
            Field::Amount => write!(f, "amount"),
            Field::Category => write!(f, "category"),
            Field::Date => write!(f, "date"),
        }
    }
}

/// Field a derived view can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Date,
    Amount,
    Description,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Active sort: a field plus a direction, written as `"date-desc"`,
/// `"amount-asc"` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self.field {
            SortField::Date => "date",
            SortField::Amount => "amount",
            SortField::Description => "description",
        };
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{field}-{direction}")
    }
}

/// Error for sort keys that name no known field or direction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized sort key: '{0}'")]
pub struct InvalidSortKey(pub String);

impl FromStr for SortKey {
    type Err = InvalidSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = s
            .rsplit_once('-')
            .ok_or_else(|| InvalidSortKey(s.to_string()))?;
        let field = match field {
            "date" => SortField::Date,
            "amount" => SortField::Amount,
            "description" => SortField::Description,
            _ => return Err(InvalidSortKey(s.to_string())),
        };
        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(InvalidSortKey(s.to_string())),
        };
        Ok(SortKey { field, direction })
    }
}

/// Aggregate statistics derived from the canonical list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Number of transactions
    pub total_count: usize,
    /// Sum of all amounts
    pub total_amount: BigDecimal,
    /// Most frequent category; ties go to the category seen first in list order
    pub top_category: Option<String>,
    /// Seven trailing days (today plus six prior), oldest first
    pub trend: Vec<TrendPoint>,
    /// Spend against the monthly budget
    pub budget: BudgetStatus,
}

/// One day of the trailing spend trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub amount: BigDecimal,
}

/// Budget usage snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    /// Total spent
    pub used: BigDecimal,
    /// Configured monthly budget
    pub total: BigDecimal,
    /// used / total as a percentage, capped at 100
    pub percentage: f64,
    /// Whether spending exceeds the budget
    pub over_budget: bool,
    /// Budget left, floored at zero
    pub remaining: BigDecimal,
    /// Amount past the budget, floored at zero
    pub overspent: BigDecimal,
}

/// Errors that can occur in the expense store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("validation failed on {} field(s)", fields.len())]
    ValidationFailed { fields: BTreeMap<Field, String> },
    #[error("transaction not found: {id}")]
    NotFound { id: String },
    #[error("persistence failed: {cause}")]
    PersistenceFailed { cause: String },
    #[error("malformed search pattern: {reason}")]
    MalformedPattern { reason: String },
    #[error("invalid import format: {reason}")]
    ImportFormatInvalid { reason: String },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_round_trips_through_display() {
        for raw in ["date-asc", "date-desc", "amount-asc", "description-desc"] {
            let key: SortKey = raw.parse().unwrap();
            assert_eq!(key.to_string(), raw);
        }
    }

    #[test]
    fn unrecognized_sort_keys_are_rejected() {
        assert!("category-asc".parse::<SortKey>().is_err());
        assert!("date-up".parse::<SortKey>().is_err());
        assert!("date".parse::<SortKey>().is_err());
        assert!("".parse::<SortKey>().is_err());
    }

    #[test]
    fn settings_merge_is_shallow_and_partial() {
        let mut settings = Settings::default();
        settings.merge(SettingsPatch {
            monthly_budget: Some(BigDecimal::from(750)),
            ..Default::default()
        });
        assert_eq!(settings.monthly_budget, BigDecimal::from(750));
        assert_eq!(settings.currency, "USD");
        assert!(!settings.categories.is_empty());
    }

    #[test]
    fn transaction_serializes_with_camel_case_keys() {
        let txn = Transaction::new(
            "t1".to_string(),
            "Lunch".to_string(),
            BigDecimal::from(12),
            "Food".to_string(),
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            Utc::now(),
        );
        let json = serde_json::to_value(&txn).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["date"], "2025-01-10");
    }
}

//! Field validation rules for transaction drafts
//!
//! Pure functions: each validator takes the raw form string and reports
//! pass/fail with a human-readable message, a cleaned value on success, and
//! optionally a non-blocking warning. Nothing here touches the store.

use bigdecimal::BigDecimal;
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::types::*;

static EDGE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s|\s$").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(0|[1-9]\d*)(\.\d{1,2})?$").unwrap());
static EXCESS_DECIMALS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d{3,}$").unwrap());
static LEADING_ZEROS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0\d").unwrap());
static CENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\d{2}$").unwrap());
static CATEGORY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+([ -][A-Za-z]+)*$").unwrap());
static DATE_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());
static BEVERAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(coffee|tea|soda|juice|water)\b").unwrap());

/// Outcome of validating a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    pub valid: bool,
    /// Why validation failed; `None` when valid
    pub message: Option<String>,
    /// Normalized value to persist; `None` when invalid
    pub cleaned: Option<String>,
    /// Non-blocking advisory, may accompany a valid result
    pub warning: Option<String>,
}

impl FieldCheck {
    fn pass(cleaned: String) -> Self {
        Self {
            valid: true,
            message: None,
            cleaned: Some(cleaned),
            warning: None,
        }
    }

    fn pass_with_warning(cleaned: String, warning: String) -> Self {
        Self {
            valid: true,
            message: None,
            cleaned: Some(cleaned),
            warning: Some(warning),
        }
    }

    fn fail(message: &str) -> Self {
        Self {
            valid: false,
            message: Some(message.to_string()),
            cleaned: None,
            warning: None,
        }
    }
}

/// Validate a description.
///
/// Rejects empty input, leading/trailing whitespace, and any internal run of
/// two or more whitespace characters. The cleaned value collapses whitespace
/// runs to single spaces, which is a no-op for input that passed — collapsing
/// is idempotent.
pub fn validate_description(raw: &str) -> FieldCheck {
    if raw.is_empty() {
        return FieldCheck::fail("Description is required");
    }
    if EDGE_WHITESPACE.is_match(raw) {
        return FieldCheck::fail("Description cannot start or end with whitespace");
    }
    if WHITESPACE_RUN.is_match(raw) {
        return FieldCheck::fail("Description cannot contain consecutive whitespace");
    }
    FieldCheck::pass(WHITESPACE.replace_all(raw, " ").into_owned())
}

/// Validate an amount string.
///
/// Accepts a non-negative decimal with at most two fractional digits and no
/// leading zeros, up to 1,000,000. A two-decimal cents component passes with
/// a warning.
pub fn validate_amount(raw: &str) -> FieldCheck {
    if raw.is_empty() {
        return FieldCheck::fail("Amount is required");
    }
    if !AMOUNT.is_match(raw) {
        if raw.starts_with('-') {
            return FieldCheck::fail("Amount cannot be negative");
        }
        if EXCESS_DECIMALS.is_match(raw) {
            return FieldCheck::fail("Amount can have at most 2 decimal places");
        }
        if LEADING_ZEROS.is_match(raw) {
            return FieldCheck::fail("Amount cannot have leading zeros");
        }
        return FieldCheck::fail("Amount must be a non-negative number");
    }
    let value = match BigDecimal::from_str(raw) {
        Ok(value) => value,
        Err(_) => return FieldCheck::fail("Amount must be a non-negative number"),
    };
    if value > BigDecimal::from(MAX_AMOUNT) {
        return FieldCheck::fail("Amount cannot exceed 1,000,000");
    }
    if CENTS.is_match(raw) {
        return FieldCheck::pass_with_warning(
            raw.to_string(),
            "Amount includes a cents component".to_string(),
        );
    }
    FieldCheck::pass(raw.to_string())
}

/// Validate a category name.
///
/// Letters only, with single spaces or hyphens between letter groups, at
/// least two characters. The cleaned value uppercases the first letter and
/// lowercases the rest, which is a no-op for an already-normalized name.
pub fn validate_category(raw: &str) -> FieldCheck {
    if raw.is_empty() {
        return FieldCheck::fail("Category is required");
    }
    if raw.chars().count() < 2 {
        return FieldCheck::fail("Category must be at least 2 characters");
    }
    if !CATEGORY.is_match(raw) {
        return FieldCheck::fail(
            "Category may only contain letters, with single spaces or hyphens between words",
        );
    }
    let mut chars = raw.chars();
    let cleaned = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    };
    FieldCheck::pass(cleaned)
}

/// Validate a date string against the current day.
pub fn validate_date(raw: &str) -> FieldCheck {
    validate_date_at(raw, Local::now().date_naive())
}

/// Validate a date string, treating `today` as the current day.
///
/// Requires strict `YYYY-MM-DD` and an existing calendar date (Feb 30 and
/// Apr 31 fail; Feb 29 only passes in leap years). A date strictly after
/// `today` passes with a warning.
pub fn validate_date_at(raw: &str, today: NaiveDate) -> FieldCheck {
    if raw.is_empty() {
        return FieldCheck::fail("Date is required");
    }
    let captures = match DATE_SHAPE.captures(raw) {
        Some(captures) => captures,
        None => return FieldCheck::fail("Date must be in YYYY-MM-DD format"),
    };
    // The shape regex guarantees these parse
    let year: i32 = captures[1].parse().unwrap_or_default();
    let month: u32 = captures[2].parse().unwrap_or_default();
    let day: u32 = captures[3].parse().unwrap_or_default();
    let date = match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => return FieldCheck::fail("Date is not a valid calendar date"),
    };
    if date > today {
        return FieldCheck::pass_with_warning(
            raw.to_string(),
            "Date is in the future".to_string(),
        );
    }
    FieldCheck::pass(raw.to_string())
}

/// Fully validated and parsed draft values, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanDraft {
    pub description: String,
    pub amount: BigDecimal,
    pub category: String,
    pub date: NaiveDate,
}

/// Aggregate result of validating a whole draft.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftReport {
    /// Field-level failures; empty when the draft is valid
    pub errors: BTreeMap<Field, String>,
    /// Non-blocking advisories, present even for valid drafts
    pub warnings: BTreeMap<Field, String>,
    /// Normalized values, falling back to the raw input for failed fields
    pub cleaned: TransactionDraft,
}

impl DraftReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert into typed values, or hand back the field errors.
    pub fn into_typed(self) -> Result<CleanDraft, BTreeMap<Field, String>> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }
        let mut errors = self.errors;
        let amount = match BigDecimal::from_str(&self.cleaned.amount) {
            Ok(amount) => Some(amount),
            Err(err) => {
                errors.insert(Field::Amount, err.to_string());
                None
            }
        };
        let date = match NaiveDate::parse_from_str(&self.cleaned.date, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(err) => {
                errors.insert(Field::Date, err.to_string());
                None
            }
        };
        match (amount, date) {
            (Some(amount), Some(date)) => Ok(CleanDraft {
                description: self.cleaned.description,
                amount,
                category: self.cleaned.category,
                date,
            }),
            _ => Err(errors),
        }
    }
}

/// Validate all four fields of a draft and aggregate the results.
///
/// `errors` maps failing fields to messages; `warnings` carries non-blocking
/// advisories (future date, cents component, repeated adjacent words and
/// beverage keywords in the description); `cleaned` holds the values to
/// persist, with raw input standing in wherever validation failed.
pub fn validate_draft(draft: &TransactionDraft) -> DraftReport {
    validate_draft_at(draft, Local::now().date_naive())
}

/// [`validate_draft`] with an injected current day, for deterministic tests.
pub fn validate_draft_at(draft: &TransactionDraft, today: NaiveDate) -> DraftReport {
    let mut errors = BTreeMap::new();
    let mut warnings = BTreeMap::new();
    let mut cleaned = draft.clone();

    let checks = [
        (Field::Description, validate_description(&draft.description)),
        (Field::Amount, validate_amount(&draft.amount)),
        (Field::Category, validate_category(&draft.category)),
        (Field::Date, validate_date_at(&draft.date, today)),
    ];
    for (field, check) in checks {
        if let Some(message) = check.message {
            errors.insert(field, message);
        }
        if let Some(warning) = check.warning {
            warnings.insert(field, warning);
        }
        if let Some(value) = check.cleaned {
            match field {
                Field::Description => cleaned.description = value,
                Field::Amount => cleaned.amount = value,
                Field::Category => cleaned.category = value,
                Field::Date => cleaned.date = value,
            }
        }
    }

    if let Some(warning) = description_warnings(&draft.description) {
        warnings
            .entry(Field::Description)
            .and_modify(|existing| {
                existing.push_str("; ");
                existing.push_str(&warning);
            })
            .or_insert(warning);
    }

    DraftReport {
        errors,
        warnings,
        cleaned,
    }
}

/// Advisory checks on descriptions: adjacent duplicate words
/// (case-insensitive, word-boundary based) and beverage keywords.
fn description_warnings(text: &str) -> Option<String> {
    let mut notes = Vec::new();
    if has_adjacent_duplicate_words(text) {
        notes.push("Description repeats a word");
    }
    if BEVERAGE.is_match(text) {
        notes.push("Description mentions a beverage");
    }
    if notes.is_empty() {
        None
    } else {
        Some(notes.join("; "))
    }
}

fn has_adjacent_duplicate_words(text: &str) -> bool {
    let mut previous: Option<(String, usize)> = None;
    for word in WORD.find_iter(text) {
        let lowered = word.as_str().to_lowercase();
        if let Some((prev_word, prev_end)) = previous {
            // Adjacent means only whitespace separates the two words
            let gap = &text[prev_end..word.start()];
            if prev_word == lowered && !gap.is_empty() && gap.chars().all(char::is_whitespace) {
                return true;
            }
        }
        previous = Some((lowered, word.end()));
    }
    false
}

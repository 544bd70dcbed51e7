//! Aggregate statistics over the canonical transaction list

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{Duration, NaiveDate};

use crate::types::*;

/// Compute statistics for `transactions` treating `today` as the current day.
///
/// Pure: reads the canonical list and settings, mutates nothing.
pub fn compute_stats(transactions: &[Transaction], settings: &Settings, today: NaiveDate) -> Stats {
    let total_amount: BigDecimal = transactions.iter().map(|txn| &txn.amount).sum();
    Stats {
        total_count: transactions.len(),
        top_category: top_category(transactions),
        trend: trailing_trend(transactions, today),
        budget: budget_status(&total_amount, &settings.monthly_budget),
        total_amount,
    }
}

/// Most frequent category. Ties break toward the category encountered first
/// in a single linear scan of the list, not alphabetically.
fn top_category(transactions: &[Transaction]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for txn in transactions {
        match counts.iter_mut().find(|(name, _)| *name == txn.category) {
            Some((_, count)) => *count += 1,
            None => counts.push((txn.category.as_str(), 1)),
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (name, count) in counts {
        // Strictly-greater keeps the first-encountered winner on ties
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name.to_string())
}

/// Summed amount for each of the last seven calendar days (today plus six
/// prior), oldest first.
fn trailing_trend(transactions: &[Transaction], today: NaiveDate) -> Vec<TrendPoint> {
    (0..7)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let amount: BigDecimal = transactions
                .iter()
                .filter(|txn| txn.date == date)
                .map(|txn| &txn.amount)
                .sum();
            TrendPoint { date, amount }
        })
        .collect()
}

fn budget_status(used: &BigDecimal, total: &BigDecimal) -> BudgetStatus {
    let zero = BigDecimal::from(0);
    let over_budget = used > total;
    let percentage = if *total <= zero {
        if *used > zero {
            100.0
        } else {
            0.0
        }
    } else {
        let used_f = used.to_f64().unwrap_or(0.0);
        let total_f = total.to_f64().unwrap_or(f64::MAX);
        (used_f / total_f * 100.0).min(100.0)
    };
    BudgetStatus {
        used: used.clone(),
        total: total.clone(),
        percentage,
        over_budget,
        remaining: if over_budget {
            zero.clone()
        } else {
            total - used
        },
        overspent: if over_budget { used - total } else { zero },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn txn(category: &str, amount: &str, date: NaiveDate) -> Transaction {
        Transaction::new(
            format!("{category}-{amount}-{date}"),
            "Something".to_string(),
            BigDecimal::from_str(amount).unwrap(),
            category.to_string(),
            date,
            Utc::now(),
        )
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_list_yields_zeroed_stats() {
        let stats = compute_stats(&[], &Settings::default(), day(2025, 1, 10));
        assert_eq!(stats.total_count, 0);
        assert_eq!(stats.total_amount, BigDecimal::from(0));
        assert_eq!(stats.top_category, None);
        assert_eq!(stats.trend.len(), 7);
        assert!(!stats.budget.over_budget);
        assert_eq!(stats.budget.percentage, 0.0);
    }

    #[test]
    fn top_category_ties_break_by_first_encountered() {
        let today = day(2025, 1, 10);
        let transactions = vec![
            txn("Transport", "1", today),
            txn("Food", "1", today),
            txn("Food", "1", today),
            txn("Transport", "1", today),
        ];
        let stats = compute_stats(&transactions, &Settings::default(), today);
        // Both have 2; Transport was seen first in list order
        assert_eq!(stats.top_category.as_deref(), Some("Transport"));
    }

    #[test]
    fn trend_covers_seven_days_oldest_first() {
        let today = day(2025, 1, 10);
        let transactions = vec![
            txn("Food", "5", today),
            txn("Food", "3", day(2025, 1, 4)),
            txn("Food", "99", day(2025, 1, 3)), // outside the window
        ];
        let stats = compute_stats(&transactions, &Settings::default(), today);
        assert_eq!(stats.trend.len(), 7);
        assert_eq!(stats.trend[0].date, day(2025, 1, 4));
        assert_eq!(stats.trend[0].amount, BigDecimal::from(3));
        assert_eq!(stats.trend[6].date, today);
        assert_eq!(stats.trend[6].amount, BigDecimal::from(5));
        assert_eq!(stats.trend[3].amount, BigDecimal::from(0));
    }

    #[test]
    fn budget_under_and_over() {
        let today = day(2025, 1, 10);
        let settings = Settings::default(); // budget 500

        let under = compute_stats(&[txn("Food", "200", today)], &settings, today);
        assert!(!under.budget.over_budget);
        assert_eq!(under.budget.remaining, BigDecimal::from(300));
        assert_eq!(under.budget.overspent, BigDecimal::from(0));
        assert!((under.budget.percentage - 40.0).abs() < f64::EPSILON);

        let over = compute_stats(&[txn("Food", "600", today)], &settings, today);
        assert!(over.budget.over_budget);
        assert_eq!(over.budget.remaining, BigDecimal::from(0));
        assert_eq!(over.budget.overspent, BigDecimal::from(100));
        assert_eq!(over.budget.percentage, 100.0);
    }
}

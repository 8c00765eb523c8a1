//! Spending analysis pipeline
//!
//! Two pure passes over a user's expense records:
//!
//! - **Spending Analyzer** - month-over-month deltas, per-category changes,
//!   unusual days, and a summary of the current 30-day window
//! - **Budget Recommender** - monthly budget targets from the last 90 days,
//!   compared against the user's existing budgets
//!
//! Both take `now` explicitly; the free functions below use the wall clock.
//! Categories are visited in name order and days in date order, so output
//! is deterministic for a given input and `now`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pennywise_core::analysis::{analyze_spending, recommend_budgets};
//!
//! let analysis = analyze_spending(&expenses)?;
//! let budgets = recommend_budgets(&expenses, Some(&current_budgets))?;
//! ```

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Utc};

use crate::error::Result;
use crate::models::{BudgetRecommendations, BudgetRecord, ExpenseRecord, SpendingAnalysis};

pub mod budget;
pub mod spending;

pub use budget::BudgetRecommender;
pub use spending::{SpendingAnalyzer, SpendingThresholds};

/// Currency symbol used in suggestion and recommendation messages
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Analyze spending with the default thresholds as of the current time
pub fn analyze_spending(expenses: &[ExpenseRecord]) -> Result<SpendingAnalysis> {
    SpendingAnalyzer::new().analyze(expenses, Utc::now().naive_utc())
}

/// Recommend budgets with the default settings as of the current time
pub fn recommend_budgets(
    expenses: &[ExpenseRecord],
    current_budgets: Option<&[BudgetRecord]>,
) -> Result<BudgetRecommendations> {
    BudgetRecommender::new().recommend(expenses, current_budgets, Utc::now().naive_utc())
}

/// Parse every record's date up front so a bad date fails the whole pass
fn with_timestamps(expenses: &[ExpenseRecord]) -> Result<Vec<(NaiveDateTime, &ExpenseRecord)>> {
    expenses
        .iter()
        .map(|record| Ok((record.timestamp()?, record)))
        .collect()
}

/// Sum `amount` per category
fn totals_by_category<'a, I>(records: I) -> BTreeMap<String, f64>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let mut totals = BTreeMap::new();
    for record in records {
        *totals.entry(record.category.clone()).or_insert(0.0) += record.amount;
    }
    totals
}

/// Category with the largest total; ties go to the first name in order
fn top_category(totals: &BTreeMap<String, f64>) -> Option<&str> {
    totals
        .iter()
        .fold(None, |best: Option<(&String, f64)>, (category, &amount)| {
            match best {
                Some((_, best_amount)) if best_amount >= amount => best,
                _ => Some((category, amount)),
            }
        })
        .map(|(category, _)| category.as_str())
}

/// Percent change from `previous` to `current` (caller guarantees previous != 0)
fn percent_change(current: f64, previous: f64) -> f64 {
    (current - previous) / previous * 100.0
}

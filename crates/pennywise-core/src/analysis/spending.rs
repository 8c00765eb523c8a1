//! Spending Analyzer
//!
//! Compares the last 30 days against the 30 days before them and turns the
//! differences into short suggestions:
//!
//! 1. Overall trend (warning above +20%, positive below -15%)
//! 2. Per-category changes, new categories, and high-spending categories
//! 3. Unusually expensive days (more than 2 standard deviations above the mean)
//!
//! Suggestions keep that generation order and are capped at five.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::Result;
use crate::models::{ExpenseRecord, SpendingAnalysis, Suggestion, Summary};

use super::{percent_change, top_category, totals_by_category, with_timestamps};
use super::DEFAULT_CURRENCY_SYMBOL;

const NO_SPENDING: &str = "No spending";

const NORMAL_PATTERNS_MESSAGE: &str = "Your spending patterns look normal. Keep tracking your expenses to maintain good financial health.";

/// Tunable thresholds for the spending analyzer
#[derive(Debug, Clone)]
pub struct SpendingThresholds {
    /// Length of the current and previous comparison windows
    pub window_days: i64,
    /// Overall increase (percent) that triggers a warning
    pub overall_increase_pct: f64,
    /// Overall change (percent, negative) below which spending is praised
    pub overall_decrease_pct: f64,
    /// Category increase (percent) that triggers a warning...
    pub category_increase_pct: f64,
    /// ...when the category's current spending is also above this amount
    pub category_increase_min_amount: f64,
    /// Category change (percent, negative) below which spending is praised
    pub category_decrease_pct: f64,
    /// Current-window category total that triggers a high-spending alert
    pub high_spending_amount: f64,
    /// Standard deviations above the daily mean that mark an unusual day
    pub unusual_day_sigma: f64,
    pub max_suggestions: usize,
}

impl Default for SpendingThresholds {
    fn default() -> Self {
        Self {
            window_days: 30,
            overall_increase_pct: 20.0,
            overall_decrease_pct: -15.0,
            category_increase_pct: 50.0,
            category_increase_min_amount: 1000.0,
            category_decrease_pct: -30.0,
            high_spending_amount: 5000.0,
            unusual_day_sigma: 2.0,
            max_suggestions: 5,
        }
    }
}

/// Turns expense records into suggestions and a summary
pub struct SpendingAnalyzer {
    thresholds: SpendingThresholds,
    currency: String,
}

impl SpendingAnalyzer {
    pub fn new() -> Self {
        Self {
            thresholds: SpendingThresholds::default(),
            currency: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }

    pub fn with_thresholds(thresholds: SpendingThresholds) -> Self {
        Self {
            thresholds,
            currency: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }

    pub fn with_currency(mut self, symbol: &str) -> Self {
        self.currency = symbol.to_string();
        self
    }

    /// Analyze `expenses` as of `now`.
    ///
    /// An empty input yields no suggestions and an empty summary. Any other
    /// input yields at least one suggestion (the "looks normal" fallback when
    /// no rule fires). Fails only when a record's date cannot be parsed.
    pub fn analyze(
        &self,
        expenses: &[ExpenseRecord],
        now: NaiveDateTime,
    ) -> Result<SpendingAnalysis> {
        if expenses.is_empty() {
            return Ok(SpendingAnalysis::default());
        }

        let dated = with_timestamps(expenses)?;

        let window = Duration::days(self.thresholds.window_days);
        let current_start = now - window;
        let previous_start = current_start - window;

        // Current window is [now-30d, now], previous is [now-60d, now-30d)
        let current: Vec<(NaiveDateTime, &ExpenseRecord)> = dated
            .iter()
            .filter(|(ts, _)| *ts >= current_start && *ts <= now)
            .copied()
            .collect();
        let previous: Vec<&ExpenseRecord> = dated
            .iter()
            .filter(|(ts, _)| *ts >= previous_start && *ts < current_start)
            .map(|(_, record)| *record)
            .collect();

        let total_current: f64 = current.iter().map(|(_, r)| r.amount).sum();
        let total_previous: f64 = previous.iter().map(|r| r.amount).sum();

        let current_by_category = totals_by_category(current.iter().map(|(_, r)| *r));
        let previous_by_category = totals_by_category(previous.iter().copied());

        let mut suggestions = Vec::new();

        if let Some(trend) = self.overall_trend(total_current, total_previous) {
            suggestions.push(trend);
        }
        suggestions.extend(self.category_changes(&current_by_category, &previous_by_category));
        suggestions.extend(self.unusual_days(&current));

        debug!(
            current_records = current.len(),
            previous_records = previous.len(),
            suggestions = suggestions.len(),
            "Spending analysis complete"
        );

        if suggestions.is_empty() {
            suggestions.push(Suggestion::info(NORMAL_PATTERNS_MESSAGE));
        }
        suggestions.truncate(self.thresholds.max_suggestions);

        let spending_change = if total_previous > 0.0 {
            percent_change(total_current, total_previous)
        } else {
            0.0
        };

        let summary = Summary {
            total_current,
            total_previous,
            spending_change,
            top_category: top_category(&current_by_category)
                .unwrap_or(NO_SPENDING)
                .to_string(),
            category_breakdown: current_by_category,
        };

        Ok(SpendingAnalysis {
            suggestions,
            summary: Some(summary),
        })
    }

    fn overall_trend(&self, total_current: f64, total_previous: f64) -> Option<Suggestion> {
        if total_previous <= 0.0 {
            return None;
        }

        let change = percent_change(total_current, total_previous);
        if change > self.thresholds.overall_increase_pct {
            Some(Suggestion::warning(format!(
                "Your overall spending increased by {:.1}% compared to the previous month.",
                change
            )))
        } else if change < self.thresholds.overall_decrease_pct {
            Some(Suggestion::positive(format!(
                "Great job! Your overall spending decreased by {:.1}% compared to the previous month.",
                change.abs()
            )))
        } else {
            None
        }
    }

    fn category_changes(
        &self,
        current: &BTreeMap<String, f64>,
        previous: &BTreeMap<String, f64>,
    ) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        let mut categories: Vec<&String> = current.keys().chain(previous.keys()).collect();
        categories.sort();
        categories.dedup();

        for category in categories {
            let current_spend = current.get(category).copied().unwrap_or(0.0);
            let previous_spend = previous.get(category).copied().unwrap_or(0.0);

            if previous_spend > 0.0 {
                let change = percent_change(current_spend, previous_spend);
                if change > self.thresholds.category_increase_pct
                    && current_spend > self.thresholds.category_increase_min_amount
                {
                    suggestions.push(Suggestion::warning(format!(
                        "Your {} expenses increased significantly by {:.1}% compared to last month.",
                        category, change
                    )));
                } else if change < self.thresholds.category_decrease_pct {
                    suggestions.push(Suggestion::positive(format!(
                        "Great job reducing {} expenses by {:.1}% compared to last month.",
                        category,
                        change.abs()
                    )));
                }
            } else if current_spend > 0.0 {
                suggestions.push(Suggestion::info(format!(
                    "You started spending on {} this month ({}{:.2}).",
                    category, self.currency, current_spend
                )));
            }

            if current_spend > self.thresholds.high_spending_amount {
                suggestions.push(Suggestion::warning(format!(
                    "You're spending a lot on {} ({}{:.2}). Consider looking for ways to reduce this expense.",
                    category, self.currency, current_spend
                )));
            }
        }

        suggestions
    }

    /// Flag days in the current window whose total is an outlier
    fn unusual_days(&self, current: &[(NaiveDateTime, &ExpenseRecord)]) -> Vec<Suggestion> {
        let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut daily_by_category: BTreeMap<NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();

        for (ts, record) in current {
            let day = ts.date();
            *daily.entry(day).or_insert(0.0) += record.amount;
            *daily_by_category
                .entry(day)
                .or_default()
                .entry(record.category.clone())
                .or_insert(0.0) += record.amount;
        }

        let totals: Vec<f64> = daily.values().copied().collect();
        let Some((mean, std_dev)) = mean_and_sample_std(&totals) else {
            return Vec::new();
        };
        if std_dev <= 0.0 {
            return Vec::new();
        }

        let cutoff = mean + self.thresholds.unusual_day_sigma * std_dev;

        daily
            .iter()
            .filter(|&(_, &amount)| amount > cutoff)
            .map(|(day, amount)| {
                let top = daily_by_category
                    .get(day)
                    .and_then(top_category)
                    .unwrap_or(NO_SPENDING);
                Suggestion::info(format!(
                    "Unusually high spending on {} ({}{:.2}), mostly on {}.",
                    day.format("%Y-%m-%d"),
                    self.currency,
                    amount,
                    top
                ))
            })
            .collect()
    }
}

impl Default for SpendingAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean and sample (n-1) standard deviation; `None` for fewer than two values
fn mean_and_sample_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some((mean, variance.sqrt()))
}

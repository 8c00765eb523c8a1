//! Budget Recommender
//!
//! Suggests a monthly budget per category from the last 90 days of spending:
//! the average of the category's monthly totals plus a 10% buffer. Months in
//! which a category had no expenses are left out of its average.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDateTime};
use tracing::debug;

use crate::error::Result;
use crate::models::{
    BudgetAction, BudgetRecommendation, BudgetRecommendations, BudgetRecord, ExpenseRecord,
};

use super::with_timestamps;
use super::DEFAULT_CURRENCY_SYMBOL;

/// Derives recommended monthly budgets from recent spending
pub struct BudgetRecommender {
    /// How far back to look for spending history
    lookback_days: i64,
    /// Multiplier applied to the average monthly spend (1.1 = 10% buffer)
    buffer: f64,
    /// Minimum difference (percent) from an existing budget worth reporting
    min_difference_pct: f64,
    currency: String,
}

impl BudgetRecommender {
    pub fn new() -> Self {
        Self {
            lookback_days: 90,
            buffer: 1.1,
            min_difference_pct: 20.0,
            currency: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }

    pub fn with_settings(lookback_days: i64, buffer: f64, min_difference_pct: f64) -> Self {
        Self {
            lookback_days,
            buffer,
            min_difference_pct,
            currency: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }

    pub fn with_currency(mut self, symbol: &str) -> Self {
        self.currency = symbol.to_string();
        self
    }

    /// Recommend budgets as of `now`.
    ///
    /// Categories without an existing budget get a `create` recommendation.
    /// Categories with one are reported only when the recommendation differs
    /// from it by more than the minimum difference.
    pub fn recommend(
        &self,
        expenses: &[ExpenseRecord],
        current_budgets: Option<&[BudgetRecord]>,
        now: NaiveDateTime,
    ) -> Result<BudgetRecommendations> {
        if expenses.is_empty() {
            return Ok(BudgetRecommendations::default());
        }

        let since = now - Duration::days(self.lookback_days);

        // category -> (year, month) -> total
        let mut monthly: BTreeMap<&str, BTreeMap<(i32, u32), f64>> = BTreeMap::new();
        for (ts, record) in with_timestamps(expenses)? {
            if ts < since || ts > now {
                continue;
            }
            *monthly
                .entry(record.category.as_str())
                .or_default()
                .entry((ts.year(), ts.month()))
                .or_insert(0.0) += record.amount;
        }

        if monthly.is_empty() {
            debug!(lookback_days = self.lookback_days, "No recent expenses to base budgets on");
            return Ok(BudgetRecommendations::default());
        }

        let recommendations = monthly
            .into_iter()
            .filter_map(|(category, months)| {
                let average = months.values().sum::<f64>() / months.len() as f64;
                self.recommend_category(category, average * self.buffer, current_budgets)
            })
            .collect();

        Ok(BudgetRecommendations { recommendations })
    }

    fn recommend_category(
        &self,
        category: &str,
        recommended: f64,
        current_budgets: Option<&[BudgetRecord]>,
    ) -> Option<BudgetRecommendation> {
        // A missing or zero limit counts as no budget at all
        let current = current_budgets
            .and_then(|budgets| budgets.iter().find(|b| b.category == category))
            .and_then(|budget| budget.monthly_limit)
            .filter(|limit| *limit != 0.0);

        let Some(current) = current else {
            return Some(BudgetRecommendation {
                category: category.to_string(),
                current_budget: None,
                recommended_budget: recommended,
                action: BudgetAction::Create,
                message: format!(
                    "Consider setting a budget of {}{:.2} for {} based on your average spending.",
                    self.currency, recommended, category
                ),
            });
        };

        let difference = (recommended - current) / current * 100.0;
        if difference.abs() <= self.min_difference_pct {
            return None;
        }

        let (action, verb) = if difference > 0.0 {
            (BudgetAction::Increase, "increasing")
        } else {
            (BudgetAction::Decrease, "decreasing")
        };

        Some(BudgetRecommendation {
            category: category.to_string(),
            current_budget: Some(current),
            recommended_budget: recommended,
            action,
            message: format!(
                "Consider {} your {} budget from {}{:.2} to {}{:.2} based on your spending patterns.",
                verb, category, self.currency, current, self.currency, recommended
            ),
        })
    }
}

impl Default for BudgetRecommender {
    fn default() -> Self {
        Self::new()
    }
}

//! Pennywise Core Library
//!
//! Shared functionality for the Pennywise smart spending suggestions service:
//! - Expense and budget data contracts
//! - Spending analyzer (trends, category changes, unusual days)
//! - Budget recommender
//! - Upstream backend client with an explicit fallback policy
//! - Service configuration loaded once at startup

pub mod analysis;
pub mod config;
pub mod error;
pub mod models;
pub mod upstream;

/// Test utilities including a mock upstream backend
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analysis::{
    analyze_spending, recommend_budgets, BudgetRecommender, SpendingAnalyzer, SpendingThresholds,
};
pub use config::{Environment, ServiceConfig};
pub use error::{Error, Result};
pub use models::{
    BudgetAction, BudgetRecommendation, BudgetRecommendations, BudgetRecord, ExpenseRecord,
    FullAnalysis, SpendingAnalysis, Suggestion, SuggestionType, Summary,
};
pub use upstream::{BackendClient, ExpenseSource};

//! Spending analysis handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDateTime, Utc};
use tracing::info;

use crate::{ApiResponse, AppError, AppState};
use pennywise_core::{BudgetRecommendations, FullAnalysis, SpendingAnalysis, Suggestion};

const NO_DATA_MESSAGE: &str = "No spending data available for analysis.";

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// GET /analyze/:user_id - Spending suggestions and summary
///
/// A user with no expenses (or an unreachable upstream) gets a single
/// informational suggestion instead of an empty list.
pub async fn analyze_user_spending(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<SpendingAnalysis>>, AppError> {
    info!(user_id = %user_id, "Analyzing spending");

    let expenses = state.source.fetch_expenses(&user_id).await;
    info!(user_id = %user_id, count = expenses.len(), "Retrieved expenses");

    if expenses.is_empty() {
        return Ok(ApiResponse::ok(SpendingAnalysis {
            suggestions: vec![Suggestion::info(NO_DATA_MESSAGE)],
            summary: None,
        }));
    }

    let analysis = state
        .analyzer
        .analyze(&expenses, now())
        .map_err(|e| AppError::internal("Error analyzing spending", e))?;

    info!(
        user_id = %user_id,
        suggestions = analysis.suggestions.len(),
        "Generated suggestions"
    );

    Ok(ApiResponse::ok(analysis))
}

/// GET /budget-recommendations/:user_id - Recommended monthly budgets
pub async fn get_budget_recommendations(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<BudgetRecommendations>>, AppError> {
    const CONTEXT: &str = "Error generating budget recommendations";

    info!(user_id = %user_id, "Generating budget recommendations");

    let (expenses, budgets) = tokio::join!(
        state.source.fetch_expenses(&user_id),
        state.source.fetch_budgets(&user_id)
    );
    let budgets = budgets.map_err(|e| AppError::internal(CONTEXT, e))?;

    let recommendations = state
        .recommender
        .recommend(&expenses, Some(budgets.as_slice()), now())
        .map_err(|e| AppError::internal(CONTEXT, e))?;

    Ok(ApiResponse::ok(recommendations))
}

/// GET /full-analysis/:user_id - Spending analysis and budget recommendations together
///
/// Unlike `/analyze`, an empty expense list is passed through as-is and
/// yields `{suggestions: [], summary: {}}`.
pub async fn get_full_analysis(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<FullAnalysis>>, AppError> {
    const CONTEXT: &str = "Error performing full analysis";

    info!(user_id = %user_id, "Performing full analysis");

    let (expenses, budgets) = tokio::join!(
        state.source.fetch_expenses(&user_id),
        state.source.fetch_budgets(&user_id)
    );

    let as_of = now();
    let spending_analysis = state
        .analyzer
        .analyze(&expenses, as_of)
        .map_err(|e| AppError::internal(CONTEXT, e))?;

    let budgets = budgets.map_err(|e| AppError::internal(CONTEXT, e))?;
    let budget_recommendations = state
        .recommender
        .recommend(&expenses, Some(budgets.as_slice()), as_of)
        .map_err(|e| AppError::internal(CONTEXT, e))?;

    Ok(ApiResponse::ok(FullAnalysis {
        spending_analysis,
        budget_recommendations,
    }))
}

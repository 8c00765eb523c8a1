//! Offline analysis of exported expense and budget files

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::de::DeserializeOwned;

use pennywise_core::upstream::parse_records;
use pennywise_core::{
    BudgetAction, BudgetRecommendations, BudgetRecommender, BudgetRecord, ExpenseRecord,
    SpendingAnalysis, SpendingAnalyzer, SuggestionType,
};

/// Read records from a file holding an array or a `{"data": [...]}` envelope
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_records(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Analyze the expenses in `file` as of now
pub fn analyze_file(file: &Path, currency: &str) -> Result<SpendingAnalysis> {
    let expenses: Vec<ExpenseRecord> = load_records(file)?;
    tracing::debug!(count = expenses.len(), "Loaded expenses");

    let analysis = SpendingAnalyzer::new()
        .with_currency(currency)
        .analyze(&expenses, Utc::now().naive_utc())?;
    Ok(analysis)
}

/// Recommend budgets for the expenses in `file`, optionally against a budgets file
pub fn recommend_file(
    file: &Path,
    budgets_file: Option<&Path>,
    currency: &str,
) -> Result<BudgetRecommendations> {
    let expenses: Vec<ExpenseRecord> = load_records(file)?;
    let budgets: Option<Vec<BudgetRecord>> = budgets_file
        .map(load_records::<BudgetRecord>)
        .transpose()?;

    let recommendations = BudgetRecommender::new().with_currency(currency).recommend(
        &expenses,
        budgets.as_deref(),
        Utc::now().naive_utc(),
    )?;
    Ok(recommendations)
}

pub fn cmd_analyze(file: &Path, json: bool, currency: &str) -> Result<()> {
    let analysis = analyze_file(file, currency)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    let Some(summary) = &analysis.summary else {
        println!("No spending data available for analysis.");
        return Ok(());
    };

    println!();
    println!("📊 Spending Analysis (last 30 days)");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Current: {}{:.2}   Previous: {}{:.2}   Change: {:+.1}%",
        currency,
        summary.total_current,
        currency,
        summary.total_previous,
        summary.spending_change
    );
    println!("   Top category: {}", summary.top_category);

    if !summary.category_breakdown.is_empty() {
        println!();
        for (category, amount) in &summary.category_breakdown {
            println!("   {:25} │ {}{:>10.2}", category, currency, amount);
        }
    }

    println!();
    for suggestion in &analysis.suggestions {
        let icon = match suggestion.kind {
            SuggestionType::Warning => "⚠️ ",
            SuggestionType::Positive => "✅",
            SuggestionType::Info => "💡",
        };
        println!("   {} {}", icon, suggestion.message);
    }

    Ok(())
}

pub fn cmd_recommend(
    file: &Path,
    budgets_file: Option<&Path>,
    json: bool,
    currency: &str,
) -> Result<()> {
    let result = recommend_file(file, budgets_file, currency)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.recommendations.is_empty() {
        println!("No spending in the last 90 days to base budgets on.");
        return Ok(());
    }

    println!();
    println!("💰 Budget Recommendations");
    println!("   ─────────────────────────────────────────────────────────────");
    for rec in &result.recommendations {
        let change = match (rec.action, rec.current_budget) {
            (BudgetAction::Create, _) | (_, None) => {
                format!("new → {}{:.2}", currency, rec.recommended_budget)
            }
            (_, Some(current)) => format!(
                "{}{:.2} → {}{:.2}",
                currency, current, currency, rec.recommended_budget
            ),
        };
        println!("   {:25} │ {:8} │ {}", rec.category, rec.action.as_str(), change);
    }

    Ok(())
}

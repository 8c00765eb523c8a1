//! Domain models for Pennywise

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

/// A single expense fetched from the upstream backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Upstream identifiers are passed through untouched, whatever their shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<serde_json::Value>,
    pub category: String,
    pub amount: f64,
    /// ISO-8601 date or date/time, kept verbatim until analysis
    pub date: String,
}

impl ExpenseRecord {
    pub fn new(category: &str, amount: f64, date: &str) -> Self {
        Self {
            id: None,
            user_id: None,
            category: category.to_string(),
            amount,
            date: date.to_string(),
        }
    }

    /// Parse `date` into a naive UTC timestamp
    pub fn timestamp(&self) -> Result<NaiveDateTime> {
        parse_timestamp(&self.date)
    }
}

/// Parse an ISO-8601 date or date/time.
///
/// Offsets are normalized to UTC. Values without an offset are taken as UTC,
/// and bare dates resolve to midnight.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_utc());
    }

    // Minute precision and basic-format offsets ("Z", "+0530", "+05:30")
    for format in ["%Y-%m-%dT%H:%M%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::<FixedOffset>::parse_from_str(value, format) {
            return Ok(dt.naive_utc());
        }
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| Error::InvalidData(format!("Invalid expense date: {:?}", value)))
}

/// An existing monthly budget from the upstream backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub category: String,
    #[serde(rename = "monthlyLimit", default)]
    pub monthly_limit: Option<f64>,
}

impl BudgetRecord {
    pub fn new(category: &str, monthly_limit: f64) -> Self {
        Self {
            category: category.to_string(),
            monthly_limit: Some(monthly_limit),
        }
    }
}

/// Kind of a spending suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionType {
    Info,
    Warning,
    Positive,
}

impl SuggestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Positive => "positive",
        }
    }
}

impl std::fmt::Display for SuggestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A human-readable observation about the user's spending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    pub message: String,
}

impl Suggestion {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: SuggestionType::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: SuggestionType::Warning,
            message: message.into(),
        }
    }

    pub fn positive(message: impl Into<String>) -> Self {
        Self {
            kind: SuggestionType::Positive,
            message: message.into(),
        }
    }
}

/// Totals for the current and previous 30-day windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_current: f64,
    pub total_previous: f64,
    /// Percent change vs the previous window (0 when there was no previous spending)
    pub spending_change: f64,
    pub top_category: String,
    pub category_breakdown: BTreeMap<String, f64>,
}

/// Result of the spending analyzer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpendingAnalysis {
    pub suggestions: Vec<Suggestion>,
    /// `None` only for an empty expense list; serialized as `{}`
    #[serde(serialize_with = "summary_or_empty_object")]
    pub summary: Option<Summary>,
}

fn summary_or_empty_object<S>(
    summary: &Option<Summary>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match summary {
        Some(summary) => summary.serialize(serializer),
        None => BTreeMap::<String, f64>::new().serialize(serializer),
    }
}

/// What the user should do with a category budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetAction {
    Create,
    Increase,
    Decrease,
}

impl BudgetAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Increase => "increase",
            Self::Decrease => "decrease",
        }
    }
}

impl std::fmt::Display for BudgetAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A suggested monthly budget for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecommendation {
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_budget: Option<f64>,
    pub recommended_budget: f64,
    pub action: BudgetAction,
    pub message: String,
}

/// Result of the budget recommender
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecommendations {
    pub recommendations: Vec<BudgetRecommendation>,
}

/// Combined response for the full analysis endpoint
#[derive(Debug, Clone, Serialize)]
pub struct FullAnalysis {
    pub spending_analysis: SpendingAnalysis,
    pub budget_recommendations: BudgetRecommendations,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        let midnight = parse_timestamp("2024-03-05").unwrap();
        assert_eq!(midnight.to_string(), "2024-03-05 00:00:00");

        let utc = parse_timestamp("2024-03-05T10:30:00.000Z").unwrap();
        assert_eq!(utc.to_string(), "2024-03-05 10:30:00");

        // Offsets are normalized to UTC
        let offset = parse_timestamp("2024-03-05T01:00:00+05:30").unwrap();
        assert_eq!(offset.to_string(), "2024-03-04 19:30:00");

        let naive = parse_timestamp("2024-03-05 08:15:00").unwrap();
        assert_eq!(naive.to_string(), "2024-03-05 08:15:00");
    }

    #[test]
    fn test_parse_timestamp_minute_precision_with_offset() {
        let zulu = parse_timestamp("2024-03-05T10:30Z").unwrap();
        assert_eq!(zulu.to_string(), "2024-03-05 10:30:00");

        let offset = parse_timestamp("2024-03-05T10:30+05:30").unwrap();
        assert_eq!(offset.to_string(), "2024-03-05 05:00:00");

        let naive = parse_timestamp("2024-03-05T10:30").unwrap();
        assert_eq!(naive.to_string(), "2024-03-05 10:30:00");
    }

    #[test]
    fn test_parse_timestamp_basic_format_offset() {
        let utc = parse_timestamp("2024-03-05T10:30:00+0000").unwrap();
        assert_eq!(utc.to_string(), "2024-03-05 10:30:00");

        let shifted = parse_timestamp("2024-03-05T10:30:00.250-0200").unwrap();
        assert_eq!(shifted.to_string(), "2024-03-05 12:30:00.250");
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        let err = parse_timestamp("last tuesday").unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_expense_record_deserializes_upstream_shape() {
        let json = r#"{
            "id": "65f0c0ffee",
            "userId": 42,
            "category": "Food",
            "amount": 250.5,
            "date": "2024-03-05T00:00:00.000Z",
            "description": "ignored"
        }"#;
        let record: ExpenseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, Some(serde_json::json!("65f0c0ffee")));
        assert_eq!(record.user_id, Some(serde_json::json!(42)));
        assert_eq!(record.category, "Food");
        assert_eq!(record.amount, 250.5);
    }

    #[test]
    fn test_expense_record_keeps_identifiers_opaque() {
        let json = r#"[
            {"id": 1.5, "userId": {"_id": "u1", "name": "Asha"},
             "category": "Food", "amount": 10, "date": "2024-03-05"},
            {"id": null, "category": "Rent", "amount": 900, "date": "2024-03-01"}
        ]"#;
        let records: Vec<ExpenseRecord> = crate::upstream::parse_records(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, Some(serde_json::json!(1.5)));
        assert_eq!(records[0].user_id.as_ref().unwrap()["_id"], "u1");
        assert_eq!(records[1].id, None);
        assert_eq!(records[1].category, "Rent");
    }

    #[test]
    fn test_empty_summary_serializes_as_empty_object() {
        let analysis = SpendingAnalysis::default();
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json, serde_json::json!({"suggestions": [], "summary": {}}));
    }

    #[test]
    fn test_create_recommendation_omits_current_budget() {
        let rec = BudgetRecommendation {
            category: "Food".into(),
            current_budget: None,
            recommended_budget: 1100.0,
            action: BudgetAction::Create,
            message: "m".into(),
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json.get("current_budget").is_none());
        assert_eq!(json["action"], "create");
    }

    #[test]
    fn test_suggestion_type_field_name() {
        let json = serde_json::to_value(Suggestion::positive("nice")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "positive", "message": "nice"}));
    }
}

//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use pennywise_core::config::Environment;
use pennywise_core::test_utils::{BackendFixtures, InMemorySource};
use pennywise_core::{BudgetRecord, ExpenseRecord};
use tower::ServiceExt;

/// An expense dated `days_ago` days before the current time
fn expense(category: &str, amount: f64, days_ago: i64) -> ExpenseRecord {
    let date = (Utc::now() - Duration::days(days_ago)).to_rfc3339();
    ExpenseRecord::new(category, amount, &date)
}

fn fixtures() -> BackendFixtures {
    BackendFixtures::default()
        .with_expenses(
            "alice",
            vec![
                expense("Food", 1000.0, 40),
                expense("Food", 1300.0, 5),
                expense("Travel", 200.0, 6),
            ],
        )
        .with_budgets("alice", vec![BudgetRecord::new("Food", 100.0)])
        .with_expenses("bad-dates", vec![ExpenseRecord::new("Food", 10.0, "yesterday")])
        .with_failing_user("offline")
}

fn setup_test_app_with(source: InMemorySource, config: ServiceConfig) -> Router {
    create_router(Arc::new(source), &config)
}

fn setup_test_app() -> Router {
    setup_test_app_with(InMemorySource::new(fixtures()), ServiceConfig::default())
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn messages(suggestions: &serde_json::Value) -> Vec<String> {
    suggestions
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["message"].as_str().unwrap().to_string())
        .collect()
}

// ========== Health ==========

#[tokio::test]
async fn test_health_check() {
    let response = get(setup_test_app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], SERVICE_NAME);
}

#[tokio::test]
async fn test_unknown_route_is_enveloped_404() {
    let response = get(setup_test_app(), "/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Not found");
}

// ========== Analyze ==========

#[tokio::test]
async fn test_analyze_user_spending() {
    let response = get(setup_test_app(), "/analyze/alice").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert!(json.get("message").is_none());

    let data = &json["data"];
    let messages = messages(&data["suggestions"]);
    assert!(messages
        .iter()
        .any(|m| m.contains("overall spending increased")));
    assert!(messages
        .iter()
        .any(|m| m.contains("You started spending on Travel")));

    let summary = &data["summary"];
    assert_eq!(summary["total_current"], 1500.0);
    assert_eq!(summary["total_previous"], 1000.0);
    assert_eq!(summary["top_category"], "Food");
    assert_eq!(summary["category_breakdown"]["Travel"], 200.0);
    assert!((summary["spending_change"].as_f64().unwrap() - 50.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_analyze_unknown_user_gets_no_data_message() {
    let response = get(setup_test_app(), "/analyze/nobody").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(
        json["data"],
        serde_json::json!({
            "suggestions": [{
                "type": "info",
                "message": "No spending data available for analysis."
            }],
            "summary": {}
        })
    );
}

#[tokio::test]
async fn test_analyze_upstream_failure_degrades_to_no_data() {
    let response = get(setup_test_app(), "/analyze/offline").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["suggestions"][0]["type"], "info");
}

#[tokio::test]
async fn test_analyze_bad_date_is_500() {
    let response = get(setup_test_app(), "/analyze/bad-dates").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json.get("data").is_none());
    let message = json["message"].as_str().unwrap();
    assert!(message.starts_with("Error analyzing spending: "));
    assert!(message.contains("yesterday"));
}

#[tokio::test]
async fn test_analyze_uses_configured_currency() {
    let config = ServiceConfig {
        currency_symbol: "$".to_string(),
        ..Default::default()
    };
    let app = setup_test_app_with(InMemorySource::new(fixtures()), config);

    let json = get_body_json(get(app, "/analyze/alice").await).await;
    let messages = messages(&json["data"]["suggestions"]);
    assert!(messages.iter().any(|m| m.contains("($200.00)")));
}

// ========== Budget recommendations ==========

#[tokio::test]
async fn test_budget_recommendations() {
    let response = get(setup_test_app(), "/budget-recommendations/alice").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);

    let recs = json["data"]["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 2);

    let food = recs.iter().find(|r| r["category"] == "Food").unwrap();
    assert_eq!(food["action"], "increase");
    assert_eq!(food["current_budget"], 100.0);

    let travel = recs.iter().find(|r| r["category"] == "Travel").unwrap();
    assert_eq!(travel["action"], "create");
    assert!(travel.get("current_budget").is_none());
}

#[tokio::test]
async fn test_budget_recommendations_for_user_without_data() {
    let json = get_body_json(get(setup_test_app(), "/budget-recommendations/nobody").await).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"], serde_json::json!({ "recommendations": [] }));
}

#[tokio::test]
async fn test_budget_recommendations_budget_lookup_error_is_500() {
    let source = InMemorySource::new(fixtures()).with_unreachable_budgets();
    let app = setup_test_app_with(source, ServiceConfig::default());

    let response = get(app, "/budget-recommendations/alice").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], false);
    let message = json["message"].as_str().unwrap();
    assert!(message.starts_with("Error generating budget recommendations: "));
    assert!(message.contains("BACKEND_URL is not configured"));
}

// ========== Full analysis ==========

#[tokio::test]
async fn test_full_analysis() {
    let response = get(setup_test_app(), "/full-analysis/alice").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);

    let data = &json["data"];
    assert!(!data["spending_analysis"]["suggestions"]
        .as_array()
        .unwrap()
        .is_empty());
    assert_eq!(data["spending_analysis"]["summary"]["top_category"], "Food");
    assert_eq!(
        data["budget_recommendations"]["recommendations"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn test_full_analysis_without_data_is_empty() {
    let json = get_body_json(get(setup_test_app(), "/full-analysis/nobody").await).await;
    assert_eq!(json["success"], true);
    assert_eq!(
        json["data"],
        serde_json::json!({
            "spending_analysis": { "suggestions": [], "summary": {} },
            "budget_recommendations": { "recommendations": [] }
        })
    );
}

#[tokio::test]
async fn test_full_analysis_bad_date_is_500() {
    let response = get(setup_test_app(), "/full-analysis/bad-dates").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = get_body_json(response).await;
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("Error performing full analysis: "));
}

// ========== CORS ==========

async fn preflight(app: Router, origin: &str) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("OPTIONS")
            .uri("/health")
            .header("origin", origin)
            .header("access-control-request-method", "GET")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_cors_is_permissive_by_default() {
    let response = preflight(setup_test_app(), "https://anywhere.example").await;
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_allow_list_in_production() {
    let config = ServiceConfig {
        environment: Environment::Production,
        allowed_origins: vec!["http://localhost:3000".to_string()],
        ..Default::default()
    };

    let app = setup_test_app_with(InMemorySource::new(fixtures()), config.clone());
    let response = preflight(app, "http://localhost:3000").await;
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://localhost:3000"
    );

    let app = setup_test_app_with(InMemorySource::new(fixtures()), config);
    let response = preflight(app, "https://evil.example").await;
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}

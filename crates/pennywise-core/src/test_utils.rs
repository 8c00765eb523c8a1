//! Test utilities for pennywise-core
//!
//! A mock upstream backend served over HTTP, plus an in-memory
//! [`ExpenseSource`] for router tests that don't need real sockets.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::models::{BudgetRecord, ExpenseRecord};
use crate::upstream::ExpenseSource;

/// Per-user records served by the mocks
#[derive(Debug, Clone, Default)]
pub struct BackendFixtures {
    pub expenses: HashMap<String, Vec<ExpenseRecord>>,
    pub budgets: HashMap<String, Vec<BudgetRecord>>,
    /// Users for whom every endpoint answers 500
    pub failing_users: Vec<String>,
}

impl BackendFixtures {
    pub fn with_expenses(mut self, user_id: &str, expenses: Vec<ExpenseRecord>) -> Self {
        self.expenses.insert(user_id.to_string(), expenses);
        self
    }

    pub fn with_budgets(mut self, user_id: &str, budgets: Vec<BudgetRecord>) -> Self {
        self.budgets.insert(user_id.to_string(), budgets);
        self
    }

    pub fn with_failing_user(mut self, user_id: &str) -> Self {
        self.failing_users.push(user_id.to_string());
        self
    }

    fn is_failing(&self, user_id: &str) -> bool {
        self.failing_users.iter().any(|u| u == user_id)
    }
}

/// Mock upstream backend for testing and development
pub struct MockBackendServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockBackendServer {
    /// Start the mock server on an available port
    pub async fn start(fixtures: BackendFixtures) -> Self {
        let app = Router::new()
            .route("/api/expenses", get(handle_expenses))
            .route("/api/budgets", get(handle_budgets))
            .with_state(Arc::new(fixtures));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockBackendServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Debug, Deserialize)]
struct UserQuery {
    #[serde(rename = "userId")]
    user_id: String,
}

async fn handle_expenses(
    State(fixtures): State<Arc<BackendFixtures>>,
    Query(query): Query<UserQuery>,
) -> Response {
    if fixtures.is_failing(&query.user_id) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let expenses = fixtures
        .expenses
        .get(&query.user_id)
        .cloned()
        .unwrap_or_default();
    Json(serde_json::json!({ "success": true, "data": expenses })).into_response()
}

async fn handle_budgets(
    State(fixtures): State<Arc<BackendFixtures>>,
    Query(query): Query<UserQuery>,
) -> Response {
    if fixtures.is_failing(&query.user_id) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let budgets = fixtures
        .budgets
        .get(&query.user_id)
        .cloned()
        .unwrap_or_default();
    Json(serde_json::json!({ "success": true, "data": budgets })).into_response()
}

/// In-memory expense source with the same fallback behavior as the HTTP client
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    fixtures: BackendFixtures,
    /// Fail budget lookups the way the HTTP client does without a backend URL
    budgets_unreachable: bool,
}

impl InMemorySource {
    pub fn new(fixtures: BackendFixtures) -> Self {
        Self {
            fixtures,
            budgets_unreachable: false,
        }
    }

    pub fn with_unreachable_budgets(mut self) -> Self {
        self.budgets_unreachable = true;
        self
    }
}

#[async_trait]
impl ExpenseSource for InMemorySource {
    async fn fetch_expenses(&self, user_id: &str) -> Vec<ExpenseRecord> {
        if self.fixtures.is_failing(user_id) {
            return Vec::new();
        }
        self.fixtures
            .expenses
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn fetch_budgets(&self, user_id: &str) -> Result<Vec<BudgetRecord>> {
        if self.budgets_unreachable {
            return Err(Error::Config("BACKEND_URL is not configured".into()));
        }
        if self.fixtures.is_failing(user_id) {
            return Ok(Vec::new());
        }
        Ok(self
            .fixtures
            .budgets
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    fn host(&self) -> &str {
        "in-memory"
    }
}

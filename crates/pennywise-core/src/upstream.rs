//! Upstream backend client
//!
//! Expenses and budgets live in an external service. Handlers reach it
//! through the [`ExpenseSource`] trait; [`BackendClient`] is the HTTP
//! implementation.
//!
//! # Fallback policy
//!
//! Expense lookups never fail. A non-200 response, a transport error, an
//! undecodable body, or a missing `BACKEND_URL` all yield an empty list (logged
//! at `warn`), so the analysis endpoints keep answering while the upstream is
//! down. Budget lookups treat a non-200 response as "no budgets" but report
//! every other failure to the caller. Nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::models::{BudgetRecord, ExpenseRecord};

/// Where expense and budget records come from
#[async_trait]
pub trait ExpenseSource: Send + Sync {
    /// All expenses for a user; empty on any upstream failure
    async fn fetch_expenses(&self, user_id: &str) -> Vec<ExpenseRecord>;

    /// Existing budgets for a user; empty when the upstream answers non-200
    async fn fetch_budgets(&self, user_id: &str) -> Result<Vec<BudgetRecord>>;

    /// Description of the upstream for logging
    fn host(&self) -> &str;
}

/// `{ "data": [...] }` wrapper used by the upstream API
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordsPayload<T> {
    Bare(Vec<T>),
    Envelope(DataEnvelope<T>),
}

/// Parse records from JSON that is either a bare array or a `{data: [...]}` envelope
pub fn parse_records<T: DeserializeOwned>(json: &str) -> Result<Vec<T>> {
    let payload: RecordsPayload<T> = serde_json::from_str(json)?;
    Ok(match payload {
        RecordsPayload::Bare(records) => records,
        RecordsPayload::Envelope(envelope) => envelope.data,
    })
}

/// HTTP client for the upstream expense/budget API
#[derive(Clone)]
pub struct BackendClient {
    http_client: Client,
    base_url: Option<String>,
}

impl BackendClient {
    /// Create a client; every request is bounded by `timeout`
    pub fn new(base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(config.backend_url.as_deref(), config.upstream_timeout)
    }

    /// GET `{base}/api/{resource}?userId=<id>` and unwrap the `data` array.
    ///
    /// Non-success statuses come back as `Error::Upstream`.
    async fn get_data<T: DeserializeOwned>(
        &self,
        resource: &str,
        user_id: &str,
    ) -> Result<Vec<T>> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| Error::Config("BACKEND_URL is not configured".into()))?;

        let url = format!("{}/api/{}", base_url, resource);
        debug!(url = %url, user_id, "Fetching from upstream");

        let response = self
            .http_client
            .get(&url)
            .query(&[("userId", user_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!("GET {} returned {}", url, status)));
        }

        let envelope: DataEnvelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl ExpenseSource for BackendClient {
    async fn fetch_expenses(&self, user_id: &str) -> Vec<ExpenseRecord> {
        match self.get_data::<ExpenseRecord>("expenses", user_id).await {
            Ok(expenses) => {
                debug!(user_id, count = expenses.len(), "Fetched expenses");
                expenses
            }
            Err(e) => {
                warn!(user_id, error = %e, "Failed to fetch expenses, continuing with no data");
                Vec::new()
            }
        }
    }

    async fn fetch_budgets(&self, user_id: &str) -> Result<Vec<BudgetRecord>> {
        match self.get_data::<BudgetRecord>("budgets", user_id).await {
            Ok(budgets) => {
                debug!(user_id, count = budgets.len(), "Fetched budgets");
                Ok(budgets)
            }
            Err(Error::Upstream(msg)) => {
                warn!(user_id, error = %msg, "Budget lookup failed, treating as no budgets");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    fn host(&self) -> &str {
        self.base_url.as_deref().unwrap_or("(unconfigured)")
    }
}

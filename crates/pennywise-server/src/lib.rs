//! Pennywise Web Server
//!
//! Axum-based REST API for the Pennywise smart spending suggestions service.
//!
//! - Stateless per request: expenses and budgets are fetched from the upstream
//!   backend, analyzed, and discarded
//! - Every endpoint except `/health` answers with a `{success, data?, message?}`
//!   envelope
//! - Permissive CORS unless a production origin allow-list is configured

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use pennywise_core::{
    BackendClient, BudgetRecommender, ExpenseSource, ServiceConfig, SpendingAnalyzer,
};

mod handlers;

/// Name reported by the health check
pub const SERVICE_NAME: &str = "Pennywise Smart Suggestions API";

/// Shared application state
pub struct AppState {
    pub source: Arc<dyn ExpenseSource>,
    pub analyzer: SpendingAnalyzer,
    pub recommender: BudgetRecommender,
}

/// Response envelope shared by all API endpoints
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
        })
    }
}

/// Create the application router
pub fn create_router(source: Arc<dyn ExpenseSource>, config: &ServiceConfig) -> Router {
    let state = Arc::new(AppState {
        source,
        analyzer: SpendingAnalyzer::new().with_currency(&config.currency_symbol),
        recommender: BudgetRecommender::new().with_currency(&config.currency_symbol),
    });

    let cors = match config.cors_origins() {
        Some(allowed) => {
            let origins: Vec<HeaderValue> = allowed
                .iter()
                .filter_map(|o| match o.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin = %o, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        }
        None => CorsLayer::permissive(),
    };

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/analyze/:user_id", get(handlers::analyze_user_spending))
        .route(
            "/budget-recommendations/:user_id",
            get(handlers::get_budget_recommendations),
        )
        .route("/full-analysis/:user_id", get(handlers::get_full_analysis))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
}

/// Start the server
pub async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let client = BackendClient::from_config(&config)?;

    if config.backend_url.is_none() {
        warn!("⚠️  BACKEND_URL not set - analysis endpoints will see no expenses");
    }
    info!(
        backend = %client.host(),
        timeout_secs = config.upstream_timeout.as_secs(),
        "Upstream backend"
    );
    if let Some(origins) = config.cors_origins() {
        info!(origins = ?origins, "CORS restricted to allow-list");
    } else {
        info!(environment = %config.environment, "CORS permissive (any origin)");
    }

    let app = create_router(Arc::new(client), &config);
    let addr = format!("{}:{}", config.host, config.port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error rendered as `{success: false, message}`
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    /// 500 whose message is `"<context>: <cause>"`
    pub fn internal<E>(context: &str, err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{}: {}", context, err),
            internal: Some(err),
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Request failed");
        }

        let body = Json(ApiResponse::<()> {
            success: false,
            data: None,
            message: Some(self.message),
        });

        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests;

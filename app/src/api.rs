use axum::{Router, routing::get};

use crate::common::ApiError;

pub mod metrics;
pub mod repositories;

pub fn create_router() -> Router<crate::app::AppState> {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .route("/health", get(health))
                .nest("/metrics", metrics::routes())
                .nest("/repositories", repositories::routes()),
        )
        .fallback(async || -> ApiError {
            tracing::info!("Not Found!");
            ApiError::NotFound
        })
        .method_not_allowed_fallback(async || -> ApiError {
            tracing::info!("Method Not Allowed!");
            ApiError::MethodNotAllowed
        })
}

async fn health() -> &'static str {
    "Backend is running"
}

use anyhow::Context;
use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use validator::Validate;

use crate::{
    app::AppState,
    common::{ApiResponse, ApiResult},
    metrics::{adapters, compose, compose::ScanReport, resolver, store, tool::Tool},
    params::{Path, Query, Valid},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(extract_metrics))
        .route("/{tool}", post(submit_metrics))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RepoQuery {
    #[validate(length(min = 1, message = "repo must not be empty"))]
    pub repo: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitSummary {
    pub repository_id: i32,
    pub scan_id: i32,
    pub tool: &'static str,
}

/// Submission entry point: every CI step POSTs its raw report here, tagged
/// with the tool that produced it. An unknown tool identifier is rejected
/// up front so a misconfigured pipeline fails loudly instead of being
/// silently dropped.
#[axum::debug_handler]
pub async fn submit_metrics(
    State(AppState { db }): State<AppState>,
    Path(tool): Path<String>,
    Valid(Query(params)): Valid<Query<RepoQuery>>,
    axum::Json(payload): axum::Json<Value>,
) -> ApiResult<ApiResponse<SubmitSummary>> {
    let tool: Tool = tool.parse()?;
    let now = Utc::now();
    let window = crate::config::get().scan().window();

    let identity = resolver::resolve(&*db, &params.repo, window, now)
        .await
        .context("failed to save metrics")?;

    let batch = adapters::normalize(tool, &payload, now);
    store::apply(&*db, identity.scan_id, batch, now)
        .await
        .context("failed to save metrics")?;

    info!(repo = %params.repo, %tool, scan_id = identity.scan_id, "metrics saved");

    Ok(ApiResponse::ok(
        "metrics saved",
        Some(SubmitSummary {
            repository_id: identity.repository_id,
            scan_id: identity.scan_id,
            tool: tool.as_str(),
        }),
    ))
}

/// Query entry point: category-grouped report per scan, oldest first.
#[axum::debug_handler]
pub async fn extract_metrics(
    State(AppState { db }): State<AppState>,
    Valid(Query(params)): Valid<Query<RepoQuery>>,
) -> ApiResult<ApiResponse<Vec<ScanReport>>> {
    let reports = compose::compose(&*db, &params.repo)
        .await
        .context("failed to extract metrics")?;

    Ok(ApiResponse::ok("metrics extracted", Some(reports)))
}

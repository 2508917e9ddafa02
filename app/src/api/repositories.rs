use axum::{
    Router,
    extract::State,
    routing::{get, put},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use validator::Validate;

use crate::{
    app::AppState,
    common::{ApiError, ApiResponse, ApiResult},
    entity::repository,
    metrics::catalog::MetricId,
    params::{Json, Path, Valid},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_repositories))
        .route("/{name}/selected-metrics", put(set_selected_metrics))
}

async fn list_repositories(
    State(AppState { db }): State<AppState>,
) -> ApiResult<ApiResponse<Vec<String>>> {
    let names = repository::Entity::find()
        .order_by_asc(repository::Column::Name)
        .all(&*db)
        .await?
        .into_iter()
        .map(|repo| repo.name)
        .collect();

    Ok(ApiResponse::ok("repository list", Some(names)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SelectedMetricsBody {
    #[validate(length(min = 1, message = "metrics must not be empty"))]
    pub metrics: Vec<String>,
}

/// Hook for the pipeline-generation flow: stores which metric identifiers
/// this repository's reports should carry. Creates the repository if the
/// pipeline is configured before the first submission arrives.
#[axum::debug_handler]
pub async fn set_selected_metrics(
    State(AppState { db }): State<AppState>,
    Path(name): Path<String>,
    Valid(Json(body)): Valid<Json<SelectedMetricsBody>>,
) -> ApiResult<ApiResponse<usize>> {
    let unknown: Vec<&str> = body
        .metrics
        .iter()
        .filter(|identifier| MetricId::parse(identifier).is_none())
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(ApiError::Biz(format!(
            "unknown metric identifiers: {}",
            unknown.join(", ")
        )));
    }

    let selection = serde_json::json!(body.metrics);
    let count = body.metrics.len();
    let now = Utc::now();

    match repository::Entity::find()
        .filter(repository::Column::Name.eq(name.clone()))
        .one(&*db)
        .await?
    {
        Some(repo) => {
            let mut model: repository::ActiveModel = repo.into();
            model.selected_metrics = Set(Some(selection));
            model.update(&*db).await?;
        }
        None => {
            repository::ActiveModel {
                name: Set(name),
                selected_metrics: Set(Some(selection)),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&*db)
            .await?;
        }
    }

    Ok(ApiResponse::ok("selected metrics updated", Some(count)))
}

//! Daily arrangement endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use chrono::Local;

use super::{error, success, written, ApiResult};
use crate::db::ArrangementScope;
use crate::models::{
    Arrangement, BulkResult, DayArrangements, DayQuery, DayRequest, FieldUpdate,
    GenerateMonthRequest,
    ImportDayRequest, ImportOutcome, UpdateFieldRequest,
};
use crate::errors::AppError;
use crate::AppState;

fn scope(state: &AppState) -> ArrangementScope {
    ArrangementScope::new(state.config.arrangement_office.clone())
}

/// GET /api/arrangements?date=YYYY-MM-DD - Materialize missing rows for the
/// day (today by default) and list them.
pub async fn list_arrangements(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> ApiResult<DayArrangements> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());

    let result = state.repo.ensure_day(&scope(&state), date).await;
    written(&state, result, revision_id).await
}

/// GET /api/arrangements/{id}
pub async fn get_arrangement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Arrangement> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_arrangement(&id).await {
        Ok(Some(arrangement)) => success(arrangement, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Arrangement {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// PATCH /api/arrangements/{id} - Edit a single cell.
///
/// A body that does not parse is reported in the error envelope like any
/// other rejected edit.
pub async fn update_arrangement_field(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateFieldRequest>, JsonRejection>,
) -> ApiResult<FieldUpdate> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return error(AppError::BadRequest(rejection.body_text()), revision_id);
        }
    };

    let result = state
        .repo
        .update_field(&id, &request.field, &request.value)
        .await;
    if let Err(e) = &result {
        tracing::debug!(arrangement_id = %id, field = %request.field, "Field update rejected: {}", e);
    }
    written(&state, result, revision_id).await
}

/// POST /api/arrangements/import-day
pub async fn import_day(
    State(state): State<AppState>,
    Json(request): Json<ImportDayRequest>,
) -> ApiResult<ImportOutcome> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let result = state
        .repo
        .import_day(request.source_date, request.target_date)
        .await;
    written(&state, result, revision_id).await
}

/// POST /api/arrangements/generate-month
pub async fn generate_month(
    State(state): State<AppState>,
    Json(request): Json<GenerateMonthRequest>,
) -> ApiResult<BulkResult> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if !(1..=12).contains(&request.month) {
        return error(
            AppError::Validation(format!(
                "Month must be between 1 and 12, got {}",
                request.month
            )),
            revision_id,
        );
    }

    let result = state
        .repo
        .generate_month(&scope(&state), request.year, request.month)
        .await;
    written(&state, result, revision_id).await
}

/// POST /api/arrangements/clear-day
pub async fn clear_day(
    State(state): State<AppState>,
    Json(request): Json<DayRequest>,
) -> ApiResult<BulkResult> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let result = state.repo.clear_day(request.date).await;
    written(&state, result, revision_id).await
}

/// POST /api/arrangements/delete-day
pub async fn delete_day(
    State(state): State<AppState>,
    Json(request): Json<DayRequest>,
) -> ApiResult<BulkResult> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let result = state.repo.delete_day(request.date).await;
    written(&state, result, revision_id).await
}

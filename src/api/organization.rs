//! Department, position and office endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{error, success, written, ApiResult};
use crate::errors::AppError;
use crate::models::{
    CreateOfficeRequest, CreatePositionRequest, Department, DepartmentRequest, Office,
    OrganizationFilter, Position, UpdateOfficeRequest, UpdatePositionRequest,
};
use crate::AppState;

fn not_found<T: serde::Serialize>(label: &str, id: &str, revision_id: i64) -> ApiResult<T> {
    error(
        AppError::NotFound(format!("{} {} not found", label, id)),
        revision_id,
    )
}

/// Reject a blank required field before touching storage.
fn require<T: serde::Serialize>(
    value: Option<&str>,
    label: &str,
    revision_id: i64,
) -> Option<ApiResult<T>> {
    match value {
        Some(v) if v.trim().is_empty() => Some(error(
            AppError::Validation(format!("{} is required", label)),
            revision_id,
        )),
        _ => None,
    }
}

// ==================== DEPARTMENTS ====================

/// GET /api/departments
pub async fn list_departments(
    State(state): State<AppState>,
    Query(filter): Query<OrganizationFilter>,
) -> ApiResult<Vec<Department>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_departments(&filter).await {
        Ok(departments) => success(departments, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/departments/{id}
pub async fn get_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Department> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_department(&id).await {
        Ok(Some(department)) => success(department, revision_id),
        Ok(None) => not_found("Department", &id, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/departments
pub async fn create_department(
    State(state): State<AppState>,
    Json(request): Json<DepartmentRequest>,
) -> ApiResult<Department> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    if let Some(rejected) = require(Some(request.name.as_str()), "Name", revision_id) {
        return rejected;
    }
    let result = state.repo.create_department(&request).await;
    written(&state, result, revision_id).await
}

/// PUT /api/departments/{id}
pub async fn update_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<DepartmentRequest>,
) -> ApiResult<Department> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    if let Some(rejected) = require(Some(request.name.as_str()), "Name", revision_id) {
        return rejected;
    }
    let result = state.repo.update_department(&id, &request).await;
    written(&state, result, revision_id).await
}

/// DELETE /api/departments/{id} - Positions of the department are kept
/// without one.
pub async fn delete_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let result = state.repo.delete_department(&id).await;
    written(&state, result, revision_id).await
}

// ==================== POSITIONS ====================

/// GET /api/positions
pub async fn list_positions(
    State(state): State<AppState>,
    Query(filter): Query<OrganizationFilter>,
) -> ApiResult<Vec<Position>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_positions(&filter).await {
        Ok(positions) => success(positions, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/positions/{id}
pub async fn get_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Position> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_position(&id).await {
        Ok(Some(position)) => success(position, revision_id),
        Ok(None) => not_found("Position", &id, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/positions
pub async fn create_position(
    State(state): State<AppState>,
    Json(request): Json<CreatePositionRequest>,
) -> ApiResult<Position> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    if let Some(rejected) = require(Some(request.title.as_str()), "Title", revision_id) {
        return rejected;
    }
    let result = state.repo.create_position(&request).await;
    written(&state, result, revision_id).await
}

/// PUT /api/positions/{id}
pub async fn update_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePositionRequest>,
) -> ApiResult<Position> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    if let Some(rejected) = require(request.title.as_deref(), "Title", revision_id) {
        return rejected;
    }
    let result = state.repo.update_position(&id, &request).await;
    written(&state, result, revision_id).await
}

/// DELETE /api/positions/{id}
pub async fn delete_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let result = state.repo.delete_position(&id).await;
    written(&state, result, revision_id).await
}

// ==================== OFFICES ====================

/// GET /api/offices
pub async fn list_offices(
    State(state): State<AppState>,
    Query(filter): Query<OrganizationFilter>,
) -> ApiResult<Vec<Office>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_offices(&filter).await {
        Ok(offices) => success(offices, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/offices/{id}
pub async fn get_office(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Office> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_office(&id).await {
        Ok(Some(office)) => success(office, revision_id),
        Ok(None) => not_found("Office", &id, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/offices
pub async fn create_office(
    State(state): State<AppState>,
    Json(request): Json<CreateOfficeRequest>,
) -> ApiResult<Office> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    if let Some(rejected) = require(Some(request.name.as_str()), "Name", revision_id) {
        return rejected;
    }
    if let Some(rejected) = require(Some(request.city.as_str()), "City", revision_id) {
        return rejected;
    }
    let result = state.repo.create_office(&request).await;
    written(&state, result, revision_id).await
}

/// PUT /api/offices/{id}
pub async fn update_office(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateOfficeRequest>,
) -> ApiResult<Office> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    if let Some(rejected) = require(request.name.as_deref(), "Name", revision_id) {
        return rejected;
    }
    if let Some(rejected) = require(request.city.as_deref(), "City", revision_id) {
        return rejected;
    }
    let result = state.repo.update_office(&id, &request).await;
    written(&state, result, revision_id).await
}

/// DELETE /api/offices/{id}
pub async fn delete_office(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let result = state.repo.delete_office(&id).await;
    written(&state, result, revision_id).await
}

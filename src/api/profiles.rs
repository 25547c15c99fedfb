//! Profile API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{error, success, written, ApiResult};
use crate::errors::AppError;
use crate::models::{
    CreateProfileRequest, NewProfile, Profile, ProfileFilter, UpdateProfileRequest,
};
use crate::AppState;

/// GET /api/profiles - List profiles, optionally filtered.
pub async fn list_profiles(
    State(state): State<AppState>,
    Query(filter): Query<ProfileFilter>,
) -> ApiResult<Vec<Profile>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_profiles(&filter).await {
        Ok(profiles) => success(profiles, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/profiles/{id} - Get a single profile.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Profile> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_profile(&id).await {
        Ok(Some(profile)) => success(profile, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Profile {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/profiles - Create a profile, deriving birth date and gender
/// from the PIN when they are not given.
pub async fn create_profile(
    State(state): State<AppState>,
    Json(request): Json<CreateProfileRequest>,
) -> ApiResult<Profile> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let new_profile = match NewProfile::from_request(&request) {
        Ok(profile) => profile,
        Err(e) => return error(e, revision_id),
    };

    let result = state.repo.create_profile(&new_profile).await;
    if let Ok(profile) = &result {
        reindex(&state, profile).await;
    }
    written(&state, result, revision_id).await
}

/// PUT /api/profiles/{id} - Update a profile.
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Profile> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let result = state.repo.update_profile(&id, &request).await;
    if let Ok(profile) = &result {
        reindex(&state, profile).await;
    }
    written(&state, result, revision_id).await
}

async fn reindex(state: &AppState, profile: &Profile) {
    if let Err(e) = state.search.index_profile(profile).await {
        tracing::warn!(profile_id = %profile.id, "Failed to index profile: {}", e);
    }
}

//! PIN check endpoint.

use axum::extract::{Path, State};

use super::{error, success, ApiResult};
use crate::pin::{self, PinInfo};
use crate::AppState;

/// GET /api/pin/{pin} - Decode birth date and gender from a PIN.
pub async fn check_pin(
    State(state): State<AppState>,
    Path(value): Path<String>,
) -> ApiResult<PinInfo> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match pin::parse(value.trim()) {
        Ok(info) => success(info, revision_id),
        Err(e) => error(e.into(), revision_id),
    }
}

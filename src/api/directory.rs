//! Phone directory endpoints.

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Local;

use super::{error, success, ApiResult};
use crate::errors::{AppError, AppErrorWithRevision};
use crate::export::{self, DirectorySettings, OfficeSheet};
use crate::AppState;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn settings(state: &AppState) -> DirectorySettings {
    DirectorySettings {
        central_office_name: state.config.central_office_name.clone(),
        central_office_fax: state.config.central_office_fax.clone(),
    }
}

async fn grouped(state: &AppState) -> Result<Vec<OfficeSheet>, AppError> {
    let entries = state.repo.list_directory_entries().await?;
    Ok(export::group_directory(entries))
}

/// GET /api/directory - The grouped phone directory as JSON.
pub async fn get_directory(State(state): State<AppState>) -> ApiResult<Vec<OfficeSheet>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match grouped(&state).await {
        Ok(sheets) => success(sheets, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/directory/export - The phone directory as an xlsx download.
pub async fn export_directory(State(state): State<AppState>) -> Response {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let bytes = match grouped(&state)
        .await
        .and_then(|sheets| export::render_workbook(&sheets, &settings(&state)))
    {
        Ok(bytes) => bytes,
        Err(e) => {
            return AppErrorWithRevision {
                error: e,
                revision_id,
            }
            .into_response()
        }
    };

    let filename = export::export_filename(Local::now().date_naive());
    tracing::info!(%filename, size = bytes.len(), "Exported phone directory");

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

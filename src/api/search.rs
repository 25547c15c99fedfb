//! Employee search endpoint.

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::models::Profile;
use crate::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Free text matched against names, PINs, phones and office numbers.
    pub q: String,
    /// Maximum number of results (default: 20, at most 100).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    20
}

/// Matching profiles with paging metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// One matching profile and its relevance score.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    pub profile: Profile,
    pub score: f32,
}

/// Upper bound on `limit`.
const MAX_SEARCH_LIMIT: usize = 100;

/// GET /api/profiles/search - Full-text search over names, PINs and phones.
pub async fn search_profiles(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<SearchResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let limit = params.limit.clamp(1, MAX_SEARCH_LIMIT);

    let hits = match state.search.search(&params.q, limit, params.offset) {
        Ok(hits) => hits,
        Err(e) => return error(e, revision_id),
    };

    let mut results = Vec::with_capacity(hits.len());
    for hit in hits {
        if let Ok(Some(profile)) = state.repo.get_profile(&hit.profile_id).await {
            results.push(SearchResultItem {
                profile,
                score: hit.score,
            });
        }
    }

    let total = results.len();
    success(
        SearchResponse {
            results,
            total,
            limit,
            offset: params.offset,
        },
        revision_id,
    )
}

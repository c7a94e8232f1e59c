use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::cache::SUGGESTION_CACHE_TTL;
use crate::db::CacheKey;
use crate::middleware::RequestContext;
use crate::models::{Daypart, SuggestionResponse};

use super::AppState;

/// Identity header set by the upstream session layer; absent means anonymous
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    /// Which surface requested suggestions (e.g. "home", "explore").
    /// Currently informational only.
    pub context: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// `GET /api/suggestions`
///
/// Reads the resolved user identity and client time from headers, consults
/// the short-lived response cache keyed by `(user, daypart)`, and otherwise
/// runs the engine. This handler never fails: the engine degrades internally
/// and cache problems are logged and skipped.
pub async fn get_suggestions(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    headers: HeaderMap,
    Query(query): Query<SuggestionsQuery>,
) -> Json<SuggestionResponse> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned);

    let hour = context.client_time.effective_hour();
    let daypart = Daypart::from_hour(hour);
    let cache_key = match &user_id {
        Some(user) => CacheKey::UserSuggestions(user.clone(), daypart),
        None => CacheKey::DefaultSuggestions(daypart),
    };

    tracing::debug!(
        user = user_id.as_deref().unwrap_or("anonymous"),
        %daypart,
        context = query.context.as_deref().unwrap_or("-"),
        "suggestions requested"
    );

    if let Some(cache) = &state.cache {
        match cache.get_from_cache::<SuggestionResponse>(&cache_key).await {
            Ok(Some(cached)) => return Json(cached),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "suggestion cache read failed"),
        }
    }

    let response = state
        .engine
        .personalized(user_id.as_deref(), context.client_time)
        .await;

    if let Some(cache) = &state.cache {
        cache.set_in_background(&cache_key, &response, SUGGESTION_CACHE_TTL);
    }

    Json(response)
}

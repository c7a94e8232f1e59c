use std::sync::Arc;

use crate::db::Cache;
use crate::services::suggestions::SuggestionEngine;

/// Shared application state.
///
/// The engine is read-only and safe to share across requests without
/// coordination. The cache is optional so router-level tests run without a
/// Redis instance.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SuggestionEngine>,
    pub cache: Option<Cache>,
}

impl AppState {
    pub fn new(engine: Arc<SuggestionEngine>, cache: Option<Cache>) -> Self {
        Self { engine, cache }
    }
}

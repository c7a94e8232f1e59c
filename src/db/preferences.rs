use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::{TypePreference, UserTypePreferences};
use crate::services::suggestions::PreferenceStore;

/// Postgres-backed read access to the `user_type_preferences` counters.
///
/// Strictly read-only: the interaction-tracking collaborator owns the writes,
/// which keeps recommendation idempotent and safe to retry or cache.
pub struct PgPreferenceStore {
    pool: PgPool,
}

impl PgPreferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn user_type_preferences(&self, user_id: &str) -> AppResult<UserTypePreferences> {
        let primary: Vec<(String, i64)> = sqlx::query_as(
            "SELECT place_type, primary_type_preference \
             FROM user_type_preferences \
             WHERE user_id = $1 AND primary_type_preference > 0 \
             ORDER BY primary_type_preference DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let all: Vec<(String, i64)> = sqlx::query_as(
            "SELECT place_type, type_preference \
             FROM user_type_preferences \
             WHERE user_id = $1 AND type_preference > 0 \
             ORDER BY type_preference DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let into_preferences = |rows: Vec<(String, i64)>| {
            rows.into_iter()
                .map(|(place_type, count)| TypePreference { place_type, count })
                .collect()
        };

        Ok(UserTypePreferences {
            primary_types: into_preferences(primary),
            all_types: into_preferences(all),
        })
    }
}

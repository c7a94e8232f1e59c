//! The exploitation/exploration suggestion allocator.
//!
//! Each request is an independent computation over the immutable catalog and
//! a fresh read of the user's preference counters; there is no shared mutable
//! state and nothing here writes back to the counters.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;

use crate::catalog::{Catalog, CategoryGroup, CategoryPurpose};
use crate::error::AppResult;
use crate::models::{
    ClientTime, Daypart, Suggestion, SuggestionMetadata, SuggestionResponse, SuggestionSource,
    UserTypePreferences,
};

use super::sampling::weighted_sample_without_replacement;

/// Fixed suggestion budget per response
pub const MAX_SUGGESTIONS: usize = 5;

/// Candidate caps applied to the two preference tiers before aggregation
const PRIMARY_TYPE_CANDIDATES: usize = 10;
const SECONDARY_TYPE_CANDIDATES: usize = 15;

/// Default weight when a group carries none; keeps unweighted groups
/// eligible for exploration without letting a true zero weight win
const UNWEIGHTED_GROUP_WEIGHT: f64 = 1.0;

/// Exploration weight multipliers
const DAYPART_DEFAULT_BOOST: f64 = 3.0;
const TIME_APPROPRIATE_BOOST: f64 = 1.2;
const TIME_INAPPROPRIATE_PENALTY: f64 = 0.2;

/// Read-only access to a user's per-type interaction counters.
///
/// Both lists arrive sorted descending by count. Incrementing the counters is
/// the job of the interaction-tracking collaborator, never this service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn user_type_preferences(&self, user_id: &str) -> AppResult<UserTypePreferences>;
}

/// Time-aware, exploration/exploitation category recommender
pub struct SuggestionEngine {
    catalog: Arc<Catalog>,
    store: Arc<dyn PreferenceStore>,
}

impl SuggestionEngine {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn PreferenceStore>) -> Self {
        Self { catalog, store }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Builds a suggestion list for the given user and client time.
    ///
    /// This never fails: an anonymous user, an empty preference set and a
    /// broken preference read all degrade to the time-based defaults. The
    /// infallible return type is the contract, not a convention.
    pub async fn personalized(
        &self,
        user_id: Option<&str>,
        time: ClientTime,
    ) -> SuggestionResponse {
        let hour = time.effective_hour();

        let Some(user_id) = user_id else {
            return self.default_response(hour);
        };

        match self.store.user_type_preferences(user_id).await {
            Ok(preferences) => self.assemble(&preferences, hour, &mut rand::thread_rng()),
            Err(error) => {
                tracing::error!(
                    error = %error,
                    user_id,
                    "preference read failed, serving time-based defaults"
                );
                self.default_response(hour)
            }
        }
    }

    /// Time-based defaults: the anonymous path, the empty-preferences path
    /// and the degradation path all land here.
    pub fn default_response(&self, hour: u32) -> SuggestionResponse {
        let daypart = Daypart::from_hour(hour);
        let suggestions: Vec<Suggestion> = self
            .catalog
            .time_defaults(daypart)
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .cloned()
            .map(Suggestion::from_group)
            .collect();

        SuggestionResponse {
            suggestions: deduplicate_suggestions(suggestions),
            metadata: SuggestionMetadata {
                source: Some(SuggestionSource::Default),
                has_preferences: false,
                user_preferences_count: None,
                exploration_used: Some(true),
                exploitation_suggestions: None,
                exploration_suggestions: None,
            },
        }
    }

    /// Core allocation over an already-fetched preference set.
    ///
    /// Synchronous and deterministic given the generator, which is what the
    /// seeded tests rely on.
    pub fn assemble(
        &self,
        preferences: &UserTypePreferences,
        hour: u32,
        rng: &mut impl Rng,
    ) -> SuggestionResponse {
        if preferences.is_empty() {
            // Distinct path from anonymous: we looked and found nothing
            return self.default_response(hour);
        }

        // Primary-type preferences go first so they win downstream slicing
        let candidate_types: Vec<&str> = preferences
            .primary_types
            .iter()
            .take(PRIMARY_TYPE_CANDIDATES)
            .chain(preferences.all_types.iter().take(SECONDARY_TYPE_CANDIDATES))
            .map(|p| p.place_type.as_str())
            .collect();

        let preference_count = preferences.preference_count();
        let ratio = exploitation_ratio(preference_count);
        let (exploitation_budget, exploration_budget) = slot_split(ratio);

        let interaction_counts = self.group_interaction_counts(preferences);
        let exploitation: Vec<CategoryGroup> = self
            .catalog
            .groups_from_types(&candidate_types)
            .into_iter()
            .filter(|g| self.exploitable(g, &interaction_counts))
            .take(exploitation_budget)
            .cloned()
            .collect();

        let mut chosen_ids: HashSet<String> =
            exploitation.iter().map(|g| g.id.clone()).collect();

        let exploration =
            self.exploration_suggestions(&chosen_ids, exploration_budget, Some(hour), rng);
        chosen_ids.extend(exploration.iter().map(|g| g.id.clone()));

        let exploitation_ids: Vec<String> =
            exploitation.iter().map(|g| g.id.clone()).collect();
        let mut exploration_ids: Vec<String> =
            exploration.iter().map(|g| g.id.clone()).collect();

        let mut combined: Vec<Suggestion> = exploitation
            .into_iter()
            .map(Suggestion::from_group)
            .chain(exploration.into_iter().map(Suggestion::random_exploration))
            .collect();

        // Backfill: dedup or catalog exhaustion can leave the budget short.
        // The extra batch is exploration too, and is recorded as such so the
        // client can still render provenance.
        if combined.len() < MAX_SUGGESTIONS {
            let backfill = self.exploration_suggestions(
                &chosen_ids,
                MAX_SUGGESTIONS - combined.len(),
                Some(hour),
                rng,
            );
            for group in backfill {
                exploration_ids.push(group.id.clone());
                combined.push(Suggestion::random_exploration(group));
            }
        }

        let mut suggestions = deduplicate_suggestions(combined);
        suggestions.truncate(MAX_SUGGESTIONS);

        let exploitation_used = suggestions
            .iter()
            .filter(|s| !s.is_random_exploration)
            .count();
        let source = if exploitation_used == 0 {
            SuggestionSource::Exploration
        } else if exploitation_used == suggestions.len() {
            SuggestionSource::UserPreferences
        } else {
            SuggestionSource::Mixed
        };

        tracing::debug!(
            preference_count,
            ratio,
            exploitation_budget,
            exploration_budget,
            returned = suggestions.len(),
            "assembled personalized suggestions"
        );

        SuggestionResponse {
            suggestions,
            metadata: SuggestionMetadata {
                source: Some(source),
                has_preferences: true,
                user_preferences_count: Some(preference_count),
                exploration_used: Some(!exploration_ids.is_empty()),
                exploitation_suggestions: Some(exploitation_ids),
                exploration_suggestions: Some(exploration_ids),
            },
        }
    }

    /// Weighted exploration over the catalog, excluding already-chosen ids
    /// and groups that require explicit user intent.
    pub fn exploration_suggestions(
        &self,
        excluded_ids: &HashSet<String>,
        count: usize,
        client_hour: Option<u32>,
        rng: &mut impl Rng,
    ) -> Vec<CategoryGroup> {
        if count == 0 {
            return Vec::new();
        }

        let daypart = client_hour.map(sampler_daypart);
        let default_ids: HashSet<String> = daypart
            .map(|d| {
                self.catalog
                    .time_defaults(d)
                    .into_iter()
                    .map(|g| g.id.clone())
                    .collect()
            })
            .unwrap_or_default();

        let pool: Vec<(CategoryGroup, f64)> = self
            .catalog
            .groups()
            .iter()
            .filter(|g| !excluded_ids.contains(&g.id) && !g.requires_user_intent)
            .map(|g| {
                let mut weight = g.weight.unwrap_or(UNWEIGHTED_GROUP_WEIGHT);
                if let Some(daypart) = daypart {
                    if default_ids.contains(&g.id) {
                        weight *= DAYPART_DEFAULT_BOOST;
                    } else {
                        match g.time_opinion(daypart) {
                            Some(false) => weight *= TIME_INAPPROPRIATE_PENALTY,
                            Some(true) => weight *= TIME_APPROPRIATE_BOOST,
                            None => {}
                        }
                    }
                }
                (g.clone(), weight)
            })
            .collect();

        weighted_sample_without_replacement(rng, pool, count)
    }

    /// Total interaction count per resolvable group, both tiers combined
    fn group_interaction_counts(&self, preferences: &UserTypePreferences) -> HashMap<String, i64> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for preference in preferences
            .primary_types
            .iter()
            .chain(preferences.all_types.iter())
        {
            if let Some(group) = self.catalog.find_group_for_type(&preference.place_type) {
                *counts.entry(group.id.clone()).or_default() += preference.count;
            }
        }
        counts
    }

    /// Contextual groups are gated behind demonstrated intent and an optional
    /// minimum interaction count; everything else exploits freely.
    fn exploitable(&self, group: &CategoryGroup, counts: &HashMap<String, i64>) -> bool {
        if group.purpose != CategoryPurpose::Contextual {
            return true;
        }
        let count = counts.get(&group.id).copied().unwrap_or(0);
        if group.requires_user_intent && count == 0 {
            return false;
        }
        match group.metadata.minimum_interaction_count {
            Some(minimum) => count >= minimum,
            None => true,
        }
    }
}

/// Exploitation share of the budget as a function of user maturity.
///
/// New users (<= 3 preferences) get 40% exploration; established users
/// (>= 15) get 20%; the ramp between is linear.
pub fn exploitation_ratio(preference_count: usize) -> f64 {
    if preference_count <= 3 {
        0.6
    } else if preference_count >= 15 {
        0.8
    } else {
        0.6 + (preference_count as f64 - 3.0) * (0.2 / 12.0)
    }
}

/// Splits the fixed budget into exploitation and exploration slots
fn slot_split(ratio: f64) -> (usize, usize) {
    let exploitation = (MAX_SUGGESTIONS as f64 * ratio).ceil() as usize;
    let exploitation = exploitation.min(MAX_SUGGESTIONS);
    (exploitation, MAX_SUGGESTIONS - exploitation)
}

/// Daypart classification inside the sampler. An unmatched hour indicates a
/// boundary bug upstream, so it is logged rather than silently absorbed.
fn sampler_daypart(hour: u32) -> Daypart {
    match Daypart::classify(hour) {
        Some(daypart) => daypart,
        None => {
            tracing::warn!(hour, "hour outside daypart partition, defaulting to evening");
            Daypart::Evening
        }
    }
}

/// Removes duplicate suggestion ids; first occurrence wins, order preserved.
/// Must run as the last step before a response leaves the allocator.
pub fn deduplicate_suggestions(suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    let mut seen = HashSet::new();
    suggestions
        .into_iter()
        .filter(|s| seen.insert(s.group.id.clone()))
        .collect()
}

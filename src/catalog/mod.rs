use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::Daypart;

pub mod data;

/// Fixed fallback used when too few groups are annotated for late night.
/// The catalog can be edited without every group carrying time flags, so the
/// dynamic late-night pick may come up short.
const LATE_NIGHT_FALLBACK: [&str; 5] =
    ["restaurants", "bars", "entertainment", "cafes", "desserts"];

/// How prominently a category participates in suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryPurpose {
    Primary,
    Secondary,
    Contextual,
}

/// A concrete, queryable place-type leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceType {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Static per-group annotations consulted during selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMetadata {
    /// Daypart appropriateness flags. An absent key means "no opinion",
    /// which is distinct from `false`.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub time_appropriate: HashMap<Daypart, bool>,
    /// A contextual group must not be exploited below this interaction count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_interaction_count: Option<i64>,
}

/// A user-facing suggestion category containing one or more place types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    pub id: String,
    pub title: String,
    /// Search query issued when the user taps this suggestion
    pub query: String,
    pub purpose: CategoryPurpose,
    /// Never suggest this group to a user with no explicit interaction in it
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub requires_user_intent: bool,
    pub types: Vec<PlaceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub metadata: GroupMetadata,
}

impl CategoryGroup {
    /// `true` unless the group explicitly opts out of the daypart
    pub fn time_opinion(&self, daypart: Daypart) -> Option<bool> {
        self.metadata.time_appropriate.get(&daypart).copied()
    }
}

/// Immutable registry of category groups plus derived indices.
///
/// Constructed once at startup and shared by reference; tests inject smaller
/// synthetic catalogs.
#[derive(Debug, Clone)]
pub struct Catalog {
    groups: Vec<CategoryGroup>,
    by_id: HashMap<String, usize>,
    daypart_defaults: HashMap<Daypart, Vec<String>>,
    general_defaults: Vec<String>,
}

impl Catalog {
    pub fn new(
        groups: Vec<CategoryGroup>,
        daypart_defaults: HashMap<Daypart, Vec<String>>,
        general_defaults: Vec<String>,
    ) -> Self {
        let by_id = groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.id.clone(), i))
            .collect();
        Self {
            groups,
            by_id,
            daypart_defaults,
            general_defaults,
        }
    }

    /// The built-in production catalog
    pub fn builtin() -> Self {
        data::builtin_catalog()
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    pub fn get(&self, id: &str) -> Option<&CategoryGroup> {
        self.by_id.get(id).map(|&i| &self.groups[i])
    }

    /// Resolves a raw type identifier to its owning group.
    ///
    /// Resolution order: exact group id; the segment before the first
    /// underscore as a group id; an exact `PlaceType` id scan; a synthesized
    /// `{group_id}_{type_id}` scan. `None` means the preference should be
    /// ignored, not that the input is invalid.
    pub fn find_group_for_type(&self, raw: &str) -> Option<&CategoryGroup> {
        if let Some(group) = self.get(raw) {
            return Some(group);
        }
        if let Some((prefix, _)) = raw.split_once('_') {
            if let Some(group) = self.get(prefix) {
                return Some(group);
            }
        }
        if let Some(group) = self
            .groups
            .iter()
            .find(|g| g.types.iter().any(|t| t.id == raw))
        {
            return Some(group);
        }
        self.groups.iter().find(|g| {
            g.types
                .iter()
                .any(|t| raw == format!("{}_{}", g.id, t.id))
        })
    }

    /// Maps raw type identifiers to owning groups, dropping unresolvable
    /// entries and duplicate groups. Insertion order is preserved.
    pub fn groups_from_types<S: AsRef<str>>(&self, types: &[S]) -> Vec<&CategoryGroup> {
        let mut seen = std::collections::HashSet::new();
        let mut result = Vec::new();
        for raw in types {
            if let Some(group) = self.find_group_for_type(raw.as_ref()) {
                if seen.insert(group.id.as_str()) {
                    result.push(group);
                }
            }
        }
        result
    }

    pub fn primary_groups(&self) -> Vec<&CategoryGroup> {
        self.groups
            .iter()
            .filter(|g| g.purpose == CategoryPurpose::Primary)
            .collect()
    }

    pub fn contextual_groups(&self) -> Vec<&CategoryGroup> {
        self.groups
            .iter()
            .filter(|g| g.purpose == CategoryPurpose::Contextual)
            .collect()
    }

    /// Default suggestions for a daypart.
    ///
    /// Morning, lunch and evening carry curated lists; afternoon falls to the
    /// general, non-time-filtered default set. Late night is computed from
    /// the `time_appropriate` annotations (top 5 by weight) with a fixed
    /// fallback when too few groups qualify.
    pub fn time_defaults(&self, daypart: Daypart) -> Vec<&CategoryGroup> {
        match daypart {
            Daypart::LateNight => self.late_night_defaults(),
            Daypart::Afternoon => self.resolve_ids(&self.general_defaults),
            _ => match self.daypart_defaults.get(&daypart) {
                Some(ids) => self.resolve_ids(ids),
                None => self.resolve_ids(&self.general_defaults),
            },
        }
    }

    fn late_night_defaults(&self) -> Vec<&CategoryGroup> {
        let mut qualifying: Vec<&CategoryGroup> = self
            .groups
            .iter()
            .filter(|g| g.time_opinion(Daypart::LateNight) == Some(true))
            .collect();
        qualifying.sort_by(|a, b| {
            b.weight
                .unwrap_or(0.0)
                .total_cmp(&a.weight.unwrap_or(0.0))
        });
        qualifying.truncate(5);
        if qualifying.len() < 5 {
            return self.resolve_ids(&LATE_NIGHT_FALLBACK);
        }
        qualifying
    }

    fn resolve_ids<S: AsRef<str>>(&self, ids: &[S]) -> Vec<&CategoryGroup> {
        ids.iter().filter_map(|id| self.get(id.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str, purpose: CategoryPurpose, types: &[&str]) -> CategoryGroup {
        CategoryGroup {
            id: id.to_string(),
            title: id.to_string(),
            query: format!("{} near me", id),
            purpose,
            requires_user_intent: false,
            types: types
                .iter()
                .map(|t| PlaceType {
                    id: t.to_string(),
                    name: t.to_string(),
                    base_weight: None,
                    image_url: None,
                })
                .collect(),
            weight: Some(10.0),
            metadata: GroupMetadata::default(),
        }
    }

    fn small_catalog() -> Catalog {
        let cafes = group(
            "cafes",
            CategoryPurpose::Primary,
            &["cafe", "coffee_shop", "bakery"],
        );
        let desserts = group(
            "desserts",
            CategoryPurpose::Secondary,
            &["dessert_shop", "bakery"],
        );
        let bars = group("bars", CategoryPurpose::Primary, &["bar", "wine_bar"]);
        let hotels = group("hotels", CategoryPurpose::Contextual, &["hotel"]);
        Catalog::new(
            vec![cafes, desserts, bars, hotels],
            HashMap::new(),
            vec!["cafes".to_string(), "bars".to_string()],
        )
    }

    #[test]
    fn test_find_group_exact_group_id() {
        let catalog = small_catalog();
        assert_eq!(catalog.find_group_for_type("bars").unwrap().id, "bars");
    }

    #[test]
    fn test_find_group_underscore_prefix() {
        let catalog = small_catalog();
        // "bars_speakeasy" is not a known type, but its prefix is a group id
        assert_eq!(
            catalog.find_group_for_type("bars_speakeasy").unwrap().id,
            "bars"
        );
    }

    #[test]
    fn test_find_group_by_place_type_scan() {
        let catalog = small_catalog();
        assert_eq!(
            catalog.find_group_for_type("wine_bar").unwrap().id,
            "bars"
        );
    }

    #[test]
    fn test_find_group_synthesized_match() {
        let catalog = small_catalog();
        assert_eq!(
            catalog.find_group_for_type("desserts_bakery").unwrap().id,
            "desserts"
        );
    }

    #[test]
    fn test_find_group_duplicate_type_resolves_to_first_owner() {
        let catalog = small_catalog();
        // "bakery" appears in both cafes and desserts; the scan is in
        // catalog order, so cafes wins
        assert_eq!(catalog.find_group_for_type("bakery").unwrap().id, "cafes");
    }

    #[test]
    fn test_find_group_unknown_returns_none() {
        let catalog = small_catalog();
        assert!(catalog.find_group_for_type("space_elevator").is_none());
    }

    #[test]
    fn test_groups_from_types_dedups_and_keeps_order() {
        let catalog = small_catalog();
        let groups =
            catalog.groups_from_types(&["wine_bar", "bakery", "bar", "coffee_shop", "nonsense"]);
        let ids: Vec<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["bars", "cafes"]);
    }

    #[test]
    fn test_purpose_filters() {
        let catalog = small_catalog();
        assert_eq!(catalog.primary_groups().len(), 2);
        assert_eq!(catalog.contextual_groups().len(), 1);
        assert_eq!(catalog.contextual_groups()[0].id, "hotels");
    }

    #[test]
    fn test_afternoon_uses_general_defaults() {
        let catalog = small_catalog();
        let ids: Vec<&str> = catalog
            .time_defaults(Daypart::Afternoon)
            .iter()
            .map(|g| g.id.as_str())
            .collect();
        assert_eq!(ids, vec!["cafes", "bars"]);
    }

    #[test]
    fn test_late_night_falls_back_when_unannotated() {
        // No group in the small catalog carries a lateNight flag, so the
        // fixed fallback applies; only ids present in the catalog survive
        let catalog = small_catalog();
        let ids: Vec<&str> = catalog
            .time_defaults(Daypart::LateNight)
            .iter()
            .map(|g| g.id.as_str())
            .collect();
        assert_eq!(ids, vec!["bars", "cafes", "desserts"]);
    }

    #[test]
    fn test_builtin_group_ids_unique() {
        let catalog = Catalog::builtin();
        let mut seen = std::collections::HashSet::new();
        for g in catalog.groups() {
            assert!(seen.insert(g.id.clone()), "duplicate group id {}", g.id);
            assert!(!g.types.is_empty(), "group {} has no types", g.id);
        }
    }

    #[test]
    fn test_builtin_late_night_is_dynamic_top_five() {
        let catalog = Catalog::builtin();
        let picks = catalog.time_defaults(Daypart::LateNight);
        assert_eq!(picks.len(), 5);
        for pair in picks.windows(2) {
            assert!(pair[0].weight.unwrap_or(0.0) >= pair[1].weight.unwrap_or(0.0));
        }
        for g in &picks {
            assert_eq!(g.time_opinion(Daypart::LateNight), Some(true));
        }
    }

    #[test]
    fn test_builtin_fallback_ids_exist() {
        let catalog = Catalog::builtin();
        for id in LATE_NIGHT_FALLBACK {
            assert!(catalog.get(id).is_some(), "missing fallback group {}", id);
        }
    }

    #[test]
    fn test_builtin_defaults_resolve_for_every_daypart() {
        let catalog = Catalog::builtin();
        for daypart in [
            Daypart::Morning,
            Daypart::Lunch,
            Daypart::Afternoon,
            Daypart::Evening,
            Daypart::LateNight,
        ] {
            assert!(
                !catalog.time_defaults(daypart).is_empty(),
                "no defaults for {}",
                daypart
            );
        }
    }
}

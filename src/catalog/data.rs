//! Built-in production catalog.
//!
//! Group ids are stable identifiers used in cache keys and client routing;
//! renaming one is a breaking change. Type ids may repeat across groups
//! (e.g. `bakery` under both cafes and desserts) and the lookup logic in the
//! parent module is written to tolerate that.

use std::collections::HashMap;

use crate::models::Daypart;

use super::{Catalog, CategoryGroup, CategoryPurpose, GroupMetadata, PlaceType};

fn place_type(id: &str, name: &str) -> PlaceType {
    PlaceType {
        id: id.to_string(),
        name: name.to_string(),
        base_weight: None,
        image_url: None,
    }
}

fn weighted_type(id: &str, name: &str, base_weight: f64) -> PlaceType {
    PlaceType {
        base_weight: Some(base_weight),
        ..place_type(id, name)
    }
}

struct GroupDef {
    id: &'static str,
    title: &'static str,
    query: &'static str,
    purpose: CategoryPurpose,
    requires_user_intent: bool,
    weight: Option<f64>,
    time_appropriate: &'static [(Daypart, bool)],
    minimum_interaction_count: Option<i64>,
    types: Vec<PlaceType>,
}

impl GroupDef {
    fn build(self) -> CategoryGroup {
        CategoryGroup {
            id: self.id.to_string(),
            title: self.title.to_string(),
            query: self.query.to_string(),
            purpose: self.purpose,
            requires_user_intent: self.requires_user_intent,
            types: self.types,
            weight: self.weight,
            metadata: GroupMetadata {
                time_appropriate: self.time_appropriate.iter().copied().collect(),
                minimum_interaction_count: self.minimum_interaction_count,
            },
        }
    }
}

pub fn builtin_catalog() -> Catalog {
    use Daypart::*;

    let groups = vec![
        GroupDef {
            id: "restaurants",
            title: "Restaurants",
            query: "restaurants near me",
            purpose: CategoryPurpose::Primary,
            requires_user_intent: false,
            weight: Some(30.0),
            time_appropriate: &[(Lunch, true), (Evening, true), (LateNight, true)],
            minimum_interaction_count: None,
            types: vec![
                weighted_type("restaurant", "Restaurant", 15.0),
                weighted_type("thai_restaurant", "Thai Restaurant", 12.0),
                weighted_type("japanese_restaurant", "Japanese Restaurant", 12.0),
                weighted_type("italian_restaurant", "Italian Restaurant", 12.0),
                place_type("mexican_restaurant", "Mexican Restaurant"),
                place_type("indian_restaurant", "Indian Restaurant"),
                place_type("fine_dining_restaurant", "Fine Dining"),
            ],
        },
        GroupDef {
            id: "cafes",
            title: "Cafes",
            query: "cafes near me",
            purpose: CategoryPurpose::Primary,
            requires_user_intent: false,
            weight: Some(25.0),
            time_appropriate: &[
                (Morning, true),
                (Lunch, true),
                (Afternoon, true),
                (LateNight, true),
            ],
            minimum_interaction_count: None,
            types: vec![
                weighted_type("cafe", "Cafe", 15.0),
                weighted_type("coffee_shop", "Coffee Shop", 15.0),
                place_type("bakery", "Bakery"),
                place_type("tea_house", "Tea House"),
            ],
        },
        GroupDef {
            id: "bars",
            title: "Bars",
            query: "bars near me",
            purpose: CategoryPurpose::Primary,
            requires_user_intent: false,
            weight: Some(20.0),
            time_appropriate: &[(Morning, false), (Evening, true), (LateNight, true)],
            minimum_interaction_count: None,
            types: vec![
                weighted_type("bar", "Bar", 15.0),
                place_type("pub", "Pub"),
                place_type("wine_bar", "Wine Bar"),
                place_type("cocktail_bar", "Cocktail Bar"),
            ],
        },
        GroupDef {
            id: "breakfast",
            title: "Breakfast & Brunch",
            query: "breakfast near me",
            purpose: CategoryPurpose::Primary,
            requires_user_intent: false,
            weight: Some(18.0),
            time_appropriate: &[(Morning, true), (Evening, false), (LateNight, false)],
            minimum_interaction_count: None,
            types: vec![
                weighted_type("breakfast_restaurant", "Breakfast Spot", 12.0),
                place_type("brunch_restaurant", "Brunch Spot"),
                place_type("diner", "Diner"),
            ],
        },
        GroupDef {
            id: "desserts",
            title: "Desserts",
            query: "desserts near me",
            purpose: CategoryPurpose::Secondary,
            requires_user_intent: false,
            weight: Some(15.0),
            time_appropriate: &[(Afternoon, true), (Evening, true), (LateNight, true)],
            minimum_interaction_count: None,
            types: vec![
                place_type("dessert_shop", "Dessert Shop"),
                place_type("ice_cream_shop", "Ice Cream"),
                place_type("bakery", "Bakery"),
            ],
        },
        GroupDef {
            id: "entertainment",
            title: "Entertainment",
            query: "entertainment near me",
            purpose: CategoryPurpose::Primary,
            requires_user_intent: false,
            weight: Some(20.0),
            time_appropriate: &[(Evening, true), (LateNight, true)],
            minimum_interaction_count: None,
            types: vec![
                weighted_type("movie_theater", "Movie Theater", 12.0),
                place_type("bowling_alley", "Bowling"),
                place_type("karaoke", "Karaoke"),
                place_type("arcade", "Arcade"),
            ],
        },
        GroupDef {
            id: "nightlife",
            title: "Night Clubs",
            query: "night clubs near me",
            purpose: CategoryPurpose::Secondary,
            requires_user_intent: false,
            weight: Some(12.0),
            time_appropriate: &[
                (Morning, false),
                (Lunch, false),
                (Evening, true),
                (LateNight, true),
            ],
            minimum_interaction_count: None,
            types: vec![
                place_type("night_club", "Night Club"),
                place_type("dance_hall", "Dance Hall"),
            ],
        },
        GroupDef {
            id: "parks",
            title: "Parks & Outdoors",
            query: "parks near me",
            purpose: CategoryPurpose::Primary,
            requires_user_intent: false,
            weight: Some(18.0),
            time_appropriate: &[(Morning, true), (Afternoon, true), (LateNight, false)],
            minimum_interaction_count: None,
            types: vec![
                weighted_type("park", "Park", 12.0),
                place_type("botanical_garden", "Botanical Garden"),
                place_type("hiking_trail", "Hiking Trail"),
            ],
        },
        GroupDef {
            id: "museums",
            title: "Museums & Galleries",
            query: "museums near me",
            purpose: CategoryPurpose::Secondary,
            requires_user_intent: false,
            weight: Some(15.0),
            time_appropriate: &[(Afternoon, true), (LateNight, false)],
            minimum_interaction_count: None,
            types: vec![
                place_type("museum", "Museum"),
                place_type("art_gallery", "Art Gallery"),
                place_type("aquarium", "Aquarium"),
            ],
        },
        GroupDef {
            id: "shopping",
            title: "Shopping",
            query: "shopping near me",
            purpose: CategoryPurpose::Secondary,
            requires_user_intent: false,
            weight: Some(15.0),
            time_appropriate: &[(Afternoon, true), (LateNight, false)],
            minimum_interaction_count: None,
            types: vec![
                place_type("shopping_mall", "Shopping Mall"),
                place_type("clothing_store", "Clothing Store"),
                place_type("book_store", "Book Store"),
            ],
        },
        GroupDef {
            id: "fitness",
            title: "Fitness",
            query: "gyms near me",
            purpose: CategoryPurpose::Secondary,
            requires_user_intent: false,
            weight: Some(12.0),
            time_appropriate: &[(Morning, true), (LateNight, false)],
            minimum_interaction_count: None,
            types: vec![
                place_type("gym", "Gym"),
                place_type("yoga_studio", "Yoga Studio"),
                place_type("swimming_pool", "Swimming Pool"),
            ],
        },
        GroupDef {
            id: "groceries",
            title: "Groceries & Markets",
            query: "grocery stores near me",
            purpose: CategoryPurpose::Contextual,
            requires_user_intent: false,
            weight: Some(8.0),
            time_appropriate: &[(LateNight, false)],
            minimum_interaction_count: None,
            types: vec![
                place_type("supermarket", "Supermarket"),
                place_type("grocery_store", "Grocery Store"),
                place_type("farmers_market", "Farmers Market"),
            ],
        },
        GroupDef {
            id: "wellness",
            title: "Spas & Wellness",
            query: "spas near me",
            purpose: CategoryPurpose::Contextual,
            requires_user_intent: true,
            weight: Some(8.0),
            time_appropriate: &[(LateNight, false)],
            minimum_interaction_count: Some(3),
            types: vec![
                place_type("spa", "Spa"),
                place_type("massage", "Massage"),
                place_type("sauna", "Sauna"),
            ],
        },
        GroupDef {
            id: "hotels",
            title: "Hotels & Stays",
            query: "hotels near me",
            purpose: CategoryPurpose::Contextual,
            requires_user_intent: true,
            weight: Some(6.0),
            time_appropriate: &[],
            minimum_interaction_count: Some(2),
            types: vec![
                place_type("hotel", "Hotel"),
                place_type("hostel", "Hostel"),
                place_type("bed_and_breakfast", "Bed & Breakfast"),
            ],
        },
    ]
    .into_iter()
    .map(GroupDef::build)
    .collect();

    let daypart_defaults: HashMap<Daypart, Vec<String>> = [
        (
            Daypart::Morning,
            vec!["cafes", "breakfast", "parks", "fitness", "museums"],
        ),
        (
            Daypart::Lunch,
            vec!["restaurants", "cafes", "parks", "shopping", "desserts"],
        ),
        (
            Daypart::Evening,
            vec!["restaurants", "bars", "entertainment", "nightlife", "desserts"],
        ),
    ]
    .into_iter()
    .map(|(d, ids)| (d, ids.into_iter().map(String::from).collect()))
    .collect();

    let general_defaults = ["restaurants", "cafes", "parks", "shopping", "entertainment"]
        .into_iter()
        .map(String::from)
        .collect();

    Catalog::new(groups, daypart_defaults, general_defaults)
}

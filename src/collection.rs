//! In-memory recipe collection and its derived views.
//!
//! The collection is a read-through cache of the backend's full list. A
//! fetch replaces it wholesale; any fetch error clears it — a stale list
//! that might show another user's data is worse than an empty one. The
//! filtered view is always a pure function of
//! `(recipes, debounced search term, cuisine filter)`.

use crate::api::Recipe;
use rand::seq::SliceRandom;

/// The fetched recipe collection plus the derived unique-cuisine set.
#[derive(Default)]
pub struct RecipeCollection {
    recipes: Vec<Recipe>,
    cuisines: Vec<String>,
}

impl RecipeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Unique cuisine labels across the collection, sorted. Recipes with
    /// no cuisine do not contribute an entry.
    pub fn cuisines(&self) -> &[String] {
        &self.cuisines
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Replaces the entire collection (no incremental merge) and
    /// recomputes the cuisine set.
    pub fn replace_all(&mut self, recipes: Vec<Recipe>) {
        self.recipes = recipes;
        self.cuisines = unique_cuisines(&self.recipes);
    }

    /// Empties the collection. Used on fetch failure and session expiry.
    pub fn clear(&mut self) {
        self.recipes.clear();
        self.cuisines.clear();
    }
}

fn unique_cuisines(recipes: &[Recipe]) -> Vec<String> {
    let mut cuisines: Vec<String> = recipes
        .iter()
        .filter_map(|r| r.cuisine_type.as_deref())
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect();
    cuisines.sort();
    cuisines.dedup();
    cuisines
}

/// Pure filter over a recipe slice.
///
/// The search term matches case-insensitively as a substring of the
/// title, cuisine label, description, or ingredients (OR across fields).
/// The cuisine filter is an exact match AND'd with the term result; an
/// empty cuisine filter means "All". An empty term matches everything.
pub fn filter_recipes<'a>(recipes: &'a [Recipe], term: &str, cuisine: &str) -> Vec<&'a Recipe> {
    let needle = term.to_lowercase();
    recipes
        .iter()
        .filter(|r| cuisine.is_empty() || r.cuisine() == cuisine)
        .filter(|r| needle.is_empty() || matches_term(r, &needle))
        .collect()
}

/// `needle` must already be lowercased.
fn matches_term(recipe: &Recipe, needle: &str) -> bool {
    recipe.title.to_lowercase().contains(needle)
        || recipe.cuisine().to_lowercase().contains(needle)
        || recipe
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || recipe.ingredients.to_lowercase().contains(needle)
}

/// Picks one recipe uniformly at random from the current collection.
///
/// Fresh every invocation, unseeded, never cached. `None` on an empty
/// slice — callers surface a "nothing to pick" message instead of failing.
pub fn pick_random(recipes: &[Recipe]) -> Option<&Recipe> {
    recipes.choose(&mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn recipe(id: i64, title: &str, cuisine: Option<&str>) -> Recipe {
        Recipe {
            id,
            username: Some("cook".into()),
            title: title.to_string(),
            description: None,
            cuisine_type: cuisine.map(str::to_owned),
            ingredients: String::new(),
            instructions: String::new(),
            image_url: None,
            external_link: None,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            updated_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    fn sample_collection() -> Vec<Recipe> {
        vec![
            recipe(1, "Taco", Some("Mexican")),
            recipe(2, "Sushi", Some("Japanese")),
        ]
    }

    #[test]
    fn test_search_term_matches_title_substring() {
        let recipes = sample_collection();
        let filtered = filter_recipes(&recipes, "tac", "");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }

    #[test]
    fn test_cuisine_filter_exact_match() {
        let recipes = sample_collection();
        let filtered = filter_recipes(&recipes, "", "Japanese");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 2);
    }

    #[test]
    fn test_empty_term_and_cuisine_matches_all() {
        let recipes = sample_collection();
        assert_eq!(filter_recipes(&recipes, "", "").len(), 2);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let recipes = sample_collection();
        assert_eq!(filter_recipes(&recipes, "TACO", "").len(), 1);
        assert_eq!(filter_recipes(&recipes, "sUsHi", "").len(), 1);
    }

    #[test]
    fn test_search_matches_across_fields() {
        let mut r = recipe(3, "Plain Title", Some("Fusion"));
        r.description = Some("A weeknight classic".into());
        r.ingredients = "2 cups arborio rice\nsaffron".into();
        let recipes = vec![r];

        // Description field
        assert_eq!(filter_recipes(&recipes, "weeknight", "").len(), 1);
        // Ingredients field
        assert_eq!(filter_recipes(&recipes, "saffron", "").len(), 1);
        // Cuisine field
        assert_eq!(filter_recipes(&recipes, "fusion", "").len(), 1);
        // No field matches
        assert_eq!(filter_recipes(&recipes, "pineapple", "").len(), 0);
    }

    #[test]
    fn test_term_and_cuisine_are_anded() {
        let recipes = sample_collection();
        // "s" matches both titles ("Sushi") and cuisines, but the cuisine
        // filter narrows to the Japanese entry only
        let filtered = filter_recipes(&recipes, "s", "Japanese");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 2);
        // Term that matches nothing in the selected cuisine
        assert!(filter_recipes(&recipes, "taco", "Japanese").is_empty());
    }

    #[test]
    fn test_cuisine_filter_is_not_substring() {
        let recipes = vec![recipe(1, "Bowl", Some("Japanese Fusion"))];
        assert!(filter_recipes(&recipes, "", "Japanese").is_empty());
        assert_eq!(filter_recipes(&recipes, "", "Japanese Fusion").len(), 1);
    }

    #[test]
    fn test_replace_all_recomputes_cuisines() {
        let mut collection = RecipeCollection::new();
        collection.replace_all(vec![
            recipe(1, "Taco", Some("Mexican")),
            recipe(2, "Burrito", Some("Mexican")),
            recipe(3, "Sushi", Some("Japanese")),
            recipe(4, "Toast", None),
        ]);
        assert_eq!(collection.cuisines(), &["Japanese", "Mexican"]);

        collection.replace_all(vec![recipe(5, "Pho", Some("Vietnamese"))]);
        assert_eq!(collection.cuisines(), &["Vietnamese"]);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut collection = RecipeCollection::new();
        collection.replace_all(sample_collection());
        collection.clear();
        assert!(collection.is_empty());
        assert!(collection.cuisines().is_empty());
    }

    #[test]
    fn test_pick_random_empty_is_none() {
        assert!(pick_random(&[]).is_none());
    }

    #[test]
    fn test_pick_random_single_element() {
        let recipes = vec![recipe(7, "Only One", None)];
        assert_eq!(pick_random(&recipes).unwrap().id, 7);
    }

    #[test]
    fn test_pick_random_eventually_covers_collection() {
        // Not a distribution test — just that both elements are reachable
        let recipes = sample_collection();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(pick_random(&recipes).unwrap().id);
            if seen.len() == 2 {
                break;
            }
        }
        assert_eq!(seen.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_pick_is_member_of_input(titles in proptest::collection::vec("[a-z]{1,12}", 1..40)) {
            let recipes: Vec<Recipe> = titles
                .iter()
                .enumerate()
                .map(|(i, t)| recipe(i as i64, t, None))
                .collect();
            let picked = pick_random(&recipes).expect("non-empty input");
            prop_assert!(recipes.iter().any(|r| r.id == picked.id));
        }

        #[test]
        fn prop_filter_is_subset_and_every_hit_matches(
            titles in proptest::collection::vec("[a-zA-Z ]{0,16}", 0..30),
            term in "[a-zA-Z]{0,6}",
        ) {
            let recipes: Vec<Recipe> = titles
                .iter()
                .enumerate()
                .map(|(i, t)| recipe(i as i64, t, None))
                .collect();
            let filtered = filter_recipes(&recipes, &term, "");

            prop_assert!(filtered.len() <= recipes.len());
            let needle = term.to_lowercase();
            for hit in filtered {
                prop_assert!(recipes.iter().any(|r| r.id == hit.id));
                if !needle.is_empty() {
                    prop_assert!(hit.title.to_lowercase().contains(&needle));
                }
            }
        }
    }
}

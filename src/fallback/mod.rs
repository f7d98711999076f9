//! Deterministic, template-based recipes built only from local profile data.
//!
//! Used whenever the model endpoint is unreachable or its output is unusable, so it must
//! never fail. Given the same profile and request it always returns the same recipes.

pub mod diet;
pub mod templates;

use std::cmp::Reverse;

use crate::profile_store::Profile;
use crate::recipe::{clean_list, Recipe, RecipeRequest, MAX_RECIPES_PER_REQUEST};
use templates::{templates_for, RecipeTemplate};

pub const MAX_INGREDIENTS_PER_RECIPE: usize = 5;
const STAPLES: &[&str] = &["water", "salt", "oil"];
const LAST_RESORT_INGREDIENT: &str = "water";

/// Pantry items that survive the profile's allergies and dietary preferences, in pantry order.
pub fn usable_pantry(profile: &Profile) -> Vec<String> {
    profile
        .pantry
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .filter(|item| diet::is_allowed(item, &profile.allergies, &profile.preferences))
        .map(str::to_string)
        .collect()
}

fn matches_template(item: &str, template: &RecipeTemplate) -> bool {
    template
        .key_ingredients
        .iter()
        .any(|key| diet::mentions(item, key))
}

fn staples(profile: &Profile) -> Vec<String> {
    let allowed: Vec<String> = STAPLES
        .iter()
        .filter(|s| diet::is_allowed(s, &profile.allergies, &profile.preferences))
        .map(|s| s.to_string())
        .collect();
    if allowed.is_empty() {
        vec![LAST_RESORT_INGREDIENT.to_string()]
    } else {
        allowed
    }
}

fn natural_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn render_step(step: &str, ingredients: &[String]) -> String {
    let main = ingredients
        .first()
        .cloned()
        .unwrap_or_else(|| LAST_RESORT_INGREDIENT.to_string());
    let rest = if ingredients.len() > 1 {
        natural_list(&ingredients[1..])
    } else {
        "seasonings".to_string()
    };
    step.replace("{main}", &main)
        .replace("{rest}", &rest)
        .replace("{all}", &natural_list(ingredients))
}

/// Must-use items first, then items the template is built around, then the rest.
fn pick_ingredients(
    template: &RecipeTemplate,
    usable: &[String],
    must_use: &[String],
) -> Vec<String> {
    let must: Vec<&String> = usable
        .iter()
        .filter(|item| must_use.iter().any(|m| diet::mentions(item, m)))
        .collect();
    let keyed = usable
        .iter()
        .filter(|item| matches_template(item, template));
    let ordered: Vec<&str> = must
        .into_iter()
        .chain(keyed)
        .chain(usable.iter())
        .map(String::as_str)
        .collect();

    let mut picked = clean_list(ordered);
    picked.truncate(MAX_INGREDIENTS_PER_RECIPE);
    picked
}

fn fill_template(
    template: &RecipeTemplate,
    profile: &Profile,
    request: &RecipeRequest,
    usable: &[String],
) -> Recipe {
    let from_pantry = !usable.is_empty();
    let ingredients = if from_pantry {
        pick_ingredients(template, usable, &request.must_use)
    } else {
        staples(profile)
    };

    let title = match ingredients.first() {
        Some(main) if from_pantry && !matches_template(main, template) => {
            format!("{} with {}", template.name, main)
        }
        _ => template.name.to_string(),
    };

    let summary = if from_pantry {
        format!(
            "A quick {} using {} from your pantry.",
            request.meal_type,
            natural_list(&ingredients)
        )
    } else {
        format!(
            "A bare-bones {} idea. Add items to your pantry for better suggestions.",
            request.meal_type
        )
    };

    let tag_sources = template
        .tags
        .iter()
        .copied()
        .chain(profile.preferences.iter().map(String::as_str))
        .chain(request.constraints.iter().take(3).map(String::as_str));
    let mut tags = clean_list(tag_sources);
    tags.push("pantry".to_string());

    Recipe {
        title,
        summary: Some(summary),
        total_time_minutes: Some(template.minutes.min(request.time_limit_minutes)),
        steps: template
            .steps
            .iter()
            .map(|step| render_step(step, &ingredients))
            .collect(),
        ingredients,
        tags,
    }
}

/// Builds up to `request.count` recipes for the requested meal type.
/// The result is never empty and every recipe has at least one ingredient.
pub fn generate(profile: &Profile, request: &RecipeRequest) -> Vec<Recipe> {
    let usable = usable_pantry(profile);
    let count = request.count.clamp(1, MAX_RECIPES_PER_REQUEST);

    let mut ranked: Vec<&RecipeTemplate> = templates_for(request.meal_type).collect();
    // Stable sort keeps declaration order among equally good templates.
    ranked.sort_by_key(|template| {
        Reverse(
            usable
                .iter()
                .filter(|item| matches_template(item, template))
                .count(),
        )
    });

    ranked
        .into_iter()
        .take(count)
        .map(|template| fill_template(template, profile, request, &usable))
        .collect()
}

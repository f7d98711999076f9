use std::collections::BTreeSet;

use crate::profile_store::Profile;
use crate::recipe::RecipeRequest;

const SYSTEM_INSTRUCTIONS: &str = "You are Recipe Buddy, a helpful cooking assistant.
You must produce strictly VALID JSON when asked for recipe lists. No commentary.
Each recipe must include: title, summary, total_time_minutes, ingredients (list of strings),
steps (list of short imperative steps), and tags (list of strings).
Prefer using the provided pantry ingredients. Respect allergies, dietary preferences,
constraints and time limits.";

fn join_or_none<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let items: Vec<&str> = items
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn text_or_none(text: &str) -> &str {
    let text = text.trim();
    if text.is_empty() {
        "none"
    } else {
        text
    }
}

/// Formats the profile and request into the completion prompt.
pub fn build_recipe_prompt(profile: &Profile, request: &RecipeRequest) -> String {
    let pantry: BTreeSet<String> = profile
        .pantry
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    let count = request.count.max(1);
    let noun = if count == 1 { "recipe" } else { "recipes" };

    format!(
        "{instructions}
Given the following context, generate EXACTLY {count} distinct {noun} as a JSON array.
Context:
- Request: {text}
- Meal type: {meal}
- Time limit (minutes): {time_limit}
- Mood keywords: {mood}
- Dietary preferences: {preferences}
- Allergies (NEVER use these ingredients): {allergies}
- Constraints: {constraints}
- Must-use ingredients: {must_use}
- Pantry ingredients available: {pantry}

Rules:
- ONLY return valid JSON: an array of {count} recipe objects.
- Each recipe object must have keys:
  \"title\" (string),
  \"summary\" (string),
  \"total_time_minutes\" (integer <= {time_limit}),
  \"ingredients\" (list of strings, relying on pantry where possible),
  \"steps\" (list of 5-10 concise steps),
  \"tags\" (list of strings).
- Never include an ingredient listed under allergies.
- Favor simple, quick recipes within the time limit.
- Avoid exotic ingredients not in the pantry unless absolutely necessary.
- Keep titles unique and succinct.
JSON:
",
        instructions = SYSTEM_INSTRUCTIONS,
        count = count,
        noun = noun,
        text = text_or_none(&request.text),
        meal = request.meal_type,
        time_limit = request.time_limit_minutes,
        mood = join_or_none(&request.mood),
        preferences = join_or_none(&profile.preferences),
        allergies = join_or_none(&profile.allergies),
        constraints = constraints_line(profile, request),
        must_use = join_or_none(&request.must_use),
        pantry = join_or_none(&pantry),
    )
}

fn constraints_line(profile: &Profile, request: &RecipeRequest) -> String {
    let mut parts: Vec<String> = request.constraints.clone();
    let free_text = profile.constraints.trim();
    if !free_text.is_empty() {
        parts.push(free_text.to_string());
    }
    join_or_none(&parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::MealType;

    fn profile() -> Profile {
        let mut profile = Profile::new("alex");
        profile.set_pantry(["rice", "egg", "onion"]);
        profile.set_allergies(["peanut"]);
        profile.set_preferences(["vegetarian"]);
        profile.set_constraints("no oven");
        profile
    }

    #[test]
    fn test_prompt_embeds_profile_and_request() {
        let request = RecipeRequest {
            meal_type: MealType::Lunch,
            time_limit_minutes: 15,
            must_use: vec!["egg".to_string()],
            constraints: vec!["high-protein".to_string()],
            count: 3,
            ..RecipeRequest::new("something with rice")
        };
        let prompt = build_recipe_prompt(&profile(), &request);

        assert!(prompt.contains("Pantry ingredients available: egg, onion, rice"));
        assert!(prompt.contains("Allergies (NEVER use these ingredients): peanut"));
        assert!(prompt.contains("Dietary preferences: vegetarian"));
        assert!(prompt.contains("Constraints: high-protein, no oven"));
        assert!(prompt.contains("Request: something with rice"));
        assert!(prompt.contains("Meal type: lunch"));
        assert!(prompt.contains("EXACTLY 3 distinct recipes"));
        assert!(prompt.contains("integer <= 15"));
    }

    #[test]
    fn test_empty_fields_render_as_none() {
        let prompt = build_recipe_prompt(&Profile::new("sam"), &RecipeRequest::default());
        assert!(prompt.contains("Pantry ingredients available: none"));
        assert!(prompt.contains("Allergies (NEVER use these ingredients): none"));
        assert!(prompt.contains("Request: none"));
        assert!(prompt.contains("EXACTLY 1 distinct recipe as"));
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 25;
pub const MIN_TIME_LIMIT_MINUTES: u32 = 5;
pub const MAX_TIME_LIMIT_MINUTES: u32 = 90;
pub const MAX_RECIPES_PER_REQUEST: usize = 5;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Recipe {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time_minutes: Option<u32>,
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Recipe {
    /// A recipe is usable when it has a title and something to cook with.
    pub fn is_usable(&self) -> bool {
        !self.title.trim().is_empty() && self.ingredients.iter().any(|i| !i.trim().is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    #[default]
    Dinner,
    Snacks,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snacks => "snacks",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" | "snacks" => Ok(MealType::Snacks),
            other => Err(format!("unknown meal type '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RecipeRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub meal_type: MealType,
    #[serde(default = "default_time_limit")]
    pub time_limit_minutes: u32,
    #[serde(default)]
    pub mood: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub must_use: Vec<String>,
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_time_limit() -> u32 {
    DEFAULT_TIME_LIMIT_MINUTES
}

fn default_count() -> usize {
    1
}

impl Default for RecipeRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            meal_type: MealType::default(),
            time_limit_minutes: DEFAULT_TIME_LIMIT_MINUTES,
            mood: Vec::new(),
            constraints: Vec::new(),
            must_use: Vec::new(),
            count: 1,
        }
    }
}

impl RecipeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Clamps numeric fields into their supported ranges and drops blank list entries.
    pub fn normalized(mut self) -> Self {
        self.text = self.text.trim().to_string();
        self.time_limit_minutes = self
            .time_limit_minutes
            .clamp(MIN_TIME_LIMIT_MINUTES, MAX_TIME_LIMIT_MINUTES);
        self.count = self.count.clamp(1, MAX_RECIPES_PER_REQUEST);
        for list in [&mut self.mood, &mut self.constraints, &mut self.must_use] {
            *list = clean_list(list.iter().map(String::as_str));
        }
        self
    }
}

/// Trims entries and removes empties, keeping first-seen order.
pub fn clean_list<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !out.iter().any(|seen| seen.eq_ignore_ascii_case(item)) {
            out.push(item.to_string());
        }
    }
    out
}

/// Splits comma separated form input ("egg, rice,  onion") into clean entries.
pub fn split_list(raw: &str) -> Vec<String> {
    clean_list(raw.split([',', '\n']))
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecipeSource {
    Model,
    Fallback,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub source: RecipeSource,
    pub recipes: Vec<Recipe>,
}

impl Recommendation {
    /// The first recipe. Recommendations are never built empty.
    pub fn primary(&self) -> Option<&Recipe> {
        self.recipes.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_normalization_clamps_and_cleans() {
        let request = RecipeRequest {
            text: "  something warm ".to_string(),
            time_limit_minutes: 500,
            count: 0,
            mood: vec![" spicy".to_string(), "".to_string(), "SPICY".to_string()],
            ..Default::default()
        }
        .normalized();

        assert_eq!(request.text, "something warm");
        assert_eq!(request.time_limit_minutes, MAX_TIME_LIMIT_MINUTES);
        assert_eq!(request.count, 1);
        assert_eq!(request.mood, vec!["spicy".to_string()]);
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: RecipeRequest = serde_json::from_str(r#"{"text":"pasta please"}"#).unwrap();
        assert_eq!(request.meal_type, MealType::Dinner);
        assert_eq!(request.time_limit_minutes, DEFAULT_TIME_LIMIT_MINUTES);
        assert_eq!(request.count, 1);
    }

    #[test]
    fn test_meal_type_parsing() {
        assert_eq!("Breakfast".parse::<MealType>(), Ok(MealType::Breakfast));
        assert_eq!("snack".parse::<MealType>(), Ok(MealType::Snacks));
        assert!("brunch".parse::<MealType>().is_err());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("egg, rice,,  onion\nEgg"), vec!["egg", "rice", "onion"]);
    }

    #[test]
    fn test_recipe_usability() {
        let mut recipe = Recipe {
            title: "Fried Rice".to_string(),
            ingredients: vec!["rice".to_string()],
            ..Default::default()
        };
        assert!(recipe.is_usable());
        recipe.ingredients = vec!["  ".to_string()];
        assert!(!recipe.is_usable());
        recipe.ingredients = vec!["rice".to_string()];
        recipe.title = " ".to_string();
        assert!(!recipe.is_usable());
    }
}

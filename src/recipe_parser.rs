use serde_json::{Map, Value};
use std::error::Error;
use std::fmt;
use tracing::debug;

use crate::recipe::Recipe;

/// The completion did not contain a single usable recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub reason: String,
}

impl ParseFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not parse a recipe from the completion: {}", self.reason)
    }
}

impl Error for ParseFailure {}

const TITLE_KEYS: &[&str] = &["title", "name", "recipe_title", "recipe_name"];
const SUMMARY_KEYS: &[&str] = &["summary", "description"];
const TIME_KEYS: &[&str] = &["total_time_minutes", "time_minutes", "total_time", "time"];
const INGREDIENT_KEYS: &[&str] = &["ingredients"];
const STEP_KEYS: &[&str] = &["steps", "instructions", "method", "directions"];
const TAG_KEYS: &[&str] = &["tags"];
const INGREDIENT_NAME_KEYS: &[&str] = &["name", "ingredient_name", "ingredient", "item"];
const STEP_TEXT_KEYS: &[&str] = &["text", "step", "instruction", "description"];

/// Maps completion text into typed recipes.
///
/// JSON (an array, a single object, or an object holding a `recipes` array) is tried first,
/// with Markdown code fences removed. When no JSON yields a usable recipe the text is read
/// as a Markdown-ish recipe with "Ingredients" and "Steps" sections. Only recipes with a
/// title and at least one ingredient are kept.
pub fn parse_completion(raw: &str) -> Result<Vec<Recipe>, ParseFailure> {
    let text = strip_code_fences(raw);
    if text.trim().is_empty() {
        return Err(ParseFailure::new("completion was empty"));
    }

    let from_json: Vec<Recipe> = recipes_from_json(text)
        .into_iter()
        .filter(Recipe::is_usable)
        .collect();
    if !from_json.is_empty() {
        debug!(count = from_json.len(), "parsed recipes from JSON completion");
        return Ok(from_json);
    }

    match parse_free_text(text) {
        Some(recipe) if recipe.is_usable() => {
            debug!(title = %recipe.title, "parsed recipe from free-text completion");
            Ok(vec![recipe])
        }
        _ => Err(ParseFailure::new(
            "no recipe with a title and at least one ingredient was found",
        )),
    }
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after_fence = &trimmed[start + 3..];
    // Skip the language tag on the opening fence line.
    let body = match after_fence.find('\n') {
        Some(newline) => &after_fence[newline + 1..],
        None => after_fence,
    };
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

fn recipes_from_json(text: &str) -> Vec<Recipe> {
    // Whichever bracket opens first decides whether the payload is an array or an object.
    let object_first = match (text.find('{'), text.find('[')) {
        (Some(object), Some(array)) => object < array,
        (Some(_), None) => true,
        _ => false,
    };
    let attempts: [fn(&str) -> Vec<Recipe>; 2] = if object_first {
        [recipes_from_object, recipes_from_array]
    } else {
        [recipes_from_array, recipes_from_object]
    };

    for attempt in attempts {
        let usable: Vec<Recipe> = attempt(text).into_iter().filter(Recipe::is_usable).collect();
        if !usable.is_empty() {
            return usable;
        }
    }
    Vec::new()
}

fn recover_objects(text: &str) -> Vec<Recipe> {
    balanced_objects(text)
        .into_iter()
        .filter_map(|obj| serde_json::from_str::<Value>(obj).ok())
        .filter_map(|value| recipe_from_value(&value))
        .collect()
}

fn recipes_from_array(text: &str) -> Vec<Recipe> {
    let Some(array_text) = slice_between(text, '[', ']') else {
        return Vec::new();
    };
    match serde_json::from_str::<Value>(array_text) {
        Ok(Value::Array(items)) => items.iter().filter_map(recipe_from_value).collect(),
        Ok(_) => Vec::new(),
        Err(e) => {
            debug!(error = %e, "completion array is not valid JSON, recovering objects");
            recover_objects(array_text)
        }
    }
}

fn recipes_from_object(text: &str) -> Vec<Recipe> {
    let Some(object_text) = slice_between(text, '{', '}') else {
        return Vec::new();
    };
    match serde_json::from_str::<Value>(object_text) {
        Ok(value) => match value.get("recipes") {
            Some(Value::Array(items)) => items.iter().filter_map(recipe_from_value).collect(),
            _ => recipe_from_value(&value).into_iter().collect(),
        },
        Err(_) => recover_objects(object_text),
    }
}

fn slice_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

/// Top-level `{...}` substrings, ignoring braces inside string literals.
fn balanced_objects(text: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        objects.push(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }
    objects
}

fn first_value<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| {
        obj.get(*key).or_else(|| {
            obj.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    })
}

fn value_as_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first_value(obj, keys).and_then(value_as_text)
}

fn leading_number(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn minutes(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|m| u32::try_from(m).ok()),
        Value::String(s) => leading_number(s),
        _ => None,
    }
}

fn ingredient_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(obj) => {
            let name = first_text(obj, INGREDIENT_NAME_KEYS)?;
            let amount: Vec<String> = ["quantity", "amount", "unit"]
                .iter()
                .filter_map(|key| obj.get(*key).and_then(value_as_text))
                .collect();
            if amount.is_empty() {
                Some(name)
            } else {
                Some(format!("{} {}", amount.join(" "), name))
            }
        }
        other => value_as_text(other),
    }
}

fn step_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(obj) => first_text(obj, STEP_TEXT_KEYS),
        other => value_as_text(other).map(|s| strip_list_marker(&s).to_string()),
    }
}

fn text_list(value: Option<&Value>, item: fn(&Value) -> Option<String>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(item).collect(),
        Some(Value::String(s)) => s
            .lines()
            .flat_map(|line| line.split(';'))
            .map(strip_list_marker)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn recipe_from_value(value: &Value) -> Option<Recipe> {
    let obj = value.as_object()?;
    Some(Recipe {
        title: first_text(obj, TITLE_KEYS)?,
        summary: first_text(obj, SUMMARY_KEYS),
        total_time_minutes: first_value(obj, TIME_KEYS).and_then(minutes),
        ingredients: text_list(first_value(obj, INGREDIENT_KEYS), ingredient_text),
        steps: text_list(first_value(obj, STEP_KEYS), step_text),
        tags: text_list(first_value(obj, TAG_KEYS), value_as_text),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Ingredients,
    Steps,
    Other,
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
        .unwrap_or(line);
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim();
        }
    }
    line.trim()
}

fn header_label(line: &str) -> String {
    line.trim()
        .trim_start_matches('#')
        .trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace())
        .trim_end_matches(':')
        .trim()
        .to_lowercase()
}

fn classify_header(line: &str) -> Option<Section> {
    let trimmed = line.trim();
    let looks_like_header = trimmed.starts_with('#')
        || trimmed.ends_with(':')
        || trimmed.ends_with(":**")
        || (trimmed.starts_with("**") && trimmed.ends_with("**"));
    let label = header_label(trimmed);
    if label.starts_with("ingredients") {
        return Some(Section::Ingredients);
    }
    if ["steps", "instructions", "method", "directions", "preparation"]
        .iter()
        .any(|h| label.starts_with(h))
    {
        return Some(Section::Steps);
    }
    if looks_like_header && !label.is_empty() {
        return Some(Section::Other);
    }
    None
}

fn is_title_heading(line: &str) -> bool {
    let trimmed = line.trim();
    let bare = trimmed.trim_start_matches(|c: char| c == '*' || c == '_');
    trimmed.starts_with('#')
        || (trimmed.starts_with("**") && trimmed.ends_with("**"))
        || bare.get(..6).is_some_and(|p| p.eq_ignore_ascii_case("title:"))
}

fn clean_title(line: &str) -> String {
    let title = line
        .trim()
        .trim_start_matches('#')
        .trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace());
    let title = match title.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("title:") => &title[6..],
        _ => title,
    };
    title
        .trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace())
        .trim_end_matches(':')
        .trim()
        .to_string()
}

/// Index of the title line, searched before the first ingredients or steps header.
/// A heading or `Title:` line wins over chatter; otherwise the first plain line that
/// does not introduce something else (no trailing colon) is used.
fn title_line(lines: &[&str]) -> Option<usize> {
    let candidates = || {
        lines.iter().enumerate().take_while(|(_, line)| {
            !matches!(
                classify_header(line),
                Some(Section::Ingredients) | Some(Section::Steps)
            )
        })
    };
    candidates()
        .find(|(_, line)| is_title_heading(line))
        .or_else(|| {
            candidates().find(|(_, line)| {
                !line.trim().is_empty() && classify_header(line).is_none()
            })
        })
        .map(|(index, _)| index)
}

fn parse_free_text(text: &str) -> Option<Recipe> {
    let lines: Vec<&str> = text.lines().collect();
    let title_index = title_line(&lines)?;
    let mut recipe = Recipe {
        title: clean_title(lines[title_index]),
        ..Default::default()
    };
    if recipe.title.is_empty() {
        return None;
    }

    // Anything above the title is chatter.
    let mut section = Section::Preamble;
    for line in &lines[title_index + 1..] {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(next) = classify_header(line) {
            section = next;
            continue;
        }
        let item = strip_list_marker(line);
        if item.is_empty() {
            continue;
        }
        match section {
            Section::Ingredients => recipe.ingredients.push(item.to_string()),
            Section::Steps => recipe.steps.push(item.to_string()),
            Section::Preamble if recipe.summary.is_none() => {
                recipe.summary = Some(item.to_string())
            }
            _ => {}
        }
    }
    Some(recipe)
}

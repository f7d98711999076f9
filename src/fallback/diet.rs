use std::collections::BTreeSet;

const MEAT: &[&str] = &[
    "chicken", "beef", "pork", "bacon", "ham", "sausage", "lamb", "turkey", "steak", "mince",
    "duck", "veal", "chorizo", "salami", "pepperoni", "gelatin",
];
const SEAFOOD: &[&str] = &[
    "fish", "salmon", "tuna", "cod", "anchovy", "sardine", "trout", "shrimp", "prawn", "crab",
    "lobster", "mussel", "clam", "oyster", "scallop",
];
const SHELLFISH: &[&str] = &[
    "shrimp", "prawn", "crab", "lobster", "mussel", "clam", "oyster", "scallop",
];
const FISH: &[&str] = &["fish", "salmon", "tuna", "cod", "anchovy", "sardine", "trout"];
const DAIRY: &[&str] = &[
    "milk", "cheese", "butter", "yogurt", "yoghurt", "cream", "ghee", "whey", "parmesan",
    "mozzarella", "cheddar",
];
const ANIMAL_EXTRAS: &[&str] = &["egg", "honey", "mayonnaise"];
const GLUTEN: &[&str] = &[
    "wheat", "flour", "bread", "pasta", "noodle", "spaghetti", "barley", "rye", "couscous",
    "tortilla", "cracker", "seitan",
];
const PORK: &[&str] = &["pork", "bacon", "ham", "chorizo", "salami", "pepperoni", "lard"];
const HIGH_CARB: &[&str] = &[
    "sugar", "rice", "pasta", "bread", "potato", "flour", "noodle", "spaghetti", "tortilla",
    "oat", "couscous",
];
const NUTS: &[&str] = &[
    "nut", "almond", "walnut", "cashew", "pecan", "hazelnut", "pistachio", "macadamia",
];
const SOY: &[&str] = &["soy", "tofu", "tempeh", "edamame", "miso"];
const EGG: &[&str] = &["egg", "mayonnaise"];

/// Ingredient words excluded by a dietary preference tag. Unknown tags exclude nothing.
fn excluded_by_preference(tag: &str) -> Vec<&'static str> {
    match normalize_tag(tag).as_str() {
        "vegetarian" => [MEAT, SEAFOOD].concat(),
        "pescatarian" => MEAT.to_vec(),
        "vegan" => [MEAT, SEAFOOD, DAIRY, ANIMAL_EXTRAS].concat(),
        "dairy-free" => DAIRY.to_vec(),
        "gluten-free" => GLUTEN.to_vec(),
        "halal" => [PORK, &["wine", "beer", "gelatin"][..]].concat(),
        "kosher" => [PORK, SHELLFISH].concat(),
        "keto" | "low-carb" | "paleo" => HIGH_CARB.to_vec(),
        _ => Vec::new(),
    }
}

/// Extra words covered by an allergy naming a whole food family.
fn allergen_family(allergy: &str) -> &'static [&'static str] {
    match normalize_tag(allergy).as_str() {
        "dairy" | "milk" | "lactose" => DAIRY,
        "gluten" | "wheat" | "celiac" | "coeliac" => GLUTEN,
        "nut" | "nuts" | "tree-nut" | "tree-nuts" => NUTS,
        "shellfish" | "seafood" => SHELLFISH,
        "fish" => FISH,
        "egg" | "eggs" => EGG,
        "soy" | "soya" => SOY,
        _ => &[],
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase().replace([' ', '_'], "-")
}

fn singular(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        format!("{}y", stem)
    } else if let Some(stem) = word.strip_suffix("oes") {
        format!("{}o", stem)
    } else if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| singular(&w.to_lowercase()))
}

/// Whether `ingredient` names `term`, word by word and ignoring case and simple plurals.
/// Multi-word terms match as a substring.
pub fn mentions(ingredient: &str, term: &str) -> bool {
    let ingredient = ingredient.trim().to_lowercase();
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }
    if ingredient == term {
        return true;
    }
    if term.contains(char::is_whitespace) {
        return ingredient.contains(&term);
    }
    let term = singular(&term);
    let found = words(&ingredient).any(|w| w == term);
    found
}

pub fn conflicts_with_allergies(ingredient: &str, allergies: &BTreeSet<String>) -> bool {
    allergies.iter().any(|allergy| {
        mentions(ingredient, allergy)
            || allergen_family(allergy)
                .iter()
                .any(|member| mentions(ingredient, member))
    })
}

pub fn violates_preferences(ingredient: &str, preferences: &BTreeSet<String>) -> bool {
    preferences.iter().any(|tag| {
        excluded_by_preference(tag)
            .iter()
            .any(|word| mentions(ingredient, word))
    })
}

pub fn is_allowed(
    ingredient: &str,
    allergies: &BTreeSet<String>,
    preferences: &BTreeSet<String>,
) -> bool {
    !conflicts_with_allergies(ingredient, allergies) && !violates_preferences(ingredient, preferences)
}

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use recipe_buddy::fallback::{self, diet, usable_pantry, MAX_INGREDIENTS_PER_RECIPE};
use recipe_buddy::profile_store::Profile;
use recipe_buddy::recipe::{MealType, RecipeRequest};

const INGREDIENTS: &[&str] = &[
    "egg", "rice", "onion", "garlic", "tomato", "pasta", "chicken breast", "tofu", "spinach",
    "milk", "cheddar cheese", "bread", "peanut butter", "banana", "oats", "shrimp", "potato",
    "bell pepper", "lentils", "yogurt", "flour", "bacon", "salmon", "almonds", "carrot",
];
const ALLERGENS: &[&str] = &["egg", "peanut", "dairy", "shellfish", "gluten", "nuts", "soy"];
const PREFERENCES: &[&str] = &["vegetarian", "vegan", "gluten-free", "keto", "halal"];
const MEALS: &[MealType] = &[
    MealType::Breakfast,
    MealType::Lunch,
    MealType::Dinner,
    MealType::Snacks,
];

fn pick<'a>(rng: &mut StdRng, pool: &[&'a str], max: usize) -> Vec<&'a str> {
    let n = rng.gen_range(0..=max);
    pool.choose_multiple(rng, n).copied().collect()
}

fn random_case(rng: &mut StdRng) -> (Profile, RecipeRequest) {
    let mut profile = Profile::new("random");
    profile.set_pantry(pick(rng, INGREDIENTS, 10));
    profile.set_allergies(pick(rng, ALLERGENS, 2));
    profile.set_preferences(pick(rng, PREFERENCES, 1));

    let request = RecipeRequest {
        meal_type: *MEALS.choose(rng).unwrap(),
        time_limit_minutes: rng.gen_range(0..=120),
        count: rng.gen_range(0..=7),
        must_use: pick(rng, INGREDIENTS, 2).into_iter().map(String::from).collect(),
        ..RecipeRequest::default()
    }
    .normalized();
    (profile, request)
}

#[test]
fn test_fallback_recipes_stay_inside_usable_pantry() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..500 {
        let (profile, request) = random_case(&mut rng);
        let usable = usable_pantry(&profile);
        let recipes = fallback::generate(&profile, &request);

        assert!(!recipes.is_empty());
        assert!(recipes.len() <= request.count);
        for recipe in &recipes {
            assert!(recipe.is_usable(), "unusable recipe {:?}", recipe);
            assert!(recipe.ingredients.len() <= MAX_INGREDIENTS_PER_RECIPE);
            assert!(recipe.total_time_minutes.unwrap() <= request.time_limit_minutes);
            for ingredient in &recipe.ingredients {
                assert!(
                    !diet::conflicts_with_allergies(ingredient, &profile.allergies),
                    "{} conflicts with {:?}",
                    ingredient,
                    profile.allergies
                );
                if !usable.is_empty() {
                    assert!(
                        usable.contains(ingredient),
                        "{} is not in usable pantry {:?}",
                        ingredient,
                        usable
                    );
                }
            }
        }
    }
}

#[test]
fn test_fallback_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..100 {
        let (profile, request) = random_case(&mut rng);
        assert_eq!(
            fallback::generate(&profile, &request),
            fallback::generate(&profile.clone(), &request.clone())
        );
    }
}

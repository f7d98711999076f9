use crate::recipe::MealType;

/// A hard-coded recipe shape. Step text may use `{main}`, `{rest}` and `{all}`,
/// which are filled with the chosen pantry ingredients.
#[derive(Debug, Clone, Copy)]
pub struct RecipeTemplate {
    pub name: &'static str,
    pub meal: MealType,
    pub minutes: u32,
    pub key_ingredients: &'static [&'static str],
    pub steps: &'static [&'static str],
    pub tags: &'static [&'static str],
}

const PREP_AND_COOK: &[&str] = &[
    "Prep the {all} as needed.",
    "Heat a pan or pot and add oil if required.",
    "Cook the {main} until done.",
    "Add the {rest}, season to taste and combine.",
    "Plate and serve.",
];

pub const TEMPLATES: &[RecipeTemplate] = &[
    // breakfast
    RecipeTemplate {
        name: "Quick Skillet Hash",
        meal: MealType::Breakfast,
        minutes: 20,
        key_ingredients: &["potato", "onion", "pepper", "egg", "sausage"],
        steps: &[
            "Dice the {all} into small, even pieces.",
            "Heat oil in a skillet over medium-high heat.",
            "Fry the {main} until golden and crisp at the edges.",
            "Stir in the {rest} and cook until tender.",
            "Season with salt and pepper and serve hot.",
        ],
        tags: &["skillet", "hearty"],
    },
    RecipeTemplate {
        name: "Speedy Scramble Bowl",
        meal: MealType::Breakfast,
        minutes: 10,
        key_ingredients: &["egg", "spinach", "tomato", "cheese", "tofu"],
        steps: &[
            "Chop the {rest}.",
            "Warm a non-stick pan with a little oil or butter.",
            "Add the {main} and stir gently over low heat.",
            "Fold in the {rest} just before it sets.",
            "Spoon into a bowl and serve.",
        ],
        tags: &["quick"],
    },
    RecipeTemplate {
        name: "Pantry Oat Parfait",
        meal: MealType::Breakfast,
        minutes: 5,
        key_ingredients: &["oat", "yogurt", "banana", "berry", "honey", "apple"],
        steps: &[
            "Slice any fruit among the {all}.",
            "Layer the {main} in a glass or bowl.",
            "Top with the {rest}.",
            "Repeat the layers and serve chilled.",
        ],
        tags: &["no-cook", "fresh"],
    },
    RecipeTemplate {
        name: "Toasty Sandwich Melt",
        meal: MealType::Breakfast,
        minutes: 10,
        key_ingredients: &["bread", "cheese", "tomato", "ham", "avocado"],
        steps: &[
            "Slice the {all}.",
            "Build a sandwich around the {main} with the {rest}.",
            "Toast in a hot pan, pressing down, until golden on both sides.",
            "Cut in half and serve warm.",
        ],
        tags: &["comforting"],
    },
    RecipeTemplate {
        name: "5-Min Omelet Wrap",
        meal: MealType::Breakfast,
        minutes: 5,
        key_ingredients: &["egg", "tortilla", "pepper", "onion", "cheese"],
        steps: &[
            "Finely chop the {rest}.",
            "Cook the {main} as a thin omelet in a hot pan.",
            "Scatter over the {rest} and fold.",
            "Wrap and serve immediately.",
        ],
        tags: &["quick"],
    },
    // lunch
    RecipeTemplate {
        name: "15-Min Pantry Pasta",
        meal: MealType::Lunch,
        minutes: 15,
        key_ingredients: &["pasta", "spaghetti", "garlic", "tomato", "oil", "spinach"],
        steps: &[
            "Bring a pot of salted water to the boil.",
            "Cook the {main} until just tender, then drain, keeping a splash of water.",
            "Gently fry the {rest} in a pan.",
            "Toss everything together with the reserved water.",
            "Season and serve.",
        ],
        tags: &["quick"],
    },
    RecipeTemplate {
        name: "Zippy Grain Bowl",
        meal: MealType::Lunch,
        minutes: 20,
        key_ingredients: &["rice", "quinoa", "bean", "lemon", "cucumber", "avocado"],
        steps: &[
            "Cook or warm the {main}.",
            "Chop the {rest}.",
            "Pile everything into a bowl.",
            "Dress with a squeeze of acid and a pinch of salt.",
        ],
        tags: &["fresh"],
    },
    RecipeTemplate {
        name: "Crisp Veggie Wrap",
        meal: MealType::Lunch,
        minutes: 10,
        key_ingredients: &["tortilla", "lettuce", "carrot", "cucumber", "hummus"],
        steps: &[
            "Shred or slice the {all}.",
            "Lay the {main} flat and spread the fillings down the middle.",
            "Roll tightly and slice in half.",
        ],
        tags: &["no-cook", "crispy"],
    },
    RecipeTemplate {
        name: "One-Pan Fried Rice",
        meal: MealType::Lunch,
        minutes: 20,
        key_ingredients: &["rice", "egg", "onion", "pea", "carrot", "soy sauce"],
        steps: &[
            "Chop the {rest}.",
            "Fry the aromatics in a hot pan with oil.",
            "Add the {main} and stir-fry until hot and slightly crisp.",
            "Push to one side, cook the remaining ingredients, then mix everything together.",
            "Season to taste and serve.",
        ],
        tags: &["one-pan"],
    },
    RecipeTemplate {
        name: "Hearty Bean Salad",
        meal: MealType::Lunch,
        minutes: 10,
        key_ingredients: &["bean", "chickpea", "onion", "tomato", "corn"],
        steps: &[
            "Drain and rinse the {main}.",
            "Chop the {rest}.",
            "Combine in a bowl with oil, acid and seasoning.",
            "Rest for a few minutes before serving.",
        ],
        tags: &["hearty", "no-cook"],
    },
    // dinner
    RecipeTemplate {
        name: "Weeknight Stir-Fry",
        meal: MealType::Dinner,
        minutes: 20,
        key_ingredients: &["noodle", "broccoli", "pepper", "chicken", "tofu", "soy sauce"],
        steps: PREP_AND_COOK,
        tags: &["stir-fry", "quick"],
    },
    RecipeTemplate {
        name: "Simple Sheet-Pan Bake",
        meal: MealType::Dinner,
        minutes: 35,
        key_ingredients: &["potato", "carrot", "chicken", "onion", "sausage"],
        steps: &[
            "Heat the oven to 220C.",
            "Cut the {all} into even chunks.",
            "Toss with oil and seasoning on a sheet pan.",
            "Roast until the {main} is cooked through and browned.",
            "Serve straight from the pan.",
        ],
        tags: &["sheet-pan", "hearty"],
    },
    RecipeTemplate {
        name: "Creamy Pantry Pasta",
        meal: MealType::Dinner,
        minutes: 20,
        key_ingredients: &["pasta", "cream", "cheese", "garlic", "mushroom"],
        steps: &[
            "Cook the {main} in salted water until tender.",
            "Meanwhile soften the {rest} in a pan.",
            "Combine with a splash of the cooking water until glossy.",
            "Season and serve.",
        ],
        tags: &["creamy", "comforting"],
    },
    RecipeTemplate {
        name: "Speedy Chili",
        meal: MealType::Dinner,
        minutes: 30,
        key_ingredients: &["bean", "tomato", "onion", "beef", "pepper"],
        steps: &[
            "Chop the {all}.",
            "Brown the {main} in a heavy pot.",
            "Add the {rest} with a cup of water and simmer for 20 minutes.",
            "Season to taste and serve.",
        ],
        tags: &["spicy", "hearty"],
    },
    RecipeTemplate {
        name: "Golden Veg Curry",
        meal: MealType::Dinner,
        minutes: 30,
        key_ingredients: &["potato", "chickpea", "coconut", "onion", "spinach"],
        steps: &[
            "Chop the {all}.",
            "Soften the aromatics in oil with any spices you have.",
            "Add the {main} and enough liquid to cover, then simmer until tender.",
            "Stir through the {rest} and cook a few minutes more.",
            "Serve hot.",
        ],
        tags: &["comforting"],
    },
    // snacks
    RecipeTemplate {
        name: "Savory Trail Mix",
        meal: MealType::Snacks,
        minutes: 5,
        key_ingredients: &["nut", "almond", "raisin", "seed", "pretzel"],
        steps: &[
            "Combine the {all} in a bowl.",
            "Season lightly and toss.",
            "Portion into small bags or jars.",
        ],
        tags: &["no-cook"],
    },
    RecipeTemplate {
        name: "Nutty Energy Bites",
        meal: MealType::Snacks,
        minutes: 15,
        key_ingredients: &["oat", "honey", "peanut", "date", "seed"],
        steps: &[
            "Blitz or finely chop the {all}.",
            "Press into small balls with damp hands.",
            "Chill until firm.",
        ],
        tags: &["no-cook"],
    },
    RecipeTemplate {
        name: "Crisp Chickpea Snack",
        meal: MealType::Snacks,
        minutes: 25,
        key_ingredients: &["chickpea", "paprika", "oil", "garlic"],
        steps: &[
            "Dry the {main} well.",
            "Toss with oil and the {rest}.",
            "Roast in a hot oven until crisp, shaking the tray halfway.",
        ],
        tags: &["crispy"],
    },
    RecipeTemplate {
        name: "Cheesy Toast Bites",
        meal: MealType::Snacks,
        minutes: 10,
        key_ingredients: &["bread", "cheese", "tomato", "garlic"],
        steps: &[
            "Slice the {main} into bite-sized pieces.",
            "Top with the {rest}.",
            "Grill until bubbling and golden.",
        ],
        tags: &["crispy"],
    },
    RecipeTemplate {
        name: "Yogurt Fruit Cup",
        meal: MealType::Snacks,
        minutes: 5,
        key_ingredients: &["yogurt", "banana", "berry", "apple", "honey"],
        steps: &[
            "Chop any fruit among the {all}.",
            "Spoon the {main} into a cup.",
            "Top with the {rest} and serve.",
        ],
        tags: &["fresh", "light"],
    },
];

pub fn templates_for(meal: MealType) -> impl Iterator<Item = &'static RecipeTemplate> {
    TEMPLATES.iter().filter(move |t| t.meal == meal)
}

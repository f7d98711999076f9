use anyhow::{bail, Context, Result};
use recipe_buddy::api_connection::{CompletionModel, OllamaClient};
use recipe_buddy::cli::{parse_args, Command};
use recipe_buddy::config::Config;
use recipe_buddy::logging;
use recipe_buddy::profile_store::ProfileStore;
use recipe_buddy::recipe::{split_list, Recipe, RecipeRequest, RecipeSource, Recommendation};
use recipe_buddy::recommender::Recommender;
use recipe_buddy::web::{self, AppState};
use std::sync::Arc;
use tracing::{info, warn};

fn ollama_client(config: &Config) -> Result<OllamaClient> {
    OllamaClient::new(&config.ollama_url, &config.model, config.timeout)
        .context("Failed to create model client")
}

fn build_recommender(config: &Config) -> Result<Recommender> {
    if !config.use_model {
        info!("model calls disabled, using the local generator only");
        return Ok(Recommender::fallback_only());
    }
    let client = ollama_client(config)?;
    info!(
        base_url = client.base_url(),
        model = %config.model,
        timeout_secs = config.timeout.as_secs(),
        "model client ready"
    );
    Ok(Recommender::new(Arc::new(client)))
}

fn print_recipe(index: usize, recipe: &Recipe) {
    println!("\n{}. {}", index + 1, recipe.title);
    if let Some(summary) = &recipe.summary {
        println!("   {}", summary);
    }
    if let Some(minutes) = recipe.total_time_minutes {
        println!("   {} min", minutes);
    }
    if !recipe.tags.is_empty() {
        println!("   {}", recipe.tags.join(" · "));
    }
    println!("   Ingredients:");
    for ingredient in &recipe.ingredients {
        println!("     - {}", ingredient);
    }
    if !recipe.steps.is_empty() {
        println!("   Steps:");
        for (idx, step) in recipe.steps.iter().enumerate() {
            println!("     {}. {}", idx + 1, step);
        }
    }
}

fn print_recommendation(recommendation: &Recommendation) {
    match recommendation.source {
        RecipeSource::Model => println!("Recipes from the model:"),
        RecipeSource::Fallback => println!("Model unavailable, recipes from your pantry:"),
    }
    for (index, recipe) in recommendation.recipes.iter().enumerate() {
        print_recipe(index, recipe);
    }
}

async fn serve(config: &Config, bind: &str, skip_model_check: bool) -> Result<()> {
    let store = ProfileStore::load(&config.data_file);
    let recommender = build_recommender(config)?;

    if config.use_model && !skip_model_check {
        let client = ollama_client(config)?;
        // Pulling can take minutes; serve meanwhile, requests fall back until it lands.
        tokio::spawn(async move {
            match client.ensure_model().await {
                Ok(true) => info!(model = client.model_name(), "model available"),
                Ok(false) => warn!(model = client.model_name(), "model not available after pull"),
                Err(e) => warn!(error = %e, "could not check model availability"),
            }
        });
    }

    web::serve(AppState::new(store, recommender), bind).await
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli_args = parse_args();
    logging::init(&cli_args.log_level)?;
    let config = Config::from_cli(&cli_args)?;

    match cli_args.command {
        Command::Serve {
            bind,
            skip_model_check,
        } => serve(&config, &bind, skip_model_check).await?,
        Command::Recommend {
            user,
            meal,
            time_limit,
            count,
            must_use,
            mood,
            constraints,
            request,
        } => {
            let mut store = ProfileStore::load(&config.data_file);
            store.get_or_create(&user);
            let request = RecipeRequest {
                text: request.join(" "),
                meal_type: meal,
                time_limit_minutes: time_limit,
                mood,
                constraints,
                must_use,
                count,
            };
            let recommender = build_recommender(&config)?;
            let recommendation = recommender
                .recommend(&mut store, &user, &request)
                .await?;
            store.save()?;
            print_recommendation(&recommendation);
        }
        Command::Pantry { user, add, items } => {
            let mut store = ProfileStore::load(&config.data_file);
            let profile = store.get_or_create(&user);
            if add {
                profile.add_to_pantry(&items);
            } else {
                profile.set_pantry(&items);
            }
            let pantry: Vec<String> = profile.pantry.iter().cloned().collect();
            store.save()?;
            println!("Pantry saved ({} items): {}", pantry.len(), pantry.join(", "));
        }
        Command::Preferences {
            user,
            diet,
            allergies,
            constraints,
        } => {
            let mut store = ProfileStore::load(&config.data_file);
            let profile = store.get_or_create(&user);
            if let Some(diet) = diet {
                profile.set_preferences(split_list(&diet));
            }
            if let Some(allergies) = allergies {
                profile.set_allergies(split_list(&allergies));
            }
            if let Some(constraints) = constraints {
                profile.set_constraints(&constraints);
            }
            store.save()?;
            println!("Profile saved.");
        }
        Command::Show { user } => {
            let store = ProfileStore::load(&config.data_file);
            let Some(profile) = store.get(&user) else {
                bail!("Unknown user '{}'", user);
            };
            println!("{}", serde_json::to_string_pretty(profile)?);
        }
        Command::PullModel => {
            let client = ollama_client(&config)?;
            if client.ensure_model().await? {
                println!("Model '{}' is available at {}", config.model, client.base_url());
            } else {
                bail!("Model '{}' is still missing at {}", config.model, client.base_url());
            }
        }
    }

    Ok(())
}

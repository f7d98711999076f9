use anyhow::{anyhow, Result};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api_connection::connection::{CompletionModel, ModelError};
use crate::fallback::{self, diet};
use crate::profile_store::{Profile, ProfileStore};
use crate::prompt_builder::build_recipe_prompt;
use crate::recipe::{Recipe, RecipeRequest, RecipeSource, Recommendation};
use crate::recipe_parser::{parse_completion, ParseFailure};

/// Why the model path was abandoned. Both kinds end in the fallback generator.
#[derive(Debug)]
pub enum RecommendError {
    ModelUnavailable(ModelError),
    ParseFailure(ParseFailure),
}

impl fmt::Display for RecommendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendError::ModelUnavailable(err) => write!(f, "Model unavailable: {}", err),
            RecommendError::ParseFailure(err) => write!(f, "{}", err),
        }
    }
}

impl Error for RecommendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RecommendError::ModelUnavailable(err) => Some(err),
            RecommendError::ParseFailure(err) => Some(err),
        }
    }
}

impl From<ModelError> for RecommendError {
    fn from(err: ModelError) -> Self {
        RecommendError::ModelUnavailable(err)
    }
}

impl From<ParseFailure> for RecommendError {
    fn from(err: ParseFailure) -> Self {
        RecommendError::ParseFailure(err)
    }
}

#[derive(Debug)]
enum Stage {
    TryModel,
    UseFallback(RecommendError),
    Done(Vec<Recipe>),
}

/// Drives one recommendation: model first, fallback generator on any failure.
#[derive(Clone)]
pub struct Recommender {
    model: Option<Arc<dyn CompletionModel>>,
}

impl Recommender {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model: Some(model) }
    }

    /// A recommender that never calls a model.
    pub fn fallback_only() -> Self {
        Self { model: None }
    }

    async fn try_model(
        &self,
        profile: &Profile,
        request: &RecipeRequest,
    ) -> Result<Vec<Recipe>, RecommendError> {
        let Some(model) = &self.model else {
            return Err(ModelError::Disabled.into());
        };
        let prompt = build_recipe_prompt(profile, request);
        info!(
            model = model.model_name(),
            username = %profile.username,
            "requesting recipes from model"
        );
        let completion = model.generate(&prompt).await?;
        debug!(chars = completion.len(), "model completion received");

        let mut recipes = parse_completion(&completion)?;
        let before = recipes.len();
        recipes.retain(|recipe| {
            recipe
                .ingredients
                .iter()
                .all(|i| diet::is_allowed(i, &profile.allergies, &profile.preferences))
        });
        if recipes.is_empty() {
            return Err(ParseFailure::new(format!(
                "all {} model recipes use an allergen or an ingredient the diet excludes",
                before
            ))
            .into());
        }
        if recipes.len() < before {
            debug!(dropped = before - recipes.len(), "model recipes dropped by profile filters");
        }
        recipes.truncate(request.count);
        Ok(recipes)
    }

    /// Produces a recommendation for `profile` without touching its history.
    /// Never fails: the fallback generator only needs local data.
    pub async fn recommend_for(&self, profile: &Profile, request: &RecipeRequest) -> Recommendation {
        let request = request.clone().normalized();
        let mut stage = Stage::TryModel;
        loop {
            stage = match stage {
                Stage::TryModel => match self.try_model(profile, &request).await {
                    Ok(recipes) => Stage::Done(recipes),
                    Err(err) => Stage::UseFallback(err),
                },
                Stage::UseFallback(reason) => {
                    warn!(
                        username = %profile.username,
                        reason = %reason,
                        "falling back to local recipe generator"
                    );
                    return Recommendation {
                        source: RecipeSource::Fallback,
                        recipes: fallback::generate(profile, &request),
                    };
                }
                Stage::Done(recipes) => {
                    info!(
                        username = %profile.username,
                        count = recipes.len(),
                        "model recipes accepted"
                    );
                    return Recommendation {
                        source: RecipeSource::Model,
                        recipes,
                    };
                }
            };
        }
    }

    /// Recommends for `username` and appends the result to their history.
    /// Persisting the store is left to the caller.
    pub async fn recommend(
        &self,
        store: &mut ProfileStore,
        username: &str,
        request: &RecipeRequest,
    ) -> Result<Recommendation> {
        let profile = store
            .get(username)
            .ok_or_else(|| anyhow!("Unknown user '{}'", username))?;
        let recommendation = self.recommend_for(profile, request).await;
        if let Some(profile) = store.get_mut(username) {
            profile.record(request.clone().normalized(), &recommendation);
        }
        Ok(recommendation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::tempdir;

    struct ScriptedModel {
        reply: Result<String, ()>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionModel for ScriptedModel {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .clone()
                .map_err(|_| ModelError::Timeout(Duration::from_secs(5)))
        }
    }

    fn pantry_profile() -> Profile {
        let mut profile = Profile::new("alex");
        profile.set_pantry(["egg", "rice", "onion"]);
        profile
    }

    #[tokio::test]
    async fn test_model_success_is_used() {
        let model = Arc::new(ScriptedModel::replying(
            r#"[{"title": "Egg Fried Rice", "ingredients": ["egg", "rice"], "steps": ["Fry."]}]"#,
        ));
        let recommender = Recommender::new(model.clone());
        let recommendation = recommender
            .recommend_for(&pantry_profile(), &RecipeRequest::default())
            .await;
        assert_eq!(recommendation.source, RecipeSource::Model);
        assert_eq!(recommendation.primary().unwrap().title, "Egg Fried Rice");
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let model = Arc::new(ScriptedModel::failing());
        let recommender = Recommender::new(model.clone());
        let recommendation = recommender
            .recommend_for(&pantry_profile(), &RecipeRequest::default())
            .await;
        assert_eq!(recommendation.source, RecipeSource::Fallback);
        assert!(recommendation.primary().unwrap().is_usable());
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unparsable_completion_falls_back() {
        let recommender = Recommender::new(Arc::new(ScriptedModel::replying("I cannot do that.")));
        let recommendation = recommender
            .recommend_for(&pantry_profile(), &RecipeRequest::default())
            .await;
        assert_eq!(recommendation.source, RecipeSource::Fallback);
    }

    #[tokio::test]
    async fn test_allergen_recipes_are_rejected() {
        let mut profile = pantry_profile();
        profile.set_allergies(["egg"]);
        let recommender = Recommender::new(Arc::new(ScriptedModel::replying(
            r#"[{"title": "Egg Fried Rice", "ingredients": ["eggs", "rice"]}]"#,
        )));
        let recommendation = recommender
            .recommend_for(&profile, &RecipeRequest::default())
            .await;
        assert_eq!(recommendation.source, RecipeSource::Fallback);
        assert!(recommendation.recipes[0]
            .ingredients
            .iter()
            .all(|i| i == "rice" || i == "onion"));
    }

    #[tokio::test]
    async fn test_recipes_excluded_by_diet_are_rejected() {
        let mut profile = pantry_profile();
        profile.set_preferences(["vegan"]);
        let recommender = Recommender::new(Arc::new(ScriptedModel::replying(
            r#"[{"title": "Chicken Rice", "ingredients": ["chicken thighs", "rice"]}]"#,
        )));
        let recommendation = recommender
            .recommend_for(&profile, &RecipeRequest::default())
            .await;
        assert_eq!(recommendation.source, RecipeSource::Fallback);

        // A compliant recipe in the same reply is kept.
        let recommender = Recommender::new(Arc::new(ScriptedModel::replying(
            r#"[{"title": "Chicken Rice", "ingredients": ["chicken", "rice"]},
                {"title": "Onion Rice", "ingredients": ["onion", "rice"]}]"#,
        )));
        let recommendation = recommender
            .recommend_for(&profile, &RecipeRequest::default())
            .await;
        assert_eq!(recommendation.source, RecipeSource::Model);
        assert_eq!(recommendation.primary().unwrap().title, "Onion Rice");
    }

    #[tokio::test]
    async fn test_model_recipes_are_capped_to_count() {
        let recommender = Recommender::new(Arc::new(ScriptedModel::replying(
            r#"[{"title": "A", "ingredients": ["egg"]}, {"title": "B", "ingredients": ["rice"]}]"#,
        )));
        let recommendation = recommender
            .recommend_for(&pantry_profile(), &RecipeRequest::default())
            .await;
        assert_eq!(recommendation.recipes.len(), 1);
    }

    #[tokio::test]
    async fn test_recommend_appends_history() -> Result<()> {
        let dir = tempdir()?;
        let mut store = ProfileStore::load(dir.path().join("users.json"));
        store.get_or_create("alex").set_pantry(["egg", "rice", "onion"]);

        let recommender = Recommender::fallback_only();
        let recommendation = recommender
            .recommend(&mut store, "alex", &RecipeRequest::new("dinner"))
            .await?;
        let history = &store.get("alex").unwrap().history;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].source, RecipeSource::Fallback);
        assert_eq!(history[0].recipes, recommendation.recipes);

        assert!(recommender
            .recommend(&mut store, "nobody", &RecipeRequest::default())
            .await
            .is_err());
        Ok(())
    }
}

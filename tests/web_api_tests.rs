use anyhow::Result;
use recipe_buddy::profile_store::{HistoryEntry, Profile, ProfileStore};
use recipe_buddy::recipe::{RecipeSource, Recommendation};
use recipe_buddy::recommender::Recommender;
use recipe_buddy::web::{build_router, AppState};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::tempdir;
use tokio::net::TcpListener;

async fn spawn_app(data_file: &Path) -> Result<String> {
    let state = AppState::new(ProfileStore::load(data_file), Recommender::fallback_only());
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, build_router(state)).await;
    });
    Ok(format!("http://{}", addr))
}

#[tokio::test]
async fn test_login_pantry_recommend_history() -> Result<()> {
    let dir = tempdir()?;
    let data_file = dir.path().join("users.json");
    let base = spawn_app(&data_file).await?;
    let http = Client::new();

    let profile: Profile = http
        .post(format!("{}/api/login", base))
        .json(&json!({ "username": "  robin " }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(profile.username, "robin");
    assert!(profile.pantry.is_empty());

    let profile: Profile = http
        .put(format!("{}/api/profiles/robin/pantry", base))
        .json(&json!({ "items": ["egg", " rice ", "", "onion"] }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(profile.pantry.len(), 3);

    let profile: Profile = http
        .put(format!("{}/api/profiles/robin/preferences", base))
        .json(&json!({ "allergies": ["egg"] }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert!(profile.allergies.contains("egg"));
    assert!(profile.preferences.is_empty());

    let recommendation: Recommendation = http
        .post(format!("{}/api/profiles/robin/recommendations", base))
        .json(&json!({ "meal_type": "lunch", "count": 9 }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(recommendation.source, RecipeSource::Fallback);
    assert_eq!(recommendation.recipes.len(), 5);
    for recipe in &recommendation.recipes {
        assert!(recipe.ingredients.iter().all(|i| i == "rice" || i == "onion"));
    }

    let history: Vec<HistoryEntry> = http
        .get(format!("{}/api/profiles/robin/history", base))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].request.count, 5);

    // Everything above went through to disk.
    let persisted = ProfileStore::load(&data_file);
    let robin = persisted.get("robin").expect("robin should be saved");
    assert_eq!(robin.history.len(), 1);
    assert!(robin.allergies.contains("egg"));
    Ok(())
}

#[tokio::test]
async fn test_errors_are_json() -> Result<()> {
    let dir = tempdir()?;
    let base = spawn_app(&dir.path().join("users.json")).await?;
    let http = Client::new();

    let response = http
        .post(format!("{}/api/login", base))
        .json(&json!({ "username": "   " }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert!(body["error"].as_str().unwrap().contains("empty"));

    let response = http
        .get(format!("{}/api/profiles/ghost", base))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await?;
    assert!(body["error"].as_str().unwrap().contains("ghost"));

    let response = http
        .post(format!("{}/api/profiles/ghost/recommendations", base))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Bodies axum cannot decode still answer with a JSON error.
    let response = http
        .post(format!("{}/api/profiles/ghost/recommendations", base))
        .json(&json!({ "meal_type": "brunch" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await?;
    assert!(body["error"].as_str().unwrap().contains("brunch"));

    let response = http
        .put(format!("{}/api/profiles/ghost/pantry", base))
        .header("content-type", "application/json")
        .body("{ items: ")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert!(body["error"].is_string());

    let response = http
        .post(format!("{}/api/login", base))
        .body(r#"{"username": "robin"}"#)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = response.json().await?;
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_index_and_health() -> Result<()> {
    let dir = tempdir()?;
    let base = spawn_app(&dir.path().join("users.json")).await?;
    let http = Client::new();

    let page = http.get(&base).send().await?.error_for_status()?.text().await?;
    assert!(page.contains("Recipe Buddy"));
    // The request form sends mood and per-request constraints.
    assert!(page.contains(r#"id="mood""#));
    assert!(page.contains(r#"constraints: list(val("requestConstraints"))"#));

    let health: Value = http
        .get(format!("{}/api/health", base))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["profiles"], 0);
    Ok(())
}

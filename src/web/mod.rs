//! Web surface: one static page plus a JSON API over the profile store and recommender.
//!
//! ```text
//! GET  /
//! GET  /api/health
//! POST /api/login
//! GET  /api/profiles/{username}
//! PUT  /api/profiles/{username}/pantry
//! PUT  /api/profiles/{username}/preferences
//! POST /api/profiles/{username}/recommendations
//! GET  /api/profiles/{username}/history
//! ```

mod handlers;
mod page;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::info;

use crate::profile_store::ProfileStore;
use crate::recommender::Recommender;

/// Shared handler state. The store is the only mutable piece and sits behind a mutex.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<ProfileStore>>,
    pub recommender: Recommender,
}

impl AppState {
    pub fn new(store: ProfileStore, recommender: Recommender) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            recommender,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/api/health", get(handlers::health))
        .route("/api/login", post(handlers::login))
        .route("/api/profiles/{username}", get(handlers::get_profile))
        .route("/api/profiles/{username}/pantry", put(handlers::update_pantry))
        .route("/api/profiles/{username}/preferences", put(handlers::update_preferences))
        .route("/api/profiles/{username}/recommendations", post(handlers::recommend))
        .route("/api/profiles/{username}/history", get(handlers::history))
        .with_state(state)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

pub async fn serve(state: AppState, bind_addr: &str) -> Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind web server on {}", bind_addr))?;
    info!(%bind_addr, "recipe buddy listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("web server stopped");
    Ok(())
}

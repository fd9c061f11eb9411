//! Shared fixtures for the end-to-end tests.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use pcos::server::{router, AppState};
use pcos::sessions::SessionStore;
use pcos_form::FormController;
use pcos_model::{load_bundle, ModelBundle, ModelError};

/// Path of the bundle shipped in `assets/`.
pub fn demo_bundle_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("assets")
        .join("demo_bundle.json")
}

pub fn demo_bundle() -> Result<ModelBundle, ModelError> {
    load_bundle(demo_bundle_path())
}

pub fn demo_state(ttl: Duration) -> Result<AppState, ModelError> {
    let controller = FormController::new(Arc::new(demo_bundle()?));
    Ok(AppState {
        controller: Arc::new(controller),
        sessions: Arc::new(SessionStore::new(ttl)),
    })
}

pub fn demo_router() -> Result<Router, ModelError> {
    Ok(router(demo_state(Duration::from_secs(600))?))
}

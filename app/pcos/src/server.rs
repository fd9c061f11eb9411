//! HTTP surface: the HTML form plus a small JSON API.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use pcos_form::{Action, FeatureSchema, FieldSpec, FormController, RawInputs};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::ServeConfig;
use crate::error::AppError;
use crate::sessions::SessionStore;

pub const SESSION_COOKIE: &str = "pcos_session";

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<FormController>,
    pub sessions: Arc<SessionStore>,
}

#[derive(Debug, Serialize)]
struct SchemaResponse<'a> {
    name: &'a str,
    model: &'a str,
    negative_class: &'a str,
    positive_class: &'a str,
    fields: &'a [FieldSpec],
    feature_importances: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/api/predict", post(api_predict))
        .route("/api/schema", get(api_schema))
        .route("/healthz", get(healthz))
        .with_state(state)
}

pub async fn serve(config: &ServeConfig, state: AppState) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    log::info!("serving form on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {err}");
    }
}

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    respond(&state, &headers, Action::View).await
}

async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    respond(&state, &headers, form_action(fields)).await
}

async fn healthz() -> &'static str {
    "ok"
}

async fn api_schema(State(state): State<AppState>) -> Response {
    let bundle = state.controller.bundle();
    let classifier = bundle.classifier();
    Json(SchemaResponse {
        name: &bundle.metadata.name,
        model: classifier.kind(),
        negative_class: &bundle.metadata.negative_class,
        positive_class: &bundle.metadata.positive_class,
        fields: state.controller.schema().fields(),
        feature_importances: classifier.feature_importances(),
    })
    .into_response()
}

async fn api_predict(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    let raw = match json_inputs(state.controller.schema(), body) {
        Ok(raw) => raw,
        Err(message) => return api_error(StatusCode::UNPROCESSABLE_ENTITY, message),
    };
    match state.controller.evaluate(&raw) {
        Ok(evaluation) => Json(evaluation).into_response(),
        Err(err) => {
            log::error!("prediction failed: {err}");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn api_error(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

/// Render the page for the caller's session, issuing a cookie to new callers.
async fn respond(state: &AppState, headers: &HeaderMap, action: Action) -> Response {
    let (id, fresh) = match session_id(headers) {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    };
    let controller = &state.controller;
    let body = state
        .sessions
        .interact(&id, |session| {
            let step = controller.handle(session, action);
            let html = controller.render(&step);
            (step.session, html)
        })
        .await;

    let mut response = Html(body).into_response();
    if fresh {
        let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

/// Session id from the `Cookie` header; anything that is not a UUID is ignored.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .find(|id| Uuid::parse_str(id).is_ok())
        .map(str::to_string)
}

/// Split a submitted form into the pressed button and the control values.
pub fn form_action(fields: Vec<(String, String)>) -> Action {
    let mut pressed = None;
    let mut raw = RawInputs::new();
    for (name, value) in fields {
        if name == "action" {
            pressed = Some(value);
        } else {
            raw.insert(name, value);
        }
    }
    match pressed.as_deref() {
        Some("predict") => Action::Predict(raw),
        Some("reset") => Action::Reset,
        Some("history") => Action::ShowHistory(raw),
        _ => Action::Update(raw),
    }
}

/// Accept strings and numbers as raw values; booleans map to `1`/`0` and
/// `null` to a blank field. Keys must name schema features.
fn json_inputs(schema: &FeatureSchema, body: Map<String, Value>) -> Result<RawInputs, String> {
    let mut raw = RawInputs::new();
    for (name, value) in body {
        if schema.field(&name).is_none() {
            return Err(format!("unknown feature '{name}'"));
        }
        let text = match value {
            Value::String(text) => text,
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => if flag { "1" } else { "0" }.to_string(),
            Value::Null => String::new(),
            other => {
                return Err(format!(
                    "feature '{name}' must be a string or a number, got {other}"
                ))
            }
        };
        raw.insert(name, text);
    }
    Ok(raw)
}

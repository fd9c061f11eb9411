use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use pcos::server::router;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tests::{demo_router, demo_state};
use tower::ServiceExt;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Percent-encode a form key or value.
fn encode(text: &str) -> String {
    let mut out = String::new();
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

async fn text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn session_cookie(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("new sessions get a cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn get(app: &Router, cookie: Option<&str>) -> Response {
    let mut request = Request::get("/");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post(app: &Router, cookie: &str, pairs: &[(&str, &str)]) -> String {
    let request = Request::post("/")
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form_body(pairs)))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    text(response).await
}

const POSITIVE: &[(&str, &str)] = &[
    ("Follicle No. (R)", "14"),
    ("Follicle No. (L)", "13"),
    ("Skin darkening (Y/N)", "Yes"),
    ("hair growth(Y/N)", "Yes"),
    ("Weight gain(Y/N)", "Yes"),
    ("Cycle(R/I)", "Irregular"),
    ("AMH(ng/mL)", "7,5"),
    ("Fast food (Y/N)", "Yes"),
    ("Pimples(Y/N)", "Yes"),
    ("BMI", "31,2"),
    ("action", "predict"),
];

#[tokio::test]
async fn full_form_round() {
    init_logging();
    let app = demo_router().unwrap();

    let first = get(&app, None).await;
    assert_eq!(first.status(), StatusCode::OK);
    let cookie = session_cookie(&first);
    let html = text(first).await;
    assert!(html.contains("<title>PCOS Prediction with Random Forest</title>"));
    assert!(html.contains("Follicle count, right ovary"));

    let html = post(&app, &cookie, POSITIVE).await;
    assert!(html.contains("class=\"alert warning\""));
    assert!(html.contains("Prediction result: PCOS with probability 87.34%"));
    assert!(html.contains("obstetrician-gynecologist"));
    assert!(html.contains("Feature importance"));
    // entered values survive the round trip
    assert!(html.contains("value=\"31,2\""));

    let html = post(&app, &cookie, &[("action", "history")]).await;
    assert!(html.contains("Prediction history"));
    assert!(html.contains("<td>1</td><td>PCOS</td><td>12.66%</td><td>87.34%</td>"));
    assert!(!html.contains("Prediction result"));
}

#[tokio::test]
async fn reset_clears_inputs_and_keeps_history() {
    let app = demo_router().unwrap();
    let cookie = session_cookie(&get(&app, None).await);

    post(&app, &cookie, POSITIVE).await;
    let html = post(&app, &cookie, &[("action", "reset")]).await;
    assert!(html.contains("All inputs have been cleared."));
    assert!(html.contains("id=\"field-1-0\""));
    assert!(!html.contains("value=\"31,2\""));

    let html = post(&app, &cookie, &[("action", "history")]).await;
    assert_eq!(html.matches("<td>PCOS</td>").count(), 1);
}

#[tokio::test]
async fn history_view_keeps_typed_values() {
    let app = demo_router().unwrap();
    let cookie = session_cookie(&get(&app, None).await);

    let html = post(&app, &cookie, &[("BMI", "41,5"), ("action", "history")]).await;
    assert!(html.contains("Prediction history"));
    assert!(html.contains("value=\"41,5\""));
    assert!(!html.contains("Prediction result"));

    // a plain redraw keeps them too, and nothing was recorded
    let html = text(get(&app, Some(&cookie)).await).await;
    assert!(html.contains("value=\"41,5\""));
    let html = post(&app, &cookie, &[("BMI", "41,5"), ("action", "history")]).await;
    assert!(html.contains("No prediction history yet."));
}

#[tokio::test]
async fn json_api_rejects_unknown_features() {
    let app = demo_router().unwrap();
    let request = Request::post("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"BMI": 22, "Height": 170}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_str(&text(response).await).unwrap();
    assert_eq!(body["error"], "unknown feature 'Height'");
}

#[tokio::test]
async fn sessions_do_not_share_history() {
    let app = demo_router().unwrap();
    let alice = session_cookie(&get(&app, None).await);
    let bob = session_cookie(&get(&app, None).await);
    assert_ne!(alice, bob);

    post(&app, &alice, POSITIVE).await;
    post(&app, &alice, &[("BMI", "22"), ("action", "predict")]).await;

    let html = post(&app, &alice, &[("action", "history")]).await;
    assert!(html.contains("<td>2</td><td>Not PCOS</td>"));
    let html = post(&app, &bob, &[("action", "history")]).await;
    assert!(html.contains("No prediction history yet."));
}

#[tokio::test(start_paused = true)]
async fn idle_session_loses_history() {
    let app = router(demo_state(Duration::from_secs(60)).unwrap());
    let cookie = session_cookie(&get(&app, None).await);
    post(&app, &cookie, POSITIVE).await;

    tokio::time::advance(Duration::from_secs(61)).await;
    let html = post(&app, &cookie, &[("action", "history")]).await;
    assert!(html.contains("No prediction history yet."));
}

#[tokio::test]
async fn invalid_number_is_reported_and_prediction_still_runs() {
    let app = demo_router().unwrap();
    let cookie = session_cookie(&get(&app, None).await);
    let html = post(&app, &cookie, &[("BMI", "twenty"), ("action", "predict")]).await;
    assert!(html.contains("&#39;twenty&#39; is not a valid number"));
    assert!(html.contains("Prediction result: Not PCOS"));
}

#[tokio::test]
async fn json_api_predicts_and_describes_schema() {
    let app = demo_router().unwrap();

    let request = Request::post("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"Follicle No. (R)": 14, "Follicle No. (L)": 13, "Skin darkening (Y/N)": "Yes",
                "hair growth(Y/N)": true, "Weight gain(Y/N)": "Yes", "Cycle(R/I)": "Irregular",
                "AMH(ng/mL)": "7,5", "Fast food (Y/N)": "Yes", "Pimples(Y/N)": 1, "BMI": 31.2}"#,
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&text(response).await).unwrap();
    assert_eq!(body["prediction"]["label"], "positive");
    assert_eq!(
        body["outcome"]["headline"],
        "Prediction result: PCOS with probability 87.34%"
    );
    assert_eq!(body["normalized"]["errors"].as_array().unwrap().len(), 0);

    let response = app
        .oneshot(Request::get("/api/schema").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let schema: Value = serde_json::from_str(&text(response).await).unwrap();
    assert_eq!(schema["fields"].as_array().unwrap().len(), 10);
    assert_eq!(schema["positive_class"], "PCOS");
    assert_eq!(schema["feature_importances"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn forged_cookie_gets_a_fresh_session() {
    let app = demo_router().unwrap();
    let response = get(&app, Some("pcos_session=not-a-uuid")).await;
    let cookie = session_cookie(&response);
    let id = cookie.trim_start_matches("pcos_session=");
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

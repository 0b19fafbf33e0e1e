//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::ServiceExt;

use super::error::{INVALID_CREDENTIALS, USERNAME_TAKEN};
use super::predict::{REFERENCE_MAX, REFERENCE_MIN};
use super::*;
use crate::auth::session_key;
use crate::interfaces::UserStore;
use crate::prediction::{FeatureSchema, LinearRegression};
use crate::storage::SqliteUserStore;

const COLUMNS_JSON: &str = r#"{"data_columns": ["r_d_expenses", "administration_expenses", "marketing_expenses", "state_california", "state_florida", "state_new york"]}"#;
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

struct TestApp {
    app: Router,
    _static_dir: tempfile::TempDir,
}

async fn test_app(strict_state: bool) -> TestApp {
    let opts = SqliteConnectOptions::new()
        .filename(":memory:")
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .expect("failed to create in-memory pool");
    let users = Arc::new(SqliteUserStore::new(pool));
    users.init_schema().await.expect("failed to init schema");

    let schema = FeatureSchema::from_json_str(COLUMNS_JSON).unwrap();
    let model = LinearRegression::new(vec![0.8, -0.03, 0.03, 100.0, 200.0, 300.0], 50_000.0);
    let predictor = PredictionService::new(Arc::new(schema), Arc::new(model))
        .unwrap()
        .with_strict_state(strict_state);

    let static_dir = tempfile::tempdir().unwrap();
    std::fs::write(static_dir.path().join("home.html"), "<h1>Home</h1>").unwrap();
    std::fs::write(static_dir.path().join("login.html"), "<form>login</form>").unwrap();

    let state = AppState {
        users,
        predictor,
        session_key: session_key(Some("test-secret-key-that-is-long-enough-to-sign")),
        session: SessionSettings {
            cookie_name: "session".to_string(),
        },
    };

    TestApp {
        app: router(state, static_dir.path()),
        _static_dir: static_dir,
    }
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn body_bytes(resp: Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 4 * 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

fn session_cookie(resp: &Response) -> Option<String> {
    resp.headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

fn location(resp: &Response) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn registration(username: &str) -> String {
    format!(
        "username={username}&U_password=s3cret&email=ada%40example.com&phone_no=5550100\
         &R_address=12+Analytical+Way&gender=female&age=36&dob=1815-12-10"
    )
}

async fn register_and_login(app: &Router, username: &str) -> String {
    let resp = send(app, post_form("/register", &registration(username), None)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = format!("username={username}&U_password=s3cret");
    let resp = send(app, post_form("/", &body, None)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    session_cookie(&resp).expect("login sets a session cookie")
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn test_login_with_correct_password_opens_session() {
    let t = test_app(false).await;
    let cookie = register_and_login(&t.app, "ada").await;

    let resp = send(&t.app, get("/info", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["user"]["username"], "ada");
    assert_eq!(json["user"]["dob"], "1815-12-10");
    assert!(json["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_redirects_to_info() {
    let t = test_app(false).await;
    send(&t.app, post_form("/register", &registration("ada"), None)).await;

    let resp = send(&t.app, post_form("/", "username=ada&U_password=s3cret", None)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/info");
}

#[tokio::test]
async fn test_login_trims_username_like_registration() {
    let t = test_app(false).await;
    let resp = send(&t.app, post_form("/register", &registration("ada+"), None)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(&t.app, post_form("/", "username=ada+&U_password=s3cret", None)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&resp).expect("session cookie");

    let json = body_json(send(&t.app, get("/info", Some(&cookie))).await).await;
    assert_eq!(json["user"]["username"], "ada");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let t = test_app(false).await;
    send(&t.app, post_form("/register", &registration("ada"), None)).await;

    let resp = send(&t.app, post_form("/", "username=ada&U_password=guess", None)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&resp).is_none());
    assert_eq!(body_json(resp).await["error"], INVALID_CREDENTIALS);
}

#[tokio::test]
async fn test_duplicate_registration_is_conflict() {
    let t = test_app(false).await;
    let first = send(&t.app, post_form("/register", &registration("ada"), None)).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    assert_eq!(body_bytes(first).await, b"Registration successful!");

    let second = send(&t.app, post_form("/register", &registration("ada"), None)).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(second).await["error"], USERNAME_TAKEN);
}

#[tokio::test]
async fn test_registration_rejects_bad_age() {
    let t = test_app(false).await;
    let body = registration("ada").replace("age=36", "age=old");
    let resp = send(&t.app, post_form("/register", &body, None)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_anonymous_info_and_profile_redirect_to_login() {
    let t = test_app(false).await;
    for uri in ["/info", "/profile"] {
        let resp = send(&t.app, get(uri, None)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&resp), "/");
    }
}

#[tokio::test]
async fn test_tampered_cookie_is_anonymous() {
    let t = test_app(false).await;
    let cookie = register_and_login(&t.app, "ada").await;
    let tampered = format!("{}x", cookie);

    let resp = send(&t.app, get("/info", Some(&tampered))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_profile_update_refreshes_session() {
    let t = test_app(false).await;
    let cookie = register_and_login(&t.app, "ada").await;

    let body = registration("lovelace")
        .replace("&U_password=s3cret", "")
        .replace("age=36", "age=37");
    let resp = send(&t.app, post_form("/profile", &body, Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/profile");
    let cookie = session_cookie(&resp).expect("session refreshed");

    let json = body_json(send(&t.app, get("/profile", Some(&cookie))).await).await;
    assert_eq!(json["user"]["username"], "lovelace");
    assert_eq!(json["user"]["age"], 37);
}

#[tokio::test]
async fn test_profile_update_to_taken_username_is_conflict() {
    let t = test_app(false).await;
    send(&t.app, post_form("/register", &registration("ada"), None)).await;
    let cookie = register_and_login(&t.app, "bob").await;

    let body = registration("ada").replace("&U_password=s3cret", "");
    let resp = send(&t.app, post_form("/profile", &body, Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["error"], USERNAME_TAKEN);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let t = test_app(false).await;
    let cookie = register_and_login(&t.app, "ada").await;

    let resp = send(&t.app, get("/logout", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    let cleared = session_cookie(&resp).expect("removal cookie");
    assert_eq!(cleared, "session=");
}

// ============================================================================
// Static pages
// ============================================================================

#[tokio::test]
async fn test_static_page_is_served() {
    let t = test_app(false).await;
    let resp = send(&t.app, get("/home", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, b"<h1>Home</h1>");
}

#[tokio::test]
async fn test_missing_static_page_is_not_found() {
    let t = test_app(false).await;
    let resp = send(&t.app, get("/help_desk", None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Prediction
// ============================================================================

#[tokio::test]
async fn test_predict_returns_rounded_profit_and_inputs() {
    let t = test_app(false).await;
    let body = "r_d_expenses=100000&administration_expenses=50000&marketing_expenses=20000&state=California";
    let resp = send(&t.app, post_form("/predict", body, None)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["prediction"], 129_200.0);
    assert_eq!(json["state_recognized"], true);
    assert_eq!(json["r_d_expenses"], 100_000.0);
    assert_eq!(json["state"], "California");
}

#[tokio::test]
async fn test_predict_unknown_state_is_zero_filled() {
    let t = test_app(false).await;
    let body = "r_d_expenses=100000&administration_expenses=50000&marketing_expenses=20000&state=Texas";
    let json = body_json(send(&t.app, post_form("/predict", body, None)).await).await;
    assert_eq!(json["state_recognized"], false);
    assert_eq!(json["prediction"], 129_100.0);
}

#[tokio::test]
async fn test_predict_unknown_state_rejected_when_strict() {
    let t = test_app(true).await;
    let body = "r_d_expenses=1&administration_expenses=1&marketing_expenses=1&state=Texas";
    let resp = send(&t.app, post_form("/predict", body, None)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_predict_huge_amount_is_still_a_number() {
    let t = test_app(false).await;
    let body = "r_d_expenses=1e307&administration_expenses=0&marketing_expenses=0&state=California";
    let resp = send(&t.app, post_form("/predict", body, None)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let prediction = body_json(resp).await["prediction"].as_f64();
    assert!(prediction.is_some_and(f64::is_finite), "got {prediction:?}");
}

#[tokio::test]
async fn test_predict_malformed_amount_is_bad_request() {
    let t = test_app(false).await;
    let body = "r_d_expenses=lots&administration_expenses=1&marketing_expenses=1&state=Florida";
    let resp = send(&t.app, post_form("/predict", body, None)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert!(json["error"].as_str().unwrap().contains("r_d_expenses"));
}

#[tokio::test]
async fn test_result_reference_number_in_range() {
    let t = test_app(false).await;
    let json = body_json(send(&t.app, get("/result", None)).await).await;

    let reference = json["reference_number"].as_u64().unwrap() as u32;
    assert!((REFERENCE_MIN..=REFERENCE_MAX).contains(&reference));
    assert!(!json["current_date"].as_str().unwrap().is_empty());
}

// ============================================================================
// Charts
// ============================================================================

#[tokio::test]
async fn test_charts_without_params_are_png() {
    let t = test_app(false).await;
    for uri in ["/bar_plot", "/pie_plot"] {
        let resp = send(&t.app, get(uri, None)).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
        let png = body_bytes(resp).await;
        assert!(png.starts_with(PNG_SIGNATURE), "{uri}");
    }
}

#[tokio::test]
async fn test_charts_with_explicit_zeros_are_png() {
    let t = test_app(false).await;
    let query = "r_d_expenses=0&administration_expenses=0&marketing_expenses=0";
    for path in ["/bar_plot", "/pie_plot"] {
        let resp = send(&t.app, get(&format!("{path}?{query}"), None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_bytes(resp).await.starts_with(PNG_SIGNATURE));
    }
}

#[tokio::test]
async fn test_chart_malformed_amount_is_bad_request() {
    let t = test_app(false).await;
    let resp = send(&t.app, get("/pie_plot?marketing_expenses=much", None)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bar_chart_with_amount_near_f64_max_is_bad_request() {
    let t = test_app(false).await;
    let resp = send(&t.app, get("/bar_plot?r_d_expenses=1.7e308", None)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let t = test_app(false).await;
    let resp = send(&t.app, get("/health", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

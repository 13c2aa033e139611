//! End-to-end tests of the HTTP surface through the axum router.

mod support;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use expense_manager::backend::session::InMemorySessions;
use expense_manager::backend::{build_router, AppState};
use support::{migrated_pool, test_config, FixedClock, TEST_PASSWORD};

struct TestApp {
    router: Router,
}

struct TestResponse {
    status: StatusCode,
    set_cookie: Option<String>,
    body: Value,
}

impl TestApp {
    async fn new() -> Self {
        let pool = migrated_pool().await;
        let config = test_config();
        let clock = FixedClock::at_noon(2026, 10, 17);
        let sessions = Arc::new(InMemorySessions::new(clock.clone(), config.session_ttl));
        let state = AppState::with_parts(pool, &config, clock, sessions);
        Self {
            router: build_router(state),
        }
    }

    async fn send(&self, method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse {
            status,
            set_cookie,
            body,
        }
    }

    /// Registers and logs in; returns the `sid=...` cookie pair.
    async fn signed_in(&self, email: &str) -> String {
        let registered = self
            .send(
                Method::POST,
                "/register",
                None,
                Some(json!({ "name": "Test User", "email": email, "password": TEST_PASSWORD })),
            )
            .await;
        assert_eq!(registered.status, StatusCode::CREATED);

        let login = self
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({ "email": email, "password": TEST_PASSWORD })),
            )
            .await;
        assert_eq!(login.status, StatusCode::OK);
        let set_cookie = login.set_cookie.expect("session cookie");
        set_cookie
            .split(';')
            .next()
            .expect("cookie pair")
            .to_string()
    }

    async fn create_category(&self, cookie: &str, name: &str, budget: &str) -> i64 {
        let created = self
            .send(
                Method::POST,
                "/api/categories",
                Some(cookie),
                Some(json!({ "name": name, "budget": budget })),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
        created.body["category_id"].as_i64().expect("category id")
    }

    async fn create_expense(&self, cookie: &str, category_id: i64, amount: &str, day: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/api/expenses",
            Some(cookie),
            Some(json!({
                "category_id": category_id,
                "description": "test",
                "amount": amount,
                "expense_date": day,
            })),
        )
        .await
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;
    let response = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn api_routes_require_a_session() {
    let app = TestApp::new().await;
    for uri in ["/api/user", "/api/categories", "/api/expenses", "/api/budget-status"] {
        let response = app.send(Method::GET, uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(response.body["code"], "UNAUTHENTICATED");

        let forged = app.send(Method::GET, uri, Some("sid=forged"), None).await;
        assert_eq!(forged.status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    let write = app
        .send(
            Method::POST,
            "/api/categories",
            None,
            Some(json!({ "name": "Food", "budget": "10" })),
        )
        .await;
    assert_eq!(write.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_sets_an_http_only_session_cookie() {
    let app = TestApp::new().await;
    app.send(
        Method::POST,
        "/register",
        None,
        Some(json!({ "name": "Ada", "email": "ada@example.com", "password": TEST_PASSWORD })),
    )
    .await;

    let login = app
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": TEST_PASSWORD })),
        )
        .await;
    let cookie = login.set_cookie.expect("cookie");
    assert!(cookie.starts_with("sid="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=604800"));
}

#[tokio::test]
async fn failed_logins_look_the_same() {
    let app = TestApp::new().await;
    app.signed_in("ada@example.com").await;

    let wrong_password = app
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "wrong password" })),
        )
        .await;
    let unknown_email = app
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": TEST_PASSWORD })),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.status, unknown_email.status);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(wrong_password.body["code"], "INVALID_CREDENTIALS");
    assert!(wrong_password.set_cookie.is_none());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = TestApp::new().await;
    app.signed_in("ada@example.com").await;

    let again = app
        .send(
            Method::POST,
            "/register",
            None,
            Some(json!({ "name": "Ada", "email": "ADA@example.com", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.body["code"], "DUPLICATE_EMAIL");
}

#[tokio::test]
async fn profile_returns_the_signed_in_user() {
    let app = TestApp::new().await;
    let cookie = app.signed_in("ada@example.com").await;

    let profile = app.send(Method::GET, "/api/user", Some(&cookie), None).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["name"], "Test User");
    assert_eq!(profile.body["email"], "ada@example.com");
    assert!(profile.body["avatar_url"].as_str().is_some());
    assert!(profile.body.get("password_hash").is_none());
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = TestApp::new().await;
    let cookie = app.signed_in("ada@example.com").await;

    let logout = app.send(Method::POST, "/logout", Some(&cookie), None).await;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);
    assert!(logout.set_cookie.expect("cleared cookie").contains("Max-Age=0"));

    let after = app.send(Method::GET, "/api/user", Some(&cookie), None).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn budget_status_matches_the_monthly_scenario() {
    let app = TestApp::new().await;
    let cookie = app.signed_in("ada@example.com").await;
    let food = app.create_category(&cookie, "Food", "200").await;
    let rent = app.create_category(&cookie, "Rent", "1000").await;

    for (category, amount, day) in [
        (food, "30", "2026-10-03"),
        (food, "25", "2026-10-12"),
        (food, "10", "2026-09-20"),
        (rent, "1000", "2026-10-01"),
    ] {
        let created = app.create_expense(&cookie, category, amount, day).await;
        assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    }

    let status = app.send(Method::GET, "/api/budget-status", Some(&cookie), None).await;
    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(
        status.body,
        json!([
            { "category_id": food, "name": "Food", "budget": "200.00", "spent": "55.00" },
            { "category_id": rent, "name": "Rent", "budget": "1000.00", "spent": "1000.00" },
        ])
    );
}

#[tokio::test]
async fn expenses_list_with_category_names() {
    let app = TestApp::new().await;
    let cookie = app.signed_in("ada@example.com").await;
    let food = app.create_category(&cookie, "Food", "200").await;
    app.create_expense(&cookie, food, "4.20", "2026-10-02").await;
    app.create_expense(&cookie, food, "9.99", "2026-10-09").await;

    let listed = app.send(Method::GET, "/api/expenses", Some(&cookie), None).await;
    assert_eq!(listed.status, StatusCode::OK);
    let rows = listed.body.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["expense_date"], "2026-10-09");
    assert_eq!(rows[0]["amount"], "9.99");
    assert_eq!(rows[0]["category_name"], "Food");
    assert_eq!(rows[1]["expense_date"], "2026-10-02");
}

#[tokio::test]
async fn cross_user_expense_is_forbidden() {
    let app = TestApp::new().await;
    let ada = app.signed_in("ada@example.com").await;
    let mallory = app.signed_in("mallory@example.com").await;
    let food = app.create_category(&ada, "Food", "200").await;

    let attempt = app.create_expense(&mallory, food, "10", "2026-10-05").await;
    assert_eq!(attempt.status, StatusCode::FORBIDDEN);
    assert_eq!(attempt.body["code"], "CATEGORY_OWNERSHIP_MISMATCH");

    let adas = app.send(Method::GET, "/api/expenses", Some(&ada), None).await;
    assert_eq!(adas.body, json!([]));
    let mallorys = app.send(Method::GET, "/api/expenses", Some(&mallory), None).await;
    assert_eq!(mallorys.body, json!([]));
}

#[tokio::test]
async fn invalid_writes_are_bad_requests() {
    let app = TestApp::new().await;
    let cookie = app.signed_in("ada@example.com").await;
    let food = app.create_category(&cookie, "Food", "200").await;

    let zero = app.create_expense(&cookie, food, "0", "2026-10-05").await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);
    assert_eq!(zero.body["code"], "INVALID_INPUT");

    let oversized = app.create_expense(&cookie, food, "50000000000000000", "2026-10-05").await;
    assert_eq!(oversized.status, StatusCode::BAD_REQUEST);
    assert_eq!(oversized.body["code"], "INVALID_INPUT");

    let negative_budget = app
        .send(
            Method::POST,
            "/api/categories",
            Some(&cookie),
            Some(json!({ "name": "Fun", "budget": "-1" })),
        )
        .await;
    assert_eq!(negative_budget.status, StatusCode::BAD_REQUEST);

    let duplicate = app
        .send(
            Method::POST,
            "/api/categories",
            Some(&cookie),
            Some(json!({ "name": "FOOD", "budget": "1" })),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.body["code"], "DUPLICATE_NAME");

    let malformed = app
        .send(
            Method::POST,
            "/api/expenses",
            Some(&cookie),
            Some(json!({ "category_id": food, "amount": "5", "expense_date": "yesterday" })),
        )
        .await;
    assert!(malformed.status.is_client_error());
    assert_eq!(malformed.body["code"], "INVALID_INPUT");

    let missing = app.create_expense(&cookie, 9_999, "5", "2026-10-05").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["code"], "CATEGORY_NOT_FOUND");
}

#[tokio::test]
async fn budgets_can_be_edited_by_their_owner() {
    let app = TestApp::new().await;
    let ada = app.signed_in("ada@example.com").await;
    let grace = app.signed_in("grace@example.com").await;
    let food = app.create_category(&ada, "Food", "200").await;
    let uri = format!("/api/categories/{food}/budget");

    let updated = app
        .send(Method::PUT, &uri, Some(&ada), Some(json!({ "budget": "320.5" })))
        .await;
    assert_eq!(updated.status, StatusCode::NO_CONTENT);

    let foreign = app
        .send(Method::PUT, &uri, Some(&grace), Some(json!({ "budget": "1" })))
        .await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);

    let listed = app.send(Method::GET, "/api/categories", Some(&ada), None).await;
    assert_eq!(listed.body[0]["budget"], "320.50");
}

//! Integration tests for login, lockout and session validation.

mod helpers;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;

use carechart_core::types::pagination::PageRequest;
use carechart_entity::account::AccountRole;
use carechart_entity::audit::{AuditAction, AuditFilter};

use helpers::{PASSWORD, TestApp};

async fn bad_login(app: &TestApp, username: &str) -> helpers::TestResponse {
    app.post(
        "/api/auth/login",
        None,
        json!({ "username": username, "password": "Wrong-Password-1" }),
    )
    .await
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    app.seed_account("dr.house", AccountRole::Physician).await;

    let resp = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": "dr.house", "password": PASSWORD }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["success"], true);
    assert!(resp.data()["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(resp.data()["account"]["username"], "dr.house");
    assert_eq!(resp.data()["account"]["role"], "physician");
    assert!(resp.data()["account"].get("password_hash").is_none());

    let cookie = resp
        .headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cookie.starts_with("carechart_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
}

#[tokio::test]
async fn test_login_by_email_ignores_case() {
    let app = TestApp::new();
    app.seed_account("nurse.joy", AccountRole::Nurse).await;

    let resp = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "NURSE.JOY@carechart.test", "password": PASSWORD }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["account"]["username"], "nurse.joy");
}

#[tokio::test]
async fn test_unknown_account_is_indistinguishable() {
    let app = TestApp::new();
    app.seed_account("dr.house", AccountRole::Physician).await;

    let unknown = bad_login(&app, "nobody").await;
    let wrong = bad_login(&app, "dr.house").await;

    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.error_code(), "INVALID_CREDENTIALS");
    assert_eq!(unknown.body["message"], wrong.body["message"]);
}

#[tokio::test]
async fn test_inactive_account_cannot_login() {
    let app = TestApp::new();
    let account = app.seed_account("temp.staff", AccountRole::Staff).await;
    app.stores
        .accounts
        .set_active(account.id, false)
        .await
        .expect("deactivate");

    let resp = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": "temp.staff", "password": PASSWORD }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error_code(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_lockout_after_repeated_failures() {
    let app = TestApp::new();
    let account = app.seed_account("dr.house", AccountRole::Physician).await;

    for _ in 0..2 {
        let resp = bad_login(&app, "dr.house").await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
        assert_eq!(resp.body["message"], "Invalid username or password");
    }

    let resp = bad_login(&app, "dr.house").await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert!(
        resp.body["message"]
            .as_str()
            .unwrap_or_default()
            .contains("2 attempts remaining")
    );

    let resp = bad_login(&app, "dr.house").await;
    assert!(
        resp.body["message"]
            .as_str()
            .unwrap_or_default()
            .contains("1 attempt remaining")
    );

    let resp = bad_login(&app, "dr.house").await;
    assert_eq!(resp.status, StatusCode::LOCKED);
    assert_eq!(resp.error_code(), "ACCOUNT_LOCKED");

    // The right password no longer helps.
    let resp = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": "dr.house", "password": PASSWORD }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::LOCKED);

    let stored = app
        .stores
        .accounts
        .find_by_id(account.id)
        .await
        .expect("lookup")
        .expect("account exists");
    assert!(stored.is_locked);
    assert_eq!(stored.failed_login_attempts, 5);

    let failures = app
        .stores
        .audit
        .search(
            &AuditFilter {
                action: Some(AuditAction::Login),
                success: Some(false),
                ..AuditFilter::default()
            },
            &PageRequest::default(),
        )
        .await
        .expect("audit search");
    assert_eq!(failures.total_items, 6);
}

#[tokio::test]
async fn test_successful_login_resets_counter() {
    let app = TestApp::new();
    let account = app.seed_account("nurse.joy", AccountRole::Nurse).await;

    bad_login(&app, "nurse.joy").await;
    bad_login(&app, "nurse.joy").await;
    app.login("nurse.joy").await;

    let stored = app
        .stores
        .accounts
        .find_by_id(account.id)
        .await
        .expect("lookup")
        .expect("account exists");
    assert_eq!(stored.failed_login_attempts, 0);
    assert!(!stored.is_locked);
    assert_eq!(stored.last_login_ip.as_deref(), Some("10.0.0.7"));
}

#[tokio::test]
async fn test_me_requires_session() {
    let app = TestApp::new();
    app.seed_account("nurse.joy", AccountRole::Nurse).await;

    let resp = app.get("/api/auth/me", None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error_code(), "UNAUTHENTICATED");

    let resp = app.get("/api/auth/me", Some("not-a-token")).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let token = app.login("nurse.joy").await;
    let resp = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["identity"]["username"], "nurse.joy");
    assert_eq!(resp.data()["identity"]["role"], "nurse");
    assert_eq!(resp.data()["account"]["username"], "nurse.joy");
}

#[tokio::test]
async fn test_cookie_session() {
    let app = TestApp::new();
    app.seed_account("nurse.joy", AccountRole::Nurse).await;
    let token = app.login("nurse.joy").await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/auth/me")
        .header(header::COOKIE, format!("carechart_session={token}"))
        .body(Body::empty())
        .expect("build request");
    let resp = app.call(request).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["identity"]["username"], "nurse.joy");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new();
    app.seed_account("nurse.joy", AccountRole::Nurse).await;
    let token = app.login("nurse.joy").await;

    let resp = app.post("/api/auth/logout", Some(&token), json!({})).await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error_code(), "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_password_check_reports_failed_rules() {
    let app = TestApp::new();

    let resp = app
        .post("/api/auth/password/validate", None, json!({ "password": "abc" }))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["valid"], false);
    let rules = resp.data()["failed_rules"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    assert!(rules.contains(&json!("min_length")));
    assert!(rules.contains(&json!("uppercase")));

    let resp = app
        .post("/api/auth/password/validate", None, json!({ "password": PASSWORD }))
        .await;
    assert_eq!(resp.data()["valid"], true);
}

#[tokio::test]
async fn test_change_own_password() {
    let app = TestApp::new();
    app.seed_account("nurse.joy", AccountRole::Nurse).await;
    let token = app.login("nurse.joy").await;

    let resp = app
        .put(
            "/api/auth/password",
            Some(&token),
            json!({ "current_password": "Not-The-One-1", "new_password": "Night-Shift-77?" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code(), "VALIDATION_ERROR");

    let resp = app
        .put(
            "/api/auth/password",
            Some(&token),
            json!({ "current_password": PASSWORD, "new_password": "Night-Shift-77?" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": "nurse.joy", "password": "Night-Shift-77?" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
}

//! Integration tests for administrative account management and the audit log.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use carechart_entity::account::AccountRole;

use helpers::{PASSWORD, TestApp};

async fn lock_out(app: &TestApp, username: &str) {
    for _ in 0..5 {
        app.post(
            "/api/auth/login",
            None,
            json!({ "username": username, "password": "Wrong-Password-1" }),
        )
        .await;
    }
}

#[tokio::test]
async fn test_admin_unlocks_account() {
    let app = TestApp::new();
    app.seed_account("chief", AccountRole::Admin).await;
    let nurse = app.seed_account("nurse.joy", AccountRole::Nurse).await;
    let admin = app.login("chief").await;

    lock_out(&app, "nurse.joy").await;
    let resp = app.get(&format!("/api/admin/accounts/{}", nurse.id), Some(&admin)).await;
    assert_eq!(resp.data()["is_locked"], true);

    let resp = app
        .post(
            &format!("/api/admin/accounts/{}/unlock", nurse.id),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["is_locked"], false);
    assert_eq!(resp.data()["failed_login_attempts"], 0);

    app.login("nurse.joy").await;

    let audit = app
        .get("/api/admin/audit?action=account_unlock", Some(&admin))
        .await;
    assert_eq!(audit.status, StatusCode::OK);
    assert_eq!(audit.data()["total_items"], 1);
    let entry = &audit.data()["items"][0];
    assert_eq!(entry["target_account_id"], nurse.id);
    assert_eq!(entry["actor_username"], "chief");
    assert_eq!(entry["details"]["was_locked"], true);
}

#[tokio::test]
async fn test_admin_routes_forbidden_for_clinicians() {
    let app = TestApp::new();
    app.seed_account("dr.grey", AccountRole::Physician).await;
    let token = app.login("dr.grey").await;

    let resp = app.get("/api/admin/accounts", Some(&token)).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app.get("/api/admin/audit", Some(&token)).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app.get("/api/admin/accounts", None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reset_password_ends_sessions() {
    let app = TestApp::new();
    app.seed_account("chief", AccountRole::Admin).await;
    let nurse = app.seed_account("nurse.joy", AccountRole::Nurse).await;
    let admin = app.login("chief").await;
    let nurse_token = app.login("nurse.joy").await;

    let resp = app
        .post(
            &format!("/api/admin/accounts/{}/reset-password", nurse.id),
            Some(&admin),
            json!({ "new_password": "Temp-Reset-2026!" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["must_change_password"], true);

    let resp = app.get("/api/auth/me", Some(&nurse_token)).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": "nurse.joy", "password": "Temp-Reset-2026!" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["must_change_password"], true);
}

#[tokio::test]
async fn test_reset_password_blocks_work_until_changed() {
    let app = TestApp::new();
    app.seed_account("chief", AccountRole::Admin).await;
    let physician = app.seed_account("dr.grey", AccountRole::Physician).await;
    let patient = app.seed_patient("MRN-2002", "Grace Hopper").await;
    let admin = app.login("chief").await;

    app.post(
        &format!("/api/admin/accounts/{}/reset-password", physician.id),
        Some(&admin),
        json!({ "new_password": "Temp-Reset-2026!" }),
    )
    .await;
    let resp = app
        .post(
            "/api/auth/login",
            None,
            json!({ "username": "dr.grey", "password": "Temp-Reset-2026!" }),
        )
        .await;
    let token = resp.data()["token"].as_str().unwrap().to_string();
    let record = json!({ "patient_id": patient.id, "diagnosis": "Sprain" });

    let resp = app.post("/api/medical-records", Some(&token), record.clone()).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.error_code(), "FORBIDDEN");
    let resp = app.get("/api/patients", Some(&token)).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["identity"]["must_change_password"], true);

    let resp = app
        .put(
            "/api/auth/password",
            Some(&token),
            json!({ "current_password": "Temp-Reset-2026!", "new_password": PASSWORD }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["must_change_password"], false);

    let resp = app.post("/api/medical-records", Some(&token), record).await;
    assert_eq!(resp.status, StatusCode::CREATED);

    let resp = app.post("/api/auth/logout", Some(&token), json!({})).await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_account_enforces_policy() {
    let app = TestApp::new();
    app.seed_account("chief", AccountRole::Admin).await;
    let admin = app.login("chief").await;

    let resp = app
        .post(
            "/api/admin/accounts",
            Some(&admin),
            json!({ "username": "dr.new", "password": "password", "role": "physician" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code(), "VALIDATION_ERROR");

    let resp = app
        .post(
            "/api/admin/accounts",
            Some(&admin),
            json!({
                "username": "dr.new",
                "email": "dr.new@carechart.test",
                "password": PASSWORD,
                "role": "physician",
            }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.data()["role"], "physician");
    assert_eq!(resp.data()["must_change_password"], true);

    let resp = app
        .post(
            "/api/admin/accounts",
            Some(&admin),
            json!({ "username": "DR.NEW", "password": PASSWORD, "role": "nurse" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_deactivation_rules() {
    let app = TestApp::new();
    let chief = app.seed_account("chief", AccountRole::Admin).await;
    let nurse = app.seed_account("nurse.joy", AccountRole::Nurse).await;
    let admin = app.login("chief").await;
    let nurse_token = app.login("nurse.joy").await;

    let resp = app
        .post(
            &format!("/api/admin/accounts/{}/deactivate", chief.id),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .post(
            &format!("/api/admin/accounts/{}/deactivate", nurse.id),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["is_active"], false);

    let resp = app.get("/api/auth/me", Some(&nurse_token)).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = app
        .post(
            &format!("/api/admin/accounts/{}/activate", nurse.id),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    app.login("nurse.joy").await;
}

#[tokio::test]
async fn test_list_accounts_filters_locked() {
    let app = TestApp::new();
    app.seed_account("chief", AccountRole::Admin).await;
    app.seed_account("nurse.joy", AccountRole::Nurse).await;
    app.seed_account("dr.grey", AccountRole::Physician).await;
    let admin = app.login("chief").await;

    lock_out(&app, "dr.grey").await;

    let resp = app.get("/api/admin/accounts", Some(&admin)).await;
    assert_eq!(resp.data()["total_items"], 3);

    let resp = app
        .get("/api/admin/accounts?is_locked=true", Some(&admin))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["total_items"], 1);
    assert_eq!(resp.data()["items"][0]["username"], "dr.grey");
}

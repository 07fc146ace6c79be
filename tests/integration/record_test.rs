//! Integration tests for clinical records and their history.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use carechart_entity::account::AccountRole;

use helpers::TestApp;

struct Ward {
    app: TestApp,
    physician: String,
    patient_id: i64,
}

async fn ward() -> Ward {
    let app = TestApp::new();
    app.seed_account("dr.grey", AccountRole::Physician).await;
    let patient = app.seed_patient("MRN-1001", "Ada Lovelace").await;
    let physician = app.login("dr.grey").await;

    Ward {
        app,
        physician,
        patient_id: patient.id,
    }
}

#[tokio::test]
async fn test_create_and_fetch_by_either_identifier() {
    let w = ward().await;

    let resp = w
        .app
        .post(
            "/api/medical-records",
            Some(&w.physician),
            json!({
                "patient_id": w.patient_id,
                "chief_complaint": "Chest pain",
                "diagnosis": "Angina",
            }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);

    let id = resp.data()["id"].as_i64().expect("storage id");
    let record_id = resp.data()["record_id"]
        .as_str()
        .expect("external id")
        .to_string();
    assert!(record_id.starts_with("MR-"));
    assert!(resp.data()["deleted_at"].is_null());

    let by_id = w
        .app
        .get(&format!("/api/medical-records/{id}"), Some(&w.physician))
        .await;
    let by_ref = w
        .app
        .get(&format!("/api/medical-records/{record_id}"), Some(&w.physician))
        .await;

    assert_eq!(by_id.status, StatusCode::OK);
    assert_eq!(by_ref.status, StatusCode::OK);
    assert_eq!(by_id.data()["id"], by_ref.data()["id"]);
    assert_eq!(by_ref.data()["diagnosis"], "Angina");
}

#[tokio::test]
async fn test_full_lifecycle_history() {
    let w = ward().await;

    let created = w
        .app
        .post(
            "/api/medical-records",
            Some(&w.physician),
            json!({ "record_id": "MR-LIFE-1", "patient_id": w.patient_id, "diagnosis": "Flu" }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["record_id"], "MR-LIFE-1");

    let updated = w
        .app
        .put(
            "/api/medical-records/MR-LIFE-1",
            Some(&w.physician),
            json!({ "diagnosis": "Influenza A" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["diagnosis"], "Influenza A");

    let deleted = w
        .app
        .delete(
            "/api/medical-records/MR-LIFE-1?reason=entered%20in%20error",
            Some(&w.physician),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(!deleted.data()["deleted_at"].is_null());

    let gone = w
        .app
        .get("/api/medical-records/MR-LIFE-1", Some(&w.physician))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.error_code(), "NOT_FOUND");

    let history = w
        .app
        .get("/api/medical-records/MR-LIFE-1/history", Some(&w.physician))
        .await;
    assert_eq!(history.status, StatusCode::OK);

    let entries = history.data().as_array().cloned().unwrap_or_default();
    let actions: Vec<&str> = entries
        .iter()
        .filter_map(|e| e["action"].as_str())
        .collect();
    assert_eq!(actions, vec!["delete", "update", "create"]);

    assert_eq!(entries[0]["reason"], "entered in error");
    assert_eq!(entries[0]["actor"], "DR.GREY");
    assert!(entries[2]["before"].is_null());

    let update_changes = entries[1]["changes"].as_array().cloned().unwrap_or_default();
    let diagnosis = update_changes
        .iter()
        .find(|c| c["field"] == "diagnosis")
        .expect("diagnosis change");
    assert_eq!(diagnosis["old_value"], "Flu");
    assert_eq!(diagnosis["new_value"], "Influenza A");
}

#[tokio::test]
async fn test_patient_listing_hides_deleted_by_default() {
    let w = ward().await;

    for diagnosis in ["Sprain", "Fracture"] {
        let resp = w
            .app
            .post(
                "/api/medical-records",
                Some(&w.physician),
                json!({ "patient_id": w.patient_id, "diagnosis": diagnosis }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
    }

    let listing = format!("/api/patients/{}/medical-records", w.patient_id);
    let all = w.app.get(&listing, Some(&w.physician)).await;
    assert_eq!(all.data()["total_items"], 2);

    let first_id = all.data()["items"][0]["id"].as_i64().expect("id");
    let resp = w
        .app
        .delete(&format!("/api/medical-records/{first_id}"), Some(&w.physician))
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let active = w.app.get(&listing, Some(&w.physician)).await;
    assert_eq!(active.data()["total_items"], 1);

    let everything = w
        .app
        .get(&format!("{listing}?include_deleted=true"), Some(&w.physician))
        .await;
    assert_eq!(everything.data()["total_items"], 2);
}

#[tokio::test]
async fn test_monitoring_record_validation() {
    let w = ward().await;

    let resp = w
        .app
        .post(
            "/api/monitoring-records",
            Some(&w.physician),
            json!({ "patient_id": w.patient_id, "heart_rate": 72, "pain_score": 14 }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code(), "VALIDATION_ERROR");
    assert!(resp.body["details"].get("pain_score").is_some());

    let resp = w
        .app
        .post(
            "/api/monitoring-records",
            Some(&w.physician),
            json!({ "patient_id": w.patient_id, "heart_rate": 72, "pain_score": 3 }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert!(
        resp.data()["record_id"]
            .as_str()
            .is_some_and(|id| id.starts_with("MON-"))
    );
}

#[tokio::test]
async fn test_unknown_patient_and_duplicate_id() {
    let w = ward().await;

    let resp = w
        .app
        .post(
            "/api/medical-records",
            Some(&w.physician),
            json!({ "patient_id": 9999, "diagnosis": "Nothing" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let body = json!({ "record_id": "MR-DUP", "patient_id": w.patient_id });
    let first = w
        .app
        .post("/api/medical-records", Some(&w.physician), body.clone())
        .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = w
        .app
        .post("/api/medical-records", Some(&w.physician), body)
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.error_code(), "CONFLICT");
}

#[tokio::test]
async fn test_records_require_clinical_role() {
    let w = ward().await;
    w.app.seed_account("front.desk", AccountRole::Staff).await;
    let staff = w.app.login("front.desk").await;

    let resp = w
        .app
        .post(
            "/api/medical-records",
            Some(&staff),
            json!({ "patient_id": w.patient_id, "diagnosis": "Self-diagnosed" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.error_code(), "FORBIDDEN");

    // Staff may still use the patient registry.
    let resp = w.app.get("/api/patients?search=lovelace", Some(&staff)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["total_items"], 1);

    let resp = w.app.get("/api/medical-records/1", None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

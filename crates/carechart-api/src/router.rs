//! Route definitions for the CareChart HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use axum::Router;
use axum::routing::{get, post, put};

use carechart_entity::record::{MedicalRecord, MonitoringRecord};

use crate::handlers::{self, records};
use crate::state::AppState;

/// Build the API router. Middleware is applied by [`crate::app::build_app`].
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(admin_routes())
        .merge(patient_routes())
        .merge(record_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Auth endpoints: login, logout, me, password
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/password", put(handlers::auth::change_password))
        .route(
            "/auth/password/validate",
            post(handlers::auth::validate_password),
        )
}

/// Admin-only endpoints
fn admin_routes() -> Router<AppState> {
    use handlers::admin::{accounts, audit};

    Router::new()
        .route(
            "/admin/accounts",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route(
            "/admin/accounts/{id}",
            get(accounts::get_account).put(accounts::update_account),
        )
        .route("/admin/accounts/{id}/unlock", post(accounts::unlock_account))
        .route(
            "/admin/accounts/{id}/reset-password",
            post(accounts::reset_password),
        )
        .route(
            "/admin/accounts/{id}/deactivate",
            post(accounts::deactivate_account),
        )
        .route(
            "/admin/accounts/{id}/activate",
            post(accounts::activate_account),
        )
        .route("/admin/audit", get(audit::search_audit))
}

/// Patient registry
fn patient_routes() -> Router<AppState> {
    use handlers::patients;

    Router::new()
        .route(
            "/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route("/patients/{id}", get(patients::get_patient))
        .route(
            "/patients/{id}/medical-records",
            get(records::list_patient_records::<MedicalRecord>),
        )
        .route(
            "/patients/{id}/monitoring-records",
            get(records::list_patient_records::<MonitoringRecord>),
        )
}

/// Both clinical record kinds, identified by storage id or external id
fn record_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/medical-records",
            post(records::create_record::<MedicalRecord>),
        )
        .route(
            "/medical-records/{reference}",
            get(records::get_record::<MedicalRecord>)
                .put(records::update_record::<MedicalRecord>)
                .delete(records::delete_record::<MedicalRecord>),
        )
        .route(
            "/medical-records/{reference}/history",
            get(records::record_history::<MedicalRecord>),
        )
        .route(
            "/monitoring-records",
            post(records::create_record::<MonitoringRecord>),
        )
        .route(
            "/monitoring-records/{reference}",
            get(records::get_record::<MonitoringRecord>)
                .put(records::update_record::<MonitoringRecord>)
                .delete(records::delete_record::<MonitoringRecord>),
        )
        .route(
            "/monitoring-records/{reference}/history",
            get(records::record_history::<MonitoringRecord>),
        )
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

pub mod admin;
pub mod auth;
pub mod handlers;
pub mod matches;
pub mod pledges;
pub mod records;
pub mod requests;
pub mod types;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

pub use handlers::AppState;

/// Build the full API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Auth endpoints
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/user", get(handlers::current_user))
        .route("/api/auth/role", patch(handlers::update_role))
        // Organ requests
        .route(
            "/api/organ-requests",
            post(requests::create_request).get(requests::list_requests),
        )
        .route(
            "/api/organ-requests/:id/status",
            patch(requests::update_request_status),
        )
        // Organ pledges
        .route(
            "/api/organ-pledges",
            post(pledges::create_pledge).get(pledges::list_pledges),
        )
        .route(
            "/api/organ-pledges/:id/availability",
            patch(pledges::update_pledge_availability),
        )
        // Organ matches
        .route(
            "/api/organ-matches",
            post(matches::create_match).get(matches::list_matches),
        )
        .route(
            "/api/organ-matches/:id/status",
            patch(matches::update_match_status),
        )
        // Medical records
        .route("/api/medical-records", post(records::create_record))
        .route(
            "/api/medical-records/:id",
            get(records::list_records_for_user),
        )
        // Admin
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/:id", get(admin::list_users_by_role))
        .route("/api/admin/users/:id/status", patch(admin::update_user_status))
        .route("/api/admin/stats", get(admin::stats))
        .with_state(state)
}

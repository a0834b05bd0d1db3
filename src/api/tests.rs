//! HTTP-level tests driving the full router against a throwaway database.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::api::{self, AppState};
use crate::db;

async fn test_app() -> Router {
    let path = std::env::temp_dir().join(format!("organlink-test-{}.db", uuid::Uuid::new_v4()));
    let db = db::init_database(&path).await.expect("test database");
    api::router(Arc::new(AppState::new(db)))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Register an account and optionally select a role; returns the token.
async fn signup(app: &Router, email: &str, role: Option<&str>) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": email, "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = body["token"].as_str().unwrap().to_string();

    if let Some(role) = role {
        let (status, body) = send(
            app,
            "PATCH",
            "/api/auth/role",
            Some(&token),
            Some(json!({ "role": role })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], role);
    }
    token
}

async fn account_id(app: &Router, token: &str) -> String {
    let (status, body) = send(app, "GET", "/api/auth/user", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_and_login() {
    let app = test_app().await;

    let token = signup(&app, "alice@example.com", None).await;
    let (status, body) = send(&app, "GET", "/api/auth/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert!(body["role"].is_null());

    // Duplicate email
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": "alice@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Wrong password
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Fresh login token works
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let login_token = body["token"].as_str().unwrap();
    let (status, _) = send(&app, "GET", "/api/auth/user", Some(login_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unauthenticated_requests_rejected() {
    let app = test_app().await;

    let (status, _) = send(&app, "GET", "/api/organ-requests", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/organ-requests", Some("bogus-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_request_owner_forced_to_caller() {
    let app = test_app().await;
    let patient = signup(&app, "p1@example.com", Some("patient")).await;
    let patient_id = account_id(&app, &patient).await;

    // A spoofed patientId in the body must be ignored
    let (status, body) = send(
        &app,
        "POST",
        "/api/organ-requests",
        Some(&patient),
        Some(json!({
            "organType": "kidney",
            "priority": "high",
            "medicalReason": "End-stage renal failure requiring transplant",
            "patientId": "someone-else"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["patientId"], patient_id.as_str());
    assert_eq!(body["status"], "pending");
    assert_eq!(body["organType"], "kidney");
    assert_eq!(body["priority"], "high");
}

#[tokio::test]
async fn test_non_patient_cannot_create_request() {
    let app = test_app().await;
    let doctor = signup(&app, "doc@example.com", Some("doctor")).await;
    let donor = signup(&app, "don@example.com", Some("donor")).await;

    for token in [&doctor, &donor] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/organ-requests",
            Some(token),
            Some(json!({
                "organType": "kidney",
                "priority": "high",
                "medicalReason": "End-stage renal failure requiring transplant"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    // Nothing was created
    let (status, body) = send(&app, "GET", "/api/organ-requests", Some(&doctor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_request_status_transition_records_approver() {
    let app = test_app().await;
    let patient = signup(&app, "p1@example.com", Some("patient")).await;
    let doctor = signup(&app, "doc@example.com", Some("doctor")).await;
    let doctor_id = account_id(&app, &doctor).await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/organ-requests",
        Some(&patient),
        Some(json!({
            "organType": "kidney",
            "priority": "high",
            "medicalReason": "End-stage renal failure requiring transplant"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let request_id = created["id"].as_str().unwrap().to_string();
    let created_at = created["updatedAt"].as_i64().unwrap();

    // Patients cannot transition status
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/organ-requests/{}/status", request_id),
        Some(&patient),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Unknown request id
    let (status, _) = send(
        &app,
        "PATCH",
        "/api/organ-requests/no-such-id/status",
        Some(&doctor),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Out-of-enum status
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/organ-requests/{}/status", request_id),
        Some(&doctor),
        Some(json!({ "status": "open" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    tokio::time::sleep(Duration::from_millis(5)).await;

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/organ-requests/{}/status", request_id),
        Some(&doctor),
        Some(json!({ "status": "approved", "notes": "Cleared for surgery" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert_eq!(body["approvedBy"], doctor_id.as_str());
    assert_eq!(body["doctorNotes"], "Cleared for surgery");
    assert!(body["updatedAt"].as_i64().unwrap() > created_at);

    // Permissive transitions: any status may be written at any time
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/organ-requests/{}/status", request_id),
        Some(&doctor),
        Some(json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
}

#[tokio::test]
async fn test_donor_cannot_list_requests() {
    let app = test_app().await;
    let donor = signup(&app, "don@example.com", Some("donor")).await;
    let unset = signup(&app, "new@example.com", None).await;

    let (status, _) = send(&app, "GET", "/api/organ-requests", Some(&donor), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/api/organ-requests", Some(&unset), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_pledge_visibility() {
    let app = test_app().await;
    let donor = signup(&app, "don@example.com", Some("donor")).await;
    let doctor = signup(&app, "doc@example.com", Some("doctor")).await;
    let donor_id = account_id(&app, &donor).await;

    let (status, first) = send(
        &app,
        "POST",
        "/api/organ-pledges",
        Some(&donor),
        Some(json!({ "organType": "kidney", "donationType": "living" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["donorId"], donor_id.as_str());
    assert_eq!(first["isAvailable"], true);

    let (status, second) = send(
        &app,
        "POST",
        "/api/organ-pledges",
        Some(&donor),
        Some(json!({ "organType": "cornea", "donationType": "posthumous" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Doctor consumes the first pledge
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/organ-pledges/{}/availability", first["id"].as_str().unwrap()),
        Some(&doctor),
        Some(json!({ "isAvailable": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isAvailable"], false);

    // Doctors never see unavailable pledges
    let (status, body) = send(&app, "GET", "/api/organ-pledges", Some(&doctor), None).await;
    assert_eq!(status, StatusCode::OK);
    let visible = body.as_array().unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0]["id"], second["id"]);
    assert_eq!(visible[0]["organType"], "cornea");
    assert_eq!(visible[0]["donationType"], "posthumous");

    // The owning donor still sees both
    let (status, body) = send(&app, "GET", "/api/organ-pledges", Some(&donor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Donors cannot flip availability
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/organ-pledges/{}/availability", first["id"].as_str().unwrap()),
        Some(&donor),
        Some(json!({ "isAvailable": true })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_match_ordering_and_gating() {
    let app = test_app().await;
    let patient = signup(&app, "p1@example.com", Some("patient")).await;
    let donor = signup(&app, "don@example.com", Some("donor")).await;
    let doctor = signup(&app, "doc@example.com", Some("doctor")).await;
    let admin = signup(&app, "root@example.com", Some("admin")).await;
    let doctor_id = account_id(&app, &doctor).await;
    let admin_id = account_id(&app, &admin).await;

    let (_, request) = send(
        &app,
        "POST",
        "/api/organ-requests",
        Some(&patient),
        Some(json!({
            "organType": "kidney",
            "priority": "critical",
            "medicalReason": "End-stage renal failure requiring transplant"
        })),
    )
    .await;
    let (_, pledge) = send(
        &app,
        "POST",
        "/api/organ-pledges",
        Some(&donor),
        Some(json!({ "organType": "kidney", "donationType": "living" })),
    )
    .await;
    let request_id = request["id"].as_str().unwrap();
    let pledge_id = pledge["id"].as_str().unwrap();

    // Donors cannot create or view matches
    let (status, _) = send(
        &app,
        "POST",
        "/api/organ-matches",
        Some(&donor),
        Some(json!({ "requestId": request_id, "pledgeId": pledge_id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "GET", "/api/organ-matches", Some(&donor), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut match_ids = Vec::new();
    for score in [40, 95, 72] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/organ-matches",
            Some(&doctor),
            Some(json!({
                "requestId": request_id,
                "pledgeId": pledge_id,
                "compatibilityScore": score
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "pending");
        assert_eq!(body["doctorId"], doctor_id.as_str());
        match_ids.push(body["id"].as_str().unwrap().to_string());
    }

    // Pending matches, best score first
    let (status, body) = send(&app, "GET", "/api/organ-matches", Some(&doctor), None).await;
    assert_eq!(status, StatusCode::OK);
    let scores: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["compatibilityScore"].as_i64().unwrap())
        .collect();
    assert_eq!(scores, vec![95, 72, 40]);

    // Match status transition is admin-only
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/organ-matches/{}/status", match_ids[1]),
        Some(&doctor),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/organ-matches/{}/status", match_ids[1]),
        Some(&admin),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert_eq!(body["approvedBy"], admin_id.as_str());

    // The approved match leaves the pending list
    let (_, body) = send(&app, "GET", "/api/organ-matches", Some(&doctor), None).await;
    let scores: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["compatibilityScore"].as_i64().unwrap())
        .collect();
    assert_eq!(scores, vec![40]);
}

#[tokio::test]
async fn test_role_selection_overwrites() {
    let app = test_app().await;
    let token = signup(&app, "newcomer@example.com", None).await;

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/auth/role",
        Some(&token),
        Some(json!({ "role": "superuser" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/auth/role",
        Some(&token),
        Some(json!({ "role": "donor" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "donor");

    // Second selection silently overwrites
    let (status, body) = send(
        &app,
        "PATCH",
        "/api/auth/role",
        Some(&token),
        Some(json!({ "role": "patient" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "patient");

    let (_, body) = send(&app, "GET", "/api/auth/user", Some(&token), None).await;
    assert_eq!(body["role"], "patient");
}

#[tokio::test]
async fn test_admin_users_and_stats() {
    let app = test_app().await;
    let patient = signup(&app, "p1@example.com", Some("patient")).await;
    let donor = signup(&app, "don@example.com", Some("donor")).await;
    let admin = signup(&app, "root@example.com", Some("admin")).await;
    let donor_id = account_id(&app, &donor).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/organ-requests",
        Some(&patient),
        Some(json!({
            "organType": "liver",
            "priority": "medium",
            "medicalReason": "Chronic liver failure awaiting transplant"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Stats are admin-only
    let (status, _) = send(&app, "GET", "/api/admin/stats", Some(&donor), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/api/admin/stats", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalUsers"], 3);
    assert_eq!(body["activeDonors"], 1);
    assert_eq!(body["pendingRequests"], 1);
    assert_eq!(body["successfulMatches"], 0);

    // User listing is sanitized
    let (status, body) = send(&app, "GET", "/api/admin/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 3);
    for u in users {
        assert!(u.get("passwordHash").is_none());
        assert!(u.get("password_hash").is_none());
    }

    let (status, body) = send(&app, "GET", "/api/admin/users/donor", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let donors = body.as_array().unwrap();
    assert_eq!(donors.len(), 1);
    assert_eq!(donors[0]["id"], donor_id.as_str());

    let (status, _) = send(&app, "GET", "/api/admin/users/wizard", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/admin/users", Some(&donor), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Deactivate the donor; their credentials stop working
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/admin/users/{}/status", donor_id),
        Some(&admin),
        Some(json!({ "isActive": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isActive"], false);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "don@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_medical_records_access() {
    let app = test_app().await;
    let patient = signup(&app, "p1@example.com", Some("patient")).await;
    let donor = signup(&app, "don@example.com", Some("donor")).await;
    let doctor = signup(&app, "doc@example.com", Some("doctor")).await;
    let patient_id = account_id(&app, &patient).await;
    let doctor_id = account_id(&app, &doctor).await;

    // Patients cannot create records
    let (status, _) = send(
        &app,
        "POST",
        "/api/medical-records",
        Some(&patient),
        Some(json!({ "userId": patient_id, "recordType": "checkup", "description": "Routine" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        "/api/medical-records",
        Some(&doctor),
        Some(json!({
            "userId": patient_id,
            "recordType": "evaluation",
            "description": "Pre-transplant evaluation",
            "results": "Eligible",
            "attachments": ["scan-001.pdf", "labs-002.pdf"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["doctorId"], doctor_id.as_str());
    assert_eq!(body["userId"], patient_id.as_str());

    // The subject reads their own records
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/medical-records/{}", patient_id),
        Some(&patient),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["attachments"], json!(["scan-001.pdf", "labs-002.pdf"]));

    // A donor cannot read someone else's records
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/medical-records/{}", patient_id),
        Some(&donor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Doctors can read anyone's
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/medical-records/{}", patient_id),
        Some(&doctor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_validation_errors() {
    let app = test_app().await;
    let patient = signup(&app, "p1@example.com", Some("patient")).await;
    let doctor = signup(&app, "doc@example.com", Some("doctor")).await;

    // Out-of-enum organ type
    let (status, _) = send(
        &app,
        "POST",
        "/api/organ-requests",
        Some(&patient),
        Some(json!({
            "organType": "bone",
            "priority": "high",
            "medicalReason": "End-stage renal failure requiring transplant"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Medical reason too short
    let (status, _) = send(
        &app,
        "POST",
        "/api/organ-requests",
        Some(&patient),
        Some(json!({ "organType": "kidney", "priority": "high", "medicalReason": "sick" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Missing priority
    let (status, _) = send(
        &app,
        "POST",
        "/api/organ-requests",
        Some(&patient),
        Some(json!({
            "organType": "kidney",
            "medicalReason": "End-stage renal failure requiring transplant"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Match without a pledge id
    let (status, _) = send(
        &app,
        "POST",
        "/api/organ-matches",
        Some(&doctor),
        Some(json!({ "requestId": "r1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Score outside 0..=100
    let (status, _) = send(
        &app,
        "POST",
        "/api/organ-matches",
        Some(&doctor),
        Some(json!({ "requestId": "r1", "pledgeId": "g1", "compatibilityScore": 150 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing was persisted
    let (status, body) = send(&app, "GET", "/api/organ-requests", Some(&doctor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

/// End-to-end tests for the REST surface, driven through the router without
/// binding a socket.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use hostel_api::{AdminRegistry, AppStateInner, router};
use hostel_db::Database;
use hostel_types::api::{AdminClaims, REVISION_HEADER};

const SECRET: &str = "test-secret";

fn app(require_admin_auth: bool) -> Router {
    let state = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        admins: AdminRegistry::from_config(None).unwrap(),
        jwt_secret: SECRET.to_string(),
        require_admin_auth,
    });
    router(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, value)
}

fn asha() -> Value {
    json!({
        "studentName": "Asha",
        "roomNumber": "A-101",
        "category": "Maintenance",
        "description": "Leaking tap",
        "priority": "Urgent"
    })
}

async fn admin_token(app: &Router) -> String {
    let (status, _, body) = send(
        app,
        Method::POST,
        "/api/admin/login",
        Some(json!({ "adminId": "admin001", "password": "Admin@123" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn list(app: &Router) -> Vec<Value> {
    let (status, _, body) = send(app, Method::GET, "/api/complaints", None, None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().unwrap().clone()
}

#[tokio::test]
async fn create_then_resolve_scenario() {
    let app = app(true);
    let token = admin_token(&app).await;

    let (status, _, created) = send(&app, Method::POST, "/api/complaints", Some(asha()), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "Pending");
    assert_eq!(created["adminNotes"], "");
    assert!(created["createdAt"].is_string());
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/complaints/{}", id),
        Some(json!({ "status": "Resolved", "adminNotes": "Plumber dispatched" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "Resolved");
    assert_eq!(updated["adminNotes"], "Plumber dispatched");
    assert_eq!(updated["studentName"], "Asha");
    assert_eq!(updated["description"], "Leaking tap");
    assert_eq!(updated["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn create_accepts_legacy_complaint_text() {
    let app = app(true);
    let mut body = asha();
    let obj = body.as_object_mut().unwrap();
    obj.remove("description");
    obj.insert("complaintText".into(), json!("Fan broken"));

    let (status, _, created) = send(&app, Method::POST, "/api/complaints", Some(body), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["description"], "Fan broken");
}

#[tokio::test]
async fn create_missing_field_persists_nothing() {
    let app = app(true);
    for field in ["studentName", "roomNumber", "category", "description", "priority"] {
        let mut body = asha();
        body.as_object_mut().unwrap().remove(field);

        let (status, _, error) = send(&app, Method::POST, "/api/complaints", Some(body), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "missing {}", field);
        assert!(error["message"].as_str().unwrap().contains(field));
    }

    let mut blank = asha();
    blank["roomNumber"] = json!("   ");
    let (status, _, _) = send(&app, Method::POST, "/api/complaints", Some(blank), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn ids_are_unique_and_list_counts_creates_minus_deletes() {
    let app = app(true);
    let token = admin_token(&app).await;

    let mut ids = Vec::new();
    for _ in 0..5 {
        let (_, _, created) = send(&app, Method::POST, "/api/complaints", Some(asha()), None).await;
        ids.push(created["id"].as_str().unwrap().to_string());
    }
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 5);

    for id in &ids[..2] {
        let (status, _, body) = send(
            &app,
            Method::DELETE,
            &format!("/api/complaints/{}", id),
            None,
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Complaint deleted successfully");
    }

    let remaining: Vec<String> = list(&app)
        .await
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(remaining, ids[2..].to_vec());
}

#[tokio::test]
async fn partial_update_touches_only_given_fields() {
    let app = app(true);
    let token = admin_token(&app).await;
    let (_, _, created) = send(&app, Method::POST, "/api/complaints", Some(asha()), None).await;
    let uri = format!("/api/complaints/{}", created["id"].as_str().unwrap());

    let (_, _, notes_only) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "adminNotes": "Seen", "updatedAt": "2020-01-01T00:00:00Z" })),
        Some(&token),
    )
    .await;
    assert_eq!(notes_only["status"], "Pending");
    assert_eq!(notes_only["adminNotes"], "Seen");

    let (_, _, status_only) =
        send(&app, Method::PUT, &uri, Some(json!({ "status": "In Progress" })), Some(&token)).await;
    assert_eq!(status_only["status"], "In Progress");
    assert_eq!(status_only["adminNotes"], "Seen");

    for field in ["studentName", "roomNumber", "category", "description", "priority", "createdAt"] {
        assert_eq!(status_only[field], created[field], "{} changed", field);
    }

    let (status, _, _) = send(&app, Method::PUT, &uri, Some(json!({ "status": " " })), Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_id_is_not_found_and_store_unchanged() {
    let app = app(true);
    let token = admin_token(&app).await;
    send(&app, Method::POST, "/api/complaints", Some(asha()), None).await;
    let before = list(&app).await;

    let (status, _, body) = send(
        &app,
        Method::PUT,
        "/api/complaints/missing",
        Some(json!({ "status": "Resolved" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Complaint not found");

    let (status, _, _) = send(&app, Method::DELETE, "/api/complaints/missing", None, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, Method::GET, "/api/complaints/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(list(&app).await, before);
}

#[tokio::test]
async fn admin_login_default_credentials() {
    let app = app(true);

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/admin/login",
        Some(json!({ "adminId": "admin001", "password": "Admin@123" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["adminId"], "admin001");
    assert!(!body["token"].as_str().unwrap().is_empty());

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/admin/login",
        Some(json!({ "adminId": "admin001", "password": "wrong" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid Admin ID or Password");
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn mutations_require_admin_token() {
    let app = app(true);
    let (_, _, created) = send(&app, Method::POST, "/api/complaints", Some(asha()), None).await;
    let uri = format!("/api/complaints/{}", created["id"].as_str().unwrap());

    let (status, _, _) = send(&app, Method::PUT, &uri, Some(json!({ "status": "Resolved" })), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&app, Method::DELETE, &uri, None, Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Reads stay public
    let (status, _, fetched) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "Pending");
}

fn signed_token(role: &str, exp: i64) -> String {
    let claims = AdminClaims {
        sub: "admin001".to_string(),
        role: role.to_string(),
        exp: exp as usize,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn expired_or_non_admin_tokens_are_refused() {
    let app = app(true);
    let (_, _, created) = send(&app, Method::POST, "/api/complaints", Some(asha()), None).await;
    let uri = format!("/api/complaints/{}", created["id"].as_str().unwrap());
    let now = chrono::Utc::now().timestamp();

    let expired = signed_token("admin", now - 3600);
    let (status, _, body) =
        send(&app, Method::PUT, &uri, Some(json!({ "status": "Resolved" })), Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Admin authentication required");

    let student = signed_token("student", now + 3600);
    let (status, _, _) = send(&app, Method::DELETE, &uri, None, Some(&student)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A fresh admin token with the same secret is accepted
    let valid = signed_token("admin", now + 3600);
    let (status, _, updated) =
        send(&app, Method::PUT, &uri, Some(json!({ "status": "Resolved" })), Some(&valid)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "Resolved");
    assert_eq!(list(&app).await.len(), 1);
}

#[tokio::test]
async fn legacy_mode_leaves_mutations_open() {
    let app = app(false);
    let (_, _, created) = send(&app, Method::POST, "/api/complaints", Some(asha()), None).await;
    let uri = format!("/api/complaints/{}", created["id"].as_str().unwrap());

    let (status, _, updated) =
        send(&app, Method::PUT, &uri, Some(json!({ "status": "Resolved" })), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "Resolved");

    let (status, _, _) = send(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn revision_tracks_mutations() {
    let app = app(false);

    let (_, _, body) = send(&app, Method::GET, "/api/complaints/revision", None, None).await;
    assert_eq!(body["revision"], 0);

    let (_, _, created) = send(&app, Method::POST, "/api/complaints", Some(asha()), None).await;
    let uri = format!("/api/complaints/{}", created["id"].as_str().unwrap());
    send(&app, Method::PUT, &uri, Some(json!({ "status": "Resolved" })), None).await;
    send(&app, Method::PUT, "/api/complaints/missing", Some(json!({ "status": "x" })), None).await;

    let (_, headers, _) = send(&app, Method::GET, "/api/complaints", None, None).await;
    assert_eq!(headers.get(REVISION_HEADER).unwrap(), "2");

    let (_, _, body) = send(&app, Method::GET, "/api/complaints/revision", None, None).await;
    assert_eq!(body["revision"], 2);
}

#[tokio::test]
async fn health_is_public() {
    let app = app(true);
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}

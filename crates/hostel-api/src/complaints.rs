use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use hostel_db::Database;
use hostel_db::models::{ComplaintPatch, ComplaintRow, NewComplaint};
use hostel_types::api::{
    CreateComplaintRequest, MessageResponse, REVISION_HEADER, RevisionResponse, UpdateComplaintRequest,
};
use hostel_types::models::Complaint;

use crate::auth::AppState;
use crate::error::ApiError;

/// Run a blocking store call off the async runtime.
async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    let result = tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;
    Ok(result)
}

/// POST /api/complaints
pub async fn create_complaint(
    State(state): State<AppState>,
    Json(req): Json<CreateComplaintRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new = validate_new_complaint(req)?;
    let row = with_db(&state, move |db| db.insert_complaint(&new)).await?;

    info!("Complaint {} filed by {} (room {})", row.id, row.student_name, row.room_number);
    Ok((StatusCode::CREATED, Json(to_complaint(row))))
}

/// GET /api/complaints
///
/// The whole collection, unfiltered, in insertion order.
pub async fn list_complaints(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let (revision, rows) = with_db(&state, |db| db.snapshot()).await?;
    let complaints: Vec<Complaint> = rows.into_iter().map(to_complaint).collect();

    Ok(([(REVISION_HEADER, revision.to_string())], Json(complaints)))
}

/// GET /api/complaints/revision
pub async fn get_revision(State(state): State<AppState>) -> Result<Json<RevisionResponse>, ApiError> {
    let revision = with_db(&state, |db| db.revision()).await?;
    Ok(Json(RevisionResponse { revision }))
}

/// GET /api/complaints/{id}
pub async fn get_complaint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Complaint>, ApiError> {
    let row = with_db(&state, move |db| db.get_complaint(&id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(to_complaint(row)))
}

/// PUT /api/complaints/{id}
///
/// Applies only the fields present in the body.
pub async fn update_complaint(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateComplaintRequest>,
) -> Result<Json<Complaint>, ApiError> {
    if req.status.as_deref().is_some_and(|s| s.trim().is_empty()) {
        return Err(ApiError::Validation("status must not be empty".to_string()));
    }

    let patch = ComplaintPatch {
        status: req.status,
        admin_notes: req.admin_notes,
    };
    let row = with_db(&state, move |db| db.update_complaint(&id, &patch))
        .await?
        .ok_or(ApiError::NotFound)?;

    info!("Complaint {} updated, status now '{}'", row.id, row.status);
    Ok(Json(to_complaint(row)))
}

/// DELETE /api/complaints/{id}
pub async fn delete_complaint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let target = id.clone();
    let removed = with_db(&state, move |db| db.delete_complaint(&target)).await?;
    if !removed {
        return Err(ApiError::NotFound);
    }

    info!("Complaint {} deleted", id);
    Ok(Json(MessageResponse::new("Complaint deleted successfully")))
}

/// Check that every required field is present and not blank, reporting all
/// missing fields at once.
pub fn validate_new_complaint(req: CreateComplaintRequest) -> Result<NewComplaint, ApiError> {
    let fields = [
        ("studentName", req.student_name),
        ("roomNumber", req.room_number),
        ("category", req.category),
        ("description", req.description),
        ("priority", req.priority),
    ];

    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if !missing.is_empty() {
        warn!("Rejected complaint missing {}", missing.join(", "));
        return Err(ApiError::Validation(format!(
            "Complaint validation failed: {} required",
            missing.join(", ")
        )));
    }

    let [student_name, room_number, category, description, priority] =
        fields.map(|(_, value)| value.unwrap_or_default());

    Ok(NewComplaint {
        student_name,
        room_number,
        category,
        description,
        priority,
    })
}

fn to_complaint(row: ComplaintRow) -> Complaint {
    let created_at = parse_timestamp(&row.id, "created_at", &row.created_at);
    let updated_at = parse_timestamp(&row.id, "updated_at", &row.updated_at);

    Complaint {
        id: row.id,
        student_name: row.student_name,
        room_number: row.room_number,
        category: row.category,
        description: row.description,
        priority: row.priority,
        status: row.status,
        admin_notes: row.admin_notes,
        created_at,
        updated_at,
    }
}

fn parse_timestamp(id: &str, column: &str, raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            warn!("Corrupt {} '{}' on complaint '{}': {}", column, raw, id, e);
            None
        }
    }
}

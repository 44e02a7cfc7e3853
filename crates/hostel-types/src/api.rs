use serde::{Deserialize, Serialize};

/// Response header carrying the store revision alongside a complaint listing.
pub const REVISION_HEADER: &str = "x-complaints-revision";

// -- Complaints --

/// Body of `POST /api/complaints`.
///
/// Fields are optional at the wire level so that validation can report every
/// missing field at once instead of failing on the first one.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintRequest {
    pub student_name: Option<String>,
    pub room_number: Option<String>,
    pub category: Option<String>,
    #[serde(alias = "complaintText")]
    pub description: Option<String>,
    pub priority: Option<String>,
}

/// Body of `PUT /api/complaints/{id}`. Absent fields are left untouched.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComplaintRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionResponse {
    pub revision: u64,
}

// -- Admin auth --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginRequest {
    pub admin_id: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    pub message: String,
    pub admin_id: String,
    pub token: String,
}

/// JWT claims issued to administrators on login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

// -- Generic --

/// Plain `{"message": ...}` body used for confirmations and errors alike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

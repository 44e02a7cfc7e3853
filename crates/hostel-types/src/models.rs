use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status assigned to every complaint on creation.
pub const DEFAULT_STATUS: &str = "Pending";

/// A complaint record as it travels over the wire.
///
/// Every text field defaults to empty on input so that records written by
/// older schema variants still deserialize; consumers decide how to display
/// the gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub room_number: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, alias = "complaintText")]
    pub description: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub admin_notes: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

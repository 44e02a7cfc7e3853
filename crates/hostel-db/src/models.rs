/// Database row types. These map directly to SQLite rows and stay
/// independent of the wire types in hostel-types.

pub struct ComplaintRow {
    pub id: String,
    pub student_name: String,
    pub room_number: String,
    pub category: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub admin_notes: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields supplied by a student when filing a complaint.
pub struct NewComplaint {
    pub student_name: String,
    pub room_number: String,
    pub category: String,
    pub description: String,
    pub priority: String,
}

/// Partial update applied by an administrator. `None` leaves a column as is.
#[derive(Default)]
pub struct ComplaintPatch {
    pub status: Option<String>,
    pub admin_notes: Option<String>,
}

impl ComplaintPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.admin_notes.is_none()
    }
}

use chrono::{DateTime, Utc};

use hostel_types::models::{Complaint, DEFAULT_STATUS};

pub const UNKNOWN_STUDENT: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";
pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_PRIORITY: &str = "Normal";
pub const NO_DESCRIPTION: &str = "No description";

const SHORT_ID_LEN: usize = 8;
const SHORT_DESCRIPTION_LEN: usize = 30;

fn or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

/// First `max` characters, with an ellipsis when anything was cut.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// CSS-style badge class: lowercase with spaces turned into dashes.
pub fn badge_class(label: &str) -> String {
    label.to_lowercase().replace(' ', "-")
}

pub fn format_date(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_date_time(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%b %-d, %Y, %I:%M %p").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// A complaint with every display default filled in. Missing fields are
/// presentation gaps, never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintView {
    pub id: String,
    pub short_id: String,
    pub student_name: String,
    pub room_number: String,
    pub category: String,
    pub description: String,
    pub short_description: String,
    pub priority: String,
    pub priority_class: String,
    pub status: String,
    pub status_class: String,
    pub admin_notes: Option<String>,
    pub submitted: String,
    pub submitted_at: String,
    pub updated: String,
}

impl ComplaintView {
    /// `position` is the zero-based place in the listing, used to label
    /// records that arrive without an id.
    pub fn new(complaint: &Complaint, position: usize) -> Self {
        let id = if complaint.id.is_empty() {
            format!("#{}", position + 1)
        } else {
            complaint.id.clone()
        };
        let short_id = format!("{}...", id.chars().take(SHORT_ID_LEN).collect::<String>());

        let description = or(&complaint.description, NO_DESCRIPTION).to_string();
        let priority = or(&complaint.priority, DEFAULT_PRIORITY).to_string();
        let status = or(&complaint.status, DEFAULT_STATUS).to_string();

        Self {
            short_id,
            id,
            student_name: or(&complaint.student_name, UNKNOWN_STUDENT).to_string(),
            room_number: or(&complaint.room_number, NOT_AVAILABLE).to_string(),
            category: or(&complaint.category, DEFAULT_CATEGORY).to_string(),
            short_description: truncate(&description, SHORT_DESCRIPTION_LEN),
            description,
            priority_class: badge_class(&priority),
            priority,
            status_class: badge_class(&status),
            status,
            admin_notes: (!complaint.admin_notes.is_empty()).then(|| complaint.admin_notes.clone()),
            submitted: format_date(complaint.created_at),
            submitted_at: format_date_time(complaint.created_at),
            updated: format_date(complaint.updated_at),
        }
    }
}

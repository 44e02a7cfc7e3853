use tracing::info;

use hostel_types::api::CreateComplaintRequest;
use hostel_types::models::Complaint;

use crate::api::{ComplaintClient, Listing};
use crate::display::ComplaintView;
use crate::error::ClientError;
use crate::refresh::{Refresh, RevisionGate, reload};
use crate::session::{SessionStore, StudentSession};

/// What a student fills in; identity comes from the session.
#[derive(Debug, Clone, Default)]
pub struct ComplaintForm {
    pub category: String,
    pub priority: String,
    pub description: String,
}

pub struct StudentPortal {
    client: ComplaintClient,
    sessions: SessionStore,
    student: StudentSession,
    complaints: Vec<Complaint>,
    gate: RevisionGate,
}

impl StudentPortal {
    /// Open the portal for the logged-in student.
    pub fn open(client: ComplaintClient, sessions: SessionStore) -> Result<Self, ClientError> {
        let student = sessions.student().ok_or(ClientError::NoSession)?;
        Ok(Self {
            client,
            sessions,
            student,
            complaints: Vec::new(),
            gate: RevisionGate::default(),
        })
    }

    pub fn student(&self) -> &StudentSession {
        &self.student
    }

    pub fn welcome(&self) -> String {
        format!("Welcome, {} | Room: {}", self.student.name, self.student.room_number)
    }

    pub fn logout(self) -> Result<(), ClientError> {
        self.sessions.end_student()?;
        Ok(())
    }

    pub async fn refresh(&mut self) -> Result<bool, ClientError> {
        reload(self).await
    }

    /// File a complaint under the session's name and room, then reload.
    pub async fn submit(&mut self, form: &ComplaintForm) -> Result<Complaint, ClientError> {
        if form.description.trim().is_empty() {
            return Err(ClientError::Invalid(
                "Please enter a complaint description".to_string(),
            ));
        }

        let req = CreateComplaintRequest {
            student_name: Some(self.student.name.clone()),
            room_number: Some(self.student.room_number.clone()),
            category: Some(form.category.clone()),
            description: Some(form.description.clone()),
            priority: Some(form.priority.clone()),
        };
        let created = self.client.create(&req).await?;
        info!("Submitted complaint {}", created.id);

        self.refresh().await?;
        Ok(created)
    }

    pub fn complaints(&self) -> &[Complaint] {
        &self.complaints
    }

    pub fn cards(&self) -> Vec<ComplaintView> {
        self.complaints
            .iter()
            .enumerate()
            .map(|(i, c)| ComplaintView::new(c, i))
            .collect()
    }
}

impl Refresh for StudentPortal {
    fn client(&self) -> &ComplaintClient {
        &self.client
    }

    fn known_revision(&self) -> Option<u64> {
        self.gate.newest()
    }

    fn reset_revision(&mut self) {
        self.gate.reset();
    }

    fn apply(&mut self, listing: Listing) -> bool {
        if !self.gate.admit(listing.revision) {
            return false;
        }
        self.complaints = listing.complaints;
        true
    }
}

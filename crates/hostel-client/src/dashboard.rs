use tracing::{info, warn};

use hostel_types::api::UpdateComplaintRequest;
use hostel_types::models::{Complaint, DEFAULT_STATUS};

use crate::api::{ComplaintClient, Listing};
use crate::display::ComplaintView;
use crate::error::ClientError;
use crate::refresh::{Refresh, RevisionGate, reload};
use crate::session::{AdminSession, SessionStore};

/// Client-side filter over the loaded snapshot. `None` or an empty string
/// matches anything.
#[derive(Debug, Clone, Default)]
pub struct ComplaintFilter {
    pub status: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

impl ComplaintFilter {
    pub fn matches(&self, complaint: &Complaint) -> bool {
        fn accepts(wanted: &Option<String>, actual: &str) -> bool {
            match wanted.as_deref() {
                None | Some("") => true,
                Some(wanted) => wanted == actual,
            }
        }

        accepts(&self.status, &complaint.status)
            && accepts(&self.category, &complaint.category)
            && accepts(&self.priority, &complaint.priority)
    }

    pub fn apply<'a>(&self, complaints: &'a [Complaint]) -> Vec<&'a Complaint> {
        complaints.iter().filter(|c| self.matches(c)).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub resolved: usize,
    pub urgent: usize,
}

impl DashboardStats {
    pub fn compute(complaints: &[Complaint]) -> Self {
        Self {
            total: complaints.len(),
            pending: count_where(complaints, |c| c.status == "Pending"),
            resolved: count_where(complaints, |c| c.status == "Resolved"),
            urgent: count_where(complaints, |c| c.priority == "Urgent"),
        }
    }
}

fn count_where(complaints: &[Complaint], pred: impl Fn(&Complaint) -> bool) -> usize {
    complaints.iter().filter(|c| pred(c)).count()
}

/// State of the status-update form for one complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdateForm {
    pub complaint_id: String,
    pub student_name: String,
    pub description: String,
    pub new_status: String,
    pub admin_notes: String,
}

pub struct AdminDashboard {
    client: ComplaintClient,
    sessions: SessionStore,
    admin: AdminSession,
    complaints: Vec<Complaint>,
    gate: RevisionGate,
    filter: ComplaintFilter,
}

impl AdminDashboard {
    /// Authenticate against the server and record the admin session locally.
    pub async fn login(
        client: ComplaintClient,
        sessions: SessionStore,
        admin_id: &str,
        password: &str,
    ) -> Result<Self, ClientError> {
        let resp = client.admin_login(admin_id, password).await?;
        let admin = sessions.start_admin(&resp.admin_id, &resp.token)?;
        info!("Admin {} logged in", admin.admin_id);
        Ok(Self::with_session(client, sessions, admin))
    }

    /// Reopen the dashboard from a stored admin session.
    pub fn resume(client: ComplaintClient, sessions: SessionStore) -> Result<Self, ClientError> {
        let admin = sessions.admin().ok_or(ClientError::NoSession)?;
        Ok(Self::with_session(client, sessions, admin))
    }

    fn with_session(client: ComplaintClient, sessions: SessionStore, admin: AdminSession) -> Self {
        let client = client.with_token(admin.token.clone());
        Self {
            client,
            sessions,
            admin,
            complaints: Vec::new(),
            gate: RevisionGate::default(),
            filter: ComplaintFilter::default(),
        }
    }

    /// End the stored admin session when the server refuses its token.
    fn end_session_if_unauthorized<T>(&self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(err) = &result {
            if err.is_unauthorized() {
                warn!("Admin {} rejected by server, ending session", self.admin.admin_id);
                self.sessions.end_admin()?;
            }
        }
        result
    }

    pub fn logout(self) -> Result<(), ClientError> {
        self.sessions.end_admin()?;
        Ok(())
    }

    pub fn admin_id(&self) -> &str {
        &self.admin.admin_id
    }

    pub fn complaints(&self) -> &[Complaint] {
        &self.complaints
    }

    pub async fn refresh(&mut self) -> Result<bool, ClientError> {
        reload(self).await
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::compute(&self.complaints)
    }

    pub fn filter(&self) -> &ComplaintFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: ComplaintFilter) {
        self.filter = filter;
    }

    pub fn reset_filters(&mut self) {
        self.filter = ComplaintFilter::default();
    }

    /// Table rows for the complaints passing the current filter.
    pub fn rows(&self) -> Vec<ComplaintView> {
        self.filter
            .apply(&self.complaints)
            .into_iter()
            .enumerate()
            .map(|(i, c)| ComplaintView::new(c, i))
            .collect()
    }

    fn find(&self, id: &str) -> Result<(usize, &Complaint), ClientError> {
        self.complaints
            .iter()
            .enumerate()
            .find(|(_, c)| c.id == id)
            .ok_or_else(|| ClientError::Invalid("Complaint not found".to_string()))
    }

    /// Read-only details of a complaint in the current snapshot.
    pub fn details(&self, id: &str) -> Result<ComplaintView, ClientError> {
        let (position, complaint) = self.find(id)?;
        Ok(ComplaintView::new(complaint, position))
    }

    /// A fresh status form: status preset to "Pending", notes empty.
    pub fn open_status_form(&self, id: &str) -> Result<StatusUpdateForm, ClientError> {
        let (position, complaint) = self.find(id)?;
        let view = ComplaintView::new(complaint, position);
        Ok(StatusUpdateForm {
            complaint_id: complaint.id.clone(),
            student_name: view.student_name,
            description: view.description,
            new_status: DEFAULT_STATUS.to_string(),
            admin_notes: String::new(),
        })
    }

    /// Send status and notes, then re-fetch the listing.
    pub async fn save_status_update(&mut self, form: &StatusUpdateForm) -> Result<Complaint, ClientError> {
        if form.complaint_id.is_empty() {
            return Err(ClientError::Invalid("Complaint ID not found".to_string()));
        }

        let req = UpdateComplaintRequest {
            status: Some(form.new_status.clone()),
            admin_notes: Some(form.admin_notes.clone()),
        };
        let updated = self
            .end_session_if_unauthorized(self.client.update_status(&form.complaint_id, &req).await)?;
        info!("Complaint {} set to '{}'", updated.id, updated.status);

        self.refresh().await?;
        Ok(updated)
    }

    pub async fn delete(&mut self, id: &str) -> Result<String, ClientError> {
        let message = self.end_session_if_unauthorized(self.client.delete(id).await)?;
        self.refresh().await?;
        Ok(message)
    }
}

impl Refresh for AdminDashboard {
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

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::storage::LocalStore;

const STUDENT_LOGGED_IN: &str = "studentLoggedIn";
const STUDENT_EMAIL: &str = "studentEmail";
const STUDENT_NAME: &str = "studentName";
const STUDENT_ROOM: &str = "studentRoomNumber";
const STUDENT_ROLL: &str = "studentRollNumber";
const STUDENT_LOGIN_TIME: &str = "studentLoginTime";

const STUDENT_KEYS: [&str; 6] = [
    STUDENT_LOGGED_IN,
    STUDENT_EMAIL,
    STUDENT_NAME,
    STUDENT_ROOM,
    STUDENT_ROLL,
    STUDENT_LOGIN_TIME,
];

const ADMIN_LOGGED_IN: &str = "adminLoggedIn";
const ADMIN_ID: &str = "adminId";
const ADMIN_TOKEN: &str = "adminToken";
const ADMIN_LOGIN_TIME: &str = "adminLoginTime";

const ADMIN_KEYS: [&str; 4] = [ADMIN_LOGGED_IN, ADMIN_ID, ADMIN_TOKEN, ADMIN_LOGIN_TIME];

/// Profile fields copied into the session on student login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentSession {
    pub email: String,
    pub name: String,
    pub room_number: String,
    pub roll_number: String,
    pub login_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub admin_id: String,
    pub token: String,
    pub login_time: Option<DateTime<Utc>>,
}

/// Session markers kept in a [`LocalStore`]. Trusted by this client only.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn LocalStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    // -- Student --

    pub fn start_student(&self, session: &StudentSession) -> Result<()> {
        let login_time = session.login_time.unwrap_or_else(Utc::now).to_rfc3339();
        self.store.set(STUDENT_LOGGED_IN, "true")?;
        self.store.set(STUDENT_EMAIL, &session.email)?;
        self.store.set(STUDENT_NAME, &session.name)?;
        self.store.set(STUDENT_ROOM, &session.room_number)?;
        self.store.set(STUDENT_ROLL, &session.roll_number)?;
        self.store.set(STUDENT_LOGIN_TIME, &login_time)?;
        Ok(())
    }

    /// The current student session, if the marker is set.
    pub fn student(&self) -> Option<StudentSession> {
        if self.store.get(STUDENT_LOGGED_IN).as_deref() != Some("true") {
            return None;
        }
        Some(StudentSession {
            email: self.store.get(STUDENT_EMAIL).unwrap_or_default(),
            name: self.store.get(STUDENT_NAME).unwrap_or_default(),
            room_number: self.store.get(STUDENT_ROOM).unwrap_or_default(),
            roll_number: self.store.get(STUDENT_ROLL).unwrap_or_default(),
            login_time: self.load_time(STUDENT_LOGIN_TIME),
        })
    }

    pub fn end_student(&self) -> Result<()> {
        STUDENT_KEYS.iter().try_for_each(|key| self.store.remove(key))
    }

    // -- Admin --

    pub fn start_admin(&self, admin_id: &str, token: &str) -> Result<AdminSession> {
        let now = Utc::now();
        self.store.set(ADMIN_LOGGED_IN, "true")?;
        self.store.set(ADMIN_ID, admin_id)?;
        self.store.set(ADMIN_TOKEN, token)?;
        self.store.set(ADMIN_LOGIN_TIME, &now.to_rfc3339())?;
        Ok(AdminSession {
            admin_id: admin_id.to_string(),
            token: token.to_string(),
            login_time: Some(now),
        })
    }

    pub fn admin(&self) -> Option<AdminSession> {
        if self.store.get(ADMIN_LOGGED_IN).as_deref() != Some("true") {
            return None;
        }
        Some(AdminSession {
            admin_id: self.store.get(ADMIN_ID).unwrap_or_else(|| "Admin".to_string()),
            token: self.store.get(ADMIN_TOKEN).unwrap_or_default(),
            login_time: self.load_time(ADMIN_LOGIN_TIME),
        })
    }

    pub fn end_admin(&self) -> Result<()> {
        ADMIN_KEYS.iter().try_for_each(|key| self.store.remove(key))
    }

    fn load_time(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.store.get(key)?;
        DateTime::parse_from_rfc3339(&raw)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}

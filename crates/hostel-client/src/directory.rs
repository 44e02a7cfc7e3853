use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use anyhow::anyhow;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::session::{SessionStore, StudentSession};
use crate::storage::LocalStore;

const STUDENTS_KEY: &str = "registeredStudents";

pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern"));

/// Demo account seeded into an empty directory.
pub const DEMO_EMAIL: &str = "student@hostel.com";
pub const DEMO_PASSWORD: &str = "Student@123";

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter a valid phone number")]
    InvalidPhone,

    #[error("Email already registered. Please login or use a different email.")]
    EmailTaken,

    #[error("Email not found. Please register first.")]
    EmailNotFound,

    #[error("Invalid password. Please try again.")]
    WrongPassword,

    #[error("Student directory unavailable: {0}")]
    Storage(#[from] anyhow::Error),
}

/// A registered student, keyed by email in the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub password_hash: String,
    pub full_name: String,
    pub roll_number: String,
    pub room_number: String,
    pub phone: String,
    pub registered_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub full_name: String,
    pub roll_number: String,
    pub room_number: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Field checks, in the order the registration page reports them.
    pub fn validate(&self) -> Result<(), DirectoryError> {
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DirectoryError::PasswordTooShort);
        }
        if self.password != self.confirm_password {
            return Err(DirectoryError::PasswordMismatch);
        }
        if !is_valid_email(&self.email) {
            return Err(DirectoryError::InvalidEmail);
        }
        if !is_valid_phone(&self.phone) {
            return Err(DirectoryError::InvalidPhone);
        }
        Ok(())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Student accounts held entirely in local storage. The server never sees
/// these records.
pub struct StudentDirectory {
    store: Arc<dyn LocalStore>,
    sessions: SessionStore,
}

impl StudentDirectory {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        let sessions = SessionStore::new(store.clone());
        Self { store, sessions }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Seed the demo account if no directory exists yet. Runs before every
    /// register and login, so the demo account predates any registration.
    pub fn seed_demo(&self) -> Result<(), DirectoryError> {
        if self.store.get(STUDENTS_KEY).is_some() {
            return Ok(());
        }

        let mut students = BTreeMap::new();
        students.insert(
            DEMO_EMAIL.to_string(),
            StudentRecord {
                password_hash: hash_password(DEMO_PASSWORD)?,
                full_name: "Demo Student".to_string(),
                roll_number: "CS001".to_string(),
                room_number: "A-101".to_string(),
                phone: "9876543210".to_string(),
                registered_date: Utc::now(),
            },
        );
        self.save(&students)?;
        info!("Seeded demo student account {}", DEMO_EMAIL);
        Ok(())
    }

    pub fn register(&self, form: &RegistrationForm) -> Result<(), DirectoryError> {
        self.seed_demo()?;
        form.validate()?;

        let mut students = self.load()?;
        if students.contains_key(&form.email) {
            return Err(DirectoryError::EmailTaken);
        }

        students.insert(
            form.email.clone(),
            StudentRecord {
                password_hash: hash_password(&form.password)?,
                full_name: form.full_name.clone(),
                roll_number: form.roll_number.clone(),
                room_number: form.room_number.clone(),
                phone: form.phone.clone(),
                registered_date: Utc::now(),
            },
        );
        self.save(&students)?;

        info!("Registered student {}", form.email);
        Ok(())
    }

    /// Check credentials and open a local session carrying the profile.
    pub fn login(&self, email: &str, password: &str) -> Result<StudentSession, DirectoryError> {
        self.seed_demo()?;

        let students = self.load()?;
        let record = students.get(email).ok_or(DirectoryError::EmailNotFound)?;

        let parsed = PasswordHash::new(&record.password_hash)
            .map_err(|e| anyhow!("Corrupt password hash for {}: {}", email, e))?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            warn!("Wrong password for student {}", email);
            return Err(DirectoryError::WrongPassword);
        }

        let session = StudentSession {
            email: email.to_string(),
            name: record.full_name.clone(),
            room_number: record.room_number.clone(),
            roll_number: record.roll_number.clone(),
            login_time: Some(Utc::now()),
        };
        self.sessions.start_student(&session)?;
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), DirectoryError> {
        self.sessions.end_student()?;
        Ok(())
    }

    pub fn current_student(&self) -> Option<StudentSession> {
        self.sessions.student()
    }

    pub fn get(&self, email: &str) -> Result<Option<StudentRecord>, DirectoryError> {
        Ok(self.load()?.remove(email))
    }

    fn load(&self) -> Result<BTreeMap<String, StudentRecord>, DirectoryError> {
        match self.store.get(STUDENTS_KEY) {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| DirectoryError::Storage(anyhow!("Corrupt student directory: {}", e))),
            None => Ok(BTreeMap::new()),
        }
    }

    fn save(&self, students: &BTreeMap<String, StudentRecord>) -> Result<(), DirectoryError> {
        let raw = serde_json::to_string(students).map_err(anyhow::Error::from)?;
        self.store.set(STUDENTS_KEY, &raw)?;
        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String, DirectoryError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn directory() -> StudentDirectory {
        StudentDirectory::new(Arc::new(MemoryStore::new()))
    }

    fn form(email: &str, password: &str) -> RegistrationForm {
        RegistrationForm {
            full_name: "Asha Rao".into(),
            roll_number: "CS042".into(),
            room_number: "B-204".into(),
            email: email.into(),
            phone: "9123456780".into(),
            password: password.into(),
            confirm_password: password.into(),
        }
    }

    #[test]
    fn short_password_is_rejected_and_nothing_stored() {
        let dir = directory();
        let err = dir.register(&form("a@b.com", "abc123")).unwrap_err();
        assert!(matches!(err, DirectoryError::PasswordTooShort));
        assert!(dir.get("a@b.com").unwrap().is_none());
    }

    #[test]
    fn validation_order_matches_registration_page() {
        let mut f = form("not-an-email", "longenough");
        f.confirm_password = "different1".into();
        assert!(matches!(f.validate(), Err(DirectoryError::PasswordMismatch)));

        f.confirm_password = f.password.clone();
        assert!(matches!(f.validate(), Err(DirectoryError::InvalidEmail)));

        f.email = "a@b.com".into();
        f.phone = "12345".into();
        assert!(matches!(f.validate(), Err(DirectoryError::InvalidPhone)));
    }

    #[test]
    fn email_and_phone_patterns() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@hostel.ac.in"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.com"));

        assert!(is_valid_phone("9876543210"));
        assert!(!is_valid_phone("987654321"));
        assert!(!is_valid_phone("98765432100"));
        assert!(!is_valid_phone("98765-4321"));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let dir = directory();
        dir.register(&form("a@b.com", "password1")).unwrap();
        let err = dir.register(&form("a@b.com", "password2")).unwrap_err();
        assert!(matches!(err, DirectoryError::EmailTaken));
    }

    #[test]
    fn register_login_logout() {
        let dir = directory();
        dir.register(&form("a@b.com", "password1")).unwrap();

        let record = dir.get("a@b.com").unwrap().unwrap();
        assert_ne!(record.password_hash, "password1");

        assert!(matches!(
            dir.login("a@b.com", "password2"),
            Err(DirectoryError::WrongPassword)
        ));
        assert!(dir.sessions().student().is_none());

        let session = dir.login("a@b.com", "password1").unwrap();
        assert_eq!(session.name, "Asha Rao");
        assert_eq!(dir.current_student().unwrap().room_number, "B-204");

        dir.logout().unwrap();
        assert!(dir.current_student().is_none());
    }

    #[test]
    fn unknown_email_cannot_login() {
        let dir = directory();
        assert!(matches!(
            dir.login("ghost@b.com", "password1"),
            Err(DirectoryError::EmailNotFound)
        ));
    }

    #[test]
    fn demo_account_survives_earlier_registration() {
        let dir = directory();
        dir.register(&form("asha@hostel.com", "password1")).unwrap();

        let session = dir.login(DEMO_EMAIL, DEMO_PASSWORD).unwrap();
        assert_eq!(session.roll_number, "CS001");
        assert!(dir.login("asha@hostel.com", "password1").is_ok());
    }

    #[test]
    fn demo_email_cannot_be_registered() {
        let dir = directory();
        let err = dir.register(&form(DEMO_EMAIL, "password1")).unwrap_err();
        assert!(matches!(err, DirectoryError::EmailTaken));
    }

    #[test]
    fn demo_account_is_seeded_on_login() {
        let dir = directory();
        let session = dir.login(DEMO_EMAIL, DEMO_PASSWORD).unwrap();
        assert_eq!(session.name, "Demo Student");
        assert_eq!(session.room_number, "A-101");
    }
}

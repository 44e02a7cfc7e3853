use std::sync::Arc;

use anyhow::anyhow;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{Json, extract::State};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{error, info, warn};

use hostel_db::Database;
use hostel_types::api::{AdminClaims, AdminLoginRequest, AdminLoginResponse};

use crate::error::ApiError;

/// Built-in credential used when `ADMIN_USERS` is unset or unusable.
pub const DEFAULT_ADMIN_USERS: &str = "admin001:Admin@123";

pub const ADMIN_ROLE: &str = "admin";

const TOKEN_TTL_HOURS: i64 = 12;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub admins: AdminRegistry,
    pub jwt_secret: String,
    /// When false, complaint mutations are open to anyone.
    pub require_admin_auth: bool,
}

struct AdminCredential {
    id: String,
    password_hash: String,
}

/// Configured administrators, held as Argon2id hashes.
pub struct AdminRegistry {
    admins: Vec<AdminCredential>,
}

impl AdminRegistry {
    /// Build the registry from an `id:password,id:password` list, falling back
    /// to [`DEFAULT_ADMIN_USERS`] when nothing usable is configured.
    pub fn from_config(raw: Option<&str>) -> anyhow::Result<Self> {
        let mut pairs = raw.map(parse_admin_list).unwrap_or_default();
        if pairs.is_empty() {
            if raw.is_some() {
                warn!("ADMIN_USERS has no usable entries, using the default admin");
            }
            pairs = parse_admin_list(DEFAULT_ADMIN_USERS);
        }

        let argon2 = Argon2::default();
        let admins = pairs
            .into_iter()
            .map(|(id, password)| {
                let salt = SaltString::generate(&mut OsRng);
                let password_hash = argon2
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| anyhow!("Failed to hash password for admin {}: {}", id, e))?
                    .to_string();
                Ok(AdminCredential { id, password_hash })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        info!("Loaded {} admin credential(s)", admins.len());
        Ok(Self { admins })
    }

    /// Linear scan for the id, then password verification. Unknown id and
    /// wrong password are indistinguishable to the caller.
    pub fn verify(&self, id: &str, password: &str) -> bool {
        let argon2 = Argon2::default();
        self.admins
            .iter()
            .filter(|admin| admin.id == id)
            .any(|admin| match PasswordHash::new(&admin.password_hash) {
                Ok(parsed) => argon2.verify_password(password.as_bytes(), &parsed).is_ok(),
                Err(e) => {
                    error!("Corrupt password hash for admin '{}': {}", admin.id, e);
                    false
                }
            })
    }
}

/// Split `id:password,id:password`. Each entry splits at its first colon, so
/// passwords may contain colons. Entries missing either half are skipped.
pub fn parse_admin_list(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            match entry.split_once(':') {
                Some((id, password)) if !id.trim().is_empty() && !password.is_empty() => {
                    Some((id.trim().to_string(), password.to_string()))
                }
                _ => {
                    warn!("Skipping malformed admin entry (expected id:password)");
                    None
                }
            }
        })
        .collect()
}

/// POST /api/admin/login
pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, ApiError> {
    let verifier = state.clone();
    let admin_id = req.admin_id.clone();

    // Argon2 verification is CPU-bound
    let valid = tokio::task::spawn_blocking(move || verifier.admins.verify(&admin_id, &req.password))
        .await
        .map_err(|e| anyhow!("spawn_blocking join error: {}", e))?;

    if !valid {
        warn!("Rejected admin login for '{}'", req.admin_id);
        return Err(ApiError::InvalidCredentials);
    }

    let token = create_token(&state.jwt_secret, &req.admin_id)?;
    info!("Admin '{}' logged in", req.admin_id);

    Ok(Json(AdminLoginResponse {
        message: "Login successful".to_string(),
        admin_id: req.admin_id,
        token,
    }))
}

pub fn create_token(secret: &str, admin_id: &str) -> anyhow::Result<String> {
    let claims = AdminClaims {
        sub: admin_id.to_string(),
        role: ADMIN_ROLE.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn decode_token(secret: &str, token: &str) -> Result<AdminClaims, jsonwebtoken::errors::Error> {
    let data = decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use cuid2::CuidConstructor;
use once_cell::sync::Lazy;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use smartassist_config::{AuthConfig, MAX_SESSION_TTL_SECONDS};
use sqlx::{FromRow, Row, SqlitePool};
use thiserror::Error;
use tracing::{debug, info};

pub const MIN_PASSWORD_LENGTH: usize = 8;

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

#[derive(Clone)]
pub struct Authenticator {
    pool: SqlitePool,
    session_ttl: Duration,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user already exists")]
    UserExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,
    #[error("user not found")]
    UserNotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("session not found")]
    SessionNotFound,
    #[error("session expired")]
    SessionExpired,
    #[error("invalid session token")]
    InvalidSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        if value.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    #[serde(skip_serializing)]
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    public_id: String,
    name: String,
    email: String,
    role: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            public_id: row.public_id,
            name: row.name,
            email: row.email,
            role: Role::from(row.role.as_str()),
        }
    }
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: AuthConfig) -> Self {
        let ttl_seconds = config.session_ttl_seconds.min(MAX_SESSION_TTL_SECONDS);
        let session_ttl = Duration::seconds(ttl_seconds as i64);

        Self { pool, session_ttl }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Create a regular account. Emails are compared case-insensitively.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        ensure_password_strength(password)?;
        let email = normalize_email(email);

        if self.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::UserExists);
        }

        let user = self
            .insert_user(name.trim(), &email, password, Role::User)
            .await?;
        info!(user = %user.public_id, "registered user");
        Ok(user)
    }

    /// Create an administrator, or promote and reset the password of an existing account.
    pub async fn upsert_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        ensure_password_strength(password)?;
        let email = normalize_email(email);

        let Some(existing) = self.find_user_by_email(&email).await? else {
            let user = self
                .insert_user(name.trim(), &email, password, Role::Admin)
                .await?;
            info!(user = %user.public_id, "created administrator");
            return Ok(user);
        };

        let password_hash = hash_password(password)?;
        sqlx::query(
            "UPDATE users SET name = ?, password_hash = ?, role = ?, updated_at = ? WHERE id = ?",
        )
        .bind(name.trim())
        .bind(password_hash)
        .bind(Role::Admin.as_str())
        .bind(timestamp(Utc::now()))
        .bind(existing.id)
        .execute(&self.pool)
        .await?;

        info!(user = %existing.public_id, "updated administrator");
        self.fetch_user(existing.id).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(User, AuthSession), AuthError> {
        let email = normalize_email(email);

        let row = sqlx::query("SELECT id, password_hash FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::InvalidCredentials);
        };

        let secret: String = row.try_get("password_hash")?;
        let stored_hash = PasswordHash::new(&secret)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &stored_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let user_id: i64 = row.try_get("id")?;
        let user = self.fetch_user(user_id).await?;
        let session = self.issue_session(user_id).await?;

        debug!(user = %user.public_id, "issued session");
        Ok((user, session))
    }

    pub async fn authenticate_token(&self, token: &str) -> Result<(User, AuthSession), AuthError> {
        let row = sqlx::query("SELECT user_id, expires_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::SessionNotFound);
        };

        let user_id: i64 = row.try_get("user_id")?;
        let expires_at: String = row.try_get("expires_at")?;

        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
            .map_err(|_| AuthError::InvalidSession)?
            .with_timezone(&Utc);

        if expires_at <= Utc::now() {
            sqlx::query("DELETE FROM sessions WHERE token = ?")
                .bind(token)
                .execute(&self.pool)
                .await?;
            return Err(AuthError::SessionExpired);
        }

        let user = self.fetch_user(user_id).await?;
        let session = AuthSession {
            token: token.to_owned(),
            user_id,
            expires_at,
        };

        Ok((user, session))
    }

    /// Revoke a session token. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        debug!(revoked = result.rows_affected(), "logged out session");
        Ok(())
    }

    /// Delete sessions past their expiry. Returns how many were removed.
    pub async fn purge_expired_sessions(&self) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(timestamp(Utc::now()))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, public_id, name, email, role FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let now = timestamp(Utc::now());
        let public_id = new_public_id();
        let password_hash = hash_password(password)?;

        let result = sqlx::query(
            "INSERT INTO users (public_id, name, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|error| match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::UserExists,
            _ => AuthError::Database(error),
        })?;

        Ok(User {
            id: result.last_insert_rowid(),
            public_id,
            name: name.to_owned(),
            email: email.to_owned(),
            role,
        })
    }

    async fn fetch_user(&self, id: i64) -> Result<User, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, public_id, name, email, role FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from).ok_or(AuthError::UserNotFound)
    }

    async fn issue_session(&self, user_id: i64) -> Result<AuthSession, AuthError> {
        let token = generate_session_token();
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        sqlx::query(
            "INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&token)
        .bind(timestamp(now))
        .bind(timestamp(expires_at))
        .execute(&self.pool)
        .await?;

        Ok(AuthSession {
            token,
            user_id,
            expires_at,
        })
    }
}

fn ensure_password_strength(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Fixed-width RFC 3339 so stored expiries compare correctly as text.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn new_public_id() -> String {
    CUID.create_id()
}

//! Authentication provider seam
//!
//! The admin layer is provider-agnostic: everything it needs from the
//! auth backend goes through [`AuthProvider`]. Implementations own
//! storage and credential handling; this layer never sees password
//! hashes or tokens beyond opaque strings.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tabula_core::Result;

/// A user account as the provider reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    /// Raw role value, possibly a comma-separated list
    pub role: Option<String>,
    pub banned: bool,
    pub ban_reason: Option<String>,
    pub ban_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An authentication session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub token: String,
    pub user_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is still live at `now`
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// A resolved session together with its owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPrincipal {
    pub user: User,
    pub session: Session,
}

/// Input for creating a user through the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Normalized lowercase role ("user" or "admin")
    pub role: String,
}

/// Input for banning a user
#[derive(Debug, Clone, PartialEq)]
pub struct BanRequest {
    pub user_id: String,
    pub reason: Option<String>,
    /// Ban lifts automatically after this long; `None` is indefinite
    pub expires_in: Option<Duration>,
}

/// Query options for listing users
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<usize>,
    pub sort_by: Option<String>,
    pub descending: bool,
}

impl ListUsersQuery {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sorted_by(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.sort_by = Some(field.into());
        self.descending = descending;
        self
    }
}

/// Everything the admin layer needs from an auth backend
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Authenticate with credentials and open a session
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionPrincipal>;

    /// Terminate the session behind a token
    async fn sign_out(&self, token: &str) -> Result<()>;

    /// Resolve a token to its principal; `None` for unknown or expired
    /// tokens
    async fn session_from_token(&self, token: &str) -> Result<Option<SessionPrincipal>>;

    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    async fn list_users(&self, query: ListUsersQuery) -> Result<Vec<User>>;

    async fn list_user_sessions(&self, user_id: &str) -> Result<Vec<Session>>;

    async fn create_user(&self, new_user: NewUser) -> Result<User>;

    async fn ban_user(&self, request: BanRequest) -> Result<()>;

    async fn unban_user(&self, user_id: &str) -> Result<()>;

    /// Delete the user and everything attached to them
    async fn remove_user(&self, user_id: &str) -> Result<()>;

    /// Terminate every session the user has
    async fn revoke_user_sessions(&self, user_id: &str) -> Result<()>;

    async fn set_password(&self, user_id: &str, new_password: &str) -> Result<()>;
}

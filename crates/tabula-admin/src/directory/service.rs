//! Directory service implementation

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabula_core::{Result, Value};
use tabula_grid::{BadgeVariant, CellDisplay, ColumnDef, ColumnType, OptionItem, Record};

use crate::provider::{AuthProvider, ListUsersQuery, Session, User};
use crate::roles::{has_admin_role, normalize_roles, primary_role};

/// Upper bound on users loaded into the directory
pub const MAX_DIRECTORY_USERS: usize = 1000;

/// Window for the "recent signups" overview stat
pub const RECENT_SIGNUP_DAYS: i64 = 7;

/// Whether a session is live or past its expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Active,
    Expired,
}

impl SessionStatus {
    pub fn from_expiry(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if expires_at > now {
            Self::Active
        } else {
            Self::Expired
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Expired => "EXPIRED",
        }
    }
}

/// One row of the admin users grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    /// Primary (first) normalized role
    pub role: String,
    pub roles: Vec<String>,
    pub banned: bool,
    pub ban_reason: Option<String>,
    pub ban_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Creation time of the newest session
    pub last_active_at: Option<DateTime<Utc>>,
    pub active_sessions: usize,
    pub total_sessions: usize,
}

impl Record for AdminUserRow {
    fn field(&self, key: &str) -> Value {
        match key {
            "id" => self.id.clone().into(),
            "name" => self.name.clone().into(),
            "email" => self.email.clone().into(),
            "image" => self.image.clone().into(),
            "role" => self.role.clone().into(),
            "roles" => Value::Array(self.roles.iter().cloned().map(Value::from).collect()),
            "banned" => self.banned.into(),
            "banReason" => self.ban_reason.clone().into(),
            "banExpiresAt" => self.ban_expires_at.into(),
            "createdAt" => self.created_at.into(),
            "lastActiveAt" => self.last_active_at.into(),
            "activeSessions" => self.active_sessions.into(),
            "totalSessions" => self.total_sessions.into(),
            // Computed fields for the grid's derived columns
            "banStatus" => if self.banned { "banned" } else { "active" }.into(),
            "status" => if self.active_sessions > 0 { "online" } else { "offline" }.into(),
            _ => Value::Null,
        }
    }

    fn record_id(&self) -> Option<String> {
        Some(self.id.clone())
    }
}

/// One row of the admin sessions grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSessionRow {
    pub id: String,
    pub token: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_image: Option<String>,
    pub status: SessionStatus,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AdminSessionRow {
    /// Session lifetime from creation to expiry, in whole minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.expires_at - self.created_at).num_minutes()
    }
}

impl Record for AdminSessionRow {
    fn field(&self, key: &str) -> Value {
        match key {
            "id" => self.id.clone().into(),
            "token" => self.token.clone().into(),
            "userId" => self.user_id.clone().into(),
            "userName" => self.user_name.clone().into(),
            "userEmail" => self.user_email.clone().into(),
            "userImage" => self.user_image.clone().into(),
            "status" => self.status.label().into(),
            "ipAddress" => self.ip_address.clone().into(),
            "userAgent" => self.user_agent.clone().into(),
            "createdAt" => self.created_at.into(),
            "updatedAt" => self.updated_at.into(),
            "expiresAt" => self.expires_at.into(),
            "durationMinutes" => self.duration_minutes().into(),
            _ => Value::Null,
        }
    }

    fn record_id(&self) -> Option<String> {
        Some(self.id.clone())
    }
}

/// Aggregate stats for the admin overview cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub total_users: usize,
    pub admin_users: usize,
    pub regular_users: usize,
    pub total_sessions: usize,
    pub active_sessions: usize,
    pub expired_sessions: usize,
    /// Unbanned users with at least one live session
    pub active_users: usize,
    pub banned_users: usize,
    /// Users created within the last week
    pub recent_signups: usize,
    /// Rounded to two decimals; zero when there are no users
    pub average_sessions_per_user: f64,
}

/// Users and their sessions, as loaded from the provider
#[derive(Debug, Clone, Default)]
pub struct AdminDataset {
    pub users: Vec<User>,
    /// Sessions per user id, newest-created first
    pub sessions_by_user: HashMap<String, Vec<Session>>,
}

impl AdminDataset {
    fn all_sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions_by_user.values().flatten()
    }
}

/// Loads and projects the admin users/sessions dataset
pub struct AdminDirectory {
    provider: Arc<dyn AuthProvider>,
}

impl AdminDirectory {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// Load users (newest first) and each user's sessions
    ///
    /// A failure to load one user's sessions degrades to an empty list
    /// for that user; a failure to list users propagates so the page
    /// can show the grid's error state.
    pub async fn load(&self) -> Result<AdminDataset> {
        let users = self
            .provider
            .list_users(
                ListUsersQuery::default()
                    .with_limit(MAX_DIRECTORY_USERS)
                    .sorted_by("createdAt", true),
            )
            .await?;

        let mut sessions_by_user = HashMap::with_capacity(users.len());
        for user in &users {
            let sessions = match self.provider.list_user_sessions(&user.id).await {
                Ok(mut sessions) => {
                    sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                    sessions
                }
                Err(error) => {
                    tracing::warn!(user_id = %user.id, %error, "failed to load sessions for user");
                    Vec::new()
                }
            };
            sessions_by_user.insert(user.id.clone(), sessions);
        }

        Ok(AdminDataset {
            users,
            sessions_by_user,
        })
    }

    /// Project the dataset into users-grid rows
    pub fn user_rows(dataset: &AdminDataset, now: DateTime<Utc>) -> Vec<AdminUserRow> {
        dataset
            .users
            .iter()
            .map(|user| {
                let sessions = dataset
                    .sessions_by_user
                    .get(&user.id)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let active_sessions =
                    sessions.iter().filter(|s| s.is_active(now)).count();
                let roles = normalize_roles(user.role.as_deref());
                AdminUserRow {
                    id: user.id.clone(),
                    name: user.name.clone(),
                    email: user.email.clone(),
                    image: user.image.clone(),
                    role: primary_role(user.role.as_deref()),
                    roles,
                    banned: user.banned,
                    ban_reason: user.ban_reason.clone(),
                    ban_expires_at: user.ban_expires_at,
                    created_at: user.created_at,
                    last_active_at: sessions.first().map(|s| s.created_at),
                    active_sessions,
                    total_sessions: sessions.len(),
                }
            })
            .collect()
    }

    /// Project the dataset into sessions-grid rows, newest first
    pub fn session_rows(dataset: &AdminDataset, now: DateTime<Utc>) -> Vec<AdminSessionRow> {
        let users_by_id: HashMap<&str, &User> = dataset
            .users
            .iter()
            .map(|user| (user.id.as_str(), user))
            .collect();

        let mut rows: Vec<AdminSessionRow> = dataset
            .all_sessions()
            .map(|session| {
                let user = users_by_id.get(session.user_id.as_str());
                AdminSessionRow {
                    id: session.id.clone(),
                    token: session.token.clone(),
                    user_id: session.user_id.clone(),
                    user_name: user.map(|u| u.name.clone()).unwrap_or_default(),
                    user_email: user.map(|u| u.email.clone()).unwrap_or_default(),
                    user_image: user.and_then(|u| u.image.clone()),
                    status: SessionStatus::from_expiry(session.expires_at, now),
                    ip_address: session.ip_address.clone(),
                    user_agent: session.user_agent.clone(),
                    created_at: session.created_at,
                    updated_at: session.updated_at,
                    expires_at: session.expires_at,
                }
            })
            .collect();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    /// Compute the overview stats
    pub fn overview(dataset: &AdminDataset, now: DateTime<Utc>) -> AdminOverview {
        let total_sessions = dataset.all_sessions().count();
        let active: Vec<&Session> = dataset
            .all_sessions()
            .filter(|s| s.is_active(now))
            .collect();
        let active_user_ids: HashSet<&str> =
            active.iter().map(|s| s.user_id.as_str()).collect();

        let total_users = dataset.users.len();
        let admin_users = dataset
            .users
            .iter()
            .filter(|u| has_admin_role(u.role.as_deref()))
            .count();
        let banned_users = dataset.users.iter().filter(|u| u.banned).count();
        let active_users = dataset
            .users
            .iter()
            .filter(|u| !u.banned && active_user_ids.contains(u.id.as_str()))
            .count();
        let recent_signups = dataset
            .users
            .iter()
            .filter(|u| (now - u.created_at).num_days() <= RECENT_SIGNUP_DAYS)
            .count();
        let average_sessions_per_user = if total_users == 0 {
            0.0
        } else {
            (total_sessions as f64 / total_users as f64 * 100.0).round() / 100.0
        };

        AdminOverview {
            total_users,
            admin_users,
            regular_users: total_users - admin_users,
            total_sessions,
            active_sessions: active.len(),
            expired_sessions: total_sessions - active.len(),
            active_users,
            banned_users,
            recent_signups,
            average_sessions_per_user,
        }
    }
}

/// Session token shortened for display
pub fn truncate_token(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    if prefix.len() < token.chars().count() {
        format!("{prefix}...")
    } else {
        prefix
    }
}

/// Session lifetime in hours and minutes ("2h 30m", "45m")
pub fn format_session_duration(minutes: i64) -> String {
    if minutes >= 60 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}m")
    }
}

/// Column set for the admin users grid
pub fn user_columns() -> Vec<ColumnDef<AdminUserRow>> {
    vec![
        ColumnDef::new("name", "Name", ColumnType::Text),
        ColumnDef::new("email", "Email", ColumnType::Text),
        ColumnDef::new("role", "Role", ColumnType::Options).with_option_items(vec![
            OptionItem::new("admin", "Admin").with_variant(BadgeVariant::Default),
            OptionItem::new("user", "User").with_variant(BadgeVariant::Secondary),
        ]),
        ColumnDef::new("banStatus", "Ban status", ColumnType::Badge)
            .with_label("banned", "Banned")
            .with_label("active", "Active")
            .with_value_variant("banned", BadgeVariant::Destructive)
            .with_value_variant("active", BadgeVariant::Default),
        ColumnDef::new("status", "Status", ColumnType::Badge)
            .with_label("online", "Online")
            .with_label("offline", "Offline")
            .with_value_variant("online", BadgeVariant::Default)
            .with_value_variant("offline", BadgeVariant::Outline),
        ColumnDef::new("activeSessions", "Active sessions", ColumnType::Number),
        ColumnDef::new("totalSessions", "Total sessions", ColumnType::Number),
        ColumnDef::new("banExpiresAt", "Ban expires", ColumnType::DateTime),
        ColumnDef::new("createdAt", "Created", ColumnType::DateTime),
        ColumnDef::new("lastActiveAt", "Last active", ColumnType::DateTime),
    ]
}

/// Column set for the admin sessions grid
pub fn session_columns() -> Vec<ColumnDef<AdminSessionRow>> {
    vec![
        ColumnDef::new("userName", "User", ColumnType::Text),
        ColumnDef::new("userEmail", "Email", ColumnType::Text),
        ColumnDef::new("token", "Token", ColumnType::TextCopy)
            .with_filtering(false)
            .with_cell(|row: &AdminSessionRow| {
                CellDisplay::Copyable(truncate_token(&row.token))
            }),
        ColumnDef::new("status", "Status", ColumnType::Badge)
            .with_label("ACTIVE", "Active")
            .with_label("EXPIRED", "Expired")
            .with_value_variant("ACTIVE", BadgeVariant::Default)
            .with_value_variant("EXPIRED", BadgeVariant::Outline),
        ColumnDef::new("ipAddress", "IP address", ColumnType::Text),
        ColumnDef::new("userAgent", "User agent", ColumnType::TextLong),
        ColumnDef::new("durationMinutes", "Duration", ColumnType::Number)
            .with_id("duration")
            .with_cell(|row: &AdminSessionRow| {
                CellDisplay::Text(format_session_duration(row.duration_minutes()))
            }),
        ColumnDef::new("createdAt", "Created", ColumnType::DateTime),
        ColumnDef::new("expiresAt", "Expires", ColumnType::DateTime),
    ]
}

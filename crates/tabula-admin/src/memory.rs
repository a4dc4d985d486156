//! In-process auth provider
//!
//! Backs the admin layer with plain maps behind a lock. Useful for
//! tests and demos; not a real credential store (passwords are kept in
//! clear text).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tabula_core::{Error, Result};
use uuid::Uuid;

use crate::provider::{
    AuthProvider, BanRequest, ListUsersQuery, NewUser, Session, SessionPrincipal, User,
};

/// Default session lifetime
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, User>,
    sessions: HashMap<String, Session>,
    passwords: HashMap<String, String>,
}

/// Map-backed [`AuthProvider`] implementation
pub struct MemoryAuthProvider {
    state: RwLock<MemoryState>,
    session_ttl: Duration,
}

impl Default for MemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            session_ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Insert a user directly, bypassing validation
    pub fn add_user(&self, user: User, password: impl Into<String>) {
        let mut state = self.state.write();
        state.passwords.insert(user.id.clone(), password.into());
        state.users.insert(user.id.clone(), user);
    }

    /// Open a session for a user without credentials (test seam)
    pub fn open_session(&self, user_id: &str) -> Result<Session> {
        self.open_session_at(user_id, Utc::now())
    }

    /// Open a session with an explicit creation time
    pub fn open_session_at(&self, user_id: &str, created_at: DateTime<Utc>) -> Result<Session> {
        let mut state = self.state.write();
        if !state.users.contains_key(user_id) {
            return Err(Error::NotFound(format!("user {user_id}")));
        }
        let session = Session {
            id: Uuid::new_v4().to_string(),
            token: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            ip_address: None,
            user_agent: None,
            created_at,
            updated_at: created_at,
            expires_at: created_at + self.session_ttl,
        };
        state.sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn principal_for(state: &MemoryState, session: &Session) -> Option<SessionPrincipal> {
        state.users.get(&session.user_id).map(|user| SessionPrincipal {
            user: user.clone(),
            session: session.clone(),
        })
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionPrincipal> {
        let user_id = {
            let state = self.state.read();
            let user = state
                .users
                .values()
                .find(|u| u.email.eq_ignore_ascii_case(email))
                .ok_or_else(|| Error::Unauthorized("invalid credentials".to_string()))?;
            if user.banned {
                return Err(Error::Unauthorized("user is banned".to_string()));
            }
            match state.passwords.get(&user.id) {
                Some(stored) if stored == password => user.id.clone(),
                _ => return Err(Error::Unauthorized("invalid credentials".to_string())),
            }
        };
        let session = self.open_session(&user_id)?;
        let state = self.state.read();
        Self::principal_for(&state, &session)
            .ok_or_else(|| Error::NotFound(format!("user {user_id}")))
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        let mut state = self.state.write();
        state.sessions.retain(|_, session| session.token != token);
        Ok(())
    }

    async fn session_from_token(&self, token: &str) -> Result<Option<SessionPrincipal>> {
        let state = self.state.read();
        let now = Utc::now();
        Ok(state
            .sessions
            .values()
            .find(|session| session.token == token && session.is_active(now))
            .and_then(|session| Self::principal_for(&state, session)))
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.state.read().users.get(user_id).cloned())
    }

    async fn list_users(&self, query: ListUsersQuery) -> Result<Vec<User>> {
        let state = self.state.read();
        let mut users: Vec<User> = state.users.values().cloned().collect();
        match query.sort_by.as_deref() {
            Some("createdAt") | None => users.sort_by_key(|u| u.created_at),
            Some("name") => users.sort_by(|a, b| a.name.cmp(&b.name)),
            Some("email") => users.sort_by(|a, b| a.email.cmp(&b.email)),
            Some(other) => {
                return Err(Error::Validation(format!("unknown sort field: {other}")));
            }
        }
        if query.descending {
            users.reverse();
        }
        if let Some(limit) = query.limit {
            users.truncate(limit);
        }
        Ok(users)
    }

    async fn list_user_sessions(&self, user_id: &str) -> Result<Vec<Session>> {
        let state = self.state.read();
        Ok(state
            .sessions
            .values()
            .filter(|session| session.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let mut state = self.state.write();
        if state
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(Error::Validation("email already in use".to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: new_user.name,
            email: new_user.email,
            image: None,
            role: Some(new_user.role),
            banned: false,
            ban_reason: None,
            ban_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        state.passwords.insert(user.id.clone(), new_user.password);
        state.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn ban_user(&self, request: BanRequest) -> Result<()> {
        let mut state = self.state.write();
        let now = Utc::now();
        let user = state
            .users
            .get_mut(&request.user_id)
            .ok_or_else(|| Error::NotFound(format!("user {}", request.user_id)))?;
        user.banned = true;
        user.ban_reason = request.reason;
        user.ban_expires_at = request.expires_in.map(|ttl| now + ttl);
        user.updated_at = now;
        // Banning terminates the user's sessions
        state
            .sessions
            .retain(|_, session| session.user_id != request.user_id);
        Ok(())
    }

    async fn unban_user(&self, user_id: &str) -> Result<()> {
        let mut state = self.state.write();
        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| Error::NotFound(format!("user {user_id}")))?;
        user.banned = false;
        user.ban_reason = None;
        user.ban_expires_at = None;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn remove_user(&self, user_id: &str) -> Result<()> {
        let mut state = self.state.write();
        if state.users.remove(user_id).is_none() {
            return Err(Error::NotFound(format!("user {user_id}")));
        }
        state.passwords.remove(user_id);
        state.sessions.retain(|_, session| session.user_id != user_id);
        Ok(())
    }

    async fn revoke_user_sessions(&self, user_id: &str) -> Result<()> {
        let mut state = self.state.write();
        state.sessions.retain(|_, session| session.user_id != user_id);
        Ok(())
    }

    async fn set_password(&self, user_id: &str, new_password: &str) -> Result<()> {
        let mut state = self.state.write();
        if !state.users.contains_key(user_id) {
            return Err(Error::NotFound(format!("user {user_id}")));
        }
        state
            .passwords
            .insert(user_id.to_string(), new_password.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, email: &str, role: Option<&str>) -> User {
        let now = Utc::now();
        User {
            id: id.to_string(),
            name: id.to_string(),
            email: email.to_string(),
            image: None,
            role: role.map(str::to_string),
            banned: false,
            ban_reason: None,
            ban_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_sign_in_and_session_lookup() {
        let provider = MemoryAuthProvider::new();
        provider.add_user(user("u1", "dana@example.com", Some("admin")), "secret12");

        let principal = provider.sign_in("dana@example.com", "secret12").await.unwrap();
        assert_eq!(principal.user.id, "u1");

        let resolved = provider
            .session_from_token(&principal.session.token)
            .await
            .unwrap();
        assert!(resolved.is_some());

        provider.sign_out(&principal.session.token).await.unwrap();
        let resolved = provider
            .session_from_token(&principal.session.token)
            .await
            .unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_sign_in_rejects_bad_credentials_and_bans() {
        let provider = MemoryAuthProvider::new();
        provider.add_user(user("u1", "dana@example.com", None), "secret12");

        assert!(provider.sign_in("dana@example.com", "wrong").await.is_err());

        provider
            .ban_user(BanRequest {
                user_id: "u1".to_string(),
                reason: Some("spam".to_string()),
                expires_in: None,
            })
            .await
            .unwrap();
        assert!(provider.sign_in("dana@example.com", "secret12").await.is_err());
    }

    #[tokio::test]
    async fn test_ban_terminates_sessions() {
        let provider = MemoryAuthProvider::new();
        provider.add_user(user("u1", "a@example.com", None), "secret12");
        provider.open_session("u1").unwrap();
        provider.open_session("u1").unwrap();

        provider
            .ban_user(BanRequest {
                user_id: "u1".to_string(),
                reason: None,
                expires_in: Some(Duration::hours(1)),
            })
            .await
            .unwrap();

        let sessions = provider.list_user_sessions("u1").await.unwrap();
        assert!(sessions.is_empty());
        let banned = provider.get_user("u1").await.unwrap().unwrap();
        assert!(banned.banned);
        assert!(banned.ban_expires_at.is_some());
    }

    #[tokio::test]
    async fn test_list_users_sort_and_limit() {
        let provider = MemoryAuthProvider::new();
        for (id, email) in [("u1", "a@x.com"), ("u2", "b@x.com"), ("u3", "c@x.com")] {
            provider.add_user(user(id, email, None), "secret12");
        }
        let users = provider
            .list_users(ListUsersQuery::default().sorted_by("email", false).with_limit(2))
            .await
            .unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email, "a@x.com");
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let provider = MemoryAuthProvider::new();
        provider.add_user(user("u1", "dana@example.com", None), "secret12");
        let result = provider
            .create_user(NewUser {
                name: "Dana Two".to_string(),
                email: "DANA@example.com".to_string(),
                password: "password1".to_string(),
                role: "user".to_string(),
            })
            .await;
        assert!(result.is_err());
    }
}

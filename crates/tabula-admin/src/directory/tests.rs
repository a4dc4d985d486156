use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use tabula_core::{Error, Result, Value};
use tabula_grid::Record;

use super::*;
use crate::memory::MemoryAuthProvider;
use crate::provider::{
    AuthProvider, BanRequest, ListUsersQuery, NewUser, Session, SessionPrincipal, User,
};

// ============================================================================
// Fixtures
// ============================================================================

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).single().unwrap()
}

fn user(id: &str, name: &str, role: Option<&str>, created_days_ago: i64) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{id}@example.com"),
        image: None,
        role: role.map(str::to_string),
        banned: false,
        ban_reason: None,
        ban_expires_at: None,
        created_at: now() - Duration::days(created_days_ago),
        updated_at: now() - Duration::days(created_days_ago),
    }
}

/// Two users: an admin with one live and one expired session, and a
/// banned regular user with no sessions.
fn seeded_provider() -> MemoryAuthProvider {
    let provider = MemoryAuthProvider::new().with_session_ttl(Duration::hours(24));
    provider.add_user(user("u1", "Dana", Some("Admin, auditor"), 30), "secret12");
    provider.add_user(
        User {
            banned: true,
            ban_reason: Some("spam".to_string()),
            ..user("u2", "Avi", None, 2)
        },
        "secret12",
    );
    // Live session (expires in 24h) and one created two days ago,
    // already expired.
    provider.open_session_at("u1", now() - Duration::hours(1)).unwrap();
    provider.open_session_at("u1", now() - Duration::days(2)).unwrap();
    provider
}

async fn seeded_dataset() -> AdminDataset {
    let directory = AdminDirectory::new(Arc::new(seeded_provider()));
    directory.load().await.unwrap()
}

// ============================================================================
// Row projections
// ============================================================================

mod rows {
    use super::*;

    #[tokio::test]
    async fn test_user_rows_join_sessions_and_roles() {
        let dataset = seeded_dataset().await;
        let rows = AdminDirectory::user_rows(&dataset, now());
        assert_eq!(rows.len(), 2);

        let dana = rows.iter().find(|r| r.id == "u1").unwrap();
        assert_eq!(dana.role, "admin");
        assert_eq!(dana.roles, vec!["admin", "auditor"]);
        assert_eq!(dana.active_sessions, 1);
        assert_eq!(dana.total_sessions, 2);
        assert_eq!(dana.last_active_at, Some(now() - Duration::hours(1)));
        assert!(!dana.banned);

        let avi = rows.iter().find(|r| r.id == "u2").unwrap();
        assert_eq!(avi.role, "user");
        assert_eq!(avi.active_sessions, 0);
        assert_eq!(avi.total_sessions, 0);
        assert_eq!(avi.last_active_at, None);
        assert!(avi.banned);
    }

    #[tokio::test]
    async fn test_user_row_computed_fields() {
        let dataset = seeded_dataset().await;
        let rows = AdminDirectory::user_rows(&dataset, now());
        let dana = rows.iter().find(|r| r.id == "u1").unwrap();
        let avi = rows.iter().find(|r| r.id == "u2").unwrap();

        assert_eq!(dana.field("banStatus"), Value::from("active"));
        assert_eq!(dana.field("status"), Value::from("online"));
        assert_eq!(avi.field("banStatus"), Value::from("banned"));
        assert_eq!(avi.field("status"), Value::from("offline"));
        assert_eq!(dana.field("nonexistent"), Value::Null);
        assert_eq!(dana.record_id(), Some("u1".to_string()));
    }

    #[tokio::test]
    async fn test_session_rows_newest_first_with_status() {
        let dataset = seeded_dataset().await;
        let rows = AdminDirectory::session_rows(&dataset, now());
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].created_at, now() - Duration::hours(1));
        assert_eq!(rows[0].status, SessionStatus::Active);
        assert_eq!(rows[0].user_name, "Dana");
        assert_eq!(rows[0].user_email, "u1@example.com");

        assert_eq!(rows[1].status, SessionStatus::Expired);
        assert_eq!(rows[1].field("status"), Value::from("EXPIRED"));
        // 24h TTL
        assert_eq!(rows[1].duration_minutes(), 24 * 60);
    }

    #[test]
    fn test_session_row_tolerates_unknown_user() {
        let session = Session {
            id: "s1".to_string(),
            token: "tok".to_string(),
            user_id: "ghost".to_string(),
            ip_address: None,
            user_agent: None,
            created_at: now(),
            updated_at: now(),
            expires_at: now() + Duration::hours(1),
        };
        let dataset = AdminDataset {
            users: Vec::new(),
            sessions_by_user: [("ghost".to_string(), vec![session])].into(),
        };
        let rows = AdminDirectory::session_rows(&dataset, now());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_name, "");
        assert_eq!(rows[0].user_email, "");
    }
}

// ============================================================================
// Overview stats
// ============================================================================

mod overview {
    use super::*;

    #[tokio::test]
    async fn test_overview_counts() {
        let dataset = seeded_dataset().await;
        let overview = AdminDirectory::overview(&dataset, now());

        assert_eq!(overview.total_users, 2);
        assert_eq!(overview.admin_users, 1);
        assert_eq!(overview.regular_users, 1);
        assert_eq!(overview.total_sessions, 2);
        assert_eq!(overview.active_sessions, 1);
        assert_eq!(overview.expired_sessions, 1);
        assert_eq!(overview.active_users, 1);
        assert_eq!(overview.banned_users, 1);
        // u2 was created two days ago; u1 thirty days ago
        assert_eq!(overview.recent_signups, 1);
        assert_eq!(overview.average_sessions_per_user, 1.0);
    }

    #[test]
    fn test_overview_empty_dataset() {
        let overview = AdminDirectory::overview(&AdminDataset::default(), now());
        assert_eq!(overview.total_users, 0);
        assert_eq!(overview.average_sessions_per_user, 0.0);
    }

    #[tokio::test]
    async fn test_average_sessions_rounds_to_two_decimals() {
        let provider = MemoryAuthProvider::new();
        for id in ["u1", "u2", "u3"] {
            provider.add_user(user(id, id, None, 1), "secret12");
        }
        provider.open_session("u1").unwrap();
        provider.open_session("u1").unwrap();
        // 2 sessions / 3 users
        let directory = AdminDirectory::new(Arc::new(provider));
        let dataset = directory.load().await.unwrap();
        let overview = AdminDirectory::overview(&dataset, Utc::now());
        assert_eq!(overview.average_sessions_per_user, 0.67);
    }

    #[tokio::test]
    async fn test_banned_user_with_live_session_is_not_active() {
        let provider = MemoryAuthProvider::new();
        provider.add_user(user("u1", "Dana", None, 1), "secret12");
        provider.open_session("u1").unwrap();
        let provider = Arc::new(provider);
        provider
            .ban_user(BanRequest {
                user_id: "u1".to_string(),
                reason: None,
                expires_in: None,
            })
            .await
            .unwrap();
        // MemoryAuthProvider drops sessions on ban; re-open one to
        // exercise the banned-with-live-session case directly.
        let dataset = AdminDataset {
            users: provider.list_users(ListUsersQuery::default()).await.unwrap(),
            sessions_by_user: [(
                "u1".to_string(),
                vec![Session {
                    id: "s1".to_string(),
                    token: "tok".to_string(),
                    user_id: "u1".to_string(),
                    ip_address: None,
                    user_agent: None,
                    created_at: now(),
                    updated_at: now(),
                    expires_at: now() + Duration::hours(1),
                }],
            )]
            .into(),
        };
        let overview = AdminDirectory::overview(&dataset, now());
        assert_eq!(overview.active_sessions, 1);
        assert_eq!(overview.active_users, 0);
    }
}

// ============================================================================
// Load failure handling
// ============================================================================

mod loading {
    use super::*;

    /// Delegates to an inner provider but fails selectively.
    struct FlakyProvider {
        inner: MemoryAuthProvider,
        fail_user_list: bool,
        fail_sessions_for: Option<String>,
    }

    #[async_trait::async_trait]
    impl AuthProvider for FlakyProvider {
        async fn sign_in(&self, email: &str, password: &str) -> Result<SessionPrincipal> {
            self.inner.sign_in(email, password).await
        }

        async fn sign_out(&self, token: &str) -> Result<()> {
            self.inner.sign_out(token).await
        }

        async fn session_from_token(&self, token: &str) -> Result<Option<SessionPrincipal>> {
            self.inner.session_from_token(token).await
        }

        async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
            self.inner.get_user(user_id).await
        }

        async fn list_users(&self, query: ListUsersQuery) -> Result<Vec<User>> {
            if self.fail_user_list {
                return Err(Error::Provider("backend unavailable".to_string()));
            }
            self.inner.list_users(query).await
        }

        async fn list_user_sessions(&self, user_id: &str) -> Result<Vec<Session>> {
            if self.fail_sessions_for.as_deref() == Some(user_id) {
                return Err(Error::Provider("backend unavailable".to_string()));
            }
            self.inner.list_user_sessions(user_id).await
        }

        async fn create_user(&self, new_user: NewUser) -> Result<User> {
            self.inner.create_user(new_user).await
        }

        async fn ban_user(&self, request: BanRequest) -> Result<()> {
            self.inner.ban_user(request).await
        }

        async fn unban_user(&self, user_id: &str) -> Result<()> {
            self.inner.unban_user(user_id).await
        }

        async fn remove_user(&self, user_id: &str) -> Result<()> {
            self.inner.remove_user(user_id).await
        }

        async fn revoke_user_sessions(&self, user_id: &str) -> Result<()> {
            self.inner.revoke_user_sessions(user_id).await
        }

        async fn set_password(&self, user_id: &str, new_password: &str) -> Result<()> {
            self.inner.set_password(user_id, new_password).await
        }
    }

    #[tokio::test]
    async fn test_session_failure_degrades_to_empty_list() {
        let provider = FlakyProvider {
            inner: seeded_provider(),
            fail_user_list: false,
            fail_sessions_for: Some("u1".to_string()),
        };
        let directory = AdminDirectory::new(Arc::new(provider));
        let dataset = directory.load().await.unwrap();

        assert_eq!(dataset.users.len(), 2);
        assert!(dataset.sessions_by_user.get("u1").unwrap().is_empty());
        let rows = AdminDirectory::user_rows(&dataset, now());
        let dana = rows.iter().find(|r| r.id == "u1").unwrap();
        assert_eq!(dana.total_sessions, 0);
    }

    #[tokio::test]
    async fn test_user_list_failure_propagates() {
        let provider = FlakyProvider {
            inner: seeded_provider(),
            fail_user_list: true,
            fail_sessions_for: None,
        };
        let directory = AdminDirectory::new(Arc::new(provider));
        assert!(directory.load().await.is_err());
    }

    #[tokio::test]
    async fn test_load_orders_users_newest_first() {
        let dataset = seeded_dataset().await;
        assert_eq!(dataset.users[0].id, "u2");
        assert_eq!(dataset.users[1].id, "u1");
    }
}

// ============================================================================
// Display helpers and column sets
// ============================================================================

mod display {
    use super::*;

    #[test]
    fn test_truncate_token() {
        assert_eq!(truncate_token("abcdefghij"), "abcdefgh...");
        assert_eq!(truncate_token("short"), "short");
        assert_eq!(truncate_token("exactly8"), "exactly8");
    }

    #[test]
    fn test_format_session_duration() {
        assert_eq!(format_session_duration(45), "45m");
        assert_eq!(format_session_duration(60), "1h 0m");
        assert_eq!(format_session_duration(150), "2h 30m");
    }

    #[test]
    fn test_session_status_from_expiry() {
        assert_eq!(
            SessionStatus::from_expiry(now() + Duration::seconds(1), now()),
            SessionStatus::Active
        );
        assert_eq!(
            SessionStatus::from_expiry(now(), now()),
            SessionStatus::Expired
        );
    }

    #[test]
    fn test_column_sets() {
        let users = user_columns();
        assert!(users.iter().any(|c| c.column_id() == "banStatus"));
        assert!(users.iter().any(|c| c.column_id() == "role"));

        let sessions = session_columns();
        let token = sessions.iter().find(|c| c.column_id() == "token").unwrap();
        assert!(!token.filtering_enabled());
        assert!(token.cell_renderer().is_some());
        let duration = sessions.iter().find(|c| c.column_id() == "duration").unwrap();
        assert_eq!(duration.accessor_key(), "durationMinutes");
    }
}

use chrono::{Duration, Utc};

use super::*;
use crate::provider::{Session, SessionPrincipal, User};

// ============================================================================
// Fixtures
// ============================================================================

fn principal(role: Option<&str>, expired: bool) -> SessionPrincipal {
    let now = Utc::now();
    SessionPrincipal {
        user: User {
            id: "u1".to_string(),
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            image: None,
            role: role.map(str::to_string),
            banned: false,
            ban_reason: None,
            ban_expires_at: None,
            created_at: now,
            updated_at: now,
        },
        session: Session {
            id: "s1".to_string(),
            token: "tok".to_string(),
            user_id: "u1".to_string(),
            ip_address: None,
            user_agent: None,
            created_at: now - Duration::hours(2),
            updated_at: now - Duration::hours(2),
            expires_at: if expired {
                now - Duration::hours(1)
            } else {
                now + Duration::hours(1)
            },
        },
    }
}

fn guard() -> RouteGuard {
    RouteGuard::default()
}

// ============================================================================
// Route matching
// ============================================================================

mod matching {
    use super::*;

    #[test]
    fn test_root_matches_only_itself() {
        assert!(matches_route("/", "/"));
        assert!(!matches_route("/", "/login"));
        assert!(!matches_route("/", "/admin/users"));
    }

    #[test]
    fn test_prefix_matching_respects_segment_boundaries() {
        assert!(matches_route("/admin", "/admin"));
        assert!(matches_route("/admin", "/admin/users"));
        assert!(matches_route("/admin", "/admin/sessions/abc"));
        assert!(!matches_route("/admin", "/administrator"));
        assert!(!matches_route("/admin", "/adm"));
    }
}

// ============================================================================
// Callback URL sanitizing
// ============================================================================

mod callbacks {
    use super::*;

    #[test]
    fn test_sanitize_callback_url() {
        assert_eq!(sanitize_callback_url(Some("/dashboard")), "/dashboard");
        assert_eq!(sanitize_callback_url(Some("/admin/users?page=2")), "/admin/users?page=2");
        assert_eq!(sanitize_callback_url(Some("//evil.com")), "/");
        assert_eq!(sanitize_callback_url(Some("https://evil.com")), "/");
        assert_eq!(sanitize_callback_url(Some("dashboard")), "/");
        assert_eq!(sanitize_callback_url(Some("")), "/");
        assert_eq!(sanitize_callback_url(None), "/");
    }
}

// ============================================================================
// Guard decisions
// ============================================================================

mod decisions {
    use super::*;

    #[test]
    fn test_public_routes_allow_everyone() {
        let guard = guard();
        let now = Utc::now();
        assert_eq!(guard.decide("/", None, now), RouteDecision::Allow);
        assert_eq!(guard.decide("/register", None, now), RouteDecision::Allow);
        assert_eq!(
            guard.decide("/", Some(&principal(Some("user"), false)), now),
            RouteDecision::Allow
        );
    }

    #[test]
    fn test_login_bounces_authenticated_users() {
        let guard = guard();
        let now = Utc::now();
        assert_eq!(guard.decide("/login", None, now), RouteDecision::Allow);
        assert_eq!(
            guard.decide("/login", Some(&principal(Some("user"), false)), now),
            RouteDecision::Redirect { to: "/".to_string() }
        );
    }

    #[test]
    fn test_authenticated_routes_require_session() {
        let guard = guard();
        let now = Utc::now();
        assert_eq!(
            guard.decide("/dashboard", None, now),
            RouteDecision::RedirectToLogin {
                callback_url: "/dashboard".to_string()
            }
        );
        assert_eq!(
            guard.decide("/dashboard", Some(&principal(Some("user"), false)), now),
            RouteDecision::Allow
        );
    }

    #[test]
    fn test_expired_session_counts_as_logged_out() {
        let guard = guard();
        let now = Utc::now();
        assert_eq!(
            guard.decide("/dashboard", Some(&principal(Some("user"), true)), now),
            RouteDecision::RedirectToLogin {
                callback_url: "/dashboard".to_string()
            }
        );
    }

    #[test]
    fn test_admin_routes_require_admin_role() {
        let guard = guard();
        let now = Utc::now();
        assert_eq!(
            guard.decide("/admin/users", None, now),
            RouteDecision::RedirectToLogin {
                callback_url: "/admin/users".to_string()
            }
        );
        assert_eq!(
            guard.decide("/admin/users", Some(&principal(Some("user"), false)), now),
            RouteDecision::Redirect { to: "/".to_string() }
        );
        assert_eq!(
            guard.decide("/admin/users", Some(&principal(Some("Admin,auditor"), false)), now),
            RouteDecision::Allow
        );
    }

    #[test]
    fn test_unmatched_routes_default_to_authenticated() {
        let guard = guard();
        let now = Utc::now();
        assert_eq!(
            guard.decide("/settings/profile", None, now),
            RouteDecision::RedirectToLogin {
                callback_url: "/settings/profile".to_string()
            }
        );
        assert_eq!(
            guard.decide("/settings/profile", Some(&principal(None, false)), now),
            RouteDecision::Allow
        );
    }
}

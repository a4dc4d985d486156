//! Route guard implementation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::SessionPrincipal;
use crate::roles::has_admin_role;

/// Route classification table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    /// Reachable without a session
    pub public: Vec<String>,
    /// Require a live session
    pub authenticated: Vec<String>,
    /// Require a live session with the admin role
    pub admin: Vec<String>,
    /// Where unauthenticated requests bounce to
    pub login_route: String,
    /// Where logged-in users land when bounced off the login route
    pub authenticated_redirect: String,
    /// Where non-admins land when blocked from an admin route
    pub unauthorized_redirect: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            public: vec!["/".to_string(), "/login".to_string(), "/register".to_string()],
            authenticated: vec!["/dashboard".to_string(), "/account".to_string()],
            admin: vec!["/admin".to_string()],
            login_route: "/login".to_string(),
            authenticated_redirect: "/".to_string(),
            unauthorized_redirect: "/".to_string(),
        }
    }
}

/// Whether `path` falls under `pattern`
///
/// "/" matches only itself; any other pattern matches exactly or as a
/// "/"-boundary prefix ("/admin" covers "/admin/users" but not
/// "/administrator").
pub fn matches_route(pattern: &str, path: &str) -> bool {
    if pattern == "/" {
        return path == "/";
    }
    path == pattern
        || (path.starts_with(pattern) && path.as_bytes().get(pattern.len()) == Some(&b'/'))
}

/// Clamp a post-login callback URL to a safe internal path
///
/// Only same-origin absolute paths survive; anything else (empty,
/// relative, protocol-relative "//evil.com") falls back to "/".
pub fn sanitize_callback_url(raw: Option<&str>) -> String {
    match raw {
        Some(url) if url.starts_with('/') && !url.starts_with("//") => url.to_string(),
        _ => "/".to_string(),
    }
}

/// What to do with a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteDecision {
    Allow,
    /// Bounce to the login route, preserving where the user was headed
    RedirectToLogin { callback_url: String },
    Redirect { to: String },
}

/// Applies a [`RouteTable`] to incoming paths
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    table: RouteTable,
}

impl RouteGuard {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Decide whether `path` is allowed for the given principal
    ///
    /// Unmatched paths are treated as authenticated: everything not
    /// explicitly public needs a session.
    pub fn decide(
        &self,
        path: &str,
        principal: Option<&SessionPrincipal>,
        now: DateTime<Utc>,
    ) -> RouteDecision {
        let live = principal.filter(|p| p.session.is_active(now));

        // Logged-in users have no business on the login page
        if matches_route(&self.table.login_route, path) {
            return match live {
                Some(_) => RouteDecision::Redirect {
                    to: self.table.authenticated_redirect.clone(),
                },
                None => RouteDecision::Allow,
            };
        }

        if self.table.admin.iter().any(|p| matches_route(p, path)) {
            return match live {
                Some(principal) if has_admin_role(principal.user.role.as_deref()) => {
                    RouteDecision::Allow
                }
                Some(_) => {
                    tracing::warn!(path, "non-admin blocked from admin route");
                    RouteDecision::Redirect {
                        to: self.table.unauthorized_redirect.clone(),
                    }
                }
                None => RouteDecision::RedirectToLogin {
                    callback_url: sanitize_callback_url(Some(path)),
                },
            };
        }

        if self.table.public.iter().any(|p| matches_route(p, path)) {
            return RouteDecision::Allow;
        }

        match live {
            Some(_) => RouteDecision::Allow,
            None => RouteDecision::RedirectToLogin {
                callback_url: sanitize_callback_url(Some(path)),
            },
        }
    }
}

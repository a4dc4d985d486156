//! Role string normalization
//!
//! Providers report roles as a single free-form string, possibly a
//! comma-separated list with stray whitespace and mixed case.

/// Split, trim, and lowercase a raw role value
pub fn normalize_roles(role: Option<&str>) -> Vec<String> {
    role.map(|raw| {
        raw.split(',')
            .map(|part| part.trim().to_lowercase())
            .filter(|part| !part.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Whether the raw role value includes the admin role
pub fn has_admin_role(role: Option<&str>) -> bool {
    normalize_roles(role).iter().any(|r| r == "admin")
}

/// First normalized role, falling back to "user"
pub fn primary_role(role: Option<&str>) -> String {
    normalize_roles(role)
        .into_iter()
        .next()
        .unwrap_or_else(|| "user".to_string())
}

//! Admin actions implementation

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::{AuthProvider, BanRequest, NewUser, SessionPrincipal, User};
use crate::roles::has_admin_role;

/// Reason recorded when a ban request carries none
pub const DEFAULT_BAN_REASON: &str = "No reason";

/// Bounds for new-user passwords
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Outcome of an admin action
///
/// Actions never fail with an error value; refusals and backend
/// failures come back as `success: false` with a displayable `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Assignable role for new users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// Input for [`AdminActions::create_user`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

impl CreateUserInput {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().chars().count() < 2 {
            return Err("Name must be at least 2 characters".to_string());
        }
        if !plausible_email(&self.email) {
            return Err("Invalid email address".to_string());
        }
        let password_len = self.password.chars().count();
        if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&password_len) {
            return Err(format!(
                "Password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
            ));
        }
        Ok(())
    }
}

/// Input for [`AdminActions::ban_user`]
#[derive(Debug, Clone, PartialEq)]
pub struct BanUserInput {
    pub user_id: String,
    pub reason: Option<String>,
    /// Ban lifts automatically after this long; `None` is indefinite
    pub expires_in: Option<Duration>,
}

fn plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Admin operations on user accounts, guarded by the acting principal
pub struct AdminActions {
    provider: Arc<dyn AuthProvider>,
}

impl AdminActions {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// The actor must hold the admin role on a live session
    fn require_admin(&self, actor: &SessionPrincipal) -> Result<(), String> {
        if !actor.session.is_active(Utc::now()) {
            return Err("Session expired".to_string());
        }
        if !has_admin_role(actor.user.role.as_deref()) {
            return Err("Unauthorized: admin access required".to_string());
        }
        Ok(())
    }

    /// Guards for actions that disable or destroy an account: no
    /// self-targeting, the target must exist, and admins are off-limits
    async fn ensure_can_disable_target(
        &self,
        actor: &SessionPrincipal,
        target_id: &str,
    ) -> Result<User, String> {
        if target_id == actor.user.id {
            return Err("You cannot perform this action on your own account".to_string());
        }
        let target = match self.provider.get_user(target_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err("User not found".to_string()),
            Err(error) => return Err(error.to_string()),
        };
        if has_admin_role(target.role.as_deref()) {
            return Err("Admin accounts cannot be modified".to_string());
        }
        Ok(target)
    }

    pub async fn create_user(
        &self,
        actor: &SessionPrincipal,
        input: CreateUserInput,
    ) -> ActionResult {
        if let Err(reason) = self.require_admin(actor) {
            return ActionResult::err(reason);
        }
        if let Err(reason) = input.validate() {
            return ActionResult::err(reason);
        }
        let new_user = NewUser {
            name: input.name.trim().to_string(),
            email: input.email.clone(),
            password: input.password,
            role: input.role.as_str().to_string(),
        };
        match self.provider.create_user(new_user).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, actor = %actor.user.id, "user created");
                ActionResult::ok(format!("User {} created", user.email))
            }
            Err(error) => {
                tracing::warn!(%error, "create user failed");
                ActionResult::err(error.to_string())
            }
        }
    }

    pub async fn ban_user(&self, actor: &SessionPrincipal, input: BanUserInput) -> ActionResult {
        if let Err(reason) = self.require_admin(actor) {
            return ActionResult::err(reason);
        }
        let target = match self.ensure_can_disable_target(actor, &input.user_id).await {
            Ok(target) => target,
            Err(reason) => return ActionResult::err(reason),
        };
        let request = BanRequest {
            user_id: input.user_id,
            reason: Some(
                input
                    .reason
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_BAN_REASON.to_string()),
            ),
            expires_in: input.expires_in,
        };
        match self.provider.ban_user(request).await {
            Ok(()) => {
                tracing::info!(user_id = %target.id, actor = %actor.user.id, "user banned");
                ActionResult::ok(format!("User {} banned", target.email))
            }
            Err(error) => {
                tracing::warn!(%error, "ban user failed");
                ActionResult::err(error.to_string())
            }
        }
    }

    pub async fn unban_user(&self, actor: &SessionPrincipal, user_id: &str) -> ActionResult {
        if let Err(reason) = self.require_admin(actor) {
            return ActionResult::err(reason);
        }
        match self.provider.unban_user(user_id).await {
            Ok(()) => {
                tracing::info!(user_id, actor = %actor.user.id, "user unbanned");
                ActionResult::ok("User unbanned")
            }
            Err(error) => {
                tracing::warn!(%error, "unban user failed");
                ActionResult::err(error.to_string())
            }
        }
    }

    pub async fn remove_user(&self, actor: &SessionPrincipal, user_id: &str) -> ActionResult {
        if let Err(reason) = self.require_admin(actor) {
            return ActionResult::err(reason);
        }
        let target = match self.ensure_can_disable_target(actor, user_id).await {
            Ok(target) => target,
            Err(reason) => return ActionResult::err(reason),
        };
        match self.provider.remove_user(user_id).await {
            Ok(()) => {
                tracing::info!(user_id, actor = %actor.user.id, "user removed");
                ActionResult::ok(format!("User {} removed", target.email))
            }
            Err(error) => {
                tracing::warn!(%error, "remove user failed");
                ActionResult::err(error.to_string())
            }
        }
    }

    pub async fn revoke_user_sessions(
        &self,
        actor: &SessionPrincipal,
        user_id: &str,
    ) -> ActionResult {
        if let Err(reason) = self.require_admin(actor) {
            return ActionResult::err(reason);
        }
        if let Err(reason) = self.ensure_can_disable_target(actor, user_id).await {
            return ActionResult::err(reason);
        }
        match self.provider.revoke_user_sessions(user_id).await {
            Ok(()) => {
                tracing::info!(user_id, actor = %actor.user.id, "sessions revoked");
                ActionResult::ok("Sessions revoked")
            }
            Err(error) => {
                tracing::warn!(%error, "revoke sessions failed");
                ActionResult::err(error.to_string())
            }
        }
    }

    pub async fn set_user_password(
        &self,
        actor: &SessionPrincipal,
        user_id: &str,
        new_password: &str,
    ) -> ActionResult {
        if let Err(reason) = self.require_admin(actor) {
            return ActionResult::err(reason);
        }
        if let Err(reason) = self.ensure_can_disable_target(actor, user_id).await {
            return ActionResult::err(reason);
        }
        let password_len = new_password.chars().count();
        if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&password_len) {
            return ActionResult::err(format!(
                "Password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
            ));
        }
        match self.provider.set_password(user_id, new_password).await {
            Ok(()) => {
                tracing::info!(user_id, actor = %actor.user.id, "password reset");
                ActionResult::ok("Password updated")
            }
            Err(error) => {
                tracing::warn!(%error, "set password failed");
                ActionResult::err(error.to_string())
            }
        }
    }
}

//! Auth service
//!
//! Credential verification, token lifecycle and password management.
//! Every failure on the login path collapses into the same generic
//! `AuthenticationFailure` so the API cannot be used to probe which
//! accounts exist or which are disabled.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{password, token, Actor};
use crate::config::AuthConfig;
use crate::error::{AppError, AppResult, OptionExt};
use crate::permission;
use crate::store::EmployeeStore;

/// Successful login: token plus the actor snapshot it encodes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSuccess {
    pub token: String,
    #[serde(skip)]
    pub actor: Actor,
    pub must_change_password: bool,
    pub expires_in_hours: i64,
}

pub struct AuthService {
    store: Arc<dyn EmployeeStore>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn EmployeeStore>, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Authenticate by email and password, issuing a session token.
    pub async fn authenticate(&self, email: &str, plain: &str) -> AppResult<LoginSuccess> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || plain.is_empty() {
            return Err(AppError::AuthenticationFailure);
        }

        let Some(record) = self.store.find_by_email(&email).await? else {
            tracing::warn!("login failed: unknown account");
            return Err(AppError::AuthenticationFailure);
        };

        if !password::verify_password(plain, &record.password) {
            tracing::warn!(employee = %record.id, "login failed: bad credentials");
            return Err(AppError::AuthenticationFailure);
        }

        if !record.is_active {
            tracing::warn!(employee = %record.id, "login failed: inactive account");
            return Err(AppError::AuthenticationFailure);
        }

        let claims = token::Claims::for_employee(&record, self.config.token_ttl_hours);
        let token = token::issue(&claims, &self.config.token_secret)?;

        tracing::info!(employee = %record.id, "login succeeded");
        Ok(LoginSuccess {
            token,
            actor: Actor::from_record(&record),
            must_change_password: record.must_change_password,
            expires_in_hours: self.config.token_ttl_hours,
        })
    }

    /// Verify a session token and rebuild the actor snapshot from the
    /// current record, so a deleted or deactivated account is rejected even
    /// while its token is still within the validity window.
    pub async fn verify_token(&self, raw: &str) -> AppResult<Actor> {
        let claims = token::verify(raw, &self.config.token_secret)?;

        let Some(record) = self.store.find_by_id(claims.sub).await? else {
            return Err(AppError::AuthenticationFailure);
        };
        if !record.is_active {
            return Err(AppError::AuthenticationFailure);
        }

        Ok(Actor::from_record(&record))
    }

    /// Change the actor's own password. Clears the must-change flag.
    pub async fn change_password(
        &self,
        actor: &Actor,
        current: &str,
        new: &str,
    ) -> AppResult<()> {
        let mut record = self
            .store
            .find_by_id(actor.id)
            .await?
            .ok_or_not_found("employee not found")?;

        if !password::verify_password(current, &record.password) {
            tracing::warn!(employee = %actor.id, "password change failed: bad current password");
            return Err(AppError::AuthenticationFailure);
        }

        if new.len() < 6 {
            return Err(AppError::Validation(
                "newPassword: must be at least 6 characters".into(),
            ));
        }
        if new == current {
            return Err(AppError::Validation(
                "newPassword: must differ from the current password".into(),
            ));
        }

        record.password = password::hash_password(new, self.config.bcrypt_cost)?;
        record.must_change_password = false;
        record.updated_at = Utc::now();
        self.store.update(record).await?;

        tracing::info!(employee = %actor.id, "password changed");
        Ok(())
    }

    /// Admin-only reset to the derived default password. Returns the new
    /// plaintext and re-arms the must-change flag.
    ///
    /// The deterministic default is the documented legacy contract; it is
    /// guessable and should not survive past the forced first-login change.
    pub async fn reset_password(&self, actor: &Actor, target_id: Uuid) -> AppResult<String> {
        if !permission::can_reset_password(actor) {
            tracing::warn!(actor = %actor.id, employee = %target_id, "password reset denied");
            return Err(AppError::PermissionDenied(
                "only admin may reset passwords".into(),
            ));
        }

        let mut record = self
            .store
            .find_by_id(target_id)
            .await?
            .ok_or_not_found("employee not found")?;

        let new_default = password::default_password(&record.first_name, &record.employee_number);
        record.password = password::hash_password(&new_default, self.config.bcrypt_cost)?;
        record.must_change_password = true;
        record.updated_at = Utc::now();
        self.store.update(record).await?;

        tracing::info!(actor = %actor.id, employee = %target_id, "password reset");
        Ok(new_default)
    }
}

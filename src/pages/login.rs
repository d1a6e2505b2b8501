//! Login page: clears stale tokens on load, then signs in.

use super::{FormError, require};
use crate::state::session::SessionStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    /// Both fields are required.
    ///
    /// # Errors
    ///
    /// [`FormError::Missing`] naming the first blank field.
    pub fn validate(&self) -> Result<(), FormError> {
        require("username", &self.username)?;
        require("password", &self.password)
    }
}

pub struct LoginPage<'a> {
    store: &'a SessionStore,
}

impl<'a> LoginPage<'a> {
    #[must_use]
    pub fn new(store: &'a SessionStore) -> Self {
        Self { store }
    }

    /// Ask the backend to expire any leftover token cookies. Skipped until
    /// the base URL is known; failures are only logged.
    pub async fn on_load(&self) {
        let api = self.store.api();
        if !api.is_ready() {
            tracing::debug!("login page loaded before api is ready; not clearing tokens");
            return;
        }
        if let Err(e) = api.clear_tokens().await {
            tracing::warn!(error = %e, "token clear failed");
        }
    }

    /// Validate and sign in. On success the store has already navigated to
    /// the dashboard.
    pub async fn submit(&self, form: &LoginForm) -> bool {
        if let Err(e) = form.validate() {
            self.store.notifier().alert(&e.to_string());
            return false;
        }
        self.store.login(&form.username, &form.password).await
    }
}

#[cfg(test)]
#[path = "login_test.rs"]
mod tests;

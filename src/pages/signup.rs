//! Signup page.

use super::{FormError, require};
use crate::state::session::SessionStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignupForm {
    /// All four fields are required and `email` must look like an address.
    ///
    /// # Errors
    ///
    /// [`FormError::Missing`] for the first blank field, or
    /// [`FormError::InvalidEmail`].
    pub fn validate(&self) -> Result<(), FormError> {
        require("username", &self.username)?;
        require("name", &self.name)?;
        require("email", &self.email)?;
        require("password", &self.password)?;

        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(()),
            _ => Err(FormError::InvalidEmail(email.to_owned())),
        }
    }
}

pub struct SignupPage<'a> {
    store: &'a SessionStore,
}

impl<'a> SignupPage<'a> {
    #[must_use]
    pub fn new(store: &'a SessionStore) -> Self {
        Self { store }
    }

    /// Validate, register, and sign in. The store navigates on success.
    pub async fn submit(&self, form: &SignupForm) -> bool {
        if let Err(e) = form.validate() {
            self.store.notifier().alert(&e.to_string());
            return false;
        }
        self.store
            .signup(&form.username, form.email.trim(), &form.password, &form.name)
            .await
    }
}

#[cfg(test)]
#[path = "signup_test.rs"]
mod tests;

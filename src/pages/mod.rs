//! Page controllers.
//!
//! DESIGN
//! ======
//! Each page borrows the [`SessionStore`](crate::state::session::SessionStore)
//! and exposes the actions its screen offers (load, submit, search) plus a
//! plain-data view the binary renders. Pages hold no session state of their
//! own; they only keep what the screen itself shows (form input, catalog,
//! search results).

pub mod dashboard;
pub mod login;
pub mod signup;

/// Local form validation failure, raised before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),
}

/// `Err(Missing(field))` when `value` is blank.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), FormError> {
    if value.trim().is_empty() {
        return Err(FormError::Missing(field));
    }
    Ok(())
}

//! Client routes and the unauthenticated-redirect policy.
//!
//! DESIGN
//! ======
//! The policy is a pure function so it can be tested without a shell. The
//! session store applies it after each route-change identity check; the
//! shell performs the actual navigation. This is a coarse client-side gate
//! and not an authorization boundary: the backend still rejects requests.

use std::fmt;
use std::str::FromStr;

use crate::net::types::User;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    Dashboard,
    /// `/items/{id}` detail page.
    Item(String),
    /// Any other path, kept verbatim (normalized, without query).
    Other(String),
}

/// Routes reachable without an authenticated session.
pub const PUBLIC_ROUTES: [Route; 2] = [Route::Login, Route::Signup];

impl Route {
    /// Parse a path such as `/login`, `/items/abc?x=1` or `dashboard/`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let path = raw.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_matches('/');
        let mut segments = trimmed.split('/').filter(|s| !s.is_empty());

        match (segments.next(), segments.next(), segments.next()) {
            (Some("login"), None, _) => Self::Login,
            (Some("signup"), None, _) => Self::Signup,
            (Some("dashboard"), None, _) => Self::Dashboard,
            (Some("items"), Some(id), None) => Self::Item(id.to_owned()),
            _ => Self::Other(format!("/{trimmed}")),
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_owned(),
            Self::Signup => "/signup".to_owned(),
            Self::Dashboard => "/dashboard".to_owned(),
            Self::Item(id) => format!("/items/{id}"),
            Self::Other(path) => path.clone(),
        }
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        PUBLIC_ROUTES.contains(self)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Where the shell must send the user, if anywhere: `/login` when nobody is
/// signed in and `current` is not a public route.
#[must_use]
pub fn decide_redirect(current: &Route, identity: Option<&User>) -> Option<Route> {
    if identity.is_none() && !current.is_public() { Some(Route::Login) } else { None }
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;

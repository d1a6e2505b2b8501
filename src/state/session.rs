//! Session store: the single source of truth for "who is signed in".
//!
//! DESIGN
//! ======
//! `SessionStore` owns the [`Session`] and is the only thing that mutates
//! it. Network access goes through the injected [`ApiClient`]; navigation
//! and alerts go through the injected shell traits.
//!
//! States: `Unknown` (initial) resolves to `Authenticated` or
//! `Unauthenticated` after the first identity check. `Authenticated` drops
//! to `Unauthenticated` on logout or on a failed check. Only a successful
//! check (after login or signup) leaves `Unauthenticated`.
//!
//! CSRF
//! ====
//! The anti-forgery handshake is explicit: `GET /api/csrf/` primes the
//! `csrftoken` cookie, the store reads it back from the jar, and attaches it
//! as `X-CSRFToken` on the next mutating request.
//!
//! ERROR HANDLING
//! ==============
//! Identity failures fail closed to `Unauthenticated` without alerts (the
//! redirect tells the user). Login/signup rejections alert with the
//! backend's message; transport failures alert a generic communication
//! error. Logout never surfaces errors: local state is cleared regardless.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::config::load_runtime_config;
use crate::net::api::{ApiClient, ApiError};
use crate::net::cookies::SESSION_COOKIES;
use crate::net::types::{Role, SignupRequest, User};
use crate::routes::{Route, decide_redirect};
use crate::shell::{Navigator, Notifier};

pub const LOGIN_FAILED: &str = "Login failed";
pub const IDENTITY_FAILED: &str = "Could not load account details";
pub const COMMUNICATION_ERROR: &str = "Communication error";

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStatus {
    #[default]
    Unknown,
    Authenticated,
    Unauthenticated,
}

/// Authentication status plus the current user. `user` is present exactly
/// when the status is `Authenticated`; the constructors enforce it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    status: AuthStatus,
    user: Option<User>,
}

impl Session {
    #[must_use]
    pub fn authenticated(user: User) -> Self {
        Self { status: AuthStatus::Authenticated, user: Some(user) }
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self { status: AuthStatus::Unauthenticated, user: None }
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.status
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Tri-state view: `None` until the first identity check resolves.
    #[must_use]
    pub fn is_authenticated(&self) -> Option<bool> {
        match self.status {
            AuthStatus::Unknown => None,
            AuthStatus::Authenticated => Some(true),
            AuthStatus::Unauthenticated => Some(false),
        }
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.profile.role)
    }
}

// =============================================================================
// STORE
// =============================================================================

pub struct SessionStore {
    api: Arc<ApiClient>,
    session: RwLock<Session>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    config_attempted: AtomicBool,
}

impl SessionStore {
    #[must_use]
    pub fn new(api: Arc<ApiClient>, navigator: Arc<dyn Navigator>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, session: RwLock::new(Session::default()), navigator, notifier, config_attempted: AtomicBool::new(false) }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    #[must_use]
    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn status(&self) -> AuthStatus {
        self.session.read().await.status()
    }

    pub async fn is_authenticated(&self) -> Option<bool> {
        self.session.read().await.is_authenticated()
    }

    pub async fn user(&self) -> Option<User> {
        self.session.read().await.user().cloned()
    }

    pub async fn username(&self) -> Option<String> {
        self.session.read().await.username().map(str::to_owned)
    }

    pub async fn role(&self) -> Option<Role> {
        self.session.read().await.role()
    }

    async fn replace(&self, next: Session) {
        let mut session = self.session.write().await;
        if session.status != next.status {
            tracing::info!(from = ?session.status, to = ?next.status, "session status changed");
        }
        *session = next;
    }

    // =========================================================================
    // STARTUP / ROUTING
    // =========================================================================

    /// Resolve the backend base URL (once per store, no retry on failure),
    /// then run the route-change check for `current`.
    pub async fn start(&self, current: &Route) -> Option<Route> {
        if !self.api.is_ready() && !self.config_attempted.swap(true, Ordering::SeqCst) {
            match load_runtime_config(self.api.transport().as_ref(), self.api.origin()).await {
                Ok(runtime) => {
                    self.api.set_base_url(runtime.api_base_url);
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to load api config");
                }
            }
        }
        self.on_route_change(current).await
    }

    /// Re-validate the session for `route` and redirect to `/login` when
    /// nobody is signed in and the route is not public. Does nothing until
    /// the base URL is known. Returns the redirect target, if any.
    pub async fn on_route_change(&self, route: &Route) -> Option<Route> {
        if !self.api.is_ready() {
            tracing::debug!(%route, "route change before api is ready; skipping identity check");
            return None;
        }

        let identity = self.identity_check().await;
        let redirect = decide_redirect(route, identity.as_ref());
        if let Some(target) = &redirect {
            tracing::info!(from = %route, to = %target, "redirecting unauthenticated visitor");
            self.navigator.navigate(target);
        }
        redirect
    }

    /// Navigate to `route` and apply the route-change check. Returns the
    /// route the shell ends up on.
    pub async fn visit(&self, route: &Route) -> Route {
        self.navigator.navigate(route);
        self.on_route_change(route).await;
        self.navigator.current()
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Determine the current user. Fails closed: any failure leaves the
    /// session signed out. Before the base URL is known this returns `None`
    /// without touching state or the network.
    pub async fn identity_check(&self) -> Option<User> {
        if !self.api.is_ready() {
            return None;
        }

        match self.fetch_identity().await {
            Ok(user) => {
                tracing::debug!(username = %user.username, "identity check succeeded");
                self.replace(Session::authenticated(user.clone())).await;
                Some(user)
            }
            Err(ApiError::Unauthorized) => {
                tracing::debug!("identity check: not signed in");
                self.replace(Session::signed_out()).await;
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "identity check failed");
                self.replace(Session::signed_out()).await;
                None
            }
        }
    }

    async fn fetch_identity(&self) -> Result<User, ApiError> {
        self.api.prime_csrf().await?;
        self.api.me().await
    }

    /// Sign in and, on success, move to `/dashboard`. Returns whether the
    /// user ended up signed in. A rejected login leaves the session as it was.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        match self.submit_credentials(username, password).await {
            Ok(()) => {}
            Err(ApiError::Status { status, message }) => {
                tracing::warn!(status, %message, "login rejected");
                self.notifier.alert(LOGIN_FAILED);
                return false;
            }
            Err(e) => {
                tracing::error!(error = %e, "login request failed");
                self.notifier.alert(COMMUNICATION_ERROR);
                return false;
            }
        }

        if self.identity_check().await.is_none() {
            self.notifier.alert(IDENTITY_FAILED);
            return false;
        }

        self.navigator.navigate(&Route::Dashboard);
        true
    }

    async fn submit_credentials(&self, username: &str, password: &str) -> Result<(), ApiError> {
        self.api.prime_csrf().await?;
        let token = self.api.csrf_token();
        self.api.login(username, password, &token).await
    }

    /// Register, then sign in with the same credentials. Returns `true` only
    /// when both steps succeed.
    pub async fn signup(&self, username: &str, email: &str, password: &str, name: &str) -> bool {
        self.api.cookies().remove(&SESSION_COOKIES);

        let request = SignupRequest { username, email, password, name };
        match self.submit_registration(&request).await {
            Ok(()) => {}
            Err(ApiError::Status { status, message }) => {
                tracing::warn!(status, %message, "signup rejected");
                self.notifier.alert(&format!("Registration failed: {message}"));
                return false;
            }
            Err(e) => {
                tracing::error!(error = %e, "signup request failed");
                self.notifier.alert(COMMUNICATION_ERROR);
                return false;
            }
        }

        tracing::info!(%username, "account created; signing in");
        self.login(username, password).await
    }

    async fn submit_registration(&self, request: &SignupRequest<'_>) -> Result<(), ApiError> {
        self.api.prime_csrf().await?;
        let token = self.api.csrf_token();
        self.api.signup(request, &token).await
    }

    /// End the session. The backend call is best effort; cookies, in-memory
    /// state and the route are reset whatever it returns.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "logout request failed; clearing local session anyway");
        }
        self.api.cookies().remove(&SESSION_COOKIES);
        self.replace(Session::signed_out()).await;
        self.navigator.navigate(&Route::Login);
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

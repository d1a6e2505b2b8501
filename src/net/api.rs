//! API fetch wrapper and typed endpoint helpers.
//!
//! `ApiClient::fetch` is the single entry point to the backend: it joins the
//! resolved base URL with a path, attaches cookies via the transport, and
//! merges caller headers and body. Before the base URL is resolved every
//! call fails with [`ApiError::NotReady`] without touching the network.
//!
//! ERROR HANDLING
//! ==============
//! Helpers map responses onto the error taxonomy callers branch on:
//! transport failures, 401, other non-2xx with the backend's message,
//! undecodable payloads, and the not-ready precondition.

use std::sync::{Arc, OnceLock};

use reqwest::Method;
use url::Url;

use super::cookies::CookieJar;
use super::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use super::types::{ErrorBody, Item, LoginRequest, ProductItem, SearchResponse, SignupRequest, User};

pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("API not ready: backend base URL has not been resolved")]
    NotReady,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("not authenticated")]
    Unauthorized,
    #[error("request rejected with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response payload: {0}")]
    Decode(String),
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

// =============================================================================
// REQUEST OPTIONS
// =============================================================================

/// Caller-supplied request options merged into the outgoing request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

impl RequestOptions {
    #[must_use]
    pub fn get() -> Self {
        Self { method: Method::GET, headers: Vec::new(), body: None }
    }

    #[must_use]
    pub fn post() -> Self {
        Self { method: Method::POST, ..Self::get() }
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_owned(), value.into()));
        self
    }

    /// Attach a JSON body (sets `Content-Type: application/json`).
    #[must_use]
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self.header("Content-Type", "application/json")
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    cookies: Arc<CookieJar>,
    origin: Url,
    base_url: OnceLock<Url>,
}

impl ApiClient {
    /// `origin` is the front-end host that serves `/api/config` and the
    /// search proxy; the backend base URL is resolved later.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, cookies: Arc<CookieJar>, origin: Url) -> Self {
        Self { transport, cookies, origin, base_url: OnceLock::new() }
    }

    #[must_use]
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    #[must_use]
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    #[must_use]
    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    #[must_use]
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.get()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.base_url.get().is_some()
    }

    /// Resolve the backend base URL. Only the first call takes effect.
    pub fn set_base_url(&self, url: Url) -> bool {
        match self.base_url.set(url) {
            Ok(()) => {
                tracing::info!(base_url = %self.base_url.get().map_or("", Url::as_str), "api base url resolved");
                true
            }
            Err(rejected) => {
                tracing::warn!(%rejected, "api base url already resolved; ignoring");
                false
            }
        }
    }

    /// Join the resolved base URL with `path` by concatenation, so a base
    /// with a path prefix (`https://host/backend`) keeps its prefix.
    fn backend_url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base_url.get().ok_or(ApiError::NotReady)?;
        let joined = format!("{}{}", base.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{joined}: {e}")))
    }

    /// Send a request to `base_url + path` with credentials included.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotReady`] before the base URL is resolved, or
    /// [`ApiError::Transport`] if no response was received. Non-2xx
    /// statuses are returned as responses, not errors.
    pub async fn fetch(&self, path: &str, options: RequestOptions) -> Result<HttpResponse, ApiError> {
        let url = self.backend_url(path)?;
        self.send(url, options).await
    }

    async fn send(&self, url: Url, options: RequestOptions) -> Result<HttpResponse, ApiError> {
        let request = HttpRequest { method: options.method, url, headers: options.headers, body: options.body };
        Ok(self.transport.send(request).await?)
    }

    // =========================================================================
    // ENDPOINTS
    // =========================================================================

    /// `GET /api/csrf/`: asks the backend to (re)issue the `csrftoken` cookie.
    /// Only transport failures are errors; the status is not inspected.
    ///
    /// # Errors
    ///
    /// Not-ready or transport failures.
    pub async fn prime_csrf(&self) -> Result<(), ApiError> {
        let resp = self.fetch("/api/csrf/", RequestOptions::get()).await?;
        if !resp.is_success() {
            tracing::warn!(status = resp.status, "csrf priming returned non-success");
        }
        Ok(())
    }

    /// Current CSRF token from the cookie jar, empty when absent.
    #[must_use]
    pub fn csrf_token(&self) -> String {
        self.cookies.get(super::cookies::CSRF_COOKIE).unwrap_or_default()
    }

    /// `GET /api/me/`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthorized`] on 401, [`ApiError::Status`] on other
    /// non-2xx, [`ApiError::Decode`] if the payload is not a user.
    pub async fn me(&self) -> Result<User, ApiError> {
        let resp = self.fetch("/api/me/", RequestOptions::get()).await?;
        if resp.status == 401 {
            return Err(ApiError::Unauthorized);
        }
        if !resp.is_success() {
            return Err(status_error(&resp));
        }
        resp.json::<User>().map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `POST /api/login/` with the CSRF token attached.
    ///
    /// # Errors
    ///
    /// [`ApiError::Status`] on any non-2xx.
    pub async fn login(&self, username: &str, password: &str, csrf_token: &str) -> Result<(), ApiError> {
        let body = serde_json::to_value(LoginRequest { username, password }).map_err(|e| ApiError::Decode(e.to_string()))?;
        let options = RequestOptions::post().header(CSRF_HEADER, csrf_token).json(body);
        let resp = self.fetch("/api/login/", options).await?;
        if !resp.is_success() {
            return Err(status_error(&resp));
        }
        Ok(())
    }

    /// `POST /api/signup/` with the CSRF token attached. Only `201 Created`
    /// counts as success.
    ///
    /// # Errors
    ///
    /// [`ApiError::Status`] carrying the backend's `error` message for any
    /// other status, or [`ApiError::Decode`] if that error body is not JSON.
    pub async fn signup(&self, request: &SignupRequest<'_>, csrf_token: &str) -> Result<(), ApiError> {
        let body = serde_json::to_value(request).map_err(|e| ApiError::Decode(e.to_string()))?;
        let options = RequestOptions::post().header(CSRF_HEADER, csrf_token).json(body);
        let resp = self.fetch("/api/signup/", options).await?;
        if resp.status == 201 {
            return Ok(());
        }
        let error: ErrorBody = resp.json().map_err(|e| ApiError::Decode(e.to_string()))?;
        Err(ApiError::Status { status: resp.status, message: error.error.unwrap_or_default() })
    }

    /// `POST /api/logout/`.
    ///
    /// # Errors
    ///
    /// Not-ready, transport, or non-2xx.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let resp = self.fetch("/api/logout/", RequestOptions::post()).await?;
        if !resp.is_success() {
            return Err(status_error(&resp));
        }
        Ok(())
    }

    /// `POST /api/clear-tokens/`: asks the backend to expire every cookie it set.
    ///
    /// # Errors
    ///
    /// Not-ready, transport, or non-2xx.
    pub async fn clear_tokens(&self) -> Result<(), ApiError> {
        let resp = self.fetch("/api/clear-tokens/", RequestOptions::post()).await?;
        if !resp.is_success() {
            return Err(status_error(&resp));
        }
        Ok(())
    }

    /// `GET /api/items/`.
    ///
    /// # Errors
    ///
    /// Not-ready, transport, non-2xx, or an undecodable list.
    pub async fn items(&self) -> Result<Vec<Item>, ApiError> {
        let resp = self.fetch("/api/items/", RequestOptions::get()).await?;
        if resp.status == 401 {
            return Err(ApiError::Unauthorized);
        }
        if !resp.is_success() {
            return Err(status_error(&resp));
        }
        resp.json::<Vec<Item>>().map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `GET {origin}/api/amazon?keyword=&page=`: the front-end's local
    /// search proxy, which does not depend on the backend base URL.
    ///
    /// # Errors
    ///
    /// Transport, non-2xx (with the raw body as message), or a body that is
    /// not a JSON object.
    pub async fn search_products(&self, keyword: &str, page: u32) -> Result<Vec<ProductItem>, ApiError> {
        let mut url = self
            .origin
            .join("/api/amazon")
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("keyword", keyword)
            .append_pair("page", &page.to_string());

        let resp = self.send(url, RequestOptions::get()).await?;
        if !resp.is_success() {
            return Err(ApiError::Status { status: resp.status, message: resp.body });
        }
        let parsed: SearchResponse = resp.json().map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(parsed.into_items())
    }
}

fn status_error(resp: &HttpResponse) -> ApiError {
    let message = resp
        .json::<ErrorBody>()
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| resp.body.clone());
    ApiError::Status { status: resp.status, message }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

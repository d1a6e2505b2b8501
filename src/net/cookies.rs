//! Cookie jar shared by the HTTP transport and the session store.
//!
//! DESIGN
//! ======
//! The jar plays the part of the browser's cookie store. `reqwest` feeds it
//! `Set-Cookie` headers through the [`reqwest::cookie::CookieStore`] impl and
//! reads it back on every request, so credentials are always included. The
//! session store reads `csrftoken` by name and clears the token cookies.
//!
//! Storage and matching are RFC 6265 rules from [`cookie_store::CookieStore`]:
//! a `Domain` must cover the sending host, host-only cookies stay on their
//! host, `Path` matches on segment boundaries, `Secure` cookies only go over
//! https, and `Max-Age`/`Expires` are tracked. The cookie file keeps session
//! cookies as well as persistent ones, since one login spans many CLI runs.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use reqwest::header::HeaderValue;
use url::Url;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const CSRF_COOKIE: &str = "csrftoken";

/// Cookies that carry the authenticated session.
pub const SESSION_COOKIES: [&str; 2] = [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE];

#[derive(Debug, thiserror::Error)]
pub enum CookieFileError {
    #[error("cookie file io failed for {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("cookie file {path} could not be encoded: {source}")]
    Json { path: String, source: serde_json::Error },
    #[error("cookie file {path} could not be loaded: {source}")]
    Load { path: String, source: cookie_store::Error },
}

#[derive(Debug, Default)]
pub struct CookieJar {
    store: RwLock<cookie_store::CookieStore>,
}

impl CookieJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one raw `Set-Cookie` header value received from `url`.
    /// An already expired cookie expires any stored cookie with the same
    /// domain, path and name. Cookies the store refuses are dropped.
    pub fn store_set_cookie(&self, raw: &str, url: &Url) {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        match store.parse(raw, url) {
            Ok(action) => tracing::debug!(?action, %url, "stored Set-Cookie"),
            Err(e) => tracing::debug!(error = %e, %url, "ignoring Set-Cookie"),
        }
    }

    /// Read an unexpired cookie value by name, like `document.cookie` lookups.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.iter_unexpired().find(|c| c.name() == name).map(|c| c.value().to_owned())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove every cookie with one of the given names, on every domain and path.
    pub fn remove(&self, names: &[&str]) {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        let keys: Vec<(String, String, String)> = store
            .iter_any()
            .filter(|c| names.contains(&c.name()))
            .map(|c| (String::from(&c.domain), String::from(&c.path), c.name().to_owned()))
            .collect();
        for (domain, path, name) in keys {
            store.remove(&domain, &path, &name);
        }
    }

    /// Build the `Cookie` request header for `url`.
    #[must_use]
    pub fn header_for(&self, url: &Url) -> Option<String> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        let pairs: Vec<String> = store.get_request_values(url).map(|(name, value)| format!("{name}={value}")).collect();
        if pairs.is_empty() { None } else { Some(pairs.join("; ")) }
    }

    /// Names of the unexpired cookies, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = store.iter_unexpired().map(|c| c.name().to_owned()).collect();
        names.sort();
        names
    }

    // =========================================================================
    // PERSISTENCE
    // =========================================================================

    /// Load a jar from a JSON cookie file. A missing file yields an empty jar
    /// and expired entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CookieFileError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let display = path.display().to_string();
        let file = File::open(path).map_err(|source| CookieFileError::Io { path: display.clone(), source })?;
        let store = cookie_store::serde::json::load(BufReader::new(file))
            .map_err(|source| CookieFileError::Load { path: display, source })?;
        Ok(Self { store: RwLock::new(store) })
    }

    /// Write the unexpired cookies to a JSON cookie file, readable by the
    /// owner only. The format is the one `cookie_store::serde::json::load` reads.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), CookieFileError> {
        let display = path.display().to_string();
        let io_err = |source| CookieFileError::Io { path: display.clone(), source };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let json = {
            let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
            let live: Vec<&cookie_store::Cookie<'static>> = store.iter_unexpired().collect();
            serde_json::to_string_pretty(&live).map_err(|source| CookieFileError::Json { path: display.clone(), source })?
        };
        std::fs::write(path, json).map_err(io_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(io_err)?;
        }
        Ok(())
    }
}

impl reqwest::cookie::CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        for header in cookie_headers {
            if let Ok(raw) = header.to_str() {
                self.store_set_cookie(raw, url);
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.header_for(url).and_then(|header| HeaderValue::from_str(&header).ok())
    }
}

#[cfg(test)]
#[path = "cookies_test.rs"]
mod tests;

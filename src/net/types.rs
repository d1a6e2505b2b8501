//! Wire types shared by the API client, the session store, and the pages.

use serde::{Deserialize, Serialize};

// =============================================================================
// ACCOUNTS
// =============================================================================

/// Account role as reported by `/api/me/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }
}

/// Profile block nested inside [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "image", default)]
    pub image_url: Option<String>,
    pub role: Role,
    #[serde(rename = "is_totp_verified", default)]
    pub totp_verified: bool,
}

/// Identity snapshot returned by `/api/me/`. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub point_balance: i64,
    pub profile: Profile,
}

/// Body of `POST /api/login/`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Body of `POST /api/signup/`.
#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
}

/// Error payload the backend attaches to rejected requests.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

// =============================================================================
// CATALOG
// =============================================================================

/// Catalog entry from `GET /api/items/`. Prices are in dan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub price: u64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Marketplace search hit from the local `/api/amazon` proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductItem {
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub url: String,
}

/// Envelope of the search proxy. `items` is frequently missing on empty
/// result pages, so it is parsed leniently.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Option<serde_json::Value>,
}

impl SearchResponse {
    /// Extract the hits, treating a missing or non-array `items` as empty.
    #[must_use]
    pub fn into_items(self) -> Vec<ProductItem> {
        match self.items {
            Some(serde_json::Value::Array(values)) => values
                .into_iter()
                .filter_map(|value| serde_json::from_value(value).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

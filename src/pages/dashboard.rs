//! Dashboard: profile card, point catalog, and marketplace search.
//!
//! DESIGN
//! ======
//! The page keeps the catalog and the current search in memory and derives
//! a [`DashboardView`] on demand from those plus the session. The view is
//! plain data with a `Display` impl, so the terminal renders it and tests
//! assert on it.
//!
//! ERROR HANDLING
//! ==============
//! Catalog failures are logged and leave the list empty. Search failures
//! alert the user and keep the previous results on screen.

use std::fmt;

use url::Url;

use crate::net::api::ApiError;
use crate::net::types::{Item, ProductItem, User};
use crate::routes::Route;
use crate::state::session::{AuthStatus, COMMUNICATION_ERROR, SessionStore};

pub const TOTAL_PAGES: u32 = 5;
pub const DEFAULT_IMAGE: &str = "/default.png";
const POINT_UNIT: &str = "dan";

// =============================================================================
// VIEW MODEL
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    /// The first identity check has not resolved yet.
    Loading,
    /// Resolved, but there is no user to show.
    Unavailable,
    Ready(ReadyView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadyView {
    pub profile: ProfileCard,
    pub content: Content,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCard {
    pub name: String,
    pub image: String,
    pub points: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Catalog(Vec<CatalogCard>),
    Search {
        keyword: String,
        results: Vec<ProductItem>,
        pagination: Option<Pagination>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCard {
    pub name: String,
    pub image: String,
    pub price: u64,
    pub link: Route,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub total: u32,
}

impl Pagination {
    /// Previous page, `None` on the first.
    #[must_use]
    pub fn prev(self) -> Option<u32> {
        (self.page > 1).then(|| self.page - 1)
    }

    /// Next page, `None` on the last.
    #[must_use]
    pub fn next(self) -> Option<u32> {
        (self.page < self.total).then(|| self.page + 1)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Where to load an item image from: the placeholder when absent, absolute
/// URLs as-is, anything else relative to the backend.
#[must_use]
pub fn resolve_image_url(path: Option<&str>, base_url: Option<&Url>) -> String {
    match path {
        None | Some("") => DEFAULT_IMAGE.to_owned(),
        Some(p) if p.starts_with("http") => p.to_owned(),
        Some(p) => {
            let base = base_url.map_or("", |u| u.as_str().trim_end_matches('/'));
            format!("{base}{p}")
        }
    }
}

/// `1234567` becomes `"1,234,567"`.
#[must_use]
pub fn format_points(points: i64) -> String {
    let digits = points.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if points < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn profile_card(user: &User) -> ProfileCard {
    let image = user
        .profile
        .image_url
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_IMAGE)
        .to_owned();
    ProfileCard { name: user.name.clone(), image, points: format!("{} {POINT_UNIT}", format_points(user.point_balance)) }
}

// =============================================================================
// PAGE
// =============================================================================

#[derive(Debug, Clone)]
struct SearchState {
    keyword: String,
    page: u32,
    results: Vec<ProductItem>,
}

pub struct DashboardPage<'a> {
    store: &'a SessionStore,
    items: Vec<Item>,
    search: Option<SearchState>,
}

impl<'a> DashboardPage<'a> {
    #[must_use]
    pub fn new(store: &'a SessionStore) -> Self {
        Self { store, items: Vec::new(), search: None }
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Fetch the catalog. Any failure is logged and leaves the list empty.
    pub async fn load(&mut self) {
        match self.store.api().items().await {
            Ok(items) => {
                tracing::debug!(count = items.len(), "catalog loaded");
                self.items = items;
            }
            Err(e) => {
                tracing::error!(error = %e, "item fetch failed");
                self.items.clear();
            }
        }
    }

    /// Search the marketplace proxy. A blank keyword sends nothing; `page`
    /// is clamped to `1..=TOTAL_PAGES`. Returns whether results arrived.
    pub async fn search(&mut self, keyword: &str, page: u32) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return false;
        }
        let page = page.clamp(1, TOTAL_PAGES);

        let previous = self.search.take().map(|s| s.results).unwrap_or_default();
        let state = self.search.insert(SearchState { keyword: keyword.to_owned(), page, results: previous });

        match self.store.api().search_products(keyword, page).await {
            Ok(results) => {
                tracing::debug!(%keyword, page, count = results.len(), "search completed");
                state.results = results;
                true
            }
            Err(ApiError::Status { status, message }) => {
                tracing::error!(status, %message, "search failed");
                self.store.notifier().alert(&format!("Search failed ({status})"));
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "search request failed");
                self.store.notifier().alert(COMMUNICATION_ERROR);
                false
            }
        }
    }

    /// Back to the catalog.
    pub fn clear_search(&mut self) {
        self.search = None;
    }

    #[must_use]
    pub fn pagination(&self) -> Option<Pagination> {
        self.search
            .as_ref()
            .filter(|s| !s.results.is_empty())
            .map(|s| Pagination { page: s.page, total: TOTAL_PAGES })
    }

    /// Repeat the current search one page back. `false` on the first page.
    pub async fn prev_page(&mut self) -> bool {
        match (self.search_keyword(), self.pagination().and_then(Pagination::prev)) {
            (Some(keyword), Some(page)) => self.search(&keyword, page).await,
            _ => false,
        }
    }

    /// Repeat the current search one page forward. `false` on the last page.
    pub async fn next_page(&mut self) -> bool {
        match (self.search_keyword(), self.pagination().and_then(Pagination::next)) {
            (Some(keyword), Some(page)) => self.search(&keyword, page).await,
            _ => false,
        }
    }

    fn search_keyword(&self) -> Option<String> {
        self.search.as_ref().map(|s| s.keyword.clone())
    }

    pub async fn logout(&self) {
        self.store.logout().await;
    }

    pub async fn view(&self) -> DashboardView {
        let session = self.store.session().await;
        if session.status() == AuthStatus::Unknown {
            return DashboardView::Loading;
        }
        let Some(user) = session.user() else {
            return DashboardView::Unavailable;
        };

        let content = match &self.search {
            Some(search) => Content::Search {
                keyword: search.keyword.clone(),
                results: search.results.clone(),
                pagination: self.pagination(),
            },
            None => {
                let base = self.store.api().base_url();
                Content::Catalog(
                    self.items
                        .iter()
                        .map(|item| CatalogCard {
                            name: item.name.clone(),
                            image: resolve_image_url(item.image_url.as_deref(), base),
                            price: item.price,
                            link: Route::Item(item.id.clone()),
                        })
                        .collect(),
                )
            }
        };

        DashboardView::Ready(ReadyView { profile: profile_card(user), content })
    }
}

// =============================================================================
// RENDERING
// =============================================================================

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading..."),
            Self::Unavailable => write!(f, "Could not load account details."),
            Self::Ready(view) => write!(f, "{view}"),
        }
    }
}

impl fmt::Display for ReadyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.profile.name)?;
        writeln!(f, "  image:  {}", self.profile.image)?;
        writeln!(f, "  points: {}", self.profile.points)?;
        writeln!(f)?;

        match &self.content {
            Content::Catalog(cards) => {
                writeln!(f, "Catalog")?;
                if cards.is_empty() {
                    writeln!(f, "  (no items)")?;
                }
                for card in cards {
                    writeln!(f, "  {:<32} {:>8} {POINT_UNIT}  {}  {}", card.name, card.price, card.link, card.image)?;
                }
            }
            Content::Search { keyword, results, pagination } => {
                writeln!(f, "Search results for \"{keyword}\"")?;
                if results.is_empty() {
                    writeln!(f, "  (no results)")?;
                }
                for hit in results {
                    let price = hit
                        .price
                        .filter(|p| p.abs() > f64::EPSILON)
                        .map_or_else(|| "price unknown".to_owned(), |p| format!("¥{p}"));
                    writeln!(f, "  {:<48} {:>14}  {}", hit.title, price, hit.url)?;
                }
                if let Some(p) = pagination {
                    writeln!(f)?;
                    writeln!(f, "  page {} of {}", p.page, p.total)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;

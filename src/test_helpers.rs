//! Shared fixtures: a scripted transport, a recording shell, and factories.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use reqwest::Method;
use url::Url;

use crate::net::api::ApiClient;
use crate::net::cookies::CookieJar;
use crate::net::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::net::types::{Profile, Role, User};
use crate::routes::Route;
use crate::shell::{Navigator, Notifier};
use crate::state::session::SessionStore;

pub const ORIGIN: &str = "http://front.test";
pub const BASE_URL: &str = "http://api.test";
pub const CSRF_TOKEN: &str = "tok-123";

// =============================================================================
// MockTransport
// =============================================================================

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub set_cookies: Vec<String>,
}

impl MockResponse {
    pub fn status(status: u16) -> Self {
        Self { status, body: String::new(), set_cookies: Vec::new() }
    }

    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self { status, body: body.to_string(), set_cookies: Vec::new() }
    }

    pub fn with_cookie(mut self, raw: &str) -> Self {
        self.set_cookies.push(raw.to_owned());
        self
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Respond(MockResponse),
    Fail(String),
}

/// What the transport saw, including the cookie header it would have sent.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub cookie: Option<String>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Scripted backend keyed by `(method, path)`. Scripting a key again
/// replaces its answer. Unscripted routes answer 404.
pub struct MockTransport {
    cookies: Arc<CookieJar>,
    routes: Mutex<HashMap<(Method, String), Scripted>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new(cookies: Arc<CookieJar>) -> Self {
        Self { cookies, routes: Mutex::new(HashMap::new()), requests: Mutex::new(Vec::new()) }
    }

    pub fn on(&self, method: Method, path: &str, response: MockResponse) {
        self.push(method, path, Scripted::Respond(response));
    }

    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.push(method, path, Scripted::Fail(message.to_owned()));
    }

    fn push(&self, method: Method, path: &str, scripted: Scripted) {
        self.routes.lock().unwrap().insert((method, path.to_owned()), scripted);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `"METHOD /path"` for each request, in order.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.url.path()))
            .collect()
    }

    pub fn last_request_to(&self, path: &str) -> Option<RecordedRequest> {
        self.requests().into_iter().rev().find(|r| r.url.path() == path)
    }

    /// Script the CSRF endpoint to set `csrftoken` and the identity endpoint
    /// to answer `me`.
    pub fn script_identity(&self, me: MockResponse) {
        self.on(
            Method::GET,
            "/api/csrf/",
            MockResponse::json(200, serde_json::json!({ "detail": "CSRF cookie set" }))
                .with_cookie(&format!("csrftoken={CSRF_TOKEN}; Path=/")),
        );
        self.on(Method::GET, "/api/me/", me);
    }

    /// Script a full successful login for `username`: CSRF, login with
    /// session cookies, and the follow-up identity check.
    pub fn script_login_ok(&self, username: &str) {
        self.script_identity(MockResponse::json(200, user_json(username)));
        self.on(
            Method::POST,
            "/api/login/",
            MockResponse::json(200, serde_json::json!({ "message": "Login successful" }))
                .with_cookie("access_token=jwt-a; Path=/; HttpOnly")
                .with_cookie("refresh_token=jwt-r; Path=/; HttpOnly"),
        );
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method.clone(),
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
            cookie: self.cookies.header_for(&request.url),
        });

        let key = (request.method.clone(), request.url.path().to_owned());
        let scripted = self.routes.lock().unwrap().get(&key).cloned();

        match scripted {
            Some(Scripted::Respond(resp)) => {
                for raw in &resp.set_cookies {
                    self.cookies.store_set_cookie(raw, &request.url);
                }
                Ok(HttpResponse { status: resp.status, body: resp.body })
            }
            Some(Scripted::Fail(message)) => Err(TransportError(message)),
            None => Ok(HttpResponse { status: 404, body: "{}".to_owned() }),
        }
    }
}

// =============================================================================
// RecordingShell
// =============================================================================

pub struct RecordingShell {
    current: Mutex<Route>,
    navigations: Mutex<Vec<Route>>,
    alerts: Mutex<Vec<String>>,
}

impl RecordingShell {
    pub fn new(initial: Route) -> Self {
        Self { current: Mutex::new(initial), navigations: Mutex::new(Vec::new()), alerts: Mutex::new(Vec::new()) }
    }

    pub fn navigations(&self) -> Vec<Route> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Navigator for RecordingShell {
    fn navigate(&self, route: &Route) {
        *self.current.lock().unwrap() = route.clone();
        self.navigations.lock().unwrap().push(route.clone());
    }

    fn current(&self) -> Route {
        self.current.lock().unwrap().clone()
    }
}

impl Notifier for RecordingShell {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_owned());
    }
}

// =============================================================================
// Factories
// =============================================================================

pub fn user(username: &str) -> User {
    User {
        id: format!("id-{username}"),
        username: username.to_owned(),
        name: username.to_uppercase(),
        point_balance: 1500,
        profile: Profile { image_url: None, role: Role::Student, totp_verified: false },
    }
}

pub fn user_json(username: &str) -> serde_json::Value {
    serde_json::to_value(user(username)).unwrap()
}

pub struct Harness {
    pub cookies: Arc<CookieJar>,
    pub transport: Arc<MockTransport>,
    pub shell: Arc<RecordingShell>,
    pub store: SessionStore,
}

/// Store whose base URL still has to be resolved through `/api/config`.
pub fn unready_harness() -> Harness {
    let cookies = Arc::new(CookieJar::new());
    let transport = Arc::new(MockTransport::new(cookies.clone()));
    let shell = Arc::new(RecordingShell::new(Route::Login));
    let api = Arc::new(ApiClient::new(transport.clone(), cookies.clone(), Url::parse(ORIGIN).unwrap()));
    let store = SessionStore::new(api, shell.clone(), shell.clone());
    Harness { cookies, transport, shell, store }
}

/// Store with the base URL already resolved to [`BASE_URL`].
pub fn harness() -> Harness {
    let h = unready_harness();
    h.store.api().set_base_url(Url::parse(BASE_URL).unwrap());
    h
}

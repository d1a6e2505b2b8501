use super::*;
use crate::routes::Route;
use crate::test_helpers::{MockResponse, harness, unready_harness};
use reqwest::Method;

// =============================================================================
// LoginForm
// =============================================================================

#[test]
fn form_requires_username_then_password() {
    assert_eq!(LoginForm::new("", "pw").validate(), Err(FormError::Missing("username")));
    assert_eq!(LoginForm::new("alice", "  ").validate(), Err(FormError::Missing("password")));
    assert_eq!(LoginForm::new("alice", "pw").validate(), Ok(()));
}

// =============================================================================
// on_load
// =============================================================================

#[tokio::test]
async fn on_load_clears_tokens() {
    let h = harness();
    h.transport.on(Method::POST, "/api/clear-tokens/", MockResponse::status(200));
    LoginPage::new(&h.store).on_load().await;
    assert_eq!(h.transport.calls(), vec!["POST /api/clear-tokens/"]);
}

#[tokio::test]
async fn on_load_failure_is_silent() {
    let h = harness();
    h.transport.fail(Method::POST, "/api/clear-tokens/", "offline");
    LoginPage::new(&h.store).on_load().await;
    assert!(h.shell.alerts().is_empty());
}

#[tokio::test]
async fn on_load_before_config_sends_nothing() {
    let h = unready_harness();
    LoginPage::new(&h.store).on_load().await;
    assert!(h.transport.requests().is_empty());
}

// =============================================================================
// submit
// =============================================================================

#[tokio::test]
async fn submit_signs_in_and_lands_on_dashboard() {
    let h = harness();
    h.transport.script_login_ok("alice");

    assert!(LoginPage::new(&h.store).submit(&LoginForm::new("alice", "secret")).await);
    assert_eq!(h.shell.navigations(), vec![Route::Dashboard]);
}

#[tokio::test]
async fn submit_blank_field_alerts_without_request() {
    let h = harness();
    assert!(!LoginPage::new(&h.store).submit(&LoginForm::new("alice", "")).await);
    assert_eq!(h.shell.alerts(), vec!["password is required"]);
    assert!(h.transport.requests().is_empty());
}

#[tokio::test]
async fn submit_rejected_stays_on_login() {
    let h = harness();
    h.transport.script_login_ok("alice");
    h.transport.on(Method::POST, "/api/login/", MockResponse::json(401, serde_json::json!({ "error": "bad credentials" })));

    assert!(!LoginPage::new(&h.store).submit(&LoginForm::new("alice", "wrong")).await);
    assert!(h.shell.navigations().is_empty());
    assert_eq!(h.shell.alerts(), vec![crate::state::session::LOGIN_FAILED]);
}

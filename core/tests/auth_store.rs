//! Session, auth store, and profile store behaviour.

mod common;

use std::time::Duration;

use common::*;
use serde_json::json;
use tasks_core::api::SESSION_EXPIRED_MESSAGE;
use tasks_core::hooks::{NotificationKind, DASHBOARD_ROUTE, LOGIN_ROUTE};
use tasks_core::session::{ACCESS_TOKEN_EXPIRY_KEY, ACCESS_TOKEN_KEY, USER_KEY};
use tasks_core::types::{Credentials, NewPassword, SignupRequest};
use tasks_core::{HttpMethod, Person, Persistence};

fn credentials() -> Credentials {
    Credentials {
        email: "ada@example.com".to_string(),
        password: "pw".to_string(),
    }
}

fn grant() -> Result<tasks_core::HttpResponse, tasks_core::TransportError> {
    json(
        200,
        json!({
            "success": true,
            "person": { "email": "ada@example.com", "first_name": "Ada", "last_name": "L" },
            "access_token": "tok-1",
            "expiry": 3600,
        }),
    )
}

#[tokio::test]
async fn login_establishes_and_persists_session() {
    let transport = ScriptedTransport::new();
    transport.push(grant());
    let h = harness(transport.clone(), 10);
    let auth = h.app.auth();

    assert!(!auth.is_authenticated().await);
    assert!(auth.login(&credentials()).await);

    assert!(auth.is_authenticated().await);
    assert_eq!(auth.access_token().await.as_deref(), Some("tok-1"));
    assert_eq!(h.navigator.routes(), [DASHBOARD_ROUTE]);
    assert_eq!(
        h.storage.get_item::<String>(ACCESS_TOKEN_KEY).as_deref(),
        Some("tok-1")
    );
    assert_eq!(h.storage.get_item::<u64>(ACCESS_TOKEN_EXPIRY_KEY), Some(3600));
    let stored: Person = h.storage.get_item(USER_KEY).unwrap();
    assert_eq!(stored.first_name.as_deref(), Some("Ada"));

    let req = transport.last();
    assert_eq!(req.path, "http://localhost:3000/auth/login");
    assert!(req.header("authorization").is_none());
    assert!(!auth.status().await.loading);
}

#[tokio::test]
async fn session_is_restored_from_storage() {
    let storage = Persistence::in_memory();
    storage
        .set_item(USER_KEY, &json!({ "email": "ada@example.com" }))
        .unwrap();
    storage.set_item(ACCESS_TOKEN_KEY, "tok-restored").unwrap();

    let transport = ScriptedTransport::new();
    transport.push(page(Vec::new(), 1, 0, 0));
    let h = harness_with_storage(transport.clone(), 10, storage);

    assert!(h.app.auth().is_authenticated().await);
    h.app.tasks().fetch_tasks().await;
    assert_eq!(
        transport.last().header("Authorization"),
        Some("Bearer tok-restored")
    );
}

#[tokio::test]
async fn token_without_user_is_not_sent() {
    let storage = Persistence::in_memory();
    storage.set_item(ACCESS_TOKEN_KEY, "orphan").unwrap();
    let transport = ScriptedTransport::new();
    transport.push(page(Vec::new(), 1, 0, 0));
    let h = harness_with_storage(transport.clone(), 10, storage);

    h.app.tasks().fetch_tasks().await;
    assert!(transport.last().header("authorization").is_none());
}

#[tokio::test]
async fn unauthorized_response_ends_session() {
    let transport = ScriptedTransport::new();
    transport.push(grant());
    transport.push(json(401, json!({ "success": false, "message": "Token expired" })));
    let h = harness(transport.clone(), 10);

    assert!(h.app.auth().login(&credentials()).await);
    h.app.tasks().fetch_tasks().await;

    assert!(!h.app.auth().is_authenticated().await);
    assert_eq!(h.app.auth().access_token().await, None);
    assert_eq!(h.storage.get_item::<String>(ACCESS_TOKEN_KEY), None);
    assert_eq!(h.navigator.routes(), [DASHBOARD_ROUTE, LOGIN_ROUTE]);

    let warning = h
        .notifier
        .seen()
        .into_iter()
        .find(|n| n.kind == NotificationKind::Warning)
        .unwrap();
    assert_eq!(warning.message, SESSION_EXPIRED_MESSAGE);
    assert_eq!(warning.timeout, Some(Duration::from_secs(3)));

    let state = h.app.tasks().state().await;
    assert_eq!(state.error.as_deref(), Some("Token expired"));
    assert!(state.tasks.is_empty());
}

#[tokio::test]
async fn login_transport_failure_reports_unknown_error() {
    let transport = ScriptedTransport::new();
    transport.push(network_error("connection refused"));
    let h = harness(transport, 10);

    assert!(!h.app.auth().login(&credentials()).await);
    assert_eq!(h.notifier.last().message, "An unknown error occurred");
    assert!(h.navigator.routes().is_empty());
}

#[tokio::test]
async fn login_rejection_reports_server_message() {
    let transport = ScriptedTransport::new();
    transport.push(json(
        400,
        json!({ "success": false, "message": "Invalid email or password" }),
    ));
    let h = harness(transport, 10);

    assert!(!h.app.auth().login(&credentials()).await);
    assert_eq!(h.notifier.last().message, "Invalid email or password");
    assert_eq!(
        h.app.auth().status().await.error.as_deref(),
        Some("Invalid email or password")
    );
    assert!(!h.app.auth().is_authenticated().await);
}

#[tokio::test]
async fn fetch_user_keeps_existing_token() {
    let transport = ScriptedTransport::new();
    transport.push(grant());
    transport.push(json(
        200,
        json!({ "success": true, "person": { "email": "ada@example.com", "first_name": "Ada K" } }),
    ));
    let h = harness(transport.clone(), 10);
    let auth = h.app.auth();

    assert!(auth.login(&credentials()).await);
    assert!(auth.fetch_user().await);

    assert_eq!(auth.access_token().await.as_deref(), Some("tok-1"));
    assert_eq!(auth.user().await.unwrap().first_name.as_deref(), Some("Ada K"));
    assert_eq!(transport.last().header("authorization"), Some("Bearer tok-1"));
    // fetch_user does not navigate.
    assert_eq!(h.navigator.routes(), [DASHBOARD_ROUTE]);
}

#[tokio::test]
async fn signup_does_not_sign_in() {
    let transport = ScriptedTransport::new();
    transport.push(json(201, json!({ "success": true })));
    let h = harness(transport.clone(), 10);

    let payload = SignupRequest {
        email: "ada@example.com".to_string(),
        password: "pw".to_string(),
        first_name: "Ada".to_string(),
        last_name: "L".to_string(),
    };
    assert!(h.app.auth().signup(&payload).await);
    assert!(!h.app.auth().is_authenticated().await);
    assert_eq!(transport.last().path, "http://localhost:3000/auth/signup");
}

#[tokio::test]
async fn signup_with_unreadable_reply_reports_unknown_error() {
    let transport = ScriptedTransport::new();
    transport.push(Ok(tasks_core::HttpResponse {
        status: 201,
        headers: Vec::new(),
        body: "<html>created</html>".to_string(),
    }));
    let h = harness(transport, 10);

    let payload = SignupRequest {
        email: "ada@example.com".to_string(),
        password: "pw".to_string(),
        first_name: "Ada".to_string(),
        last_name: "L".to_string(),
    };
    assert!(!h.app.auth().signup(&payload).await);
    assert_eq!(h.notifier.last().message, "An unknown error occurred");
    assert_eq!(
        h.app.auth().status().await.error.as_deref(),
        Some("An unknown error occurred")
    );
}

#[tokio::test]
async fn forgot_password_notifies_on_success() {
    let transport = ScriptedTransport::new();
    transport.push(json(200, json!({ "success": true })));
    let h = harness(transport.clone(), 10);

    assert!(h.app.auth().forgot_password("ada@example.com").await);
    let note = h.notifier.last();
    assert_eq!(note.kind, NotificationKind::Positive);
    assert_eq!(note.message, "Password reset link has been sent to your email");
}

#[tokio::test]
async fn set_password_signs_in() {
    let transport = ScriptedTransport::new();
    transport.push(grant());
    let h = harness(transport.clone(), 10);

    let payload = NewPassword {
        password: "new-pw".to_string(),
    };
    assert!(h.app.auth().set_password("tok", "dWlk", &payload).await);
    assert!(h.app.auth().is_authenticated().await);
    assert_eq!(h.navigator.routes(), [DASHBOARD_ROUTE]);
    assert_eq!(
        transport.last().path,
        "http://localhost:3000/auth/reset_password/tok/dWlk"
    );
}

#[tokio::test]
async fn logout_clears_everything() {
    let transport = ScriptedTransport::new();
    transport.push(grant());
    let h = harness(transport, 10);

    assert!(h.app.auth().login(&credentials()).await);
    h.app.auth().logout().await;

    assert!(!h.app.auth().is_authenticated().await);
    assert_eq!(h.storage.get_item::<Person>(USER_KEY), None);
    assert_eq!(h.navigator.routes(), [DASHBOARD_ROUTE, LOGIN_ROUTE]);
}

#[tokio::test]
async fn profile_update_merges_names_into_session() {
    let transport = ScriptedTransport::new();
    transport.push(grant());
    transport.push(json(
        200,
        json!({ "success": true, "user": { "email": "ada@example.com", "first_name": "Grace", "last_name": "H" } }),
    ));
    let h = harness(transport.clone(), 10);

    assert!(h.app.auth().login(&credentials()).await);
    assert!(h.app.user().update_profile("Grace", "H").await);

    let req = transport.last();
    assert_eq!(req.method, HttpMethod::Put);
    assert_eq!(req.path, "http://localhost:3000/person/me");

    let state = h.app.user().state().await;
    assert_eq!(state.user.unwrap().first_name.as_deref(), Some("Grace"));
    assert!(!state.loading);

    let session_user = h.app.auth().user().await.unwrap();
    assert_eq!(session_user.first_name.as_deref(), Some("Grace"));
    assert_eq!(session_user.email.as_deref(), Some("ada@example.com"));
    assert_eq!(h.notifier.last().message, "Profile updated successfully");
}

#[tokio::test]
async fn profile_update_failure_sets_error() {
    let transport = ScriptedTransport::new();
    transport.push(json(200, json!({ "success": false })));
    let h = harness(transport, 10);

    assert!(!h.app.user().update_profile("Grace", "H").await);
    let state = h.app.user().state().await;
    assert_eq!(state.error.as_deref(), Some("Failed to update profile"));
    assert!(!state.loading);
}

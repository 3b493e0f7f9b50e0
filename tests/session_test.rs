mod common;

use std::sync::Arc;

use httpmock::prelude::*;
use reelsync::{
    Error, SyncContext,
    management::{ACCESS_TOKEN_KEY, ChangeEvent, FileStore, USER_KEY},
    navigation::RecordingNavigator,
    types::{Credentials, MovieRecord, Registration},
};
use serde_json::json;

use common::alice;

fn registration() -> Registration {
    Registration {
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        password: "secret".to_string(),
    }
}

#[tokio::test]
async fn test_login_persists_token_and_user() {
    let h = common::anonymous().await;
    let mock = h.server.mock(|when, then| {
        when.method(POST)
            .path("/api/auth/login")
            .json_body(json!({"username": "alice", "password": "secret"}));
        then.status(200)
            .json_body(json!({"access_token": "tok-1", "user": alice()}));
    });

    let user = h.ctx.login(&Credentials::new("alice", "secret")).await.unwrap();

    mock.assert();
    assert_eq!(user.username, "alice");
    let state = h.ctx.state();
    assert!(state.authenticated);
    assert_eq!(state.user, Some(user));

    let stored = h.storage.snapshot();
    assert_eq!(stored.get(ACCESS_TOKEN_KEY).map(String::as_str), Some("tok-1"));
    let stored_user: serde_json::Value = serde_json::from_str(&stored[USER_KEY]).unwrap();
    assert_eq!(stored_user["username"], "alice");
}

#[tokio::test]
async fn test_login_with_bad_password_reports_server_message() {
    let h = common::anonymous().await;
    h.server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(401).json_body(json!({"error": "invalid credentials"}));
    });

    let err = h
        .ctx
        .login(&Credentials::new("alice", "bad-pw"))
        .await
        .unwrap_err();

    assert!(matches!(&err, Error::Auth { message } if message == "invalid credentials"));
    assert!(!h.ctx.state().authenticated);
    assert!(h.storage.snapshot().is_empty());
    // a rejected login is not a session expiry
    assert_eq!(h.navigator.count(), 0);
    assert!(!h.ctx.session().redirect_pending());
}

#[tokio::test]
async fn test_register_adopts_returned_session() {
    let h = common::anonymous().await;
    let register = h.server.mock(|when, then| {
        when.method(POST)
            .path("/api/auth/register")
            .json_body(json!({"username": "alice", "email": "alice@example.com", "password": "secret"}));
        then.status(201)
            .json_body(json!({"access_token": "tok-r", "user": alice()}));
    });
    let login = h.server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(200)
            .json_body(json!({"access_token": "tok-l", "user": alice()}));
    });

    let user = h.ctx.register(&registration()).await.unwrap();

    register.assert();
    assert_eq!(login.hits(), 0);
    assert_eq!(user.username, "alice");
    assert_eq!(h.ctx.session().token().as_deref(), Some("tok-r"));
}

#[tokio::test]
async fn test_register_falls_back_to_login() {
    let h = common::anonymous().await;
    h.server.mock(|when, then| {
        when.method(POST).path("/api/auth/register");
        then.status(201)
            .json_body(json!({"message": "User registered successfully"}));
    });
    let login = h.server.mock(|when, then| {
        when.method(POST)
            .path("/api/auth/login")
            .json_body(json!({"username": "alice", "password": "secret"}));
        then.status(200)
            .json_body(json!({"access_token": "tok-l", "user": alice()}));
    });

    h.ctx.register(&registration()).await.unwrap();

    login.assert();
    assert_eq!(h.ctx.session().token().as_deref(), Some("tok-l"));
}

#[tokio::test]
async fn test_register_duplicate_username_is_auth_error() {
    let h = common::anonymous().await;
    h.server.mock(|when, then| {
        when.method(POST).path("/api/auth/register");
        then.status(400).json_body(json!({"error": "Username already exists"}));
    });

    let err = h.ctx.register(&registration()).await.unwrap_err();

    assert_eq!(err.to_string(), "Username already exists");
    assert!(!h.ctx.state().authenticated);
}

#[tokio::test]
async fn test_login_failure_without_message_uses_fallback() {
    let h = common::anonymous().await;
    h.server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(400);
    });

    let err = h.ctx.login(&Credentials::new("", "")).await.unwrap_err();
    assert!(matches!(err, Error::Auth { message } if message == "Failed to login"));
}

#[tokio::test]
async fn test_logout_clears_session_and_caches() {
    let h = common::logged_in().await;
    h.ctx
        .statuses()
        .hydrate(&[MovieRecord::with_id(42)], &[], &[])
        .unwrap();
    h.ctx.ratings().set_rating(42, 7.0).unwrap();
    h.ctx.ratings().hydrate(&[]);

    h.ctx.logout().await;

    assert!(!h.ctx.state().authenticated);
    assert!(h.storage.snapshot().is_empty());
    assert!(!h.ctx.statuses().is_hydrated());
    assert!(!h.ctx.statuses().is_liked(42));
    assert!(!h.ctx.ratings().is_hydrated());
    assert_eq!(h.navigator.count(), 0);
}

#[tokio::test]
async fn test_login_starts_with_stale_caches() {
    let h = common::logged_in().await;
    h.ctx
        .statuses()
        .hydrate(&[MovieRecord::with_id(42)], &[], &[])
        .unwrap();
    h.server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(200)
            .json_body(json!({"access_token": "tok-b", "user": {"id": 2, "username": "bob"}}));
    });

    let user = h.ctx.login(&Credentials::new("bob", "pw")).await.unwrap();

    assert_eq!(user.username, "bob");
    assert!(!h.ctx.statuses().is_hydrated());
    assert!(!h.ctx.statuses().is_liked(42));
}

#[tokio::test]
async fn test_session_survives_restart_with_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(200)
            .json_body(json!({"access_token": "tok-f", "user": alice()}));
    });

    let first = SyncContext::new(
        common::settings_for(&server),
        Arc::new(FileStore::open(&path)),
        Arc::new(RecordingNavigator::new()),
    )
    .unwrap();
    first.init().await.unwrap();
    first.login(&Credentials::new("alice", "secret")).await.unwrap();

    let second = SyncContext::new(
        common::settings_for(&server),
        Arc::new(FileStore::open(&path)),
        Arc::new(RecordingNavigator::new()),
    )
    .unwrap();
    let state = second.init().await.unwrap();

    assert!(state.authenticated);
    assert_eq!(state.user.unwrap().username, "alice");
    assert_eq!(second.session().token().as_deref(), Some("tok-f"));
}

#[tokio::test]
async fn test_session_changes_are_broadcast() {
    let h = common::anonymous().await;
    let mut events = h.ctx.subscribe();
    h.server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(200)
            .json_body(json!({"access_token": "tok", "user": alice()}));
    });

    h.ctx.login(&Credentials::new("alice", "secret")).await.unwrap();
    h.ctx.logout().await;

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ChangeEvent::SessionChanged { authenticated, .. } = event {
            seen.push(authenticated);
        }
    }
    assert_eq!(seen, vec![true, false]);
}

#[tokio::test]
async fn test_reset_returns_to_blank_state() {
    let h = common::logged_in().await;
    h.ctx.ratings().hydrate(&[]);

    h.ctx.reset().await;

    assert!(!h.ctx.state().authenticated);
    assert!(!h.ctx.ratings().is_hydrated());
    assert!(h.storage.snapshot().is_empty());
}

mod common;

use std::time::Duration;

use httpmock::prelude::*;
use reelsync::{Error, client, types::StatusKind};
use reqwest::StatusCode;
use serde_json::json;

use common::{TOKEN, alice};

#[tokio::test]
async fn test_bearer_token_is_attached_when_logged_in() {
    let h = common::logged_in().await;
    let mock = h.server.mock(|when, then| {
        when.method(GET)
            .path("/api/user/profile")
            .header("authorization", format!("Bearer {TOKEN}"));
        then.status(200)
            .json_body(json!({"id": 1, "username": "alice", "watchlist_count": 2, "ratings_count": 5}));
    });

    let profile = h.ctx.profile().await.unwrap();

    mock.assert();
    assert_eq!(profile.user.username, "alice");
    assert_eq!(profile.watchlist_count, Some(2));
    assert_eq!(profile.ratings_count, Some(5));
}

#[tokio::test]
async fn test_anonymous_requests_are_still_sent() {
    let h = common::anonymous().await;
    let mock = h.server.mock(|when, then| {
        when.method(GET).path("/api/user/likes");
        then.status(200).json_body(json!([]));
    });

    let records = client::movies::list(h.ctx.gateway(), StatusKind::Liked)
        .await
        .unwrap();

    mock.assert();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_redirects() {
    let h = common::logged_in().await;
    h.server.mock(|when, then| {
        when.method(GET).path("/api/user/profile");
        then.status(401).json_body(json!({"msg": "Token has expired"}));
    });

    let err = h.ctx.profile().await.unwrap_err();

    assert!(matches!(err, Error::SessionExpired));
    assert!(!h.ctx.state().authenticated);
    assert!(h.ctx.state().user.is_none());
    assert!(h.storage.snapshot().is_empty());
    assert_eq!(h.navigator.routes(), vec!["/login".to_string()]);
    assert!(h.ctx.session().redirect_pending());
}

#[tokio::test]
async fn test_concurrent_unauthorized_responses_redirect_once() {
    let h = common::logged_in().await;
    for path in ["/api/user/likes", "/api/user/watch-later", "/api/user/watched"] {
        h.server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(401);
        });
    }

    let gateway = h.ctx.gateway();
    let (liked, watch_later, watched) = tokio::join!(
        client::movies::list(gateway, StatusKind::Liked),
        client::movies::list(gateway, StatusKind::WatchLater),
        client::movies::list(gateway, StatusKind::Watched),
    );

    // every caller still sees the rejection
    assert!(matches!(liked, Err(Error::SessionExpired)));
    assert!(matches!(watch_later, Err(Error::SessionExpired)));
    assert!(matches!(watched, Err(Error::SessionExpired)));

    assert_eq!(h.navigator.count(), 1);
    assert!(!h.ctx.state().authenticated);
}

#[tokio::test]
async fn test_redirect_is_possible_again_after_new_login() {
    let h = common::logged_in().await;
    h.server.mock(|when, then| {
        when.method(GET).path("/api/user/profile");
        then.status(401);
    });
    h.server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(200)
            .json_body(json!({"access_token": "token-2", "user": alice()}));
    });

    assert!(h.ctx.profile().await.is_err());
    assert_eq!(h.navigator.count(), 1);

    h.ctx
        .login(&reelsync::types::Credentials::new("alice", "pw"))
        .await
        .unwrap();
    assert!(!h.ctx.session().redirect_pending());

    assert!(matches!(h.ctx.profile().await, Err(Error::SessionExpired)));
    assert_eq!(h.navigator.count(), 2);
}

#[tokio::test]
async fn test_other_error_statuses_pass_through() {
    let h = common::logged_in().await;
    h.server.mock(|when, then| {
        when.method(GET).path("/api/user/profile");
        then.status(500).json_body(json!({"error": "database unavailable"}));
    });

    let err = h.ctx.profile().await.unwrap_err();

    match err {
        Error::Http { status, message } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message.as_deref(), Some("database unavailable"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(h.ctx.state().authenticated);
    assert_eq!(h.navigator.count(), 0);
}

#[tokio::test]
async fn test_plain_text_error_body_is_kept() {
    let h = common::logged_in().await;
    h.server.mock(|when, then| {
        when.method(GET).path("/api/user/profile");
        then.status(404).body("no such user");
    });

    let err = h.ctx.profile().await.unwrap_err();
    assert!(matches!(err, Error::Http { message: Some(m), .. } if m == "no such user"));
}

#[tokio::test]
async fn test_timeout_surfaces_as_network_error() {
    let h = common::logged_in_with_timeout(Duration::from_millis(200)).await;
    h.server.mock(|when, then| {
        when.method(GET).path("/api/user/profile");
        then.status(200)
            .delay(Duration::from_secs(2))
            .json_body(json!({"id": 1, "username": "alice"}));
    });

    let err = h.ctx.profile().await.unwrap_err();

    assert!(matches!(err, Error::Network(_)));
    assert!(h.ctx.state().authenticated);
}

#[tokio::test]
async fn test_unexpected_body_is_a_decode_error() {
    let h = common::logged_in().await;
    h.server.mock(|when, then| {
        when.method(GET).path("/api/user/likes");
        then.status(200).json_body(json!({"not": "a list"}));
    });

    let err = client::movies::list(h.ctx.gateway(), StatusKind::Liked)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

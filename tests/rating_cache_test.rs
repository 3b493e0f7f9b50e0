mod common;

use std::time::Duration;

use httpmock::prelude::*;
use reelsync::{
    Error,
    management::{MAX_RATING, MIN_RATING},
    types::{MovieId, RatingRecord},
};
use serde_json::json;

fn record(id: u64, rating: f64) -> RatingRecord {
    RatingRecord {
        movie_id: MovieId::new(id).unwrap(),
        rating,
    }
}

#[tokio::test]
async fn test_set_rating_zero_removes_entry() {
    let h = common::logged_in().await;
    let ratings = h.ctx.ratings();

    ratings.set_rating(12, 6.5).unwrap();
    assert!(ratings.contains(12));
    assert_eq!(ratings.get_rating(12), 6.5);

    ratings.set_rating(12, 0.0).unwrap();
    assert!(!ratings.contains(12));
    assert_eq!(ratings.get_rating(12), 0.0);
}

#[tokio::test]
async fn test_set_rating_rejects_invalid_id() {
    let h = common::logged_in().await;

    let err = h.ctx.ratings().set_rating("x12", 5.0).unwrap_err();

    assert!(matches!(err, Error::InvalidId { .. }));
    assert!(h.ctx.ratings().snapshot().is_empty());
}

#[tokio::test]
async fn test_hydrate_skips_unrated_and_is_idempotent() {
    let h = common::logged_in().await;
    let ratings = h.ctx.ratings();
    let records = [record(1, 8.0), record(2, 0.0), record(3, -1.0), record(4, 3.5)];

    ratings.hydrate(&records);
    let first = ratings.snapshot();
    ratings.hydrate(&records);

    assert!(ratings.is_hydrated());
    assert_eq!(ratings.snapshot(), first);
    assert_eq!(first.len(), 2);
    assert!(!ratings.contains(2));
    assert!(!ratings.contains(3));
    assert_eq!(ratings.get_rating(4), 3.5);
}

#[tokio::test]
async fn test_rate_posts_rating_and_updates_cache() {
    let h = common::logged_in().await;
    let mock = h.server.mock(|when, then| {
        when.method(POST)
            .path("/api/movie/21/rate")
            .json_body(json!({"rating": 8.0}));
        then.status(200).json_body(json!({"message": "Rating saved"}));
    });

    h.ctx.rate(21, 8.0).await.unwrap();

    mock.assert();
    assert_eq!(h.ctx.ratings().get_rating(21), 8.0);
}

#[tokio::test]
async fn test_rate_out_of_range_is_rejected_without_request() {
    let h = common::logged_in().await;
    let mock = h.server.mock(|when, then| {
        when.any_request();
        then.status(200).json_body(json!({}));
    });

    for rating in [MAX_RATING + 1.0, MIN_RATING - 1.0, f64::NAN] {
        let err = h.ctx.rate(21, rating).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRating { .. }));
    }

    assert_eq!(mock.hits(), 0);
    assert!(!h.ctx.ratings().contains(21));
}

#[tokio::test]
async fn test_failed_rate_keeps_previous_rating() {
    let h = common::logged_in().await;
    h.ctx.ratings().set_rating(21, 4.0).unwrap();
    h.server.mock(|when, then| {
        when.method(POST).path("/api/movie/21/rate");
        then.status(503);
    });

    let err = h.ctx.rate(21, 9.0).await.unwrap_err();

    assert!(matches!(err, Error::Http { .. }));
    assert_eq!(h.ctx.ratings().get_rating(21), 4.0);
}

#[tokio::test]
async fn test_refresh_reads_server_rating() {
    let h = common::logged_in().await;
    h.server.mock(|when, then| {
        when.method(GET).path("/api/movie/30/rating");
        then.status(200).json_body(json!({"rating": 7.5}));
    });
    h.server.mock(|when, then| {
        when.method(GET).path("/api/movie/31/rating");
        then.status(200).json_body(json!({"rating": null}));
    });
    h.server.mock(|when, then| {
        when.method(GET).path("/api/movie/32/rating");
        then.status(404).json_body(json!({"error": "Rating not found"}));
    });
    h.ctx.ratings().set_rating(32, 2.0).unwrap();

    assert_eq!(h.ctx.refresh_rating(30).await.unwrap(), 7.5);
    assert_eq!(h.ctx.refresh_rating(31).await.unwrap(), 0.0);
    assert_eq!(h.ctx.refresh_rating(32).await.unwrap(), 0.0);

    let ratings = h.ctx.ratings();
    assert_eq!(ratings.get_rating(30), 7.5);
    assert!(!ratings.contains(31));
    assert!(!ratings.contains(32));
}

#[tokio::test]
async fn test_sync_hydrates_lists_and_ratings() {
    let h = common::logged_in().await;
    h.server.mock(|when, then| {
        when.method(GET).path("/api/user/likes");
        then.status(200).json_body(json!([{"movie_id": 1}]));
    });
    h.server.mock(|when, then| {
        when.method(GET).path("/api/user/watch-later");
        then.status(200).json_body(json!([{"tmdb_id": 2}]));
    });
    h.server.mock(|when, then| {
        when.method(GET).path("/api/user/watched");
        then.status(200).json_body(json!([{"id": 1}]));
    });
    let rated = h.server.mock(|when, then| {
        when.method(GET).path("/api/movie/1/rating");
        then.status(200).json_body(json!({"rating": 9}));
    });
    let unrated = h.server.mock(|when, then| {
        when.method(GET).path("/api/movie/2/rating");
        then.status(404);
    });

    h.ctx.sync().await.unwrap();

    rated.assert();
    unrated.assert();
    assert!(h.ctx.statuses().is_hydrated());
    assert!(h.ctx.ratings().is_hydrated());
    assert_eq!(h.ctx.ratings().get_rating(1), 9.0);
    assert!(!h.ctx.ratings().contains(2));

    // both caches are hydrated, so nothing is fetched again
    h.ctx.ensure_hydrated().await.unwrap();
    assert_eq!(rated.hits(), 1);
}

#[tokio::test]
async fn test_clear_empties_ratings() {
    let h = common::logged_in().await;
    let ratings = h.ctx.ratings();
    ratings.hydrate(&[record(1, 5.0)]);

    ratings.clear();

    assert!(!ratings.is_hydrated());
    assert!(ratings.snapshot().is_empty());
    assert_eq!(ratings.get_rating(1), 0.0);
}

#[tokio::test]
async fn test_logout_discards_in_flight_rate() {
    let h = common::logged_in().await;
    h.server.mock(|when, then| {
        when.method(POST).path("/api/movie/21/rate");
        then.status(200)
            .delay(Duration::from_millis(400))
            .json_body(json!({"message": "Rating saved"}));
    });

    let (result, _) = tokio::join!(h.ctx.ratings().rate(21, 8.0), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        h.ctx.logout().await;
    });

    assert!(result.is_ok());
    assert!(!h.ctx.state().authenticated);
    assert!(!h.ctx.ratings().contains(21));
}

#[tokio::test]
async fn test_logout_discards_in_flight_refresh() {
    let h = common::logged_in().await;
    h.server.mock(|when, then| {
        when.method(GET).path("/api/movie/30/rating");
        then.status(200)
            .delay(Duration::from_millis(400))
            .json_body(json!({"rating": 6}));
    });

    let (single, _) = tokio::join!(h.ctx.ratings().refresh(30), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        h.ctx.logout().await;
    });
    assert_eq!(single.unwrap(), 6.0);
    assert!(!h.ctx.ratings().contains(30));

    let ids = [MovieId::new(30).unwrap()];
    let (many, _) = tokio::join!(h.ctx.ratings().refresh_many(&ids), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        h.ctx.ratings().clear();
    });
    assert!(many.is_ok());
    assert!(!h.ctx.ratings().is_hydrated());
    assert!(h.ctx.ratings().snapshot().is_empty());
}

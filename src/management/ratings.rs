use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use reqwest::StatusCode;

use crate::{
    client::{self, HttpClientGateway},
    error::{Error, Result},
    management::{ChangeEvent, EventHub},
    types::{IntoMovieId, MovieId, RatingRecord},
};

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 10.0;

#[derive(Default)]
struct RatingState {
    ratings: HashMap<MovieId, f64>,
    hydrated: bool,
    // bumped by every clear
    generation: u64,
}

/// Movie -> rating mapping for the current user. Unrated movies have no
/// entry; a stored rating is always positive.
pub struct MovieRatingCache {
    gateway: Arc<HttpClientGateway>,
    state: Mutex<RatingState>,
    events: EventHub,
}

impl MovieRatingCache {
    pub fn new(gateway: Arc<HttpClientGateway>, events: EventHub) -> Self {
        Self {
            gateway,
            state: Mutex::new(RatingState::default()),
            events,
        }
    }

    pub fn hydrate(&self, ratings: &[RatingRecord]) {
        self.replace_all(ratings, None);
    }

    fn replace_all(&self, ratings: &[RatingRecord], generation: Option<u64>) -> bool {
        let ratings: HashMap<MovieId, f64> = ratings
            .iter()
            .filter(|r| r.rating > 0.0)
            .map(|r| (r.movie_id, r.rating))
            .collect();
        let count = ratings.len();

        {
            let mut state = self.lock();
            if generation.is_some_and(|g| g != state.generation) {
                return false;
            }
            state.ratings = ratings;
            state.hydrated = true;
        }

        tracing::debug!(count, "rating cache hydrated");
        self.events.publish(ChangeEvent::RatingsHydrated { count });
        true
    }

    /// Stores a positive rating; anything else removes the entry.
    pub fn set_rating(&self, movie_id: impl IntoMovieId, rating: f64) -> Result<()> {
        let id = movie_id.into_movie_id()?;
        self.store(id, rating, None);
        Ok(())
    }

    fn store(&self, id: MovieId, rating: f64, generation: Option<u64>) -> bool {
        let stored = {
            let mut state = self.lock();
            if generation.is_some_and(|g| g != state.generation) {
                return false;
            }
            if rating > 0.0 {
                state.ratings.insert(id, rating);
                rating
            } else {
                state.ratings.remove(&id);
                0.0
            }
        };

        self.events.publish(ChangeEvent::RatingChanged {
            movie_id: id,
            rating: stored,
        });
        true
    }

    /// Stored rating, or `0.0` for unrated movies and invalid identifiers.
    pub fn get_rating(&self, movie_id: impl IntoMovieId) -> f64 {
        match movie_id.into_movie_id() {
            Ok(id) => self.lock().ratings.get(&id).copied().unwrap_or(0.0),
            Err(_) => 0.0,
        }
    }

    pub fn contains(&self, movie_id: impl IntoMovieId) -> bool {
        match movie_id.into_movie_id() {
            Ok(id) => self.lock().ratings.contains_key(&id),
            Err(_) => false,
        }
    }

    pub fn is_hydrated(&self) -> bool {
        self.lock().hydrated
    }

    pub fn snapshot(&self) -> HashMap<MovieId, f64> {
        self.lock().ratings.clone()
    }

    pub fn clear(&self) {
        {
            let mut state = self.lock();
            state.ratings.clear();
            state.hydrated = false;
            state.generation += 1;
        }
        self.events.publish(ChangeEvent::RatingsCleared);
    }

    /// Submits a rating and records it locally once the server accepts it.
    ///
    /// Like every server-backed call here, the local write is skipped when
    /// the cache was cleared while the request was in flight.
    pub async fn rate(&self, movie_id: impl IntoMovieId, rating: f64) -> Result<()> {
        let id = movie_id.into_movie_id()?;
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(Error::InvalidRating {
                rating,
                min: MIN_RATING,
                max: MAX_RATING,
            });
        }

        let generation = self.generation();
        client::movies::rate(&self.gateway, id, rating).await?;
        self.store_current(id, rating, generation);
        Ok(())
    }

    /// Re-reads one movie's rating from the server.
    pub async fn refresh(&self, movie_id: impl IntoMovieId) -> Result<f64> {
        let id = movie_id.into_movie_id()?;
        let generation = self.generation();
        let rating = self.fetch(id).await?;
        self.store_current(id, rating, generation);
        Ok(rating)
    }

    /// Rebuilds the whole mapping from the server's per-movie ratings.
    pub async fn refresh_many(&self, movie_ids: &[MovieId]) -> Result<()> {
        let generation = self.generation();
        let mut records = Vec::with_capacity(movie_ids.len());
        for &movie_id in movie_ids {
            let rating = self.fetch(movie_id).await?;
            records.push(RatingRecord { movie_id, rating });
        }
        if !self.replace_all(&records, Some(generation)) {
            tracing::debug!("discarding ratings fetched before the cache was cleared");
        }
        Ok(())
    }

    // a movie the server has no rating for comes back as 404 or null
    async fn fetch(&self, id: MovieId) -> Result<f64> {
        match client::movies::rating(&self.gateway, id).await {
            Ok(rating) => Ok(rating.unwrap_or(0.0)),
            Err(Error::Http { status, .. }) if status == StatusCode::NOT_FOUND => Ok(0.0),
            Err(e) => Err(e),
        }
    }

    fn generation(&self) -> u64 {
        self.lock().generation
    }

    fn store_current(&self, id: MovieId, rating: f64, generation: u64) {
        if !self.store(id, rating, Some(generation)) {
            tracing::debug!(movie_id = %id, "discarding rating fetched before the cache was cleared");
        }
    }

    fn lock(&self) -> MutexGuard<'_, RatingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

use std::sync::Arc;

use tokio::sync::broadcast::Receiver;

use crate::{
    client::{self, HttpClientGateway},
    config::Settings,
    error::{Error, Result},
    management::{
        AuthSessionStore, ChangeEvent, EventHub, KeyValueStore, MovieRatingCache, MovieStatusCache,
        StatusLists,
    },
    navigation::Navigator,
    types::{AuthState, Credentials, IntoMovieId, MovieId, Profile, Registration, StatusKind, User},
};

/// The session store, the gateway and both caches, wired together.
///
/// Build one per process with [`SyncContext::new`], call
/// [`SyncContext::init`] once, and hand references to whoever needs to read
/// or change state. Tests build a fresh context per case.
///
/// Calls made through the context keep the caches consistent with the
/// session: they are emptied on login, logout and forced expiry. Code that
/// uses the caches directly should do the same when it sees
/// [`Error::SessionExpired`] or [`ChangeEvent::SessionExpired`].
pub struct SyncContext {
    settings: Settings,
    events: EventHub,
    session: Arc<AuthSessionStore>,
    gateway: Arc<HttpClientGateway>,
    statuses: MovieStatusCache,
    ratings: MovieRatingCache,
}

impl SyncContext {
    pub fn new(
        settings: Settings,
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let events = EventHub::new();
        let session = Arc::new(AuthSessionStore::new(storage, events.clone()));
        let gateway = Arc::new(HttpClientGateway::new(
            &settings,
            Arc::clone(&session),
            navigator,
        )?);
        let statuses = MovieStatusCache::new(Arc::clone(&gateway), events.clone());
        let ratings = MovieRatingCache::new(Arc::clone(&gateway), events.clone());

        Ok(Self {
            settings,
            events,
            session,
            gateway,
            statuses,
            ratings,
        })
    }

    /// Restores the persisted session. Caches start stale.
    pub async fn init(&self) -> Result<AuthState> {
        self.session.init().await
    }

    /// Back to a blank slate: anonymous session, empty stale caches.
    pub async fn reset(&self) {
        self.session.logout().await;
        self.clear_caches();
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &AuthSessionStore {
        &self.session
    }

    pub fn gateway(&self) -> &HttpClientGateway {
        &self.gateway
    }

    pub fn statuses(&self) -> &MovieStatusCache {
        &self.statuses
    }

    pub fn ratings(&self) -> &MovieRatingCache {
        &self.ratings
    }

    pub fn state(&self) -> AuthState {
        self.session.state()
    }

    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        let user = self.session.login(&self.gateway, credentials).await?;
        self.clear_caches();
        Ok(user)
    }

    pub async fn register(&self, registration: &Registration) -> Result<User> {
        let user = self.session.register(&self.gateway, registration).await?;
        self.clear_caches();
        Ok(user)
    }

    pub async fn logout(&self) {
        self.session.logout().await;
        self.clear_caches();
    }

    pub async fn profile(&self) -> Result<Profile> {
        let result = client::auth::profile(&self.gateway).await;
        self.observe(result)
    }

    /// Hydrates both caches from the server: the three lists first, then
    /// the rating of every movie found in them.
    pub async fn sync(&self) -> Result<()> {
        let result = self.statuses.refresh().await;
        self.observe(result)?;
        if !self.statuses.is_hydrated() {
            // cleared while the lists were loading
            return Ok(());
        }

        let mut movies: Vec<MovieId> = self.statuses.snapshot().all_movies().into_iter().collect();
        movies.sort();
        let result = self.ratings.refresh_many(&movies).await;
        self.observe(result)
    }

    /// Reloads the three lists into the status cache and returns their
    /// records.
    pub async fn library(&self) -> Result<StatusLists> {
        let result = self.statuses.refresh().await;
        self.observe(result)
    }

    /// Syncs only when one of the caches has not been hydrated in this
    /// session.
    pub async fn ensure_hydrated(&self) -> Result<()> {
        if self.statuses.is_hydrated() && self.ratings.is_hydrated() {
            return Ok(());
        }
        self.sync().await
    }

    pub async fn toggle(&self, kind: StatusKind, movie_id: impl IntoMovieId) -> Result<bool> {
        let result = self.statuses.toggle(kind, movie_id).await;
        self.observe(result)
    }

    pub async fn rate(&self, movie_id: impl IntoMovieId, rating: f64) -> Result<()> {
        let result = self.ratings.rate(movie_id, rating).await;
        self.observe(result)
    }

    pub async fn refresh_rating(&self, movie_id: impl IntoMovieId) -> Result<f64> {
        let result = self.ratings.refresh(movie_id).await;
        self.observe(result)
    }

    fn clear_caches(&self) {
        self.statuses.clear();
        self.ratings.clear();
    }

    fn observe<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(Error::SessionExpired) = &result {
            self.clear_caches();
        }
        result
    }
}

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    client::{self, HttpClientGateway},
    error::{Error, Result},
    management::{ChangeEvent, EventHub, KeyValueStore},
    types::{AuthState, Credentials, Registration, Session, User},
};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const USER_KEY: &str = "user";

/// Owner of the live [`Session`].
///
/// Memory and the persistent store are kept in step: the token and the
/// serialized user are written under [`ACCESS_TOKEN_KEY`] and [`USER_KEY`]
/// when a session is established and both keys are removed when it ends.
/// Reads through [`AuthSessionStore::state`] never touch the store.
pub struct AuthSessionStore {
    storage: Arc<dyn KeyValueStore>,
    session: Mutex<Session>,
    // set by the first forced expiry, cleared when a new session begins
    redirect_pending: AtomicBool,
    events: EventHub,
}

impl AuthSessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, events: EventHub) -> Self {
        Self {
            storage,
            session: Mutex::new(Session::default()),
            redirect_pending: AtomicBool::new(false),
            events,
        }
    }

    /// Loads the session persisted by a previous run.
    ///
    /// A token alone is enough to count as authenticated. A user record that
    /// fails to parse is dropped with a warning; a user record without a
    /// token is ignored.
    pub async fn init(&self) -> Result<AuthState> {
        let token = self.storage.get(ACCESS_TOKEN_KEY).await?;
        let user = match (&token, self.storage.get(USER_KEY).await?) {
            (Some(_), Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring unreadable persisted user record");
                    None
                }
            },
            _ => None,
        };

        *self.lock() = Session { token, user };
        let state = self.state();
        tracing::debug!(authenticated = state.authenticated, "session hydrated from storage");
        self.publish_state(&state);
        Ok(state)
    }

    pub fn state(&self) -> AuthState {
        let session = self.lock();
        AuthState {
            authenticated: session.is_authenticated(),
            user: session.user.clone(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    /// True while a forced expiry is waiting for the user to log in again.
    pub fn redirect_pending(&self) -> bool {
        self.redirect_pending.load(Ordering::SeqCst)
    }

    /// Exchanges credentials for a session. On failure the store stays
    /// anonymous.
    pub async fn login(&self, gateway: &HttpClientGateway, credentials: &Credentials) -> Result<User> {
        let response = client::auth::login(gateway, credentials).await?;
        let user = self.establish(response.access_token, response.user).await?;
        tracing::info!(username = %user.username, "logged in");
        Ok(user)
    }

    /// Creates an account and starts a session for it.
    ///
    /// Servers that answer registration with a token get it adopted
    /// directly; servers that only confirm the account get a follow-up
    /// login with the same credentials.
    pub async fn register(&self, gateway: &HttpClientGateway, registration: &Registration) -> Result<User> {
        let response = client::auth::register(gateway, registration).await?;

        let user = match (response.access_token, response.user) {
            (Some(token), Some(user)) => self.establish(token, user).await?,
            _ => {
                tracing::debug!(
                    message = response.message.as_deref().unwrap_or_default(),
                    "registration returned no session, logging in"
                );
                self.login(gateway, &registration.credentials()).await?
            }
        };

        tracing::info!(username = %user.username, "registered");
        Ok(user)
    }

    /// Ends the session. Never fails: storage errors are logged.
    pub async fn logout(&self) {
        self.teardown().await;
        tracing::info!("logged out");
    }

    /// Forced expiry after a 401.
    ///
    /// `request_token` is the token the rejected request was sent with. A
    /// rejection of a token that has since been replaced by a newer login is
    /// stale and leaves the current session alone.
    ///
    /// Returns `true` only for the call that actually tore the session down;
    /// that caller is responsible for the single navigation to the login
    /// route.
    pub async fn expire(&self, request_token: Option<&str>) -> bool {
        {
            let session = self.lock();
            if session.token.is_some() && session.token.as_deref() != request_token {
                tracing::debug!("ignoring 401 for a superseded token");
                return false;
            }
        }

        if self
            .redirect_pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        self.teardown().await;
        self.events.publish(ChangeEvent::SessionExpired);
        tracing::info!("session expired");
        true
    }

    async fn establish(&self, token: String, user: User) -> Result<User> {
        let serialized = serde_json::to_string(&user).map_err(Error::Serialization)?;
        self.storage.set(ACCESS_TOKEN_KEY, &token).await?;
        if let Err(e) = self.storage.set(USER_KEY, &serialized).await {
            let _ = self.storage.remove(ACCESS_TOKEN_KEY).await;
            return Err(e);
        }

        *self.lock() = Session {
            token: Some(token),
            user: Some(user.clone()),
        };
        self.redirect_pending.store(false, Ordering::SeqCst);
        self.publish_state(&self.state());
        Ok(user)
    }

    async fn teardown(&self) {
        *self.lock() = Session::default();

        for key in [ACCESS_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key).await {
                tracing::warn!(key, error = %e, "failed to remove persisted session key");
            }
        }

        self.publish_state(&AuthState::default());
    }

    fn publish_state(&self, state: &AuthState) {
        self.events.publish(ChangeEvent::SessionChanged {
            authenticated: state.authenticated,
            user: state.user.clone(),
        });
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! # Movie Server Client
//!
//! Every request to the movie server goes through [`HttpClientGateway`]. It
//! owns the single `reqwest::Client`, attaches the bearer token of the live
//! session and turns a 401 into a forced logout plus one navigation to the
//! login route.
//!
//! ```text
//! Caches / Session Store
//!          ↓
//! Endpoint functions (auth, movies)
//!          ↓
//! HttpClientGateway (token, timeout, expiry)
//!          ↓
//! Movie server
//! ```
//!
//! The endpoint functions in [`auth`] and [`movies`] only know paths and
//! payload shapes; they never look at the session themselves.
//!
//! ## Error mapping
//!
//! - transport failures and timeouts become [`Error::Network`]
//! - 401 on a regular request becomes [`Error::SessionExpired`] after the
//!   session has been torn down
//! - 401 on a credential exchange (login, register) is left to the caller,
//!   since there is no session to expire
//! - everything else non-2xx becomes [`Error::Http`] with the server's
//!   `error` message when one was sent
//!
//! Nothing is retried.

use std::sync::Arc;

use reqwest::{Client, Method, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    config::Settings,
    error::{Error, Result},
    management::AuthSessionStore,
    navigation::Navigator,
    types::ErrorBody,
};

pub mod auth;
pub mod movies;

/// A request relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<Value>,
    credential_exchange: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            credential_exchange: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Marks the request as a login/registration call whose 401 means
    /// "wrong credentials" rather than "session expired".
    pub fn credential_exchange(mut self) -> Self {
        self.credential_exchange = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Single choke point for outbound requests.
pub struct HttpClientGateway {
    client: Client,
    base_url: String,
    login_route: String,
    session: Arc<AuthSessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl HttpClientGateway {
    pub fn new(
        settings: &Settings,
        session: Arc<AuthSessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(Error::Network)?;

        Ok(Self {
            client,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            login_route: settings.login_route.clone(),
            session,
            navigator,
        })
    }

    pub fn session(&self) -> &Arc<AuthSessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a request and returns the response if its status is 2xx.
    pub async fn send(&self, request: ApiRequest) -> Result<Response> {
        let url = format!("{}{}", self.base_url, request.path);
        let token = self.session.token();

        let mut builder = self.client.request(request.method.clone(), url.as_str());
        if let Some(token) = &token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            authenticated = token.is_some(),
            "sending request"
        );

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(path = %request.path, error = %e, "request failed");
            Error::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED && !request.credential_exchange {
            if self.session.expire(token.as_deref()).await {
                tracing::warn!(route = %self.login_route, "session expired, navigating to login");
                self.navigator.navigate(&self.login_route);
            }
            return Err(Error::SessionExpired);
        }

        let message = error_message(response).await;
        tracing::debug!(%status, path = %request.path, ?message, "request rejected");
        Err(Error::Http { status, message })
    }

    /// Sends a request and decodes a JSON response body.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await.map_err(Error::Network)?;
        serde_json::from_slice(&bytes).map_err(Error::Decode)
    }
}

async fn error_message(response: Response) -> Option<String> {
    let text = response.text().await.ok()?;
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.into_message(),
        Err(_) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
}

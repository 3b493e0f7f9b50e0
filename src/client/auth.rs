use crate::{
    client::{ApiRequest, HttpClientGateway},
    error::{Error, Result},
    types::{Credentials, LoginResponse, Profile, RegisterResponse, Registration},
};

const LOGIN_FAILED: &str = "Failed to login";
const REGISTRATION_FAILED: &str = "Registration failed";

/// Exchanges username and password for an access token.
///
/// The request is sent as a credential exchange, so a 401 here means wrong
/// credentials and never tears down a live session.
///
/// # Arguments
///
/// * `gateway` - Gateway the request is sent through
/// * `credentials` - Username and password, sent as the JSON body
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(LoginResponse)` - Access token and user record
/// - `Err(Error)` - See below
///
/// # Errors
///
/// - Any 4xx becomes [`Error::Auth`] with the server's `error` message, or
///   "Failed to login" when there is none
/// - Transport failures and timeouts are [`Error::Network`]
/// - 5xx responses pass through as [`Error::Http`]
///
/// # API Endpoint
///
/// `POST /auth/login` with `{ "username", "password" }`
pub async fn login(gateway: &HttpClientGateway, credentials: &Credentials) -> Result<LoginResponse> {
    let request = ApiRequest::post("/auth/login")
        .json(credentials)?
        .credential_exchange();

    gateway
        .fetch(request)
        .await
        .map_err(|e| rejected_as_auth(e, LOGIN_FAILED))
}

/// Creates an account.
///
/// Depending on the server version the answer either carries a full session
/// (`access_token` and `user`) or only a confirmation `message`; callers
/// handle both.
///
/// # Arguments
///
/// * `gateway` - Gateway the request is sent through
/// * `registration` - Username, email and password
///
/// # Errors
///
/// - Any 4xx (duplicate username, missing field) becomes [`Error::Auth`]
///   with the server's message verbatim, or "Registration failed"
/// - Transport failures and 5xx responses pass through unchanged
///
/// # API Endpoint
///
/// `POST /auth/register` with `{ "username", "email", "password" }`
pub async fn register(
    gateway: &HttpClientGateway,
    registration: &Registration,
) -> Result<RegisterResponse> {
    let request = ApiRequest::post("/auth/register")
        .json(registration)?
        .credential_exchange();

    gateway
        .fetch(request)
        .await
        .map_err(|e| rejected_as_auth(e, REGISTRATION_FAILED))
}

/// Retrieves the logged-in user's profile with its counters.
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Profile)` - User record plus `watchlist_count` and `ratings_count`
/// - `Err(Error::SessionExpired)` - The token was rejected
/// - `Err(Error)` - Network, HTTP or decode failures
///
/// # API Endpoint
///
/// `GET /user/profile`
pub async fn profile(gateway: &HttpClientGateway) -> Result<Profile> {
    gateway.fetch(ApiRequest::get("/user/profile")).await
}

fn rejected_as_auth(err: Error, fallback: &str) -> Error {
    match err {
        Error::Http { status, message } if status.is_client_error() => Error::Auth {
            message: message.unwrap_or_else(|| fallback.to_string()),
        },
        other => other,
    }
}

use crate::{
    client::{ApiRequest, HttpClientGateway},
    error::Result,
    types::{
        MovieId, MovieRecord, MovieRef, RateRequest, RateResponse, RatingResponse, StatusKind,
        ToggleResponse,
    },
};

/// Path of the list endpoint backing a status set.
pub fn list_path(kind: StatusKind) -> &'static str {
    match kind {
        StatusKind::Liked => "/user/likes",
        StatusKind::WatchLater => "/user/watch-later",
        StatusKind::Watched => "/user/watched",
    }
}

/// Builds the toggle request for a status set. Watch-later keeps the movie
/// in the path; the other two send it in the body.
pub fn toggle_request(kind: StatusKind, id: MovieId) -> Result<ApiRequest> {
    match kind {
        StatusKind::WatchLater => Ok(ApiRequest::post(format!("/movie/{id}/watch-later"))),
        StatusKind::Liked | StatusKind::Watched => {
            ApiRequest::post(list_path(kind)).json(&MovieRef { movie_id: id })
        }
    }
}

/// Retrieves one of the user's lists.
///
/// # Arguments
///
/// * `gateway` - Gateway the request is sent through
/// * `kind` - Which list to load
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Vec<MovieRecord>)` - Records as sent by the server; identifiers are
///   not validated here
/// - `Err(Error)` - Network, HTTP, decode failures or an expired session
///
/// # API Endpoint
///
/// `GET /user/likes`, `GET /user/watch-later` or `GET /user/watched`
pub async fn list(gateway: &HttpClientGateway, kind: StatusKind) -> Result<Vec<MovieRecord>> {
    gateway.fetch(ApiRequest::get(list_path(kind))).await
}

/// Flips a movie's membership in one list on the server.
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(ToggleResponse)` - `added` holds the membership after the flip
/// - `Err(Error)` - Network, HTTP, decode failures or an expired session
///
/// # API Endpoint
///
/// See [`toggle_request`] for the per-list request shape.
pub async fn toggle(gateway: &HttpClientGateway, kind: StatusKind, id: MovieId) -> Result<ToggleResponse> {
    gateway.fetch(toggle_request(kind, id)?).await
}

/// Submits the user's rating for a movie.
///
/// The value is sent as-is; range checks belong to the caller.
///
/// # Arguments
///
/// * `gateway` - Gateway the request is sent through
/// * `id` - Movie being rated
/// * `rating` - Rating to store
///
/// # API Endpoint
///
/// `POST /movie/{id}/rate` with `{ "rating" }`
pub async fn rate(gateway: &HttpClientGateway, id: MovieId, rating: f64) -> Result<RateResponse> {
    let request = ApiRequest::post(format!("/movie/{id}/rate")).json(&RateRequest { rating })?;
    gateway.fetch(request).await
}

/// Retrieves the user's rating for a movie.
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Some(rating))` - A positive rating
/// - `Ok(None)` - The server answered with a null or non-positive rating
/// - `Err(Error::Http)` - Including 404 for movies the user never rated
///
/// # API Endpoint
///
/// `GET /movie/{id}/rating`
pub async fn rating(gateway: &HttpClientGateway, id: MovieId) -> Result<Option<f64>> {
    let response: RatingResponse = gateway
        .fetch(ApiRequest::get(format!("/movie/{id}/rating")))
        .await?;
    Ok(response.rating.filter(|r| *r > 0.0))
}

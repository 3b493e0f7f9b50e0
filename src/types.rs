use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tabled::Tabled;

use crate::error::{Error, Result};

/// Canonical movie identifier: a positive integer.
///
/// Every cache key goes through this type, so `"42"`, `42` and `42.0` all
/// address the same entry while `"abc"`, `0` and `-3` never make it past
/// validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawId", into = "u64")]
pub struct MovieId(u64);

impl MovieId {
    pub fn new(value: u64) -> Result<Self> {
        if value == 0 {
            return Err(Error::invalid_id("0"));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MovieId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_id(s));
        }
        let value = trimmed.parse::<u64>().map_err(|_| Error::invalid_id(s))?;
        Self::new(value).map_err(|_| Error::invalid_id(s))
    }
}

impl From<MovieId> for u64 {
    fn from(id: MovieId) -> Self {
        id.0
    }
}

impl TryFrom<i64> for MovieId {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        if value <= 0 {
            return Err(Error::invalid_id(value.to_string()));
        }
        Ok(Self(value as u64))
    }
}

impl TryFrom<f64> for MovieId {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        if !value.is_finite() || value.fract() != 0.0 || value <= 0.0 || value > u64::MAX as f64 {
            return Err(Error::invalid_id(value.to_string()));
        }
        Ok(Self(value as u64))
    }
}

/// Identifier as it appears on the wire, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl TryFrom<RawId> for MovieId {
    type Error = Error;

    fn try_from(raw: RawId) -> Result<Self> {
        match raw {
            RawId::Int(v) => MovieId::try_from(v),
            RawId::Float(v) => MovieId::try_from(v),
            RawId::Text(s) => s.parse(),
        }
    }
}

/// Anything a caller may hand over as a movie identifier.
pub trait IntoMovieId {
    fn into_movie_id(self) -> Result<MovieId>;
}

impl IntoMovieId for MovieId {
    fn into_movie_id(self) -> Result<MovieId> {
        Ok(self)
    }
}

impl IntoMovieId for u64 {
    fn into_movie_id(self) -> Result<MovieId> {
        MovieId::new(self)
    }
}

impl IntoMovieId for u32 {
    fn into_movie_id(self) -> Result<MovieId> {
        MovieId::new(u64::from(self))
    }
}

impl IntoMovieId for i64 {
    fn into_movie_id(self) -> Result<MovieId> {
        MovieId::try_from(self)
    }
}

impl IntoMovieId for i32 {
    fn into_movie_id(self) -> Result<MovieId> {
        MovieId::try_from(i64::from(self))
    }
}

impl IntoMovieId for &str {
    fn into_movie_id(self) -> Result<MovieId> {
        self.parse()
    }
}

impl IntoMovieId for String {
    fn into_movie_id(self) -> Result<MovieId> {
        self.parse()
    }
}

/// The three per-user relation sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusKind {
    #[serde(alias = "likes", alias = "favorites")]
    Liked,
    #[serde(alias = "watchlist", alias = "watch_later")]
    WatchLater,
    Watched,
}

impl StatusKind {
    pub const ALL: [StatusKind; 3] = [StatusKind::Liked, StatusKind::WatchLater, StatusKind::Watched];

    pub fn as_str(self) -> &'static str {
        match self {
            StatusKind::Liked => "liked",
            StatusKind::WatchLater => "watch-later",
            StatusKind::Watched => "watched",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "liked" | "likes" | "favorites" => Ok(StatusKind::Liked),
            // "watchlist" is the historical name of the watch-later set
            "watch-later" | "watch_later" | "watchlist" => Ok(StatusKind::WatchLater),
            "watched" => Ok(StatusKind::Watched),
            other => Err(format!(
                "unknown status kind '{other}', expected liked, watch-later or watched"
            )),
        }
    }
}

/// User record as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Token and user pair for the current client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Synchronous view of the session handed to consumers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub authenticated: bool,
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}

/// Registration answers either with a full session or with a bare message.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub access_token: Option<String>,
    pub user: Option<User>,
    pub message: Option<String>,
}

/// Error payload sent by the server alongside non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub watchlist_count: Option<u64>,
    #[serde(default)]
    pub ratings_count: Option<u64>,
    #[serde(flatten)]
    pub user: User,
}

/// Movie entry from one of the list endpoints.
///
/// Records coming from different endpoints name their identifier
/// differently; [`MovieRecord::movie_id`] resolves it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieRecord {
    pub tmdb_id: Option<RawId>,
    pub movie_id: Option<RawId>,
    pub id: Option<RawId>,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub added_at: Option<NaiveDateTime>,
}

impl MovieRecord {
    /// Canonical identifier of the record.
    ///
    /// Precedence is `tmdb_id`, then `movie_id`, then `id`: the first field
    /// present decides, and an invalid value there is an error rather than a
    /// reason to fall through to the next field.
    pub fn movie_id(&self) -> Result<MovieId> {
        let raw = self
            .tmdb_id
            .as_ref()
            .or(self.movie_id.as_ref())
            .or(self.id.as_ref())
            .ok_or_else(|| Error::malformed("record has no tmdb_id, movie_id or id"))?;

        MovieId::try_from(raw.clone()).map_err(|_| {
            Error::malformed(format!(
                "identifier {raw:?} of {} is not a positive integer",
                self.title.as_deref().unwrap_or("untitled record")
            ))
        })
    }

    pub fn with_id(id: i64) -> Self {
        Self {
            id: Some(RawId::Int(id)),
            ..Default::default()
        }
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(&s).ok().map(|dt| dt.naive_utc()))
    }))
}

/// Answer of every toggle endpoint. Older servers report watched state
/// under `watched` instead of `added`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleResponse {
    pub message: Option<String>,
    #[serde(alias = "watched")]
    pub added: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieRef {
    pub movie_id: MovieId,
}

#[derive(Debug, Clone, Serialize)]
pub struct RateRequest {
    pub rating: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateResponse {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingResponse {
    #[serde(default)]
    pub rating: Option<f64>,
}

/// One entry of a ratings snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatingRecord {
    pub movie_id: MovieId,
    pub rating: f64,
}

#[derive(Tabled)]
pub struct StatusTableRow {
    pub movie: u64,
    pub liked: String,
    pub watch_later: String,
    pub watched: String,
    pub rating: String,
}

#[derive(Tabled)]
pub struct LibraryTableRow {
    pub list: String,
    pub movie: u64,
    pub title: String,
    pub added: String,
}

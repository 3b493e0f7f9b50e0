use std::time::Duration;

use chrono::NaiveDateTime;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    management::{MovieRatingCache, StatusSnapshot},
    types::{LibraryTableRow, MovieId, MovieRecord, StatusKind, StatusTableRow},
};

pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

pub fn check_mark(member: bool) -> String {
    if member { "✓".to_string() } else { "-".to_string() }
}

/// One decimal for fractional ratings, none for whole ones, `-` for unrated.
pub fn format_rating(rating: f64) -> String {
    if rating <= 0.0 {
        "-".to_string()
    } else if rating.fract() == 0.0 {
        format!("{rating:.0}")
    } else {
        format!("{rating:.1}")
    }
}

pub fn format_added_at(added_at: Option<NaiveDateTime>) -> String {
    added_at
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn status_row(
    movie_id: MovieId,
    statuses: &StatusSnapshot,
    ratings: &MovieRatingCache,
) -> StatusTableRow {
    StatusTableRow {
        movie: movie_id.get(),
        liked: check_mark(statuses.liked.contains(&movie_id)),
        watch_later: check_mark(statuses.watch_later.contains(&movie_id)),
        watched: check_mark(statuses.watched.contains(&movie_id)),
        rating: format_rating(ratings.get_rating(movie_id)),
    }
}

/// Table rows for one list, skipping records without a usable identifier
/// and ordered by most recently added first.
pub fn library_rows(kind: StatusKind, records: &[MovieRecord]) -> Vec<LibraryTableRow> {
    let mut records: Vec<(MovieId, &MovieRecord)> = records
        .iter()
        .filter_map(|r| r.movie_id().ok().map(|id| (id, r)))
        .collect();
    records.sort_by(|(a_id, a), (b_id, b)| b.added_at.cmp(&a.added_at).then(a_id.cmp(b_id)));

    records
        .into_iter()
        .map(|(id, r)| LibraryTableRow {
            list: kind.to_string(),
            movie: id.get(),
            title: r.title.clone().unwrap_or_else(|| "-".to_string()),
            added: format_added_at(r.added_at),
        })
        .collect()
}

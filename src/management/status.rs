use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    client::{self, HttpClientGateway},
    error::Result,
    management::{ChangeEvent, EventHub},
    types::{IntoMovieId, MovieId, MovieRecord, StatusKind},
};

/// Point-in-time copy of the three relation sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub liked: HashSet<MovieId>,
    pub watch_later: HashSet<MovieId>,
    pub watched: HashSet<MovieId>,
}

impl StatusSnapshot {
    pub fn set(&self, kind: StatusKind) -> &HashSet<MovieId> {
        match kind {
            StatusKind::Liked => &self.liked,
            StatusKind::WatchLater => &self.watch_later,
            StatusKind::Watched => &self.watched,
        }
    }

    fn set_mut(&mut self, kind: StatusKind) -> &mut HashSet<MovieId> {
        match kind {
            StatusKind::Liked => &mut self.liked,
            StatusKind::WatchLater => &mut self.watch_later,
            StatusKind::Watched => &mut self.watched,
        }
    }

    /// Every movie present in at least one set.
    pub fn all_movies(&self) -> HashSet<MovieId> {
        self.liked
            .iter()
            .chain(&self.watch_later)
            .chain(&self.watched)
            .copied()
            .collect()
    }
}

/// The three lists as the server returned them, records included.
#[derive(Debug, Clone, Default)]
pub struct StatusLists {
    pub liked: Vec<MovieRecord>,
    pub watch_later: Vec<MovieRecord>,
    pub watched: Vec<MovieRecord>,
}

impl StatusLists {
    pub fn records(&self, kind: StatusKind) -> &[MovieRecord] {
        match kind {
            StatusKind::Liked => &self.liked,
            StatusKind::WatchLater => &self.watch_later,
            StatusKind::Watched => &self.watched,
        }
    }
}

#[derive(Default)]
struct StatusState {
    sets: StatusSnapshot,
    hydrated: bool,
    next_ticket: u64,
    // tickets at or below this were issued before the last clear
    stale_below: u64,
    latest: HashMap<(StatusKind, MovieId), u64>,
}

/// Local mirror of the liked / watch-later / watched sets.
///
/// Toggles are confirmed by the server before anything changes locally, and
/// the server's reported membership is applied as-is. When several toggles
/// on the same movie are in flight, only the response to the most recent
/// one is applied.
pub struct MovieStatusCache {
    gateway: Arc<HttpClientGateway>,
    state: Mutex<StatusState>,
    events: EventHub,
}

impl MovieStatusCache {
    pub fn new(gateway: Arc<HttpClientGateway>, events: EventHub) -> Self {
        Self {
            gateway,
            state: Mutex::new(StatusState::default()),
            events,
        }
    }

    /// Replaces all three sets from server records.
    ///
    /// Every record is validated before anything is replaced; a single
    /// record without a usable identifier fails the whole call and leaves
    /// the cache as it was.
    pub fn hydrate(
        &self,
        liked: &[MovieRecord],
        watch_later: &[MovieRecord],
        watched: &[MovieRecord],
    ) -> Result<()> {
        self.replace_sets(liked, watch_later, watched, None)?;
        Ok(())
    }

    /// Fetches the three lists from the server, hydrates from them and
    /// hands the records back.
    ///
    /// Lists that arrive after a [`MovieStatusCache::clear`] belong to the
    /// previous session and are not cached; the cache then stays stale.
    pub async fn refresh(&self) -> Result<StatusLists> {
        let ticket = self.issue_generation();
        let (liked, watch_later, watched) = tokio::try_join!(
            client::movies::list(&self.gateway, StatusKind::Liked),
            client::movies::list(&self.gateway, StatusKind::WatchLater),
            client::movies::list(&self.gateway, StatusKind::Watched),
        )?;

        if !self.replace_sets(&liked, &watch_later, &watched, Some(ticket))? {
            tracing::debug!("discarding lists fetched before the cache was cleared");
        }
        Ok(StatusLists {
            liked,
            watch_later,
            watched,
        })
    }

    /// Flips membership on the server and returns the confirmed state.
    ///
    /// The identifier is validated before any request is made. If the call
    /// fails the cache is untouched.
    pub async fn toggle(&self, kind: StatusKind, movie_id: impl IntoMovieId) -> Result<bool> {
        let id = movie_id.into_movie_id()?;
        let ticket = self.issue_ticket(kind, id);

        let response = match client::movies::toggle(&self.gateway, kind, id).await {
            Ok(response) => response,
            Err(e) => {
                self.retract_ticket(kind, id, ticket);
                return Err(e);
            }
        };

        if self.apply(kind, id, ticket, response.added) {
            self.events.publish(ChangeEvent::StatusChanged {
                kind,
                movie_id: id,
                member: response.added,
            });
        } else {
            tracing::debug!(%kind, movie_id = %id, "discarding response of superseded toggle");
        }

        Ok(response.added)
    }

    /// Local lookup. An un-hydrated cache answers `false`, as does an
    /// identifier that fails validation.
    pub fn is_member(&self, kind: StatusKind, movie_id: impl IntoMovieId) -> bool {
        match movie_id.into_movie_id() {
            Ok(id) => self.lock().sets.set(kind).contains(&id),
            Err(_) => false,
        }
    }

    pub fn is_liked(&self, movie_id: impl IntoMovieId) -> bool {
        self.is_member(StatusKind::Liked, movie_id)
    }

    pub fn is_in_watch_later(&self, movie_id: impl IntoMovieId) -> bool {
        self.is_member(StatusKind::WatchLater, movie_id)
    }

    pub fn is_watched(&self, movie_id: impl IntoMovieId) -> bool {
        self.is_member(StatusKind::Watched, movie_id)
    }

    pub fn is_hydrated(&self) -> bool {
        self.lock().hydrated
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.lock().sets.clone()
    }

    /// Members of one set in ascending order.
    pub fn members(&self, kind: StatusKind) -> Vec<MovieId> {
        let mut ids: Vec<MovieId> = self.lock().sets.set(kind).iter().copied().collect();
        ids.sort();
        ids
    }

    /// Empties every set and marks the cache stale. Responses to toggles
    /// and refreshes issued before this call are discarded.
    pub fn clear(&self) {
        {
            let mut state = self.lock();
            state.sets = StatusSnapshot::default();
            state.hydrated = false;
            state.stale_below = state.next_ticket;
            state.latest.clear();
        }
        self.events.publish(ChangeEvent::StatusCleared);
    }

    fn replace_sets(
        &self,
        liked: &[MovieRecord],
        watch_later: &[MovieRecord],
        watched: &[MovieRecord],
        ticket: Option<u64>,
    ) -> Result<bool> {
        let sets = StatusSnapshot {
            liked: collect_ids(liked)?,
            watch_later: collect_ids(watch_later)?,
            watched: collect_ids(watched)?,
        };
        let event = ChangeEvent::StatusHydrated {
            liked: sets.liked.len(),
            watch_later: sets.watch_later.len(),
            watched: sets.watched.len(),
        };

        {
            let mut state = self.lock();
            if ticket.is_some_and(|t| t <= state.stale_below) {
                return Ok(false);
            }
            state.sets = sets;
            state.hydrated = true;
        }

        tracing::debug!(?event, "status cache hydrated");
        self.events.publish(event);
        Ok(true)
    }

    // a ticket not bound to any movie, only checked against the last clear
    fn issue_generation(&self) -> u64 {
        let mut state = self.lock();
        state.next_ticket += 1;
        state.next_ticket
    }

    fn issue_ticket(&self, kind: StatusKind, id: MovieId) -> u64 {
        let mut state = self.lock();
        state.next_ticket += 1;
        let ticket = state.next_ticket;
        state.latest.insert((kind, id), ticket);
        ticket
    }

    fn retract_ticket(&self, kind: StatusKind, id: MovieId, ticket: u64) {
        let mut state = self.lock();
        if state.latest.get(&(kind, id)) == Some(&ticket) {
            state.latest.remove(&(kind, id));
        }
    }

    fn apply(&self, kind: StatusKind, id: MovieId, ticket: u64, member: bool) -> bool {
        let mut state = self.lock();
        if ticket <= state.stale_below {
            return false;
        }
        if state.latest.get(&(kind, id)).is_some_and(|&latest| latest > ticket) {
            return false;
        }

        let set = state.sets.set_mut(kind);
        if member {
            set.insert(id);
        } else {
            set.remove(&id);
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, StatusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn collect_ids(records: &[MovieRecord]) -> Result<HashSet<MovieId>> {
    records.iter().map(MovieRecord::movie_id).collect()
}

use tokio::sync::broadcast::{self, Receiver, Sender};

use crate::types::{MovieId, StatusKind, User};

const DEFAULT_CAPACITY: usize = 256;

/// State changes published by the session store and the caches.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    SessionChanged {
        authenticated: bool,
        user: Option<User>,
    },
    SessionExpired,
    StatusChanged {
        kind: StatusKind,
        movie_id: MovieId,
        member: bool,
    },
    StatusHydrated {
        liked: usize,
        watch_later: usize,
        watched: usize,
    },
    StatusCleared,
    /// A rating of `0.0` means the entry was removed.
    RatingChanged {
        movie_id: MovieId,
        rating: f64,
    },
    RatingsHydrated {
        count: usize,
    },
    RatingsCleared,
}

impl ChangeEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::SessionChanged { .. } => "session_changed",
            ChangeEvent::SessionExpired => "session_expired",
            ChangeEvent::StatusChanged { .. } => "status_changed",
            ChangeEvent::StatusHydrated { .. } => "status_hydrated",
            ChangeEvent::StatusCleared => "status_cleared",
            ChangeEvent::RatingChanged { .. } => "rating_changed",
            ChangeEvent::RatingsHydrated { .. } => "ratings_hydrated",
            ChangeEvent::RatingsCleared => "ratings_cleared",
        }
    }
}

/// Fan-out of [`ChangeEvent`]s to any number of subscribers.
///
/// Publishing never blocks and never fails: with no subscriber the event is
/// dropped, and a subscriber that falls more than the channel capacity behind
/// sees `RecvError::Lagged` and skips ahead.
#[derive(Debug, Clone)]
pub struct EventHub {
    sender: Sender<ChangeEvent>,
}

impl EventHub {
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn publish(&self, event: ChangeEvent) {
        tracing::trace!(kind = event.kind(), "publishing change event");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

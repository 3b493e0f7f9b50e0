//! State owners: the session store, the two movie caches, the persistent
//! key-value store they mirror into, and the change-event hub they publish
//! on.

mod events;
mod ratings;
mod session;
mod status;
mod storage;

pub use events::ChangeEvent;
pub use events::EventHub;
pub use ratings::MAX_RATING;
pub use ratings::MIN_RATING;
pub use ratings::MovieRatingCache;
pub use session::ACCESS_TOKEN_KEY;
pub use session::AuthSessionStore;
pub use session::USER_KEY;
pub use status::MovieStatusCache;
pub use status::StatusLists;
pub use status::StatusSnapshot;
pub use storage::FileStore;
pub use storage::KeyValueStore;
pub use storage::MemoryStore;

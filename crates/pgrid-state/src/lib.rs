//! Grid state plumbing: event subscriptions, debouncing and view-state
//! persistence.

mod debounce;
mod error;
mod events;
mod query;
mod session;
mod store;

pub use debounce::{CancellationToken, Clock, Debouncer, ManualClock, SystemClock};
pub use error::{PersistenceError, Result};
pub use events::{Observers, Subscription};
pub use query::QueryParams;
pub use session::{PersistenceSession, grid_name, should_persist, storage_key};
pub use store::{JsonFileStore, MemoryStore, SharedStore, ViewStateStore};

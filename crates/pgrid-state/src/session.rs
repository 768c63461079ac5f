//! Grid view-state persistence.
//!
//! A session lives from grid mount to unmount:
//!
//! 1. [`PersistenceSession::start`] decides whether persistence applies.
//! 2. [`PersistenceSession::restore`] reads the stored snapshot once, minus
//!    any quick-filter search term.
//! 3. [`PersistenceSession::observe`] is fed every state change and only holds
//!    the latest distinct snapshot in memory.
//! 4. [`PersistenceSession::finish`] (or dropping the session) strips the
//!    transient sub-trees and writes once, unless the store already holds an
//!    equal document.

use pgrid_model::{GridConfig, GridViewState};
use tracing::{debug, info, warn};

use crate::error::{PersistenceError, Result};
use crate::query::QueryParams;
use crate::store::SharedStore;

const KEY_PREFIX: &str = "gridState-";

/// Storage key of a grid's persisted state.
pub fn storage_key(name: &str) -> String {
    format!("{KEY_PREFIX}{name}")
}

/// Grid name encoded in a storage key, if it is one.
pub fn grid_name(key: &str) -> Option<&str> {
    key.strip_prefix(KEY_PREFIX).filter(|name| !name.is_empty())
}

/// Whether a grid's layout is saved and restored.
///
/// Requires `save_grid_state`, a non-blank name, and either a query string
/// without parameters or `discard_query_string_save_restrict`.
pub fn should_persist(config: &GridConfig, query: &QueryParams) -> bool {
    config.save_grid_state
        && config.storage_name().is_some()
        && (!query.has_conflicts() || config.discard_query_string_save_restrict)
}

pub struct PersistenceSession {
    key: String,
    store: SharedStore,
    held: Option<GridViewState>,
    finished: bool,
}

impl PersistenceSession {
    /// Begin a session, or `None` when the grid does not persist.
    pub fn start(config: &GridConfig, query: &QueryParams, store: SharedStore) -> Option<Self> {
        if !should_persist(config, query) {
            debug!(
                grid = config.name.as_deref().unwrap_or_default(),
                "view-state persistence disabled"
            );
            return None;
        }
        let name = config.storage_name()?;
        Some(Self {
            key: storage_key(name),
            store,
            held: None,
            finished: false,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the stored snapshot with `quickFilterValues` removed.
    pub fn restore(&self) -> Result<Option<GridViewState>> {
        let Some(stored) = self.store.borrow().read(&self.key)? else {
            return Ok(None);
        };
        let state: GridViewState = serde_json::from_value(stored).map_err(|source| {
            PersistenceError::Deserialization {
                key: self.key.clone(),
                source,
            }
        })?;
        debug!(key = %self.key, "view state restored");
        Ok(Some(state.without_quick_filter()))
    }

    /// Hold `snapshot` if it differs from the held one. Nothing is written.
    pub fn observe(&mut self, snapshot: &GridViewState) -> bool {
        if self.held.as_ref() == Some(snapshot) {
            return false;
        }
        self.held = Some(snapshot.clone());
        true
    }

    pub fn held(&self) -> Option<&GridViewState> {
        self.held.as_ref()
    }

    /// Write the held snapshot. Returns whether the store was written.
    pub fn finish(mut self) -> Result<bool> {
        self.flush()
    }

    fn flush(&mut self) -> Result<bool> {
        if self.finished {
            return Ok(false);
        }
        self.finished = true;
        let Some(held) = self.held.take() else {
            return Ok(false);
        };
        let document = serde_json::to_value(held.without_transient()).map_err(|source| {
            PersistenceError::Serialization {
                key: self.key.clone(),
                source,
            }
        })?;
        // A damaged stored document is simply replaced.
        let current = self.store.borrow().read(&self.key).unwrap_or(None);
        if current.as_ref() == Some(&document) {
            debug!(key = %self.key, "view state unchanged, skipping write");
            return Ok(false);
        }
        self.store.borrow_mut().write(&self.key, &document)?;
        info!(key = %self.key, "view state saved");
        Ok(true)
    }
}

impl Drop for PersistenceSession {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            warn!(key = %self.key, error = %err, "failed to save view state");
        }
    }
}

impl std::fmt::Debug for PersistenceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceSession")
            .field("key", &self.key)
            .field("held", &self.held.is_some())
            .field("finished", &self.finished)
            .finish()
    }
}

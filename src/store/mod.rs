pub mod notify;
pub mod persist;

pub use notify::{Notification, Severity, DEFAULT_NOTIFICATION_DURATION};
pub use persist::{JsonFileStore, MemoryStore, Persistence, Snapshot};

use crate::models::Movie;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// History keeps only the most recent views.
const HISTORY_LIMIT: usize = 20;

/// Criteria used to narrow the remote catalog query. Empty string / zero
/// means unset; the fields carry no cross-field invariants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub language: String,
}

impl FilterState {
    /// Whether any filter is set. Drives the "active" indicator only; the
    /// remote query layer combines set fields on its own.
    pub fn is_active(&self) -> bool {
        !self.year.is_empty() || self.rating > 0.0 || !self.language.is_empty()
    }
}

/// Partial update shallow-merged into the current filters. `None` fields
/// keep their prior value.
#[derive(Debug, Clone, Default)]
pub struct FilterUpdate {
    pub year: Option<String>,
    pub rating: Option<f32>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    DateAdded,
    Rating,
    Alphabetical,
}

struct State {
    favorites: Vec<Movie>,
    history: Vec<Movie>,
    filters: FilterState,
    sort_by: SortBy,
    notifications: Vec<Notification>,
    expiry_tasks: HashMap<Uuid, JoinHandle<()>>,
}

impl State {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            favorites: snapshot.favorites,
            history: snapshot.history,
            filters: snapshot.filters,
            sort_by: snapshot.sort_by,
            notifications: Vec::new(),
            expiry_tasks: HashMap::new(),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            favorites: self.favorites.clone(),
            history: self.history.clone(),
            filters: self.filters.clone(),
            sort_by: self.sort_by,
        }
    }
}

struct Inner {
    state: Mutex<State>,
    persistence: Box<dyn Persistence>,
}

/// Single owner of favorites, history, filters, sort policy, and the
/// notification queue. Views read through the accessors and mutate only via
/// the operations here; every committed mutation is written back through the
/// injected persistence capability.
///
/// Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct MovieStore {
    inner: Arc<Inner>,
}

impl MovieStore {
    /// Loads prior state through `persistence`; anything unreadable starts
    /// the store from defaults. Never fails.
    pub fn new(persistence: Box<dyn Persistence>) -> Self {
        let snapshot = persistence.load().unwrap_or_default();
        debug!(
            favorites = snapshot.favorites.len(),
            history = snapshot.history.len(),
            "Store initialized"
        );

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::from_snapshot(snapshot)),
                persistence,
            }),
        }
    }

    /// Store backed by in-memory persistence.
    pub fn with_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().expect("store state poisoned")
    }

    /// Fire-and-forget write of the current snapshot. A failed write is
    /// logged and the in-memory state stays authoritative.
    fn persist(&self, snapshot: &Snapshot) {
        if let Err(e) = self.inner.persistence.save(snapshot) {
            warn!("Failed to persist store snapshot: {}", e);
        }
    }

    // Favorites

    pub fn add_favorite(&self, movie: &Movie) {
        let snapshot = {
            let mut state = self.state();
            if state.favorites.iter().any(|m| m.id == movie.id) {
                return;
            }
            let mut entry = movie.clone();
            entry.date_added = Some(Utc::now());
            state.favorites.push(entry);
            state.snapshot()
        };

        self.persist(&snapshot);
        self.notify(
            Severity::Success,
            format!("\"{}\" added to your list", movie.title),
            None,
        );
    }

    pub fn remove_favorite(&self, movie_id: i64) {
        let (snapshot, title) = {
            let mut state = self.state();
            let Some(title) = state
                .favorites
                .iter()
                .find(|m| m.id == movie_id)
                .map(|m| m.title.clone())
            else {
                return;
            };
            state.favorites.retain(|m| m.id != movie_id);
            (state.snapshot(), title)
        };

        self.persist(&snapshot);
        self.notify(
            Severity::Info,
            format!("\"{}\" removed from your list", title),
            None,
        );
    }

    pub fn is_favorite(&self, movie_id: i64) -> bool {
        self.state().favorites.iter().any(|m| m.id == movie_id)
    }

    /// Flips membership and returns the new state, so callers can update an
    /// icon without a second query.
    pub fn toggle_favorite(&self, movie: &Movie) -> bool {
        if self.is_favorite(movie.id) {
            self.remove_favorite(movie.id);
            false
        } else {
            self.add_favorite(movie);
            true
        }
    }

    pub fn favorites(&self) -> Vec<Movie> {
        self.state().favorites.clone()
    }

    /// Favorites under the current sort policy. Pure projection; the ledger
    /// itself keeps insertion order.
    pub fn sorted_favorites(&self) -> Vec<Movie> {
        let state = self.state();
        let mut movies = state.favorites.clone();
        match state.sort_by {
            SortBy::DateAdded => {}
            SortBy::Rating => movies.sort_by(|a, b| {
                b.vote_average
                    .partial_cmp(&a.vote_average)
                    .unwrap_or(Ordering::Equal)
            }),
            SortBy::Alphabetical => movies.sort_by_key(|m| title_sort_key(&m.title)),
        }
        movies
    }

    // History

    /// Records a view: an already-present movie moves to the front instead
    /// of duplicating, and the list is truncated to the most recent 20.
    /// History is passive, so no notification is emitted.
    pub fn record_view(&self, movie: &Movie) {
        let snapshot = {
            let mut state = self.state();
            state.history.retain(|m| m.id != movie.id);
            state.history.insert(0, movie.clone());
            state.history.truncate(HISTORY_LIMIT);
            state.snapshot()
        };
        self.persist(&snapshot);
    }

    pub fn clear_history(&self) {
        let snapshot = {
            let mut state = self.state();
            state.history.clear();
            state.snapshot()
        };
        self.persist(&snapshot);
    }

    pub fn history(&self) -> Vec<Movie> {
        self.state().history.clone()
    }

    // Filters and sort

    pub fn set_filters(&self, update: FilterUpdate) {
        let snapshot = {
            let mut state = self.state();
            if let Some(year) = update.year {
                state.filters.year = year;
            }
            if let Some(rating) = update.rating {
                state.filters.rating = rating;
            }
            if let Some(language) = update.language {
                state.filters.language = language;
            }
            state.snapshot()
        };
        self.persist(&snapshot);
    }

    pub fn reset_filters(&self) {
        let snapshot = {
            let mut state = self.state();
            state.filters = FilterState::default();
            state.snapshot()
        };
        self.persist(&snapshot);
    }

    pub fn filters(&self) -> FilterState {
        self.state().filters.clone()
    }

    pub fn set_sort_by(&self, sort_by: SortBy) {
        let snapshot = {
            let mut state = self.state();
            state.sort_by = sort_by;
            state.snapshot()
        };
        self.persist(&snapshot);
    }

    pub fn sort_by(&self) -> SortBy {
        self.state().sort_by
    }

    // Notifications

    /// Enqueues a notification and schedules its removal once `duration`
    /// elapses (default 3 s). The expiry timer only runs inside a tokio
    /// runtime; without one the entry stays until dismissed.
    pub fn notify(
        &self,
        severity: Severity,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> Uuid {
        let notification = Notification::new(severity, message, duration);
        let id = notification.id;
        let duration = notification.duration;

        let mut state = self.state();
        state.notifications.push(notification);

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let weak = Arc::downgrade(&self.inner);
            let task = handle.spawn(async move {
                tokio::time::sleep(duration).await;
                expire(&weak, id);
            });
            state.expiry_tasks.insert(id, task);
        }

        id
    }

    /// Removes a notification and cancels its pending expiry. Idempotent;
    /// dismissing an already-expired id is a no-op.
    pub fn dismiss(&self, id: Uuid) {
        let mut state = self.state();
        state.notifications.retain(|n| n.id != id);
        if let Some(task) = state.expiry_tasks.remove(&id) {
            task.abort();
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state().notifications.clone()
    }
}

/// Timer-side removal. The task holds only a weak handle so a dropped store
/// does not linger for the sake of its timers.
fn expire(inner: &Weak<Inner>, id: Uuid) {
    if let Some(inner) = inner.upgrade() {
        let mut state = inner.state.lock().expect("store state poisoned");
        state.notifications.retain(|n| n.id != id);
        state.expiry_tasks.remove(&id);
    }
}

/// Accent-folded, case-insensitive key for alphabetical ordering, so that
/// "Amélie" groups with other "am..." titles.
fn title_sort_key(title: &str) -> String {
    deunicode::deunicode(title).to_lowercase()
}

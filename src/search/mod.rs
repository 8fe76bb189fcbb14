use crate::models::{Movie, MoviePage};
use crate::tmdb::TmdbClient;
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument};

/// Accumulated results for the current query across the pages fetched so far.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub query: String,
    pub movies: Vec<Movie>,
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    /// Generation of the `search` call that produced these results. Paging
    /// requests carry it so a superseded query can never merge a late page
    /// into its successor's results.
    generation: u64,
}

impl SearchResults {
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }

    /// Folds a fetched page in, dropping movies already present. TMDB pages
    /// can overlap when the index shifts between requests.
    fn merge(&mut self, page: MoviePage) {
        self.page = page.page;
        self.total_pages = page.total_pages;
        self.total_results = page.total_results;
        for movie in page.results {
            if !self.movies.iter().any(|m| m.id == movie.id) {
                self.movies.push(movie);
            }
        }
    }
}

/// Drives paged catalog searches. Each new query bumps a generation counter;
/// a fetch that completes under a stale generation is discarded rather than
/// clobbering the newer query's results. Cancellation is advisory: the
/// in-flight request is left to finish and its result ignored.
pub struct SearchController {
    client: TmdbClient,
    generation: AtomicU64,
    current: Mutex<SearchResults>,
}

impl SearchController {
    pub fn new(client: TmdbClient) -> Self {
        Self {
            client,
            generation: AtomicU64::new(0),
            current: Mutex::new(SearchResults::default()),
        }
    }

    fn current(&self) -> MutexGuard<'_, SearchResults> {
        self.current.lock().expect("search results poisoned")
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Starts a fresh query. Returns `None` when a newer query superseded
    /// this one while its first page was in flight.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Option<SearchResults>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let page = self.client.search(query, 1).await?;

        let mut current = self.current();
        if !self.is_current(generation) {
            debug!("Discarding stale results for query '{}'", query);
            return Ok(None);
        }

        *current = SearchResults {
            query: query.to_string(),
            generation,
            ..SearchResults::default()
        };
        current.merge(page);
        Ok(Some(current.clone()))
    }

    /// Fetches the next page of the current query and merges it. Returns
    /// `None` when there are no further pages or the query was superseded
    /// mid-flight.
    #[instrument(skip(self))]
    pub async fn load_more(&self) -> Result<Option<SearchResults>> {
        // Capture the generation that produced the displayed results, not
        // the live counter: a newer search may already be in flight.
        let (generation, query, next_page) = {
            let current = self.current();
            if current.query.is_empty() || !current.has_more() {
                return Ok(None);
            }
            (current.generation, current.query.clone(), current.page + 1)
        };

        let page = self.client.search(&query, next_page).await?;

        let mut current = self.current();
        if !self.is_current(generation) || current.query != query {
            debug!("Discarding stale page {} for query '{}'", next_page, query);
            return Ok(None);
        }
        current.merge(page);
        Ok(Some(current.clone()))
    }

    pub fn results(&self) -> SearchResults {
        self.current().clone()
    }
}

use crate::config::TmdbConfig;
use crate::http::HttpClient;
use crate::models::{Movie, MoviePage, VideosPage};
use crate::store::FilterState;
use anyhow::Result;
use tracing::{debug, info, instrument, warn};

pub struct TmdbClient {
    http: HttpClient,
    config: TmdbConfig,
}

impl TmdbClient {
    pub fn new(http: HttpClient, config: TmdbConfig) -> Self {
        Self { http, config }
    }

    fn url(&self, path: &str, extra: &str) -> String {
        format!(
            "{}{}?api_key={}&language={}{}",
            self.config.base_url(),
            path,
            self.config.api_key,
            self.config.language(),
            extra
        )
    }

    #[instrument(skip(self))]
    pub async fn popular(&self, page: u32) -> Result<MoviePage> {
        let url = self.url("/movie/popular", &format!("&page={}", page));
        self.http.get_json(&url).await
    }

    #[instrument(skip(self))]
    pub async fn movie_details(&self, id: i64) -> Result<Movie> {
        let url = self.url(&format!("/movie/{}", id), "");
        self.http.get_json(&url).await
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, page: u32) -> Result<MoviePage> {
        let url = self.url(
            "/search/movie",
            &format!("&query={}&page={}", urlencoding::encode(query), page),
        );
        self.http.get_json(&url).await
    }

    #[instrument(skip(self))]
    pub async fn by_genre(&self, genre_id: i64, page: u32) -> Result<MoviePage> {
        let url = self.url(
            "/discover/movie",
            &format!("&with_genres={}&page={}&sort_by=popularity.desc", genre_id, page),
        );
        self.http.get_json(&url).await
    }

    #[instrument(skip(self))]
    pub async fn similar(&self, id: i64, page: u32) -> Result<MoviePage> {
        let url = self.url(&format!("/movie/{}/similar", id), &format!("&page={}", page));
        self.http.get_json(&url).await
    }

    /// Trailers for a movie. Tries the configured locale first and falls back
    /// to the secondary locale when it yields nothing. Total failure degrades
    /// to an empty list; trailers are optional enrichment.
    #[instrument(skip(self))]
    pub async fn videos(&self, id: i64) -> VideosPage {
        match self.videos_inner(id).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Failed to fetch videos for movie {}: {}", id, e);
                VideosPage::empty(id)
            }
        }
    }

    async fn videos_inner(&self, id: i64) -> Result<VideosPage> {
        let primary = format!(
            "{}/movie/{}/videos?api_key={}&language={}",
            self.config.base_url(),
            id,
            self.config.api_key,
            self.config.language()
        );

        match self.http.get_json::<VideosPage>(&primary).await {
            Ok(page) if !page.results.is_empty() => return Ok(page),
            Ok(_) => debug!("No videos in primary locale, trying fallback"),
            Err(e) => debug!("Primary locale video fetch failed: {}", e),
        }

        let fallback = format!(
            "{}/movie/{}/videos?api_key={}&language={}",
            self.config.base_url(),
            id,
            self.config.api_key,
            self.config.fallback_language()
        );
        self.http.get_json(&fallback).await
    }

    #[instrument(skip(self, filters))]
    pub async fn discover(
        &self,
        page: u32,
        filters: &FilterState,
        genre_id: Option<i64>,
    ) -> Result<MoviePage> {
        let url = self.url(
            "/discover/movie",
            &discover_params(page, filters, genre_id),
        );
        info!("Fetching filtered movies");
        self.http.get_json(&url).await
    }
}

/// Query string fragment for the discover endpoint. All set fields are
/// combined; unset fields are omitted entirely.
fn discover_params(page: u32, filters: &FilterState, genre_id: Option<i64>) -> String {
    let mut params = format!("&page={}&sort_by=popularity.desc", page);

    if !filters.year.is_empty() {
        params.push_str(&format!(
            "&primary_release_year={}",
            urlencoding::encode(&filters.year)
        ));
    }
    if filters.rating > 0.0 {
        params.push_str(&format!("&vote_average.gte={}", filters.rating));
    }
    if !filters.language.is_empty() {
        params.push_str(&format!(
            "&with_original_language={}",
            urlencoding::encode(&filters.language)
        ));
    }
    if let Some(genre_id) = genre_id {
        params.push_str(&format!("&with_genres={}", genre_id));
    }

    params
}

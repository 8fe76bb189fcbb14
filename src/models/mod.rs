use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub release_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre_ids: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<Genre>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    /// Set by the store when the movie enters the favorites ledger.
    #[serde(
        default,
        rename = "dateAdded",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_added: Option<DateTime<Utc>>,
}

pub const PLACEHOLDER_IMAGE: &str = "/placeholder-poster.svg";

impl Movie {
    /// Full poster URL for the given size (e.g. "w500"), or the placeholder
    /// when TMDB has no poster for this title.
    pub fn poster_url(&self, image_base: &str, size: &str) -> String {
        match &self.poster_path {
            Some(path) => format!("{}/{}{}", image_base, size, path),
            None => PLACEHOLDER_IMAGE.to_string(),
        }
    }

    pub fn backdrop_url(&self, image_base: &str, size: &str) -> String {
        match &self.backdrop_path {
            Some(path) => format!("{}/{}{}", image_base, size, path),
            None => PLACEHOLDER_IMAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Page envelope returned by every list-shaped TMDB endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviePage {
    pub page: u32,
    pub results: Vec<Movie>,
    pub total_pages: u32,
    pub total_results: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    /// YouTube key for embedding.
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub official: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideosPage {
    pub id: i64,
    pub results: Vec<Video>,
}

impl VideosPage {
    /// Degraded result used when the videos endpoint fails entirely.
    pub fn empty(id: i64) -> Self {
        Self {
            id,
            results: Vec::new(),
        }
    }
}

//! Client-side core for a movie catalog front end: a persistent store for
//! favorites, view history, filters, and sort policy, an ephemeral
//! notification queue, and an async TMDB catalog client with paged search.

pub mod config;
pub mod http;
pub mod models;
pub mod search;
pub mod store;
pub mod tmdb;

#[cfg(test)]
mod testutil;

pub use config::Configuration;
pub use http::{HttpClient, HttpError};
pub use models::{Genre, Movie, MoviePage, Video, VideosPage};
pub use search::{SearchController, SearchResults};
pub use store::{
    FilterState, FilterUpdate, JsonFileStore, MemoryStore, MovieStore, Notification, Persistence,
    Severity, Snapshot, SortBy,
};
pub use tmdb::TmdbClient;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
const DEFAULT_LANGUAGE: &str = "es-ES";
const DEFAULT_FALLBACK_LANGUAGE: &str = "en-US";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Configuration {
    pub tmdb: TmdbConfig,
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    #[serde(rename = "apikey")]
    pub api_key: String,
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,
    #[serde(rename = "imageBaseUrl")]
    pub image_base_url: Option<String>,
    /// Locale sent with every request, e.g. "es-ES".
    pub language: Option<String>,
    /// Locale tried for trailers when the primary one has none.
    #[serde(rename = "fallbackLanguage")]
    pub fallback_language: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Configuration {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Configuration = serde_yaml::from_str(&content)?;

        // Fail fast on a malformed base URL rather than on the first request.
        Url::parse(config.tmdb.base_url())?;

        Ok(config)
    }
}

impl TmdbConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn image_base_url(&self) -> &str {
        self.image_base_url
            .as_deref()
            .unwrap_or(DEFAULT_IMAGE_BASE_URL)
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn fallback_language(&self) -> &str {
        self.fallback_language
            .as_deref()
            .unwrap_or(DEFAULT_FALLBACK_LANGUAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let yaml = "tmdb:\n  apikey: abc123\n";
        let config: Configuration = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tmdb.api_key, "abc123");
        assert_eq!(config.tmdb.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.tmdb.language(), "es-ES");
        assert_eq!(config.tmdb.fallback_language(), "en-US");
        assert!(config.storage.is_none());
    }

    #[test]
    fn parses_full_config() {
        let yaml = concat!(
            "tmdb:\n",
            "  apikey: abc123\n",
            "  baseUrl: https://proxy.example/3\n",
            "  language: fr-FR\n",
            "  fallbackLanguage: en-US\n",
            "storage:\n",
            "  path: /tmp/movieflix.json\n",
        );
        let config: Configuration = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tmdb.base_url(), "https://proxy.example/3");
        assert_eq!(config.tmdb.language(), "fr-FR");
        assert_eq!(
            config.storage.unwrap().path,
            PathBuf::from("/tmp/movieflix.json")
        );
    }
}

//! Runtime settings, read from the environment with built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_ENDPOINT: &str = "https://fuseki.d-d-s.ch/skosmos/query";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SPARQL endpoint serving the vocabulary graphs.
    pub endpoint: String,
    /// Preferred label language. Only the first two characters are significant.
    pub language: String,
    pub fallback_language: String,
    /// Directory of the file-backed dataset store.
    pub data_dir: PathBuf,
    pub timeout_secs: u64,
    pub label_cache_size: usize,
    pub conversion_cache_size: usize,
    pub lookup_cache_size: usize,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language: "en".to_string(),
            fallback_language: "en".to_string(),
            data_dir: PathBuf::from("local-data-store"),
            timeout_secs: 30,
            label_cache_size: 2048,
            conversion_cache_size: 2048,
            lookup_cache_size: 512,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Settings {
    /// Reads `SDT_*` variables (plus `LANG` and `NO_STRUCTLOG`) from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = non_empty("SDT_ENDPOINT") {
            settings.endpoint = endpoint;
        }
        if let Some(language) = non_empty("SDT_LOCALE").or_else(|| non_empty("LANG")).and_then(|l| language_code(&l)) {
            settings.language = language;
        }
        if let Some(dir) = non_empty("SDT_DATA_DIR") {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Some(secs) = non_empty("SDT_HTTP_TIMEOUT").and_then(|s| s.trim().parse().ok()) {
            settings.timeout_secs = secs;
        }
        if let Some(level) = non_empty("SDT_LOG") {
            settings.log_level = level;
        }
        if lookup("NO_STRUCTLOG").is_some() {
            settings.log_format = LogFormat::Plain;
        }
        settings
    }

    /// Two-letter prefix used in `lang()` filters.
    pub fn language_prefix(&self) -> String {
        language_code(&self.language).unwrap_or_else(|| "en".to_string())
    }
}

/// Reduces locale strings like `de_CH.UTF-8` to `de`. `C` and `POSIX` yield `None`.
fn language_code(locale: &str) -> Option<String> {
    let code: String = locale.trim().chars().take(2).collect::<String>().to_lowercase();
    let valid = code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic());
    if !valid || locale.eq_ignore_ascii_case("posix") {
        return None;
    }
    Some(code)
}

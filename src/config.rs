//! Configuration for the corpus, chunking and the Gemini API
//!
//! Loads configuration from a config.yml file with environment overrides.
//! The API key is never stored in the file: it comes from GOOGLE_API_KEY
//! (optionally via a local `.env`) and is validated before any network call.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default constants (fallback if config.yml not found)
pub const DEFAULT_DATA_PATH: &str = "df_comment1.csv";
pub const DEFAULT_TEXT_COLUMN: &str = "full_text";
pub const DEFAULT_CHUNK_SIZE: usize = 2500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 250;
/// The original dashboard retrieved 120 chunks per query, trading prompt
/// size for recall. Kept configurable rather than hardcoded at call sites.
pub const DEFAULT_TOP_K: usize = 120;
pub const DEFAULT_EMBED_MODEL: &str = "embedding-001";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

/// Initial assistant greeting, same wording as the original dashboard.
pub const DEFAULT_GREETING: &str =
    "Halo! Saya siap membantu menganalisis komentar pengunjung pantai. Silakan ajukan pertanyaan.";

/// YAML config structures
#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    corpus: Option<CorpusSection>,
    chunking: Option<ChunkingSection>,
    retrieval: Option<RetrievalSection>,
    gemini: Option<GeminiSection>,
    chat: Option<ChatSection>,
}

#[derive(Debug, Deserialize)]
struct CorpusSection {
    path: Option<String>,
    text_column: Option<String>,
    beach_column: Option<String>,
    rating_column: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkingSection {
    max_chars: Option<usize>,
    overlap: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RetrievalSection {
    top_k: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct GeminiSection {
    embed_model: Option<String>,
    chat_model: Option<String>,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
    base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatSection {
    greeting: Option<String>,
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: String,
    pub text_column: String,
    pub beach_column: String,
    pub rating_column: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub embed_model: String,
    pub chat_model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub greeting: String,
    /// Loaded from GOOGLE_API_KEY, never from config.yml.
    pub api_key: Option<String>,
    /// Override for tests and proxies; None means the public Gemini endpoint.
    pub base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: DEFAULT_DATA_PATH.to_string(),
            text_column: DEFAULT_TEXT_COLUMN.to_string(),
            beach_column: "beach".to_string(),
            rating_column: "rating".to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            greeting: DEFAULT_GREETING.to_string(),
            api_key: None,
            base_url: None,
        }
    }
}

impl Config {
    /// Load from an explicit path, then apply environment overrides.
    /// A missing file yields defaults.
    pub fn load(path: &Path) -> Self {
        let yaml = match fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str::<YamlConfig>(&contents) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!("Ignoring malformed {}: {}", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => YamlConfig::default(),
        };

        let mut config = Self::from_yaml(yaml);
        config.apply_env();
        config
    }

    fn from_yaml(yaml: YamlConfig) -> Self {
        let mut config = Self::default();

        if let Some(corpus) = yaml.corpus {
            if let Some(path) = corpus.path {
                config.data_path = path;
            }
            if let Some(col) = corpus.text_column {
                config.text_column = col;
            }
            if let Some(col) = corpus.beach_column {
                config.beach_column = col;
            }
            if let Some(col) = corpus.rating_column {
                config.rating_column = col;
            }
        }

        if let Some(chunking) = yaml.chunking {
            if let Some(size) = chunking.max_chars {
                config.chunk_size = size;
            }
            if let Some(overlap) = chunking.overlap {
                config.chunk_overlap = overlap;
            }
        }

        if let Some(retrieval) = yaml.retrieval {
            if let Some(top_k) = retrieval.top_k {
                config.top_k = top_k;
            }
        }

        if let Some(gemini) = yaml.gemini {
            if let Some(model) = gemini.embed_model {
                config.embed_model = model;
            }
            if let Some(model) = gemini.chat_model {
                config.chat_model = model;
            }
            if let Some(t) = gemini.temperature {
                config.temperature = t;
            }
            if let Some(n) = gemini.max_output_tokens {
                config.max_output_tokens = n;
            }
            if let Some(url) = gemini.base_url {
                config.base_url = Some(url);
            }
        }

        if let Some(chat) = yaml.chat {
            if let Some(greeting) = chat.greeting {
                config.greeting = greeting;
            }
        }

        config
    }

    fn apply_env(&mut self) {
        if let Ok(key) = env::var("GOOGLE_API_KEY") {
            if !key.trim().is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Ok(path) = env::var("PANTAI_DATA") {
            if !path.trim().is_empty() {
                self.data_path = path;
            }
        }
        if let Ok(url) = env::var("GEMINI_BASE_URL") {
            if !url.trim().is_empty() {
                self.base_url = Some(url);
            }
        }
    }

    /// Sanity-check chunking and retrieval parameters at startup.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunking.max_chars must be > 0".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Config(format!(
                "chunking.overlap ({}) must be smaller than chunking.max_chars ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be > 0".to_string()));
        }
        if self.text_column.trim().is_empty() {
            return Err(Error::Config("corpus.text_column must not be empty".to_string()));
        }
        Ok(())
    }

    /// The API key, or a Config error telling the user how to supply one.
    /// Called before any network client is constructed.
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(Error::Config(
                "GOOGLE_API_KEY is not set. Export it or put it in a local .env file.".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_values_match_original_dashboard() {
        let config = Config::default();
        assert_eq!(config.chunk_size, 2500);
        assert_eq!(config.chunk_overlap, 250);
        assert_eq!(config.top_k, 120);
        assert_eq!(config.chat_model, "gemini-1.5-flash");
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.text_column, "full_text");
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = Config::load(Path::new("no_such_config_12345.yml"));
        assert_eq!(config.data_path, DEFAULT_DATA_PATH);
        assert_eq!(config.top_k, DEFAULT_TOP_K);
    }

    #[test]
    fn test_load_yaml_overrides() {
        let mut file = NamedTempFile::new().expect("tempfile");
        writeln!(
            file,
            r#"
corpus:
  path: comments.csv
  text_column: comment
  beach_column: nama_pantai
chunking:
  max_chars: 1000
  overlap: 100
retrieval:
  top_k: 16
gemini:
  chat_model: gemini-2.0-flash
  temperature: 0.5
chat:
  greeting: "Selamat datang!"
"#
        )
        .expect("write yaml");

        let config = Config::load(file.path());
        assert_eq!(config.data_path, "comments.csv");
        assert_eq!(config.text_column, "comment");
        assert_eq!(config.beach_column, "nama_pantai");
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.top_k, 16);
        assert_eq!(config.chat_model, "gemini-2.0-flash");
        assert_eq!(config.greeting, "Selamat datang!");
        // Unset fields keep defaults
        assert_eq!(config.embed_model, DEFAULT_EMBED_MODEL);
    }

    #[test]
    fn test_load_malformed_yaml_falls_back_to_defaults() {
        let mut file = NamedTempFile::new().expect("tempfile");
        writeln!(file, "corpus: [not, a, mapping").expect("write yaml");

        let config = Config::load(file.path());
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        Config::default().validate().expect("defaults valid");
    }

    #[test]
    fn test_validate_rejects_overlap_not_smaller_than_size() {
        let config = Config {
            chunk_size: 100,
            chunk_overlap: 100,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let config = Config {
            chunk_size: 0,
            chunk_overlap: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_top_k() {
        let config = Config {
            top_k: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_require_api_key_missing() {
        let config = Config {
            api_key: None,
            ..Config::default()
        };
        let err = config.require_api_key().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_require_api_key_blank_is_rejected() {
        let config = Config {
            api_key: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_require_api_key_present() {
        let config = Config {
            api_key: Some("test_key".to_string()),
            ..Config::default()
        };
        assert_eq!(config.require_api_key().unwrap(), "test_key");
    }
}

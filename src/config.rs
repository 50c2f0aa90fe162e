//! Configuration types.
//!
//! Loads settings from config.json at startup. Every field has a default,
//! so a partial file (or no file at all) is fine.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::ocr::{DEFAULT_DARK_THRESHOLD, DEFAULT_REMOVE_CHARS, ExtractOptions};
use crate::paths;

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Explicit Tesseract executable; searched for when unset
    pub tesseract_path: Option<PathBuf>,
    /// Explicit tessdata directory; Tesseract's default when unset
    pub tessdata_dir: Option<PathBuf>,
    /// Tesseract language code
    pub language: String,
    /// Characters stripped from every transcription
    pub remove_chars: Vec<char>,
    /// Mean brightness below which the screenshot is treated as dark mode
    pub dark_threshold: f64,
    /// Run the OCR configurations concurrently
    pub parallel: bool,
    /// Directory receiving extracted_text_*.txt
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            tessdata_dir: None,
            language: "eng".to_string(),
            remove_chars: DEFAULT_REMOVE_CHARS.to_vec(),
            dark_threshold: DEFAULT_DARK_THRESHOLD,
            parallel: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            remove_chars: self.remove_chars.clone(),
            dark_threshold: self.dark_threshold,
            parallel: self.parallel,
        }
    }
}

/// Reads one config file. Errors are returned, not defaulted.
pub fn read_config(path: &Path) -> anyhow::Result<AppConfig> {
    let contents = fs::read_to_string(path)?;
    let config = serde_json::from_str(&contents)?;
    Ok(config)
}

/// Loads configuration or returns defaults.
///
/// An explicit path is the only candidate when given; otherwise config.json
/// next to the executable, then in the user config directory.
pub fn load_config(explicit: Option<&Path>) -> AppConfig {
    let candidates = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => paths::config_candidates(),
    };

    for config_path in candidates {
        if !config_path.exists() {
            if explicit.is_some() {
                warn!("{} not found. Using defaults.", config_path.display());
            }
            continue;
        }

        match read_config(&config_path) {
            Ok(config) => {
                info!("Config loaded from {}", config_path.display());
                return config;
            }
            Err(e) => {
                warn!(
                    "Failed to load {}: {}. Using defaults.",
                    config_path.display(),
                    e
                );
                return AppConfig::default();
            }
        }
    }

    info!("config.json not found. Using default config.");
    AppConfig::default()
}

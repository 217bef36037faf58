// Configuration Storage Service
// Handles config file read/write and environment overrides

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::inference::DEFAULT_INFERENCE_URL;
use super::translation::GenerationParams;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub classify_on_translated: bool,
    #[serde(default = "default_trend_threshold")]
    pub trend_threshold: f64,
    /// Wire the function-word identifier into language detection.
    #[serde(default = "default_true")]
    pub use_language_identifier: bool,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub io: IoConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            classifier: ClassifierConfig::default(),
            translation: TranslationConfig::default(),
            classify_on_translated: false,
            trend_threshold: default_trend_threshold(),
            use_language_identifier: true,
            inference: InferenceConfig::default(),
            io: IoConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    #[serde(default = "default_classifier_model")]
    pub model_id: String,
    /// Label names in model index order, most negative first. Their count selects the projection.
    #[serde(default = "default_classifier_labels")]
    pub labels: Vec<String>,
    #[serde(default = "default_classifier_max_length")]
    pub max_length: usize,
    #[serde(default = "default_classifier_batch_size")]
    pub batch_size: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_id: default_classifier_model(),
            labels: default_classifier_labels(),
            max_length: default_classifier_max_length(),
            batch_size: default_classifier_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationConfig {
    /// Translate allow-listed languages for display.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_allow_list")]
    pub allow_list: Vec<String>,
    #[serde(default = "default_translation_models")]
    pub models: HashMap<String, String>,
    #[serde(default = "default_translation_max_length")]
    pub max_length: usize,
    #[serde(default = "default_translation_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_num_beams")]
    pub num_beams: usize,
    #[serde(default = "default_no_repeat_ngram_size")]
    pub no_repeat_ngram_size: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_list: default_allow_list(),
            models: default_translation_models(),
            max_length: default_translation_max_length(),
            batch_size: default_translation_batch_size(),
            num_beams: default_num_beams(),
            no_repeat_ngram_size: default_no_repeat_ngram_size(),
        }
    }
}

impl TranslationConfig {
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_length: self.max_length,
            num_beams: self.num_beams,
            no_repeat_ngram_size: self.no_repeat_ngram_size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    #[serde(default = "default_inference_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_inference_url(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IoConfig {
    #[serde(default = "default_input_file")]
    pub input_file: String,
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_file: default_input_file(),
            output_file: default_output_file(),
        }
    }
}

fn default_version() -> String { "1".to_string() }
fn default_true() -> bool { true }
fn default_trend_threshold() -> f64 { 0.05 }
fn default_classifier_model() -> String { "nlptown/bert-base-multilingual-uncased-sentiment".to_string() }
fn default_classifier_labels() -> Vec<String> {
    ["1 star", "2 stars", "3 stars", "4 stars", "5 stars"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_classifier_max_length() -> usize { 96 }
fn default_classifier_batch_size() -> usize { 128 }
fn default_allow_list() -> Vec<String> { vec!["ur".to_string()] }
fn default_translation_models() -> HashMap<String, String> {
    let mut models = HashMap::new();
    models.insert("ur".to_string(), "Helsinki-NLP/opus-mt-ur-en".to_string());
    models
}
fn default_translation_max_length() -> usize { 192 }
fn default_translation_batch_size() -> usize { 64 }
fn default_num_beams() -> usize { 2 }
fn default_no_repeat_ngram_size() -> usize { 3 }
fn default_inference_url() -> String { DEFAULT_INFERENCE_URL.to_string() }
fn default_timeout_secs() -> u64 { 120 }
fn default_input_file() -> String { "tweets.json".to_string() }
fn default_output_file() -> String { "results.json".to_string() }

fn env_truthy(name: &str) -> Option<bool> {
    env::var(name).ok().map(|v| {
        matches!(v.trim(), "1" | "true" | "TRUE" | "yes")
    })
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Apply `TWEETLENS_*` environment overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Some(url) = env_nonempty("TWEETLENS_INFERENCE_URL") {
            self.inference.base_url = url;
        }
        if let Some(flag) = env_truthy("TWEETLENS_CLASSIFY_ON_TRANSLATED") {
            self.classify_on_translated = flag;
        }
        if let Some(input) = env_nonempty("TWEETLENS_INPUT") {
            self.io.input_file = input;
        }
        if let Some(output) = env_nonempty("TWEETLENS_OUTPUT") {
            self.io.output_file = output;
        }
    }
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tweetlens"))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Load configuration from file; a missing file yields defaults.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file).map_err(|source| ConfigError::Read {
            path: self.config_file.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.config_file.clone(),
            source,
        })
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir).map_err(|source| ConfigError::Write {
            path: self.config_dir.clone(),
            source,
        })?;

        let content = serde_json::to_string_pretty(config)?;

        fs::write(&self.config_file, content).map_err(|source| ConfigError::Write {
            path: self.config_file.clone(),
            source,
        })
    }
}

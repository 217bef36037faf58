// Inference Server Backends
// Classification and translation models reached over the HF-style inference protocol

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

use super::classification::SentimentBackend;
use super::translation::{GenerationParams, TranslationBackend, TranslatorLoader};

pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co";

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("{model} returned {actual} outputs for {expected} inputs")]
    LengthMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },
    #[error("{model} returned a score vector of length {actual}, expected {expected}")]
    LabelCountMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },
    #[error("{model} returned unknown label '{label}'")]
    UnknownLabel { model: String, label: String },
    #[error("No translation model registered for '{0}'")]
    MissingModel(String),
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a, P: Serialize> {
    inputs: &'a [String],
    parameters: P,
    options: RequestOptions,
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

#[derive(Debug, Serialize)]
struct ClassificationParameters {
    truncation: bool,
    max_length: usize,
    top_k: usize,
}

#[derive(Debug, Serialize)]
struct TranslationParameters {
    truncation: bool,
    max_length: usize,
    num_beams: usize,
    no_repeat_ngram_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct TranslationOutput {
    translation_text: String,
}

/// Shared HTTP client for every model on one inference server.
pub struct InferenceClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl InferenceClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout_secs: u64) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn model_url(&self, model_id: &str) -> String {
        format!("{}/models/{}", self.base_url, model_id)
    }

    async fn post_inputs<P, T>(&self, model_id: &str, inputs: &[String], parameters: P) -> Result<T, BackendError>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let request = InferenceRequest {
            inputs,
            parameters,
            options: RequestOptions { wait_for_model: true },
        };

        let start = Instant::now();
        let mut builder = self
            .client
            .post(self.model_url(model_id))
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let data = response
            .json::<T>()
            .await
            .map_err(|e| BackendError::JsonError(e.to_string()))?;

        debug!(
            model = model_id,
            inputs = inputs.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "inference.call"
        );
        Ok(data)
    }
}

// ============ Classification ============

/// Sequence classifier whose labels are listed in model index order.
pub struct HttpSentimentBackend {
    client: Arc<InferenceClient>,
    model_id: String,
    labels: Vec<String>,
    max_length: usize,
}

impl HttpSentimentBackend {
    pub fn new(client: Arc<InferenceClient>, model_id: &str, labels: Vec<String>, max_length: usize) -> Self {
        Self {
            client,
            model_id: model_id.to_string(),
            labels,
            max_length,
        }
    }

    fn label_index(&self, label: &str) -> Option<usize> {
        let wanted = label.trim();
        self.labels
            .iter()
            .position(|l| l.eq_ignore_ascii_case(wanted))
            .or_else(|| {
                wanted
                    .strip_prefix("LABEL_")
                    .and_then(|i| i.parse::<usize>().ok())
                    .filter(|i| *i < self.labels.len())
            })
    }

    fn to_vector(&self, row: Vec<LabelScore>) -> Result<Vec<f64>, BackendError> {
        let mut probs = vec![0.0; self.labels.len()];
        for entry in row {
            let idx = self.label_index(&entry.label).ok_or_else(|| BackendError::UnknownLabel {
                model: self.model_id.clone(),
                label: entry.label.clone(),
            })?;
            probs[idx] = entry.score;
        }
        Ok(probs)
    }
}

#[async_trait]
impl SentimentBackend for HttpSentimentBackend {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn num_labels(&self) -> usize {
        self.labels.len()
    }

    async fn score_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, BackendError> {
        let parameters = ClassificationParameters {
            truncation: true,
            max_length: self.max_length,
            top_k: self.labels.len(),
        };
        let rows: Vec<Vec<LabelScore>> = self.client.post_inputs(&self.model_id, texts, parameters).await?;
        if rows.len() != texts.len() {
            return Err(BackendError::LengthMismatch {
                model: self.model_id.clone(),
                expected: texts.len(),
                actual: rows.len(),
            });
        }
        rows.into_iter().map(|row| self.to_vector(row)).collect()
    }
}

// ============ Translation ============

pub struct HttpTranslationBackend {
    client: Arc<InferenceClient>,
    model_id: String,
}

impl HttpTranslationBackend {
    pub fn new(client: Arc<InferenceClient>, model_id: &str) -> Self {
        Self {
            client,
            model_id: model_id.to_string(),
        }
    }
}

#[async_trait]
impl TranslationBackend for HttpTranslationBackend {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn translate(&self, texts: &[String], params: &GenerationParams) -> Result<Vec<String>, BackendError> {
        let parameters = TranslationParameters {
            truncation: true,
            max_length: params.max_length,
            num_beams: params.num_beams,
            no_repeat_ngram_size: params.no_repeat_ngram_size,
        };
        let outputs: Vec<TranslationOutput> = self.client.post_inputs(&self.model_id, texts, parameters).await?;
        if outputs.len() != texts.len() {
            return Err(BackendError::LengthMismatch {
                model: self.model_id.clone(),
                expected: texts.len(),
                actual: outputs.len(),
            });
        }
        Ok(outputs.into_iter().map(|o| o.translation_text).collect())
    }
}

/// Builds one HTTP translation backend per language on first use.
pub struct HttpTranslatorLoader {
    client: Arc<InferenceClient>,
}

impl HttpTranslatorLoader {
    pub fn new(client: Arc<InferenceClient>) -> Self {
        Self { client }
    }
}

impl TranslatorLoader for HttpTranslatorLoader {
    fn load(&self, lang: &str, model_id: &str) -> Result<Arc<dyn TranslationBackend>, BackendError> {
        if model_id.trim().is_empty() {
            return Err(BackendError::MissingModel(lang.to_string()));
        }
        Ok(Arc::new(HttpTranslationBackend::new(self.client.clone(), model_id)))
    }
}

/// Inference server token: environment first, then the configured value.
pub fn get_api_key(configured: Option<&str>) -> Option<String> {
    for key in ["TWEETLENS_API_KEY", "HF_API_TOKEN"] {
        if let Ok(val) = env::var(key) {
            let v = val.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }
    configured
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// TweetLens API
// Trigger surface: runs one analysis job over the configured files

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::models::{AnalyzeResponse, ErrorResponse};
use crate::services::{
    AppConfig, BackendError, BatchOrchestrator, ConfigError, ClassificationAdapter, HttpSentimentBackend,
    HttpTranslatorLoader, InferenceClient, JobError, JobRunner, LanguageDetector, PipelineOptions,
    SentimentBackend, StopwordIdentifier, TranslationAdapter, TranslatorCache, TranslatorLoader,
};
use crate::services::inference::get_api_key;

pub const STATUS_COMPLETE: &str = "Sentiment analysis complete";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{input_file} not found")]
    NotFound { input_file: String },
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Internal(_) => 500,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::InputNotFound(path) => Self::NotFound {
                input_file: path.display().to_string(),
            },
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Long-lived service: the translator cache lives as long as the service.
pub struct AnalysisService {
    runner: JobRunner,
    input_file: String,
    output_file: String,
}

impl AnalysisService {
    /// Wire the HTTP backends described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        let api_key = get_api_key(config.inference.api_key.as_deref());
        let client = Arc::new(InferenceClient::new(
            &config.inference.base_url,
            api_key,
            config.inference.timeout_secs,
        )?);

        let backend = Arc::new(HttpSentimentBackend::new(
            client.clone(),
            &config.classifier.model_id,
            config.classifier.labels.clone(),
            config.classifier.max_length,
        ));
        let loader = Arc::new(HttpTranslatorLoader::new(client));

        let detector = if config.use_language_identifier {
            LanguageDetector::with_identifier(Box::new(StopwordIdentifier::new()))
        } else {
            LanguageDetector::new()
        };

        info!(
            base_url = %config.inference.base_url,
            classifier = %config.classifier.model_id,
            labels = config.classifier.labels.len(),
            "[API] analysis service configured"
        );
        Ok(Self::from_parts(config, detector, backend, loader))
    }

    /// Build the service around caller-supplied backends.
    pub fn from_parts(
        config: &AppConfig,
        detector: LanguageDetector,
        backend: Arc<dyn SentimentBackend>,
        loader: Arc<dyn TranslatorLoader>,
    ) -> Self {
        let translator = TranslationAdapter::new(
            config.translation.allow_list.clone(),
            config.translation.models.clone(),
            loader,
            Arc::new(TranslatorCache::new()),
            config.translation.batch_size,
            config.translation.generation_params(),
        );
        let classifier = ClassificationAdapter::new(
            backend,
            config.classifier.batch_size,
            config.classifier.max_length,
        );
        let options = PipelineOptions {
            translate_for_display: config.translation.enabled,
            classify_on_translated: config.classify_on_translated,
        };
        let orchestrator = BatchOrchestrator::new(detector, translator, classifier, options);

        Self {
            runner: JobRunner::new(orchestrator, config.trend_threshold),
            input_file: config.io.input_file.clone(),
            output_file: config.io.output_file.clone(),
        }
    }

    pub fn input_file(&self) -> &str {
        &self.input_file
    }

    pub fn output_file(&self) -> &str {
        &self.output_file
    }

    /// Run one job over the configured input and output files.
    pub async fn analyze_tweets(&self) -> Result<AnalyzeResponse, ApiError> {
        let payload = self
            .runner
            .run_files(Path::new(self.input_file()), Path::new(self.output_file()))
            .await
            .map_err(|e| {
                error!(error = %e, input = %self.input_file(), "[API] analysis failed");
                ApiError::from(e)
            })?;

        Ok(AnalyzeResponse {
            status: STATUS_COMPLETE.to_string(),
            input_file: self.input_file().to_string(),
            output_file: self.output_file().to_string(),
            processed_tweets: payload.results.len(),
        })
    }
}

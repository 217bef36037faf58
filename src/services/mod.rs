// TweetLens Core Services
// Text cleanup, model adapters, the batch pipeline and the job around it

pub mod text_processor;
pub mod language;
pub mod projection;
pub mod inference;
pub mod classification;
pub mod translation;
pub mod analysis;
pub mod config_store;
pub mod job;

#[cfg(test)]
pub(crate) mod testing;

pub use text_processor::*;
pub use config_store::*;
pub use inference::{BackendError, HttpSentimentBackend, HttpTranslationBackend, HttpTranslatorLoader, InferenceClient};
pub use job::{JobError, JobRunner};

// Re-export pipeline entry points
pub use analysis::{
    compute_trend,
    summarize_group,
    BatchOrchestrator,
    PipelineOptions,
};
pub use classification::{ClassificationAdapter, SentimentBackend};
pub use language::{LanguageDetector, LanguageIdentifier, StopwordIdentifier};
pub use projection::LabelScheme;
pub use translation::{GenerationParams, TranslationAdapter, TranslationBackend, TranslatorCache, TranslatorLoader};

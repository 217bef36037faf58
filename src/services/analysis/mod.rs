// Analysis Module
// Tweet sentiment core organized into:
// - orchestrator: per-item pipeline (normalize, detect, translate, classify, project)
// - summarizer: group rollup and trend detection

pub mod orchestrator;
pub mod summarizer;

pub use orchestrator::{BatchOrchestrator, PipelineOptions};
pub use summarizer::{compute_trend, summarize_group};

// In-process stand-ins for the model backends used by unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::classification::SentimentBackend;
use super::inference::BackendError;
use super::translation::{GenerationParams, TranslationBackend, TranslatorLoader};

const POSITIVE_WORDS: &[&str] = &["love", "great", "good", "happy", "excellent"];
const NEGATIVE_WORDS: &[&str] = &["hate", "awful", "bad", "terrible", "sad"];

/// Keyword scorer with fixed vectors; exact-text overrides win over keywords.
pub struct StubSentimentBackend {
    num_labels: usize,
    table: HashMap<String, Vec<f64>>,
    drop_last: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl StubSentimentBackend {
    fn with_labels(num_labels: usize) -> Self {
        Self {
            num_labels,
            table: HashMap::new(),
            drop_last: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn three_class() -> Self {
        Self::with_labels(3)
    }

    pub fn five_class() -> Self {
        Self::with_labels(5)
    }

    pub fn with_score(mut self, text: &str, probs: Vec<f64>) -> Self {
        self.table.insert(text.to_string(), probs);
        self
    }

    /// Misbehave by returning one row fewer than requested.
    pub fn dropping_last(mut self) -> Self {
        self.drop_last = true;
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    fn score(&self, text: &str) -> Vec<f64> {
        if let Some(probs) = self.table.get(text) {
            return probs.clone();
        }
        let lower = text.to_lowercase();
        let positive = POSITIVE_WORDS.iter().any(|w| lower.contains(w));
        let negative = NEGATIVE_WORDS.iter().any(|w| lower.contains(w));
        match (self.num_labels, positive, negative) {
            (5, true, false) => vec![0.02, 0.03, 0.1, 0.25, 0.6],
            (5, false, true) => vec![0.6, 0.25, 0.1, 0.03, 0.02],
            (5, _, _) => vec![0.1, 0.15, 0.5, 0.15, 0.1],
            (_, true, false) => vec![0.05, 0.15, 0.8],
            (_, false, true) => vec![0.8, 0.15, 0.05],
            _ => vec![0.2, 0.6, 0.2],
        }
    }
}

#[async_trait]
impl SentimentBackend for StubSentimentBackend {
    fn model_id(&self) -> &str {
        "stub-sentiment"
    }

    fn num_labels(&self) -> usize {
        self.num_labels
    }

    async fn score_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, BackendError> {
        self.calls.lock().unwrap().push(texts.to_vec());
        let mut rows: Vec<Vec<f64>> = texts.iter().map(|t| self.score(t)).collect();
        if self.drop_last {
            rows.pop();
        }
        Ok(rows)
    }
}

/// Prefixes every input with "[en] ".
pub struct StubTranslator {
    model_id: String,
}

impl StubTranslator {
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
        }
    }
}

#[async_trait]
impl TranslationBackend for StubTranslator {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn translate(&self, texts: &[String], _params: &GenerationParams) -> Result<Vec<String>, BackendError> {
        Ok(texts.iter().map(|t| format!("[en] {}", t)).collect())
    }
}

#[derive(Default)]
pub struct StubTranslatorLoader {
    loads: AtomicUsize,
}

impl StubTranslatorLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl TranslatorLoader for StubTranslatorLoader {
    fn load(&self, _lang: &str, model_id: &str) -> Result<Arc<dyn TranslationBackend>, BackendError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StubTranslator::new(model_id)))
    }
}

// Translation Service Adapter
// Allow-listed, per-language cached translators for English display text

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::inference::BackendError;
use super::language::{primary_subtag, DEFAULT_LANGUAGE};
use super::text_processor::clip_to_token_budget;

/// Generation limits passed to every translation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub max_length: usize,
    pub num_beams: usize,
    pub no_repeat_ngram_size: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_length: 192,
            num_beams: 2,
            no_repeat_ngram_size: 3,
        }
    }
}

/// A generative translation model into English. Returns one output per input, in order.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    fn model_id(&self) -> &str;

    async fn translate(&self, texts: &[String], params: &GenerationParams) -> Result<Vec<String>, BackendError>;
}

/// Instantiates the backend for a language; called at most once per language per cache.
pub trait TranslatorLoader: Send + Sync {
    fn load(&self, lang: &str, model_id: &str) -> Result<Arc<dyn TranslationBackend>, BackendError>;
}

/// Language tag -> translator store. Entries are created once and never evicted.
#[derive(Default)]
pub struct TranslatorCache {
    entries: Mutex<HashMap<String, Arc<dyn TranslationBackend>>>,
}

impl TranslatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached translator for `lang`, running `init` only if none exists yet.
    /// The lock is held across `init` so concurrent callers never initialize twice.
    pub fn get_or_init<F>(&self, lang: &str, init: F) -> Result<Arc<dyn TranslationBackend>, BackendError>
    where
        F: FnOnce() -> Result<Arc<dyn TranslationBackend>, BackendError>,
    {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = entries.get(lang) {
            return Ok(existing.clone());
        }
        let backend = init()?;
        info!(lang, model = backend.model_id(), "[TRANSLATE] translator loaded");
        entries.insert(lang.to_string(), backend.clone());
        Ok(backend)
    }

    pub fn contains(&self, lang: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(lang)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct TranslationAdapter {
    allow_list: HashSet<String>,
    models: HashMap<String, String>,
    loader: Arc<dyn TranslatorLoader>,
    cache: Arc<TranslatorCache>,
    batch_size: usize,
    params: GenerationParams,
}

impl TranslationAdapter {
    pub fn new(
        allow_list: impl IntoIterator<Item = String>,
        models: HashMap<String, String>,
        loader: Arc<dyn TranslatorLoader>,
        cache: Arc<TranslatorCache>,
        batch_size: usize,
        params: GenerationParams,
    ) -> Self {
        Self {
            allow_list: allow_list.into_iter().map(|l| primary_subtag(&l)).collect(),
            models: models
                .into_iter()
                .map(|(lang, model)| (primary_subtag(&lang), model))
                .collect(),
            loader,
            cache,
            batch_size: batch_size.max(1),
            params,
        }
    }

    pub fn cache(&self) -> &Arc<TranslatorCache> {
        &self.cache
    }

    /// Whether texts tagged `lang` get translated (allow-listed, non-English, model registered).
    pub fn supports(&self, lang: &str) -> bool {
        let base = primary_subtag(lang);
        base != DEFAULT_LANGUAGE && self.allow_list.contains(&base) && self.models.contains_key(&base)
    }

    /// Translate `texts` (all tagged `lang`) into English, same length and order.
    /// Unsupported languages pass through unchanged; empty strings stay empty.
    pub async fn translate_batch(&self, texts: &[String], lang: &str) -> Result<Vec<String>, BackendError> {
        if !self.supports(lang) {
            return Ok(texts.to_vec());
        }
        let base = primary_subtag(lang);
        let model_id = self
            .models
            .get(&base)
            .ok_or_else(|| BackendError::MissingModel(base.clone()))?;
        let backend = self
            .cache
            .get_or_init(&base, || self.loader.load(&base, model_id))?;

        let mut out = texts.to_vec();
        let pending: Vec<usize> = (0..texts.len()).filter(|&i| !texts[i].is_empty()).collect();

        for chunk in pending.chunks(self.batch_size) {
            let inputs: Vec<String> = chunk
                .iter()
                .map(|&i| clip_to_token_budget(&texts[i], self.params.max_length).to_string())
                .collect();
            let translated = backend.translate(&inputs, &self.params).await?;
            if translated.len() != inputs.len() {
                return Err(BackendError::LengthMismatch {
                    model: backend.model_id().to_string(),
                    expected: inputs.len(),
                    actual: translated.len(),
                });
            }
            for (&i, t) in chunk.iter().zip(translated) {
                out[i] = t;
            }
            debug!(lang = %base, batch = chunk.len(), "[TRANSLATE] translated sub-batch");
        }

        Ok(out)
    }

    /// English display text for every item: one `translate_batch` per supported language,
    /// results scattered back to their original positions.
    pub async fn translate_for_display(&self, texts: &[String], langs: &[String]) -> Result<Vec<String>, BackendError> {
        let mut result = texts.to_vec();

        let mut buckets: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, lang) in langs.iter().enumerate() {
            if self.supports(lang) {
                buckets.entry(primary_subtag(lang)).or_default().push(idx);
            }
        }

        for (lang, idxs) in buckets {
            let batch: Vec<String> = idxs.iter().map(|&i| texts[i].clone()).collect();
            info!(lang = %lang, items = batch.len(), "[TRANSLATE] translating for display");
            let translated = self.translate_batch(&batch, &lang).await?;
            for (i, t) in idxs.into_iter().zip(translated) {
                result[i] = t;
            }
        }

        Ok(result)
    }
}

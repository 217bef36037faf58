// Batch Orchestrator
// Normalize -> detect -> translate for display -> classify -> project, one result per input

use std::time::Instant;
use tracing::{debug, info};

use crate::models::{ClassificationResult, ItemResult, RawItem, TweetAnalysis};
use crate::services::classification::ClassificationAdapter;
use crate::services::inference::BackendError;
use crate::services::language::LanguageDetector;
use crate::services::text_processor::normalize_tweet;
use crate::services::translation::TranslationAdapter;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub translate_for_display: bool,
    /// Classify the English display text instead of the normalized original.
    pub classify_on_translated: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            translate_for_display: true,
            classify_on_translated: false,
        }
    }
}

pub struct BatchOrchestrator {
    detector: LanguageDetector,
    translator: TranslationAdapter,
    classifier: ClassificationAdapter,
    options: PipelineOptions,
}

impl BatchOrchestrator {
    pub fn new(
        detector: LanguageDetector,
        translator: TranslationAdapter,
        classifier: ClassificationAdapter,
        options: PipelineOptions,
    ) -> Self {
        Self {
            detector,
            translator,
            classifier,
            options,
        }
    }

    /// Analyze a batch. Output order and length match `items` exactly.
    pub async fn run(&self, items: &[RawItem]) -> Result<Vec<ItemResult>, BackendError> {
        let start = Instant::now();
        info!(items = items.len(), "[PIPELINE] starting batch");

        let cleaned: Vec<String> = items.iter().map(|item| normalize_tweet(&item.text)).collect();
        let langs = self.detector.detect_batch(&cleaned);

        let display = if self.options.translate_for_display {
            self.translator.translate_for_display(&cleaned, &langs).await?
        } else {
            cleaned.clone()
        };

        let classify_texts = if self.options.classify_on_translated {
            &display
        } else {
            &cleaned
        };

        let classifications = self.classify_all(classify_texts).await?;

        let results: Vec<ItemResult> = items
            .iter()
            .zip(cleaned)
            .zip(display)
            .zip(langs)
            .zip(classifications)
            .map(|((((item, text_original), text), lang), classification)| ItemResult {
                id: item.id.clone(),
                analysis: TweetAnalysis {
                    text_original,
                    text,
                    lang,
                    classification,
                },
            })
            .collect();

        info!(
            items = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "[PIPELINE] batch complete"
        );
        Ok(results)
    }

    /// Empty texts get the neutral zero record; the adapter sub-batches the rest.
    async fn classify_all(&self, texts: &[String]) -> Result<Vec<ClassificationResult>, BackendError> {
        let scheme = self.classifier.scheme();
        let rows = self.classifier.classify_batch(texts).await?;

        let results: Vec<ClassificationResult> = texts
            .iter()
            .zip(rows)
            .map(|(text, row)| {
                if text.is_empty() {
                    ClassificationResult::empty()
                } else {
                    scheme.classify(&row)
                }
            })
            .collect();

        debug!(
            items = texts.len(),
            skipped = texts.iter().filter(|t| t.is_empty()).count(),
            "[PIPELINE] classified batch"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentLabel;
    use crate::services::classification::ClassificationAdapter;
    use crate::services::testing::{StubSentimentBackend, StubTranslatorLoader};
    use crate::services::translation::{GenerationParams, TranslatorCache};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn orchestrator_with(
        backend: Arc<StubSentimentBackend>,
        options: PipelineOptions,
        classify_batch_size: usize,
    ) -> BatchOrchestrator {
        let mut models = HashMap::new();
        models.insert("ur".to_string(), "opus-mt-ur-en".to_string());
        let translator = TranslationAdapter::new(
            vec!["ur".to_string()],
            models,
            Arc::new(StubTranslatorLoader::new()),
            Arc::new(TranslatorCache::new()),
            4,
            GenerationParams::default(),
        );
        let classifier = ClassificationAdapter::new(backend, classify_batch_size, 96);
        BatchOrchestrator::new(LanguageDetector::new(), translator, classifier, options)
    }

    fn orchestrator(backend: Arc<StubSentimentBackend>) -> BatchOrchestrator {
        orchestrator_with(backend, PipelineOptions::default(), 64)
    }

    #[tokio::test]
    async fn test_single_english_item() {
        let o = orchestrator(Arc::new(StubSentimentBackend::five_class()));
        let results = o
            .run(&[RawItem::new(1, "I love this! http://x.co")])
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        let analysis = &results[0].analysis;
        assert_eq!(analysis.text_original, "I love this!");
        assert_eq!(analysis.text, "I love this!");
        assert_eq!(analysis.lang, "en");
        assert_eq!(analysis.classification.label, SentimentLabel::Positive);
        assert!(analysis.classification.confidence > 0.5);
        assert_eq!(results[0].id, json!(1));
    }

    #[tokio::test]
    async fn test_empty_text_gets_neutral_zero_record() {
        let backend = Arc::new(StubSentimentBackend::three_class());
        let o = orchestrator(backend.clone());
        let results = o
            .run(&[RawItem::new(Value::Null, "@only #tags http://x.co"), RawItem::new(2, "")])
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        for r in &results {
            assert_eq!(r.analysis.classification, ClassificationResult::empty());
            assert_eq!(r.analysis.lang, "en");
        }
        assert_eq!(results[0].id, Value::Null);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_all_empty_batch_keeps_cardinality() {
        let o = orchestrator(Arc::new(StubSentimentBackend::three_class()));
        let items: Vec<RawItem> = (0..7).map(|i| RawItem::new(i, "")).collect();
        let results = o.run(&items).await.unwrap();
        assert_eq!(results.len(), 7);
        let ids: Vec<Value> = results.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, (0..7).map(|i| json!(i)).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_urdu_translated_for_display_only() {
        let backend = Arc::new(StubSentimentBackend::three_class());
        let o = orchestrator(backend.clone());
        let results = o.run(&[RawItem::new("u1", "یہ اچھا ہے")]).await.unwrap();

        let analysis = &results[0].analysis;
        assert_eq!(analysis.lang, "ur");
        assert_eq!(analysis.text_original, "یہ اچھا ہے");
        assert_eq!(analysis.text, "[en] یہ اچھا ہے");
        assert_eq!(backend.calls()[0], vec!["یہ اچھا ہے".to_string()]);
    }

    #[tokio::test]
    async fn test_classify_on_translated_uses_display_text() {
        let backend = Arc::new(StubSentimentBackend::three_class());
        let options = PipelineOptions {
            classify_on_translated: true,
            ..PipelineOptions::default()
        };
        let o = orchestrator_with(backend.clone(), options, 64);
        o.run(&[RawItem::new(1, "یہ اچھا ہے"), RawItem::new(2, "good day")])
            .await
            .unwrap();
        assert_eq!(
            backend.calls()[0],
            vec!["[en] یہ اچھا ہے".to_string(), "good day".to_string()]
        );
    }

    #[tokio::test]
    async fn test_display_translation_can_be_disabled() {
        let options = PipelineOptions {
            translate_for_display: false,
            ..PipelineOptions::default()
        };
        let o = orchestrator_with(Arc::new(StubSentimentBackend::three_class()), options, 64);
        let results = o.run(&[RawItem::new(1, "یہ اچھا ہے")]).await.unwrap();
        assert_eq!(results[0].analysis.text, "یہ اچھا ہے");
    }

    #[tokio::test]
    async fn test_results_independent_of_batch_size() {
        let items: Vec<RawItem> = [
            "I love it", "", "this is bad", "meh", "@x", "great stuff", "terrible", "ok then",
            "یہ اچھا ہے",
        ]
        .iter()
        .enumerate()
        .map(|(i, t)| RawItem::new(i, *t))
        .collect();

        let mut baseline: Option<Vec<ItemResult>> = None;
        for batch_size in [0, 1, 2, 3, 64] {
            let o = orchestrator_with(
                Arc::new(StubSentimentBackend::three_class()),
                PipelineOptions::default(),
                batch_size,
            );
            let results = o.run(&items).await.unwrap();
            match &baseline {
                None => baseline = Some(results),
                Some(expected) => assert_eq!(&results, expected, "batch_size {}", batch_size),
            }
        }
    }

    #[tokio::test]
    async fn test_item_result_independent_of_neighbours() {
        let o = orchestrator(Arc::new(StubSentimentBackend::three_class()));
        let alone = o.run(&[RawItem::new(1, "great stuff")]).await.unwrap();
        let mixed = o
            .run(&[
                RawItem::new(0, "awful"),
                RawItem::new(1, "great stuff"),
                RawItem::new(2, ""),
            ])
            .await
            .unwrap();
        assert_eq!(alone[0], mixed[1]);
    }

    #[tokio::test]
    async fn test_backend_failure_fails_batch() {
        let o = orchestrator(Arc::new(StubSentimentBackend::three_class().dropping_last()));
        let err = o
            .run(&[RawItem::new(1, "a"), RawItem::new(2, "b")])
            .await
            .unwrap_err();
        match err {
            BackendError::LengthMismatch { model, expected, actual } => {
                assert_eq!(model, "stub-sentiment");
                assert_eq!((expected, actual), (2, 1));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_classifier_sub_batches_skip_empty_texts() {
        let backend = Arc::new(StubSentimentBackend::three_class());
        let o = orchestrator_with(backend.clone(), PipelineOptions::default(), 2);
        let items: Vec<RawItem> = ["a", "", "b", "c", "@x"]
            .iter()
            .enumerate()
            .map(|(i, t)| RawItem::new(i, *t))
            .collect();
        let results = o.run(&items).await.unwrap();

        assert_eq!(results.len(), 5);
        assert_eq!(
            backend.calls(),
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string()],
            ]
        );
        assert_eq!(results[1].analysis.classification, ClassificationResult::empty());
        assert_eq!(results[4].analysis.classification, ClassificationResult::empty());
    }
}

// Classification Service Adapter
// Sub-batched scoring through an opaque sequence-classification backend

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::inference::BackendError;
use super::projection::LabelScheme;
use super::text_processor::clip_to_token_budget;

/// A pretrained classifier returning one probability vector (length = `num_labels`) per input.
#[async_trait]
pub trait SentimentBackend: Send + Sync {
    fn model_id(&self) -> &str;

    /// Declared label cardinality K.
    fn num_labels(&self) -> usize;

    async fn score_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, BackendError>;
}

pub struct ClassificationAdapter {
    backend: Arc<dyn SentimentBackend>,
    scheme: LabelScheme,
    batch_size: usize,
    max_tokens: usize,
}

impl ClassificationAdapter {
    pub fn new(backend: Arc<dyn SentimentBackend>, batch_size: usize, max_tokens: usize) -> Self {
        let scheme = LabelScheme::from_num_labels(backend.num_labels());
        info!(
            model = backend.model_id(),
            num_labels = backend.num_labels(),
            scheme = ?scheme,
            "[CLASSIFY] classifier ready"
        );
        Self {
            backend,
            scheme,
            batch_size: batch_size.max(1),
            max_tokens,
        }
    }

    pub fn scheme(&self) -> LabelScheme {
        self.scheme
    }

    /// Score `texts` in order. Empty strings never reach the backend and get a zero vector.
    pub async fn classify_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, BackendError> {
        let k = self.scheme.num_labels();
        let mut out: Vec<Vec<f64>> = vec![vec![0.0; k]; texts.len()];

        let pending: Vec<usize> = (0..texts.len()).filter(|&i| !texts[i].is_empty()).collect();

        for chunk in pending.chunks(self.batch_size) {
            let inputs: Vec<String> = chunk
                .iter()
                .map(|&i| clip_to_token_budget(&texts[i], self.max_tokens).to_string())
                .collect();

            let rows = self.backend.score_batch(&inputs).await?;
            if rows.len() != inputs.len() {
                return Err(BackendError::LengthMismatch {
                    model: self.backend.model_id().to_string(),
                    expected: inputs.len(),
                    actual: rows.len(),
                });
            }

            for (&i, row) in chunk.iter().zip(rows) {
                if row.len() != k {
                    return Err(BackendError::LabelCountMismatch {
                        model: self.backend.model_id().to_string(),
                        expected: k,
                        actual: row.len(),
                    });
                }
                out[i] = row;
            }
            debug!(batch = chunk.len(), "[CLASSIFY] scored sub-batch");
        }

        Ok(out)
    }
}

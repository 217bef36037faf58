// Score Projection
// Maps a model's native probability vector onto negative / neutral / positive

use crate::models::{ClassificationResult, LabelScores};

/// Label layout of the classification model, fixed once from its declared label count.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LabelScheme {
    /// [negative, neutral, positive]
    ThreeClass,
    /// Five-level scale, index 0 = most negative.
    FiveClass,
    /// Any other cardinality; projected by coarse thirds.
    Other(usize),
}

impl LabelScheme {
    pub fn from_num_labels(num_labels: usize) -> Self {
        match num_labels {
            3 => Self::ThreeClass,
            5 => Self::FiveClass,
            k => Self::Other(k),
        }
    }

    pub fn num_labels(&self) -> usize {
        match self {
            Self::ThreeClass => 3,
            Self::FiveClass => 5,
            Self::Other(k) => *k,
        }
    }

    pub fn project(&self, probs: &[f64]) -> LabelScores {
        let at = |i: usize| probs.get(i).copied().unwrap_or(0.0);
        let (neg, neu, pos) = match self {
            Self::ThreeClass => (at(0), at(1), at(2)),
            Self::FiveClass => (at(0) + at(1), at(2), at(3) + at(4)),
            Self::Other(_) => coarse_thirds(probs),
        };
        LabelScores::new(clamp_unit(neg), clamp_unit(neu), clamp_unit(pos))
    }

    pub fn classify(&self, probs: &[f64]) -> ClassificationResult {
        ClassificationResult::from_scores(self.project(probs))
    }
}

/// Approximation only: assumes low indices lean negative and high indices positive,
/// with no further knowledge of the label semantics. The remainder goes to the last chunk.
fn coarse_thirds(probs: &[f64]) -> (f64, f64, f64) {
    if probs.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let k = probs.len();
    let third = (k / 3).max(1);
    let mid_end = (2 * third).min(k);
    let first_end = third.min(k);

    let neg: f64 = probs[..first_end].iter().sum();
    let neu: f64 = probs[first_end..mid_end].iter().sum();
    let pos: f64 = probs[mid_end..].iter().sum();
    (neg, neu, pos)
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

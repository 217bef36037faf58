// TweetLens Data Models
// Input records, per-tweet results, group summary and the job payload

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============ Labels ============

/// Canonical 3-class sentiment space. Declaration order is the tie-break order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    #[default]
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [Self::Negative, Self::Neutral, Self::Positive];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scores over the canonical labels. After projection they need not sum to 1.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LabelScores {
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

impl LabelScores {
    pub fn new(negative: f64, neutral: f64, positive: f64) -> Self {
        Self { negative, neutral, positive }
    }

    pub fn get(&self, label: SentimentLabel) -> f64 {
        match label {
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Positive => self.positive,
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.negative, self.neutral, self.positive]
    }

    /// Highest-scoring label; ties go to the earliest label in `SentimentLabel::ALL`.
    pub fn argmax(&self) -> SentimentLabel {
        let mut best = SentimentLabel::Negative;
        for label in SentimentLabel::ALL {
            if self.get(label) > self.get(best) {
                best = label;
            }
        }
        best
    }

    /// True when no score object was produced for the item (synthetic empty-text record).
    pub fn is_zero(&self) -> bool {
        self.negative == 0.0 && self.neutral == 0.0 && self.positive == 0.0
    }

    /// Scalar polarity used by the trend detector.
    pub fn polarity_index(&self) -> f64 {
        self.positive - self.negative
    }
}

// ============ Input ============

/// One tweet as read from the input document. `id` is kept verbatim (null if absent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub id: Value,
    pub text: String,
}

impl RawItem {
    pub fn new(id: impl Into<Value>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TweetDetails {
    #[serde(default)]
    pub tweet_id: Value,
    #[serde(default)]
    pub text: Option<String>,
}

/// Element of the input document array.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InputRecord {
    #[serde(default)]
    pub tweet_details: Option<TweetDetails>,
}

impl From<InputRecord> for RawItem {
    fn from(record: InputRecord) -> Self {
        let details = record.tweet_details.unwrap_or_default();
        RawItem {
            id: details.tweet_id,
            text: details.text.unwrap_or_default(),
        }
    }
}

// ============ Per-tweet Result ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: SentimentLabel,
    pub confidence: f64,
    pub scores: LabelScores,
}

impl ClassificationResult {
    pub fn from_scores(scores: LabelScores) -> Self {
        let label = scores.argmax();
        Self {
            label,
            confidence: scores.get(label),
            scores,
        }
    }

    /// Placeholder for items with no text to classify.
    pub fn empty() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence: 0.0,
            scores: LabelScores::default(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.scores.is_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetAnalysis {
    /// Normalized original text.
    pub text_original: String,
    /// English display text (translated when the language is allow-listed).
    pub text: String,
    pub lang: String,
    #[serde(flatten)]
    pub classification: ClassificationResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    #[serde(rename = "tweet_id")]
    pub id: Value,
    pub analysis: TweetAnalysis,
}

// ============ Group Summary ============

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LabelCounts {
    pub negative: usize,
    pub neutral: usize,
    pub positive: usize,
}

impl LabelCounts {
    pub fn increment(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Positive => self.positive += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.negative + self.neutral + self.positive
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OverallSentiment {
    pub label: SentimentLabel,
    pub confidence: f64,
    pub avg_scores: LabelScores,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Trend {
    pub direction: SentimentLabel,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GroupSummary {
    pub overall: OverallSentiment,
    pub counts: LabelCounts,
    pub n_tweets: usize,
    pub trend: Trend,
}

// ============ Job Payload ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub summary: GroupSummary,
    pub results: Vec<ItemResult>,
}

// ============ Trigger Responses ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub status: String,
    pub input_file: String,
    pub output_file: String,
    pub processed_tweets: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

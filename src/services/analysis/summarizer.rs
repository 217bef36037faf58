// Group Summary
// Aggregates per-tweet results into an overall label, label counts and a trend

use crate::models::{GroupSummary, ItemResult, LabelCounts, LabelScores, OverallSentiment, SentimentLabel, Trend};

pub const DEFAULT_TREND_THRESHOLD: f64 = 0.05;
const MIN_TREND_ITEMS: usize = 3;
const THIRDS_WINDOW_ITEMS: usize = 6;

/// Summarize results in input (chronological) order. Items without scores are skipped.
pub fn summarize_group(results: &[ItemResult], trend_threshold: f64) -> GroupSummary {
    let mut totals = [0.0_f64; 3];
    let mut counts = LabelCounts::default();
    let mut index_series: Vec<f64> = Vec::new();

    for result in results {
        let classification = &result.analysis.classification;
        if classification.is_degenerate() {
            continue;
        }
        for (total, score) in totals.iter_mut().zip(classification.scores.as_array()) {
            *total += score;
        }
        counts.increment(classification.label);
        index_series.push(classification.scores.polarity_index());
    }

    let n = index_series.len();
    if n == 0 {
        return GroupSummary {
            overall: OverallSentiment {
                label: SentimentLabel::Neutral,
                confidence: 0.0,
                avg_scores: LabelScores::default(),
            },
            counts,
            n_tweets: 0,
            trend: Trend::default(),
        };
    }

    let avg_scores = LabelScores::new(
        totals[0] / n as f64,
        totals[1] / n as f64,
        totals[2] / n as f64,
    );
    let label = avg_scores.argmax();

    GroupSummary {
        overall: OverallSentiment {
            label,
            confidence: avg_scores.get(label),
            avg_scores,
        },
        counts,
        n_tweets: n,
        trend: compute_trend(&index_series, trend_threshold),
    }
}

/// Windowed mean shift between the start and end of the series.
///
/// Fewer than 3 points is neutral. From 6 points on each window is a third
/// of the series, otherwise half. `delta` inside `±threshold` is neutral.
pub fn compute_trend(series: &[f64], threshold: f64) -> Trend {
    let m = series.len();
    if m < MIN_TREND_ITEMS {
        return Trend::default();
    }

    let window = if m >= THIRDS_WINDOW_ITEMS { m / 3 } else { m / 2 };
    let k = window.max(1);
    let first = mean(&series[..k]);
    let last = mean(&series[m - k..]);
    let delta = last - first;

    let direction = if delta > threshold {
        SentimentLabel::Positive
    } else if delta < -threshold {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };

    Trend { direction, delta }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len().max(1) as f64
}

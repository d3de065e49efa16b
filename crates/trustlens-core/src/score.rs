//! Trust-score aggregation.
//!
//! Combines the five quality signals (plus an optional nutrition
//! consistency signal) into a weighted base score, subtracts a flat
//! penalty per fired checklist item, and renders the advertisement
//! verdict. Signals outside [0, 100] are a caller bug and fail fast
//! here rather than producing a silently skewed score.

use thiserror::Error;

use crate::types::{QualitySignals, RawScores, ScoreBreakdown};

/// Final score below which a review is ruled an advertisement.
pub const AD_SCORE_THRESHOLD: f64 = 40.0;

/// Detected-item count at or above which a review is ruled an
/// advertisement regardless of score.
pub const AD_COUNT_THRESHOLD: usize = 3;

/// Flat deduction per fired checklist item.
pub const PENALTY_PER_ITEM: f64 = 10.0;

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("signal {signal} out of range [0, 100]: {value}")]
    OutOfRange { signal: &'static str, value: f64 },
}

/// Round half away from zero to two decimals.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreAggregator;

impl ScoreAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Produce the full score breakdown for one review.
    ///
    /// Two weight vectors exist: when a nutrition signal is present it
    /// takes a fifth of the base score and the other weights shrink to
    /// make room; when absent the original five-signal weights apply.
    /// The penalty is uncapped, so enough detections drive any review
    /// to the floor.
    pub fn aggregate(
        &self,
        signals: &QualitySignals,
        nutrition_score: Option<f64>,
        detected_count: usize,
    ) -> Result<ScoreBreakdown, ScoreError> {
        let length = signals.length_score();
        let repurchase = signals.repurchase_score();
        let monthly_use = signals.monthly_use_score();
        let photo = signals.photo_score();
        let consistency = signals.consistency_score();

        check_range("length", length)?;
        check_range("repurchase", repurchase)?;
        check_range("monthly_use", monthly_use)?;
        check_range("photo", photo)?;
        check_range("consistency", consistency)?;
        if let Some(nutrition) = nutrition_score {
            check_range("nutrition", nutrition)?;
        }

        let base_score = match nutrition_score {
            Some(nutrition) => round2(
                length * 0.15
                    + repurchase * 0.15
                    + monthly_use * 0.25
                    + photo * 0.10
                    + consistency * 0.15
                    + nutrition * 0.20,
            ),
            None => round2(
                length * 0.20
                    + repurchase * 0.20
                    + monthly_use * 0.30
                    + photo * 0.10
                    + consistency * 0.20,
            ),
        };

        let penalty = detected_count as f64 * PENALTY_PER_ITEM;
        let final_score = round2((base_score - penalty).max(0.0));

        Ok(ScoreBreakdown {
            base_score,
            penalty,
            nutrition_score,
            final_score,
            raw_scores: RawScores {
                length,
                repurchase,
                monthly_use,
                photo,
                consistency,
                nutrition: nutrition_score,
            },
        })
    }

    /// Advertisement verdict: low final score or enough fired items.
    pub fn is_ad(&self, final_score: f64, detected_count: usize) -> bool {
        final_score < AD_SCORE_THRESHOLD || detected_count >= AD_COUNT_THRESHOLD
    }
}

fn check_range(signal: &'static str, value: f64) -> Result<(), ScoreError> {
    if !(0.0..=100.0).contains(&value) || value.is_nan() {
        return Err(ScoreError::OutOfRange { signal, value });
    }
    Ok(())
}

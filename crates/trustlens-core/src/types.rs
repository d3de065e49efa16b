//! Core types for review trust analysis.
//!
//! These types are the data structures used throughout trustlens for
//! reviews, checklist detections, and score breakdowns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::nutrition::NutritionValidation;
use crate::rating::RatingAnalysis;

/// A review under analysis.
///
/// Constructed per analysis call and never mutated. Persistence is an
/// external collaborator's job; the engine only reads from this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// The review body text
    pub body: String,

    /// Star rating (1-5), if the caller has it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,

    /// Opaque product key, used only to look up external records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    /// Client-supplied quality signals
    #[serde(default)]
    pub signals: QualitySignals,
}

impl Review {
    /// Create a review from body text with default signals.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            rating: None,
            product_id: None,
            signals: QualitySignals::default(),
        }
    }

    /// Attach a star rating.
    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Attach a product identifier.
    pub fn with_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }
}

/// Client-supplied quality signals, each 0-100 and independently optional.
///
/// Missing signals fall back to a midpoint of 50, except `photo` which
/// defaults to 0 (no photo attached is the common case, not the midpoint).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct QualitySignals {
    /// Review length score (L)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    /// Repurchase score (R)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repurchase: Option<f64>,

    /// Monthly-use score (M)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_use: Option<f64>,

    /// Photo attachment score (P)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<f64>,

    /// Content consistency score (C)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistency: Option<f64>,
}

impl QualitySignals {
    pub fn length_score(&self) -> f64 {
        self.length.unwrap_or(50.0)
    }

    pub fn repurchase_score(&self) -> f64 {
        self.repurchase.unwrap_or(50.0)
    }

    pub fn monthly_use_score(&self) -> f64 {
        self.monthly_use.unwrap_or(50.0)
    }

    pub fn photo_score(&self) -> f64 {
        self.photo.unwrap_or(0.0)
    }

    pub fn consistency_score(&self) -> f64 {
        self.consistency.unwrap_or(50.0)
    }
}

/// Aggregate rating statistics for a product.
///
/// Fields are nullable because the catalog may not have stats for every
/// product; the rating analyzer degrades to a neutral score when any
/// field is missing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductStats {
    /// Product-wide average rating (1.0-5.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_avg: Option<f64>,

    /// Total number of ratings behind the average
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<u32>,
}

/// One fired checklist item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    /// Stable checklist item id (1-14)
    pub id: u8,

    /// Base display name of the item
    pub name: String,

    /// True when a product-specific suspicious expression fired the item
    /// instead of a generic pattern
    #[serde(default)]
    pub product_specific: bool,

    /// Escalation note appended to the display name, e.g. a false-claim
    /// annotation from the nutrition cross-validator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl Detection {
    pub fn new(id: u8, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            product_specific: false,
            annotation: None,
        }
    }

    /// The human-facing name, with any annotation appended.
    pub fn display_name(&self) -> String {
        match &self.annotation {
            Some(note) => format!("{} ({})", self.name, note),
            None => self.name.clone(),
        }
    }
}

/// Fired checklist items for one review, ordered by ascending item id.
///
/// BTreeMap keeps iteration deterministic, which the reason list and the
/// item-7 dependency on items 2/8 both rely on.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DetectionResult {
    items: BTreeMap<u8, Detection>,
}

impl DetectionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fired item. An existing entry for the same id is replaced.
    pub fn insert(&mut self, detection: Detection) {
        self.items.insert(detection.id, detection);
    }

    /// Whether the item with this id fired.
    pub fn contains(&self, id: u8) -> bool {
        self.items.contains_key(&id)
    }

    pub fn get(&self, id: u8) -> Option<&Detection> {
        self.items.get(&id)
    }

    /// Escalate an item from a cross-check. If the item already fired, its
    /// display name gains `fired_note` (appended after any existing note);
    /// otherwise a fresh entry is inserted annotated with `fresh_note`.
    pub fn escalate(&mut self, id: u8, base_name: &str, fired_note: &str, fresh_note: &str) {
        match self.items.get_mut(&id) {
            Some(existing) => {
                existing.annotation = Some(match existing.annotation.take() {
                    Some(prev) => format!("{prev}, {fired_note}"),
                    None => fired_note.to_string(),
                });
            }
            None => {
                let mut detection = Detection::new(id, base_name);
                detection.annotation = Some(fresh_note.to_string());
                self.items.insert(id, detection);
            }
        }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.items.values()
    }

    /// Human-readable reasons in `"<id>. <name>"` form, ascending by id.
    pub fn reasons(&self) -> Vec<String> {
        self.items
            .values()
            .map(|d| format!("{}. {}", d.id, d.display_name()))
            .collect()
    }
}

/// Raw sub-score vector behind a score breakdown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RawScores {
    pub length: f64,
    pub repurchase: f64,
    pub monthly_use: f64,
    pub photo: f64,
    pub consistency: f64,

    /// Present only when the nutrition-consistency signal was computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<f64>,
}

/// The aggregator's output. Immutable value object returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    /// Weighted sum of the sub-scores, before penalty
    pub base_score: f64,

    /// Checklist hits x 10, uncapped
    pub penalty: f64,

    /// Nutrition-consistency sub-score, when computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_score: Option<f64>,

    /// max(0, base - penalty), rounded to 2 decimals
    pub final_score: f64,

    /// The raw sub-score vector
    pub raw_scores: RawScores,
}

/// Full validation verdict for one review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validation {
    /// Final trust score in [0, 100]
    pub trust_score: f64,

    /// Advertisement verdict: final score below 40 OR 3+ detections
    pub is_ad: bool,

    /// Fired items in `"<id>. <name>"` form, ascending by id
    pub reasons: Vec<String>,

    pub base_score: f64,
    pub penalty: f64,
    pub detected_count: usize,
    pub raw_scores: RawScores,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_score: Option<f64>,

    /// Per-mention ingredient validity, when a nutrition record was supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_validation: Option<NutritionValidation>,

    /// Rating-plausibility analysis, when product stats were supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_analysis: Option<RatingAnalysis>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_defaults() {
        let signals = QualitySignals::default();
        assert_eq!(signals.length_score(), 50.0);
        assert_eq!(signals.repurchase_score(), 50.0);
        assert_eq!(signals.monthly_use_score(), 50.0);
        assert_eq!(signals.photo_score(), 0.0);
        assert_eq!(signals.consistency_score(), 50.0);
    }

    #[test]
    fn test_detection_display_name_with_annotation() {
        let mut detection = Detection::new(5, "원료 특징 나열");
        assert_eq!(detection.display_name(), "원료 특징 나열");

        detection.annotation = Some("허위 성분 주장 포함".to_string());
        assert_eq!(detection.display_name(), "원료 특징 나열 (허위 성분 주장 포함)");
    }

    #[test]
    fn test_reasons_ascending_by_id() {
        let mut result = DetectionResult::new();
        result.insert(Detection::new(8, "찬사 위주 구성"));
        result.insert(Detection::new(2, "감탄사 남발"));
        result.insert(Detection::new(13, "이모티콘 과다 사용"));

        assert_eq!(
            result.reasons(),
            vec![
                "2. 감탄사 남발",
                "8. 찬사 위주 구성",
                "13. 이모티콘 과다 사용"
            ]
        );
    }

    #[test]
    fn test_escalate_annotates_existing_entry() {
        let mut result = DetectionResult::new();
        result.insert(Detection::new(5, "원료 특징 나열"));
        result.escalate(5, "원료 특징 나열", "허위 성분 주장 포함", "허위 성분 주장");

        assert_eq!(result.count(), 1);
        let detection = result.get(5).unwrap();
        assert_eq!(detection.display_name(), "원료 특징 나열 (허위 성분 주장 포함)");
    }

    #[test]
    fn test_escalate_keeps_product_specific_note() {
        let mut result = DetectionResult::new();
        let mut detection = Detection::new(5, "원료 특징 나열");
        detection.product_specific = true;
        detection.annotation = Some("제품별 기준: 100% 국내산".to_string());
        result.insert(detection);

        result.escalate(5, "원료 특징 나열", "허위 성분 주장 포함", "허위 성분 주장");

        assert_eq!(
            result.get(5).unwrap().display_name(),
            "원료 특징 나열 (제품별 기준: 100% 국내산, 허위 성분 주장 포함)"
        );
    }

    #[test]
    fn test_escalate_inserts_when_absent() {
        let mut result = DetectionResult::new();
        result.escalate(5, "원료 특징 나열", "허위 성분 주장 포함", "허위 성분 주장");

        assert_eq!(result.count(), 1);
        assert!(result.contains(5));
        assert_eq!(
            result.reasons(),
            vec!["5. 원료 특징 나열 (허위 성분 주장)"]
        );
    }

    #[test]
    fn test_review_builder() {
        let review = Review::text("석 달째 먹는 중인데 무난해요")
            .with_rating(4)
            .with_product("P-1001");
        assert_eq!(review.rating, Some(4));
        assert_eq!(review.product_id.as_deref(), Some("P-1001"));
    }
}

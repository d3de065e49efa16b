//! Pattern checklist engine.
//!
//! Runs the fixed 13-item heuristic table against one review and returns
//! which items fired. The engine never errors: degenerate input (under 3
//! trimmed characters) yields an empty result, and every matcher is total.
//!
//! Items are decided as an ordered pipeline over a shared accumulator, not
//! as independent checks: item 7 (단점 회피) is resolved last because the
//! absence of complaint language only counts as evidence when paired with
//! item 2 (감탄사 남발) or item 8 (찬사 위주 구성). Firing it
//! unconditionally flagged the large majority of genuine satisfied-customer
//! reviews, so the conditional form is load-bearing.

mod patterns;

pub use patterns::{FALSE_NUTRITION_CLAIM_ID, FALSE_NUTRITION_CLAIM_NAME};

use std::collections::HashMap;

use crate::criteria::ProductCriteria;
use crate::types::{Detection, DetectionResult};

use patterns::{
    ChecklistItem, DynamicCheck, Matcher, CHECKLIST, NEGATIVE_OPINION_MARKERS,
    PERSONAL_EXPERIENCE_MARKERS, WORD_TOKEN,
};

/// Default top-token frequency that fires item 6. Genuine reviews repeat
/// product-category words, so the threshold errs high.
pub const DEFAULT_REPETITION_THRESHOLD: usize = 7;

/// Minimum trimmed length the engine will look at; shorter text returns
/// an empty result immediately.
const MIN_CHECKABLE_CHARS: usize = 3;

/// The checklist engine, optionally carrying per-product criteria.
#[derive(Debug, Clone, Default)]
pub struct Checklist {
    criteria: Option<ProductCriteria>,
}

impl Checklist {
    /// Engine with global default criteria.
    pub fn new() -> Self {
        Self { criteria: None }
    }

    /// Engine with per-product overrides.
    pub fn with_criteria(criteria: ProductCriteria) -> Self {
        Self {
            criteria: Some(criteria),
        }
    }

    /// Run the 13-item table against one review text.
    ///
    /// Same text in, same result out: the engine holds no mutable state
    /// across calls.
    pub fn run(&self, text: &str) -> DetectionResult {
        let mut result = DetectionResult::new();

        if text.trim().chars().count() < MIN_CHECKABLE_CHARS {
            return result;
        }

        // Item 7 is deferred so it can see the resolved items 2 and 8.
        let mut deferred: Option<&ChecklistItem> = None;

        for item in CHECKLIST.iter() {
            match &item.matcher {
                Matcher::Dynamic(DynamicCheck::PersonalExperienceAbsent) => {
                    if !has_personal_experience(text) {
                        result.insert(Detection::new(item.id, item.name));
                    }
                }
                Matcher::Dynamic(DynamicCheck::KeywordRepetition) => {
                    let threshold = self
                        .criteria
                        .as_ref()
                        .map(|c| c.keyword_repetition_threshold)
                        .unwrap_or(DEFAULT_REPETITION_THRESHOLD);
                    if has_keyword_repetition(text, threshold) {
                        result.insert(Detection::new(item.id, item.name));
                    }
                }
                Matcher::Dynamic(DynamicCheck::NegativeOpinionAbsent) => {
                    deferred = Some(item);
                }
                Matcher::Patterns(regexes) => {
                    if let Some(expr) = self.matching_suspicious_expression(text) {
                        let mut detection = Detection::new(item.id, item.name);
                        detection.product_specific = true;
                        detection.annotation = Some(format!("제품별 기준: {expr}"));
                        result.insert(detection);
                    } else if regexes.iter().any(|p| p.is_match(text)) {
                        result.insert(Detection::new(item.id, item.name));
                    }
                }
            }
        }

        if let Some(item) = deferred {
            let enthusiasm_or_praise = result.contains(2) || result.contains(8);
            if enthusiasm_or_praise && !self.has_negative_opinion(text) {
                result.insert(Detection::new(item.id, item.name));
            }
        }

        result
    }

    /// First product-specific suspicious expression found in the text.
    fn matching_suspicious_expression(&self, text: &str) -> Option<&str> {
        self.criteria.as_ref().and_then(|c| {
            c.ad_suspicious_expressions
                .iter()
                .find(|expr| text.contains(expr.as_str()))
                .map(String::as_str)
        })
    }

    /// Whether the text mentions any complaint or drawback. Product
    /// criteria can contribute extra complaint vocabulary.
    fn has_negative_opinion(&self, text: &str) -> bool {
        if let Some(criteria) = &self.criteria {
            if criteria
                .negative_expressions
                .iter()
                .any(|expr| text.contains(expr.as_str()))
            {
                return true;
            }
        }

        NEGATIVE_OPINION_MARKERS.iter().any(|p| p.is_match(text))
    }
}

/// Whether any experiential marker appears in the text.
fn has_personal_experience(text: &str) -> bool {
    PERSONAL_EXPERIENCE_MARKERS.iter().any(|p| p.is_match(text))
}

/// Whether the single most frequent token (2+ chars) appears at least
/// `threshold` times. Texts under 10 tokens are too short to judge.
fn has_keyword_repetition(text: &str, threshold: usize) -> bool {
    let words: Vec<&str> = WORD_TOKEN.find_iter(text).map(|m| m.as_str()).collect();
    if words.len() < 10 {
        return false;
    }

    let mut freq: HashMap<&str, usize> = HashMap::new();
    for word in words {
        if word.chars().count() >= 2 {
            *freq.entry(word).or_insert(0) += 1;
        }
    }

    freq.values().copied().max().unwrap_or(0) >= threshold
}

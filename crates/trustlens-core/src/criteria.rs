//! Per-product evaluation criteria.
//!
//! Criteria are supplied externally (YAML or JSON configuration) and tune
//! the checklist for one product: extra complaint vocabulary, extra
//! advertisement-suspicious phrases, and threshold overrides. When no
//! criteria are supplied the engine falls back to global defaults, so
//! every field here carries a serde default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checklist::DEFAULT_REPETITION_THRESHOLD;

/// Minimum trimmed review length accepted for full analysis.
pub const DEFAULT_MIN_REVIEW_LENGTH: usize = 10;

#[derive(Debug, Error)]
pub enum CriteriaError {
    #[error("criteria product_name must not be empty")]
    EmptyProductName,

    #[error("keyword_repetition_threshold must be at least 2, got {0}")]
    ThresholdTooLow(usize),

    #[error("criteria file not readable: {0}")]
    Io(#[from] std::io::Error),

    #[error("criteria YAML malformed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("criteria JSON malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Product-specific tuning for one checklist pass. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCriteria {
    pub product_name: String,

    pub category: String,

    /// Vocabulary a genuine satisfied review of this product tends to use.
    #[serde(default)]
    pub positive_keywords: Vec<String>,

    /// Complaint vocabulary specific to this product. Counts toward the
    /// negative-opinion check alongside the global markers.
    #[serde(default)]
    pub negative_expressions: Vec<String>,

    /// Phrases that mark a review as ad-suspicious for this product
    /// regardless of the generic pattern tables.
    #[serde(default)]
    pub ad_suspicious_expressions: Vec<String>,

    #[serde(default = "default_repetition_threshold")]
    pub keyword_repetition_threshold: usize,

    #[serde(default = "default_min_review_length")]
    pub min_review_length: usize,
}

fn default_repetition_threshold() -> usize {
    DEFAULT_REPETITION_THRESHOLD
}

fn default_min_review_length() -> usize {
    DEFAULT_MIN_REVIEW_LENGTH
}

impl ProductCriteria {
    /// Criteria with defaults only, for products without a curated preset.
    pub fn generic(product_name: &str, category: &str) -> Self {
        Self {
            product_name: product_name.to_string(),
            category: category.to_string(),
            positive_keywords: Vec::new(),
            negative_expressions: Vec::new(),
            ad_suspicious_expressions: Vec::new(),
            keyword_repetition_threshold: default_repetition_threshold(),
            min_review_length: default_min_review_length(),
        }
    }

    /// Curated preset for vitamin C supplements.
    pub fn vitamin_c() -> Self {
        Self {
            product_name: "비타민C".to_string(),
            category: "비타민".to_string(),
            positive_keywords: to_strings(&[
                "면역력", "감기예방", "항산화", "콜라겐", "피부건강", "에너지", "활력", "회복",
            ]),
            negative_expressions: to_strings(&[
                "알레르기", "위장불편", "메스꺼움", "설사", "복통", "부작용", "불편함", "아쉬움",
            ]),
            ad_suspicious_expressions: to_strings(&[
                "100% 효과",
                "즉시 개선",
                "완벽한",
                "기적",
                "단 하루만에",
                "일주일 만에 완전히",
            ]),
            keyword_repetition_threshold: default_repetition_threshold(),
            min_review_length: default_min_review_length(),
        }
    }

    /// Curated preset for probiotic supplements.
    pub fn probiotics() -> Self {
        Self {
            product_name: "프로바이오틱스".to_string(),
            category: "유산균".to_string(),
            positive_keywords: to_strings(&[
                "장건강", "소화", "변비개선", "면역력", "균형", "활력", "편안함",
            ]),
            negative_expressions: to_strings(&[
                "복통", "가스", "팽만감", "설사", "불편", "효과없음", "변화없음",
            ]),
            ad_suspicious_expressions: to_strings(&[
                "완벽한 장건강",
                "즉시 효과",
                "100% 개선",
                "기적의 변화",
            ]),
            keyword_repetition_threshold: default_repetition_threshold(),
            min_review_length: default_min_review_length(),
        }
    }

    /// Curated preset for omega-3 supplements.
    pub fn omega3() -> Self {
        Self {
            product_name: "오메가3".to_string(),
            category: "지방산".to_string(),
            positive_keywords: to_strings(&[
                "뇌건강", "심혈관", "콜레스테롤", "관절", "항염", "집중력", "기억력",
            ]),
            negative_expressions: to_strings(&[
                "비린내", "트림", "소화불량", "불편", "아쉬움",
            ]),
            ad_suspicious_expressions: to_strings(&[
                "완벽한 뇌건강",
                "즉시 효과",
                "100% 개선",
            ]),
            keyword_repetition_threshold: default_repetition_threshold(),
            min_review_length: default_min_review_length(),
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self, CriteriaError> {
        let criteria: Self = serde_yaml::from_str(raw)?;
        criteria.validate()?;
        Ok(criteria)
    }

    pub fn from_yaml_file(path: &std::path::Path) -> Result<Self, CriteriaError> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, CriteriaError> {
        let criteria: Self = serde_json::from_str(raw)?;
        criteria.validate()?;
        Ok(criteria)
    }

    /// Structural checks beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        if self.product_name.trim().is_empty() {
            return Err(CriteriaError::EmptyProductName);
        }
        if self.keyword_repetition_threshold < 2 {
            return Err(CriteriaError::ThresholdTooLow(
                self.keyword_repetition_threshold,
            ));
        }
        Ok(())
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_YAML: &str = "\
product_name: 루테인 플러스
category: 눈건강
";

    const FULL_YAML: &str = "\
product_name: 비타민C 1000
category: 비타민
positive_keywords:
  - 면역력
  - 활력
negative_expressions:
  - 위장불편
ad_suspicious_expressions:
  - 단 하루만에
keyword_repetition_threshold: 5
min_review_length: 20
";

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let criteria = ProductCriteria::from_yaml(MINIMAL_YAML).unwrap();
        assert_eq!(criteria.product_name, "루테인 플러스");
        assert_eq!(criteria.keyword_repetition_threshold, 7);
        assert_eq!(criteria.min_review_length, 10);
        assert!(criteria.positive_keywords.is_empty());
    }

    #[test]
    fn test_full_yaml_round() {
        let criteria = ProductCriteria::from_yaml(FULL_YAML).unwrap();
        assert_eq!(criteria.keyword_repetition_threshold, 5);
        assert_eq!(criteria.min_review_length, 20);
        assert_eq!(criteria.ad_suspicious_expressions, vec!["단 하루만에"]);
    }

    #[test]
    fn test_json_parsing() {
        let criteria = ProductCriteria::from_json(
            r#"{"product_name": "오메가3", "category": "지방산"}"#,
        )
        .unwrap();
        assert_eq!(criteria.category, "지방산");
    }

    #[test]
    fn test_empty_product_name_rejected() {
        let err = ProductCriteria::from_yaml("product_name: \"  \"\ncategory: 기타\n")
            .unwrap_err();
        assert!(matches!(err, CriteriaError::EmptyProductName));
    }

    #[test]
    fn test_threshold_floor_rejected() {
        let mut criteria = ProductCriteria::generic("테스트", "기타");
        criteria.keyword_repetition_threshold = 1;
        assert!(matches!(
            criteria.validate(),
            Err(CriteriaError::ThresholdTooLow(1))
        ));
    }

    #[test]
    fn test_presets_are_internally_valid() {
        ProductCriteria::vitamin_c().validate().unwrap();
        ProductCriteria::probiotics().validate().unwrap();
        ProductCriteria::omega3().validate().unwrap();
    }
}

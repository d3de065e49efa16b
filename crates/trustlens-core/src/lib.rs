//! Heuristic trust scoring for health-supplement product reviews.
//!
//! The crate judges one Korean-language review at a time: a fixed 13-item
//! advertisement checklist fires pattern detections, optional external
//! records (per-product criteria, nutrition data, aggregate ratings)
//! sharpen them, and a weighted aggregator folds everything into a trust
//! score in [0, 100] plus a hard advertisement verdict.
//!
//! [`validate_review`] is the synchronous entry point. It never touches
//! the network; all external records arrive pre-fetched as arguments, and
//! missing records degrade to neutral scores rather than errors.

pub mod checklist;
pub mod criteria;
pub mod nutrition;
pub mod rating;
pub mod score;
pub mod types;

pub use checklist::Checklist;
pub use criteria::{CriteriaError, ProductCriteria};
pub use nutrition::{NutritionRecord, NutritionValidation, RecordError};
pub use rating::{RatingAnalysis, RatingAnalyzer, RatingPattern};
pub use score::{ScoreAggregator, ScoreError, AD_COUNT_THRESHOLD, AD_SCORE_THRESHOLD};
pub use types::{
    Detection, DetectionResult, ProductStats, QualitySignals, Review, ScoreBreakdown, Validation,
};

/// Run the full validation pipeline for one review.
///
/// Steps: checklist pass (with criteria overrides when supplied), nutrition
/// cross-checks and consistency scoring (when a record is supplied), score
/// aggregation, verdict, and rating analysis (when stats are supplied).
///
/// The only error is [`ScoreError`] for out-of-range caller signals;
/// everything record-related degrades silently.
pub fn validate_review(
    review: &Review,
    criteria: Option<&ProductCriteria>,
    record: Option<&NutritionRecord>,
    stats: Option<&ProductStats>,
) -> Result<Validation, ScoreError> {
    let checklist = match criteria {
        Some(criteria) => Checklist::with_criteria(criteria.clone()),
        None => Checklist::new(),
    };
    let mut detections = checklist.run(&review.body);

    let mut nutrition_score = None;
    let mut nutrition_validation = None;
    if let Some(record) = record {
        nutrition::apply_cross_checks(&review.body, record, &mut detections);
        nutrition_validation = Some(nutrition::validate_claims(&review.body, Some(record)));
        nutrition_score = Some(nutrition::consistency_score(&review.body, Some(record)));
    }

    let aggregator = ScoreAggregator::new();
    let breakdown = aggregator.aggregate(&review.signals, nutrition_score, detections.count())?;
    let is_ad = aggregator.is_ad(breakdown.final_score, detections.count());

    tracing::debug!(
        final_score = breakdown.final_score,
        detected = detections.count(),
        is_ad,
        "review validated"
    );

    let rating_analysis =
        stats.map(|stats| RatingAnalyzer::new().analyze(review.rating, stats, &detections));

    Ok(Validation {
        trust_score: breakdown.final_score,
        is_ad,
        reasons: detections.reasons(),
        base_score: breakdown.base_score,
        penalty: breakdown.penalty,
        detected_count: detections.count(),
        raw_scores: breakdown.raw_scores,
        nutrition_score,
        nutrition_validation,
        rating_analysis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENUINE_REVIEW: &str =
        "저는 3개월 먹었는데 효과를 잘 모르겠어요. 그런데 가격은 괜찮아요.";
    const AD_REVIEW: &str = "최고!!!! 완전 대박!!!! 강력 추천합니다!!!! 만족 또 만족, 최고";

    const RECORD_YAML: &str = "\
product_id: \"P-77\"
ingredients:
  - name: 루테인
    typical_effect_period_days: 30
";

    #[test]
    fn test_genuine_review_passes() {
        let review = Review::text(GENUINE_REVIEW);
        let validation = validate_review(&review, None, None, None).unwrap();

        assert_eq!(validation.base_score, 45.0);
        assert_eq!(validation.trust_score, 45.0);
        assert!(!validation.is_ad);
        assert!(validation.reasons.is_empty());
        assert!(validation.nutrition_score.is_none());
    }

    #[test]
    fn test_ad_review_is_flagged_by_count() {
        let review = Review::text(AD_REVIEW);
        let validation = validate_review(&review, None, None, None).unwrap();

        assert!(validation.detected_count >= 3);
        assert!(validation.is_ad);
        assert_eq!(
            validation.penalty,
            validation.detected_count as f64 * 10.0
        );
    }

    #[test]
    fn test_missing_record_keeps_five_signal_formula() {
        // A product id alone must not switch to the nutrition-weighted
        // variant; only an actual record does.
        let review = Review::text(GENUINE_REVIEW).with_product("P-77");
        let validation = validate_review(&review, None, None, None).unwrap();

        assert!(validation.nutrition_score.is_none());
        assert!(validation.nutrition_validation.is_none());
        assert_eq!(validation.base_score, 45.0);
    }

    #[test]
    fn test_record_adds_nutrition_outputs() {
        let record = NutritionRecord::from_yaml(RECORD_YAML).unwrap();
        let review = Review::text("저는 루테인 제품 직접 먹어봤는데 눈이 편해요. 다만 캡슐이 커요.");
        let validation = validate_review(&review, None, Some(&record), None).unwrap();

        assert_eq!(validation.nutrition_score, Some(100.0));
        let nutrition = validation.nutrition_validation.unwrap();
        assert_eq!(nutrition.valid_ingredients, vec!["루테인"]);
        assert!(!nutrition.has_invalid_claims);
    }

    #[test]
    fn test_fabricated_ingredient_raises_item_14() {
        let record = NutritionRecord::from_yaml(RECORD_YAML).unwrap();
        let review = Review::text("오메가3 함유라 좋다고 해서 샀어요. 직접 먹는 중. 다만 비싸요.");
        let validation = validate_review(&review, None, Some(&record), None).unwrap();

        assert!(validation
            .reasons
            .iter()
            .any(|r| r.starts_with("14. 허위 영양성분 주장")));
        assert!(validation.nutrition_validation.unwrap().has_invalid_claims);
    }

    #[test]
    fn test_stats_attach_rating_analysis() {
        let stats = ProductStats {
            rating_avg: Some(3.5),
            rating_count: Some(500),
        };
        let review = Review::text(GENUINE_REVIEW).with_rating(5);
        let validation = validate_review(&review, None, None, Some(&stats)).unwrap();

        let rating = validation.rating_analysis.unwrap();
        assert_eq!(rating.reliability_score, 38.0);
        assert_eq!(rating.pattern, RatingPattern::ExtremePositive);
    }

    #[test]
    fn test_out_of_range_signal_propagates() {
        let mut review = Review::text(GENUINE_REVIEW);
        review.signals.photo = Some(250.0);

        let err = validate_review(&review, None, None, None).unwrap_err();
        assert!(matches!(err, ScoreError::OutOfRange { signal: "photo", .. }));
    }

    #[test]
    fn test_reasons_sorted_ascending() {
        let review = Review::text(AD_REVIEW);
        let validation = validate_review(&review, None, None, None).unwrap();

        let ids: Vec<u8> = validation
            .reasons
            .iter()
            .map(|r| r.split('.').next().unwrap().parse().unwrap())
            .collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}

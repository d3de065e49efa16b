//! Rating-plausibility analysis.
//!
//! Compares one review's star rating against the product's aggregate
//! average and count, yielding a reliability score in [0, 100], a pattern
//! classification, and a human-readable insight. Any missing input yields
//! neutral output (score 50, pattern unknown) rather than an error: rating
//! data comes from an external store and is frequently absent.

use serde::{Deserialize, Serialize};

use crate::score::round2;
use crate::types::{DetectionResult, ProductStats};

/// Reliability when any of the three inputs is missing.
pub const NEUTRAL_RELIABILITY_SCORE: f64 = 50.0;

/// How a review's rating sits relative to the product average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingPattern {
    Normal,
    ExtremePositive,
    ExtremeNegative,
    SuspiciousHigh,
    SuspiciousLow,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityLevel {
    High,
    Medium,
    Low,
    VeryLow,
    Unknown,
}

/// Human-readable reading of the rating signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingInsight {
    pub pattern: RatingPattern,
    pub reliability_level: ReliabilityLevel,
    pub message: String,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_diff: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<u32>,
}

/// Full rating analysis attached to a validation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingAnalysis {
    pub reliability_score: f64,
    pub pattern: RatingPattern,
    pub insight: RatingInsight,
    pub manipulation_suspected: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RatingAnalyzer;

impl RatingAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze one review rating against the product aggregate, folding in
    /// the checklist result for the manipulation heuristics.
    pub fn analyze(
        &self,
        review_rating: Option<u8>,
        stats: &ProductStats,
        detections: &DetectionResult,
    ) -> RatingAnalysis {
        let reliability_score =
            self.reliability(review_rating, stats.rating_avg, stats.rating_count);
        let pattern = self.pattern(review_rating, stats.rating_avg);
        let insight = self.insight(
            review_rating,
            stats.rating_avg,
            stats.rating_count,
            reliability_score,
        );
        let manipulation_suspected = self.detect_manipulation(
            review_rating,
            stats.rating_avg,
            reliability_score,
            detections,
        );

        RatingAnalysis {
            reliability_score,
            pattern,
            insight,
            manipulation_suspected,
        }
    }

    /// Reliability score in [0, 100]. Three additive components (deviation
    /// from the average, extremity of the star value, sample size of the
    /// average) minus a five-star inflation penalty.
    pub fn reliability(
        &self,
        review_rating: Option<u8>,
        rating_avg: Option<f64>,
        rating_count: Option<u32>,
    ) -> f64 {
        let (Some(rating), Some(avg), Some(count)) = (review_rating, rating_avg, rating_count)
        else {
            return NEUTRAL_RELIABILITY_SCORE;
        };

        let deviation = deviation_score(rating, avg);
        let extremity = extremity_score(rating);
        let count_weight = count_weight(count);
        let penalty = five_star_penalty(rating, avg);

        round2((deviation + extremity + count_weight - penalty).max(0.0))
    }

    /// Classify the rating relative to the product average.
    pub fn pattern(&self, review_rating: Option<u8>, rating_avg: Option<f64>) -> RatingPattern {
        let (Some(rating), Some(avg)) = (review_rating, rating_avg) else {
            return RatingPattern::Unknown;
        };

        let diff = f64::from(rating) - avg;
        match rating {
            5 if diff > 1.5 => RatingPattern::SuspiciousHigh,
            5 => RatingPattern::ExtremePositive,
            1 if diff < -1.5 => RatingPattern::SuspiciousLow,
            1 => RatingPattern::ExtremeNegative,
            _ if diff.abs() <= 1.0 => RatingPattern::Normal,
            _ if diff > 1.0 => RatingPattern::SuspiciousHigh,
            _ => RatingPattern::SuspiciousLow,
        }
    }

    /// Heuristic manipulation flags: five-star bombing, extreme deviation,
    /// five stars stacked with enthusiasm/praise detections, or one-star
    /// attack reviews.
    pub fn detect_manipulation(
        &self,
        review_rating: Option<u8>,
        rating_avg: Option<f64>,
        reliability_score: f64,
        detections: &DetectionResult,
    ) -> bool {
        let (Some(rating), Some(avg)) = (review_rating, rating_avg) else {
            return false;
        };

        if rating == 5 && reliability_score < 30.0 {
            return true;
        }
        if (f64::from(rating) - avg).abs() > 2.5 {
            return true;
        }
        if rating == 5
            && detections.count() >= 2
            && (detections.contains(2) || detections.contains(8))
        {
            return true;
        }
        if rating == 1 && reliability_score < 20.0 {
            return true;
        }

        false
    }

    fn insight(
        &self,
        review_rating: Option<u8>,
        rating_avg: Option<f64>,
        rating_count: Option<u32>,
        reliability_score: f64,
    ) -> RatingInsight {
        let (Some(rating), Some(avg)) = (review_rating, rating_avg) else {
            return RatingInsight {
                pattern: RatingPattern::Unknown,
                reliability_level: ReliabilityLevel::Unknown,
                message: "평점 데이터가 부족합니다.".to_string(),
                recommendation: "평점 정보가 없어 신뢰도를 판단하기 어렵습니다.".to_string(),
                rating_diff: None,
                rating_count: None,
            };
        };

        let pattern = self.pattern(Some(rating), Some(avg));

        let (reliability_level, message) = if reliability_score >= 70.0 {
            (
                ReliabilityLevel::High,
                "평점이 제품 평균과 일치하며 신뢰도가 높습니다.",
            )
        } else if reliability_score >= 50.0 {
            (
                ReliabilityLevel::Medium,
                "평점이 제품 평균과 약간 차이가 있습니다.",
            )
        } else if reliability_score >= 30.0 {
            (
                ReliabilityLevel::Low,
                "평점이 제품 평균과 차이가 크며 신뢰도가 낮습니다.",
            )
        } else {
            (
                ReliabilityLevel::VeryLow,
                "평점이 제품 평균과 크게 다르며 광고성 리뷰로 의심됩니다.",
            )
        };

        let recommendation = match pattern {
            RatingPattern::SuspiciousHigh => {
                "평균보다 높은 평점입니다. 광고성 리뷰일 가능성을 고려하세요."
            }
            RatingPattern::SuspiciousLow => {
                "평균보다 낮은 평점입니다. 악의적 리뷰일 가능성을 고려하세요."
            }
            RatingPattern::ExtremePositive => "5점 만점 리뷰입니다. 다른 리뷰와 함께 참고하세요.",
            RatingPattern::ExtremeNegative => {
                "1점 리뷰입니다. 개인적 경험일 수 있으므로 다른 리뷰도 확인하세요."
            }
            RatingPattern::Normal | RatingPattern::Unknown => "신뢰할 수 있는 평점 범위입니다.",
        };

        RatingInsight {
            pattern,
            reliability_level,
            message: message.to_string(),
            recommendation: recommendation.to_string(),
            rating_diff: Some(round2((f64::from(rating) - avg).abs())),
            rating_count,
        }
    }
}

/// Deviation component (0-60): closer to the product average is better.
fn deviation_score(rating: u8, avg: f64) -> f64 {
    let diff = (f64::from(rating) - avg).abs();
    if diff <= 0.5 {
        60.0
    } else if diff <= 1.0 {
        50.0
    } else if diff <= 1.5 {
        35.0
    } else if diff <= 2.0 {
        20.0
    } else if diff <= 2.5 {
        10.0
    } else {
        0.0
    }
}

/// Extremity component (0-20): 1-star and 5-star reviews are inherently
/// less trustworthy than mid-range ones.
fn extremity_score(rating: u8) -> f64 {
    match rating {
        1 | 5 => 5.0,
        _ => 20.0,
    }
}

/// Sample-size component (0-20): a well-populated average is worth
/// deviating against.
fn count_weight(count: u32) -> f64 {
    if count >= 1000 {
        20.0
    } else if count >= 500 {
        18.0
    } else if count >= 100 {
        15.0
    } else if count >= 50 {
        12.0
    } else if count >= 10 {
        8.0
    } else {
        5.0
    }
}

/// Extra penalty for five-star reviews on products averaging under 4.8.
fn five_star_penalty(rating: u8, avg: f64) -> f64 {
    if rating != 5 || avg >= 4.8 {
        return 0.0;
    }
    let diff = 5.0 - avg;
    if diff > 1.0 {
        20.0
    } else if diff > 0.5 {
        15.0
    } else {
        10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Detection, DetectionResult};

    fn stats(avg: f64, count: u32) -> ProductStats {
        ProductStats {
            rating_avg: Some(avg),
            rating_count: Some(count),
        }
    }

    #[test]
    fn test_missing_inputs_yield_neutral() {
        let analyzer = RatingAnalyzer::new();
        let empty = ProductStats::default();
        let analysis = analyzer.analyze(None, &empty, &DetectionResult::new());

        assert_eq!(analysis.reliability_score, 50.0);
        assert_eq!(analysis.pattern, RatingPattern::Unknown);
        assert_eq!(analysis.insight.message, "평점 데이터가 부족합니다.");
        assert!(!analysis.manipulation_suspected);
    }

    #[test]
    fn test_five_star_against_mediocre_average() {
        let analyzer = RatingAnalyzer::new();
        // diff 1.5 → deviation 35, extremity 5, count 18, penalty 20.
        let score = analyzer.reliability(Some(5), Some(3.5), Some(500));
        assert_eq!(score, 38.0);
        assert_eq!(
            analyzer.pattern(Some(5), Some(3.5)),
            RatingPattern::ExtremePositive
        );
    }

    #[test]
    fn test_aligned_mid_rating_scores_high() {
        let analyzer = RatingAnalyzer::new();
        // diff 0.2 → deviation 60, extremity 20, count 20, no penalty.
        let score = analyzer.reliability(Some(4), Some(4.2), Some(1500));
        assert_eq!(score, 100.0);
        assert_eq!(
            analyzer.pattern(Some(4), Some(4.2)),
            RatingPattern::Normal
        );
    }

    #[test]
    fn test_five_star_far_above_average_is_suspicious() {
        let analyzer = RatingAnalyzer::new();
        assert_eq!(
            analyzer.pattern(Some(5), Some(3.2)),
            RatingPattern::SuspiciousHigh
        );
    }

    #[test]
    fn test_one_star_patterns() {
        let analyzer = RatingAnalyzer::new();
        assert_eq!(
            analyzer.pattern(Some(1), Some(2.0)),
            RatingPattern::ExtremeNegative
        );
        assert_eq!(
            analyzer.pattern(Some(1), Some(4.0)),
            RatingPattern::SuspiciousLow
        );
    }

    #[test]
    fn test_manipulation_five_star_with_praise_detections() {
        let analyzer = RatingAnalyzer::new();
        let mut detections = DetectionResult::new();
        detections.insert(Detection::new(2, "감탄사 남발"));
        detections.insert(Detection::new(8, "찬사 위주 구성"));

        // Reliability stays above the bombing threshold, but the
        // five-star-plus-praise combination still flags.
        assert!(analyzer.detect_manipulation(Some(5), Some(4.6), 55.0, &detections));
    }

    #[test]
    fn test_manipulation_extreme_deviation() {
        let analyzer = RatingAnalyzer::new();
        assert!(analyzer.detect_manipulation(Some(1), Some(4.7), 40.0, &DetectionResult::new()));
    }

    #[test]
    fn test_no_manipulation_for_ordinary_review() {
        let analyzer = RatingAnalyzer::new();
        assert!(!analyzer.detect_manipulation(Some(4), Some(4.3), 90.0, &DetectionResult::new()));
    }

    #[test]
    fn test_insight_levels_and_diff() {
        let analyzer = RatingAnalyzer::new();
        let analysis = analyzer.analyze(Some(4), &stats(4.2, 1500), &DetectionResult::new());

        assert_eq!(analysis.insight.reliability_level, ReliabilityLevel::High);
        assert_eq!(analysis.insight.rating_diff, Some(0.2));
        assert_eq!(analysis.insight.rating_count, Some(1500));
        assert_eq!(
            analysis.insight.recommendation,
            "신뢰할 수 있는 평점 범위입니다."
        );
    }

    #[test]
    fn test_insight_very_low_for_five_star_bombing() {
        let analyzer = RatingAnalyzer::new();
        // diff 2.8 → deviation 0, extremity 5, count 8, penalty 20 → 0.
        let analysis = analyzer.analyze(Some(5), &stats(2.2, 30), &DetectionResult::new());

        assert_eq!(analysis.reliability_score, 0.0);
        assert_eq!(analysis.insight.reliability_level, ReliabilityLevel::VeryLow);
        assert_eq!(analysis.pattern, RatingPattern::SuspiciousHigh);
        assert!(analysis.manipulation_suspected);
    }

    #[test]
    fn test_pattern_serializes_snake_case() {
        let json = serde_json::to_string(&RatingPattern::SuspiciousHigh).unwrap();
        assert_eq!(json, "\"suspicious_high\"");
    }
}

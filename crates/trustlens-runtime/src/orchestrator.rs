//! Analysis pipeline orchestration.
//!
//! Runs the full review pipeline: length gate, core validation,
//! advertisement branch, and (for genuine reviews) the summarization call
//! under a timeout. Every failure downstream of the length gate is
//! contained into an error-shaped placeholder so the caller always gets a
//! complete report.

use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use trustlens_core::score::PENALTY_PER_ITEM;
use trustlens_core::types::RawScores;
use trustlens_core::{
    validate_review, Checklist, NutritionRecord, ProductCriteria, ProductStats, Review,
    ScoreAggregator, Validation,
};

use crate::config::RuntimeConfig;
use crate::provider::{
    PharmacistSummarizer, ReviewAnalysis, SummaryError, SummaryProvider, DISCLAIMER,
};

/// Final report for one review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisReport {
    /// The review failed the length gate; nothing was analyzed.
    Rejected { error: String, message: String },

    /// Validation ran to completion; `analysis` is either a real summary
    /// or an error-shaped placeholder.
    Completed {
        validation: Validation,
        analysis: AnalysisOutcome,
    },
}

/// Summarization outcome. Placeholder variants carry an `error` code and
/// keep every display field populated so downstream rendering never
/// branches on absence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub summary: String,
    pub efficacy: String,
    pub side_effects: String,
    pub tip: String,
    pub disclaimer: String,
}

impl AnalysisOutcome {
    /// Successful summarization.
    pub fn from_analysis(analysis: ReviewAnalysis) -> Self {
        Self {
            error: None,
            message: None,
            summary: analysis.summary,
            efficacy: analysis.efficacy,
            side_effects: analysis.side_effects,
            tip: analysis.tip,
            disclaimer: analysis.disclaimer,
        }
    }

    /// Advertisement reviews are never summarized.
    pub fn ad_review() -> Self {
        Self {
            error: Some("AD_REVIEW".to_string()),
            message: Some("광고 리뷰는 분석하지 않습니다.".to_string()),
            summary: "광고 리뷰".to_string(),
            efficacy: "정보 없음".to_string(),
            side_effects: "정보 없음".to_string(),
            tip: "이 리뷰는 광고로 판별되어 분석하지 않습니다.".to_string(),
            disclaimer: DISCLAIMER.to_string(),
        }
    }

    /// Placeholder for input the summarizer itself refused (reachable
    /// when per-product criteria lower the length gate below the
    /// summarizer's own minimum).
    pub fn input_error(message: String) -> Self {
        Self {
            error: Some("INPUT_ERROR".to_string()),
            message: Some(message),
            summary: "분석 불가".to_string(),
            efficacy: "정보 없음".to_string(),
            side_effects: "정보 없음".to_string(),
            tip: "리뷰 내용이 부족하여 분석할 수 없습니다.".to_string(),
            disclaimer: DISCLAIMER.to_string(),
        }
    }

    /// Summarization failure placeholder.
    pub fn failed(message: String) -> Self {
        Self {
            error: Some("ANALYSIS_ERROR".to_string()),
            message: Some(message),
            summary: "분석 실패".to_string(),
            efficacy: "정보 없음".to_string(),
            side_effects: "정보 없음".to_string(),
            tip: "분석 중 오류가 발생했습니다.".to_string(),
            disclaimer: DISCLAIMER.to_string(),
        }
    }
}

/// Builder for [`AnalysisOrchestrator`].
pub struct AnalysisOrchestratorBuilder<P: SummaryProvider> {
    provider: P,
    config: RuntimeConfig,
    criteria: Option<ProductCriteria>,
    record: Option<NutritionRecord>,
    stats: Option<ProductStats>,
}

impl<P: SummaryProvider> AnalysisOrchestratorBuilder<P> {
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn criteria(mut self, criteria: ProductCriteria) -> Self {
        self.criteria = Some(criteria);
        self
    }

    pub fn nutrition_record(mut self, record: NutritionRecord) -> Self {
        self.record = Some(record);
        self
    }

    pub fn product_stats(mut self, stats: ProductStats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn build(self) -> AnalysisOrchestrator<P> {
        let summarizer = PharmacistSummarizer::new(self.provider, self.config.summarizer.clone());
        AnalysisOrchestrator {
            summarizer,
            config: self.config,
            criteria: self.criteria,
            record: self.record,
            stats: self.stats,
        }
    }
}

/// Review analysis pipeline with fixed product context.
pub struct AnalysisOrchestrator<P: SummaryProvider> {
    summarizer: PharmacistSummarizer<P>,
    config: RuntimeConfig,
    criteria: Option<ProductCriteria>,
    record: Option<NutritionRecord>,
    stats: Option<ProductStats>,
}

impl<P: SummaryProvider> AnalysisOrchestrator<P> {
    pub fn builder(provider: P) -> AnalysisOrchestratorBuilder<P> {
        AnalysisOrchestratorBuilder {
            provider,
            config: RuntimeConfig::default(),
            criteria: None,
            record: None,
            stats: None,
        }
    }

    fn min_review_length(&self) -> usize {
        self.criteria
            .as_ref()
            .map(|c| c.min_review_length)
            .unwrap_or(self.config.min_review_length)
    }

    /// Run the full pipeline for one review.
    pub async fn analyze(&self, review: &Review) -> AnalysisReport {
        let min_length = self.min_review_length();
        if review.body.trim().chars().count() < min_length {
            return AnalysisReport::Rejected {
                error: "REVIEW_TOO_SHORT".to_string(),
                message: format!("리뷰가 너무 짧습니다 (최소 {min_length}자 이상)"),
            };
        }

        let validation = match validate_review(
            review,
            self.criteria.as_ref(),
            self.record.as_ref(),
            self.stats.as_ref(),
        ) {
            Ok(validation) => validation,
            Err(err) => {
                tracing::warn!(%err, "score aggregation failed, using neutral-base fallback");
                self.fallback_validation(review)
            }
        };

        let analysis = if validation.is_ad {
            AnalysisOutcome::ad_review()
        } else {
            self.summarize_contained(&review.body).await
        };

        AnalysisReport::Completed {
            validation,
            analysis,
        }
    }

    /// Summarize, containing every failure into a placeholder outcome.
    async fn summarize_contained(&self, body: &str) -> AnalysisOutcome {
        let call = self.summarizer.summarize(body);
        match timeout(self.summarizer.config().timeout, call).await {
            Ok(Ok(analysis)) => AnalysisOutcome::from_analysis(analysis),
            Ok(Err(err @ SummaryError::InputTooShort)) => {
                AnalysisOutcome::input_error(err.to_string())
            }
            Ok(Err(err)) => {
                tracing::warn!(%err, "summarization failed");
                AnalysisOutcome::failed(err.to_string())
            }
            Err(_) => {
                tracing::warn!(
                    timeout = ?self.summarizer.config().timeout,
                    "summarization timed out"
                );
                AnalysisOutcome::failed(SummaryError::Timeout.to_string())
            }
        }
    }

    /// Checklist-only validation with a neutral base score, used when the
    /// caller's signals are unusable. The checklist verdict still stands;
    /// only the score side degrades.
    fn fallback_validation(&self, review: &Review) -> Validation {
        let checklist = match &self.criteria {
            Some(criteria) => Checklist::with_criteria(criteria.clone()),
            None => Checklist::new(),
        };
        let detections = checklist.run(&review.body);

        let base_score = 50.0;
        let penalty = detections.count() as f64 * PENALTY_PER_ITEM;
        let final_score = (base_score - penalty).max(0.0);
        let aggregator = ScoreAggregator::new();

        Validation {
            trust_score: final_score,
            is_ad: aggregator.is_ad(final_score, detections.count()),
            reasons: detections.reasons(),
            base_score,
            penalty,
            detected_count: detections.count(),
            raw_scores: RawScores {
                length: 50.0,
                repurchase: 50.0,
                monthly_use: 50.0,
                photo: 0.0,
                consistency: 50.0,
                nutrition: None,
            },
            nutrition_score: None,
            nutrition_validation: None,
            rating_analysis: None,
        }
    }
}

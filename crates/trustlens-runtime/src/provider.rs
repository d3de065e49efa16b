//! Summarization provider seam and the pharmacist summarizer built on it.
//!
//! The summarizer asks one outbound language-model call to condense a
//! review into four fields (summary, efficacy, side effects, pharmacist
//! tip) under a conservative clinical-pharmacist persona. The provider
//! trait is the only async boundary; tests plug in a canned provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SummarizerConfig;

/// Disclaimer attached to every analysis, error placeholders included.
pub const DISCLAIMER: &str = "본 분석은 의학적 진단이 아닌 실사용자 체감 정보를 기반으로 합니다.";

/// Minimum trimmed length the summarizer accepts.
pub const MIN_SUMMARIZABLE_CHARS: usize = 10;

/// Persona and output contract for the summarization call. The strict
/// constraints exist because early prompts hallucinated ingredients and
/// efficacy not present in the review.
pub const SYSTEM_PROMPT: &str = "당신은 15년 경력의 임상 약사입니다.

**역할 및 태도:**
- 전문적이고 객관적인 관점에서 리뷰를 분석합니다
- 보수적인 태도로 과장된 표현을 경계합니다
- 일반 사용자도 이해할 수 있도록 명확하게 설명합니다

**엄격한 제약 조건:**
1. 리뷰 원문에 명시된 내용만 분석하세요
2. 리뷰에 없는 성분이나 효능을 추측하거나 추가하지 마세요
3. 모호하거나 불확실한 정보는 '판단 불가'로 처리하세요
4. 의학적 진단이나 처방을 하지 마세요

**필수 부인 공지:**
모든 분석 결과에 다음 문구를 포함해야 합니다:
\"본 분석은 의학적 진단이 아닌 실사용자 체감 정보를 기반으로 합니다.\"

**출력 형식:**
반드시 다음 JSON 형식으로 응답하세요:
{
  \"summary\": \"리뷰 한 줄 요약 (사용자 체감 중심, 30자 이내)\",
  \"efficacy\": \"효능 관련 내용 (원문 근거만)\",
  \"side_effects\": \"부작용 관련 내용\",
  \"tip\": \"약사의 핵심 조언 (50자 이내)\"
}

**주의사항:**
- summary, efficacy, side_effects, tip은 모두 문자열 타입입니다
- 리뷰에 해당 정보가 없으면 \"정보 없음\"으로 반환
- tip은 약사 관점에서 실질적이고 유용한 조언 제공
";

/// Build the per-review user prompt.
pub fn user_prompt(review_text: &str) -> String {
    format!(
        "다음 건강기능식품 리뷰를 분석해주세요:

---
{review_text}
---

위 리뷰를 15년 경력 임상 약사 관점에서 분석하고, JSON 형식으로 출력해주세요.

**분석 시 주의사항:**
1. 리뷰 원문에 없는 내용은 절대 추가하지 마세요
2. 사용자가 느낀 주관적 체감을 객관적으로 정리하세요
3. 의학적 효능이 아닌 '사용자 체감 정보'임을 명확히 하세요
4. 부작용이 언급되지 않았으면 side_effects를 \"정보 없음\"으로 반환하세요

본 분석은 의학적 진단이 아닌 실사용자 체감 정보를 기반으로 합니다.
"
    )
}

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("review text too short for summarization (minimum {MIN_SUMMARIZABLE_CHARS} chars)")]
    InputTooShort,

    #[error("provider call failed: {0}")]
    Provider(String),

    #[error("provider response is not valid JSON: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("provider response missing required field {0:?}")]
    MissingField(&'static str),

    #[error("provider call timed out")]
    Timeout,
}

/// Parsed summarization result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewAnalysis {
    pub summary: String,
    pub efficacy: String,
    pub side_effects: String,
    pub tip: String,
    pub disclaimer: String,
}

/// One outbound completion call. Implementations wrap a concrete model
/// API; tests use a canned implementation.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Return the raw model response text for one system/user prompt pair.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        config: &SummarizerConfig,
    ) -> Result<String, SummaryError>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}

/// Clinical-pharmacist review summarizer.
pub struct PharmacistSummarizer<P: SummaryProvider> {
    provider: P,
    config: SummarizerConfig,
}

impl<P: SummaryProvider> PharmacistSummarizer<P> {
    pub fn new(provider: P, config: SummarizerConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// Summarize one review. Missing required fields in the response are
    /// a hard error for the call; the orchestrator contains them.
    pub async fn summarize(&self, review_text: &str) -> Result<ReviewAnalysis, SummaryError> {
        if review_text.trim().chars().count() < MIN_SUMMARIZABLE_CHARS {
            return Err(SummaryError::InputTooShort);
        }

        let raw = self
            .provider
            .complete(SYSTEM_PROMPT, &user_prompt(review_text), &self.config)
            .await?;

        tracing::debug!(provider = self.provider.name(), bytes = raw.len(), "summarizer response");
        parse_analysis(&raw)
    }
}

/// Parse the provider's JSON response, enforcing the four required
/// string fields and stamping the disclaimer.
fn parse_analysis(raw: &str) -> Result<ReviewAnalysis, SummaryError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;

    let field = |name: &'static str| -> Result<String, SummaryError> {
        value
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(SummaryError::MissingField(name))
    };

    Ok(ReviewAnalysis {
        summary: field("summary")?,
        efficacy: field("efficacy")?,
        side_effects: field("side_effects")?,
        tip: field("tip")?,
        disclaimer: DISCLAIMER.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedProvider {
        response: String,
    }

    #[async_trait]
    impl SummaryProvider for CannedProvider {
        async fn complete(
            &self,
            _system: &str,
            _user: &str,
            _config: &SummarizerConfig,
        ) -> Result<String, SummaryError> {
            Ok(self.response.clone())
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    fn summarizer(response: &str) -> PharmacistSummarizer<CannedProvider> {
        PharmacistSummarizer::new(
            CannedProvider {
                response: response.to_string(),
            },
            SummarizerConfig::default(),
        )
    }

    const GOOD_RESPONSE: &str = r#"{
        "summary": "3개월 복용 후 체감 효과는 불확실",
        "efficacy": "판단 불가",
        "side_effects": "정보 없음",
        "tip": "가격 대비 만족도를 기준으로 재구매를 결정하세요."
    }"#;

    #[tokio::test]
    async fn test_summarize_parses_required_fields() {
        let analysis = summarizer(GOOD_RESPONSE)
            .summarize("저는 3개월 먹었는데 효과를 잘 모르겠어요.")
            .await
            .unwrap();

        assert_eq!(analysis.side_effects, "정보 없음");
        assert_eq!(analysis.disclaimer, DISCLAIMER);
    }

    #[tokio::test]
    async fn test_short_input_rejected_before_provider_call() {
        let err = summarizer(GOOD_RESPONSE).summarize("짧은 리뷰").await.unwrap_err();
        assert!(matches!(err, SummaryError::InputTooShort));
    }

    #[tokio::test]
    async fn test_missing_field_is_hard_error() {
        let err = summarizer(r#"{"summary": "요약", "efficacy": "없음", "tip": "조언"}"#)
            .summarize("저는 3개월 먹었는데 효과를 잘 모르겠어요.")
            .await
            .unwrap_err();
        assert!(matches!(err, SummaryError::MissingField("side_effects")));
    }

    #[tokio::test]
    async fn test_non_json_response_is_malformed() {
        let err = summarizer("요약해 드릴게요: 좋은 제품입니다")
            .summarize("저는 3개월 먹었는데 효과를 잘 모르겠어요.")
            .await
            .unwrap_err();
        assert!(matches!(err, SummaryError::MalformedResponse(_)));
    }

    #[test]
    fn test_user_prompt_embeds_review() {
        let prompt = user_prompt("직접 먹어본 후기입니다");
        assert!(prompt.contains("직접 먹어본 후기입니다"));
        assert!(prompt.contains(DISCLAIMER));
    }
}

//! Ingredient extraction and nutrition-record cross-validation.
//!
//! A review that name-drops ingredients the product does not contain is a
//! strong advertisement signal, so when a [`NutritionRecord`] is on hand the
//! checklist result gets three extra cross-checks (items 5, 9 and 10) plus a
//! standalone consistency sub-score. Records are external, untrusted data:
//! every entry point here degrades to a neutral outcome when the record is
//! missing or unhelpful, and none of them can fail.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checklist::{FALSE_NUTRITION_CLAIM_ID, FALSE_NUTRITION_CLAIM_NAME};
use crate::types::{Detection, DetectionResult};

/// Neutral sub-score used whenever the record cannot support a judgement.
pub const NEUTRAL_CONSISTENCY_SCORE: f64 = 50.0;

/// Effect-onset period (days) at or above which an immediate-effect claim
/// in a review is implausible.
const IMPLAUSIBLE_IMMEDIATE_EFFECT_DAYS: u32 = 14;

lazy_static! {
    /// Known supplement ingredient spellings, Korean and English. Matching
    /// is intentionally vocabulary-bound: free-form noun extraction pulled
    /// in far too much garbage from real review text.
    static ref INGREDIENT_PATTERNS: Vec<Regex> = compile(&[
        // vitamins
        r"비타민\s*[A-Z]?\d*",
        r"비타민\s*[A-Z]",
        r"Vitamin\s*[A-Z]?\d*",
        r"Vitamin\s*[A-Z]",
        // carotenoids
        r"루테인",
        r"제아잔틴",
        r"리코펜",
        r"베타카로틴",
        r"Lutein",
        r"Zeaxanthin",
        r"Lycopene",
        r"Beta[-\s]?carotene",
        // omega fatty acids
        r"오메가\s*3",
        r"오메가\s*6",
        r"오메가\s*9",
        r"Omega\s*3",
        r"Omega\s*6",
        r"Omega\s*9",
        r"DHA",
        r"EPA",
        // probiotics
        r"프로바이오틱스",
        r"Probiotic",
        r"락토바실러스",
        r"비피도박테리움",
        r"Lactobacillus",
        r"Bifidobacterium",
        // minerals
        r"칼슘",
        r"마그네슘",
        r"아연",
        r"셀레늄",
        r"Calcium",
        r"Magnesium",
        r"Zinc",
        r"Selenium",
        // other
        r"코엔자임\s*Q10",
        r"CoQ10",
        r"글루코사민",
        r"콘드로이틴",
        r"Glucosamine",
        r"Chondroitin",
    ]);

    /// Overstated efficacy language (100% cures, miracle effects).
    static ref EXAGGERATED_EFFICACY_PATTERNS: Vec<Regex> = compile(&[
        r"100%.*(회복|치료|완치)",
        r"(완벽|완전).*(치료|회복|개선)",
        r"(기적|놀라운|엄청난).*(효과|변화)",
    ]);

    /// Claims of effect within a day or a week of first use.
    static ref IMMEDIATE_EFFECT_PATTERNS: Vec<Regex> = compile(&[
        r"(즉시|바로|하루|이틀|일주일).{0,12}(효과|개선|변화|달라)",
    ]);
}

fn compile(sources: &[&str]) -> Vec<Regex> {
    sources
        .iter()
        .map(|src| {
            RegexBuilder::new(src)
                .case_insensitive(true)
                .build()
                .unwrap_or_else(|err| panic!("invalid ingredient pattern {src:?}: {err}"))
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("nutrition record has no ingredients for product {0:?}")]
    EmptyIngredients(String),

    #[error("nutrition record file not readable: {0}")]
    Io(#[from] std::io::Error),

    #[error("nutrition record YAML malformed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("nutrition record JSON malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// One ingredient of a product, as recorded in the official database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientEntry {
    pub name: String,

    /// Alternate spellings (brand names, translations).
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Efficacy claims backed by the regulator's registration.
    #[serde(default)]
    pub official_efficacy: Vec<String>,

    /// Days of continuous use before effects typically appear.
    #[serde(default)]
    pub typical_effect_period_days: Option<u32>,
}

/// Per-product ingredient record, keyed by an opaque product id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub product_id: String,
    pub ingredients: Vec<IngredientEntry>,
}

impl NutritionRecord {
    pub fn from_yaml(raw: &str) -> Result<Self, RecordError> {
        let record: Self = serde_yaml::from_str(raw)?;
        record.validate()?;
        Ok(record)
    }

    pub fn from_yaml_file(path: &std::path::Path) -> Result<Self, RecordError> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, RecordError> {
        let record: Self = serde_json::from_str(raw)?;
        record.validate()?;
        Ok(record)
    }

    fn validate(&self) -> Result<(), RecordError> {
        if self.ingredients.is_empty() {
            return Err(RecordError::EmptyIngredients(self.product_id.clone()));
        }
        Ok(())
    }

    /// Whether a mentioned name matches any recorded ingredient or alias.
    /// Containment runs both ways so "비타민" matches "비타민C" and
    /// "비타민 C 1000mg" matches "비타민C".
    pub fn contains_ingredient(&self, mentioned: &str) -> bool {
        let mentioned = normalize_ingredient_name(mentioned);
        if mentioned.is_empty() {
            return false;
        }

        self.ingredients.iter().any(|entry| {
            let official = normalize_ingredient_name(&entry.name);
            if !official.is_empty()
                && (mentioned.contains(&official) || official.contains(&mentioned))
            {
                return true;
            }

            entry.aliases.iter().any(|alias| {
                let alias = normalize_ingredient_name(alias);
                !alias.is_empty() && (mentioned.contains(&alias) || alias.contains(&mentioned))
            })
        })
    }

    /// Registered efficacy claims for one ingredient, by exact normalized
    /// name match.
    pub fn official_efficacy(&self, ingredient: &str) -> &[String] {
        let wanted = normalize_ingredient_name(ingredient);
        self.ingredients
            .iter()
            .find(|entry| normalize_ingredient_name(&entry.name) == wanted)
            .map(|entry| entry.official_efficacy.as_slice())
            .unwrap_or(&[])
    }

    /// Typical effect-onset period for one ingredient, if recorded.
    pub fn typical_effect_period(&self, ingredient: &str) -> Option<u32> {
        let wanted = normalize_ingredient_name(ingredient);
        self.ingredients
            .iter()
            .find(|entry| normalize_ingredient_name(&entry.name) == wanted)
            .and_then(|entry| entry.typical_effect_period_days)
    }
}

/// Outcome of the ingredient-claim validation, attached to the final
/// report so callers can see what was and was not corroborated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionValidation {
    pub has_invalid_claims: bool,
    pub mentioned_ingredients: Vec<String>,
    pub valid_ingredients: Vec<String>,
    pub invalid_ingredients: Vec<String>,
    pub invalid_efficacy_claims: Vec<String>,
    pub message: String,
}

impl NutritionValidation {
    fn empty(message: &str) -> Self {
        Self {
            has_invalid_claims: false,
            mentioned_ingredients: Vec::new(),
            valid_ingredients: Vec::new(),
            invalid_ingredients: Vec::new(),
            invalid_efficacy_claims: Vec::new(),
            message: message.to_string(),
        }
    }
}

/// Lowercase, strip whitespace, strip hyphens/underscores.
pub fn normalize_ingredient_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .collect()
}

/// Pull candidate ingredient names out of review text, deduplicated by
/// normalized form, keeping the first spelling seen.
pub fn extract_ingredients(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    let mut extracted = Vec::new();

    for pattern in INGREDIENT_PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            let spelling = m.as_str().trim();
            let normalized = normalize_ingredient_name(spelling);
            if !normalized.is_empty() && !seen.contains(&normalized) {
                seen.push(normalized);
                extracted.push(spelling.to_string());
            }
        }
    }

    extracted
}

/// Check every mentioned ingredient against the record. Missing or
/// unusable inputs yield a safe "nothing invalid" result.
pub fn validate_claims(text: &str, record: Option<&NutritionRecord>) -> NutritionValidation {
    if text.trim().chars().count() < 3 {
        return NutritionValidation::empty("리뷰가 너무 짧음");
    }
    let Some(record) = record else {
        return NutritionValidation::empty("영양성분 정보 없음");
    };

    let mentioned = extract_ingredients(text);
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for name in &mentioned {
        if record.contains_ingredient(name) {
            valid.push(name.clone());
        } else {
            invalid.push(name.clone());
        }
    }

    NutritionValidation {
        has_invalid_claims: !invalid.is_empty(),
        mentioned_ingredients: mentioned,
        valid_ingredients: valid,
        invalid_ingredients: invalid,
        invalid_efficacy_claims: Vec::new(),
        message: "검증 완료".to_string(),
    }
}

/// Nutrition-consistency sub-score in [0, 100].
///
/// Accuracy is the share of mentioned ingredients the record corroborates;
/// each uncorroborated mention costs 20 points, capped at 50. A review
/// that mentions no ingredients is neither corroborated nor contradicted,
/// so it scores neutral.
pub fn consistency_score(text: &str, record: Option<&NutritionRecord>) -> f64 {
    if text.trim().chars().count() < 3 {
        return NEUTRAL_CONSISTENCY_SCORE;
    }
    let Some(record) = record else {
        return NEUTRAL_CONSISTENCY_SCORE;
    };

    let validation = validate_claims(text, Some(record));
    let total = validation.mentioned_ingredients.len();
    if total == 0 {
        return NEUTRAL_CONSISTENCY_SCORE;
    }

    let accuracy = validation.valid_ingredients.len() as f64 / total as f64;
    let penalty = (validation.invalid_ingredients.len() as f64 * 20.0).min(50.0);
    (accuracy * 100.0 - penalty).clamp(0.0, 100.0)
}

/// Record-backed escalations applied on top of the base checklist result.
///
/// Three cross-checks run: fabricated ingredient mentions escalate item 5
/// and raise the reserved item 14, unsupported medical claims escalate
/// item 9, and implausibly fast effect claims escalate item 10.
pub fn apply_cross_checks(text: &str, record: &NutritionRecord, result: &mut DetectionResult) {
    let validation = validate_claims(text, Some(record));

    if validation.has_invalid_claims {
        result.escalate(5, "원료 특징 나열", "허위 성분 주장 포함", "허위 성분 주장");
        // Item 14 stands on its own name, no annotation.
        result.insert(Detection::new(
            FALSE_NUTRITION_CLAIM_ID,
            FALSE_NUTRITION_CLAIM_NAME,
        ));
    }

    if has_unsupported_medical_claim(text, record) {
        result.escalate(9, "전문 용어 오남용", "허위 의학적 주장 포함", "허위 의학적 주장");
    }

    if has_implausible_effect_timeline(text, record, &validation.valid_ingredients) {
        result.escalate(10, "비현실적 효과 강조", "효과 발현 시기 과장", "효과 발현 시기 과장");
    }
}

/// Whether the text makes an exaggerated medical claim the record's
/// official efficacy data contradicts.
///
/// Currently always `false`: an ingredient with no registered efficacy
/// proves nothing about the claim, and escalating on missing data flags
/// honest reviews. The exaggerated-language scan stays so the policy
/// change is a one-line flip once efficacy coverage is good enough.
fn has_unsupported_medical_claim(text: &str, record: &NutritionRecord) -> bool {
    let has_exaggerated = EXAGGERATED_EFFICACY_PATTERNS
        .iter()
        .any(|p| p.is_match(text));
    if !has_exaggerated {
        return false;
    }

    let uncorroborated = extract_ingredients(text)
        .iter()
        .filter(|name| record.official_efficacy(name).is_empty())
        .count();
    tracing::debug!(
        uncorroborated,
        "exaggerated efficacy language present, escalation disabled without efficacy coverage"
    );
    false
}

/// Whether the text claims near-immediate effects from an ingredient whose
/// recorded onset period makes that implausible.
fn has_implausible_effect_timeline(
    text: &str,
    record: &NutritionRecord,
    valid_ingredients: &[String],
) -> bool {
    let claims_immediate = IMMEDIATE_EFFECT_PATTERNS.iter().any(|p| p.is_match(text));
    if !claims_immediate {
        return false;
    }

    valid_ingredients.iter().any(|name| {
        record
            .typical_effect_period(name)
            .is_some_and(|days| days >= IMPLAUSIBLE_IMMEDIATE_EFFECT_DAYS)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Detection;

    const LUTEIN_RECORD: &str = "\
product_id: \"P-1001\"
ingredients:
  - name: 루테인
    aliases: [Lutein]
    official_efficacy: [\"눈 건강에 도움을 줄 수 있음\"]
    typical_effect_period_days: 30
  - name: 비타민C
    aliases: [\"Vitamin C\", \"아스코르브산\"]
";

    fn lutein_record() -> NutritionRecord {
        NutritionRecord::from_yaml(LUTEIN_RECORD).unwrap()
    }

    #[test]
    fn test_extract_dedupes_by_normalized_form() {
        // Vocabulary order, not text order: vitamin patterns come first,
        // and the repeated 루테인/LUTEIN spellings collapse to one entry
        // each by normalized form.
        let extracted = extract_ingredients("루테인 좋아요. 루테인, LUTEIN, 비타민 C까지!");
        assert_eq!(extracted, vec!["비타민 C", "루테인", "LUTEIN"]);
    }

    #[test]
    fn test_normalize_strips_space_and_hyphen() {
        assert_eq!(normalize_ingredient_name(" Beta-carotene "), "betacarotene");
        assert_eq!(normalize_ingredient_name("비타민 C"), "비타민c");
    }

    #[test]
    fn test_containment_matches_both_directions() {
        let record = lutein_record();
        assert!(record.contains_ingredient("루테인"));
        assert!(record.contains_ingredient("lutein"));
        assert!(record.contains_ingredient("비타민 C 1000mg"));
        assert!(!record.contains_ingredient("오메가3"));
    }

    #[test]
    fn test_validate_claims_flags_unlisted_ingredient() {
        let record = lutein_record();
        let validation = validate_claims("루테인과 오메가3가 풍부해서 샀어요", Some(&record));

        assert!(validation.has_invalid_claims);
        assert_eq!(validation.valid_ingredients, vec!["루테인"]);
        assert_eq!(validation.invalid_ingredients, vec!["오메가3"]);
        assert_eq!(validation.message, "검증 완료");
    }

    #[test]
    fn test_validate_claims_without_record_is_safe() {
        let validation = validate_claims("루테인이 들어있다고 해서 샀어요", None);
        assert!(!validation.has_invalid_claims);
        assert!(validation.mentioned_ingredients.is_empty());
    }

    #[test]
    fn test_consistency_score_neutral_without_mentions() {
        let record = lutein_record();
        assert_eq!(consistency_score("맛있고 목넘김이 좋아요", Some(&record)), 50.0);
        assert_eq!(consistency_score("루테인 덕분에 좋아요", None), 50.0);
        assert_eq!(consistency_score("짧", Some(&record)), 50.0);
    }

    #[test]
    fn test_consistency_score_penalizes_invalid_mentions() {
        let record = lutein_record();

        // All corroborated: full marks.
        assert_eq!(consistency_score("루테인과 비타민C 조합이 좋네요", Some(&record)), 100.0);

        // One of two corroborated: 50 accuracy minus 20 penalty.
        let mixed = consistency_score("루테인과 오메가3 때문에 구매", Some(&record));
        assert!((mixed - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_cross_check_escalates_item_5_and_raises_14() {
        let record = lutein_record();
        let mut result = DetectionResult::new();
        result.insert(Detection::new(5, "원료 특징 나열"));

        apply_cross_checks("오메가3 함유라고 해서 샀는데 좋아요", &record, &mut result);

        assert_eq!(
            result.get(5).unwrap().display_name(),
            "원료 특징 나열 (허위 성분 주장 포함)"
        );
        assert!(result.contains(14));
    }

    #[test]
    fn test_item_14_reason_is_the_plain_name() {
        let record = lutein_record();
        let mut result = DetectionResult::new();

        apply_cross_checks("오메가3 함유라고 해서 샀는데 좋아요", &record, &mut result);

        let reason = result
            .reasons()
            .into_iter()
            .find(|r| r.starts_with("14."))
            .unwrap();
        assert_eq!(reason, "14. 허위 영양성분 주장");
    }

    #[test]
    fn test_cross_check_inserts_item_5_when_not_fired() {
        let record = lutein_record();
        let mut result = DetectionResult::new();

        apply_cross_checks("오메가3 들어있대요", &record, &mut result);

        assert_eq!(
            result.get(5).unwrap().display_name(),
            "원료 특징 나열 (허위 성분 주장)"
        );
    }

    #[test]
    fn test_medical_claim_check_stays_conservative() {
        let record = lutein_record();
        let mut result = DetectionResult::new();

        // Exaggerated language alone must not escalate item 9.
        apply_cross_checks("루테인으로 기적 같은 효과를 봤어요", &record, &mut result);
        assert!(!result.contains(9));
    }

    #[test]
    fn test_effect_timeline_escalates_item_10() {
        let record = lutein_record();
        let mut result = DetectionResult::new();

        // Lutein's recorded onset is 30 days; a next-day effect claim is
        // implausible.
        apply_cross_checks("루테인 먹고 하루 만에 효과를 봤어요", &record, &mut result);
        assert_eq!(
            result.get(10).unwrap().display_name(),
            "비현실적 효과 강조 (효과 발현 시기 과장)"
        );
    }

    #[test]
    fn test_effect_timeline_needs_slow_ingredient() {
        let record = lutein_record();
        let mut result = DetectionResult::new();

        // Vitamin C has no recorded onset period, so the claim stands.
        apply_cross_checks("비타민C 먹고 바로 효과 봤어요", &record, &mut result);
        assert!(!result.contains(10));
    }

    #[test]
    fn test_record_without_ingredients_rejected() {
        let err = NutritionRecord::from_yaml("product_id: \"P-9\"\ningredients: []\n").unwrap_err();
        assert!(matches!(err, RecordError::EmptyIngredients(_)));
    }
}

//! Static pattern table for the 13-item ad checklist.
//!
//! The table is process-wide constant state: initialized once, read-only
//! thereafter, safe for unlimited concurrent readers. Items are evaluated
//! in ascending id order; three items carry dynamic predicates instead of
//! regex patterns because they need tokenization or access to earlier
//! results.
//!
//! | Id | Item | Matcher |
//! |----|------|---------|
//! | 1 | 대가성 문구 존재 | compensation/sponsorship phrases |
//! | 2 | 감탄사 남발 | exclamation runs, stacked intensifiers |
//! | 3 | 정돈된 문단 구조 | numbered/bulleted copy structure |
//! | 4 | 개인 경험 부재 | predicate: no experiential markers |
//! | 5 | 원료 특징 나열 | ingredient/dosage enumeration |
//! | 6 | 키워드 반복 | predicate: top-token frequency |
//! | 7 | 단점 회피 | predicate: no drawbacks, needs 2 or 8 |
//! | 8 | 찬사 위주 구성 | stacked praise vocabulary |
//! | 9 | 전문 용어 오남용 | stacked clinical jargon |
//! | 10 | 비현실적 효과 강조 | guaranteed/immediate effect claims |
//! | 11 | 타사 제품 비교 | competitor comparison phrasing |
//! | 12 | 홍보성 블로그 문체 | promotional blog register |
//! | 13 | 이모티콘 과다 사용 | emoji runs |

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

/// Reserved id for the false-nutrition-claim escalation added by the
/// cross-validator. Never part of the base table.
pub const FALSE_NUTRITION_CLAIM_ID: u8 = 14;

/// Display name for the reserved item 14.
pub const FALSE_NUTRITION_CLAIM_NAME: &str = "허위 영양성분 주장";

/// How a checklist item is evaluated.
pub enum Matcher {
    /// First matching regex wins.
    Patterns(&'static [Regex]),

    /// Evaluated by the engine with tokenizer/criteria/accumulator access.
    Dynamic(DynamicCheck),
}

/// The three predicate-based items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicCheck {
    /// Item 4: fires when no experiential marker appears anywhere.
    PersonalExperienceAbsent,

    /// Item 6: fires when the most frequent token meets the threshold.
    KeywordRepetition,

    /// Item 7: fires only alongside item 2 or 8.
    NegativeOpinionAbsent,
}

/// One row of the checklist table.
pub struct ChecklistItem {
    pub id: u8,
    pub name: &'static str,
    pub matcher: Matcher,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .multi_line(true)
                .build()
                .unwrap_or_else(|e| panic!("invalid checklist pattern {p:?}: {e}"))
        })
        .collect()
}

lazy_static! {
    // Item 1: compensation disclosure language
    static ref COMPENSATION_PATTERNS: Vec<Regex> = compile(&[
        r"무상.*제공",
        r"무료.*제공",
        r"받았어요",
        r"받아서",
        r"선물.*받",
        r"협찬",
        r"제공.*받",
    ]);

    // Item 2: exclamation runs and stacked intensifiers
    static ref EXCLAMATION_PATTERNS: Vec<Regex> = compile(&[
        r"[!！]{3,}",
        r"[~～]{3,}",
        r"[♡♥❤️]{3,}",
        r"(완전|진짜|정말|너무).{0,10}(완전|진짜|정말|너무)",
    ]);

    // Item 3: structured copy markers
    static ref STRUCTURED_COPY_PATTERNS: Vec<Regex> = compile(&[
        r"^[0-9]\.",
        r"^-\s",
        r"^•\s",
        r"(\n[0-9]\.|◾|▪️|✓).{10,}",
    ]);

    // Item 5: ingredient/dosage enumeration
    static ref INGREDIENT_LISTING_PATTERNS: Vec<Regex> = compile(&[
        r"(함유|성분|원료|추출물).{5,30}(함유|성분|원료|추출물)",
        r"(mg|g|mcg|IU).{0,20}(mg|g|mcg|IU)",
    ]);

    // Item 8: stacked praise vocabulary
    static ref PRAISE_PATTERNS: Vec<Regex> = compile(&[
        r"(최고|강추|추천|만족|좋아요|대박|훌륭).{0,20}(최고|강추|추천|만족|좋아요|대박|훌륭)",
    ]);

    // Item 9: stacked clinical jargon
    static ref JARGON_PATTERNS: Vec<Regex> = compile(&[
        r"(항산화|면역력|대사|흡수율|생체이용률|임상).{5,40}(항산화|면역력|대사|흡수율|생체이용률|임상)",
    ]);

    // Item 10: guaranteed/immediate effect claims
    static ref UNREALISTIC_EFFECT_PATTERNS: Vec<Regex> = compile(&[
        r"(100%|완벽|즉시|바로|단|하루|일주일).{0,20}(효과|개선|변화|달라)",
        r"(기적|놀라운|엄청난|극적인).{0,10}(효과|변화)",
    ]);

    // Item 11: competitor comparison phrasing
    static ref COMPARISON_PATTERNS: Vec<Regex> = compile(&[
        r"(다른|타사|기존|일반).{0,20}제품.{0,20}(비해|달리|차별|보다.{0,10}(좋|나은|우수|뛰어))",
        r"VS\s|vs\s|제품\s+(비교|대결)",
    ]);

    // Item 12: promotional blog register
    static ref BLOG_REGISTER_PATTERNS: Vec<Regex> = compile(&[
        r"~했답니다",
        r"~해드립니다",
        r"~하세요",
        r"~추천드려요",
        r"후기.*남겨요",
        r"리뷰.*남겨요",
    ]);

    // Item 13: emoji runs
    static ref EMOJI_PATTERNS: Vec<Regex> = compile(&[
        r"[😀😁😂🤣😃😄😅😆😉😊😋😎😍😘🥰😗😙😚]{5,}",
    ]);

    /// The 13-item table, ascending by id. The engine evaluates every
    /// other item first and decides item 7 last, because item 7 needs
    /// read access to the resolved results for items 2 and 8.
    pub static ref CHECKLIST: Vec<ChecklistItem> = vec![
        ChecklistItem {
            id: 1,
            name: "대가성 문구 존재",
            matcher: Matcher::Patterns(&COMPENSATION_PATTERNS),
        },
        ChecklistItem {
            id: 2,
            name: "감탄사 남발",
            matcher: Matcher::Patterns(&EXCLAMATION_PATTERNS),
        },
        ChecklistItem {
            id: 3,
            name: "정돈된 문단 구조",
            matcher: Matcher::Patterns(&STRUCTURED_COPY_PATTERNS),
        },
        ChecklistItem {
            id: 4,
            name: "개인 경험 부재",
            matcher: Matcher::Dynamic(DynamicCheck::PersonalExperienceAbsent),
        },
        ChecklistItem {
            id: 5,
            name: "원료 특징 나열",
            matcher: Matcher::Patterns(&INGREDIENT_LISTING_PATTERNS),
        },
        ChecklistItem {
            id: 6,
            name: "키워드 반복",
            matcher: Matcher::Dynamic(DynamicCheck::KeywordRepetition),
        },
        ChecklistItem {
            id: 7,
            name: "단점 회피",
            matcher: Matcher::Dynamic(DynamicCheck::NegativeOpinionAbsent),
        },
        ChecklistItem {
            id: 8,
            name: "찬사 위주 구성",
            matcher: Matcher::Patterns(&PRAISE_PATTERNS),
        },
        ChecklistItem {
            id: 9,
            name: "전문 용어 오남용",
            matcher: Matcher::Patterns(&JARGON_PATTERNS),
        },
        ChecklistItem {
            id: 10,
            name: "비현실적 효과 강조",
            matcher: Matcher::Patterns(&UNREALISTIC_EFFECT_PATTERNS),
        },
        ChecklistItem {
            id: 11,
            name: "타사 제품 비교",
            matcher: Matcher::Patterns(&COMPARISON_PATTERNS),
        },
        ChecklistItem {
            id: 12,
            name: "홍보성 블로그 문체",
            matcher: Matcher::Patterns(&BLOG_REGISTER_PATTERNS),
        },
        ChecklistItem {
            id: 13,
            name: "이모티콘 과다 사용",
            matcher: Matcher::Patterns(&EMOJI_PATTERNS),
        },
    ];

    /// Experiential markers for item 4. Deliberately generous: narrow
    /// first-person-only checks flagged the large majority of genuine
    /// reviews, so the marker set covers purchase, usage, felt-effect,
    /// repurchase, and family-reference language too.
    pub static ref PERSONAL_EXPERIENCE_MARKERS: Vec<Regex> = compile(&[
        // First-person pronouns
        r"나는",
        r"저는",
        r"제가",
        r"내가",
        r"우리",
        // Direct experience
        r"직접",
        r"실제로",
        r"먹어보니",
        r"사용해보니",
        // Purchase / usage
        r"구매",
        r"샀",
        r"사서",
        r"먹",
        r"사용",
        r"복용",
        r"써",
        // Felt effect
        r"느",
        r"같아",
        r"되는",
        r"됐",
        r"했",
        r"해서",
        // Repurchase and continued use
        r"재구매",
        r"또",
        r"다시",
        r"계속",
        r"리피트",
        // Possessives and family references
        r"내",
        r"제",
        r"아버지",
        r"어머니",
        r"부모님",
        r"가족",
    ]);

    /// Complaint/drawback markers for item 7.
    pub static ref NEGATIVE_OPINION_MARKERS: Vec<Regex> = compile(&[
        r"단점",
        r"아쉬",
        r"불편",
        r"별로",
        r"그런데",
        r"하지만",
        r"다만",
        r"개선",
        r"부족",
        r"안.*좋",
    ]);

    /// Word tokenizer for the item-6 frequency check.
    pub static ref WORD_TOKEN: Regex = Regex::new(r"\b\w+\b").unwrap();
}

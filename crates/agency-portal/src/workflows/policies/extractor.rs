use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::domain::{PolicyBlock, PolicyRecord, PolicyStatus};
use super::rules::{capture, BlockText, RuleChain};
use super::vocabulary::{
    has_cancel_keyword, strip_status_glyphs, HEART_GLYPH, LIFE_KEYWORD, POLICY_LABEL,
    ROADSIDE_ABBREVIATION, ROADSIDE_GLYPHS, ROADSIDE_KEYWORDS, VEHICLE_KEYWORDS,
    VEHICLE_STOP_WORDS,
};

static POLICY_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)N\s*[°º]\s*POL(?:IZA)?\.?\s*[:#-]?\s*(\d+)").expect("policy number pattern")
});
static TAGGED_PLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x{1F3F7}\x{FE0F}?\s*([A-Za-z0-9]+)").expect("tagged plate pattern")
});
static PLATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z0-9]{6,10})\b").expect("plate token pattern"));
static VEHICLE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\x{1F697}|\x{1F699}|\x{1F69B}|\x{1F3CD})\x{FE0F}?\s+([A-ZÁÉÍÓÚÑ]+)")
        .expect("vehicle pattern")
});
static CATEGORY_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\x{1F170}|\x{1F520})\x{FE0F}?\s*([A-Za-z])\b").expect("category pattern")
});
static LIFE_ANSWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bVIDA\s*:\s*(S[IÍ]|NO)\b").expect("life pattern"));
static ROADSIDE_DECLINED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bAUX(?:ILIO)?\s*:\s*NO\b").expect("roadside pattern")
});
static EXPIRY_COUNTDOWN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bVENCE\s*(?:EN\s+)?([0-9]+)").expect("expiry pattern")
});
static ACTIVE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:ACTIVA|VIGENTE)\b").expect("active pattern"));

static STANDARD: LazyLock<PolicyExtractor> = LazyLock::new(PolicyExtractor::standard);

/// Per-field rule chains. Each chain is consulted independently.
#[derive(Debug, Default)]
pub struct FieldRules {
    pub number: RuleChain<String>,
    pub plate: RuleChain<String>,
    pub vehicle_type: RuleChain<String>,
    pub category: RuleChain<String>,
    pub life_rider: RuleChain<bool>,
    pub roadside_rider: RuleChain<bool>,
    pub status: RuleChain<PolicyStatus>,
}

/// Turns one policy block into a [`PolicyRecord`]. Never fails: a field whose chain
/// yields nothing keeps its default.
#[derive(Debug, Default)]
pub struct PolicyExtractor {
    pub rules: FieldRules,
}

impl PolicyExtractor {
    /// Rules covering every label variant seen in the client rollup field.
    pub fn standard() -> Self {
        let rules = FieldRules {
            number: RuleChain::new().rule("number_label", |text| {
                capture(&POLICY_NUMBER, text.raw)
            }),
            plate: RuleChain::new()
                .rule("tag_glyph", |text| {
                    capture(&TAGGED_PLATE, text.raw).map(|plate| plate.to_uppercase())
                })
                .rule("alphanumeric_token", |text| loose_plate(&text.upper)),
            vehicle_type: RuleChain::new()
                .rule("vehicle_glyph", |text| vehicle_after_glyph(text.raw))
                .rule("vehicle_keyword", |text| {
                    VEHICLE_KEYWORDS
                        .iter()
                        .find(|keyword| text.upper.contains(*keyword))
                        .map(|keyword| keyword.to_string())
                }),
            category: RuleChain::new().rule("category_glyph", |text| {
                capture(&CATEGORY_LETTER, text.raw).map(|letter| letter.to_uppercase())
            }),
            life_rider: RuleChain::new()
                .rule("life_answer", |text| {
                    capture(&LIFE_ANSWER, &text.upper).map(|answer| answer != "NO")
                })
                .rule("heart_glyph", |text| {
                    (text.raw.contains(HEART_GLYPH) && !text.upper.contains(LIFE_KEYWORD))
                        .then_some(true)
                }),
            roadside_rider: RuleChain::new()
                .rule("roadside_declined", |text| {
                    ROADSIDE_DECLINED.is_match(text.raw).then_some(false)
                })
                .rule("roadside_signal", |text| {
                    let signal = text.raw.chars().any(|c| ROADSIDE_GLYPHS.contains(&c))
                        || ROADSIDE_KEYWORDS
                            .iter()
                            .any(|keyword| text.upper.contains(keyword));
                    (signal && text.upper.contains(ROADSIDE_ABBREVIATION)).then_some(true)
                }),
            status: RuleChain::new()
                .rule("expiry_countdown", |text| {
                    capture(&EXPIRY_COUNTDOWN, text.raw).map(|digits| PolicyStatus::Expiring {
                        // ASCII digits only fail to parse on overflow.
                        days: digits.parse().unwrap_or(u32::MAX),
                    })
                })
                .rule("cancelled_keyword", |text| {
                    has_cancel_keyword(&text.upper).then_some(PolicyStatus::Cancelled)
                })
                .rule("active_keyword", |text| {
                    ACTIVE_WORD
                        .is_match(&text.upper)
                        .then_some(PolicyStatus::Active)
                }),
        };

        Self { rules }
    }

    pub fn extract(&self, block: &PolicyBlock) -> PolicyRecord {
        self.extract_text(block.as_str())
    }

    pub fn extract_text(&self, raw: &str) -> PolicyRecord {
        let text = BlockText::new(raw);
        let rules = &self.rules;

        PolicyRecord {
            number: resolve_or_default(&rules.number, &text, "number"),
            plate: resolve_or_default(&rules.plate, &text, "plate"),
            vehicle_type: resolve_or_default(&rules.vehicle_type, &text, "vehicle_type"),
            category: resolve_or_default(&rules.category, &text, "category"),
            has_life_rider: resolve_or_default(&rules.life_rider, &text, "life_rider"),
            has_roadside_rider: resolve_or_default(&rules.roadside_rider, &text, "roadside_rider"),
            status: resolve_or_default(&rules.status, &text, "status"),
            description: strip_status_glyphs(raw).trim().to_string(),
            raw_text: raw.to_string(),
        }
    }
}

/// Extracts with the shared standard rule set.
pub fn extract(block: &PolicyBlock) -> PolicyRecord {
    STANDARD.extract(block)
}

pub fn extract_all(blocks: &[PolicyBlock]) -> Vec<PolicyRecord> {
    blocks.iter().map(extract).collect()
}

fn resolve_or_default<T: Default>(
    chain: &RuleChain<T>,
    text: &BlockText<'_>,
    field: &'static str,
) -> T {
    match chain.resolve(text) {
        Some((value, rule)) => {
            trace!(field, rule, "policy field resolved");
            value
        }
        None => T::default(),
    }
}

fn loose_plate(upper: &str) -> Option<String> {
    PLATE_TOKEN
        .captures_iter(upper)
        .filter_map(|captures| captures.get(1))
        .map(|token| token.as_str())
        .find(|token| {
            !token.starts_with(POLICY_LABEL)
                && token.chars().any(|c| c.is_ascii_alphabetic())
                && token.chars().any(|c| c.is_ascii_digit())
        })
        .map(str::to_string)
}

fn vehicle_after_glyph(raw: &str) -> Option<String> {
    VEHICLE_WORD
        .captures_iter(raw)
        .filter_map(|captures| captures.get(1))
        .map(|word| word.as_str())
        .find(|word| word.chars().count() >= 3 && !VEHICLE_STOP_WORDS.contains(word))
        .map(str::to_string)
}

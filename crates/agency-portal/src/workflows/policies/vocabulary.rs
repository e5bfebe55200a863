//! Glyphs and keywords of the compiled policy label format.

use std::sync::LazyLock;

use regex::Regex;

/// Status glyphs that open a policy block: success, red, green, hourglass, warning, error.
pub(crate) const STATUS_GLYPHS: [char; 6] = [
    '\u{2705}',
    '\u{1F534}',
    '\u{1F7E2}',
    '\u{23F3}',
    '\u{26A0}',
    '\u{274C}',
];

pub(crate) const VARIATION_SELECTOR: char = '\u{FE0F}';

/// Keywords that must accompany a status glyph for it to open a block.
pub(crate) const STATUS_KEYWORDS: [&str; 6] =
    ["VENCE", "ACTIVA", "VIGENTE", "ANULADA", "BAJA", "INACTIVA"];

/// Cancellation keywords. Any one of them marks a policy as inactive.
pub(crate) const CANCELLED_KEYWORDS: [&str; 3] = ["ANULADA", "BAJA", "INACTIVA"];

static CANCELLED_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:{})\b", CANCELLED_KEYWORDS.join("|")))
        .expect("cancelled pattern")
});

/// Words that follow a vehicle glyph but never name a vehicle type.
pub(crate) const VEHICLE_STOP_WORDS: [&str; 8] = [
    "POL", "VENCE", "VIDA", "AUX", "AUXILIO", "ANULADA", "BAJA", "INACTIVA",
];

/// Vehicle types recognised anywhere in a block, most specific first.
pub(crate) const VEHICLE_KEYWORDS: [&str; 7] = [
    "CAMIONETA",
    "UTILITARIO",
    "PICKUP",
    "FURGON",
    "CAMION",
    "MOTO",
    "AUTO",
];

pub(crate) const ROADSIDE_GLYPHS: [char; 3] = ['\u{1F198}', '\u{1F527}', '\u{1F6A8}'];
pub(crate) const ROADSIDE_KEYWORDS: [&str; 3] = ["AUXILIO", "GRUA", "GRÚA"];
pub(crate) const ROADSIDE_ABBREVIATION: &str = "AUX";

pub(crate) const HEART_GLYPH: char = '\u{2764}';
pub(crate) const LIFE_KEYWORD: &str = "VIDA";
pub(crate) const POLICY_LABEL: &str = "POL";

pub(crate) fn is_status_glyph(c: char) -> bool {
    STATUS_GLYPHS.contains(&c)
}

pub(crate) fn has_status_glyph(text: &str) -> bool {
    text.chars().any(is_status_glyph)
}

/// Expects upper-cased input.
pub(crate) fn has_status_keyword(upper: &str) -> bool {
    STATUS_KEYWORDS.iter().any(|keyword| upper.contains(keyword))
}

/// Whole-word match only, so `TRABAJA` does not count as `BAJA`. Expects upper-cased input.
pub(crate) fn has_cancel_keyword(upper: &str) -> bool {
    CANCELLED_WORD.is_match(upper)
}

/// Removes every status glyph together with a trailing variation selector.
pub(crate) fn strip_status_glyphs(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut skip_selector = false;
    for c in text.chars() {
        if is_status_glyph(c) {
            skip_selector = true;
            continue;
        }
        if skip_selector && c == VARIATION_SELECTOR {
            skip_selector = false;
            continue;
        }
        skip_selector = false;
        stripped.push(c);
    }
    stripped
}

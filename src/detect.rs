//! Vendor detector (§4.2): case-insensitive substring match against vendor indicator sets,
//! first match wins, must complete in well under 0.1ms (a handful of `contains` scans).

use crate::normalize::vendor;
use crate::pattern_cache::cached;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    CreativeCoop,
    HarperCollins,
    OneHundred80,
    RiflePaper,
    Generic,
}

impl Vendor {
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Vendor::CreativeCoop => vendor::CREATIVE_COOP,
            Vendor::HarperCollins => vendor::HARPERCOLLINS,
            Vendor::OneHundred80 => vendor::ONEHUNDRED80,
            Vendor::RiflePaper => vendor::RIFLE_PAPER,
            Vendor::Generic => vendor::GENERIC,
        }
    }
}

/// Legacy Creative-Coop product-code prefix used purely as a detection signal, distinct from
/// the full code-discovery patterns in `extractors::creative_coop::discovery`.
fn has_legacy_d_code(text: &str) -> bool {
    cached(r"D[A-Z]\d{4}").is_match(text)
}

/// Classifies `document_text` into one of the five known vendors. First indicator match, in the
/// order listed in §4.2, wins.
pub fn detect_vendor(document_text: &str) -> Vendor {
    let lower = document_text.to_lowercase();

    let creative_coop_hit = lower.contains("creative-coop")
        || lower.contains("creative co-op")
        || lower.contains("creative co op")
        || ["xs", "cf", "cd", "hx", "xt"]
            .iter()
            .any(|prefix| cached(&format!(r"\b{}\d", prefix.to_uppercase())).is_match(document_text))
        || has_legacy_d_code(document_text);
    if creative_coop_hit {
        return Vendor::CreativeCoop;
    }

    if lower.contains("harpercollins") || lower.contains("harper collins") {
        return Vendor::HarperCollins;
    }

    if lower.contains("onehundred80") || lower.contains("one hundred 80") {
        return Vendor::OneHundred80;
    }

    if lower.contains("rifle paper") {
        return Vendor::RiflePaper;
    }

    Vendor::Generic
}

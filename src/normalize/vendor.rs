//! Vendor name canonicalization (§4.1) and the canonical name list (§4.2 indicator set target).

pub const CREATIVE_COOP: &str = "Creative Co-op";
pub const HARPERCOLLINS: &str = "HarperCollins";
pub const ONEHUNDRED80: &str = "OneHundred80";
pub const RIFLE_PAPER: &str = "Rifle Paper";
pub const GENERIC: &str = "Generic";

/// Canonicalizes a free-form vendor name when it matches a known indicator set,
/// case-insensitively; anything unrecognized passes through unchanged.
pub fn canonicalize(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if lower.contains("creative-coop") || lower.contains("creative co-op") || lower.contains("creative co op")
    {
        return CREATIVE_COOP.to_string();
    }
    if lower.contains("harpercollins") || lower.contains("harper collins") {
        return HARPERCOLLINS.to_string();
    }
    if lower.contains("onehundred80") || lower.contains("one hundred 80") {
        return ONEHUNDRED80.to_string();
    }
    if lower.contains("rifle paper") {
        return RIFLE_PAPER.to_string();
    }
    raw.to_string()
}

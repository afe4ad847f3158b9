//! Product-code discovery (§4.5.1): scan the full document text for the union of Creative-Coop
//! code shapes and collect the distinct set. The scan covers the whole document — the larger
//! (25,000+ char) window is the intended behavior; an 8,000-char variant exists in some sibling
//! implementations of this extractor but is an earlier iteration left in place, not the
//! intended behavior (Design Notes §9 Open Questions), so it is not used here.

use std::collections::BTreeSet;

use crate::pattern_cache::cached;

const CODE_PATTERN: &str =
    r"\b(?:XS\d+[A-Z]?|CF\d+[A-Z]?|CD\d+[A-Z]?|HX\d+[A-Z]?|XT\d+[A-Z]?|XM\d+[A-Z]?|D[A-Z]\d{4}[A-Z]?)\b";

/// Returns the distinct, lexicographically sorted set of product codes found in `text`
/// (§5 ordering requirement: extractor output order equals the sorted code set's order).
pub fn discover_codes(text: &str) -> BTreeSet<String> {
    let re = cached(CODE_PATTERN);
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_all_code_families() {
        let text = "XS9826A CF1022 CD9021A HX3301 XT8891A XM1209 DA6802";
        let codes = discover_codes(text);
        assert!(codes.contains("XS9826A"));
        assert!(codes.contains("CF1022"));
        assert!(codes.contains("CD9021A"));
        assert!(codes.contains("HX3301"));
        assert!(codes.contains("XT8891A"));
        assert!(codes.contains("XM1209"));
        assert!(codes.contains("DA6802"));
    }

    #[test]
    fn dedupes_repeated_codes() {
        let text = "XS9826A appears twice: XS9826A";
        assert_eq!(discover_codes(text).len(), 1);
    }

    #[test]
    fn sorted_order_is_lexicographic() {
        let text = "XT1 CD1 XS1";
        let codes: Vec<String> = discover_codes(text).into_iter().collect();
        assert_eq!(codes, vec!["CD1".to_string(), "XS1".to_string(), "XT1".to_string()]);
    }
}

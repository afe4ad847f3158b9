//! Wholesale price selection (§4.1): given a line's trailing price cluster, prefer the
//! wholesale price over the list/retail price, tried in the heuristic order the spec fixes.

use crate::pattern_cache::cached;

fn parse_price(s: &str) -> Option<f64> {
    s.parse::<f64>().ok()
}

/// `text` is the line (or context window) the prices were pulled from; `candidates` are the
/// numeric values already extracted from its trailing price cluster, in document order.
pub fn select_wholesale_price(text: &str, candidates: &[f64]) -> Option<f64> {
    // 1. Explicit "Your Price" column.
    let your_price_re = cached(r"(?i)your\s*price[^0-9]{0,20}\$?\s*(\d+\.\d{2})");
    if let Some(caps) = your_price_re.captures(text) {
        if let Some(v) = parse_price(&caps[1]) {
            return Some(v);
        }
    }

    // 2. The smaller of a paired list/wholesale candidate list.
    if candidates.len() == 2 {
        return Some(candidates[0].min(candidates[1]));
    }

    // 3. A number preceded by "wholesale" or "net".
    let wholesale_re = cached(r"(?i)(?:wholesale|net)[^0-9]{0,20}\$?\s*(\d+\.\d{2})");
    if let Some(caps) = wholesale_re.captures(text) {
        if let Some(v) = parse_price(&caps[1]) {
            return Some(v);
        }
    }

    // 4. The second of two prices in a "list ... your ..." pair.
    let list_your_re =
        cached(r"(?i)list[^0-9]{0,20}\$?\s*(\d+\.\d{2})[^0-9]{0,20}your[^0-9]{0,20}\$?\s*(\d+\.\d{2})");
    if let Some(caps) = list_your_re.captures(text) {
        if let Some(v) = parse_price(&caps[2]) {
            return Some(v);
        }
    }

    candidates.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_explicit_your_price_column() {
        let text = "List Price $8.00 Your Price $4.00";
        assert_eq!(select_wholesale_price(text, &[8.0, 4.0]), Some(4.0));
    }

    #[test]
    fn falls_back_to_smaller_of_a_pair() {
        let text = "8.00 4.00";
        assert_eq!(select_wholesale_price(text, &[8.0, 4.0]), Some(4.0));
    }

    #[test]
    fn wholesale_keyword_wins_when_no_pair_or_column() {
        let text = "wholesale $2.80 each";
        assert_eq!(select_wholesale_price(text, &[2.80]), Some(2.80));
    }

    #[test]
    fn list_your_pair_prefers_second_value() {
        let text = "list 8.00 your 4.00";
        assert_eq!(select_wholesale_price(text, &[]), Some(4.0));
    }
}

//! Quantity cleaning (§4.1): strip unit words, commas, currency; parse the remaining integer;
//! reject out-of-range values.

use crate::pattern_cache::cached;

const UNIT_WORDS: [&str; 6] = ["each", "set", "case", "piece", "lo", "ea"];
const QUANTITY_MAX: i64 = 10_000;

/// Cleans a free-form quantity string into a non-negative integer, or `0` when the string does
/// not yield one.
pub fn clean_quantity(input: &str) -> u32 {
    let mut s = input.to_lowercase();
    for word in UNIT_WORDS {
        let re = cached(&format!(r"\b{word}\b"));
        s = re.replace_all(&s, "").to_string();
    }
    let punct_re = cached(r"[,$]");
    s = punct_re.replace_all(&s, "").to_string();
    s = s.trim().to_string();

    let digits_re = cached(r"-?\d+");
    let Some(m) = digits_re.find(&s) else {
        return 0;
    };
    let Ok(value) = m.as_str().parse::<i64>() else {
        return 0;
    };
    if value < 0 || value > QUANTITY_MAX {
        return 0;
    }
    value as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_unit_words_and_commas() {
        assert_eq!(clean_quantity("1,200 each"), 1200);
        assert_eq!(clean_quantity("24 Set"), 24);
        assert_eq!(clean_quantity("12 case"), 12);
    }

    #[test]
    fn rejects_negative_and_overlarge() {
        assert_eq!(clean_quantity("-5"), 0);
        assert_eq!(clean_quantity("10001"), 0);
        assert_eq!(clean_quantity("10000"), 10_000);
    }

    #[test]
    fn unparseable_yields_zero() {
        assert_eq!(clean_quantity("each"), 0);
        assert_eq!(clean_quantity(""), 0);
    }
}

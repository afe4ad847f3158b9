//! Description cleaning and row-level assembly (§4.5.5).

use crate::pattern_cache::cached;

const HEADER_TOKENS: [&str; 9] = [
    "Product Code",
    "Description",
    "UPC",
    "Qty Ord",
    "Your Price",
    "List Price",
    "U/M",
    "Unit",
    "Qty",
];

/// Cleans a raw description in one pass, per the artefact table in §4.5.5. Preserves
/// dimensions, percentages, ampersands, possessives, and material words — those never match
/// any of the removal patterns below.
pub fn clean_description(raw: &str, code: &str) -> String {
    let mut text = raw.to_string();

    // `$$ ... $$` / `|| ... ||` enclosed runs: remove the delimiters and their contents.
    let enclosed_re = cached(r"\$\$[^$]*\$\$|\|\|[^|]*\|\|");
    text = enclosed_re.replace_all(&text, " ").to_string();

    // Literal artefact string.
    let traditional_re = cached(r"(?i)traditional d-code format");
    text = traditional_re.replace_all(&text, " ").to_string();

    // Standalone table-header tokens.
    for token in HEADER_TOKENS {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(token));
        let re = cached(&pattern);
        text = re.replace_all(&text, " ").to_string();
    }

    // Repeated pipe separators collapse to a single space.
    let pipes_re = cached(r"\|+");
    text = pipes_re.replace_all(&text, " ").to_string();

    // Drop duplicate occurrences of the product code beyond the first two (one may legitimately
    // sit inside a "UPC: ..." prefix built later, so two survivors is the budget here).
    if !code.is_empty() {
        let code_re = cached(&regex::escape(code));
        let mut count = 0;
        let mut out = String::with_capacity(text.len());
        let mut last_end = 0;
        for m in code_re.find_iter(&text) {
            count += 1;
            if count <= 2 {
                out.push_str(&text[last_end..m.end()]);
            } else {
                out.push_str(&text[last_end..m.start()]);
            }
            last_end = m.end();
        }
        out.push_str(&text[last_end..]);
        text = out;
    }

    // Collapse runs of whitespace/commas/dashes.
    let spaces_re = cached(r" {2,}");
    text = spaces_re.replace_all(&text, " ").to_string();
    let commas_re = cached(r",{2,}");
    text = commas_re.replace_all(&text, ",").to_string();
    let newlines_re = cached(r"\n{2,}");
    text = newlines_re.replace_all(&text, "\n").to_string();
    let dashes_re = cached(r"-{3,}");
    text = dashes_re.replace_all(&text, "-").to_string();

    text.trim_matches(|c: char| c.is_whitespace() || ".,;:-".contains(c))
        .to_string()
}

/// Final description per §4.5.5: `"<code> - UPC: <upc> - <cleaned>"` when a UPC is present,
/// else `"<code> - <cleaned>"`.
pub fn assemble_description(code: &str, upc: &str, cleaned: &str) -> String {
    if upc.is_empty() {
        format!("{code} - {cleaned}")
    } else {
        format!("{code} - UPC: {upc} - {cleaned}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_traditional_dcode_literal() {
        let cleaned = clean_description("Traditional D-code format Stoneware Bowl", "DA6802");
        assert!(!cleaned.to_lowercase().contains("traditional d-code format"));
        assert!(cleaned.contains("Stoneware Bowl"));
    }

    #[test]
    fn removes_standalone_header_tokens() {
        let cleaned = clean_description("Product Code Description Stoneware Bowl Qty", "XS1");
        assert!(!cleaned.contains("Product Code"));
        assert!(!cleaned.contains("Description"));
        assert!(cleaned.contains("Stoneware Bowl"));
    }

    #[test]
    fn collapses_repeated_whitespace_and_dashes() {
        let cleaned = clean_description("Stoneware   Bowl -----  large", "XS1");
        assert_eq!(cleaned, "Stoneware Bowl - large");
    }

    #[test]
    fn preserves_dimensions_and_ampersands() {
        let cleaned = clean_description("6\"H Stoneware Bowl & Lid 4-3/4\"L", "XS1");
        assert!(cleaned.contains("6\"H"));
        assert!(cleaned.contains("&"));
        assert!(cleaned.contains("4-3/4\"L"));
    }

    #[test]
    fn drops_duplicate_product_code_occurrences_beyond_two() {
        let cleaned = clean_description("XS9826A XS9826A Bowl XS9826A XS9826A", "XS9826A");
        let occurrences = cleaned.matches("XS9826A").count();
        assert_eq!(occurrences, 2);
    }

    #[test]
    fn assembles_with_upc_when_present() {
        assert_eq!(
            assemble_description("XS9826A", "123456789012", "Stoneware Bowl"),
            "XS9826A - UPC: 123456789012 - Stoneware Bowl"
        );
    }

    #[test]
    fn assembles_without_upc() {
        assert_eq!(assemble_description("XS9826A", "", "Stoneware Bowl"), "XS9826A - Stoneware Bowl");
    }
}

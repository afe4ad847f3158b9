//! Multi-tier price extraction (§4.5.3). Tiers are tried in order; the first validated price
//! wins. Each tier is a pure `context -> Option<f64>` function (Design Notes §9), so the
//! dispatcher just short-circuits on the first `Some` that also passes validation.

use crate::extractors::creative_coop::mapping::ProductMapping;
use crate::extractors::creative_coop::tabular::{find_tier1_row, find_vertical_row};
use crate::document::StructuredDocument;
use crate::pattern_cache::cached;
use crate::trace::{ExtractionTrace, PriceTier};

const MIN_PRICE: f64 = 0.10;
const MAX_PRICE: f64 = 1000.00;
const CONTEXT_RADIUS: usize = 400;

fn validate_price(price: f64, upc: &str) -> bool {
    if !(MIN_PRICE..=MAX_PRICE).contains(&price) {
        return false;
    }
    let as_str = format!("{price:.2}").replace('.', "");
    if !upc.is_empty() && upc.contains(&as_str) {
        return false;
    }
    true
}

fn context_window<'a>(text: &'a str, code: &str) -> Option<&'a str> {
    let pos = text.find(code)?;
    let start = pos.saturating_sub(CONTEXT_RADIUS);
    let end = (pos + code.len() + CONTEXT_RADIUS).min(text.len());
    text.get(start..end)
}

fn tier2_pattern(text: &str, code: &str, upc: &str) -> Option<f64> {
    let window = context_window(text, code)?;
    let labelled_re = cached(r"(?i)(?:wholesale|your price|net|cost)[^$]{0,40}\$?(\d+\.\d{2})");
    if let Some(caps) = labelled_re.captures(window) {
        if let Ok(price) = caps[1].parse::<f64>() {
            if validate_price(price, upc) {
                return Some(price);
            }
        }
    }
    let list_your_re = cached(r"(?i)list[^$]{0,20}\$?(\d+\.\d{2})[^$]{0,20}your[^$]{0,20}\$?(\d+\.\d{2})");
    if let Some(caps) = list_your_re.captures(window) {
        if let Ok(price) = caps[2].parse::<f64>() {
            if validate_price(price, upc) {
                return Some(price);
            }
        }
    }
    None
}

/// Partitions `text` into page-like sections (§4.5.3 Tier 3), each tagged with its `(start, end)`
/// byte range *in the original text* rather than a running sum of fragment lengths — a running
/// sum drifts whenever a delimiter (the form-feed byte, in particular) is consumed by `split`
/// and so isn't reflected in any fragment's length, which would silently shift every subsequent
/// section's computed offset.
fn partition_pages(text: &str) -> Vec<(usize, usize, &str)> {
    if text.contains('\x0c') {
        let mut sections = Vec::new();
        let mut start = 0;
        for (idx, _) in text.match_indices('\x0c') {
            sections.push((start, idx, &text[start..idx]));
            start = idx + 1;
        }
        sections.push((start, text.len(), &text[start..]));
        return sections;
    }
    let page_marker = cached(r"(?i)page\s+\d+");
    if page_marker.is_match(text) {
        let mut sections = Vec::new();
        let mut last = 0;
        for m in page_marker.find_iter(text) {
            if m.start() > last {
                sections.push((last, m.start(), &text[last..m.start()]));
            }
            last = m.start();
        }
        sections.push((last, text.len(), &text[last..]));
        return sections;
    }
    const CHARS_PER_PAGE: usize = 2000;
    let mut sections = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = (start + CHARS_PER_PAGE).min(text.len());
        while end < text.len() && !text.is_char_boundary(end) {
            end += 1;
        }
        sections.push((start, end, &text[start..end]));
        start = end;
    }
    sections
}

fn tier3_page_context(text: &str, code: &str, upc: &str) -> Option<f64> {
    let pos = text.find(code)?;
    for (section_start, section_end, section) in partition_pages(text) {
        if pos < section_start || pos >= section_end {
            continue;
        }
        let near_re = cached(r"(?i)\$(\d+\.\d{2})[^.]{0,30}(?:each|unit|usd)|(?:each|unit|usd)[^.]{0,30}\$(\d+\.\d{2})");
        for caps in near_re.captures_iter(section) {
            let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
            if let Ok(price) = raw.parse::<f64>() {
                if validate_price(price, upc) {
                    return Some(price);
                }
            }
        }
        return None;
    }
    None
}

/// Resolves the unit price for `code`, recording which tier produced it (§4.5.3, §4.5.9).
/// Returns `None` when every tier fails (the caller drops the code rather than emitting the
/// `$0.00` internal sentinel into final output, per §4.5.10).
pub fn extract_price(
    doc: &StructuredDocument,
    code: &str,
    entry: &ProductMapping,
    trace: &mut ExtractionTrace,
) -> Option<f64> {
    if let Some(row) = find_tier1_row(doc, code) {
        if let Some(price) = row.your_price {
            if validate_price(price, &entry.upc) {
                trace.record_price_tier(PriceTier::Tabular);
                return Some(price);
            }
        }
    }

    if let Some(row) = find_vertical_row(doc.text_or_empty(), code) {
        if let Some(price) = row.your_price {
            if validate_price(price, &entry.upc) {
                trace.record_price_tier(PriceTier::VerticalTabular);
                return Some(price);
            }
        }
    }

    if let Some(price) = tier2_pattern(doc.text_or_empty(), code, &entry.upc) {
        trace.record_price_tier(PriceTier::Pattern);
        return Some(price);
    }

    if let Some(price) = tier3_page_context(doc.text_or_empty(), code, &entry.upc) {
        trace.record_price_tier(PriceTier::PageContext);
        return Some(price);
    }

    trace.record_tier_miss();
    None
}

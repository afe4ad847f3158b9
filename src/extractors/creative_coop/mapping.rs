//! Product-to-UPC-to-description mapping (§4.5.2). Entries that can't produce both a UPC
//! (which may legitimately be empty) and a non-artefact description are dropped outright — the
//! mapping never contains a placeholder.

use std::collections::BTreeMap;

use crate::document::StructuredDocument;
use crate::pattern_cache::cached;
use crate::trace::{ExtractionTrace, RowDropReason};

const UPC_WINDOW: usize = 200;
const CONTEXT_WINDOW: usize = 200;
const CHARS_PER_PAGE: usize = 2000;

#[derive(Debug, Clone)]
pub struct ProductMapping {
    pub upc: String,
    pub description: String,
    pub raw_description: String,
    pub page: u32,
}

const HEADER_TOKENS: [&str; 9] = [
    "product code",
    "description",
    "upc",
    "qty ord",
    "your price",
    "list price",
    "u/m",
    "unit",
    "qty",
];

fn is_artifact(desc: &str) -> bool {
    let trimmed = desc.trim();
    if trimmed.is_empty() {
        return true;
    }
    if !trimmed.chars().any(|c| c.is_alphabetic()) {
        return true;
    }
    let lower = trimmed.to_lowercase();
    if lower == "traditional d-code format" {
        return true;
    }
    let mut remainder = lower.clone();
    for token in HEADER_TOKENS {
        remainder = remainder.replace(token, " ");
    }
    if remainder.split_whitespace().next().is_none() {
        return true;
    }
    let digit_count = trimmed.chars().filter(|c| c.is_ascii_digit()).count();
    if digit_count * 2 > trimmed.len() {
        return true;
    }
    false
}

fn find_upc_after(text: &str, code_end: usize) -> Option<(String, usize)> {
    let window_end = (code_end + UPC_WINDOW).min(text.len());
    let window = text.get(code_end..window_end)?;
    let re = cached(r"\d{12}");
    let m = re.find(window)?;
    Some((m.as_str().to_string(), code_end + m.start()))
}

fn description_between(text: &str, code_end: usize, upc_start: usize) -> Option<String> {
    if upc_start <= code_end || upc_start - code_end > 120 {
        return None;
    }
    let span = text.get(code_end..upc_start)?;
    let cleaned = span.trim();
    if is_artifact(cleaned) {
        None
    } else {
        Some(cleaned.to_string())
    }
}

fn description_from_first_run(text: &str, code_end: usize) -> Option<String> {
    let window_end = (code_end + 50).min(text.len());
    let window = text.get(code_end..window_end)?;
    let re = cached(r"^\s*([A-Za-z][^0-9]{5,50})");
    let caps = re.captures(window)?;
    let candidate = caps[1].trim();
    if is_artifact(candidate) {
        None
    } else {
        Some(candidate.to_string())
    }
}

fn description_from_context_window(text: &str, code_start: usize) -> Option<String> {
    let start = code_start.saturating_sub(CONTEXT_WINDOW / 2);
    let end = (code_start + CONTEXT_WINDOW / 2).min(text.len());
    let window = text.get(start..end)?;
    let phrase_re = cached(r"[A-Za-z][A-Za-z'&,.\- ]{10,}[A-Za-z]");
    let longest = phrase_re
        .find_iter(window)
        .max_by_key(|m| m.as_str().len())?;
    let candidate = longest.as_str().trim();
    if is_artifact(candidate) {
        None
    } else {
        Some(candidate.to_string())
    }
}

fn page_for_offset(doc: &StructuredDocument, offset: usize) -> u32 {
    for entity in doc.line_items() {
        if let (Some(start), Some(end)) = (entity.span.start_index, entity.span.end_index) {
            if offset >= start && offset <= end {
                if let Some(page) = entity.span.page {
                    return page + 1;
                }
            }
        }
    }
    (offset / CHARS_PER_PAGE) as u32 + 1
}

/// Builds the per-document product mapping (§4.5.2). Scans the full text (budget floor
/// 25,000 chars; in practice the whole document is scanned regardless of length).
pub fn build_mapping(
    doc: &StructuredDocument,
    codes: &std::collections::BTreeSet<String>,
    trace: &mut ExtractionTrace,
) -> BTreeMap<String, ProductMapping> {
    let text = doc.text_or_empty();
    let mut mapping = BTreeMap::new();

    for code in codes {
        let code_re = cached(&regex::escape(code));
        let Some(code_match) = code_re.find(text) else {
            continue;
        };
        let code_start = code_match.start();
        let code_end = code_match.end();

        let upc_hit = find_upc_after(text, code_end);
        let upc = upc_hit.as_ref().map(|(u, _)| u.clone()).unwrap_or_default();

        let description = upc_hit
            .as_ref()
            .and_then(|(_, upc_start)| description_between(text, code_end, *upc_start))
            .or_else(|| description_from_first_run(text, code_end))
            .or_else(|| description_from_context_window(text, code_start));

        let Some(description) = description else {
            trace.record_drop(RowDropReason::NoUpcOrDescription);
            continue;
        };

        let page = page_for_offset(doc, code_start);

        mapping.insert(
            code.clone(),
            ProductMapping {
                upc,
                raw_description: description.clone(),
                description,
                page,
            },
        );
    }

    mapping
}

//! Creative-Coop extractor orchestrator (§4.5): wires product-code discovery, the UPC/
//! description mapping, multi-tier price and quantity resolution, and description cleaning
//! into one pass over a document, adding page-aware entity continuation (§4.5.6) and the
//! quality score (§4.5.8) on top. The per-code state machine of §4.5.9 is not reified as its
//! own type — each `Discovered -> ... -> Emitted | Dropped` transition corresponds to one of
//! the early-return sites below, with the drop reason recorded on the trace.

pub mod description;
pub mod discovery;
pub mod mapping;
pub mod price;
pub mod quantity;
pub mod tabular;

use std::collections::{BTreeMap, HashSet};

use crate::document::{LineItemEntity, StructuredDocument};
use crate::extractors::ExtractorResult;
use crate::row::ExtractedLine;
use crate::trace::{ExtractionTrace, RowDropReason};

use description::{assemble_description, clean_description};
use discovery::discover_codes;
use mapping::build_mapping;
use price::extract_price;
use quantity::{extract_tuple, resolve_quantity};

const CHARS_PER_PAGE: usize = 2000;

/// Per-invoice quality signals (§4.5.8): attached to the response for monitoring, never used
/// to gate emission.
#[derive(Debug, Clone, Default)]
pub struct QualityScore {
    pub unique_products: usize,
    pub price_diversity: f64,
    pub quantity_diversity: f64,
    pub placeholder_rows: usize,
    pub complete_record_ratio: f64,
    pub tier_usage: BTreeMap<String, u32>,
    pub quality_score: f64,
}

/// One continuation-merged `line_item` entity group (§4.5.6): every `mention_text` that
/// referenced a given product code, sorted by page.
struct ContinuationGroup {
    mention_texts: Vec<String>,
}

fn entity_page(entity: &LineItemEntity) -> u32 {
    entity
        .span
        .page
        .map(|p| p + 1)
        .or_else(|| entity.span.start_index.map(|s| (s / CHARS_PER_PAGE) as u32 + 1))
        .unwrap_or(1)
}

/// Walks `document.entities` of type `line_item`, merging continuation fragments that share a
/// product code rather than emitting a duplicate row for each (§4.5.6). Orphan fragments with
/// no recognizable code are discarded without raising.
fn merge_continuations(doc: &StructuredDocument) -> BTreeMap<String, ContinuationGroup> {
    let mut by_code: BTreeMap<String, Vec<(u32, String)>> = BTreeMap::new();
    for entity in doc.line_items() {
        let page = entity_page(entity);
        let Some(code) = discover_codes(&entity.mention_text).into_iter().next() else {
            continue;
        };
        by_code
            .entry(code)
            .or_default()
            .push((page, entity.mention_text.clone()));
    }

    by_code
        .into_iter()
        .map(|(code, mut fragments)| {
            fragments.sort_by_key(|(page, _)| *page);
            (
                code,
                ContinuationGroup {
                    mention_texts: fragments.into_iter().map(|(_, text)| text).collect(),
                },
            )
        })
        .collect()
}

/// Folds continuation mention_text into a code's windowed raw description, appending any
/// whole words not already present rather than replacing the windowed description outright —
/// the window-based description is usually the cleaner of the two sources.
fn merge_continuation_text(base: &str, group: Option<&ContinuationGroup>) -> String {
    let Some(group) = group else {
        return base.to_string();
    };
    let mut merged = base.to_string();
    for fragment in &group.mention_texts {
        for word in fragment.split_whitespace() {
            let token = word.trim_matches(|c: char| !c.is_alphanumeric());
            if token.len() > 3 && !merged.contains(token) {
                merged.push(' ');
                merged.push_str(token);
            }
        }
    }
    merged
}

fn compute_quality_score(
    unique_products: usize,
    unique_prices: usize,
    unique_quantities: usize,
    rows: usize,
    complete_records: usize,
) -> f64 {
    if rows == 0 {
        return 0.0;
    }
    let coverage = (unique_products as f64 / 100.0).min(1.0);
    let price_diversity = (unique_prices as f64 / rows as f64).min(1.0);
    let quantity_diversity = (unique_quantities as f64 / rows as f64).min(1.0);
    let completeness = (complete_records as f64 / rows as f64).min(1.0);
    0.35 * coverage + 0.25 * price_diversity + 0.15 * quantity_diversity + 0.25 * completeness
}

/// Runs the full Creative-Coop pipeline (§4.5): discovery -> mapping -> continuation merge ->
/// per-code price/quantity resolution -> description assembly -> row emission, plus the quality
/// score of §4.5.8. `invoice_number`/`order_date` are left `None` on the result — Creative-Coop
/// has no vendor-specific way to resolve those more reliably than the generic entity lookup, so
/// the caller falls back to it (§6.1 of `ExtractorResult`'s own doc comment).
pub fn extract(
    doc: &StructuredDocument,
    trace: &mut ExtractionTrace,
) -> (ExtractorResult, QualityScore) {
    let text = doc.text_or_empty();
    let codes = discover_codes(text);
    let mapping = build_mapping(doc, &codes, trace);
    let continuations = merge_continuations(doc);

    let mut lines = Vec::new();
    let mut prices_seen: HashSet<String> = HashSet::new();
    let mut quantities_seen: HashSet<u32> = HashSet::new();
    let mut complete_records = 0usize;

    for (code, entry) in &mapping {
        let Some(price) = extract_price(doc, code, entry, trace) else {
            trace.record_drop(RowDropReason::PriceExtractionFailed);
            continue;
        };

        let tuple = extract_tuple(doc, code, trace).unwrap_or_default();
        let quantity = resolve_quantity(&tuple);
        if quantity == 0 {
            trace.record_drop(RowDropReason::QuantityZero);
            continue;
        }

        let merged_raw = merge_continuation_text(&entry.raw_description, continuations.get(code));
        let cleaned = clean_description(&merged_raw, code);
        if cleaned.trim().is_empty() {
            trace.record_drop(RowDropReason::DescriptionEmptyAfterCleaning);
            continue;
        }
        let description = assemble_description(code, &entry.upc, &cleaned);

        prices_seen.insert(format!("{price:.2}"));
        quantities_seen.insert(quantity);
        if !entry.upc.is_empty() {
            complete_records += 1;
        }

        lines.push(ExtractedLine {
            product_code: code.clone(),
            description,
            unit_price: format!("${price:.2}"),
            quantity,
        });
    }

    let rows = lines.len();
    let quality = QualityScore {
        unique_products: rows,
        price_diversity: if rows == 0 { 0.0 } else { prices_seen.len() as f64 / rows as f64 },
        quantity_diversity: if rows == 0 { 0.0 } else { quantities_seen.len() as f64 / rows as f64 },
        placeholder_rows: 0,
        complete_record_ratio: if rows == 0 { 0.0 } else { complete_records as f64 / rows as f64 },
        tier_usage: trace
            .price_tier_hits
            .iter()
            .map(|(tier, count)| (tier.to_string(), *count))
            .collect(),
        quality_score: compute_quality_score(rows, prices_seen.len(), quantities_seen.len(), rows, complete_records),
    };

    (
        ExtractorResult {
            lines,
            invoice_number: None,
            order_date: None,
        },
        quality,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{EntitySpan, Entity, LineItemEntity};

    fn line_item_entity(text: &str, page: u32) -> Entity {
        Entity::LineItem(LineItemEntity {
            mention_text: text.to_string(),
            confidence: 0.9,
            span: EntitySpan {
                page: Some(page),
                start_index: None,
                end_index: None,
            },
            properties: vec![],
        })
    }

    #[test]
    fn continuation_entities_on_two_pages_merge_into_one_row() {
        let text = "XS9826A | 123456789012 | Stoneware Bowl | 24 | 0 | 24 | 0 | ea | 3.20 | 1.60 | 38.40\n";
        let doc = StructuredDocument {
            text: Some(text.to_string()),
            entities: vec![
                line_item_entity("XS9826A Stoneware Bowl 6\"H", 0),
                line_item_entity("XS9826A continued: Round base", 1),
            ],
            pages: vec![],
            tables: vec![],
        };
        let mut trace = ExtractionTrace::new();
        let (result, _quality) = extract(&doc, &mut trace);
        let matches: Vec<_> = result
            .lines
            .iter()
            .filter(|l| l.product_code == "XS9826A")
            .collect();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].description.contains("continued") || matches[0].description.contains("base") || matches[0].description.contains("Round"));
    }

    #[test]
    fn drops_rows_with_no_price_evidence() {
        let text = "XS1000A Stoneware Bowl widget with no pricing information anywhere near it\n";
        let doc = StructuredDocument {
            text: Some(text.to_string()),
            ..Default::default()
        };
        let mut trace = ExtractionTrace::new();
        let (result, _quality) = extract(&doc, &mut trace);
        assert!(result.lines.iter().all(|l| l.product_code != "XS1000A"));
        assert!(trace.row_drops.get(&RowDropReason::PriceExtractionFailed).copied().unwrap_or(0) >= 1);
    }

    #[test]
    fn tabular_evidence_produces_a_row_with_validated_quantity_and_price() {
        let text = "XS9826A | 123456789012 | Stoneware Bowl | 24 | 0 | 24 | 0 | ea | 3.20 | 1.60 | 38.40\n";
        let doc = StructuredDocument {
            text: Some(text.to_string()),
            ..Default::default()
        };
        let mut trace = ExtractionTrace::new();
        let (result, quality) = extract(&doc, &mut trace);
        let row = result
            .lines
            .iter()
            .find(|l| l.product_code == "XS9826A")
            .expect("row should be emitted");
        assert_eq!(row.unit_price, "$1.60");
        assert_eq!(row.quantity, 24);
        assert_eq!(quality.unique_products, 1);
    }
}

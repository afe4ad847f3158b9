//! Quantity extraction and the shipped-first business rule (§4.5.4).

use crate::document::StructuredDocument;
use crate::extractors::creative_coop::tabular::{find_tier1_row, find_vertical_row, TabularRow};
use crate::pattern_cache::cached;
use crate::trace::{ExtractionTrace, QuantitySource};

const MAX_QTY: i64 = 10_000;

#[derive(Debug, Clone, Copy, Default)]
pub struct QuantityTuple {
    pub ordered: u32,
    pub allocated: u32,
    pub shipped: u32,
    pub backordered: u32,
}

fn in_range(n: i64) -> bool {
    (0..=MAX_QTY).contains(&n)
}

fn tuple_from_row(row: &TabularRow) -> Option<QuantityTuple> {
    let any = row.qty_ordered.is_some()
        || row.qty_allocated.is_some()
        || row.qty_shipped.is_some()
        || row.qty_backordered.is_some();
    if !any {
        return None;
    }
    Some(QuantityTuple {
        ordered: row.qty_ordered.unwrap_or(0),
        allocated: row.qty_allocated.unwrap_or(0),
        shipped: row.qty_shipped.unwrap_or(0),
        backordered: row.qty_backordered.unwrap_or(0),
    })
}

fn context_window<'a>(text: &'a str, code: &str, line_radius: usize) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let idx = lines.iter().position(|l| l.contains(code))?;
    let start = idx.saturating_sub(line_radius);
    let end = (idx + line_radius + 1).min(lines.len());
    Some(lines[start..end].join("\n"))
}

fn labelled_tokens(context: &str) -> Option<QuantityTuple> {
    let find = |pattern: &str| -> Option<u32> {
        let re = cached(pattern);
        re.captures(context)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .filter(|n| in_range(*n))
            .map(|n| n as u32)
    };
    let shipped = find(r"(?i)(?:shipped|ship):?\s*(\d+)");
    let ordered = find(r"(?i)(?:ordered|order):?\s*(\d+)");
    let allocated = find(r"(?i)(?:allocated|alloc):?\s*(\d+)");
    let backordered = find(r"(?i)(?:back.?order|bkord):?\s*(\d+)");
    if shipped.is_none() && ordered.is_none() && allocated.is_none() && backordered.is_none() {
        return None;
    }
    Some(QuantityTuple {
        ordered: ordered.unwrap_or(0),
        allocated: allocated.unwrap_or(0),
        shipped: shipped.unwrap_or(0),
        backordered: backordered.unwrap_or(0),
    })
}

fn four_consecutive_lines(context: &str) -> Option<QuantityTuple> {
    let lines: Vec<&str> = context.lines().map(|l| l.trim()).collect();
    let int_re = cached(r"^\d+$");
    for window in lines.windows(4) {
        if window.iter().all(|l| int_re.is_match(l)) {
            let values: Vec<i64> = window.iter().map(|l| l.parse::<i64>().unwrap()).collect();
            if values.iter().all(|v| in_range(*v)) {
                return Some(QuantityTuple {
                    ordered: values[0] as u32,
                    allocated: values[1] as u32,
                    shipped: values[2] as u32,
                    backordered: values[3] as u32,
                });
            }
        }
    }
    None
}

fn legacy_shipped_back(context: &str) -> Option<QuantityTuple> {
    let re = cached(r"(\d+)\s+(\d+)\s+(?:lo|each|Set)");
    let caps = re.captures(context)?;
    let shipped: i64 = caps[1].parse().ok()?;
    let backordered: i64 = caps[2].parse().ok()?;
    if !in_range(shipped) || !in_range(backordered) {
        return None;
    }
    Some(QuantityTuple {
        ordered: 0,
        allocated: 0,
        shipped: shipped as u32,
        backordered: backordered as u32,
    })
}

/// Resolves the `QuantityTuple` for `code`, trying the four sources of §4.5.4 in order.
/// Tabular evidence is preferred over the legacy free-text pattern whenever both are present
/// (Design Notes §9 Open Questions).
pub fn extract_tuple(
    doc: &StructuredDocument,
    code: &str,
    trace: &mut ExtractionTrace,
) -> Option<QuantityTuple> {
    if let Some(row) = find_tier1_row(doc, code) {
        if let Some(tuple) = tuple_from_row(&row) {
            trace.record_quantity_source(QuantitySource::Tabular);
            return Some(tuple);
        }
    }
    if let Some(row) = find_vertical_row(doc.text_or_empty(), code) {
        if let Some(tuple) = tuple_from_row(&row) {
            trace.record_quantity_source(QuantitySource::Tabular);
            return Some(tuple);
        }
    }

    let context = context_window(doc.text_or_empty(), code, 8)?;

    if let Some(tuple) = labelled_tokens(&context) {
        trace.record_quantity_source(QuantitySource::LabelledTokens);
        return Some(tuple);
    }
    if let Some(tuple) = four_consecutive_lines(&context) {
        trace.record_quantity_source(QuantitySource::FourConsecutiveLines);
        return Some(tuple);
    }
    if let Some(tuple) = legacy_shipped_back(&context) {
        trace.record_quantity_source(QuantitySource::LegacyShippedBack);
        return Some(tuple);
    }

    trace.record_tier_miss();
    None
}

/// The shipped-first business rule (§4.5.4): shipped wins; else ordered when backordered
/// confirms a real commitment; else allocated; else the row is dropped.
pub fn resolve_quantity(tuple: &QuantityTuple) -> u32 {
    if tuple.shipped > 0 {
        tuple.shipped
    } else if tuple.ordered > 0 && tuple.backordered > 0 {
        tuple.ordered
    } else if tuple.allocated > 0 {
        tuple.allocated
    } else {
        0
    }
}

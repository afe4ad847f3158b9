//! Generic / fallback extractor (§4.3): entity tier, then table tier, then text tier. First
//! tier that yields at least one row wins.

use crate::document::{LineItemPropertyKind, StructuredDocument};
use crate::normalize::{clean_quantity, parse_date};
use crate::pattern_cache::cached;
use crate::row::ExtractedLine;
use crate::trace::ExtractionTrace;

fn format_price(raw: &str) -> Option<String> {
    let re = cached(r"\$?\s*(\d+(?:\.\d{1,2})?)");
    let caps = re.captures(raw)?;
    let value: f64 = caps[1].parse().ok()?;
    Some(format!("${value:.2}"))
}

fn entity_tier(doc: &StructuredDocument, trace: &mut ExtractionTrace) -> Vec<ExtractedLine> {
    let mut lines = Vec::new();
    for item in doc.line_items() {
        let code = item
            .property(LineItemPropertyKind::ProductCode)
            .unwrap_or_default();
        let description = item
            .property(LineItemPropertyKind::Description)
            .unwrap_or(&item.mention_text);
        let price_raw = item.property(LineItemPropertyKind::UnitPrice);
        let qty_raw = item.property(LineItemPropertyKind::Quantity);

        let Some(price_raw) = price_raw else {
            trace.record_tier_miss();
            continue;
        };
        let Some(price) = format_price(price_raw) else {
            trace.record_tier_miss();
            continue;
        };
        let quantity = qty_raw.map(clean_quantity).unwrap_or(0);
        if quantity == 0 {
            continue;
        }
        let full_description = if code.is_empty() {
            description.to_string()
        } else {
            format!("{code} - {description}")
        };
        lines.push(ExtractedLine {
            product_code: code.to_string(),
            description: full_description,
            unit_price: price,
            quantity,
        });
    }
    lines
}

fn table_tier(doc: &StructuredDocument) -> Vec<ExtractedLine> {
    let price_header_re = cached(r"(?i)^(unit\s*)?price$|^amount$");
    for table in &doc.tables {
        let Some(header) = table.header_rows.first() else {
            continue;
        };
        let header_texts: Vec<String> = header
            .cells
            .iter()
            .map(|c| c.text.trim().to_string())
            .collect();
        let price_col = header_texts
            .iter()
            .position(|h| price_header_re.is_match(h));
        let Some(price_col) = price_col else {
            continue;
        };
        let desc_col = header_texts
            .iter()
            .position(|h| h.to_lowercase().contains("description"));
        let qty_col = header_texts.iter().position(|h| {
            let lower = h.to_lowercase();
            lower.contains("qty") || lower.contains("quantity")
        });
        let code_col = header_texts.iter().position(|h| {
            let lower = h.to_lowercase();
            lower.contains("code") || lower.contains("sku") || lower.contains("item")
        });

        let mut lines = Vec::new();
        for row in &table.body_rows {
            let cell = |idx: Option<usize>| -> String {
                idx.and_then(|i| row.cells.get(i))
                    .map(|c| c.text.trim().to_string())
                    .unwrap_or_default()
            };
            let price_text = cell(Some(price_col));
            let Some(price) = format_price(&price_text) else {
                continue;
            };
            let quantity = clean_quantity(&cell(qty_col));
            if quantity == 0 {
                continue;
            }
            let code = cell(code_col);
            let description = cell(desc_col);
            let full_description = if code.is_empty() {
                description
            } else {
                format!("{code} - {description}")
            };
            if full_description.trim().is_empty() {
                continue;
            }
            lines.push(ExtractedLine {
                product_code: code,
                description: full_description,
                unit_price: price,
                quantity,
            });
        }
        if !lines.is_empty() {
            return lines;
        }
    }
    Vec::new()
}

fn text_tier(text: &str) -> Vec<ExtractedLine> {
    let re = cached(
        r"(?m)^([A-Za-z0-9][A-Za-z0-9_-]{1,15})\s+(.+?)\s+(\d+)\s*(?:each|pcs?|ea)?\s*\$(\d+\.\d{2})\s*$",
    );
    let mut lines = Vec::new();
    for caps in re.captures_iter(text) {
        let code = caps[1].to_string();
        let description = caps[2].trim().to_string();
        let quantity: u32 = caps[3].parse().unwrap_or(0);
        if quantity == 0 {
            continue;
        }
        let price = format!("${}", &caps[4]);
        lines.push(ExtractedLine {
            product_code: code.clone(),
            description: format!("{code} - {description}"),
            unit_price: price,
            quantity,
        });
    }
    lines
}

/// Runs the three tiers in order (§4.3), returning the first that yields rows.
pub fn extract(doc: &StructuredDocument, trace: &mut ExtractionTrace) -> Vec<ExtractedLine> {
    let entity_lines = entity_tier(doc, trace);
    if !entity_lines.is_empty() {
        return entity_lines;
    }
    trace.record_tier_miss();

    let table_lines = table_tier(doc);
    if !table_lines.is_empty() {
        return table_lines;
    }
    trace.record_tier_miss();

    text_tier(doc.text_or_empty())
}

/// Resolves the invoice-level order date from the top-level `invoice_date` entity, if present.
pub fn invoice_date(doc: &StructuredDocument, trace: &mut ExtractionTrace) -> String {
    doc.invoice_date_entity()
        .map(|e| parse_date(&e.mention_text, trace))
        .unwrap_or_default()
}

pub fn invoice_number(doc: &StructuredDocument) -> String {
    doc.invoice_id_entity()
        .map(|e| e.mention_text.trim().to_string())
        .unwrap_or_default()
}

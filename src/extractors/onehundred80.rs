//! OneHundred80 extractor (§2 overview table: "specialized entity walk"). Structurally similar
//! to the generic entity tier, kept separate because the vendor's entity properties and table
//! layout are this vendor's own shape, not the documented-AI-default fallback ladder's.

use crate::document::{LineItemPropertyKind, StructuredDocument};
use crate::pattern_cache::cached;
use crate::row::ExtractedLine;
use crate::trace::ExtractionTrace;

fn format_price(raw: &str) -> Option<String> {
    let re = cached(r"\$?\s*(\d+(?:\.\d{1,2})?)");
    let caps = re.captures(raw)?;
    let value: f64 = caps[1].parse().ok()?;
    Some(format!("${value:.2}"))
}

/// Walks `line_item` entities, falling back to the table body when no entities are present.
pub fn extract(doc: &StructuredDocument, trace: &mut ExtractionTrace) -> Vec<ExtractedLine> {
    let mut lines = Vec::new();
    for item in doc.line_items() {
        let code = item
            .property(LineItemPropertyKind::ProductCode)
            .unwrap_or_default()
            .to_string();
        let description = item
            .property(LineItemPropertyKind::Description)
            .unwrap_or(&item.mention_text)
            .trim()
            .to_string();
        if description.is_empty() {
            trace.record_entity_parse_exception();
            continue;
        }
        let Some(price) = item
            .property(LineItemPropertyKind::UnitPrice)
            .and_then(format_price)
        else {
            trace.record_tier_miss();
            continue;
        };
        let quantity = item
            .property(LineItemPropertyKind::Quantity)
            .and_then(|q| q.trim().parse::<u32>().ok())
            .unwrap_or(1);
        let full_description = if code.is_empty() {
            description
        } else {
            format!("{code} - {description}")
        };
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

    for table in &doc.tables {
        for row in &table.body_rows {
            let texts: Vec<&str> = row.cells.iter().map(|c| c.text.trim()).collect();
            let Some(price_cell) = texts.iter().find(|t| t.contains('$')) else {
                continue;
            };
            let Some(price) = format_price(price_cell) else {
                continue;
            };
            let description = texts
                .iter()
                .find(|t| !t.contains('$') && !t.is_empty())
                .unwrap_or(&"")
                .to_string();
            if description.is_empty() {
                continue;
            }
            lines.push(ExtractedLine {
                product_code: String::new(),
                description,
                unit_price: price,
                quantity: 1,
            });
        }
    }
    lines
}

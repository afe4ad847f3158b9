//! Shared tabular-row parsing for Creative-Coop Tier 1 / Tier 1' (§4.5.3, §4.5.4): the six
//! standard numeric columns back both price and quantity extraction, so both tiers share one
//! row-parsing pass rather than re-scanning the document twice.

use crate::document::{StructuredDocument, Table};
use crate::pattern_cache::cached;

#[derive(Debug, Clone, Default)]
pub struct TabularRow {
    pub upc: String,
    pub description: String,
    pub qty_ordered: Option<u32>,
    pub qty_allocated: Option<u32>,
    pub qty_shipped: Option<u32>,
    pub qty_backordered: Option<u32>,
    pub unit: String,
    pub list_price: Option<f64>,
    pub your_price: Option<f64>,
    pub extended_price: Option<f64>,
}

fn parse_money(token: &str) -> Option<f64> {
    let cleaned = token.trim().trim_start_matches('$').replace(',', "");
    cleaned.parse::<f64>().ok()
}

fn parse_int(token: &str) -> Option<u32> {
    token.trim().parse::<u32>().ok()
}

/// A pipe-delimited row anywhere in `text`: `code | upc | description | qty_ord | qty_alloc |
/// qty_shipped | qty_bkord | unit | list | your | extd`.
pub fn find_pipe_row(text: &str, code: &str) -> Option<TabularRow> {
    for line in text.lines() {
        if !line.contains(code) || !line.contains('|') {
            continue;
        }
        let fields: Vec<&str> = line.split('|').map(|f| f.trim()).collect();
        if fields.len() < 11 {
            continue;
        }
        let code_idx = fields.iter().position(|f| f.contains(code))?;
        // The row's fixed layout assumes `code` occupies the first column; accept a small
        // leading offset (e.g. a row number column) by anchoring off the code's position.
        let base = code_idx;
        if base + 10 >= fields.len() {
            continue;
        }
        return Some(TabularRow {
            upc: fields[base + 1].to_string(),
            description: fields[base + 2].to_string(),
            qty_ordered: parse_int(fields[base + 3]),
            qty_allocated: parse_int(fields[base + 4]),
            qty_shipped: parse_int(fields[base + 5]),
            qty_backordered: parse_int(fields[base + 6]),
            unit: fields[base + 7].to_string(),
            list_price: parse_money(fields[base + 8]),
            your_price: parse_money(fields[base + 9]),
            extended_price: parse_money(fields[base + 10]),
        });
    }
    None
}

/// The same logical row emitted as one token per line: the code's line followed by up to 12
/// more lines read positionally (§4.5.3 Tier 1').
pub fn find_vertical_row(text: &str, code: &str) -> Option<TabularRow> {
    let code_re = cached(&regex::escape(code));
    let lines: Vec<&str> = text.lines().collect();
    let code_line_idx = lines.iter().position(|l| code_re.is_match(l))?;

    let mut tokens = Vec::new();
    for line in lines.iter().skip(code_line_idx + 1).take(12) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        tokens.push(trimmed);
        if tokens.len() >= 10 {
            break;
        }
    }
    if tokens.len() < 10 {
        return None;
    }

    Some(TabularRow {
        upc: tokens[0].to_string(),
        description: tokens[1].to_string(),
        qty_ordered: parse_int(tokens[2]),
        qty_allocated: parse_int(tokens[3]),
        qty_shipped: parse_int(tokens[4]),
        qty_backordered: parse_int(tokens[5]),
        unit: tokens[6].to_string(),
        list_price: parse_money(tokens[7]),
        your_price: parse_money(tokens[8]),
        extended_price: parse_money(tokens[9]),
    })
}

/// A `Table` row whose first cell contains `code`, assuming the fixed 11-column layout.
pub fn find_table_row(doc: &StructuredDocument, code: &str) -> Option<TabularRow> {
    fn row_for(table: &Table, code: &str) -> Option<TabularRow> {
        for row in &table.body_rows {
            let cells: Vec<&str> = row.cells.iter().map(|c| c.text.trim()).collect();
            if cells.len() < 11 {
                continue;
            }
            if !cells[0].contains(code) {
                continue;
            }
            return Some(TabularRow {
                upc: cells[1].to_string(),
                description: cells[2].to_string(),
                qty_ordered: parse_int(cells[3]),
                qty_allocated: parse_int(cells[4]),
                qty_shipped: parse_int(cells[5]),
                qty_backordered: parse_int(cells[6]),
                unit: cells[7].to_string(),
                list_price: parse_money(cells[8]),
                your_price: parse_money(cells[9]),
                extended_price: parse_money(cells[10]),
            });
        }
        None
    }

    doc.tables.iter().find_map(|t| row_for(t, code))
}

/// Tries pipe-delimited text, then a structured `Table`, for the Tier 1 tabular row (§4.5.3).
pub fn find_tier1_row(doc: &StructuredDocument, code: &str) -> Option<TabularRow> {
    find_pipe_row(doc.text_or_empty(), code).or_else(|| find_table_row(doc, code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pipe_delimited_row() {
        let text = "XS9826A | 123456789012 | Stoneware Bowl | 24 | 0 | 24 | 0 | ea | 3.20 | 1.60 | 38.40";
        let row = find_pipe_row(text, "XS9826A").unwrap();
        assert_eq!(row.upc, "123456789012");
        assert_eq!(row.qty_shipped, Some(24));
        assert_eq!(row.your_price, Some(1.60));
    }

    #[test]
    fn parses_vertical_row() {
        let text = "XS9482\n123456789099\nFabric Coaster\n12\n0\n12\n0\nea\n5.60\n2.80\n33.60\n";
        let row = find_vertical_row(text, "XS9482").unwrap();
        assert_eq!(row.upc, "123456789099");
        assert_eq!(row.qty_shipped, Some(12));
        assert_eq!(row.your_price, Some(2.80));
    }
}

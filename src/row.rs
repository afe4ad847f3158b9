//! Output row shape (§3) and the row assembler (§4.6).

/// One normalized line-item row, column order fixed per §3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub order_date: String,
    pub vendor: String,
    pub invoice_number: String,
    pub item_description: String,
    pub unit_price: String,
    pub quantity: String,
}

impl Row {
    /// The 6-column shape the spreadsheet collaborator expects (§3, §6).
    pub fn as_columns(&self) -> [String; 6] {
        [
            self.order_date.clone(),
            self.vendor.clone(),
            self.invoice_number.clone(),
            self.item_description.clone(),
            self.unit_price.clone(),
            self.quantity.clone(),
        ]
    }
}

/// An extractor's output before invoice-level fields are prepended: everything a vendor
/// extractor resolves about one product/line, keyed loosely by `product_code` for uniqueness
/// enforcement upstream (Creative-Coop) but otherwise just the three row-specific fields.
#[derive(Debug, Clone)]
pub struct ExtractedLine {
    pub product_code: String,
    pub description: String,
    pub unit_price: String,
    pub quantity: u32,
}

/// Prepends invoice-level fields to each extractor line and applies the final scan: drop empty
/// descriptions, drop zero quantity, force the canonical vendor name (§4.6).
pub fn assemble_rows(
    lines: Vec<ExtractedLine>,
    order_date: &str,
    vendor: &str,
    invoice_number: &str,
) -> Vec<Row> {
    let canonical_vendor = crate::normalize::canonicalize_vendor(vendor);
    lines
        .into_iter()
        .filter(|line| !line.description.trim().is_empty() && line.quantity > 0)
        .map(|line| Row {
            order_date: order_date.to_string(),
            vendor: canonical_vendor.clone(),
            invoice_number: invoice_number.to_string(),
            item_description: line.description,
            unit_price: line.unit_price,
            quantity: line.quantity.to_string(),
        })
        .collect()
}

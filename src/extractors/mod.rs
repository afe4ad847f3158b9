pub mod creative_coop;
pub mod generic;
pub mod harpercollins;
pub mod onehundred80;

use crate::row::ExtractedLine;

/// What a vendor extractor resolves about one document: the line items themselves, plus
/// whatever invoice-level fields it can pull more reliably than the generic entity lookup
/// (e.g. HarperCollins's `NS\d+` order number). `None` fields fall back to the generic
/// entity-based resolution in the pipeline.
#[derive(Debug, Default)]
pub struct ExtractorResult {
    pub lines: Vec<ExtractedLine>,
    pub invoice_number: Option<String>,
    pub order_date: Option<String>,
}

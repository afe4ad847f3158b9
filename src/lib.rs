//! The vendor-aware invoice extraction pipeline (§2): `structured-doc -> vendor_detect ->
//! dispatch(extractor) -> rows[] -> normalize -> emit`. This crate is the core graded by the
//! specification; the HTTP webhook framing, the document-AI call, and the spreadsheet append
//! live in `main.rs` as thin collaborators around `extract_rows`, the one function this library
//! exposes as its entry point.

pub mod config;
pub mod detect;
pub mod docai;
pub mod document;
pub mod error;
pub mod extractors;
pub mod normalize;
pub mod pattern_cache;
pub mod row;
pub mod sheets;
pub mod trace;

pub use detect::Vendor;
pub use document::{RawStructuredDocument, StructuredDocument};
pub use error::CoreError;
pub use row::Row;
pub use trace::ExtractionTrace;

use extractors::ExtractorResult;
use extractors::creative_coop::QualityScore;

/// The full per-request result: the emitted rows plus the observability the spec treats as
/// first-class output rather than logs (§4.5.8, Design Notes §9) — the vendor that was
/// detected, the extraction trace (tier hits and drop reasons), and, for Creative-Coop
/// documents, the quality score.
#[derive(Debug)]
pub struct ExtractionResponse {
    pub rows: Vec<Row>,
    pub vendor: Vendor,
    pub trace: ExtractionTrace,
    pub creative_coop_quality: Option<QualityScore>,
}

/// Entry point for the core (§2, §5): single-threaded and synchronous, no I/O, deterministic
/// given identical input. `raw` is the wire shape handed over by the document-AI collaborator.
///
/// Returns `Err` only for the two surfaced error kinds of §7 that originate inside the core
/// (`InputShapeError`; `BudgetExceeded` is the caller's wall-clock budget, not something this
/// function can observe itself). Every other failure mode — an unknown vendor, a tier miss, a
/// dropped row, an unparseable date, a malformed entity — is recovered locally and folded into
/// the best-effort row set plus the trace, per §7's "locally recovered" column.
pub fn extract_rows(raw: RawStructuredDocument) -> Result<ExtractionResponse, CoreError> {
    if raw.text.is_none() && raw.entities.is_empty() {
        return Err(CoreError::InputShapeError(
            "structured document has neither text nor entities".to_string(),
        ));
    }

    let doc = StructuredDocument::from_raw(raw);
    let mut trace = ExtractionTrace::new();

    let vendor = detect::detect_vendor(doc.text_or_empty());
    if vendor == Vendor::Generic {
        trace.vendor_unknown = true;
    }

    let (extractor_result, creative_coop_quality) = dispatch(&doc, vendor, &mut trace);

    let order_date = extractor_result
        .order_date
        .clone()
        .unwrap_or_else(|| extractors::generic::invoice_date(&doc, &mut trace));
    let invoice_number = extractor_result
        .invoice_number
        .clone()
        .unwrap_or_else(|| extractors::generic::invoice_number(&doc));

    // Generic falls back to the document's own supplier_name entity when the collaborator
    // recognized one, rather than emitting the literal "Generic" vendor label.
    let vendor_name = if vendor == Vendor::Generic {
        doc.supplier_name_entity()
            .map(|s| s.mention_text.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| vendor.canonical_name())
    } else {
        vendor.canonical_name()
    };

    let rows = row::assemble_rows(
        extractor_result.lines,
        &order_date,
        vendor_name,
        &invoice_number,
    );

    Ok(ExtractionResponse {
        rows,
        vendor,
        trace,
        creative_coop_quality,
    })
}

/// Dispatches to the vendor-specific extractor (§2 "dispatch(extractor)"). Every branch returns
/// an `ExtractorResult` uniformly; only Creative-Coop additionally produces a quality score.
fn dispatch(
    doc: &StructuredDocument,
    vendor: Vendor,
    trace: &mut ExtractionTrace,
) -> (ExtractorResult, Option<QualityScore>) {
    match vendor {
        Vendor::CreativeCoop => {
            let (result, quality) = extractors::creative_coop::extract(doc, trace);
            (result, Some(quality))
        }
        Vendor::HarperCollins => {
            let result = extractors::harpercollins::extract(doc.text_or_empty(), trace)
                .unwrap_or_default();
            (result, None)
        }
        Vendor::OneHundred80 => {
            let lines = extractors::onehundred80::extract(doc, trace);
            (
                ExtractorResult {
                    lines,
                    ..Default::default()
                },
                None,
            )
        }
        Vendor::RiflePaper | Vendor::Generic => {
            let lines = extractors::generic::extract(doc, trace);
            (
                ExtractorResult {
                    lines,
                    ..Default::default()
                },
                None,
            )
        }
    }
}

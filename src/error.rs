//! Error kinds per §7. Surfaced kinds propagate to the caller as `CoreError`; locally recovered
//! kinds are tallied on `ExtractionTrace` (see `trace.rs`) instead of being thrown.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("structured document missing required field: {0}")]
    InputShapeError(String),
    #[error("extraction exceeded its wall-clock budget")]
    BudgetExceeded,
    /// Any I/O error surfaced by a collaborator (document-AI call, spreadsheet append, or the
    /// webhook's own file download) — never raised by the core itself (§7).
    #[error("collaborator I/O error: {0}")]
    CollaboratorError(String),
}

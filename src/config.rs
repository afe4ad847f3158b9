//! Configuration from environment variables (§6, SPEC_FULL.md A.3), following the teacher's
//! `dotenv` + `env::var` pattern (`pdf_to_airtable::main`, `pdf_air`'s `Config::from_env`).

use std::env;

use crate::error::CoreError;

#[derive(Debug, Clone)]
pub struct Config {
    pub google_cloud_project_id: String,
    pub document_ai_processor_id: String,
    pub google_cloud_location: String,
    pub google_sheets_spreadsheet_id: String,
    pub google_sheets_sheet_name: String,
}

impl Config {
    /// Reads the five variables of §6. The two required ids surface a `CoreError` when absent;
    /// the two with documented defaults (`"us"`, `"Sheet1"`) fall back silently.
    pub fn from_env() -> Result<Self, CoreError> {
        let google_cloud_project_id = env::var("GOOGLE_CLOUD_PROJECT_ID")
            .map_err(|_| CoreError::CollaboratorError("GOOGLE_CLOUD_PROJECT_ID not set".to_string()))?;
        let document_ai_processor_id = env::var("DOCUMENT_AI_PROCESSOR_ID")
            .map_err(|_| CoreError::CollaboratorError("DOCUMENT_AI_PROCESSOR_ID not set".to_string()))?;
        let google_sheets_spreadsheet_id = env::var("GOOGLE_SHEETS_SPREADSHEET_ID").map_err(|_| {
            CoreError::CollaboratorError("GOOGLE_SHEETS_SPREADSHEET_ID not set".to_string())
        })?;
        let google_cloud_location = env::var("GOOGLE_CLOUD_LOCATION").unwrap_or_else(|_| "us".to_string());
        let google_sheets_sheet_name =
            env::var("GOOGLE_SHEETS_SHEET_NAME").unwrap_or_else(|_| "Sheet1".to_string());

        Ok(Self {
            google_cloud_project_id,
            document_ai_processor_id,
            google_cloud_location,
            google_sheets_spreadsheet_id,
            google_sheets_sheet_name,
        })
    }
}

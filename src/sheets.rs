//! The spreadsheet collaborator (§6 output boundary): append rows to a named sheet range
//! `B:G`, six columns per row. Out of the core's scope per §1; grounded on the same
//! `reqwest::Client` + bearer-auth recipe as `docai.rs` and the teacher's own
//! `upload_to_airtable`.

use reqwest::Client;
use serde_json::json;

use crate::config::Config;
use crate::error::CoreError;
use crate::row::Row;

#[async_trait::async_trait]
pub trait SheetsClient: Send + Sync {
    async fn append_rows(&self, rows: &[Row]) -> Result<(), CoreError>;
}

pub struct GoogleSheetsClient {
    client: Client,
    config: Config,
    access_token: String,
}

impl GoogleSheetsClient {
    pub fn new(config: Config, access_token: String) -> Self {
        Self {
            client: Client::new(),
            config,
            access_token,
        }
    }

    fn append_url(&self) -> String {
        let range = format!("{}!B:G", self.config.google_sheets_sheet_name);
        format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}:append?valueInputOption=USER_ENTERED",
            self.config.google_sheets_spreadsheet_id, range,
        )
    }
}

#[async_trait::async_trait]
impl SheetsClient for GoogleSheetsClient {
    async fn append_rows(&self, rows: &[Row]) -> Result<(), CoreError> {
        if rows.is_empty() {
            return Ok(());
        }

        let values: Vec<[String; 6]> = rows.iter().map(|row| row.as_columns()).collect();
        let body = json!({ "values": values });

        let response = self
            .client
            .post(self.append_url())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::CollaboratorError(format!("sheets append failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CoreError::CollaboratorError(format!(
                "sheets append returned {status}: {text}"
            )));
        }

        Ok(())
    }
}

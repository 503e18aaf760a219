use log::debug;
use reqwest::Url;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::Path;
use std::time::Duration;
use viscose_types::CellRef;

use super::{Grid, SheetTransport};
use crate::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_BODY: usize = 512;

/// Google Sheets v4 REST transport authenticated with a bearer token
#[derive(Clone)]
pub struct GoogleSheetsTransport {
    client: Client,
    base_url: Url,
    spreadsheet_id: String,
    token: String,
}

impl std::fmt::Debug for GoogleSheetsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheetsTransport")
            .field("base_url", &self.base_url.as_str())
            .field("spreadsheet_id", &self.spreadsheet_id)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl GoogleSheetsTransport {
    pub fn new(spreadsheet_id: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let spreadsheet_id = spreadsheet_id.into();
        let token = token.into().trim().to_string();

        if spreadsheet_id.trim().is_empty() {
            return Err(Error::Config("spreadsheet_id is empty".to_string()));
        }
        if token.is_empty() {
            return Err(Error::Auth("access token is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("viscose/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url = Url::parse(DEFAULT_BASE_URL)
            .map_err(|e| Error::Config(format!("invalid base URL: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            spreadsheet_id,
            token,
        })
    }

    /// Read the bearer token from a file (surrounding whitespace ignored).
    pub fn from_token_file(spreadsheet_id: impl Into<String>, path: &Path) -> Result<Self> {
        let token = std::fs::read_to_string(path).map_err(|e| {
            Error::Auth(format!("cannot read access token file {}: {}", path.display(), e))
        })?;
        Self::new(spreadsheet_id, token)
    }

    /// Point the client at another API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url =
            Url::parse(base_url).map_err(|e| Error::Config(format!("invalid base URL: {}", e)))?;
        Ok(self)
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn url(&self, tail: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::Config(format!("base URL cannot be a base: {}", self.base_url)))?;
            segments.pop_if_empty();
            segments.push("spreadsheets");
            segments.push(&self.spreadsheet_id);
            segments.extend(tail);
        }
        Ok(url)
    }

    fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let mut body = response.text().unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(Error::Status {
            code: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}

/// A1 range naming a whole worksheet, quoted so any title is valid.
fn sheet_range(worksheet: &str) -> String {
    format!("'{}'", worksheet.replace('\'', "''"))
}

fn cell_range(worksheet: &str, cell: CellRef) -> String {
    format!("{}!{}", sheet_range(worksheet), cell.to_a1())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

impl SheetTransport for GoogleSheetsTransport {
    fn worksheet_names(&self) -> Result<Vec<String>> {
        let url = self.url(&[])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("fields", "sheets.properties.title")])
            .send()?;
        let meta: SpreadsheetMeta = serde_json::from_str(&Self::check(response)?.text()?)?;

        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    fn read_grid(&self, worksheet: &str) -> Result<Grid> {
        let range = sheet_range(worksheet);
        let url = self.url(&["values", &range])?;
        debug!("Reading {}", range);

        let response = self.client.get(url).bearer_auth(&self.token).send()?;
        let values: ValueRange = serde_json::from_str(&Self::check(response)?.text()?)?;

        Ok(values
            .values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }

    fn write_cell(&self, worksheet: &str, cell: CellRef, value: f64) -> Result<()> {
        let range = cell_range(worksheet, cell);
        let url = self.url(&["values", &range])?;
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [[json_number(value)]],
        });

        let response = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body)
            .send()?;
        Self::check(response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_token() {
        let err = GoogleSheetsTransport::new("sheet", "  \n").unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn test_value_url_escapes_worksheet_title() {
        let transport = GoogleSheetsTransport::new("abc123", "token").unwrap();
        let url = transport
            .url(&["values", &cell_range("Ben's Sheet/2", CellRef::new(4, 2))])
            .unwrap();

        assert!(url.as_str().starts_with("https://sheets.googleapis.com/v4/spreadsheets/abc123/values/"));
        assert!(url.as_str().ends_with("'Ben''s%20Sheet%2F2'!C5"));
    }

    #[test]
    fn test_custom_base_url_without_trailing_slash() {
        let transport = GoogleSheetsTransport::new("id", "token")
            .unwrap()
            .with_base_url("http://127.0.0.1:9/v4")
            .unwrap();
        assert_eq!(
            transport.url(&[]).unwrap().as_str(),
            "http://127.0.0.1:9/v4/spreadsheets/id"
        );
    }

    #[test]
    fn test_cell_text_conversion() {
        assert_eq!(cell_text(&json!("Pasu")), "Pasu");
        assert_eq!(cell_text(&json!(120)), "120");
        assert_eq!(cell_text(&Value::Null), "");
    }

    #[test]
    fn test_integral_scores_sent_as_integers() {
        assert_eq!(json_number(130.0), json!(130));
        assert_eq!(json_number(98.5), json!(98.5));
    }
}

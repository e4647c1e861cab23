//! Google Sheets ストア
//!
//! Sheets API v4 の values エンドポイントを使用:
//! - 読み込み: GET values/{'シート'}
//! - 上書き: POST values/{'シート'}:clear → PUT values/{'シート'}?valueInputOption=RAW

use super::SpreadsheetStore;
use crate::error::{AuditError, Result};
use async_trait::async_trait;
use checklist_audit_common::SheetData;
use reqwest::Url;
use serde::{Deserialize, Serialize};

const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: Vec<Vec<String>>,
}

pub struct GoogleSheetsStore {
    client: reqwest::Client,
    spreadsheet_id: String,
    access_token: String,
    base_url: String,
}

impl GoogleSheetsStore {
    pub fn new(spreadsheet_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            spreadsheet_id: spreadsheet_id.into(),
            access_token: access_token.into(),
            base_url: SHEETS_API_URL.to_string(),
        }
    }

    /// APIのベースURLを差し替える（検証環境用）
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// シート全体を指すA1表記の範囲
    pub fn sheet_range(sheet: &str) -> String {
        format!("'{}'", sheet.replace('\'', "''"))
    }

    fn values_url(&self, segment: &str) -> std::result::Result<Url, String> {
        let mut url = Url::parse(&self.base_url).map_err(|e| e.to_string())?;
        url.path_segments_mut()
            .map_err(|_| "ベースURLが不正です".to_string())?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .push("values")
            .push(segment);
        Ok(url)
    }
}

/// セル値を文字列化（数値・真偽値も表示どおりに）
fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    format!("HTTP {}: {}", status, text.trim())
}

#[async_trait]
impl SpreadsheetStore for GoogleSheetsStore {
    fn backend_tag(&self) -> &'static str {
        "google-sheets"
    }

    async fn read_all(&self, sheet: &str) -> Result<SheetData> {
        let range = Self::sheet_range(sheet);
        let url = self.values_url(&range).map_err(AuditError::SourceUnavailable)?;
        tracing::debug!(%url, "sheets read");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| AuditError::SourceUnavailable(format!("{}: {}", sheet, e)))?;

        if !response.status().is_success() {
            return Err(AuditError::SourceUnavailable(format!(
                "{}: {}",
                sheet,
                error_body(response).await
            )));
        }

        let payload: ValueRange = response
            .json()
            .await
            .map_err(|e| AuditError::SourceUnavailable(format!("{}: レスポンス解析失敗 ({})", sheet, e)))?;

        let raw = payload
            .values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        Ok(SheetData::from_raw_rows(raw))
    }

    async fn overwrite(&self, sheet: &str, data: &SheetData) -> Result<()> {
        let range = Self::sheet_range(sheet);

        let clear_url = self
            .values_url(&format!("{}:clear", range))
            .map_err(AuditError::Persistence)?;
        tracing::debug!(%clear_url, "sheets clear");

        let response = self
            .client
            .post(clear_url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| AuditError::Persistence(format!("{}: {}", sheet, e)))?;

        if !response.status().is_success() {
            return Err(AuditError::Persistence(format!(
                "{}: {}",
                sheet,
                error_body(response).await
            )));
        }

        let mut update_url = self.values_url(&range).map_err(AuditError::Persistence)?;
        update_url
            .query_pairs_mut()
            .append_pair("valueInputOption", "RAW");

        let body = ValueRangeBody {
            range: &range,
            major_dimension: "ROWS",
            values: data.to_values(),
        };
        tracing::debug!(%update_url, rows = data.len(), "sheets update");

        let response = self
            .client
            .put(update_url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuditError::Persistence(format!("{}: {}", sheet, e)))?;

        if !response.status().is_success() {
            return Err(AuditError::Persistence(format!(
                "{}: {}",
                sheet,
                error_body(response).await
            )));
        }

        Ok(())
    }
}

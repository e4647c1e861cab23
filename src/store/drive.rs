//! Google Drive ストア（写真アップロード）
//!
//! multipart/related で metadata(JSON) + 本体を1リクエストで送信する。

use super::{ObjectStore, PhotoBlob};
use crate::error::{AuditError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart&fields=id";
const MULTIPART_BOUNDARY: &str = "checklist-audit-photo-boundary";

#[derive(Deserialize)]
struct UploadedFile {
    id: String,
}

/// 閲覧URL
pub fn viewer_url(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/view", file_id)
}

/// フォルダURLからフォルダIDを取り出す（IDそのものはそのまま返す）
///
/// 例: `https://drive.google.com/drive/folders/1hwT-4Xs?hl=fr` → `1hwT-4Xs`
pub fn extract_folder_id(folder: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref FOLDER_URL_RE: Regex = Regex::new(r"/folders/([A-Za-z0-9_-]+)").unwrap();
        static ref FOLDER_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
    }

    let trimmed = folder.trim().trim_start_matches('<').trim_end_matches('>');

    if let Some(caps) = FOLDER_URL_RE.captures(trimmed) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }
    if FOLDER_ID_RE.is_match(trimmed) {
        return Some(trimmed.to_string());
    }
    None
}

/// multipart/related のリクエスト本体
fn multipart_body(blob: &PhotoBlob, folder_id: &str) -> Vec<u8> {
    let metadata = serde_json::json!({
        "name": blob.file_name,
        "parents": [folder_id],
    });

    let mut body = Vec::with_capacity(blob.data.len() + 512);
    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", blob.mime_type).as_bytes());
    body.extend_from_slice(&blob.data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

pub struct GoogleDriveStore {
    client: reqwest::Client,
    access_token: String,
    upload_url: String,
}

impl GoogleDriveStore {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.into(),
            upload_url: DRIVE_UPLOAD_URL.to_string(),
        }
    }

    pub fn with_upload_url(mut self, upload_url: impl Into<String>) -> Self {
        self.upload_url = upload_url.into();
        self
    }
}

#[async_trait]
impl ObjectStore for GoogleDriveStore {
    fn backend_tag(&self) -> &'static str {
        "google-drive"
    }

    async fn upload(&self, blob: &PhotoBlob, folder_id: &str) -> Result<String> {
        let folder = extract_folder_id(folder_id)
            .ok_or_else(|| AuditError::Upload(format!("フォルダIDが不正です: {}", folder_id)))?;
        tracing::debug!(file = %blob.file_name, %folder, bytes = blob.data.len(), "drive upload");

        let response = self
            .client
            .post(&self.upload_url)
            .bearer_auth(&self.access_token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(multipart_body(blob, &folder))
            .send()
            .await
            .map_err(|e| AuditError::Upload(format!("{}: {}", blob.file_name, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AuditError::Upload(format!(
                "{}: HTTP {}: {}",
                blob.file_name,
                status,
                text.trim()
            )));
        }

        let uploaded: UploadedFile = response
            .json()
            .await
            .map_err(|e| AuditError::Upload(format!("{}: レスポンス解析失敗 ({})", blob.file_name, e)))?;

        Ok(uploaded.id)
    }

    fn viewer_url(&self, file_id: &str) -> String {
        viewer_url(file_id)
    }
}

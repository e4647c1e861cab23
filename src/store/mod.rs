//! 外部ストア（スプレッドシート・写真保存先）
//!
//! - SpreadsheetStore: シート単位の全行読み込み / 全範囲上書き
//! - ObjectStore: 写真アップロードと閲覧URLの生成
//!
//! 各コンポーネントはトレイト経由で受け取り、テストではメモリ実装に差し替える。

pub mod drive;
pub mod folder;
pub mod memory;
pub mod sheets;
pub mod workbook;

use crate::config::{Backend, Config};
use crate::error::{AuditError, Result};
use async_trait::async_trait;
use checklist_audit_common::SheetData;
use std::path::Path;
use std::sync::Arc;

pub use drive::GoogleDriveStore;
pub use folder::LocalFolderStore;
pub use memory::{MemoryObjectStore, MemorySheetStore};
pub use sheets::GoogleSheetsStore;
pub use workbook::LocalWorkbookStore;

#[async_trait]
pub trait SpreadsheetStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// シートの全行を読み込む（失敗時は SourceUnavailable）
    async fn read_all(&self, sheet: &str) -> Result<SheetData>;

    /// シートの使用範囲をヘッダー + 全行で置き換える（失敗時は Persistence）
    async fn overwrite(&self, sheet: &str, data: &SheetData) -> Result<()>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// 写真をフォルダにアップロードしてファイルIDを返す（失敗時は Upload）
    async fn upload(&self, blob: &PhotoBlob, folder_id: &str) -> Result<String>;

    /// ファイルIDから閲覧URLを生成
    fn viewer_url(&self, file_id: &str) -> String;
}

/// アップロードする写真データ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoBlob {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

const ACCEPTED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png"];

impl PhotoBlob {
    /// バイト列から生成（形式を判定し、JPEG/PNG以外は拒否）
    pub fn from_bytes(file_name: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let format = image::guess_format(&data)
            .map_err(|e| AuditError::Upload(format!("{}: 画像形式を判定できません ({})", file_name, e)))?;
        let mime_type = format.to_mime_type();

        if !ACCEPTED_MIME_TYPES.contains(&mime_type) {
            return Err(AuditError::Upload(format!(
                "{}: 対応していない画像形式です ({})",
                file_name, mime_type
            )));
        }

        Ok(Self {
            file_name,
            mime_type: mime_type.to_string(),
            data,
        })
    }

    /// ファイルから読み込み
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| AuditError::Upload(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "photo".to_string());
        Self::from_bytes(file_name, data)
    }
}

/// 設定に応じたストアを生成
pub fn build_stores(config: &Config) -> Result<(Arc<dyn SpreadsheetStore>, Arc<dyn ObjectStore>)> {
    config.validate()?;

    match config.backend {
        Backend::Google => {
            let token = config.get_access_token()?;
            let sheets: Arc<dyn SpreadsheetStore> =
                Arc::new(GoogleSheetsStore::new(config.spreadsheet_id.clone(), token.clone()));
            let objects: Arc<dyn ObjectStore> = Arc::new(GoogleDriveStore::new(token));
            Ok((sheets, objects))
        }
        Backend::Local => {
            // 写真はワークブックと同じ場所の photo_folder 配下に保存
            let root = config
                .workbook_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            let sheets: Arc<dyn SpreadsheetStore> =
                Arc::new(LocalWorkbookStore::new(config.workbook_path.clone()));
            let objects: Arc<dyn ObjectStore> = Arc::new(LocalFolderStore::new(root));
            Ok((sheets, objects))
        }
    }
}

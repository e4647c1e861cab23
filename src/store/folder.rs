//! ローカルフォルダへの写真保存

use super::{ObjectStore, PhotoBlob};
use crate::error::{AuditError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub struct LocalFolderStore {
    root: PathBuf,
}

impl LocalFolderStore {
    /// `root` 配下にフォルダIDごとのサブフォルダを作る
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, file_id: &str) -> PathBuf {
        self.root.join(file_id)
    }
}

/// パス区切り等を除いたファイル名
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' || c == ':' || c.is_control() { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('.').trim().to_string();
    if cleaned.is_empty() {
        "photo".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl ObjectStore for LocalFolderStore {
    fn backend_tag(&self) -> &'static str {
        "local-folder"
    }

    async fn upload(&self, blob: &PhotoBlob, folder_id: &str) -> Result<String> {
        let folder = sanitize_file_name(folder_id);
        let file_id = format!(
            "{}/{}-{}",
            folder,
            uuid::Uuid::new_v4().simple(),
            sanitize_file_name(&blob.file_name)
        );
        let path = self.file_path(&file_id);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AuditError::Upload(format!("{}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&path, &blob.data)
            .await
            .map_err(|e| AuditError::Upload(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), "photo stored");
        Ok(file_id)
    }

    fn viewer_url(&self, file_id: &str) -> String {
        let path = self.file_path(file_id);
        let absolute = std::path::absolute(&path).unwrap_or(path);
        format!("file://{}", absolute.display().to_string().replace('\\', "/"))
    }
}

//! メモリ上のストア実装
//!
//! テストと `--dry-run` で使用。上書き・アップロードの呼び出しを記録し、
//! 失敗を注入できる。

use super::{ObjectStore, PhotoBlob, SpreadsheetStore};
use crate::error::{AuditError, Result};
use async_trait::async_trait;
use checklist_audit_common::SheetData;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemorySheetStore {
    sheets: Mutex<HashMap<String, SheetData>>,
    writes: Mutex<Vec<(String, SheetData)>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(self, name: &str, data: SheetData) -> Self {
        self.put(name, data);
        self
    }

    pub fn put(&self, name: &str, data: SheetData) {
        if let Ok(mut sheets) = self.sheets.lock() {
            sheets.insert(name.to_string(), data);
        }
    }

    pub fn sheet(&self, name: &str) -> Option<SheetData> {
        self.sheets.lock().ok().and_then(|s| s.get(name).cloned())
    }

    /// これまでの上書き呼び出し（シート名, データ）
    pub fn writes(&self) -> Vec<(String, SheetData)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SpreadsheetStore for MemorySheetStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn read_all(&self, sheet: &str) -> Result<SheetData> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AuditError::SourceUnavailable(format!("{}: 読み込み失敗（注入）", sheet)));
        }
        self.sheet(sheet)
            .ok_or_else(|| AuditError::SourceUnavailable(format!("シート '{}' がありません", sheet)))
    }

    async fn overwrite(&self, sheet: &str, data: &SheetData) -> Result<()> {
        if let Ok(mut writes) = self.writes.lock() {
            writes.push((sheet.to_string(), data.clone()));
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AuditError::Persistence(format!("{}: 書き込み失敗（注入）", sheet)));
        }
        self.put(sheet, data.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryObjectStore {
    files: Mutex<HashMap<String, (String, PhotoBlob)>>,
    next_id: AtomicU64,
    pub fail_uploads: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn upload_count(&self) -> usize {
        self.files.lock().map(|f| f.len()).unwrap_or(0)
    }

    /// ファイルIDから (フォルダ, 写真) を取得
    pub fn file(&self, file_id: &str) -> Option<(String, PhotoBlob)> {
        self.files.lock().ok().and_then(|f| f.get(file_id).cloned())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn upload(&self, blob: &PhotoBlob, folder_id: &str) -> Result<String> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AuditError::Upload(format!("{}: アップロード失敗（注入）", blob.file_name)));
        }
        let id = format!("mem-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        if let Ok(mut files) = self.files.lock() {
            files.insert(id.clone(), (folder_id.to_string(), blob.clone()));
        }
        Ok(id)
    }

    fn viewer_url(&self, file_id: &str) -> String {
        format!("memory://{}", file_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sheet_store_overwrite_then_read() {
        let store = MemorySheetStore::new();
        let data = SheetData::new(vec!["Zone".into()], vec![vec!["A".into()]]);

        store.overwrite("resultat", &data).await.unwrap();
        assert_eq!(store.read_all("resultat").await.unwrap(), data);
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_sheet_store_failures() {
        let store = MemorySheetStore::new();
        assert!(matches!(
            store.read_all("missing").await,
            Err(AuditError::SourceUnavailable(_))
        ));

        store.set_fail_writes(true);
        let err = store.overwrite("x", &SheetData::default()).await.unwrap_err();
        assert!(matches!(err, AuditError::Persistence(_)));
        assert!(store.sheet("x").is_none());
        // 失敗した呼び出しも記録される
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_object_store_ids_are_unique() {
        let store = MemoryObjectStore::new();
        let blob = PhotoBlob {
            file_name: "a.jpg".into(),
            mime_type: "image/jpeg".into(),
            data: vec![1, 2, 3],
        };
        let a = store.upload(&blob, "folder").await.unwrap();
        let b = store.upload(&blob, "folder").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.upload_count(), 2);
        assert_eq!(store.viewer_url(&a), format!("memory://{}", a));
    }
}

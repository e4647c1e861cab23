//! ローカル .xlsx ファイルをスプレッドシートストアとして使う
//!
//! 上書き時は全シートを読み直し、対象シートだけ差し替えてブックを書き直す。

use super::SpreadsheetStore;
use crate::error::{AuditError, Result};
use crate::importer::range_to_rows;
use async_trait::async_trait;
use calamine::{open_workbook_auto, Reader};
use checklist_audit_common::export::excel_core::generate_workbook_buffer;
use checklist_audit_common::SheetData;
use std::path::{Path, PathBuf};

pub struct LocalWorkbookStore {
    path: PathBuf,
}

impl LocalWorkbookStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 全シートを (名前, データ) で読み込む
    fn read_sheets(&self) -> std::result::Result<Vec<(String, SheetData)>, String> {
        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|e| format!("{}: {}", self.path.display(), e))?;

        let names = workbook.sheet_names();
        let mut sheets = Vec::with_capacity(names.len());
        for name in names {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| format!("{} [{}]: {}", self.path.display(), name, e))?;
            sheets.push((name, SheetData::from_raw_rows(range_to_rows(&range))));
        }
        Ok(sheets)
    }
}

#[async_trait]
impl SpreadsheetStore for LocalWorkbookStore {
    fn backend_tag(&self) -> &'static str {
        "local-workbook"
    }

    async fn read_all(&self, sheet: &str) -> Result<SheetData> {
        if !self.path.exists() {
            return Err(AuditError::SourceUnavailable(format!(
                "ファイルが見つかりません: {}",
                self.path.display()
            )));
        }

        let sheets = self.read_sheets().map_err(AuditError::SourceUnavailable)?;
        sheets
            .into_iter()
            .find(|(name, _)| name == sheet)
            .map(|(_, data)| data)
            .ok_or_else(|| {
                AuditError::SourceUnavailable(format!(
                    "{}: シート '{}' がありません",
                    self.path.display(),
                    sheet
                ))
            })
    }

    async fn overwrite(&self, sheet: &str, data: &SheetData) -> Result<()> {
        let mut sheets = if self.path.exists() {
            self.read_sheets().map_err(AuditError::Persistence)?
        } else {
            Vec::new()
        };

        match sheets.iter_mut().find(|(name, _)| name == sheet) {
            Some((_, existing)) => *existing = data.clone(),
            None => sheets.push((sheet.to_string(), data.clone())),
        }

        let buffer = generate_workbook_buffer(&sheets).map_err(AuditError::Persistence)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| AuditError::Persistence(format!("{}: {}", parent.display(), e)))?;
        }

        // 一時ファイルに書いてから置き換え
        let temp_path = self.path.with_extension("xlsx.tmp");
        std::fs::write(&temp_path, &buffer)
            .map_err(|e| AuditError::Persistence(format!("{}: {}", temp_path.display(), e)))?;
        std::fs::rename(&temp_path, &self.path)
            .map_err(|e| AuditError::Persistence(format!("{}: {}", self.path.display(), e)))?;

        tracing::debug!(path = %self.path.display(), sheet, rows = data.len(), "workbook sheet overwritten");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_source_unavailable() {
        let store = LocalWorkbookStore::new("/nonexistent/checklists.xlsx");
        let err = store.read_all("LISTCONTROLE").await.unwrap_err();
        assert!(matches!(err, AuditError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_overwrite_creates_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalWorkbookStore::new(dir.path().join("checklists.xlsx"));
        let data = SheetData::new(
            vec!["Zone".into(), "Critère".into()],
            vec![vec!["A".into(), "C1".into()]],
        );

        store.overwrite("LISTCONTROLE", &data).await.unwrap();
        assert!(store.path().exists());
        assert!(!dir.path().join("checklists.xlsx.tmp").exists());
    }
}

//! チェックリスト読み込み・差し替え・保存

use crate::error::Result;
use crate::importer;
use crate::store::SpreadsheetStore;
use checklist_audit_common::ChecklistTable;
use std::path::Path;

pub struct ChecklistLoader<'a> {
    store: &'a dyn SpreadsheetStore,
    sheet: &'a str,
    zone_column: &'a str,
    criterion_column: &'a str,
}

impl<'a> ChecklistLoader<'a> {
    pub fn new(
        store: &'a dyn SpreadsheetStore,
        sheet: &'a str,
        zone_column: &'a str,
        criterion_column: &'a str,
    ) -> Self {
        Self {
            store,
            sheet,
            zone_column,
            criterion_column,
        }
    }

    /// 定義シートを読み込む
    pub async fn load(&self) -> Result<ChecklistTable> {
        let sheet = self.store.read_all(self.sheet).await?;
        let table = ChecklistTable::from_sheet(&sheet, self.zone_column, self.criterion_column)?;
        tracing::info!(
            backend = self.store.backend_tag(),
            sheet = self.sheet,
            rows = table.len(),
            "checklist loaded"
        );
        Ok(table)
    }

    /// アップロードされたファイルからテーブルを作る（ストアには書き込まない）
    pub fn replace(&self, path: &Path) -> Result<ChecklistTable> {
        let sheet = importer::import_table(path)?;
        let table = ChecklistTable::from_sheet(&sheet, self.zone_column, self.criterion_column)?;
        tracing::info!(path = %path.display(), rows = table.len(), "checklist replaced from file");
        Ok(table)
    }

    /// 定義シートをヘッダー + 全行で上書き
    pub async fn save(&self, table: &ChecklistTable) -> Result<()> {
        self.store.overwrite(self.sheet, &table.to_sheet()).await?;
        tracing::info!(sheet = self.sheet, rows = table.len(), "checklist saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditError;
    use crate::store::MemorySheetStore;
    use checklist_audit_common::SheetData;

    fn definition() -> SheetData {
        SheetData::new(
            vec!["Zone".into(), "Critère".into()],
            vec![
                vec!["A".into(), "C1".into()],
                vec!["B".into(), "C2".into()],
            ],
        )
    }

    #[tokio::test]
    async fn test_load_reads_definition_sheet() {
        let store = MemorySheetStore::new().with_sheet("LISTCONTROLE", definition());
        let loader = ChecklistLoader::new(&store, "LISTCONTROLE", "Zone", "Critère");

        let table = loader.load().await.unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.list_zones(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_load_failure_is_source_unavailable() {
        let store = MemorySheetStore::new().with_sheet("LISTCONTROLE", definition());
        store.set_fail_reads(true);
        let loader = ChecklistLoader::new(&store, "LISTCONTROLE", "Zone", "Critère");

        assert!(matches!(loader.load().await, Err(AuditError::SourceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_load_wrong_columns_is_schema_error() {
        let store = MemorySheetStore::new().with_sheet("LISTCONTROLE", definition());
        let loader = ChecklistLoader::new(&store, "LISTCONTROLE", "Secteur", "Critère");

        assert!(matches!(loader.load().await, Err(AuditError::Common(_))));
    }

    #[tokio::test]
    async fn test_replace_does_not_touch_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nouvelle.csv");
        std::fs::write(&path, "Zone,Critère\nC,C9\n").unwrap();

        let store = MemorySheetStore::new();
        let loader = ChecklistLoader::new(&store, "LISTCONTROLE", "Zone", "Critère");

        let table = loader.replace(&path).unwrap();
        assert_eq!(table.list_zones(), vec!["C"]);
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_save_overwrites_with_header() {
        let store = MemorySheetStore::new().with_sheet("LISTCONTROLE", definition());
        let loader = ChecklistLoader::new(&store, "LISTCONTROLE", "Zone", "Critère");
        let table = loader.load().await.unwrap();

        loader.save(&table).await.unwrap();
        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "LISTCONTROLE");
        assert_eq!(writes[0].1, definition());
    }

    #[tokio::test]
    async fn test_save_failure_is_persistence_error() {
        let store = MemorySheetStore::new();
        store.set_fail_writes(true);
        let loader = ChecklistLoader::new(&store, "LISTCONTROLE", "Zone", "Critère");

        let err = loader.save(&ChecklistTable::default()).await.unwrap_err();
        assert!(matches!(err, AuditError::Persistence(_)));
    }
}

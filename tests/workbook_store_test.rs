//! ローカルワークブックの読み書きテスト

use checklist_audit::importer;
use checklist_audit::loader::ChecklistLoader;
use checklist_audit::store::{LocalWorkbookStore, SpreadsheetStore};
use checklist_audit_common::export::excel_core::generate_workbook_buffer;
use checklist_audit_common::SheetData;
use tempfile::tempdir;

fn definition() -> SheetData {
    SheetData::new(
        vec!["Zone".into(), "Critère".into(), "Référence".into()],
        vec![
            vec!["Cuisine".into(), "Extincteur présent".into(), "R-01".into()],
            vec!["Cuisine".into(), "Hotte propre".into(), "".into()],
            vec!["Hall".into(), "Issue de secours dégagée".into(), "R-07".into()],
        ],
    )
}

/// 書いたシートをそのまま読み戻せる
#[tokio::test]
async fn test_overwrite_then_read_all() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = LocalWorkbookStore::new(dir.path().join("checklists.xlsx"));

    store.overwrite("LISTCONTROLE", &definition()).await.unwrap();
    let read = store.read_all("LISTCONTROLE").await.unwrap();

    assert_eq!(read.header, definition().header);
    assert_eq!(read.len(), 3);
    assert_eq!(read.cell(0, 1), "Extincteur présent");
    assert_eq!(read.cell(1, 2), "");
}

/// 対象シート以外は保持される
#[tokio::test]
async fn test_overwrite_preserves_other_sheets() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = LocalWorkbookStore::new(dir.path().join("checklists.xlsx"));

    store.overwrite("LISTCONTROLE", &definition()).await.unwrap();

    let results = SheetData::new(vec!["Zone".into(), "Conformité".into()], vec![vec!["Hall".into(), "Conforme".into()]]);
    store.overwrite("resultat", &results).await.unwrap();

    // 2回目の上書きで結果シートは置き換わる（追記されない）
    let replaced = SheetData::new(vec!["Zone".into(), "Conformité".into()], vec![]);
    store.overwrite("resultat", &replaced).await.unwrap();

    assert_eq!(store.read_all("LISTCONTROLE").await.unwrap().len(), 3);
    let read = store.read_all("resultat").await.unwrap();
    assert!(read.is_empty());
    assert_eq!(read.header, replaced.header);
}

/// 生成したブックをインポートしてチェックリストにできる
#[tokio::test]
async fn test_import_generated_workbook() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("import.xlsx");
    let buffer = generate_workbook_buffer(&[("Feuil1".to_string(), definition())]).unwrap();
    std::fs::write(&path, buffer).unwrap();

    let sheet = importer::import_table(&path).unwrap();
    assert_eq!(sheet.len(), 3);

    let store = LocalWorkbookStore::new(dir.path().join("checklists.xlsx"));
    let loader = ChecklistLoader::new(&store, "LISTCONTROLE", "zone", "critère");
    let table = loader.replace(&path).unwrap();
    assert_eq!(table.list_zones(), vec!["Cuisine", "Hall"]);
    assert_eq!(table.columns.extra, vec!["Référence"]);

    // replace はストアに書き込まない
    assert!(!store.path().exists());

    loader.save(&table).await.unwrap();
    let reloaded = loader.load().await.unwrap();
    assert_eq!(reloaded.len(), 3);
    assert_eq!(reloaded.rows[2].criterion, "Issue de secours dégagée");
}

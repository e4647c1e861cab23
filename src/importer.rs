//! 表形式ファイルの読み込み（Excel / ODS / CSV）
//!
//! 先頭シートの1行目をヘッダーとして SheetData に変換する。

use crate::error::{AuditError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use checklist_audit_common::SheetData;
use std::path::Path;

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

fn normalized_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn is_supported(path: &Path) -> bool {
    normalized_extension(path)
        .as_deref()
        .is_some_and(|ext| ext == "csv" || WORKBOOK_EXTENSIONS.contains(&ext))
}

/// calamineのRangeを文字列の行リストに変換
pub(crate) fn range_to_rows(range: &Range<Data>) -> Vec<Vec<String>> {
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect())
        .collect()
}

fn import_workbook(path: &Path) -> Result<SheetData> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AuditError::Import(format!("{}: {}", path.display(), e)))?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AuditError::Import(format!("{}: シートがありません", path.display())))?;

    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| AuditError::Import(format!("{} [{}]: {}", path.display(), first, e)))?;

    Ok(SheetData::from_raw_rows(range_to_rows(&range)))
}

fn import_csv(path: &Path) -> Result<SheetData> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)
        .map_err(|e| AuditError::Import(format!("{}: {}", path.display(), e)))?;

    let mut raw = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AuditError::Import(format!("{}: {}", path.display(), e)))?;
        raw.push(record.iter().map(|v| v.trim().to_string()).collect());
    }

    Ok(SheetData::from_raw_rows(raw))
}

/// ファイルを読み込む（拡張子で形式を判定）
pub fn import_table(path: &Path) -> Result<SheetData> {
    if !path.exists() {
        return Err(AuditError::Import(format!("ファイルが見つかりません: {}", path.display())));
    }

    let sheet = match normalized_extension(path).as_deref() {
        Some("csv") => import_csv(path)?,
        Some(ext) if WORKBOOK_EXTENSIONS.contains(&ext) => import_workbook(path)?,
        _ => {
            return Err(AuditError::Import(format!(
                "対応していない形式です: {}",
                path.display()
            )))
        }
    };

    if sheet.header.iter().all(|h| h.is_empty()) {
        return Err(AuditError::Import(format!("{}: ヘッダー行がありません", path.display())));
    }

    tracing::debug!(path = %path.display(), rows = sheet.len(), "table imported");
    Ok(sheet)
}

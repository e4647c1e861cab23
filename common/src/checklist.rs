//! チェックリスト定義テーブル
//!
//! ゾーン列・点検項目列と任意の追加列を持つ行の集合。

use crate::error::{Error, Result};
use crate::sheet::SheetData;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_ZONE_COLUMN: &str = "Zone";
pub const DEFAULT_CRITERION_COLUMN: &str = "Critère";

/// 列構成
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistColumns {
    pub zone: String,
    pub criterion: String,
    /// 追加列（元ファイルの順序）
    #[serde(default)]
    pub extra: Vec<String>,
}

impl Default for ChecklistColumns {
    fn default() -> Self {
        Self {
            zone: DEFAULT_ZONE_COLUMN.into(),
            criterion: DEFAULT_CRITERION_COLUMN.into(),
            extra: Vec::new(),
        }
    }
}

impl ChecklistColumns {
    /// ヘッダー行: [ゾーン, 項目, 追加列...]
    pub fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self.extra.len() + 2);
        header.push(self.zone.clone());
        header.push(self.criterion.clone());
        header.extend(self.extra.iter().cloned());
        header
    }
}

/// 点検項目1行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistRow {
    pub zone: String,
    pub criterion: String,
    /// ChecklistColumns::extra と同じ並び
    #[serde(default)]
    pub extra: Vec<String>,
}

impl ChecklistRow {
    pub fn new(zone: impl Into<String>, criterion: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            criterion: criterion.into(),
            extra: Vec::new(),
        }
    }

    pub fn cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(self.extra.len() + 2);
        cells.push(self.zone.clone());
        cells.push(self.criterion.clone());
        cells.extend(self.extra.iter().cloned());
        cells
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistTable {
    pub columns: ChecklistColumns,
    pub rows: Vec<ChecklistRow>,
}

impl ChecklistTable {
    pub fn new(columns: ChecklistColumns, rows: Vec<ChecklistRow>) -> Self {
        Self { columns, rows }
    }

    /// シートデータからテーブルを構築
    ///
    /// ゾーン列・項目列が無い場合はSchemaエラー。それ以外の列は追加列として保持する。
    pub fn from_sheet(sheet: &SheetData, zone_column: &str, criterion_column: &str) -> Result<Self> {
        let zone_idx = sheet
            .column_index(zone_column)
            .ok_or_else(|| Error::Schema(format!("列 '{}' が見つかりません", zone_column)))?;
        let criterion_idx = sheet
            .column_index(criterion_column)
            .ok_or_else(|| Error::Schema(format!("列 '{}' が見つかりません", criterion_column)))?;

        let extra_idx: Vec<usize> = (0..sheet.header.len())
            .filter(|&i| i != zone_idx && i != criterion_idx)
            .collect();

        let columns = ChecklistColumns {
            zone: sheet.header[zone_idx].clone(),
            criterion: sheet.header[criterion_idx].clone(),
            extra: extra_idx.iter().map(|&i| sheet.header[i].clone()).collect(),
        };

        let rows = (0..sheet.len())
            .map(|r| ChecklistRow {
                zone: sheet.cell(r, zone_idx).trim().to_string(),
                criterion: sheet.cell(r, criterion_idx).trim().to_string(),
                extra: extra_idx.iter().map(|&i| sheet.cell(r, i).to_string()).collect(),
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// シートデータへ変換（定義シート上書き用）
    pub fn to_sheet(&self) -> SheetData {
        SheetData::new(
            self.columns.header(),
            self.rows.iter().map(|r| r.cells()).collect(),
        )
    }

    /// ゾーン一覧（重複除去、初出順）
    pub fn list_zones(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter(|r| !r.zone.is_empty())
            .filter_map(|r| {
                if seen.insert(r.zone.as_str()) {
                    Some(r.zone.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

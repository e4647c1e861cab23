//! 点検結果セット
//!
//! 選択中のゾーンに属するチェックリスト行に、判定・コメント・写真リンクの
//! 3列を追加したもの。ゾーンが変わるたびに作り直す。

use crate::audit::AuditSession;
use crate::checklist::{ChecklistColumns, ChecklistRow, ChecklistTable};
use crate::compliance::Compliance;
use crate::sheet::SheetData;
use serde::{Deserialize, Serialize};

pub const COMPLIANCE_COLUMN: &str = "Conformité";
pub const COMMENT_COLUMN: &str = "Commentaires";
pub const PHOTO_LINK_COLUMN: &str = "Lien Photo";
pub const AUDIT_ID_COLUMN: &str = "Audit ID";
pub const AUDIT_DATE_COLUMN: &str = "Date Audit";

/// 点検結果1行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    pub checklist: ChecklistRow,
    #[serde(default)]
    pub compliance: Compliance,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub photo_link: String,
    #[serde(default)]
    pub audit_id: String,
    #[serde(default)]
    pub audit_date: String,
}

impl ResultRow {
    pub fn new(checklist: ChecklistRow) -> Self {
        Self {
            checklist,
            ..Default::default()
        }
    }

    pub fn criterion(&self) -> &str {
        &self.checklist.criterion
    }
}

/// 判定状態ごとの件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub pending: usize,
    pub conforme: usize,
    pub non_conforme: usize,
    pub non_applicable: usize,
}

impl ResultSummary {
    pub fn total(&self) -> usize {
        self.pending + self.conforme + self.non_conforme + self.non_applicable
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    pub zone: String,
    pub rows: Vec<ResultRow>,
}

impl ResultSet {
    /// ゾーンに一致する行を元の順序で抽出し、結果列を空で初期化
    pub fn build(table: &ChecklistTable, zone: &str) -> Self {
        let rows = table
            .rows
            .iter()
            .filter(|r| r.zone == zone)
            .cloned()
            .map(ResultRow::new)
            .collect();

        Self {
            zone: zone.to_string(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 未判定の行インデックス
    pub fn pending(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.compliance.is_pending())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.rows.iter().all(|r| !r.compliance.is_pending())
    }

    /// 全行に監査ID・日時を記録
    pub fn stamp(&mut self, session: &AuditSession) {
        let date = session.date_label();
        for row in &mut self.rows {
            row.audit_id = session.audit_id.clone();
            row.audit_date = date.clone();
        }
    }

    pub fn summary(&self) -> ResultSummary {
        let mut summary = ResultSummary::default();
        for row in &self.rows {
            match row.compliance {
                Compliance::Pending => summary.pending += 1,
                Compliance::Conforme => summary.conforme += 1,
                Compliance::NonConforme => summary.non_conforme += 1,
                Compliance::NonApplicable => summary.non_applicable += 1,
            }
        }
        summary
    }

    /// 結果シートのヘッダー
    pub fn header(columns: &ChecklistColumns) -> Vec<String> {
        let mut header = columns.header();
        header.extend(
            [
                COMPLIANCE_COLUMN,
                COMMENT_COLUMN,
                PHOTO_LINK_COLUMN,
                AUDIT_ID_COLUMN,
                AUDIT_DATE_COLUMN,
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        header
    }

    /// 結果シートへ書き込むデータ（ヘッダー + 全行）
    pub fn to_sheet(&self, columns: &ChecklistColumns) -> SheetData {
        let rows = self
            .rows
            .iter()
            .map(|r| {
                let mut cells = r.checklist.cells();
                cells.push(r.compliance.label().to_string());
                cells.push(r.comment.clone());
                cells.push(r.photo_link.clone());
                cells.push(r.audit_id.clone());
                cells.push(r.audit_date.clone());
                cells
            })
            .collect();

        SheetData::new(Self::header(columns), rows)
    }
}

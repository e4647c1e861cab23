//! 点検項目ごとの判定入力
//!
//! 選択中ゾーンの ResultSet と、行ごとの表示状態（コメント欄・写真欄の開閉）を
//! 行インデックスで管理する。

use crate::error::{AuditError, Result};
use crate::store::{ObjectStore, PhotoBlob};
use checklist_audit_common::{ChecklistTable, Compliance, ResultRow, ResultSet};

/// 行ごとの表示状態（保存しない）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiToggleState {
    pub show_comment: bool,
    pub show_photo: bool,
}

/// ゾーン選択の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneChange {
    /// 結果セットを作り直した（行数）
    Rebuilt(usize),
    /// 同じゾーンなので入力内容を保持
    Unchanged,
    /// 該当行なし
    Empty,
}

#[derive(Debug, Default)]
pub struct ReviewLoop {
    result_set: Option<ResultSet>,
    toggles: Vec<UiToggleState>,
    closed: bool,
}

impl ReviewLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// ゾーンを選択
    ///
    /// ゾーンが変わった場合のみ作り直し、前のゾーンの未保存入力は破棄する。
    pub fn select_zone(&mut self, table: &ChecklistTable, zone: &str) -> ZoneChange {
        if self.selected_zone() == Some(zone) {
            return ZoneChange::Unchanged;
        }

        let discarded = self.unsaved_edits();
        if discarded > 0 {
            if let Some(prev) = &self.result_set {
                tracing::warn!(zone = %prev.zone, edited = discarded, "unsaved edits discarded on zone change");
            }
        }

        let set = ResultSet::build(table, zone);
        let len = set.len();
        self.toggles = vec![UiToggleState::default(); len];
        self.result_set = Some(set);
        self.closed = false;

        tracing::debug!(zone, rows = len, "result set rebuilt");
        if len == 0 {
            ZoneChange::Empty
        } else {
            ZoneChange::Rebuilt(len)
        }
    }

    /// 未保存の判定済み行数（保存済みなら0）
    pub fn unsaved_edits(&self) -> usize {
        if self.closed {
            return 0;
        }
        self.result_set
            .as_ref()
            .map(|set| set.len() - set.pending().len())
            .unwrap_or(0)
    }

    /// チェックリスト差し替え時など、選択を解除
    pub fn clear(&mut self) {
        self.result_set = None;
        self.toggles.clear();
        self.closed = false;
    }

    pub fn selected_zone(&self) -> Option<&str> {
        self.result_set.as_ref().map(|s| s.zone.as_str())
    }

    pub fn result_set(&self) -> Option<&ResultSet> {
        self.result_set.as_ref()
    }

    pub fn result_set_mut(&mut self) -> Option<&mut ResultSet> {
        self.result_set.as_mut()
    }

    pub fn toggles(&self) -> &[UiToggleState] {
        &self.toggles
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// 保存成功後、編集を締め切る
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// 新しい監査のために編集を再開（入力内容は保持）
    pub fn reopen(&mut self) {
        self.closed = false;
    }

    fn editable_row(&mut self, index: usize) -> Result<&mut ResultRow> {
        if self.closed {
            return Err(AuditError::SessionClosed);
        }
        let set = self.result_set.as_mut().ok_or(AuditError::NoZoneSelected)?;
        let len = set.rows.len();
        set.rows
            .get_mut(index)
            .ok_or(AuditError::RowOutOfRange { index, len })
    }

    fn toggle_state(&mut self, index: usize) -> Result<&mut UiToggleState> {
        let len = self.toggles.len();
        if self.result_set.is_none() {
            return Err(AuditError::NoZoneSelected);
        }
        self.toggles
            .get_mut(index)
            .ok_or(AuditError::RowOutOfRange { index, len })
    }

    /// 判定を設定（3状態は排他）
    pub fn set_compliance(&mut self, index: usize, compliance: Compliance) -> Result<()> {
        let row = self.editable_row(index)?;
        row.compliance = compliance;
        Ok(())
    }

    pub fn set_comment(&mut self, index: usize, comment: &str) -> Result<()> {
        let row = self.editable_row(index)?;
        row.comment = comment.to_string();
        Ok(())
    }

    /// コメント欄の表示切替（入力内容は消さない）
    pub fn toggle_comment(&mut self, index: usize) -> Result<bool> {
        let state = self.toggle_state(index)?;
        state.show_comment = !state.show_comment;
        Ok(state.show_comment)
    }

    /// 写真欄の表示切替（リンクは消さない）
    pub fn toggle_photo(&mut self, index: usize) -> Result<bool> {
        let state = self.toggle_state(index)?;
        state.show_photo = !state.show_photo;
        Ok(state.show_photo)
    }

    /// 写真をアップロードして行にリンクを設定
    ///
    /// 失敗時は行を変更せずに Upload エラーを返す。
    pub async fn attach_photo(
        &mut self,
        index: usize,
        store: &dyn ObjectStore,
        blob: &PhotoBlob,
        folder_id: &str,
    ) -> Result<String> {
        // 行の存在確認をアップロード前に行う
        self.editable_row(index)?;

        let file_id = store.upload(blob, folder_id).await?;
        let link = store.viewer_url(&file_id);

        let row = self.editable_row(index)?;
        row.photo_link = link.clone();
        tracing::info!(criterion = %row.checklist.criterion, %file_id, "photo attached");
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryObjectStore;
    use checklist_audit_common::{ChecklistColumns, ChecklistRow};

    fn table() -> ChecklistTable {
        ChecklistTable::new(
            ChecklistColumns::default(),
            vec![
                ChecklistRow::new("A", "C1"),
                ChecklistRow::new("A", "C2"),
                ChecklistRow::new("B", "C3"),
            ],
        )
    }

    fn blob() -> PhotoBlob {
        PhotoBlob {
            file_name: "c1.jpg".into(),
            mime_type: "image/jpeg".into(),
            data: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[test]
    fn test_select_zone_rebuilds_only_on_change() {
        let mut review = ReviewLoop::new();
        assert_eq!(review.select_zone(&table(), "A"), ZoneChange::Rebuilt(2));

        review.set_compliance(0, Compliance::Conforme).unwrap();
        assert_eq!(review.select_zone(&table(), "A"), ZoneChange::Unchanged);
        assert_eq!(review.result_set().unwrap().rows[0].compliance, Compliance::Conforme);
    }

    #[test]
    fn test_zone_switch_discards_edits() {
        let mut review = ReviewLoop::new();
        review.select_zone(&table(), "A");
        review.set_compliance(0, Compliance::Conforme).unwrap();
        review.set_comment(0, "RAS").unwrap();

        assert_eq!(review.select_zone(&table(), "B"), ZoneChange::Rebuilt(1));
        assert_eq!(review.select_zone(&table(), "A"), ZoneChange::Rebuilt(2));

        let row = &review.result_set().unwrap().rows[0];
        assert!(row.compliance.is_pending());
        assert!(row.comment.is_empty());
    }

    #[test]
    fn test_unsaved_edits_zero_after_close() {
        let mut review = ReviewLoop::new();
        assert_eq!(review.unsaved_edits(), 0);

        review.select_zone(&table(), "A");
        review.set_compliance(0, Compliance::Conforme).unwrap();
        assert_eq!(review.unsaved_edits(), 1);

        review.close();
        assert_eq!(review.unsaved_edits(), 0);
        review.reopen();
        assert_eq!(review.unsaved_edits(), 1);
    }

    #[test]
    fn test_select_empty_zone() {
        let mut review = ReviewLoop::new();
        assert_eq!(review.select_zone(&table(), "Z"), ZoneChange::Empty);
        assert!(review.result_set().unwrap().is_empty());
        assert!(review.toggles().is_empty());
    }

    #[test]
    fn test_compliance_is_exclusive() {
        let mut review = ReviewLoop::new();
        review.select_zone(&table(), "A");
        review.set_compliance(1, Compliance::Conforme).unwrap();
        review.set_compliance(1, Compliance::NonApplicable).unwrap();
        assert_eq!(review.result_set().unwrap().rows[1].compliance, Compliance::NonApplicable);
    }

    #[test]
    fn test_toggles_keep_content() {
        let mut review = ReviewLoop::new();
        review.select_zone(&table(), "A");

        assert!(review.toggle_comment(0).unwrap());
        review.set_comment(0, "fuite").unwrap();
        assert!(!review.toggle_comment(0).unwrap());
        assert!(review.toggle_photo(1).unwrap());

        assert_eq!(review.result_set().unwrap().rows[0].comment, "fuite");
        assert_eq!(review.toggles()[0], UiToggleState::default());
        assert!(review.toggles()[1].show_photo);
    }

    #[test]
    fn test_errors_without_zone_or_bad_index() {
        let mut review = ReviewLoop::new();
        assert!(matches!(
            review.set_compliance(0, Compliance::Conforme),
            Err(AuditError::NoZoneSelected)
        ));

        review.select_zone(&table(), "A");
        assert!(matches!(
            review.set_comment(5, "x"),
            Err(AuditError::RowOutOfRange { index: 5, len: 2 })
        ));
        assert!(matches!(review.toggle_photo(9), Err(AuditError::RowOutOfRange { .. })));
    }

    #[test]
    fn test_closed_rejects_edits() {
        let mut review = ReviewLoop::new();
        review.select_zone(&table(), "A");
        review.close();
        assert!(matches!(
            review.set_compliance(0, Compliance::Conforme),
            Err(AuditError::SessionClosed)
        ));
        review.reopen();
        assert!(review.set_compliance(0, Compliance::Conforme).is_ok());
    }

    #[tokio::test]
    async fn test_attach_photo_sets_link() {
        let store = MemoryObjectStore::new();
        let mut review = ReviewLoop::new();
        review.select_zone(&table(), "A");

        let link = review.attach_photo(0, &store, &blob(), "folder").await.unwrap();
        assert_eq!(link, "memory://mem-1");
        assert_eq!(review.result_set().unwrap().rows[0].photo_link, link);
    }

    #[tokio::test]
    async fn test_attach_photo_failure_leaves_row_untouched() {
        let store = MemoryObjectStore::new();
        store.set_fail_uploads(true);

        let mut review = ReviewLoop::new();
        review.select_zone(&table(), "A");
        review.set_compliance(0, Compliance::NonConforme).unwrap();
        review.set_comment(0, "porte bloquée").unwrap();
        let before = review.result_set().unwrap().rows[0].clone();

        let err = review.attach_photo(0, &store, &blob(), "folder").await.unwrap_err();
        assert!(matches!(err, AuditError::Upload(_)));
        assert_eq!(review.result_set().unwrap().rows[0], before);
    }

    #[tokio::test]
    async fn test_attach_photo_bad_index_does_not_upload() {
        let store = MemoryObjectStore::new();
        let mut review = ReviewLoop::new();
        review.select_zone(&table(), "A");

        assert!(review.attach_photo(7, &store, &blob(), "folder").await.is_err());
        assert_eq!(store.upload_count(), 0);
    }
}

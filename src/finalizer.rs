//! 点検結果の確定・保存
//!
//! 全行が判定済みであることを確認し、監査ID・日時を記録して結果シートを上書きする。
//! 上書きなので再試行しても結果は同じ。

use crate::error::{AuditError, Result};
use crate::store::SpreadsheetStore;
use checklist_audit_common::{AuditSession, ChecklistColumns, ResultSet, ResultSummary};

/// 保存結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeReport {
    pub audit_id: String,
    pub zone: String,
    pub rows_written: usize,
    pub summary: ResultSummary,
}

pub struct Finalizer<'a> {
    store: &'a dyn SpreadsheetStore,
    results_sheet: &'a str,
}

impl<'a> Finalizer<'a> {
    pub fn new(store: &'a dyn SpreadsheetStore, results_sheet: &'a str) -> Self {
        Self {
            store,
            results_sheet,
        }
    }

    /// 未判定の項目があれば IncompleteAudit（項目名のリスト付き）
    pub fn check_complete(result_set: &ResultSet) -> Result<()> {
        let pending: Vec<String> = result_set
            .pending()
            .into_iter()
            .map(|i| result_set.rows[i].checklist.criterion.clone())
            .collect();

        if pending.is_empty() {
            Ok(())
        } else {
            Err(AuditError::IncompleteAudit { pending })
        }
    }

    pub async fn finalize(
        &self,
        result_set: &mut ResultSet,
        columns: &ChecklistColumns,
        session: &AuditSession,
    ) -> Result<FinalizeReport> {
        Self::check_complete(result_set)?;

        result_set.stamp(session);
        let payload = result_set.to_sheet(columns);

        tracing::debug!(
            sheet = self.results_sheet,
            audit_id = %session.audit_id,
            rows = payload.len(),
            "writing results"
        );
        self.store.overwrite(self.results_sheet, &payload).await?;

        tracing::info!(
            zone = %result_set.zone,
            audit_id = %session.audit_id,
            rows = payload.len(),
            "audit finalized"
        );

        Ok(FinalizeReport {
            audit_id: session.audit_id.clone(),
            zone: result_set.zone.clone(),
            rows_written: payload.len(),
            summary: result_set.summary(),
        })
    }
}

//! 監査セッション（監査ID + 実施日時）

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub const AUDIT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 1回の点検〜保存サイクルを識別する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSession {
    pub audit_id: String,
    pub audit_date: DateTime<Local>,
}

impl AuditSession {
    /// 新しいIDと現在時刻でセッションを開始
    pub fn start() -> Self {
        Self::with_date(Local::now())
    }

    pub fn with_date(audit_date: DateTime<Local>) -> Self {
        Self {
            audit_id: uuid::Uuid::new_v4().to_string(),
            audit_date,
        }
    }

    /// シート書き込み用の日時文字列
    pub fn date_label(&self) -> String {
        self.audit_date.format(AUDIT_DATE_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_start_generates_unique_ids() {
        let a = AuditSession::start();
        let b = AuditSession::start();
        assert_ne!(a.audit_id, b.audit_id);
        assert_eq!(a.audit_id.len(), 36);
    }

    #[test]
    fn test_date_label_format() {
        let date = Local.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap();
        let session = AuditSession::with_date(date);
        assert_eq!(session.date_label(), "2024-05-17 09:30:00");
    }
}

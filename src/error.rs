use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("アクセストークンが設定されていません。`checklist-audit config --set-token TOKEN` または環境変数 CHECKLIST_AUDIT_TOKEN で設定してください")]
    MissingCredential,

    #[error("データソースに接続できません: {0}")]
    SourceUnavailable(String),

    #[error("保存に失敗しました（保存されていない可能性があります）: {0}")]
    Persistence(String),

    #[error("写真アップロードエラー: {0}")]
    Upload(String),

    #[error("未判定の項目があります ({}件): {}", pending.len(), pending.join(", "))]
    IncompleteAudit { pending: Vec<String> },

    #[error("ファイル読み込みエラー: {0}")]
    Import(String),

    #[error("行番号が範囲外です: {index} (全{len}行)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("この監査は保存済みです。編集するには新しい監査を開始してください")]
    SessionClosed,

    #[error("ゾーンが選択されていません")]
    NoZoneSelected,

    #[error("チェックリストが読み込まれていません")]
    NoChecklistLoaded,

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] checklist_audit_common::Error),
}

impl AuditError {
    /// 再試行で解決しうる外部要因のエラーか
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AuditError::SourceUnavailable(_) | AuditError::Persistence(_) | AuditError::Upload(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;

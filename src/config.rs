use crate::error::{AuditError, Result};
use checklist_audit_common::checklist::{DEFAULT_CRITERION_COLUMN, DEFAULT_ZONE_COLUMN};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const TOKEN_ENV: &str = "CHECKLIST_AUDIT_TOKEN";

/// 保存先バックエンド
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Google Sheets + Google Drive
    Google,
    /// ローカルの.xlsx + 写真フォルダ
    #[default]
    Local,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Google => write!(f, "google"),
            Backend::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub access_token: Option<String>,
    pub spreadsheet_id: String,
    pub workbook_path: PathBuf,
    pub checklist_sheet: String,
    pub results_sheet: String,
    /// Drive フォルダID/URL、またはローカル写真フォルダ
    pub photo_folder: String,
    pub zone_column: String,
    pub criterion_column: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            access_token: None,
            spreadsheet_id: String::new(),
            workbook_path: PathBuf::from("checklists.xlsx"),
            checklist_sheet: "LISTCONTROLE".into(),
            results_sheet: "resultat".into(),
            photo_folder: "photos".into(),
            zone_column: DEFAULT_ZONE_COLUMN.into(),
            criterion_column: DEFAULT_CRITERION_COLUMN.into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AuditError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("checklist-audit").join("config.json"))
    }

    pub fn get_access_token(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                return Ok(token);
            }
        }

        self.access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or(AuditError::MissingCredential)
    }

    pub fn set_access_token(&mut self, token: String) -> Result<()> {
        self.access_token = Some(token);
        self.save()
    }

    /// バックエンドに必要な項目が揃っているか
    pub fn validate(&self) -> Result<()> {
        if self.checklist_sheet.trim().is_empty() || self.results_sheet.trim().is_empty() {
            return Err(AuditError::Config("シート名が空です".into()));
        }
        if self.checklist_sheet == self.results_sheet {
            return Err(AuditError::Config(
                "チェックリストと結果に同じシートは使えません".into(),
            ));
        }
        if self.backend == Backend::Google && self.spreadsheet_id.trim().is_empty() {
            return Err(AuditError::Config("spreadsheet_id が未設定です".into()));
        }
        Ok(())
    }
}

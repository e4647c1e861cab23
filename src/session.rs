//! 点検セッション
//!
//! ユーザー操作（Action）ごとに1つのハンドラで状態を更新し、
//! 表示用の SessionView は現在の状態から計算する。
//! ストアに触れるのは読み込み・保存・写真アップロードの操作だけ。

use crate::config::Config;
use crate::error::{AuditError, Result};
use crate::finalizer::{FinalizeReport, Finalizer};
use crate::loader::ChecklistLoader;
use crate::review::{ReviewLoop, ZoneChange};
use crate::store::{ObjectStore, PhotoBlob, SpreadsheetStore};
use checklist_audit_common::{AuditSession, ChecklistTable, Compliance, ResultSummary};
use std::path::PathBuf;
use std::sync::Arc;

/// セッションで使うシート名・列名・写真フォルダ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub checklist_sheet: String,
    pub results_sheet: String,
    pub photo_folder: String,
    pub zone_column: String,
    pub criterion_column: String,
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            checklist_sheet: config.checklist_sheet.clone(),
            results_sheet: config.results_sheet.clone(),
            photo_folder: config.photo_folder.clone(),
            zone_column: config.zone_column.clone(),
            criterion_column: config.criterion_column.clone(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// ユーザー操作
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LoadChecklist,
    ImportChecklist(PathBuf),
    SaveChecklist,
    SelectZone(String),
    SetCompliance(usize, Compliance),
    SetComment(usize, String),
    ToggleComment(usize),
    TogglePhoto(usize),
    AttachPhoto(usize, PathBuf),
    SaveResults,
    NewAudit,
}

/// 操作結果の通知
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    ChecklistLoaded { rows: usize, zones: usize },
    ChecklistImported { rows: usize, zones: usize },
    ChecklistSaved { rows: usize },
    ZoneSelected(ZoneChange),
    RowUpdated(usize),
    Toggled { index: usize, visible: bool },
    PhotoAttached { index: usize, link: String },
    ResultsSaved(FinalizeReport),
    AuditStarted { audit_id: String },
}

/// 1行分の表示内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub index: usize,
    pub criterion: String,
    pub compliance: Compliance,
    pub comment: String,
    pub photo_link: String,
    pub show_comment: bool,
    pub show_photo: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub zones: Vec<String>,
    pub selected_zone: Option<String>,
    pub rows: Vec<RowView>,
    pub summary: Option<ResultSummary>,
    pub audit_id: String,
    pub closed: bool,
    pub checklist_rows: usize,
    /// インポート後、定義シートに未保存
    pub checklist_unsaved: bool,
}

pub struct InspectionSession {
    sheets: Arc<dyn SpreadsheetStore>,
    objects: Arc<dyn ObjectStore>,
    settings: SessionSettings,
    table: Option<ChecklistTable>,
    checklist_unsaved: bool,
    review: ReviewLoop,
    audit: AuditSession,
}

impl InspectionSession {
    pub fn new(
        sheets: Arc<dyn SpreadsheetStore>,
        objects: Arc<dyn ObjectStore>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            sheets,
            objects,
            settings,
            table: None,
            checklist_unsaved: false,
            review: ReviewLoop::new(),
            audit: AuditSession::start(),
        }
    }

    pub fn audit(&self) -> &AuditSession {
        &self.audit
    }

    pub fn table(&self) -> Option<&ChecklistTable> {
        self.table.as_ref()
    }

    pub fn review(&self) -> &ReviewLoop {
        &self.review
    }

    fn loader(&self) -> ChecklistLoader<'_> {
        ChecklistLoader::new(
            self.sheets.as_ref(),
            &self.settings.checklist_sheet,
            &self.settings.zone_column,
            &self.settings.criterion_column,
        )
    }

    /// 操作を1つ処理する。失敗時は状態を変更しない。
    pub async fn apply(&mut self, action: Action) -> Result<Notice> {
        tracing::debug!(?action, "apply");
        match action {
            Action::LoadChecklist => self.load_checklist().await,
            Action::ImportChecklist(path) => self.import_checklist(path),
            Action::SaveChecklist => self.save_checklist().await,
            Action::SelectZone(zone) => self.select_zone(&zone),
            Action::SetCompliance(index, compliance) => {
                self.review.set_compliance(index, compliance)?;
                Ok(Notice::RowUpdated(index))
            }
            Action::SetComment(index, comment) => {
                self.review.set_comment(index, &comment)?;
                Ok(Notice::RowUpdated(index))
            }
            Action::ToggleComment(index) => {
                let visible = self.review.toggle_comment(index)?;
                Ok(Notice::Toggled { index, visible })
            }
            Action::TogglePhoto(index) => {
                let visible = self.review.toggle_photo(index)?;
                Ok(Notice::Toggled { index, visible })
            }
            Action::AttachPhoto(index, path) => self.attach_photo(index, path).await,
            Action::SaveResults => self.save_results().await,
            Action::NewAudit => {
                self.audit = AuditSession::start();
                self.review.reopen();
                tracing::info!(audit_id = %self.audit.audit_id, "new audit started");
                Ok(Notice::AuditStarted {
                    audit_id: self.audit.audit_id.clone(),
                })
            }
        }
    }

    async fn load_checklist(&mut self) -> Result<Notice> {
        let table = self.loader().load().await?;
        let notice = Notice::ChecklistLoaded {
            rows: table.len(),
            zones: table.list_zones().len(),
        };
        self.set_table(table, false);
        Ok(notice)
    }

    fn import_checklist(&mut self, path: PathBuf) -> Result<Notice> {
        let table = self.loader().replace(&path)?;
        let notice = Notice::ChecklistImported {
            rows: table.len(),
            zones: table.list_zones().len(),
        };
        self.set_table(table, true);
        Ok(notice)
    }

    fn set_table(&mut self, table: ChecklistTable, unsaved: bool) {
        let was_closed = self.review.is_closed();
        self.table = Some(table);
        self.checklist_unsaved = unsaved;
        self.review.clear();

        // 保存済みの監査IDは使い回さない
        if was_closed {
            self.audit = AuditSession::start();
            tracing::info!(audit_id = %self.audit.audit_id, "new audit started after checklist reload");
        }
    }

    async fn save_checklist(&mut self) -> Result<Notice> {
        let table = self.table.as_ref().ok_or(AuditError::NoChecklistLoaded)?;
        self.loader().save(table).await?;
        let rows = table.len();
        self.checklist_unsaved = false;
        Ok(Notice::ChecklistSaved { rows })
    }

    fn select_zone(&mut self, zone: &str) -> Result<Notice> {
        let table = self.table.as_ref().ok_or(AuditError::NoChecklistLoaded)?;
        let was_closed = self.review.is_closed();
        let change = self.review.select_zone(table, zone);

        // 保存済みの監査から別ゾーンに移ったら新しい監査IDにする
        if was_closed && change != ZoneChange::Unchanged {
            self.audit = AuditSession::start();
            tracing::info!(audit_id = %self.audit.audit_id, zone, "new audit started for zone");
        }
        Ok(Notice::ZoneSelected(change))
    }

    async fn attach_photo(&mut self, index: usize, path: PathBuf) -> Result<Notice> {
        let blob = PhotoBlob::from_path(&path)?;
        let link = self
            .review
            .attach_photo(index, self.objects.as_ref(), &blob, &self.settings.photo_folder)
            .await?;
        Ok(Notice::PhotoAttached { index, link })
    }

    async fn save_results(&mut self) -> Result<Notice> {
        let columns = self
            .table
            .as_ref()
            .ok_or(AuditError::NoChecklistLoaded)?
            .columns
            .clone();
        let result_set = self
            .review
            .result_set_mut()
            .ok_or(AuditError::NoZoneSelected)?;

        let finalizer = Finalizer::new(self.sheets.as_ref(), &self.settings.results_sheet);
        let report = finalizer.finalize(result_set, &columns, &self.audit).await?;

        self.review.close();
        Ok(Notice::ResultsSaved(report))
    }

    /// 現在の状態から表示内容を計算（ストアには触れない）
    pub fn view(&self) -> SessionView {
        let result_set = self.review.result_set();
        let rows = result_set
            .map(|set| {
                set.rows
                    .iter()
                    .zip(self.review.toggles())
                    .enumerate()
                    .map(|(index, (row, toggle))| RowView {
                        index,
                        criterion: row.checklist.criterion.clone(),
                        compliance: row.compliance,
                        comment: row.comment.clone(),
                        photo_link: row.photo_link.clone(),
                        show_comment: toggle.show_comment,
                        show_photo: toggle.show_photo,
                    })
                    .collect()
            })
            .unwrap_or_default();

        SessionView {
            zones: self.table.as_ref().map(|t| t.list_zones()).unwrap_or_default(),
            selected_zone: self.review.selected_zone().map(|z| z.to_string()),
            rows,
            summary: result_set.map(|s| s.summary()),
            audit_id: self.audit.audit_id.clone(),
            closed: self.review.is_closed(),
            checklist_rows: self.table.as_ref().map(|t| t.len()).unwrap_or(0),
            checklist_unsaved: self.checklist_unsaved,
        }
    }
}

//! 対話式点検入力
//!
//! ## 流れ
//! 1. チェックリスト読み込み
//! 2. ゾーン選択
//! 3. 項目ごとに判定・コメント・写真を入力
//! 4. 確認して結果シートに保存
//!
//! 外部ストアのエラーは警告を表示して再試行を確認する（プロセスは終了しない）。

use crate::error::{AuditError, Result};
use crate::review::ZoneChange;
use crate::session::{Action, InspectionSession, Notice, SessionView};
use crate::store::SpreadsheetStore;
use checklist_audit_common::{Compliance, ResultSummary, SheetData};
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

fn prompt_error(e: dialoguer::Error) -> AuditError {
    AuditError::Prompt(e.to_string())
}

/// 通信中のスピナー表示
async fn with_spinner<T, F>(message: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = fut.await;
    spinner.finish_and_clear();
    result
}

/// 警告を表示して再試行するか確認
pub fn confirm_retry(e: &AuditError) -> Result<bool> {
    eprintln!("⚠ {}", e);
    Confirm::new()
        .with_prompt("再試行しますか?")
        .default(true)
        .interact()
        .map_err(prompt_error)
}

/// 失敗したら警告を出して再試行を確認するループ
async fn apply_with_retry(
    session: &mut InspectionSession,
    action: Action,
    message: &str,
) -> Result<Notice> {
    loop {
        match with_spinner(message, session.apply(action.clone())).await {
            Ok(notice) => return Ok(notice),
            Err(e) if e.is_retryable() => {
                if !confirm_retry(&e)? {
                    return Err(e);
                }
            }
            Err(e) => return Err(e),
        }
    }
}

/// シートを読み込む。外部要因のエラーは `ask` が true を返す限り再試行
pub async fn read_sheet_with_retry<A>(
    store: &dyn SpreadsheetStore,
    sheet: &str,
    mut ask: A,
) -> Result<SheetData>
where
    A: FnMut(&AuditError) -> Result<bool>,
{
    loop {
        match with_spinner("読み込み中...", store.read_all(sheet)).await {
            Ok(data) => return Ok(data),
            Err(e) if e.is_retryable() => {
                if !ask(&e)? {
                    return Err(e);
                }
            }
            Err(e) => return Err(e),
        }
    }
}

pub fn print_summary(summary: &ResultSummary) {
    println!("  Conforme:       {}", summary.conforme);
    println!("  Non Conforme:   {}", summary.non_conforme);
    println!("  Non Applicable: {}", summary.non_applicable);
    if summary.pending > 0 {
        println!("  未判定:         {}", summary.pending);
    }
}

/// シート内容の簡易表示
pub fn print_sheet(sheet: &SheetData, limit: usize) {
    println!("  {}", sheet.header.join(" | "));
    for row in sheet.rows.iter().take(limit) {
        println!("  {}", row.join(" | "));
    }
    if sheet.len() > limit {
        println!("  ... (他 {}行)", sheet.len() - limit);
    }
}

fn choose_zone(view: &SessionView) -> Result<String> {
    let selection = Select::new()
        .with_prompt("ゾーンを選択")
        .items(&view.zones)
        .default(0)
        .interact()
        .map_err(prompt_error)?;
    Ok(view.zones[selection].clone())
}

fn prompt_compliance(current: Compliance) -> Result<Compliance> {
    let labels: Vec<&str> = Compliance::CHOICES.iter().map(|c| c.label()).collect();
    let default = Compliance::CHOICES
        .iter()
        .position(|c| *c == current)
        .unwrap_or(0);

    let selection = Select::new()
        .with_prompt("判定")
        .items(&labels)
        .default(default)
        .interact()
        .map_err(prompt_error)?;
    Ok(Compliance::CHOICES[selection])
}

/// コメント欄を開く（開いていればそのまま）
async fn open_comment(session: &mut InspectionSession, index: usize) -> Result<()> {
    if !session.view().rows[index].show_comment {
        session.apply(Action::ToggleComment(index)).await?;
    }
    Ok(())
}

/// 写真欄を開く（開いていればそのまま）
async fn open_photo(session: &mut InspectionSession, index: usize) -> Result<()> {
    if !session.view().rows[index].show_photo {
        session.apply(Action::TogglePhoto(index)).await?;
    }
    Ok(())
}

async fn review_row(session: &mut InspectionSession, index: usize, total: usize) -> Result<()> {
    let row = session.view().rows[index].clone();
    println!("\n[{}/{}] {}", index + 1, total, row.criterion);

    let compliance = prompt_compliance(row.compliance)?;
    session.apply(Action::SetCompliance(index, compliance)).await?;

    let add_comment = Confirm::new()
        .with_prompt("コメントを入力しますか?")
        .default(!row.comment.is_empty())
        .interact()
        .map_err(prompt_error)?;
    if add_comment {
        open_comment(session, index).await?;
        let comment: String = Input::new()
            .with_prompt("コメント")
            .with_initial_text(row.comment.clone())
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)?;
        session.apply(Action::SetComment(index, comment.trim().to_string())).await?;
    }

    let add_photo = Confirm::new()
        .with_prompt("写真を追加しますか?")
        .default(false)
        .interact()
        .map_err(prompt_error)?;
    if add_photo {
        open_photo(session, index).await?;
        loop {
            let path: String = Input::new()
                .with_prompt("写真ファイルのパス（空でスキップ）")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_error)?;
            let path = path.trim();
            if path.is_empty() {
                break;
            }

            let action = Action::AttachPhoto(index, PathBuf::from(path));
            match with_spinner("写真をアップロード中...", session.apply(action)).await {
                Ok(Notice::PhotoAttached { link, .. }) => {
                    println!("  ✔ 写真リンク: {}", link);
                    break;
                }
                Ok(_) => break,
                // 写真の失敗は行の他の入力に影響しない
                Err(e @ AuditError::Upload(_)) => eprintln!("⚠ {}", e),
                Err(e) => return Err(e),
            }
        }
    }

    Ok(())
}

/// 対話式点検を実行
pub async fn run_inspection(session: &mut InspectionSession, zone: Option<String>) -> Result<()> {
    // 1. 読み込み
    println!("[1/4] チェックリストを読み込み中...");
    if let Notice::ChecklistLoaded { rows, zones } =
        apply_with_retry(session, Action::LoadChecklist, "読み込み中...").await?
    {
        println!("✔ {}項目 / {}ゾーン\n", rows, zones);
    }

    // 2. ゾーン選択
    let view = session.view();
    if view.zones.is_empty() {
        println!("チェックリストにゾーンがありません");
        return Ok(());
    }
    let zone = match zone {
        Some(z) => z,
        None => choose_zone(&view)?,
    };
    println!("[2/4] ゾーン: {}", zone);

    let total = match session.apply(Action::SelectZone(zone.clone())).await? {
        Notice::ZoneSelected(ZoneChange::Rebuilt(n)) => n,
        Notice::ZoneSelected(ZoneChange::Empty) => {
            println!("  このゾーンに該当する項目はありません");
            0
        }
        _ => session.view().rows.len(),
    };

    // 3. 項目ごとの入力
    println!("\n[3/4] 点検項目の入力 ({}件)", total);
    for index in 0..total {
        review_row(session, index, total).await?;
    }

    // 4. 保存
    println!("\n[4/4] 点検結果");
    let view = session.view();
    if let Some(summary) = &view.summary {
        print_summary(summary);
    }

    let save = Confirm::new()
        .with_prompt("結果を保存しますか?")
        .default(true)
        .interact()
        .map_err(prompt_error)?;
    if !save {
        println!("保存せずに終了します");
        return Ok(());
    }

    match apply_with_retry(session, Action::SaveResults, "保存中...").await {
        Ok(Notice::ResultsSaved(report)) => {
            println!(
                "\n✅ 点検結果を保存しました ({}行, 監査ID: {})",
                report.rows_written, report.audit_id
            );
            Ok(())
        }
        Ok(_) => Ok(()),
        Err(e @ AuditError::Persistence(_)) => {
            eprintln!("⚠ 結果は保存されていない可能性があります");
            Err(e)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionSettings;
    use crate::store::{MemoryObjectStore, MemorySheetStore};
    use std::sync::Arc;

    fn definition() -> SheetData {
        SheetData::new(
            vec!["Zone".into(), "Critère".into()],
            vec![vec!["A".into(), "C1".into()], vec!["A".into(), "C2".into()]],
        )
    }

    async fn session_on_zone_a() -> InspectionSession {
        let sheets = Arc::new(MemorySheetStore::new().with_sheet("LISTCONTROLE", definition()));
        let mut session =
            InspectionSession::new(sheets, Arc::new(MemoryObjectStore::new()), SessionSettings::default());
        session.apply(Action::LoadChecklist).await.unwrap();
        session.apply(Action::SelectZone("A".into())).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_read_sheet_retries_until_available() {
        let store = MemorySheetStore::new().with_sheet("LISTCONTROLE", definition());
        store.set_fail_reads(true);

        let mut asked = 0;
        let data = read_sheet_with_retry(&store, "LISTCONTROLE", |e| {
            assert!(matches!(e, AuditError::SourceUnavailable(_)));
            asked += 1;
            store.set_fail_reads(false);
            Ok(true)
        })
        .await
        .unwrap();

        assert_eq!(asked, 1);
        assert_eq!(data.len(), 2);
    }

    #[tokio::test]
    async fn test_read_sheet_declined_retry_returns_error() {
        let store = MemorySheetStore::new();
        store.set_fail_reads(true);

        let err = read_sheet_with_retry(&store, "LISTCONTROLE", |_| Ok(false))
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_read_sheet_prompt_error_propagates() {
        let store = MemorySheetStore::new();
        store.set_fail_reads(true);

        let err = read_sheet_with_retry(&store, "LISTCONTROLE", |_| {
            Err(AuditError::Prompt("no tty".into()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AuditError::Prompt(_)));
    }

    #[tokio::test]
    async fn test_open_fields_are_idempotent() {
        let mut session = session_on_zone_a().await;

        open_comment(&mut session, 0).await.unwrap();
        open_comment(&mut session, 0).await.unwrap();
        open_photo(&mut session, 1).await.unwrap();
        open_photo(&mut session, 1).await.unwrap();

        let view = session.view();
        assert!(view.rows[0].show_comment);
        assert!(!view.rows[0].show_photo);
        assert!(view.rows[1].show_photo);
        assert!(!view.rows[1].show_comment);
    }
}

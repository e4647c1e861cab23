use checklist_audit::{cli, config, error, interactive, loader, session, store};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "checklist_audit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    // 一時的な上書き（config コマンドでは保存対象にしない）
    if let Some(backend) = cli.backend.filter(|_| !matches!(cli.command, Commands::Config { .. })) {
        config.backend = backend;
    }

    match cli.command {
        Commands::Inspect { zone, dry_run } => {
            println!("📋 checklist-audit - 点検入力 ({})\n", config.backend);

            let (sheets, objects) = store::build_stores(&config)?;
            let (sheets, objects): (Arc<dyn store::SpreadsheetStore>, Arc<dyn store::ObjectStore>) =
                if dry_run {
                    println!("(ドライラン: 結果と写真は保存されません)\n");
                    let definition = interactive::read_sheet_with_retry(
                        sheets.as_ref(),
                        &config.checklist_sheet,
                        interactive::confirm_retry,
                    )
                    .await?;
                    let memory: Arc<dyn store::SpreadsheetStore> = Arc::new(
                        store::MemorySheetStore::new().with_sheet(&config.checklist_sheet, definition),
                    );
                    let photos: Arc<dyn store::ObjectStore> = Arc::new(store::MemoryObjectStore::new());
                    (memory, photos)
                } else {
                    (sheets, objects)
                };

            let mut session = session::InspectionSession::new(
                sheets,
                objects,
                session::SessionSettings::from(&config),
            );
            interactive::run_inspection(&mut session, zone).await?;
        }

        Commands::Import { file, save } => {
            println!("📥 checklist-audit - チェックリスト読み込み\n");

            let (sheets, _) = store::build_stores(&config)?;
            let loader = loader::ChecklistLoader::new(
                sheets.as_ref(),
                &config.checklist_sheet,
                &config.zone_column,
                &config.criterion_column,
            );

            let table = loader.replace(&file)?;
            println!("✔ {}項目 / {}ゾーン", table.len(), table.list_zones().len());
            interactive::print_sheet(&table.to_sheet(), 20);

            if save {
                println!("\n- 定義シート '{}' に保存中...", config.checklist_sheet);
                loader.save(&table).await?;
                println!("✔ チェックリストを保存しました");
            } else {
                println!("\n(保存するには --save を指定)");
            }
        }

        Commands::Zones => {
            let (sheets, _) = store::build_stores(&config)?;
            let loader = loader::ChecklistLoader::new(
                sheets.as_ref(),
                &config.checklist_sheet,
                &config.zone_column,
                &config.criterion_column,
            );
            let table = loader.load().await?;

            println!("ゾーン一覧 ({}):", config.checklist_sheet);
            for zone in table.list_zones() {
                let count = table.rows.iter().filter(|r| r.zone == zone).count();
                println!("  {} ({}項目)", zone, count);
            }
        }

        Commands::Config { set_token, set_backend, spreadsheet_id, workbook, photo_folder, show } => {
            let mut changed = false;

            if let Some(backend) = set_backend {
                config.backend = backend;
                changed = true;
            }
            if let Some(id) = spreadsheet_id {
                config.spreadsheet_id = id;
                changed = true;
            }
            if let Some(path) = workbook {
                config.workbook_path = path;
                changed = true;
            }
            if let Some(folder) = photo_folder {
                config.photo_folder = folder;
                changed = true;
            }

            if let Some(token) = set_token {
                config.set_access_token(token)?;
                println!("✔ アクセストークンを設定しました");
            } else if changed {
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                println!("設定:");
                println!("  バックエンド: {}", config.backend);
                println!("  スプレッドシートID: {}", config.spreadsheet_id);
                println!("  ワークブック: {}", config.workbook_path.display());
                println!("  チェックリストシート: {}", config.checklist_sheet);
                println!("  結果シート: {}", config.results_sheet);
                println!("  写真フォルダ: {}", config.photo_folder);
                println!("  列: {} / {}", config.zone_column, config.criterion_column);
                println!(
                    "  アクセストークン: {}",
                    if config.get_access_token().is_ok() { "設定済み" } else { "未設定" }
                );
            }
        }
    }

    Ok(())
}

use crate::config::Backend;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "checklist-audit")]
#[command(about = "設備点検チェックリスト記録ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 保存先バックエンド（設定ファイルより優先）
    #[arg(long, global = true)]
    pub backend: Option<Backend>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ゾーンを選んで点検結果を入力・保存
    Inspect {
        /// ゾーン（省略時は一覧から選択）
        #[arg(short, long)]
        zone: Option<String>,

        /// 保存せずに動作確認（結果・写真はメモリ上のみ）
        #[arg(long)]
        dry_run: bool,
    },

    /// Excel/CSVからチェックリストを読み込む
    Import {
        /// 入力ファイル (xlsx/xls/ods/csv)
        #[arg(required = true)]
        file: PathBuf,

        /// 定義シートを上書き保存
        #[arg(long)]
        save: bool,
    },

    /// ゾーン一覧を表示
    Zones,

    /// 設定を表示/編集
    Config {
        /// アクセストークンを設定
        #[arg(long)]
        set_token: Option<String>,

        /// 既定のバックエンドを設定
        #[arg(long)]
        set_backend: Option<Backend>,

        /// スプレッドシートIDを設定
        #[arg(long)]
        spreadsheet_id: Option<String>,

        /// ローカルワークブックのパスを設定
        #[arg(long)]
        workbook: Option<PathBuf>,

        /// 写真フォルダ（DriveフォルダID/URL またはローカルパス）を設定
        #[arg(long)]
        photo_folder: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_inspect_with_zone() {
        let cli = Cli::try_parse_from(["checklist-audit", "inspect", "--zone", "Cuisine", "--backend", "google"]).unwrap();
        assert_eq!(cli.backend, Some(Backend::Google));
        match cli.command {
            Commands::Inspect { zone, dry_run } => {
                assert_eq!(zone.as_deref(), Some("Cuisine"));
                assert!(!dry_run);
            }
            _ => panic!("inspect expected"),
        }
    }

    #[test]
    fn test_import_requires_file() {
        assert!(Cli::try_parse_from(["checklist-audit", "import"]).is_err());
    }
}

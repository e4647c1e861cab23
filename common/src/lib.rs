//! Checklist Audit Common Library
//!
//! CLI・対話フロントエンドで共有される点検データ型とユーティリティ

pub mod audit;
pub mod checklist;
pub mod compliance;
pub mod error;
pub mod export;
pub mod result_set;
pub mod sheet;

pub use audit::AuditSession;
pub use checklist::{ChecklistColumns, ChecklistRow, ChecklistTable};
pub use compliance::Compliance;
pub use error::{Error, Result};
pub use result_set::{ResultRow, ResultSet, ResultSummary};
pub use sheet::SheetData;

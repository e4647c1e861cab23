//! Excel生成（共通ライブラリ）
//!
//! シート名とSheetDataの組から、ヘッダー付きのワークブックを生成する。
//! ローカルワークブックストアの上書きと結果書き出しで使用。

use crate::sheet::SheetData;
use rust_xlsxwriter::*;

const MIN_COL_WIDTH: f64 = 10.0;
const MAX_COL_WIDTH: f64 = 60.0;

/// 列幅（文字数ベースの概算）
fn column_width(sheet: &SheetData, col: usize) -> f64 {
    let longest = std::iter::once(sheet.header.get(col).map(|s| s.as_str()).unwrap_or(""))
        .chain(sheet.rows.iter().map(|r| r.get(col).map(|s| s.as_str()).unwrap_or("")))
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0);

    (longest as f64 + 2.0).clamp(MIN_COL_WIDTH, MAX_COL_WIDTH)
}

/// Excelをバッファに生成
///
/// # Arguments
/// * `sheets` - (シート名, データ) のリスト。順序どおりにシートを作成する
pub fn generate_workbook_buffer(sheets: &[(String, SheetData)]) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x333333))
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let value_format = Format::new()
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();

    for (name, sheet) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name)
            .map_err(|e| format!("シート名設定エラー: {}", e))?;

        for (col, title) in sheet.header.iter().enumerate() {
            let col = col as u16;
            worksheet.write_string_with_format(0, col, title, &header_format)
                .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
        }

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let excel_row = row_idx as u32 + 1;
            for (col, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                worksheet.write_string_with_format(excel_row, col as u16, value, &value_format)
                    .map_err(|e| format!("値書き込みエラー: {}", e))?;
            }
        }

        for col in 0..sheet.header.len() {
            worksheet.set_column_width(col as u16, column_width(sheet, col))
                .map_err(|e| format!("列幅設定エラー: {}", e))?;
        }
    }

    // シートが無いワークブックは保存できないため空シートを1枚追加
    if sheets.is_empty() {
        workbook.add_worksheet();
    }

    workbook.save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}

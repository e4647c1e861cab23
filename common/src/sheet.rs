//! シートデータ（ヘッダー行 + データ行）
//!
//! スプレッドシートストア・インポーター・結果書き出しで共有する行レコード形式。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetData {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetData {
    /// 生の行リスト（先頭行 = ヘッダー）から構築
    ///
    /// - 末尾の空行は除去
    /// - ヘッダー幅に満たない行は空セルで補完
    pub fn from_raw_rows(mut raw: Vec<Vec<String>>) -> Self {
        while raw
            .last()
            .map(|r| r.iter().all(|c| c.trim().is_empty()))
            .unwrap_or(false)
        {
            raw.pop();
        }

        let mut iter = raw.into_iter();
        let header: Vec<String> = match iter.next() {
            Some(h) => h.into_iter().map(|c| c.trim().to_string()).collect(),
            None => return Self::default(),
        };

        let width = header.len();
        let rows = iter
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, String::new());
                }
                row
            })
            .collect();

        Self { header, rows }
    }

    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// 列名からインデックスを取得（前後空白・大文字小文字を無視）
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let needle = name.trim().to_lowercase();
        self.header
            .iter()
            .position(|h| h.trim().to_lowercase() == needle)
    }

    /// セル値（範囲外は空文字）
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// ヘッダーを含む全行（書き込み用）
    pub fn to_values(&self) -> Vec<Vec<String>> {
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(self.header.clone());
        values.extend(self.rows.iter().cloned());
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_from_raw_rows_pads_and_trims() {
        let sheet = SheetData::from_raw_rows(vec![
            row(&[" Zone ", "Critère", "Note"]),
            row(&["A", "C1"]),
            row(&["B", "C2", "x"]),
            row(&["", "", ""]),
            row(&[]),
        ]);

        assert_eq!(sheet.header, row(&["Zone", "Critère", "Note"]));
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.rows[0], row(&["A", "C1", ""]));
        assert_eq!(sheet.cell(1, 2), "x");
        assert_eq!(sheet.cell(5, 0), "");
    }

    #[test]
    fn test_from_raw_rows_empty() {
        let sheet = SheetData::from_raw_rows(Vec::new());
        assert!(sheet.header.is_empty());
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_column_index_case_insensitive() {
        let sheet = SheetData::new(row(&["Zone", "CRITÈRE"]), Vec::new());
        assert_eq!(sheet.column_index("zone"), Some(0));
        assert_eq!(sheet.column_index(" critère "), Some(1));
        assert_eq!(sheet.column_index("Lien Photo"), None);
    }

    #[test]
    fn test_to_values_header_first() {
        let sheet = SheetData::new(row(&["Zone"]), vec![row(&["A"]), row(&["B"])]);
        let values = sheet.to_values();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], row(&["Zone"]));
    }
}

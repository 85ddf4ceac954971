//! Naive comma-separated table parsing and validation.
//!
//! Tables are a header row plus data rows. Values are split on every comma;
//! quoting is not supported, so a value that itself contains a comma shifts
//! the remaining cells of its row.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::canonical::canonicalize;

/// The four reference tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Equipment,
    Valves,
    Performance,
    Standard,
}

impl TableKind {
    pub const ALL: [TableKind; 4] = [
        TableKind::Equipment,
        TableKind::Valves,
        TableKind::Performance,
        TableKind::Standard,
    ];

    /// File name under the data directory or base URL.
    pub fn file_name(self) -> &'static str {
        match self {
            TableKind::Equipment => "equipment.csv",
            TableKind::Valves => "valves.csv",
            TableKind::Performance => "performance.csv",
            TableKind::Standard => "standard.csv",
        }
    }

    /// Columns a row must carry to produce a record.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            TableKind::Standard => &["control_tag", "name"],
            _ => &["tag", "name"],
        }
    }

    /// Column holding the record key.
    pub fn key_column(self) -> &'static str {
        match self {
            TableKind::Standard => "control_tag",
            _ => "tag",
        }
    }

    /// The standards table is optional; the other three are expected.
    pub fn is_optional(self) -> bool {
        self == TableKind::Standard
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

/// One data row: column name → trimmed cell. Missing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: HashMap<String, String>,
    /// Number of cells beyond the header width.
    overflow: usize,
}

impl Row {
    /// The trimmed cell for `column`, or `""` when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    /// The cell for `column` when it is non-empty.
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        Some(self.get(column)).filter(|v| !v.is_empty())
    }

    pub fn overflow(&self) -> usize {
        self.overflow
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into().trim().to_string()))
                .collect(),
            overflow: 0,
        }
    }
}

/// A parsed table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }
}

/// Parse comma-separated text into a [`Table`].
///
/// Line endings are normalized, blank lines skipped and a leading byte-order
/// mark removed. Text without a header row yields an empty table.
pub fn parse_table(text: &str) -> Table {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = text.split('\n').filter(|l| !l.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Table::default();
    };
    let headers: Vec<String> = header_line
        .split(',')
        .map(|h| h.trim().to_string())
        .collect();

    let rows = lines
        .map(|line| {
            let cols: Vec<&str> = line.split(',').collect();
            let cells = headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), cols.get(i).map(|c| c.trim()).unwrap_or("").to_string()))
                .collect();
            Row {
                cells,
                overflow: cols.len().saturating_sub(headers.len()),
            }
        })
        .collect();

    Table { headers, rows }
}

/// A warning from table validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub table: TableKind,
    /// 1-based data row number (header excluded), if the warning is about a row.
    pub row: Option<usize>,
    pub message: String,
}

/// Validate a parsed table for issues that silently lose data during merge.
pub fn validate_table(kind: TableKind, table: &Table) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let warn = |row: Option<usize>, message: String| ValidationWarning {
        table: kind,
        row,
        message,
    };

    for column in kind.required_columns() {
        if !table.has_column(column) {
            warnings.push(warn(None, format!("missing required column: {column}")));
        }
    }

    let mut seen = HashSet::new();
    for (i, row) in table.rows.iter().enumerate() {
        let n = Some(i + 1);
        let key = match kind {
            TableKind::Standard => row.get("control_tag").to_string(),
            _ => canonicalize(row.get("tag")),
        };

        if key.is_empty() || row.get("name").is_empty() {
            warnings.push(warn(n, format!("row has no {} or name and will be dropped", kind.key_column())));
            continue;
        }
        if row.overflow() > 0 {
            warnings.push(warn(
                n,
                format!(
                    "row has {} more cell(s) than the header, a value probably contains a comma",
                    row.overflow()
                ),
            ));
        }
        // Performance rows are expected to repeat; they are merged.
        if kind != TableKind::Performance && !seen.insert(key.clone()) {
            let policy = if kind == TableKind::Standard {
                "the last row wins"
            } else {
                "the first row wins"
            };
            warnings.push(warn(n, format!("duplicate key {key}, {policy}")));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_table() {
        let table = parse_table("tag,name,floor\nXV101,进料阀,3F\nXV102 , 出料阀 ,\n");
        assert_eq!(table.headers, vec!["tag", "name", "floor"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("floor"), "3F");
        assert_eq!(table.rows[1].get("tag"), "XV102");
        assert_eq!(table.rows[1].get("name"), "出料阀");
        assert_eq!(table.rows[1].non_empty("floor"), None);
    }

    #[test]
    fn parse_handles_crlf_blank_lines_and_bom() {
        let table = parse_table("\u{feff}tag,name\r\n\r\nP101,泵\r\n   \rP102,风机\r");
        assert_eq!(table.headers, vec!["tag", "name"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].get("name"), "风机");
    }

    #[test]
    fn missing_cells_read_as_empty() {
        let table = parse_table("tag,name,medium,power_kw\nP101,泵");
        assert_eq!(table.rows[0].get("medium"), "");
        assert_eq!(table.rows[0].get("no_such_column"), "");
    }

    #[test]
    fn extra_cells_are_counted() {
        let table = parse_table("tag,name\nP101,泵,备用");
        assert_eq!(table.rows[0].overflow(), 1);
        assert_eq!(table.rows[0].get("name"), "泵");
    }

    #[test]
    fn empty_text_is_empty_table() {
        assert_eq!(parse_table(""), Table::default());
        assert_eq!(parse_table("\n\n"), Table::default());
    }

    #[test]
    fn validate_reports_missing_columns_and_dropped_rows() {
        let table = parse_table("tag,floor\nXV101,3F");
        let warnings = validate_table(TableKind::Valves, &table);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("missing required column: name")));
        assert!(warnings
            .iter()
            .any(|w| w.row == Some(1) && w.message.contains("dropped")));
    }

    #[test]
    fn validate_reports_duplicates_except_performance() {
        let text = "tag,name\nP101A,泵A\nP101B,泵B";
        let warnings = validate_table(TableKind::Equipment, &parse_table(text));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate key P101")));

        let warnings = validate_table(TableKind::Performance, &parse_table(text));
        assert!(warnings.is_empty());
    }

    #[test]
    fn validate_reports_overflow() {
        let warnings = validate_table(TableKind::Equipment, &parse_table("tag,name\nP101,泵,备用"));
        assert!(warnings.iter().any(|w| w.message.contains("contains a comma")));
    }
}

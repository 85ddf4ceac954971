//! Record merging: raw table rows → one reconciled record per key.
//!
//! Equipment and valve tables are expected to hold one row per canonical tag,
//! so the first valid row wins. Performance tables routinely split one
//! physical item over several rows (multi-stage pumps, duty/standby figures)
//! and are merged field by field. Standards are keyed by control tag and the
//! last row wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::canonical::canonicalize;
use crate::model::{
    EquipmentRecord, Field, PerformanceRecord, ReferenceData, StandardRecord, ValveRecord,
};
use crate::normalize::normalize;
use crate::table::{Row, Table, TableKind};

/// Bookkeeping from merging one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    /// Data rows seen.
    pub rows: usize,
    /// Records produced.
    pub records: usize,
    /// Rows dropped for lacking a key or a name.
    pub dropped: usize,
    /// Rows folded into an already-seen key.
    pub merged: usize,
}

/// Key and trimmed name of a row, or `None` when the row must be dropped.
fn keyed(row: &Row) -> Option<(String, String)> {
    let tag = canonicalize(row.get("tag"));
    let name = row.get("name").trim().to_string();
    (!tag.is_empty() && !name.is_empty()).then_some((tag, name))
}

pub fn merge_equipment<'a>(
    rows: impl IntoIterator<Item = &'a Row>,
) -> (BTreeMap<String, EquipmentRecord>, MergeStats) {
    let mut map = BTreeMap::new();
    let mut stats = MergeStats::default();
    for row in rows {
        stats.rows += 1;
        let Some((tag, name)) = keyed(row) else {
            stats.dropped += 1;
            continue;
        };
        if map.contains_key(&tag) {
            stats.merged += 1;
            continue;
        }
        map.insert(tag.clone(), EquipmentRecord { tag, name });
    }
    stats.records = map.len();
    (map, stats)
}

pub fn merge_valves<'a>(
    rows: impl IntoIterator<Item = &'a Row>,
) -> (BTreeMap<String, ValveRecord>, MergeStats) {
    let mut map = BTreeMap::new();
    let mut stats = MergeStats::default();
    for row in rows {
        stats.rows += 1;
        let Some((tag, name)) = keyed(row) else {
            stats.dropped += 1;
            continue;
        };
        if map.contains_key(&tag) {
            stats.merged += 1;
            continue;
        }
        let floor = row.non_empty("floor").map(str::to_string);
        map.insert(tag.clone(), ValveRecord { tag, name, floor });
    }
    stats.records = map.len();
    (map, stats)
}

/// Merge performance rows, keeping every distinct reading of a field.
///
/// For each later row with an already-seen tag, every spec field is folded
/// into the existing record: an absent value is adopted; a value whose
/// normalized form is not already contained in the existing one is appended
/// as `existing/new`; a subsumed value is ignored. Rows are processed in
/// input order, so the first-seen reading comes first.
pub fn merge_performance<'a>(
    rows: impl IntoIterator<Item = &'a Row>,
) -> (BTreeMap<String, PerformanceRecord>, MergeStats) {
    let mut map: BTreeMap<String, PerformanceRecord> = BTreeMap::new();
    let mut stats = MergeStats::default();
    for row in rows {
        stats.rows += 1;
        let Some((tag, name)) = keyed(row) else {
            stats.dropped += 1;
            continue;
        };

        let Some(existing) = map.get_mut(&tag) else {
            let specs = Field::PERFORMANCE_SPECS
                .iter()
                .filter_map(|f| row.non_empty(f.column()).map(|v| (*f, v.to_string())))
                .collect();
            map.insert(tag.clone(), PerformanceRecord { tag, name, specs });
            continue;
        };

        stats.merged += 1;
        for field in Field::PERFORMANCE_SPECS {
            let Some(new) = row.non_empty(field.column()) else {
                continue;
            };
            match existing.specs.get_mut(&field) {
                None => {
                    existing.specs.insert(field, new.to_string());
                }
                Some(old) => {
                    if !normalize(Some(old)).contains(&normalize(Some(new))) {
                        tracing::debug!(tag = %existing.tag, %field, old = %old, new, "combining readings");
                        old.push('/');
                        old.push_str(new);
                    }
                }
            }
        }
    }
    stats.records = map.len();
    (map, stats)
}

/// Merge standards keyed by trimmed control tag; the last row wins.
pub fn merge_standards<'a>(
    rows: impl IntoIterator<Item = &'a Row>,
) -> (BTreeMap<String, StandardRecord>, MergeStats) {
    let mut map = BTreeMap::new();
    let mut stats = MergeStats::default();
    for row in rows {
        stats.rows += 1;
        let control_tag = row.get("control_tag").to_string();
        let name = row.get("name").to_string();
        if control_tag.is_empty() || name.is_empty() {
            stats.dropped += 1;
            continue;
        }
        let record = StandardRecord {
            control_tag: control_tag.clone(),
            name,
            tag: row.non_empty("tag").map(str::to_string),
            unit: row.non_empty("unit").map(str::to_string),
            standard: row.non_empty("standard").map(str::to_string),
        };
        if map.insert(control_tag, record).is_some() {
            stats.merged += 1;
        }
    }
    stats.records = map.len();
    (map, stats)
}

/// Merge statistics for every table, keyed by table.
pub type LoadStats = BTreeMap<TableKind, MergeStats>;

impl ReferenceData {
    /// Build reference data from parsed tables. Absent tables yield empty maps.
    pub fn from_tables(
        equipment: Option<&Table>,
        valves: Option<&Table>,
        performance: Option<&Table>,
        standards: Option<&Table>,
    ) -> (Self, LoadStats) {
        fn rows(t: Option<&Table>) -> &[Row] {
            t.map(|t| t.rows.as_slice()).unwrap_or(&[])
        }

        let (equipment, eq_stats) = merge_equipment(rows(equipment));
        let (valves, va_stats) = merge_valves(rows(valves));
        let (performance, pf_stats) = merge_performance(rows(performance));
        let (standards, std_stats) = merge_standards(rows(standards));

        let stats = LoadStats::from([
            (TableKind::Equipment, eq_stats),
            (TableKind::Valves, va_stats),
            (TableKind::Performance, pf_stats),
            (TableKind::Standard, std_stats),
        ]);
        let data = ReferenceData {
            equipment,
            valves,
            performance,
            standards,
        };
        (data, stats)
    }
}

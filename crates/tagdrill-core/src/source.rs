//! Table source trait and reference data loading.
//!
//! Sources are implemented by the `tagdrill-sources` crate.

use async_trait::async_trait;

use crate::merge::LoadStats;
use crate::model::ReferenceData;
use crate::table::{parse_table, validate_table, Table, TableKind, ValidationWarning};

/// Something that can hand out the raw text of the reference tables.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Human-readable source name (e.g. "directory").
    fn name(&self) -> &str;

    /// Fetch the raw text of one table. `Ok(None)` means the table does not exist.
    async fn fetch(&self, kind: TableKind) -> anyhow::Result<Option<String>>;
}

/// Reference data together with what loading it revealed.
#[derive(Debug, Clone, Default)]
pub struct LoadedData {
    pub data: ReferenceData,
    pub stats: LoadStats,
    pub warnings: Vec<ValidationWarning>,
    /// Tables the source did not have.
    pub missing: Vec<TableKind>,
}

/// Fetch all four tables concurrently, then parse, validate and merge them.
///
/// A missing table yields an empty map. Any fetch error fails the load.
pub async fn load_reference_data(source: &dyn TableSource) -> anyhow::Result<LoadedData> {
    let (equipment, valves, performance, standard) = futures::try_join!(
        source.fetch(TableKind::Equipment),
        source.fetch(TableKind::Valves),
        source.fetch(TableKind::Performance),
        source.fetch(TableKind::Standard),
    )?;

    let mut missing = Vec::new();
    let mut warnings = Vec::new();
    let mut parse = |kind: TableKind, text: Option<String>| -> Option<Table> {
        let Some(text) = text else {
            if kind.is_optional() {
                tracing::debug!(table = %kind, source = source.name(), "optional table not present");
            } else {
                tracing::warn!(table = %kind, source = source.name(), "table not found, category will be empty");
            }
            missing.push(kind);
            return None;
        };
        let table = parse_table(&text);
        warnings.extend(validate_table(kind, &table));
        Some(table)
    };

    let equipment = parse(TableKind::Equipment, equipment);
    let valves = parse(TableKind::Valves, valves);
    let performance = parse(TableKind::Performance, performance);
    let standard = parse(TableKind::Standard, standard);

    let (data, stats) = ReferenceData::from_tables(
        equipment.as_ref(),
        valves.as_ref(),
        performance.as_ref(),
        standard.as_ref(),
    );

    for (kind, s) in &stats {
        tracing::debug!(
            table = %kind,
            rows = s.rows,
            records = s.records,
            dropped = s.dropped,
            merged = s.merged,
            "table merged"
        );
    }
    tracing::info!(
        source = source.name(),
        equipment = data.equipment.len(),
        valves = data.valves.len(),
        performance = data.performance.len(),
        standards = data.standards.len(),
        warnings = warnings.len(),
        "reference data loaded"
    );

    Ok(LoadedData {
        data,
        stats,
        warnings,
        missing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FixedSource(HashMap<TableKind, &'static str>);

    #[async_trait]
    impl TableSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch(&self, kind: TableKind) -> anyhow::Result<Option<String>> {
            Ok(self.0.get(&kind).map(|s| s.to_string()))
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TableSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch(&self, kind: TableKind) -> anyhow::Result<Option<String>> {
            anyhow::bail!("cannot read {kind}")
        }
    }

    #[tokio::test]
    async fn loads_present_tables_and_reports_missing() {
        let source = FixedSource(HashMap::from([
            (TableKind::Equipment, "tag,name\nP101,Pump A\nP101B,Pump B"),
            (TableKind::Valves, "tag,name,floor\nXV1,阀,2F"),
        ]));
        let loaded = load_reference_data(&source).await.unwrap();
        assert_eq!(loaded.data.equipment.len(), 1);
        assert_eq!(loaded.data.valves.len(), 1);
        assert!(loaded.data.performance.is_empty());
        assert_eq!(
            loaded.missing,
            vec![TableKind::Performance, TableKind::Standard]
        );
        assert_eq!(loaded.stats[&TableKind::Equipment].merged, 1);
        assert!(loaded
            .warnings
            .iter()
            .any(|w| w.table == TableKind::Equipment && w.message.contains("duplicate")));
    }

    #[tokio::test]
    async fn fetch_error_fails_the_load() {
        let err = load_reference_data(&FailingSource).await.unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}

//! In-memory table source for testing.

use std::collections::HashMap;

use async_trait::async_trait;

use tagdrill_core::source::TableSource;
use tagdrill_core::table::TableKind;

/// A table source serving fixed text, for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<TableKind, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table.
    pub fn with_table(mut self, kind: TableKind, text: impl Into<String>) -> Self {
        self.tables.insert(kind, text.into());
        self
    }
}

#[async_trait]
impl TableSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self, kind: TableKind) -> anyhow::Result<Option<String>> {
        Ok(self.tables.get(&kind).cloned())
    }
}

//! Reference tables read from a local data directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::instrument;

use tagdrill_core::source::TableSource;
use tagdrill_core::table::TableKind;

use crate::error::SourceError;

/// Reads `<dir>/equipment.csv` and friends.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl TableSource for DirectorySource {
    fn name(&self) -> &str {
        "directory"
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn fetch(&self, kind: TableKind) -> anyhow::Result<Option<String>> {
        let path = self.dir.join(kind.file_name());
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SourceError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagdrill_core::load_reference_data;

    #[tokio::test]
    async fn reads_existing_and_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("equipment.csv"), "tag,name\nP101,Pump A\n").unwrap();

        let source = DirectorySource::new(dir.path());
        let text = source.fetch(TableKind::Equipment).await.unwrap();
        assert_eq!(text.as_deref(), Some("tag,name\nP101,Pump A\n"));
        assert!(source.fetch(TableKind::Standard).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn loads_reference_data_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("equipment.csv"), "tag,name\r\nP101A,给水泵\r\n").unwrap();
        std::fs::write(dir.path().join("valves.csv"), "tag,name,floor\nXV1,进料阀,3F\n").unwrap();
        std::fs::write(
            dir.path().join("performance.csv"),
            "tag,name,flow_m3h\nP101,给水泵,120\nP101B,给水泵,250\n",
        )
        .unwrap();

        let loaded = load_reference_data(&DirectorySource::new(dir.path()))
            .await
            .unwrap();
        assert_eq!(loaded.data.equipment["P101"].name, "给水泵");
        assert_eq!(
            loaded.data.performance["P101"].spec(tagdrill_core::Field::FlowM3h),
            Some("120/250")
        );
        assert_eq!(loaded.missing, vec![TableKind::Standard]);
    }

    #[tokio::test]
    async fn directory_as_table_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("valves.csv")).unwrap();
        let source = DirectorySource::new(dir.path());
        assert!(source.fetch(TableKind::Valves).await.is_err());
    }
}

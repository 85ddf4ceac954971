pub mod init;
pub mod quiz;
pub mod stats;
pub mod validate;
pub mod wrongbook;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use tagdrill_core::proficiency::{FileStore, ProficiencyTracker};
use tagdrill_core::{load_reference_data, LoadedData, ReferenceData};
use tagdrill_sources::{create_source, TagdrillConfig};

/// Proficiency tracker backed by the configured store directory.
pub fn open_tracker(config: &TagdrillConfig) -> ProficiencyTracker {
    ProficiencyTracker::open(Arc::new(FileStore::new(config.store_dir.clone())))
}

/// Load the reference tables from the configured source.
pub async fn load_data(config: &TagdrillConfig) -> Result<LoadedData> {
    let source = create_source(&config.source);
    load_reference_data(source.as_ref()).await
}

/// Reference data for annotating reports; a failing source yields no names.
pub async fn load_names(config: &TagdrillConfig) -> ReferenceData {
    match load_data(config).await {
        Ok(loaded) => loaded.data,
        Err(e) => {
            tracing::warn!("reference tables unavailable, names will be missing: {e:#}");
            ReferenceData::default()
        }
    }
}

/// Write `content` to `path`, or to stdout when no path is given.
pub fn emit(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
            eprintln!("Written to: {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

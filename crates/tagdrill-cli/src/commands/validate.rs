//! The `tagdrill validate` command.

use std::path::PathBuf;

use anyhow::Result;

use tagdrill_core::table::TableKind;
use tagdrill_core::{load_reference_data, TableSource};
use tagdrill_sources::{create_source, load_config_from, DirectorySource};

pub async fn execute(data_dir: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    let source: Box<dyn TableSource> = match data_dir {
        Some(dir) => {
            anyhow::ensure!(dir.is_dir(), "data directory not found: {}", dir.display());
            Box::new(DirectorySource::new(dir))
        }
        None => create_source(&load_config_from(config.as_deref())?.source),
    };

    let loaded = load_reference_data(source.as_ref()).await?;
    let mut total_warnings = loaded.warnings.len();

    for kind in TableKind::ALL {
        if loaded.missing.contains(&kind) {
            if kind.is_optional() {
                println!("{kind}: not present (optional)");
            } else {
                println!("{kind}: MISSING");
                total_warnings += 1;
            }
            continue;
        }
        let s = loaded.stats.get(&kind).copied().unwrap_or_default();
        println!(
            "{kind}: {} rows, {} records ({} dropped, {} merged)",
            s.rows, s.records, s.dropped, s.merged
        );
        for w in loaded.warnings.iter().filter(|w| w.table == kind) {
            let prefix = w
                .row
                .map(|n| format!("  [row {n}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
    }

    if total_warnings == 0 {
        println!("All tables valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

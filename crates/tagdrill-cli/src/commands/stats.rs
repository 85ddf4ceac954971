//! The `tagdrill stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use tagdrill_core::statistics::{wrongbook, ProficiencySummary};
use tagdrill_report::html::{write_html_report, Dashboard};
use tagdrill_sources::load_config_from;

use super::{emit, load_names, open_tracker};

const DEFAULT_HTML_PATH: &str = "tagdrill-report.html";

pub async fn execute(format: String, output: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config.as_deref())?;
    let tracker = open_tracker(&config);
    let entries = tracker.snapshot();
    let summary = ProficiencySummary::from_entries(&entries);

    match format.as_str() {
        "text" => emit(&render_text(&summary), output.as_deref()),
        "json" => emit(&serde_json::to_string_pretty(&summary)?, output.as_deref()),
        "html" => {
            let data = load_names(&config).await;
            let dashboard = Dashboard::new(summary, wrongbook(&entries, &data));
            let path = output.unwrap_or_else(|| PathBuf::from(DEFAULT_HTML_PATH));
            write_html_report(&dashboard, &path)?;
            eprintln!("HTML report: {}", path.display());
            Ok(())
        }
        other => anyhow::bail!("unknown format '{other}', expected text, json or html"),
    }
}

fn render_text(summary: &ProficiencySummary) -> String {
    if summary.entries == 0 {
        return "No proficiency recorded yet. Run `tagdrill quiz` first.".to_string();
    }

    let mut overview = Table::new();
    overview.set_header(vec!["Items", "Correct", "Wrong", "Accuracy", "Avg level"]);
    overview.add_row(vec![
        Cell::new(summary.entries),
        Cell::new(summary.total_correct),
        Cell::new(summary.total_wrong),
        Cell::new(format!("{}%", summary.accuracy_percent())),
        Cell::new(format!("{:.2}", summary.average_level)),
    ]);

    let mut categories = Table::new();
    categories.set_header(vec!["Category", "Items", "Correct", "Wrong", "Accuracy"]);
    for c in &summary.categories {
        categories.add_row(vec![
            Cell::new(c.category),
            Cell::new(c.entries),
            Cell::new(c.correct),
            Cell::new(c.wrong),
            Cell::new(format!("{}%", c.accuracy_percent)),
        ]);
    }

    let mut levels = Table::new();
    levels.set_header(vec!["Level", "0", "1", "2", "3", "4", "5"]);
    let mut row = vec![Cell::new("Items")];
    row.extend(summary.level_distribution.iter().map(|n| Cell::new(n)));
    levels.add_row(row);

    format!("{overview}\n\n{categories}\n\n{levels}")
}

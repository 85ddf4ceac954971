//! The `tagdrill wrongbook` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use tagdrill_core::statistics::{wrongbook, WrongbookEntry};
use tagdrill_sources::load_config_from;

use super::{load_names, open_tracker};

pub async fn execute(format: String, config: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config.as_deref())?;
    let entries = open_tracker(&config).snapshot();
    let data = load_names(&config).await;
    let book = wrongbook(&entries, &data);

    match format.as_str() {
        "text" => {
            if book.is_empty() {
                println!("No wrong answers recorded.");
            } else {
                println!("{}", render_table(&book));
                println!("\n{} item(s) to review.", book.len());
            }
        }
        "json" => println!("{}", serde_json::to_string_pretty(&book)?),
        other => anyhow::bail!("unknown format '{other}', expected text or json"),
    }
    Ok(())
}

fn render_table(book: &[WrongbookEntry]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Severity", "Category", "Tag", "Name", "Wrong", "Correct", "Level"]);
    for e in book {
        table.add_row(vec![
            Cell::new(e.severity),
            Cell::new(e.category.map(|c| c.label()).unwrap_or("?")),
            Cell::new(&e.tag),
            Cell::new(e.name.as_deref().unwrap_or("-")),
            Cell::new(e.wrong),
            Cell::new(e.correct),
            Cell::new(e.level),
        ]);
    }
    table
}

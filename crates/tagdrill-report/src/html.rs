//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use tagdrill_core::statistics::{CategoryAccuracy, LevelBand, ProficiencySummary, WrongbookEntry};

/// Everything shown on the report page.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub created_at: DateTime<Utc>,
    pub summary: ProficiencySummary,
    pub wrongbook: Vec<WrongbookEntry>,
}

impl Dashboard {
    pub fn new(summary: ProficiencySummary, wrongbook: Vec<WrongbookEntry>) -> Self {
        Self {
            created_at: Utc::now(),
            summary,
            wrongbook,
        }
    }
}

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate the HTML dashboard.
pub fn generate_html(dashboard: &Dashboard) -> String {
    let summary = &dashboard.summary;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"zh\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>tagdrill report</title>\n");
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>tagdrill report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} items tracked | {}</p>\n",
        summary.entries,
        dashboard.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary cards
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n<div class=\"cards\">\n");
    let cards = [
        ("Items", summary.entries.to_string()),
        ("Accuracy", format!("{}%", summary.accuracy_percent())),
        ("Correct", summary.total_correct.to_string()),
        ("Wrong", summary.total_wrong.to_string()),
        ("Average level", format!("{:.2}", summary.average_level)),
        ("To review", dashboard.wrongbook.len().to_string()),
    ];
    for (label, value) in cards {
        html.push_str(&format!(
            "<div class=\"card\"><div class=\"value\">{value}</div><div class=\"label\">{label}</div></div>\n"
        ));
    }
    html.push_str("</div>\n");

    if !summary.categories.is_empty() {
        html.push_str("<h3>Accuracy by category</h3>\n");
        html.push_str(&generate_bar_chart(&summary.categories));
    }

    if summary.entries > 0 {
        html.push_str("<h3>Level distribution</h3>\n");
        html.push_str(&generate_level_bar(summary));
    }
    html.push_str("</section>\n");

    // Proficiency table
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Proficiency</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"proficiency\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable('proficiency', 0)\">Category</th><th onclick=\"sortTable('proficiency', 1)\">Tag</th><th onclick=\"sortTable('proficiency', 2)\">Level</th><th onclick=\"sortTable('proficiency', 3)\">Correct</th><th onclick=\"sortTable('proficiency', 4)\">Wrong</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for e in &summary.ranked {
        let category = e.category.map(|c| c.label()).unwrap_or("?");
        let band = LevelBand::from_level(e.record.level);
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td><span class=\"badge\" style=\"background:{}\">{}</span></td><td>{}</td><td>{}</td></tr>\n",
            html_escape(category),
            html_escape(&e.tag),
            band.colour(),
            e.record.level,
            e.record.correct,
            e.record.wrong,
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Wrong-answer book
    html.push_str("<section class=\"wrongbook\">\n");
    html.push_str("<h2>Wrong-answer book</h2>\n");
    if dashboard.wrongbook.is_empty() {
        html.push_str("<p class=\"meta\">No wrong answers recorded.</p>\n");
    } else {
        html.push_str("<table class=\"results-table\" id=\"wrongbook\">\n");
        html.push_str("<thead><tr><th onclick=\"sortTable('wrongbook', 0)\">Severity</th><th onclick=\"sortTable('wrongbook', 1)\">Category</th><th onclick=\"sortTable('wrongbook', 2)\">Tag</th><th onclick=\"sortTable('wrongbook', 3)\">Name</th><th onclick=\"sortTable('wrongbook', 4)\">Wrong</th><th onclick=\"sortTable('wrongbook', 5)\">Level</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for w in &dashboard.wrongbook {
            let category = w.category.map(|c| c.label()).unwrap_or("?");
            html.push_str(&format!(
                "<tr><td><span class=\"badge\" style=\"background:{}\">{}</span></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                w.severity.colour(),
                w.severity,
                html_escape(category),
                html_escape(&w.tag),
                html_escape(w.name.as_deref().unwrap_or("-")),
                w.wrong,
                w.level,
            ));
        }
        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(dashboard).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(dashboard: &Dashboard, path: &Path) -> Result<()> {
    let html = generate_html(dashboard);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

fn generate_bar_chart(categories: &[CategoryAccuracy]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 120;

    let total_height = categories.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, c) in categories.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let pct = c.accuracy_percent.min(100) as usize;
        let width = pct * max_width / 100;

        let color = if pct >= 80 {
            "#22c55e"
        } else if pct >= 50 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(c.category.label())
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}% ({}/{})</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            pct,
            c.correct,
            c.correct + c.wrong
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Stacked bar of entries per level, coloured by band.
fn generate_level_bar(summary: &ProficiencySummary) -> String {
    let mut bar = String::from("<div class=\"levels\">\n");
    for (level, count) in summary.level_distribution.iter().enumerate() {
        if *count == 0 {
            continue;
        }
        let share = *count as f64 * 100.0 / summary.entries as f64;
        let band = LevelBand::from_level(level as u8);
        bar.push_str(&format!(
            "  <div class=\"level\" style=\"width:{share:.2}%;background:{}\" title=\"level {level}: {count}\">L{level} {count}</div>\n",
            band.colour()
        ));
    }
    bar.push_str("</div>\n");
    bar
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --card: #f9fafb; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --card: #1f2937; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'PingFang SC', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.cards { display: flex; flex-wrap: wrap; gap: 1rem; }
.card { background: var(--card); border: 1px solid var(--border); border-radius: 8px; padding: 1rem 1.5rem; min-width: 8rem; }
.card .value { font-size: 1.6rem; font-weight: bold; }
.card .label { color: #6b7280; }
.levels { display: flex; width: 100%; height: 2rem; border-radius: 8px; overflow: hidden; margin: 1rem 0; }
.level { color: #fff; font-size: 0.8rem; display: flex; align-items: center; justify-content: center; white-space: nowrap; overflow: hidden; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.badge { color: #fff; border-radius: 4px; padding: 0.1rem 0.5rem; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(id, col) {
  const table = document.getElementById(id);
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = Number(va), nb = Number(vb);
    const cmp = !isNaN(na) && !isNaN(nb) ? na - nb : va.localeCompare(vb);
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

//! tagdrill-report: self-contained HTML reports of learning progress.

pub mod html;

pub use html::{generate_html, write_html_report, Dashboard};

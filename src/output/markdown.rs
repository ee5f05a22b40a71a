//! Markdown summary generation
//!
//! Renders the run summary as a short human-readable report.

use crate::output::stats::RunSummary;
use crate::output::traits::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary to `output_path`
pub fn generate_markdown_summary(summary: &RunSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(summary: &RunSummary) -> String {
    let mut md = String::new();

    md.push_str("# Health-Harvest Run Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!(
        "- **Scrape Date**: {}\n",
        summary.scrape_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    md.push_str("## Sources\n\n");
    md.push_str("| Sources | Count |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!("| Configured | {} |\n", summary.sources_total));
    md.push_str(&format!(
        "| Blocked by robots.txt | {} |\n",
        summary.sources_blocked
    ));
    md.push_str(&format!("| Failed | {} |\n\n", summary.sources_failed));

    md.push_str("## Requests\n\n");
    md.push_str(&format!("- **Pages Scraped**: {}\n", summary.pages_scraped));
    md.push_str(&format!(
        "- **URLs Visited**: {}\n",
        summary.total_urls_visited
    ));
    md.push_str(&format!(
        "- **Requests Made**: {}\n\n",
        summary.total_requests
    ));

    md.push_str("## Extracted Records\n\n");
    md.push_str("| Record | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Documents | {} |\n", summary.documents_found));
    md.push_str(&format!("| Articles | {} |\n", summary.articles_found));
    md.push_str(&format!("| Tables | {} |\n", summary.tables_found));
    md.push_str(&format!("| Unique Emails | {} |\n", summary.unique_emails));
    md.push_str(&format!("| Unique Phones | {} |\n", summary.unique_phones));

    if summary.records_found() == 0 {
        md.push_str("\n_No records were extracted in this run._\n");
    }

    md
}

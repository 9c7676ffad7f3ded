//! Markdown summary generation
//!
//! This module generates a human-readable markdown report of a finished crawl.

use crate::output::summary::{CrawlSummary, OutputResult};
use crate::state::PageState;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of the crawl to `output_path`
///
/// Missing parent directories are created.
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let stats = &summary.stats;
    let mut md = String::new();

    // Title
    md.push_str("# Trawler Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", summary.seed));
    md.push_str(&format!("- **Files**: {}\n", summary.selector));
    md.push_str(&format!(
        "- **Output**: {}\n",
        summary.output_dir.display()
    ));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        summary.finished_at.to_rfc3339()
    ));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        stats.elapsed_seconds()
    ));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Crawled**: {}\n", stats.pages_crawled));
    md.push_str(&format!("- **Pages Queued**: {}\n", stats.pages_enqueued));
    md.push_str(&format!(
        "- **Files Downloaded**: {}\n",
        stats.files_downloaded
    ));
    md.push_str(&format!("- **Files Skipped**: {}\n", stats.files_skipped));
    md.push_str(&format!("- **Files Failed**: {}\n", stats.files_failed));
    md.push_str(&format!("- **Pages Saved**: {}\n", stats.pages_saved));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n",
        summary.success_rate()
    ));
    md.push_str(&format!(
        "- **Error Rate**: {:.2}%\n\n",
        summary.error_rate()
    ));

    // State breakdown
    md.push_str("## Page State Breakdown\n\n");
    md.push_str("| State | Count |\n");
    md.push_str("|-------|-------|\n");
    for state in PageState::all_states() {
        md.push_str(&format!("| {} | {} |\n", state_label(state), stats.count(state)));
    }
    md.push('\n');

    // Depth breakdown
    if !stats.pages_by_depth.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");

        for (depth, count) in &stats.pages_by_depth {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    md
}

fn state_label(state: PageState) -> &'static str {
    match state {
        PageState::Processed => "Processed",
        PageState::ContentMismatch => "Content Mismatch",
        PageState::DeadLink => "Dead Link (404)",
        PageState::Unreachable => "Unreachable",
        PageState::RateLimited => "Rate Limited",
        PageState::Failed => "Failed",
    }
}

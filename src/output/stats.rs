//! Console rendering of crawl statistics

use crate::output::summary::CrawlSummary;
use crate::state::PageState;

/// Prints the end-of-crawl summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    let stats = &summary.stats;

    println!();
    println!("=== Crawl Complete ===\n");

    println!("Overview:");
    println!("  Seed: {}", summary.seed);
    println!("  Files: {}", summary.selector);
    println!("  Pages crawled: {}", stats.pages_crawled);
    println!("  Files downloaded: {}", stats.files_downloaded);
    println!("  Pages saved: {}", stats.pages_saved);
    println!("  Time elapsed: {:.2} seconds", stats.elapsed_seconds());
    println!();

    let completed = summary.total_completed_pages();
    if completed > 0 {
        println!("Pages by State:");
        // Sort states by count (descending)
        let mut state_counts: Vec<(PageState, u32)> = stats
            .page_states
            .iter()
            .map(|(state, count)| (*state, *count))
            .collect();
        state_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));

        for (state, count) in state_counts {
            let percentage = (count as f64 / completed as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", state, count, percentage);
        }
        println!();
    }

    if stats.files_skipped > 0 || stats.files_failed > 0 {
        println!("Files:");
        println!("  Skipped: {}", stats.files_skipped);
        println!("  Failed: {}", stats.files_failed);
        println!();
    }

    println!("Success rate: {:.1}%", summary.success_rate());
    println!("Files saved to: {}", summary.output_dir.display());
}

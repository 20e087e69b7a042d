//! Output formatting and styling module.
//!
//! All terminal output of the binary goes through here: colored status lines,
//! the progress bar for organize runs and the per-category summary table.

use crate::file_category::Category;
use crate::file_organizer::{Progress, ProgressSink};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints a table of per-category counts in table order, zeros included.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filesorter::file_category::Category;
    /// use filesorter::output::OutputFormatter;
    ///
    /// let counts = vec![(Category::Images, 2), (Category::Documents, 1)];
    /// OutputFormatter::summary_table("SUMMARY", counts);
    /// ```
    pub fn summary_table(title: &str, counts: impl IntoIterator<Item = (Category, usize)>) {
        Self::header(title);

        let rows: Vec<(Category, usize)> = counts.into_iter().collect();
        let total: usize = rows.iter().map(|(_, count)| count).sum();
        let width = rows
            .iter()
            .map(|(category, _)| category.dir_name().len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));
        for (category, count) in &rows {
            println!(
                "{:<width$} | {} {}",
                category.dir_name(),
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }
        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            plural(total),
            width = width
        );
    }

    /// Creates a progress bar sized for an organize run.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {percent}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

/// Drives an `indicatif` progress bar from organize progress updates.
///
/// The bar is created lazily on the first update, since the total is only
/// known once the root has been scanned.
#[derive(Default)]
pub struct ProgressBarSink {
    bar: Option<ProgressBar>,
}

impl ProgressBarSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the bar from the terminal, if one was shown.
    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

impl ProgressSink for ProgressBarSink {
    fn on_progress(&mut self, progress: Progress) {
        let bar = self
            .bar
            .get_or_insert_with(|| OutputFormatter::create_progress_bar(progress.total as u64));
        bar.set_position(progress.processed as u64);
        bar.set_message(format!("{} moved", progress.moved));
    }
}

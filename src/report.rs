//! Per-file outcomes, the run summary they fold into, and the console
//! report rendered from both.

use crate::constants::{BANNER_WIDTH, ERROR_PREFIX, OK_PREFIX};
use crate::processing::OptimizationStats;
use crate::utils::{calculate_reduction, display_name, format_kb, format_signed_kb};
use crate::{error, info};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Optimized(OptimizationStats),
    Failed { path: PathBuf, reason: String },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Optimized(stats) => &stats.path,
            FileOutcome::Failed { path, .. } => path,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Optimized(_))
    }
}

/// Running totals for one batch. Only successful files contribute bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub total_before: u64,
    pub total_after: u64,
    pub failures: Vec<(PathBuf, String)>,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &FileOutcome) {
        self.attempted += 1;
        match outcome {
            FileOutcome::Optimized(stats) => {
                self.succeeded += 1;
                self.total_before += stats.original_size;
                self.total_after += stats.optimized_size;
            }
            FileOutcome::Failed { path, reason } => {
                self.failures.push((path.clone(), reason.clone()));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attempted == 0
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn space_saved(&self) -> i64 {
        self.total_before as i64 - self.total_after as i64
    }

    /// `None` when nothing was attempted or nothing succeeded.
    pub fn saved_percent(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        calculate_reduction(self.total_before, self.total_after)
    }
}

fn rule() -> String {
    "=".repeat(BANNER_WIDTH)
}

pub fn banner_lines(title: &str) -> Vec<String> {
    vec![rule(), title.to_string(), rule(), String::new()]
}

pub fn outcome_lines(outcome: &FileOutcome) -> Vec<String> {
    match outcome {
        FileOutcome::Optimized(stats) => {
            let reduction = stats
                .reduction_percent()
                .map(|p| format!("{:.1}% reduction", p))
                .unwrap_or_else(|| "n/a reduction".to_string());

            let mut lines = vec![
                format!("{} {}", OK_PREFIX, display_name(&stats.path)),
                format!(
                    "  {} -> {} ({})",
                    format_kb(stats.original_size),
                    format_kb(stats.optimized_size),
                    reduction
                ),
            ];
            if stats.resized() {
                let (w, h) = stats.original_dimensions;
                let (nw, nh) = stats.final_dimensions;
                lines.push(format!("  resized {}x{} -> {}x{}", w, h, nw, nh));
            }
            lines
        }
        FileOutcome::Failed { path, reason } => {
            vec![format!("{} {}: {}", ERROR_PREFIX, display_name(path), reason)]
        }
    }
}

pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![rule(), "Optimization Complete!".to_string(), rule()];
    lines.push(format!(
        "Successfully optimized: {}/{} images",
        summary.succeeded, summary.attempted
    ));
    lines.push(format!(
        "Total size reduction: {} -> {}",
        format_kb(summary.total_before),
        format_kb(summary.total_after)
    ));

    let saved = format_signed_kb(summary.space_saved());
    match summary.saved_percent() {
        Some(percent) => lines.push(format!("Space saved: {} ({:.1}%)", saved, percent)),
        None => lines.push(format!("Space saved: {}", saved)),
    }

    if summary.has_failures() {
        lines.push(format!("Failed files: {}", summary.failed()));
    }
    lines
}

pub fn print_banner(title: &str) {
    for line in banner_lines(title) {
        info!("{}", line);
    }
}

pub fn print_found(count: usize) {
    info!("Found {} images to optimize", count);
    info!("");
}

pub fn print_no_images(directory: &Path) {
    info!("No images found in {}!", directory.display());
}

pub fn print_outcome(outcome: &FileOutcome) {
    let lines = outcome_lines(outcome);
    if outcome.is_success() {
        for line in lines {
            info!("{}", line);
        }
    } else {
        for line in lines {
            error!("{}", line);
        }
    }
    info!("");
}

pub fn print_summary(summary: &RunSummary) {
    for line in summary_lines(summary) {
        info!("{}", line);
    }
}

use crate::config::BatchConfig;
use crate::constants::PROGRESS_TEMPLATE;
use crate::error::Result;
use crate::logger;
use crate::processing::{optimize_file, OptimizeOptions};
use crate::report::{self, FileOutcome, RunSummary};
use crate::warn;
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;
use walkdir::WalkDir;

const REPORT_TITLE: &str = "JPEG Image Optimization";

const CASE_SENSITIVE: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).map_err(Into::into))
        .collect()
}

pub fn matches_any(file_name: &str, patterns: &[Pattern]) -> bool {
    patterns
        .iter()
        .any(|p| p.matches_with(file_name, CASE_SENSITIVE))
}

/// Lists regular files directly inside `directory` whose names match any
/// pattern. The result is deduplicated and sorted by file name. Entries that
/// cannot be read, such as dangling symlinks, are skipped with a warning.
pub fn collect_image_files(directory: &Path, patterns: &[Pattern]) -> Vec<PathBuf> {
    let mut image_files = BTreeSet::new();

    let walker = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping {}", err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let matched = matches_any(&entry.file_name().to_string_lossy(), patterns);
        if matched {
            image_files.insert(entry.into_path());
        }
    }

    image_files.into_iter().collect()
}

/// Number of workers for a pooled run: the requested count, capped by the
/// CPU count and by how many files there are.
pub fn worker_count(jobs: usize, file_count: usize) -> usize {
    jobs.min(num_cpus::get()).min(file_count).max(1)
}

/// Optimizes every matching file in `config.directory` and prints the report.
///
/// Per-file failures are recorded in the returned summary, never returned
/// as errors. Only an invalid configuration or a worker pool that cannot be
/// built make this fail.
pub fn run(config: &BatchConfig) -> Result<RunSummary> {
    let patterns = config.validate()?;
    report::print_banner(REPORT_TITLE);

    let image_files = if config.directory.is_dir() {
        collect_image_files(&config.directory, &patterns)
    } else {
        warn!("directory {} does not exist", config.directory.display());
        Vec::new()
    };

    if image_files.is_empty() {
        report::print_no_images(&config.directory);
        return Ok(RunSummary::default());
    }

    report::print_found(image_files.len());
    debug!(
        files = image_files.len(),
        jobs = config.jobs,
        target_size_kb = config.target_size_kb,
        "starting batch (target size is informational only)"
    );

    let start_time = Instant::now();
    let summary = if config.jobs <= 1 {
        run_sequential(&image_files, &config.options)
    } else {
        run_pooled(&image_files, &config.options, config.jobs)?
    };
    debug!(elapsed = ?start_time.elapsed(), "batch finished");

    report::print_summary(&summary);
    Ok(summary)
}

fn run_sequential(image_files: &[PathBuf], options: &OptimizeOptions) -> RunSummary {
    let mut summary = RunSummary::default();
    for path in image_files {
        let outcome = optimize_file(path, options);
        report::print_outcome(&outcome);
        summary.record(&outcome);
    }
    summary
}

fn run_pooled(image_files: &[PathBuf], options: &OptimizeOptions, jobs: usize) -> Result<RunSummary> {
    let workers = worker_count(jobs, image_files.len());
    debug!(workers, "building worker pool");
    let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;

    let progress = if logger::is_quiet() {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(image_files.len() as u64)
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    // Workers only produce outcomes; folding stays on this thread, in input
    // order, so totals and output match a sequential run exactly.
    let outcomes: Vec<FileOutcome> = pool.install(|| {
        image_files
            .par_iter()
            .map(|path| {
                let outcome = optimize_file(path, options);
                progress.inc(1);
                outcome
            })
            .collect()
    });
    progress.finish_and_clear();

    let mut summary = RunSummary::default();
    for outcome in &outcomes {
        report::print_outcome(outcome);
        summary.record(outcome);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn default_patterns() -> Vec<Pattern> {
        compile_patterns(&["*.jpg".to_string(), "*.JPG".to_string()]).unwrap()
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_matches_any_is_case_sensitive() {
        let patterns = default_patterns();
        assert!(matches_any("a.jpg", &patterns));
        assert!(matches_any("a.JPG", &patterns));
        assert!(!matches_any("a.Jpg", &patterns));
        assert!(!matches_any("a.jpeg", &patterns));
        assert!(!matches_any("a.png", &patterns));
    }

    #[test]
    fn test_collect_image_files_sorted() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["c.jpg", "b.jpg", "a.JPG", "notes.txt", "d.png"] {
            File::create(temp_dir.path().join(name)).unwrap();
        }

        let files = collect_image_files(temp_dir.path(), &default_patterns());
        assert_eq!(names(&files), vec!["a.JPG", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn test_collect_image_files_deduplicates_overlapping_patterns() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("one.jpg")).unwrap();

        let patterns = compile_patterns(&["*.jpg".to_string(), "one.*".to_string()]).unwrap();
        let files = collect_image_files(temp_dir.path(), &patterns);
        assert_eq!(names(&files), vec!["one.jpg"]);
    }

    #[test]
    fn test_collect_image_files_non_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("nested.jpg");
        fs::create_dir(&subdir).unwrap();
        File::create(subdir.join("deep.jpg")).unwrap();
        File::create(temp_dir.path().join("top.jpg")).unwrap();

        let files = collect_image_files(temp_dir.path(), &default_patterns());
        assert_eq!(names(&files), vec!["top.jpg"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_image_files_skips_dangling_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("a.jpg")).unwrap();
        File::create(temp_dir.path().join("b.jpg")).unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("gone.txt"),
            temp_dir.path().join("stale-link.txt"),
        )
        .unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("gone.jpg"),
            temp_dir.path().join("stale-link.jpg"),
        )
        .unwrap();

        let files = collect_image_files(temp_dir.path(), &default_patterns());
        assert_eq!(names(&files), vec!["a.jpg", "b.jpg"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_survives_dangling_symlink() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.jpg"), b"garbage").unwrap();
        fs::write(temp_dir.path().join("b.jpg"), b"garbage").unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("gone.txt"),
            temp_dir.path().join("stale-link.txt"),
        )
        .unwrap();

        let summary = run(&BatchConfig::new(temp_dir.path())).unwrap();
        assert_eq!(summary.attempted, 2);
    }

    #[test]
    fn test_collect_image_files_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let files = collect_image_files(temp_dir.path(), &default_patterns());
        assert!(files.is_empty());
    }

    #[test]
    fn test_worker_count_bounds() {
        assert_eq!(worker_count(4, 0), 1);
        assert_eq!(worker_count(1, 10), 1);
        assert_eq!(worker_count(64, 2), 2.min(num_cpus::get()));
        assert!(worker_count(usize::MAX, usize::MAX) <= num_cpus::get());
    }

    #[test]
    fn test_run_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let config = BatchConfig::new(temp_dir.path().join("missing"));

        let summary = run(&config).unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary.saved_percent(), None);
    }

    #[test]
    fn test_run_counts_corrupt_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.jpg"), b"garbage").unwrap();

        let summary = run(&BatchConfig::new(temp_dir.path())).unwrap();
        assert_eq!(summary.attempted, 1);
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.total_before, 0);
    }
}

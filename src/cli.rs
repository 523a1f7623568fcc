use crate::config::BatchConfig;
use crate::constants::{
    DEFAULT_DIRECTORY, DEFAULT_JOBS, DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY,
    DEFAULT_TARGET_SIZE_KB,
};
use crate::processing::{OptimizeOptions, WriteMode};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "img-optimize",
    about = "Shrink and re-encode every JPEG in a directory, in place",
    long_about = "img-optimize scans one directory (non-recursively) for JPEG files, flattens any \
                  transparency onto white, downsizes images larger than the bounding box while \
                  keeping their aspect ratio, and overwrites each file with a progressive JPEG \
                  at a fixed quality. Files that fail are reported and skipped.",
    version,
    after_help = "EXAMPLES:\n  \
    img-optimize\n  \
    img-optimize ./site/Pictures -q 78 -w 1600 -H 1000\n  \
    img-optimize ./photos --pattern '*.jpeg' --safe-write -j 4"
)]
pub struct Args {
    #[arg(
        env = "IMG_OPTIMIZE_DIR",
        default_value = DEFAULT_DIRECTORY,
        help = "Directory holding the images (not searched recursively)"
    )]
    pub directory: PathBuf,

    #[arg(
        short = 'p',
        long = "pattern",
        value_name = "GLOB",
        default_values = ["*.jpg", "*.JPG"],
        help = "File name pattern to include (repeatable, case-sensitive)"
    )]
    pub patterns: Vec<String>,

    #[arg(
        short = 'w',
        long,
        env = "IMG_OPTIMIZE_MAX_WIDTH",
        default_value_t = DEFAULT_MAX_WIDTH,
        value_parser = clap::value_parser!(u32).range(1..=65535),
        help = "Maximum width in pixels"
    )]
    pub max_width: u32,

    #[arg(
        short = 'H',
        long,
        env = "IMG_OPTIMIZE_MAX_HEIGHT",
        default_value_t = DEFAULT_MAX_HEIGHT,
        value_parser = clap::value_parser!(u32).range(1..=65535),
        help = "Maximum height in pixels"
    )]
    pub max_height: u32,

    #[arg(
        short = 'q',
        long,
        env = "IMG_OPTIMIZE_QUALITY",
        default_value_t = DEFAULT_QUALITY,
        value_parser = clap::value_parser!(u8).range(1..=100),
        help = "JPEG quality (1-100)"
    )]
    pub quality: u8,

    #[arg(
        long,
        default_value_t = DEFAULT_TARGET_SIZE_KB,
        help = "Target file size in KB (informational, does not change encoding)"
    )]
    pub target_size_kb: u32,

    #[arg(
        long,
        help = "Write to a temporary file and rename it over the original"
    )]
    pub safe_write: bool,

    #[arg(
        short = 'j',
        long,
        default_value_t = DEFAULT_JOBS,
        help = "Number of files processed in parallel (capped by CPU count)"
    )]
    pub jobs: usize,

    #[arg(long, help = "Exit with status 1 when any file fails")]
    pub fail_on_error: bool,

    #[arg(long, conflicts_with = "verbose", help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, help = "Print diagnostic details to stderr")]
    pub verbose: bool,
}

impl Args {
    pub fn write_mode(&self) -> WriteMode {
        if self.safe_write {
            WriteMode::TempThenRename
        } else {
            WriteMode::InPlace
        }
    }

    pub fn to_config(&self) -> BatchConfig {
        BatchConfig {
            directory: self.directory.clone(),
            patterns: self.patterns.clone(),
            options: OptimizeOptions {
                max_width: self.max_width,
                max_height: self.max_height,
                quality: self.quality,
                write_mode: self.write_mode(),
            },
            target_size_kb: self.target_size_kb,
            jobs: self.jobs,
        }
    }
}

pub mod batch;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod logger;
pub mod processing;
pub mod report;
pub mod utils;

pub use batch::{collect_image_files, compile_patterns, run};
pub use config::BatchConfig;
pub use error::{OptimizeError, Result};
pub use processing::{
    downsample, encode_jpeg, fit_within, normalize_color_mode, optimize_file, optimize_image,
    ColorMode, OptimizationStats, OptimizeOptions, WriteMode,
};
pub use report::{FileOutcome, RunSummary};

pub const DEFAULT_DIRECTORY: &str = "Pictures";
pub const DEFAULT_PATTERNS: &[&str] = &["*.jpg", "*.JPG"];

pub const DEFAULT_MAX_WIDTH: u32 = 1920;
pub const DEFAULT_MAX_HEIGHT: u32 = 1200;

pub const DEFAULT_QUALITY: u8 = 82;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

/// Carried for reference only; no code path reads it to steer encoding.
pub const DEFAULT_TARGET_SIZE_KB: u32 = 300;

pub const DEFAULT_JOBS: usize = 1;

/// Largest width/height a baseline or progressive JPEG frame header can carry.
pub const MAX_JPEG_DIMENSION: u32 = u16::MAX as u32;

pub const BANNER_WIDTH: usize = 60;
pub const PROGRESS_TEMPLATE: &str = "{bar:40.cyan/blue} {pos}/{len} {msg}";

pub const OK_PREFIX: &str = "[OK]";
pub const ERROR_PREFIX: &str = "[ERROR]";

//! Global constants for the GRIDSLICE engine.

/// Minimum number of slices along one grid axis
pub const MIN_SPLITS: usize = 1;

/// Maximum number of slices along one grid axis
pub const MAX_SPLITS: usize = 8;

/// Default grid size along both axes when no configuration is present
pub const DEFAULT_GRID: usize = 2;

/// Filename prefix for exported archives
pub const DEFAULT_EXPORT_PREFIX: &str = "slices";

/// MIME type of the exported archive blob
pub const ZIP_MIME_TYPE: &str = "application/zip";

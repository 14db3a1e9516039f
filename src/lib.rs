//! GRIDSLICE - Grid slicing and ZIP export engine
//!
//! The computational core of an AI image studio's slicing tool: pixel-exact
//! N x M grid slicing with draggable dividers, and a from-scratch stored-ZIP
//! archive writer for exporting the resulting slices. Builds for native use
//! and for the browser via WASM; rendering and backend access live outside
//! this crate.

pub mod archive;
pub mod config;
pub mod constants;
pub mod grid;
pub mod session;

pub use archive::{ArchiveEntry, ArchiveError, DosDateTime, build_archive, crc32};
pub use config::SlicerConfig;
pub use grid::{Axis, GridConfig, SliceRect, SplitAxis, compute_rectangles};
pub use session::{SessionError, SlicerSession, export_filename};

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;

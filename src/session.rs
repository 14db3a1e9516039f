//! Slicing session state.
//!
//! Holds one loaded source image, its grid configuration, the rasterized
//! slice previews and the user-curated "processing area" (the ordered subset
//! of slices that ends up in an exported archive). The session is a plain
//! owned value passed by reference into the view layer, never a module-level
//! singleton, so concurrent sessions cannot interfere.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use thiserror::Error;

use crate::archive::{self, ArchiveEntry, ArchiveError, DosDateTime};
use crate::constants::DEFAULT_GRID;
use crate::grid::{GridConfig, SliceRect};

/// Errors that can occur while loading, slicing or exporting.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Source image bytes could not be decoded
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// A slice could not be encoded to PNG
    #[error("failed to encode slice: {0}")]
    Encode(#[source] image::ImageError),

    /// Archive construction failed
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// One rasterized slice: its grid position and the encoded PNG bytes.
#[derive(Debug, Clone)]
pub struct SlicePreview {
    /// Crop rectangle this slice was cut from
    pub rect: SliceRect,
    /// PNG-encoded slice content
    pub png: Vec<u8>,
}

/// One item staged in the processing area.
#[derive(Debug, Clone)]
pub struct ProcessingItem {
    /// Display label, derived from the slice's grid position
    pub label: String,
    /// PNG-encoded content, handed to the archive writer on export
    pub data: Vec<u8>,
}

/// State of one image-slicing session.
#[derive(Debug, Clone)]
pub struct SlicerSession {
    name: String,
    source: DynamicImage,
    /// Grid configuration, adjusted directly by the view layer
    pub grid: GridConfig,
    slices: Vec<SlicePreview>,
    processing: Vec<ProcessingItem>,
}

impl SlicerSession {
    /// Start a session from raw image bytes (the browser file-picker path).
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, SessionError> {
        let source = image::load_from_memory(bytes).map_err(SessionError::Decode)?;
        Ok(Self::from_image(name, source))
    }

    /// Start a session from an already decoded image.
    pub fn from_image(name: impl Into<String>, source: DynamicImage) -> Self {
        let name = name.into();
        log::info!(
            "session '{}': {}x{} source",
            name,
            source.width(),
            source.height()
        );
        Self {
            name,
            source,
            grid: GridConfig::new(DEFAULT_GRID, DEFAULT_GRID),
            slices: Vec::new(),
            processing: Vec::new(),
        }
    }

    /// Name of the loaded source image.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source image dimensions in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.source.width(), self.source.height())
    }

    /// Rasterized slices from the most recent [`slice`](Self::slice) call.
    pub fn slices(&self) -> &[SlicePreview] {
        &self.slices
    }

    /// Items currently staged for export, in export order.
    pub fn processing(&self) -> &[ProcessingItem] {
        &self.processing
    }

    /// Cut the source image along the current grid, replacing any previous
    /// slices. Each rectangle becomes an independent PNG blob.
    pub fn slice(&mut self) -> Result<(), SessionError> {
        let (width, height) = self.dimensions();
        let rects = self.grid.rectangles(width, height);
        let mut slices = Vec::with_capacity(rects.len());
        for rect in rects {
            let cropped = self.source.crop_imm(rect.x, rect.y, rect.width, rect.height);
            let mut png = Vec::new();
            cropped
                .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
                .map_err(SessionError::Encode)?;
            log::debug!(
                "sliced r{}c{} at ({},{}) {}x{} -> {} bytes",
                rect.row,
                rect.col,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                png.len()
            );
            slices.push(SlicePreview { rect, png });
        }
        self.slices = slices;
        Ok(())
    }

    /// Stage one slice into the processing area. Returns false if the index
    /// is out of range.
    pub fn stage(&mut self, index: usize) -> bool {
        let Some(slice) = self.slices.get(index) else {
            log::warn!("stage: no slice at index {index}");
            return false;
        };
        self.processing.push(ProcessingItem {
            label: format!("r{}c{}", slice.rect.row + 1, slice.rect.col + 1),
            data: slice.png.clone(),
        });
        true
    }

    /// Stage every slice, in row-major order.
    pub fn stage_all(&mut self) {
        for index in 0..self.slices.len() {
            self.stage(index);
        }
    }

    /// Remove one staged item. Out-of-range indices are ignored.
    pub fn remove_staged(&mut self, index: usize) {
        if index < self.processing.len() {
            self.processing.remove(index);
        }
    }

    /// Reorder the processing area by moving the item at `from` to position
    /// `to` (the drag-reorder gesture). Out-of-range indices are ignored.
    pub fn move_staged(&mut self, from: usize, to: usize) {
        if from >= self.processing.len() || to >= self.processing.len() || from == to {
            return;
        }
        let item = self.processing.remove(from);
        self.processing.insert(to, item);
    }

    /// Empty the processing area.
    pub fn clear_staged(&mut self) {
        self.processing.clear();
    }

    /// Build a ZIP archive from the processing area, entries named by
    /// position (`1.png`, `2.png`, ...).
    pub fn export(&self, timestamp: DosDateTime) -> Result<Vec<u8>, SessionError> {
        let entries: Vec<ArchiveEntry> = self
            .processing
            .iter()
            .enumerate()
            .map(|(i, item)| ArchiveEntry::new(format!("{}.png", i + 1), item.data.clone()))
            .collect();
        Ok(archive::build_archive(&entries, timestamp)?)
    }
}

/// Timestamp-suffixed filename for an exported archive,
/// e.g. `slices-20240615-123456.zip`.
pub fn export_filename(prefix: &str, now: chrono::NaiveDateTime) -> String {
    format!("{}-{}.zip", prefix, now.format("%Y%m%d-%H%M%S"))
}

//! Image gallery domain — the drop target grid.
//!
//! Holds the ordered list of imported images, tracks which one is bound to
//! the localization record, and keeps that record's screenshot bytes in
//! sync on pick and delete. Drop ingestion lives in `import`.

mod import;

pub use import::{
    file_url_to_path, path_to_file_url, DropProvider, DropReport, ImportError, ItemOutcome,
    ItemProvider, FILE_URL_TYPE,
};

use crate::codec::{self, CodecError};
use crate::config::{SelectionPolicy, Settings};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The externally owned record a gallery writes its active image into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizationItem {
    pub key: String,
    /// PNG bytes of the chosen screenshot.
    pub screenshot: Option<Vec<u8>>,
}

impl LocalizationItem {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            screenshot: None,
        }
    }
}

/// One decoded image in the grid.
#[derive(Debug, Clone)]
pub struct GalleryImage {
    image: DynamicImage,
    source: Option<PathBuf>,
}

impl GalleryImage {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image,
            source: None,
        }
    }

    pub fn from_file(image: DynamicImage, source: PathBuf) -> Self {
        Self {
            image,
            source: Some(source),
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// File the image was imported from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// PNG bytes used both for storage and for the delete comparison.
    pub fn encoded(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode_png(&self.image)
    }
}

/// Visual state of one grid tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileState {
    pub index: usize,
    pub active: bool,
    /// Opacity of the black layer drawn over the tile.
    pub dim_overlay: f32,
}

#[derive(Debug, Clone)]
pub struct ImageGallery {
    images: Vec<GalleryImage>,
    selected_index: Option<usize>,
    policy: SelectionPolicy,
    tile_dim_opacity: f32,
    import_concurrency: usize,
}

impl Default for ImageGallery {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl ImageGallery {
    pub fn new(settings: &Settings) -> Self {
        Self {
            images: Vec::new(),
            selected_index: None,
            policy: settings.selection_policy,
            tile_dim_opacity: settings.tile_dim_opacity,
            import_concurrency: settings.import_concurrency.max(1),
        }
    }

    pub fn images(&self) -> &[GalleryImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// An empty gallery shows the drop placeholder instead of the grid.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn get(&self, index: usize) -> Result<&GalleryImage, GalleryError> {
        self.images.get(index).ok_or(GalleryError::IndexOutOfRange {
            index,
            len: self.images.len(),
        })
    }

    /// Appends an image at the end of the grid.
    pub fn push(&mut self, image: GalleryImage) {
        self.images.push(image);
    }

    /// Makes the image at `index` the active one and stores its PNG bytes
    /// in `item`.
    pub fn pick(&mut self, index: usize, item: &mut LocalizationItem) -> Result<(), GalleryError> {
        let bytes = self.get(index)?.encoded()?;
        log::info!(
            "[GALLERY] '{}' now uses image {} ({} bytes)",
            item.key,
            index,
            bytes.len()
        );

        item.screenshot = Some(bytes);
        self.selected_index = Some(index);
        Ok(())
    }

    /// Removes the image at `index`.
    ///
    /// If its PNG bytes equal the screenshot stored in `item`, the
    /// screenshot is cleared first. The comparison is by content, so a
    /// duplicate import of the active file also clears it.
    pub fn delete(
        &mut self,
        index: usize,
        item: &mut LocalizationItem,
    ) -> Result<GalleryImage, GalleryError> {
        let bytes = self.get(index)?.encoded()?;

        let cleared = item.screenshot.as_deref() == Some(bytes.as_slice());
        if cleared {
            log::info!("[GALLERY] Cleared screenshot of '{}'", item.key);
            item.screenshot = None;
        }

        let removed = self.images.remove(index);
        self.after_remove(index, cleared);

        log::info!(
            "[GALLERY] Deleted image {} ({} left)",
            index,
            self.images.len()
        );
        Ok(removed)
    }

    /// Clears the active index without touching any record.
    pub fn clear_selection(&mut self) {
        self.selected_index = None;
    }

    /// Whether the tile at `index` is drawn dimmed. Decided by index alone.
    pub fn is_dimmed(&self, index: usize) -> bool {
        self.selected_index != Some(index)
    }

    pub fn tiles(&self) -> impl Iterator<Item = TileState> + '_ {
        (0..self.images.len()).map(move |index| {
            let active = !self.is_dimmed(index);
            TileState {
                index,
                active,
                dim_overlay: if active { 0.0 } else { self.tile_dim_opacity },
            }
        })
    }

    /// `cleared` is set when the delete emptied the record, in which case
    /// no tile is bound to it any more.
    fn after_remove(&mut self, removed: usize, cleared: bool) {
        if self.policy == SelectionPolicy::Preserve {
            return;
        }

        self.selected_index = match self.selected_index {
            _ if cleared => None,
            Some(selected) if selected == removed => None,
            Some(selected) if selected > removed => Some(selected - 1),
            other => other,
        }
        .filter(|&selected| selected < self.images.len());
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("Image index {index} is out of range for a gallery of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

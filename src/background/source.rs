use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{DynamicImage, GenericImageView};
use thiserror::Error;

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image {path} has no pixels")]
    Empty { path: PathBuf },
}

/// A decoded background image held as straight (non-premultiplied) RGBA8.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ImageAsset {
    pub fn from_image(path: impl Into<PathBuf>, image: DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            path: path.into(),
            width,
            height,
            rgba: image.to_rgba8().into_raw(),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = rgba_offset(self.width, x, y);
        [
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        ]
    }
}

/// Byte offset of pixel (`x`, `y`) in a tightly packed RGBA8 buffer.
pub(crate) fn rgba_offset(width: u32, x: u32, y: u32) -> usize {
    (y as usize * width as usize + x as usize) * 4
}

/// Owns at most one decoded image. Replacing or clearing drops the old one.
#[derive(Debug, Default)]
pub struct ImageSource {
    asset: Option<ImageAsset>,
}

impl ImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `path`, replacing any current asset. The previous asset is
    /// released before decoding starts, so a failure leaves nothing loaded.
    pub fn load(&mut self, path: &Path) -> Result<&ImageAsset, DecodeError> {
        self.asset = None;

        let asset = decode_file(path)?;
        tracing::info!(
            path = %path.display(),
            width = asset.width,
            height = asset.height,
            "background image loaded"
        );
        Ok(self.asset.insert(asset))
    }

    pub fn install(&mut self, asset: ImageAsset) -> &ImageAsset {
        self.asset.insert(asset)
    }

    pub fn clear(&mut self) {
        if self.asset.take().is_some() {
            tracing::debug!("background image released");
        }
    }

    pub fn asset(&self) -> Option<&ImageAsset> {
        self.asset.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.asset.is_some()
    }
}

pub fn decode_file(path: &Path) -> Result<ImageAsset, DecodeError> {
    let bytes = fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = image::load_from_memory(bytes.as_slice()).map_err(|source| DecodeError::Format {
        path: path.to_path_buf(),
        source,
    })?;

    let asset = ImageAsset::from_image(path, image);
    if asset.width == 0 || asset.height == 0 {
        return Err(DecodeError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(asset)
}

/// Wildcard list for the open-file dialog, e.g. `*.png;*.jpg`.
pub fn picker_filter_pattern() -> String {
    SUPPORTED_IMAGE_EXTENSIONS
        .iter()
        .map(|ext| format!("*.{ext}"))
        .collect::<Vec<_>>()
        .join(";")
}

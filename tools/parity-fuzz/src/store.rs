//! Writing images to PNG files.

use std::path::PathBuf;

use raster_pipe::Image;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Output directory for stored images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of `<name>.png` in the output directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.png", name))
    }

    /// Encode `img` as `<name>.png`, creating the directory if needed.
    pub fn save(&self, name: &str, img: &Image) -> Result<PathBuf, StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path(name);
        image::save_buffer_with_format(
            &path,
            &img.to_rgba8(),
            img.width(),
            img.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|source| StoreError::Encode {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "stored image");
        Ok(path)
    }
}

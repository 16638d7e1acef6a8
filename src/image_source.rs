// image_source.rs — decoded panorama pixels and background loading

use image::io::Reader as ImageReader;
use image::RgbaImage;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

/// Immutable RGBA8 panorama. Clones share the pixel buffer.
#[derive(Debug, Clone)]
pub struct PanoramaImage {
    pixels: Arc<RgbaImage>,
}

impl PanoramaImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Decode an image file of any format the `image` crate can sniff.
pub fn load(path: &Path) -> Result<PanoramaImage, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let decoded = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)
        .and_then(|mut r| {
            // Panoramas routinely exceed the default decoder limits.
            r.no_limits();
            r.decode()
        })
        .map_err(|source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    log::info!(
        "decoded {} ({}x{})",
        path.display(),
        decoded.width(),
        decoded.height()
    );
    Ok(PanoramaImage::from_rgba(decoded.to_rgba8()))
}

/// Decode on a worker thread and hand the result back to the UI thread.
pub fn load_in_background(path: PathBuf, tx: Sender<Result<PanoramaImage, LoadError>>) {
    thread::spawn(move || {
        log::info!("loading {} in background", path.display());
        let result = load(&path);
        if tx.send(result).is_err() {
            log::warn!("ui thread went away before {} finished loading", path.display());
        }
    });
}

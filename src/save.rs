//! Writing rendered frames to disk.

use std::path::{Path, PathBuf};

use rand::Rng;
use thiserror::Error;

use crate::camera::{to_dynamic_image, Frame};
use crate::cartoon::Mode;

/// Errors raised while saving a frame.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Failed to write '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Frame buffer does not match its {width}x{height} size")]
    InvalidFrame { width: u32, height: u32 },
}

/// Destination for saved frames.
pub trait FrameSink {
    /// Persist `frame` under `name`, returning where it ended up.
    fn write_image(&mut self, name: &str, frame: &Frame) -> Result<PathBuf, SaveError>;
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn write_image(&mut self, name: &str, frame: &Frame) -> Result<PathBuf, SaveError> {
        (**self).write_image(name, frame)
    }
}

/// Writes frames as image files into a directory; the format follows the
/// file extension.
#[derive(Debug, Clone)]
pub struct ImageWriter {
    directory: PathBuf,
}

impl ImageWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl FrameSink for ImageWriter {
    fn write_image(&mut self, name: &str, frame: &Frame) -> Result<PathBuf, SaveError> {
        let path = self.directory.join(name);
        let image = to_dynamic_image(frame).ok_or(SaveError::InvalidFrame {
            width: frame.width,
            height: frame.height,
        })?;
        image.save(&path).map_err(|source| SaveError::Encode {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Filename for a saved frame: `<mode label>_IMG_<1000..=9999>.jpg`.
///
/// Names are not checked for collisions; a later save may overwrite an
/// earlier one.
pub fn save_filename<R: Rng + ?Sized>(mode: Mode, rng: &mut R) -> String {
    let n: u16 = rng.gen_range(1000..=9999);
    format!("{}_IMG_{}.jpg", mode.label(), n)
}

//! Frame acquisition strategies.
//!
//! The session asks a [`FrameSource`] for a frame every iteration without
//! knowing where frames come from: [`StillImage`] hands back the same
//! decoded picture each time, [`LiveCamera`] polls the device.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::camera::{
    from_dynamic_image, resize_area, CameraCapture, CameraError, CameraSettings, Frame,
};

/// Still images are rescaled to this height before the session starts.
pub const STILL_IMAGE_HEIGHT: u32 = 480;

/// Errors raised while acquiring a frame.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error("Cannot read image from '{}', check that the path points to an image: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Something that yields a frame per loop iteration.
pub trait FrameSource {
    /// Produce the frame for the next iteration.
    fn next_frame(&mut self) -> Result<Frame, SourceError>;

    /// Free any device held by the source. Called once when the session ends.
    fn release(&mut self) {}
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Frame, SourceError> {
        (**self).next_frame()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// A single frame reused for every iteration.
#[derive(Debug, Clone)]
pub struct StillImage {
    frame: Frame,
}

impl StillImage {
    /// Wrap an already decoded frame as-is.
    pub fn new(frame: Frame) -> Self {
        Self { frame }
    }

    /// Decode the image at `path` and rescale it to [`STILL_IMAGE_HEIGHT`].
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        Ok(Self::new(open_image(path)?))
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl FrameSource for StillImage {
    fn next_frame(&mut self) -> Result<Frame, SourceError> {
        Ok(self.frame.clone())
    }
}

/// Pulls a fresh frame from a camera on every call.
#[derive(Debug)]
pub struct LiveCamera {
    capture: CameraCapture,
}

impl LiveCamera {
    /// Open the camera described by `settings`.
    pub fn open(settings: CameraSettings) -> Result<Self, SourceError> {
        Ok(Self {
            capture: CameraCapture::open(settings)?,
        })
    }
}

impl FrameSource for LiveCamera {
    fn next_frame(&mut self) -> Result<Frame, SourceError> {
        Ok(self.capture.read_frame()?)
    }

    fn release(&mut self) {
        self.capture.release();
    }
}

/// Size that brings `height` to `target_height` while keeping the aspect
/// ratio. Both sides are floored and never drop below one pixel.
pub fn scaled_size(width: u32, height: u32, target_height: u32) -> (u32, u32) {
    if height == 0 {
        return (width, height);
    }
    let factor = height as f64 / target_height as f64;
    let w = (width as f64 / factor).floor().max(1.0) as u32;
    let h = (height as f64 / factor).floor().max(1.0) as u32;
    (w, h)
}

/// Decode an image file into an RGB frame scaled to [`STILL_IMAGE_HEIGHT`]
/// by area averaging.
pub fn open_image(path: &Path) -> Result<Frame, SourceError> {
    let decoded = image::open(path).map_err(|source| SourceError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let frame = from_dynamic_image(decoded);
    let (width, height) = scaled_size(frame.width, frame.height, STILL_IMAGE_HEIGHT);
    log::debug!(
        "Rescaling {}x{} image to {}x{}",
        frame.width,
        frame.height,
        width,
        height
    );
    Ok(resize_area(&frame, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_size_halves_large_image() {
        assert_eq!(scaled_size(1280, 960, 480), (640, 480));
    }

    #[test]
    fn test_scaled_size_keeps_480() {
        assert_eq!(scaled_size(640, 480, 480), (640, 480));
    }

    #[test]
    fn test_scaled_size_floors_width() {
        // factor 1.5: 1001 / 1.5 = 667.33
        assert_eq!(scaled_size(1001, 720, 480), (667, 480));
    }

    #[test]
    fn test_scaled_size_never_zero() {
        assert_eq!(scaled_size(1, 4800, 480), (1, 480));
    }

    #[test]
    fn test_still_image_repeats_frame() {
        let frame = Frame::solid_rgb(4, 4, [1, 2, 3]);
        let mut source = StillImage::new(frame.clone());
        assert_eq!(source.next_frame().unwrap(), frame);
        assert_eq!(source.next_frame().unwrap(), frame);
    }

    #[test]
    fn test_open_image_missing_file() {
        let err = open_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, SourceError::Decode { .. }));
        assert!(err.to_string().contains("not/here.png"));
    }

    #[test]
    fn test_open_image_rescales_to_480() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tall.png");
        image::RgbImage::from_pixel(100, 960, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let frame = open_image(&path).unwrap();
        assert_eq!((frame.width, frame.height), (50, 480));
        assert_eq!(frame.pixel(25, 240), &[10, 20, 30]);
    }

    #[test]
    fn test_open_image_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(
            open_image(&path),
            Err(SourceError::Decode { .. })
        ));
    }
}

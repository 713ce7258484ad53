//! Frame and camera types shared by acquisition, the cartoon pipeline and display.

use std::fmt;

use thiserror::Error;

/// Information about an available camera device.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    /// Device index for selection
    pub index: u32,
    /// Human-readable device name
    pub name: String,
    /// Device description
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// Camera resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 640x480, the usual webcam default.
    pub const VGA: Resolution = Resolution {
        width: 640,
        height: 480,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        Self::VGA
    }
}

/// Pixel layout of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// Interleaved R, G, B (3 bytes per pixel)
    Rgb,
    /// Single-channel intensity (1 byte per pixel)
    Gray,
}

impl FrameFormat {
    /// Number of bytes (channels) per pixel.
    pub fn channels(self) -> usize {
        match self {
            FrameFormat::Rgb => 3,
            FrameFormat::Gray => 1,
        }
    }
}

/// A rectangular grid of pixels, row-major and interleaved.
///
/// Pipeline stages never mutate a frame they are given; each stage
/// builds a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw pixel data
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel format
    pub format: FrameFormat,
}

impl Frame {
    /// Build an RGB frame from raw bytes.
    ///
    /// Returns `None` if the buffer length doesn't match `width * height * 3`.
    pub fn from_rgb(data: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        Self::new(data, width, height, FrameFormat::Rgb)
    }

    /// Build a grayscale frame from raw bytes.
    pub fn from_gray(data: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        Self::new(data, width, height, FrameFormat::Gray)
    }

    fn new(data: Vec<u8>, width: u32, height: u32, format: FrameFormat) -> Option<Self> {
        let expected = width as usize * height as usize * format.channels();
        (data.len() == expected).then_some(Frame {
            data,
            width,
            height,
            format,
        })
    }

    /// An all-zero frame of the given shape.
    pub fn black(width: u32, height: u32, format: FrameFormat) -> Self {
        Frame {
            data: vec![0; width as usize * height as usize * format.channels()],
            width,
            height,
            format,
        }
    }

    /// A frame where every pixel has the same RGB value.
    pub fn solid_rgb(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Frame {
            data,
            width,
            height,
            format: FrameFormat::Rgb,
        }
    }

    /// Get the number of bytes per pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        self.format.channels()
    }

    /// Number of pixels in the frame.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// True when both frames have the same width, height and format.
    pub fn same_shape(&self, other: &Frame) -> bool {
        self.width == other.width && self.height == other.height && self.format == other.format
    }

    /// Bytes of the pixel at (x, y).
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let bpp = self.bytes_per_pixel();
        let start = (y as usize * self.width as usize + x as usize) * bpp;
        &self.data[start..start + bpp]
    }
}

/// Settings for camera capture.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Camera device index
    pub device_index: u32,
    /// Requested capture resolution (the device may pick the closest match)
    pub resolution: Resolution,
    /// Target FPS (actual may vary)
    pub fps: u32,
    /// Mirror horizontally (selfie mode)
    pub mirror: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            resolution: Resolution::default(),
            fps: 30,
            mirror: false,
        }
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// Failed to query camera devices
    #[error("Failed to query cameras: {0}")]
    QueryFailed(String),
    /// Failed to open camera
    #[error("Failed to open camera: {0}")]
    OpenFailed(String),
    /// Camera permission denied (macOS)
    #[error(
        "Camera permission denied. On macOS, grant access in System Settings > Privacy & Security > Camera"
    )]
    PermissionDenied,
    /// Camera device not found at specified index
    #[error("Camera device {0} not found, check that the camera is connected")]
    DeviceNotFound(u32),
    /// Failed to start video stream
    #[error("Failed to start camera stream: {0}")]
    StreamFailed(String),
    /// Reading or decoding a frame failed
    #[error("Failed to read camera frame: {0}")]
    ReadFailed(String),
}

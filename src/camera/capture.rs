//! Synchronous camera capture handle.
//!
//! Frames are pulled on demand from the calling thread: every call to
//! [`CameraCapture::read_frame`] blocks until the device delivers the next
//! buffer, then decodes it to RGB.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::{query, Camera};

use super::frame_utils::{convert_to_rgb, mirror_horizontal};
use super::types::{CameraError, CameraInfo, CameraSettings, Frame, Resolution};

/// List all available camera devices on the system.
///
/// If no cameras are found, returns an empty vector (not an error).
pub fn list_devices() -> Result<Vec<CameraInfo>, CameraError> {
    let devices = query(ApiBackend::Auto).map_err(|e| CameraError::QueryFailed(e.to_string()))?;

    Ok(devices
        .into_iter()
        .map(|d| CameraInfo {
            index: d.index().as_index().unwrap_or(0),
            name: d.human_name(),
            description: d.description().to_string(),
        })
        .collect())
}

/// Camera capture handle.
///
/// Owns an open nokhwa stream. The stream is stopped by [`release`] or
/// when the handle is dropped, whichever comes first.
///
/// [`release`]: CameraCapture::release
pub struct CameraCapture {
    camera: Option<Camera>,
    settings: CameraSettings,
    actual_resolution: Resolution,
}

impl std::fmt::Debug for CameraCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCapture")
            .field("settings", &self.settings)
            .field("actual_resolution", &self.actual_resolution)
            .field("is_open", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl CameraCapture {
    /// Open a camera and start its stream.
    ///
    /// # Errors
    /// * `CameraError::DeviceNotFound` - If the device index doesn't exist
    /// * `CameraError::PermissionDenied` - If camera access is denied (macOS)
    /// * `CameraError::OpenFailed` - If no pixel format could be negotiated
    /// * `CameraError::StreamFailed` - If the stream fails to start
    pub fn open(settings: CameraSettings) -> Result<Self, CameraError> {
        let devices = list_devices()?;
        if !devices.iter().any(|d| d.index == settings.device_index) {
            return Err(CameraError::DeviceNotFound(settings.device_index));
        }

        let index = CameraIndex::Index(settings.device_index);
        let mut camera = open_camera_with_fallback(&index, &settings)?;
        camera
            .open_stream()
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;

        let res = camera.resolution();
        let actual_resolution = Resolution {
            width: res.width(),
            height: res.height(),
        };
        log::info!(
            "Camera {} streaming at {}x{}",
            settings.device_index,
            actual_resolution.width,
            actual_resolution.height
        );

        Ok(Self {
            camera: Some(camera),
            settings,
            actual_resolution,
        })
    }

    /// Get the current camera settings.
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Resolution negotiated with the device.
    pub fn actual_resolution(&self) -> Resolution {
        self.actual_resolution
    }

    /// Whether the stream is still open.
    pub fn is_open(&self) -> bool {
        self.camera.is_some()
    }

    /// Capture and decode the next frame from the device.
    ///
    /// Frames come out at the camera's native resolution; no resizing is
    /// applied. Mirroring is applied when enabled in the settings.
    pub fn read_frame(&mut self) -> Result<Frame, CameraError> {
        let camera = self
            .camera
            .as_mut()
            .ok_or_else(|| CameraError::ReadFailed("camera has been released".to_string()))?;

        let raw = camera
            .frame()
            .map_err(|e| CameraError::ReadFailed(e.to_string()))?;
        let mut frame = convert_to_rgb(&raw)
            .ok_or_else(|| CameraError::ReadFailed("could not decode frame".to_string()))?;

        if self.settings.mirror {
            mirror_horizontal(&mut frame);
        }
        Ok(frame)
    }

    /// Stop the stream and release the device. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                log::warn!("Failed to stop camera stream: {}", e);
            }
            log::debug!("Camera {} released", self.settings.device_index);
        }
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.release();
    }
}

/// Try to open a camera with multiple format fallback strategies.
fn open_camera_with_fallback(
    index: &CameraIndex,
    settings: &CameraSettings,
) -> Result<Camera, CameraError> {
    // 1. Closest match with NV12 (native on macOS)
    // 2. Closest match with MJPEG (widely supported)
    // 3. Whatever the camera offers at its highest resolution
    let requested_resolution =
        nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height);
    let format_attempts = [
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            requested_resolution,
            NokhwaFrameFormat::NV12,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            requested_resolution,
            NokhwaFrameFormat::MJPEG,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
    ];

    let mut last_error = None;
    for requested in format_attempts {
        match Camera::new(index.clone(), requested) {
            Ok(cam) => return Ok(cam),
            Err(e) => {
                log::debug!("Camera format attempt failed: {}", e);
                last_error = Some(e);
            }
        }
    }

    let Some(e) = last_error else {
        return Err(CameraError::OpenFailed("no format attempted".to_string()));
    };
    let msg = e.to_string().to_lowercase();
    if msg.contains("permission")
        || msg.contains("denied")
        || msg.contains("authorization")
        || msg.contains("access")
    {
        Err(CameraError::PermissionDenied)
    } else {
        Err(CameraError::OpenFailed(e.to_string()))
    }
}

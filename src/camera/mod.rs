//! Camera capture and frame primitives.
//!
//! - Device enumeration via [`list_devices`]
//! - Synchronous capture via [`CameraCapture`]
//! - The [`Frame`] type every other module works on

mod capture;
mod frame_utils;
mod types;

pub use capture::{list_devices, CameraCapture};
pub use frame_utils::{from_dynamic_image, mirror_horizontal, resize_area, to_dynamic_image};
pub use types::{CameraError, CameraInfo, CameraSettings, Frame, FrameFormat, Resolution};

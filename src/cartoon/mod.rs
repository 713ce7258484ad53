//! Cartoon rendering pipeline.
//!
//! [`transform`] turns an RGB frame into one of several stylized renderings.
//! Every call is independent: no state survives between frames.
//!
//! Shared stages, computed once per call:
//!
//! 1. **Grayscale** - BT.601 luminance
//! 2. **Smooth gray** - bilateral filter (diameter 5, sigma 75/75)
//! 3. **Edge mask** - Gaussian adaptive threshold (block 5, offset 1) of the
//!    smoothed gray; 255 on flat regions, 0 on the dark side of edges
//! 4. **Flat colour** - bilateral filter of the RGB frame (diameter 9,
//!    sigma 900/900), only computed for the modes that need it
//!
//! The edge mask then selects which pixels of the smoothed images survive,
//! so outlines render black.

mod bilateral;
mod grayscale;
mod mask;
mod mode;
mod threshold;

pub use bilateral::{bilateral_filter, BilateralParams};
pub use grayscale::{gray_to_rgb, to_grayscale};
pub use mask::apply_mask;
pub use mode::Mode;
pub use threshold::{adaptive_threshold_gaussian, gaussian_mean, threshold_binary, MAX_BLOCK_SIZE};

use thiserror::Error;

use crate::camera::{Frame, FrameFormat};

/// Smoothing applied to the grayscale image before edge extraction.
pub const GRAY_SMOOTHING: BilateralParams = BilateralParams::new(5, 75.0, 75.0);
/// Smoothing that flattens the colour image into cartoon regions.
pub const COLOR_SMOOTHING: BilateralParams = BilateralParams::new(9, 900.0, 900.0);
/// Extra pass over the edge mask in [`Mode::ReduceNoise`].
pub const EDGE_SMOOTHING: BilateralParams = BilateralParams::new(9, 150.0, 150.0);

/// Adaptive threshold window.
pub const EDGE_BLOCK_SIZE: u32 = 5;
/// How much darker than its neighbourhood a pixel must be to count as edge.
pub const EDGE_OFFSET: f32 = 1.0;
/// Re-binarization level for the smoothed edge mask.
pub const DESPECKLE_THRESHOLD: u8 = 110;

/// Errors raised by the pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// The frame has the wrong channel layout for this stage
    #[error("Expected a {expected:?} frame, got {found:?}")]
    MalformedInput {
        expected: FrameFormat,
        found: FrameFormat,
    },
    /// The frame has no pixels
    #[error("Frame is empty ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
    /// Two frames that must line up don't
    #[error("Frame sizes differ: {left:?} vs {right:?}")]
    ShapeMismatch { left: (u32, u32), right: (u32, u32) },
}

/// Intermediate images shared between the output branches.
struct Stages<'a> {
    frame: &'a Frame,
    smooth_gray: Frame,
    edge_mask: Frame,
}

impl<'a> Stages<'a> {
    fn compute(frame: &'a Frame) -> Result<Self, PipelineError> {
        if frame.format != FrameFormat::Rgb {
            return Err(PipelineError::MalformedInput {
                expected: FrameFormat::Rgb,
                found: frame.format,
            });
        }
        if frame.width == 0 || frame.height == 0 {
            return Err(PipelineError::EmptyFrame {
                width: frame.width,
                height: frame.height,
            });
        }

        let smooth_gray = bilateral_filter(&to_grayscale(frame), GRAY_SMOOTHING);
        let edge_mask =
            adaptive_threshold_gaussian(&smooth_gray, 255, EDGE_BLOCK_SIZE, EDGE_OFFSET);

        Ok(Self {
            frame,
            smooth_gray,
            edge_mask,
        })
    }

    fn flat_color(&self) -> Frame {
        bilateral_filter(self.frame, COLOR_SMOOTHING)
    }
}

/// Render `frame` in the given mode.
///
/// `Original` returns the frame unchanged whatever its layout. Every other
/// mode requires a non-empty RGB frame and returns an RGB frame of the same
/// size.
///
/// # Errors
/// * `PipelineError::MalformedInput` - the frame isn't RGB
/// * `PipelineError::EmptyFrame` - the frame has zero width or height
pub fn transform(frame: &Frame, mode: Mode) -> Result<Frame, PipelineError> {
    if mode == Mode::Original {
        return Ok(frame.clone());
    }
    let stages = Stages::compute(frame)?;

    match mode {
        Mode::Original => Ok(frame.clone()),
        Mode::Edge => Ok(gray_to_rgb(&stages.edge_mask)),
        Mode::ReduceNoise => {
            let smooth_edge = bilateral_filter(&stages.edge_mask, EDGE_SMOOTHING);
            let mask = threshold_binary(&smooth_edge, DESPECKLE_THRESHOLD, 255);
            apply_mask(&stages.flat_color(), &mask)
        }
        Mode::BlackAndWhite => Ok(gray_to_rgb(&apply_mask(
            &stages.smooth_gray,
            &stages.edge_mask,
        )?)),
        Mode::Normal => apply_mask(&stages.flat_color(), &stages.edge_mask),
    }
}

//! Keyboard help overlay.
//!
//! The legend is rendered once per session into a black frame the size of
//! the first acquired frame, then XOR-composited onto every displayed frame.
//! XOR lights the glyphs up against dark regions and is its own inverse:
//! compositing the same legend twice restores the original frame.

pub mod font;

use thiserror::Error;

use crate::camera::{Frame, FrameFormat};

/// Help text, one entry per line.
pub const LEGEND_LINES: [&str; 7] = [
    "n for normal cartoon",
    "b for black and white cartoon",
    "e for edge cartoon",
    "r for noise reduction",
    "o for original image",
    "s to save image",
    "q to quit",
];

/// Left margin of the text.
pub const MARGIN_X: u32 = 10;
/// Baseline of the first line; later lines follow at the same spacing.
pub const LINE_SPACING: u32 = 20;
/// Glyph magnification over the 5x7 bitmap.
pub const TEXT_SCALE: u32 = 2;

/// Errors raised when combining frames.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LegendError {
    #[error("Overlay is {overlay_width}x{overlay_height} {overlay_format:?} but frame is {width}x{height} {format:?}")]
    ShapeMismatch {
        overlay_width: u32,
        overlay_height: u32,
        overlay_format: FrameFormat,
        width: u32,
        height: u32,
        format: FrameFormat,
    },
}

/// Pre-rendered help overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Legend {
    overlay: Frame,
}

impl Legend {
    /// Render the legend for frames of the given size and layout.
    ///
    /// Pure function of its arguments: the same inputs always produce the
    /// same pixels.
    pub fn render(width: u32, height: u32, format: FrameFormat) -> Self {
        let mut overlay = Frame::black(width, height, format);
        for (i, line) in LEGEND_LINES.iter().enumerate() {
            let baseline = LINE_SPACING * (i as u32 + 1);
            font::draw_text(&mut overlay, MARGIN_X, baseline, line, TEXT_SCALE, 255);
        }
        Self { overlay }
    }

    /// Render a legend matching `frame`'s size and layout.
    pub fn for_frame(frame: &Frame) -> Self {
        Self::render(frame.width, frame.height, frame.format)
    }

    /// The raw overlay: glyph pixels are 255, everything else 0.
    pub fn overlay(&self) -> &Frame {
        &self.overlay
    }

    /// XOR the legend onto `frame`, returning a new frame.
    pub fn composite(&self, frame: &Frame) -> Result<Frame, LegendError> {
        xor_frames(frame, &self.overlay)
    }
}

/// Bytewise exclusive-or of two frames of identical shape.
pub fn xor_frames(frame: &Frame, overlay: &Frame) -> Result<Frame, LegendError> {
    if !frame.same_shape(overlay) {
        return Err(LegendError::ShapeMismatch {
            overlay_width: overlay.width,
            overlay_height: overlay.height,
            overlay_format: overlay.format,
            width: frame.width,
            height: frame.height,
            format: frame.format,
        });
    }

    Ok(Frame {
        data: frame
            .data
            .iter()
            .zip(&overlay.data)
            .map(|(a, b)| a ^ b)
            .collect(),
        width: frame.width,
        height: frame.height,
        format: frame.format,
    })
}

//! Mask compositing.

use super::PipelineError;
use crate::camera::{Frame, FrameFormat};

/// Keep `src` pixels where `mask` is nonzero and zero them elsewhere.
///
/// `mask` must be a grayscale frame with the same width and height as
/// `src`; `src` may be grayscale or RGB.
pub fn apply_mask(src: &Frame, mask: &Frame) -> Result<Frame, PipelineError> {
    if mask.format != FrameFormat::Gray {
        return Err(PipelineError::MalformedInput {
            expected: FrameFormat::Gray,
            found: mask.format,
        });
    }
    if src.width != mask.width || src.height != mask.height {
        return Err(PipelineError::ShapeMismatch {
            left: (src.width, src.height),
            right: (mask.width, mask.height),
        });
    }

    let bpp = src.bytes_per_pixel();
    let mut data = Vec::with_capacity(src.data.len());
    for (px, &m) in src.data.chunks_exact(bpp).zip(&mask.data) {
        if m != 0 {
            data.extend_from_slice(px);
        } else {
            data.extend(std::iter::repeat(0).take(bpp));
        }
    }

    Ok(Frame {
        data,
        width: src.width,
        height: src.height,
        format: src.format,
    })
}

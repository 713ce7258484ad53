//! RGB <-> grayscale conversion using the ITU-R BT.601 luminance formula.

use crate::camera::{Frame, FrameFormat};

/// Convert an RGB frame to a single-channel frame.
///
/// Y = 0.299*R + 0.587*G + 0.114*B, computed with integer math scaled by
/// 1000 and rounded to nearest. A frame that is already grayscale is
/// returned as a copy.
pub fn to_grayscale(frame: &Frame) -> Frame {
    if frame.format == FrameFormat::Gray {
        return frame.clone();
    }

    let mut gray = Vec::with_capacity(frame.pixel_count());
    // 299 + 587 + 114 = 1000
    for rgb in frame.data.chunks_exact(3) {
        let r = rgb[0] as u32;
        let g = rgb[1] as u32;
        let b = rgb[2] as u32;
        let luminance = (299 * r + 587 * g + 114 * b + 500) / 1000;
        gray.push(luminance as u8);
    }

    Frame {
        data: gray,
        width: frame.width,
        height: frame.height,
        format: FrameFormat::Gray,
    }
}

/// Widen a grayscale frame to RGB by replicating the intensity per channel.
///
/// An RGB frame is returned as a copy.
pub fn gray_to_rgb(frame: &Frame) -> Frame {
    if frame.format == FrameFormat::Rgb {
        return frame.clone();
    }

    let data = frame.data.iter().flat_map(|&v| [v, v, v]).collect();
    Frame {
        data,
        width: frame.width,
        height: frame.height,
        format: FrameFormat::Rgb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(pixel: [u8; 3]) -> Frame {
        Frame::from_rgb(pixel.to_vec(), 1, 1).unwrap()
    }

    #[test]
    fn test_pure_channels() {
        // 0.299 * 255 = 76.2, 0.587 * 255 = 149.7, 0.114 * 255 = 29.1
        assert_eq!(to_grayscale(&rgb([255, 0, 0])).data, vec![76]);
        assert_eq!(to_grayscale(&rgb([0, 255, 0])).data, vec![150]);
        assert_eq!(to_grayscale(&rgb([0, 0, 255])).data, vec![29]);
    }

    #[test]
    fn test_white_and_black() {
        assert_eq!(to_grayscale(&rgb([255, 255, 255])).data, vec![255]);
        assert_eq!(to_grayscale(&rgb([0, 0, 0])).data, vec![0]);
    }

    #[test]
    fn test_gray_input_is_copied() {
        let gray = Frame::from_gray(vec![1, 2, 3, 4], 2, 2).unwrap();
        assert_eq!(to_grayscale(&gray), gray);
    }

    #[test]
    fn test_gray_to_rgb_replicates() {
        let gray = Frame::from_gray(vec![7, 200], 2, 1).unwrap();
        let widened = gray_to_rgb(&gray);
        assert_eq!(widened.format, FrameFormat::Rgb);
        assert_eq!(widened.data, vec![7, 7, 7, 200, 200, 200]);
    }
}

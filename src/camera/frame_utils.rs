//! Frame conversion and transformation utilities.

use image::{DynamicImage, GrayImage, RgbImage};
use nokhwa::pixel_format::RgbFormat;

use super::types::{Frame, FrameFormat};

/// Convert a nokhwa buffer to our RGB Frame format.
///
/// Handles various camera formats (MJPEG, YUYV, NV12, etc.) by using
/// nokhwa's built-in decode_image which automatically converts from
/// the camera's native format to RGB.
///
/// Returns `None` if the conversion fails (unsupported format or corrupt data).
pub fn convert_to_rgb(buffer: &nokhwa::Buffer) -> Option<Frame> {
    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    let (width, height) = decoded.dimensions();
    Frame::from_rgb(decoded.into_raw(), width, height)
}

/// Convert a decoded image of any pixel type into an RGB frame.
pub fn from_dynamic_image(image: DynamicImage) -> Frame {
    let rgb = image.into_rgb8();
    let (width, height) = rgb.dimensions();
    Frame {
        data: rgb.into_raw(),
        width,
        height,
        format: FrameFormat::Rgb,
    }
}

/// Convert a frame into an `image` buffer for encoding.
pub fn to_dynamic_image(frame: &Frame) -> Option<DynamicImage> {
    match frame.format {
        FrameFormat::Rgb => RgbImage::from_raw(frame.width, frame.height, frame.data.clone())
            .map(DynamicImage::ImageRgb8),
        FrameFormat::Gray => GrayImage::from_raw(frame.width, frame.height, frame.data.clone())
            .map(DynamicImage::ImageLuma8),
    }
}

/// Mirror a frame horizontally (flip left-right) for selfie mode.
pub fn mirror_horizontal(frame: &mut Frame) {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let bpp = frame.bytes_per_pixel();

    for y in 0..height {
        let row_start = y * width * bpp;
        let row = &mut frame.data[row_start..row_start + width * bpp];

        for x in 0..width / 2 {
            let left = x * bpp;
            let right = (width - 1 - x) * bpp;
            for i in 0..bpp {
                row.swap(left + i, right + i);
            }
        }
    }
}

/// Per-axis contributions for area resampling: for every output index,
/// the source indices it covers and the fraction of coverage.
fn area_weights(src_len: u32, dst_len: u32) -> Vec<Vec<(usize, f32)>> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let start = d as f64 * scale;
            let end = ((d + 1) as f64 * scale).min(src_len as f64);
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src_len);
            let span = end - start;

            (first..last)
                .filter_map(|s| {
                    let covered = end.min(s as f64 + 1.0) - start.max(s as f64);
                    (covered > 0.0).then_some((s as usize, (covered / span) as f32))
                })
                .collect()
        })
        .collect()
}

/// Per-axis taps for linear resampling with pixel centres aligned: the two
/// source indices around each output sample and the weight of the second.
fn linear_taps(src_len: u32, dst_len: u32) -> Vec<(usize, usize, f32)> {
    let scale = src_len as f64 / dst_len as f64;
    let last = src_len as usize - 1;
    (0..dst_len)
        .map(|d| {
            let f = ((d as f64 + 0.5) * scale - 0.5).max(0.0);
            let i0 = (f.floor() as usize).min(last);
            let i1 = (i0 + 1).min(last);
            let t = (f - i0 as f64).clamp(0.0, 1.0) as f32;
            (i0, i1, t)
        })
        .collect()
}

/// Bilinear resampling, used when enlarging along either axis.
fn resize_linear(frame: &Frame, dst_width: u32, dst_height: u32) -> Frame {
    let bpp = frame.bytes_per_pixel();
    let src_width = frame.width as usize;
    let x_taps = linear_taps(frame.width, dst_width);
    let y_taps = linear_taps(frame.height, dst_height);
    let at = |x: usize, y: usize, c: usize| frame.data[(y * src_width + x) * bpp + c] as f32;

    let mut data = Vec::with_capacity(dst_width as usize * dst_height as usize * bpp);
    for &(y0, y1, ty) in &y_taps {
        for &(x0, x1, tx) in &x_taps {
            for c in 0..bpp {
                let top = at(x0, y0, c) * (1.0 - tx) + at(x1, y0, c) * tx;
                let bottom = at(x0, y1, c) * (1.0 - tx) + at(x1, y1, c) * tx;
                let v = top * (1.0 - ty) + bottom * ty;
                data.push(v.round().clamp(0.0, 255.0) as u8);
            }
        }
    }

    Frame {
        data,
        width: dst_width,
        height: dst_height,
        format: frame.format,
    }
}

/// Resample a frame to `dst_width` x `dst_height`.
///
/// When shrinking on both axes each output pixel is the coverage-weighted
/// mean of the source pixels under its footprint, which avoids the aliasing
/// of nearest-neighbour scaling on large photos. When enlarging along either
/// axis the frame is interpolated bilinearly instead.
///
/// Returns a clone when the size is unchanged, and an empty frame of the
/// requested shape when either side is zero.
pub fn resize_area(frame: &Frame, dst_width: u32, dst_height: u32) -> Frame {
    if dst_width == frame.width && dst_height == frame.height {
        return frame.clone();
    }
    if dst_width == 0 || dst_height == 0 || frame.width == 0 || frame.height == 0 {
        return Frame::black(dst_width, dst_height, frame.format);
    }
    if dst_width > frame.width || dst_height > frame.height {
        return resize_linear(frame, dst_width, dst_height);
    }

    let bpp = frame.bytes_per_pixel();
    let src_width = frame.width as usize;
    let x_weights = area_weights(frame.width, dst_width);
    let y_weights = area_weights(frame.height, dst_height);

    let mut data = Vec::with_capacity(dst_width as usize * dst_height as usize * bpp);
    let mut acc = vec![0f32; bpp];

    for ys in &y_weights {
        for xs in &x_weights {
            acc.iter_mut().for_each(|a| *a = 0.0);
            for &(sy, wy) in ys {
                for &(sx, wx) in xs {
                    let idx = (sy * src_width + sx) * bpp;
                    let w = wx * wy;
                    for (c, a) in acc.iter_mut().enumerate() {
                        *a += frame.data[idx + c] as f32 * w;
                    }
                }
            }
            data.extend(acc.iter().map(|a| a.round().clamp(0.0, 255.0) as u8));
        }
    }

    Frame {
        data,
        width: dst_width,
        height: dst_height,
        format: frame.format,
    }
}

//! Global and adaptive binarization of grayscale frames.

use crate::camera::{Frame, FrameFormat};

/// Largest window whose weighted sums still fit in `u64`: 255 * 4^28 < 2^64.
pub const MAX_BLOCK_SIZE: u32 = 29;

/// Odd window size in `3..=MAX_BLOCK_SIZE` nearest above `block_size`,
/// or the maximum.
fn valid_block_size(block_size: u32) -> u32 {
    block_size.clamp(3, MAX_BLOCK_SIZE) | 1
}

/// Binomial weights `C(n, k)` for a window of `size` taps.
///
/// For `size = 5` this is `[1, 4, 6, 4, 1]`, the usual small-kernel
/// Gaussian approximation.
fn binomial_row(size: u32) -> Vec<u64> {
    let n = size.saturating_sub(1) as u64;
    let mut row = Vec::with_capacity(size as usize);
    let mut c = 1u64;
    for k in 0..=n {
        row.push(c);
        c = c * (n - k) / (k + 1);
    }
    row
}

/// Gaussian-weighted local mean of a grayscale frame.
///
/// Separable binomial blur with a `block_size` window, edge pixels
/// replicated past the border, result rounded to nearest. `block_size` is
/// brought to an odd value in `3..=MAX_BLOCK_SIZE`.
pub fn gaussian_mean(gray: &Frame, block_size: u32) -> Vec<u8> {
    let block_size = valid_block_size(block_size);
    let width = gray.width as i64;
    let height = gray.height as i64;
    let weights = binomial_row(block_size);
    let radius = (weights.len() / 2) as i64;
    // Each pass sums to 2^(block_size - 1)
    let norm: u64 = weights.iter().sum();

    let clamp = |v: i64, len: i64| v.clamp(0, len - 1) as usize;

    // Horizontal pass, kept at full precision
    let mut horizontal = vec![0u64; gray.data.len()];
    for y in 0..height {
        let row = y as usize * width as usize;
        for x in 0..width {
            horizontal[row + x as usize] = weights
                .iter()
                .enumerate()
                .map(|(k, &w)| w * gray.data[row + clamp(x + k as i64 - radius, width)] as u64)
                .sum();
        }
    }

    let total = norm * norm;
    let mut mean = Vec::with_capacity(gray.data.len());
    for y in 0..height {
        for x in 0..width {
            let acc: u64 = weights
                .iter()
                .enumerate()
                .map(|(k, &w)| {
                    let sy = clamp(y + k as i64 - radius, height);
                    w * horizontal[sy * width as usize + x as usize]
                })
                .sum();
            mean.push(((acc + total / 2) / total) as u8);
        }
    }
    mean
}

/// Adaptive threshold against a Gaussian-weighted local mean.
///
/// A pixel becomes `max_value` when `pixel - mean > -offset`, i.e. when it
/// is no darker than its neighbourhood by `offset` or more, and 0
/// otherwise. Flat regions therefore come out white and the dark side of
/// every intensity step comes out black.
///
/// `block_size` is adjusted the same way as in [`gaussian_mean`].
pub fn adaptive_threshold_gaussian(gray: &Frame, max_value: u8, block_size: u32, offset: f32) -> Frame {
    let mean = gaussian_mean(gray, block_size);
    let delta = offset.ceil() as i32;

    let data = gray
        .data
        .iter()
        .zip(&mean)
        .map(|(&p, &m)| {
            if p as i32 - m as i32 > -delta {
                max_value
            } else {
                0
            }
        })
        .collect();

    Frame {
        data,
        width: gray.width,
        height: gray.height,
        format: FrameFormat::Gray,
    }
}

/// Binary threshold: `max_value` where the pixel is strictly above
/// `thresh`, 0 elsewhere.
pub fn threshold_binary(gray: &Frame, thresh: u8, max_value: u8) -> Frame {
    Frame {
        data: gray
            .data
            .iter()
            .map(|&p| if p > thresh { max_value } else { 0 })
            .collect(),
        width: gray.width,
        height: gray.height,
        format: FrameFormat::Gray,
    }
}

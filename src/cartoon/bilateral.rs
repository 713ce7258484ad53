//! Edge-preserving bilateral smoothing.
//!
//! Each output pixel is a weighted mean of the pixels in a circular
//! neighbourhood. The weight of a neighbour is the product of a spatial
//! Gaussian (distance to the centre) and a range Gaussian (difference in
//! value), so averaging stops at strong intensity steps.
//!
//! For colour frames the range difference is the sum of absolute
//! per-channel differences. Borders are mirrored without repeating the
//! edge pixel (`dcb|abcd|cba`).
//!
//! Rows are filtered in parallel. Pixels at least `radius` away from every
//! border read their neighbours through precomputed linear offsets; only the
//! border band goes through the reflection tables.

use rayon::prelude::*;

use crate::camera::{Frame, FrameFormat};

/// Parameters of one bilateral pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilateralParams {
    /// Neighbourhood diameter in pixels; the support radius is `diameter / 2`
    pub diameter: u32,
    /// Range sigma: how different two values may be and still be averaged
    pub sigma_color: f32,
    /// Spatial sigma
    pub sigma_space: f32,
}

impl BilateralParams {
    pub const fn new(diameter: u32, sigma_color: f32, sigma_space: f32) -> Self {
        Self {
            diameter,
            sigma_color,
            sigma_space,
        }
    }
}

/// Map an out-of-range coordinate back inside `0..len` by reflection.
fn reflect_101(i: i64, len: i64) -> usize {
    if len == 1 {
        return 0;
    }
    let mut i = i;
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        } else {
            i = 2 * len - 2 - i;
        }
    }
    i as usize
}

/// Offsets and spatial weights of the circular support.
fn spatial_kernel(radius: i64, sigma_space: f32) -> Vec<(i64, i64, f32)> {
    let coeff = -0.5 / (sigma_space as f64 * sigma_space as f64);
    let mut kernel = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dx * dx + dy * dy) as f64;
            if r2.sqrt() > radius as f64 {
                continue;
            }
            kernel.push((dx, dy, (r2 * coeff).exp() as f32));
        }
    }
    kernel
}

/// Range weights indexed by absolute difference (0..=255 per channel).
fn color_table(channels: usize, sigma_color: f32) -> Vec<f32> {
    let coeff = -0.5 / (sigma_color as f64 * sigma_color as f64);
    (0..256 * channels)
        .map(|d| ((d * d) as f64 * coeff).exp() as f32)
        .collect()
}

/// One neighbour of the support.
#[derive(Debug, Clone, Copy)]
struct Tap {
    dx: i64,
    dy: i64,
    /// `dy * width + dx`, in pixels
    offset: isize,
    weight: f32,
}

/// Everything a row worker needs, shared read-only across threads.
struct Plan<'a, const N: usize> {
    pixels: &'a [[u8; N]],
    width: usize,
    height: usize,
    radius: usize,
    taps: Vec<Tap>,
    range: Vec<f32>,
    /// Reflected column for `x + radius`, `x` in `-radius..width + radius`
    cols: Vec<usize>,
    rows: Vec<usize>,
}

impl<const N: usize> Plan<'_, N> {
    fn is_interior(&self, x: usize, y: usize) -> bool {
        x >= self.radius
            && x + self.radius < self.width
            && y >= self.radius
            && y + self.radius < self.height
    }

    fn border_index(&self, x: usize, y: usize, tap: &Tap) -> usize {
        let r = self.radius as i64;
        let sx = self.cols[(x as i64 + tap.dx + r) as usize];
        let sy = self.rows[(y as i64 + tap.dy + r) as usize];
        sy * self.width + sx
    }

    /// Add one neighbour to the running sums.
    #[inline]
    fn accumulate(
        &self,
        sums: &mut [f32; N],
        wsum: &mut f32,
        center: &[u8; N],
        px: &[u8; N],
        weight: f32,
    ) {
        let mut diff = 0usize;
        for c in 0..N {
            diff += (px[c] as i32 - center[c] as i32).unsigned_abs() as usize;
        }
        let w = weight * self.range[diff];
        for c in 0..N {
            sums[c] += px[c] as f32 * w;
        }
        *wsum += w;
    }

    /// Filter row `y` into `out` (`width * N` bytes).
    fn filter_row(&self, y: usize, out: &mut [u8]) {
        for x in 0..self.width {
            let center_index = y * self.width + x;
            let center = &self.pixels[center_index];

            let mut sums = [0f32; N];
            let mut wsum = 0f32;
            if self.is_interior(x, y) {
                for tap in &self.taps {
                    let px = &self.pixels[(center_index as isize + tap.offset) as usize];
                    self.accumulate(&mut sums, &mut wsum, center, px, tap.weight);
                }
            } else {
                for tap in &self.taps {
                    let px = &self.pixels[self.border_index(x, y, tap)];
                    self.accumulate(&mut sums, &mut wsum, center, px, tap.weight);
                }
            }

            for c in 0..N {
                out[x * N + c] = (sums[c] / wsum).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

fn filter<const N: usize>(frame: &Frame, radius: usize, params: BilateralParams) -> Vec<u8> {
    let pixels: Vec<[u8; N]> = frame
        .data
        .chunks_exact(N)
        .map(|chunk| {
            let mut px = [0u8; N];
            px.copy_from_slice(chunk);
            px
        })
        .collect();

    let width = frame.width as usize;
    let height = frame.height as usize;
    let r = radius as i64;
    let taps = spatial_kernel(r, params.sigma_space)
        .into_iter()
        .map(|(dx, dy, weight)| Tap {
            dx,
            dy,
            offset: (dy * width as i64 + dx) as isize,
            weight,
        })
        .collect();

    let plan = Plan {
        pixels: &pixels,
        width,
        height,
        radius,
        taps,
        range: color_table(N, params.sigma_color),
        cols: (-r..width as i64 + r)
            .map(|x| reflect_101(x, width as i64))
            .collect(),
        rows: (-r..height as i64 + r)
            .map(|y| reflect_101(y, height as i64))
            .collect(),
    };

    let mut out = vec![0u8; frame.data.len()];
    out.par_chunks_mut(width * N)
        .enumerate()
        .for_each(|(y, row)| plan.filter_row(y, row));
    out
}

/// Apply a bilateral filter to a grayscale or RGB frame.
///
/// Returns a new frame of the same shape; the input is left untouched.
/// A diameter below 2 leaves nothing to average and yields a copy.
pub fn bilateral_filter(frame: &Frame, params: BilateralParams) -> Frame {
    let radius = (params.diameter / 2) as usize;
    if radius == 0 || frame.width == 0 || frame.height == 0 {
        return frame.clone();
    }

    let data = match frame.format {
        FrameFormat::Rgb => filter::<3>(frame, radius, params),
        FrameFormat::Gray => filter::<1>(frame, radius, params),
    };

    Frame {
        data,
        width: frame.width,
        height: frame.height,
        format: frame.format,
    }
}

//! The named convolution filters.
//!
//! Each filter is a small fixed kernel with a divisor and an offset. Pixels
//! closer to the border than the kernel radius are copied unchanged, and the
//! alpha channel is never filtered.

use crate::error::TransformError;
use crate::image_processor::{convert_like, rgba8_for};
use image::{DynamicImage, RgbaImage};

#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    pub name: &'static str,
    /// Width and height; 3 or 5.
    pub size: u32,
    pub scale: i32,
    pub offset: i32,
    /// Row-major weights, `size * size` of them.
    pub weights: &'static [i32],
}

pub const BLUR: Kernel = Kernel {
    name: "blur",
    size: 5,
    scale: 16,
    offset: 0,
    weights: &[
        1, 1, 1, 1, 1, //
        1, 0, 0, 0, 1, //
        1, 0, 0, 0, 1, //
        1, 0, 0, 0, 1, //
        1, 1, 1, 1, 1,
    ],
};

pub const CONTOUR: Kernel = Kernel {
    name: "contour",
    size: 3,
    scale: 1,
    offset: 255,
    weights: &[-1, -1, -1, -1, 8, -1, -1, -1, -1],
};

pub const DETAIL: Kernel = Kernel {
    name: "detail",
    size: 3,
    scale: 6,
    offset: 0,
    weights: &[0, -1, 0, -1, 10, -1, 0, -1, 0],
};

pub const EDGE_ENHANCE: Kernel = Kernel {
    name: "edge enhance",
    size: 3,
    scale: 2,
    offset: 0,
    weights: &[-1, -1, -1, -1, 10, -1, -1, -1, -1],
};

pub const EDGE_ENHANCE_MORE: Kernel = Kernel {
    name: "more edge enhance",
    size: 3,
    scale: 1,
    offset: 0,
    weights: &[-1, -1, -1, -1, 9, -1, -1, -1, -1],
};

pub const EMBOSS: Kernel = Kernel {
    name: "emboss",
    size: 3,
    scale: 1,
    offset: 128,
    weights: &[-1, 0, 0, 0, 1, 0, 0, 0, 0],
};

pub const FIND_EDGES: Kernel = Kernel {
    name: "edgefind",
    size: 3,
    scale: 1,
    offset: 0,
    weights: &[-1, -1, -1, -1, 8, -1, -1, -1, -1],
};

pub const SHARPEN: Kernel = Kernel {
    name: "sharpen",
    size: 3,
    scale: 16,
    offset: 0,
    weights: &[-2, -2, -2, -2, 32, -2, -2, -2, -2],
};

pub const SMOOTH: Kernel = Kernel {
    name: "smoothing",
    size: 3,
    scale: 13,
    offset: 0,
    weights: &[1, 1, 1, 1, 5, 1, 1, 1, 1],
};

pub const SMOOTH_MORE: Kernel = Kernel {
    name: "more smoothing",
    size: 5,
    scale: 100,
    offset: 0,
    weights: &[
        1, 1, 1, 1, 1, //
        1, 5, 5, 5, 1, //
        1, 5, 44, 5, 1, //
        1, 5, 5, 5, 1, //
        1, 1, 1, 1, 1,
    ],
};

/// Convolve the color channels of an RGBA buffer.
pub fn convolve(src: &RgbaImage, kernel: &Kernel) -> RgbaImage {
    let (w, h) = src.dimensions();
    let r = kernel.size / 2;
    let mut out = src.clone();
    if w <= 2 * r || h <= 2 * r {
        return out;
    }

    for y in r..h - r {
        for x in r..w - r {
            let mut acc = [0i32; 3];
            for ky in 0..kernel.size {
                for kx in 0..kernel.size {
                    let weight = kernel.weights[(ky * kernel.size + kx) as usize];
                    if weight == 0 {
                        continue;
                    }
                    let p = src.get_pixel(x + kx - r, y + ky - r).0;
                    for c in 0..3 {
                        acc[c] += weight * i32::from(p[c]);
                    }
                }
            }
            let px = out.get_pixel_mut(x, y);
            for c in 0..3 {
                let v = acc[c] as f32 / kernel.scale as f32 + kernel.offset as f32;
                px.0[c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}

/// Apply `kernel` to an 8-bit image, keeping its layout.
pub fn apply(image: &DynamicImage, kernel: &Kernel) -> Result<DynamicImage, TransformError> {
    let rgba = rgba8_for(image, kernel.name)?;
    Ok(convert_like(
        DynamicImage::ImageRgba8(convolve(&rgba, kernel)),
        image.color(),
    ))
}

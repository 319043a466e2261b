//! One function per operation.
//!
//! Every transform reads its own options from the [`PipelineConfig`] snapshot,
//! validates them, and either returns a replacement image with a log message
//! describing the resolved values, or an [`Outcome::Skipped`] carrying the
//! `WARN` (or `INFO`) line. `Err` is reserved for failures of the operation
//! itself; the pipeline logs those as `ERROR` and keeps the previous image.

use crate::config::{ColorMode, FillColor, FitStrategy, PipelineConfig, TransposeMode};
use crate::error::{TransformError, ValidationError};
use crate::filters::{self, Kernel};
use crate::image_processor::{convert_like, paste_on_canvas, rgba8_for};
use crate::log::Severity;
use crate::stats;
use crate::validate;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, GrayImage, Rgba, RgbaImage};
use rgb::RGBA8;

#[derive(Debug)]
pub enum Outcome {
    /// The working image is replaced.
    Image { image: DynamicImage, message: String },
    /// Only the output extension changes.
    Extension { extension: String, message: String },
    /// A statistics block was captured from the current image.
    Statistics(stats::Report),
    /// Nothing changed; the message is logged with `severity`.
    Skipped { severity: Severity, message: String },
}

impl Outcome {
    fn image(image: DynamicImage, message: impl Into<String>) -> Self {
        Outcome::Image {
            image,
            message: message.into(),
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Outcome::Skipped {
            severity: Severity::Warn,
            message: message.into(),
        }
    }

    fn rejected(error: ValidationError, consequence: &str) -> Self {
        Outcome::warn(format!("{error}. {consequence}"))
    }
}

pub type TransformResult = Result<Outcome, TransformError>;

// ---------------------------------------------------------------------------
// geometry

/// Largest output a geometry operation may allocate.
///
/// Running out of memory aborts the process rather than unwinding, so
/// oversized outputs must be refused before the buffer exists.
pub const MAX_PIXELS: u64 = 2 * 89_478_485;

/// Checks a computed output size against [`MAX_PIXELS`].
fn bounded(width: u64, height: u64) -> Result<(u32, u32), TransformError> {
    let too_large = || TransformError::TooLarge {
        width,
        height,
        limit: MAX_PIXELS,
    };
    let w = u32::try_from(width).map_err(|_| too_large())?;
    let h = u32::try_from(height).map_err(|_| too_large())?;
    if w == 0 || h == 0 {
        return Err(TransformError::ZeroSize(w, h));
    }
    if width * height > MAX_PIXELS {
        return Err(too_large());
    }
    Ok((w, h))
}

/// Largest size with the source aspect ratio that fits in `target`.
fn contain_size(width: u32, height: u32, target: (u32, u32)) -> (u32, u32) {
    let (tw, th) = target;
    let ratio = f64::from(width) / f64::from(height);
    let target_ratio = f64::from(tw) / f64::from(th);
    if ratio > target_ratio {
        (tw, (f64::from(height) / f64::from(width) * f64::from(tw)).round() as u32)
    } else if ratio < target_ratio {
        ((f64::from(width) / f64::from(height) * f64::from(th)).round() as u32, th)
    } else {
        target
    }
}

/// Smallest size with the source aspect ratio that covers `target`.
fn cover_size(width: u32, height: u32, target: (u32, u32)) -> (u32, u32) {
    let (tw, th) = target;
    let ratio = f64::from(width) / f64::from(height);
    let target_ratio = f64::from(tw) / f64::from(th);
    if ratio < target_ratio {
        (tw, (f64::from(height) / f64::from(width) * f64::from(tw)).round() as u32)
    } else if ratio > target_ratio {
        ((f64::from(width) / f64::from(height) * f64::from(th)).round() as u32, th)
    } else {
        target
    }
}

fn resize_to(
    image: &DynamicImage,
    size: (u32, u32),
    filter: FilterType,
) -> Result<DynamicImage, TransformError> {
    let (width, height) = bounded(u64::from(size.0), u64::from(size.1))?;
    Ok(image.resize_exact(width, height, filter))
}

pub fn resize(image: &DynamicImage, config: &PipelineConfig) -> TransformResult {
    let opts = &config.resize;
    let spec = match validate::parse_resize(&opts.size) {
        Ok(spec) => spec,
        Err(e) => return Ok(Outcome::rejected(e, "No resizing performed.")),
    };
    let (width, height) = image.dimensions();
    let target = match spec.target(width, height) {
        Ok(target) => target,
        Err(e) => return Ok(Outcome::rejected(e, "No resizing performed.")),
    };

    if let Some(gate) = spec.gate.filter(|g| !g.admits(width, height)) {
        let (t, relation) = match gate {
            validate::ResizeGate::Larger(t) => (t, "exceeding"),
            validate::ResizeGate::Smaller(t) => (t, "below"),
        };
        return Ok(Outcome::Skipped {
            severity: Severity::Info,
            message: format!("Image dimension(s) not {relation} {t}x{t}. Skipping."),
        });
    }
    let target = bounded(u64::from(target.0), u64::from(target.1))?;

    let filter = opts.resample.filter_type();
    let resized = match opts.strategy {
        FitStrategy::Contain => resize_to(image, contain_size(width, height, target), filter)?,
        FitStrategy::Cover => resize_to(image, cover_size(width, height, target), filter)?,
        FitStrategy::Fit => image.resize_to_fill(target.0, target.1, filter),
        FitStrategy::Pad => {
            let inner = resize_to(image, contain_size(width, height, target), filter)?;
            let x = (target.0 - inner.width()) / 2;
            let y = (target.1 - inner.height()) / 2;
            paste_on_canvas(
                &inner,
                target.0,
                target.1,
                i64::from(x),
                i64::from(y),
                config.fill_color,
            )
        }
    };

    let message = format!(
        "Resized image using {} ({}, {}x{}).",
        opts.resample.name(),
        opts.strategy.name(),
        resized.width(),
        resized.height()
    );
    Ok(Outcome::image(resized, message))
}

pub fn transpose(image: &DynamicImage, config: &PipelineConfig) -> TransformResult {
    let mode = config.transpose.mode;
    let out = match mode {
        TransposeMode::FlipLeftRight => image.fliph(),
        TransposeMode::FlipTopBottom => image.flipv(),
        // the image crate rotates clockwise
        TransposeMode::Rotate90 => image.rotate270(),
        TransposeMode::Rotate180 => image.rotate180(),
        TransposeMode::Rotate270 => image.rotate90(),
    };
    Ok(Outcome::image(
        out,
        format!("Transposed image using {}.", mode.name()),
    ))
}

pub fn crop(image: &DynamicImage, config: &PipelineConfig) -> TransformResult {
    let (width, height) = image.dimensions();
    let region = match validate::parse_crop(&config.crop.region)
        .and_then(|spec| spec.resolve(width, height))
    {
        Ok(region) => region,
        Err(e) => return Ok(Outcome::rejected(e, "No cropping performed.")),
    };

    let inside = region.right <= width && region.lower <= height;
    let out = if inside {
        image.crop_imm(region.left, region.upper, region.width(), region.height())
    } else {
        // the part outside the source is filled with zeros
        bounded(u64::from(region.width()), u64::from(region.height()))?;
        let inner = image.crop_imm(region.left, region.upper, region.width(), region.height());
        paste_on_canvas(
            &inner,
            region.width(),
            region.height(),
            0,
            0,
            FillColor(RGBA8::new(0, 0, 0, 0)),
        )
    };

    Ok(Outcome::image(
        out,
        format!(
            "Cropped image region ({}, {}, {}, {}).",
            region.left, region.upper, region.right, region.lower
        ),
    ))
}

pub fn scale(image: &DynamicImage, config: &PipelineConfig) -> TransformResult {
    let opts = &config.scale;
    let factor = match validate::parse_scale(&opts.factor) {
        Ok(f) => f,
        Err(e) => return Ok(Outcome::rejected(e, "No scaling performed.")),
    };
    // the cast saturates, so huge factors land above the limit
    let scaled = |extent: u32| (factor * f64::from(extent)).round() as u64;
    let size = bounded(scaled(image.width()), scaled(image.height()))?;
    let out = resize_to(image, size, opts.resample.filter_type())?;
    Ok(Outcome::image(
        out,
        format!(
            "Scaled image with factor {factor} using {} ({}x{}).",
            opts.resample.name(),
            size.0,
            size.1
        ),
    ))
}

pub fn expand(image: &DynamicImage, config: &PipelineConfig) -> TransformResult {
    let border = match validate::parse_border(&config.expand.border) {
        Ok(b) => b,
        Err(e) => return Ok(Outcome::rejected(e, "No expanding performed.")),
    };
    // u32 sides plus twice a u32 border cannot overflow u64
    let margin = 2 * u64::from(border);
    let (width, height) = bounded(
        u64::from(image.width()) + margin,
        u64::from(image.height()) + margin,
    )?;
    let out = paste_on_canvas(
        image,
        width,
        height,
        i64::from(border),
        i64::from(border),
        config.fill_color,
    );
    Ok(Outcome::image(
        out,
        format!(
            "Expanded image by {border} pixels with color {}.",
            config.fill_color
        ),
    ))
}

// ---------------------------------------------------------------------------
// point operations

pub fn flip(image: &DynamicImage, _: &PipelineConfig) -> TransformResult {
    Ok(Outcome::image(image.flipv(), "Flipped image."))
}

pub fn mirror(image: &DynamicImage, _: &PipelineConfig) -> TransformResult {
    Ok(Outcome::image(image.fliph(), "Mirrored image."))
}

/// Equalize each color band independently; alpha is kept.
pub fn equalize(image: &DynamicImage, _: &PipelineConfig) -> TransformResult {
    let rgba = rgba8_for(image, "equalize")?;
    let (w, h) = rgba.dimensions();
    let bands: [GrayImage; 3] = std::array::from_fn(|c| {
        let band = GrayImage::from_fn(w, h, |x, y| image::Luma([rgba.get_pixel(x, y).0[c]]));
        imageproc::contrast::equalize_histogram(&band)
    });
    let out = RgbaImage::from_fn(w, h, |x, y| {
        Rgba([
            bands[0].get_pixel(x, y).0[0],
            bands[1].get_pixel(x, y).0[0],
            bands[2].get_pixel(x, y).0[0],
            rgba.get_pixel(x, y).0[3],
        ])
    });
    Ok(Outcome::image(
        convert_like(DynamicImage::ImageRgba8(out), image.color()),
        "Equalized image histogram.",
    ))
}

pub fn grayscale(image: &DynamicImage, _: &PipelineConfig) -> TransformResult {
    Ok(Outcome::image(
        DynamicImage::ImageLuma8(image.to_luma8()),
        "Grayscaled image.",
    ))
}

pub fn invert(image: &DynamicImage, _: &PipelineConfig) -> TransformResult {
    let mut out = image.clone();
    out.invert();
    Ok(Outcome::image(out, "Inverted image."))
}

/// Run `f` over every color channel of an 8-bit image.
fn map_channels(
    image: &DynamicImage,
    operation: &'static str,
    f: impl Fn(u8) -> u8,
) -> Result<DynamicImage, TransformError> {
    let mut rgba = rgba8_for(image, operation)?;
    for px in rgba.pixels_mut() {
        for c in &mut px.0[..3] {
            *c = f(*c);
        }
    }
    Ok(convert_like(DynamicImage::ImageRgba8(rgba), image.color()))
}

pub fn posterize(image: &DynamicImage, config: &PipelineConfig) -> TransformResult {
    let bits = match validate::parse_posterize(&config.posterize.bits) {
        Ok(b) => b,
        Err(e) => return Ok(Outcome::rejected(e, "Did not posterize image.")),
    };
    let mask = !((1u16 << (8 - bits)) - 1) as u8;
    let out = map_channels(image, "posterize", |v| v & mask)?;
    Ok(Outcome::image(
        out,
        format!("Posterized image, kept {bits} bit(s)."),
    ))
}

pub fn solarize(image: &DynamicImage, config: &PipelineConfig) -> TransformResult {
    let threshold = match validate::parse_solarize(&config.solarize.threshold) {
        Ok(t) => t,
        Err(e) => return Ok(Outcome::rejected(e, "Did not solarize image.")),
    };
    let out = map_channels(image, "solarize", |v| {
        if u32::from(v) >= threshold { 255 - v } else { v }
    })?;
    Ok(Outcome::image(
        out,
        format!("Solarized image with threshold {threshold}."),
    ))
}

// ---------------------------------------------------------------------------
// filters

fn filter(image: &DynamicImage, kernel: &Kernel) -> TransformResult {
    let out = filters::apply(image, kernel)?;
    Ok(Outcome::image(
        out,
        format!("Applied {} to image.", kernel.name),
    ))
}

pub fn blur(image: &DynamicImage, _: &PipelineConfig) -> TransformResult {
    filter(image, &filters::BLUR)
}

pub fn contour(image: &DynamicImage, _: &PipelineConfig) -> TransformResult {
    filter(image, &filters::CONTOUR)
}

pub fn detail(image: &DynamicImage, _: &PipelineConfig) -> TransformResult {
    filter(image, &filters::DETAIL)
}

pub fn edge_enhance(image: &DynamicImage, _: &PipelineConfig) -> TransformResult {
    filter(image, &filters::EDGE_ENHANCE)
}

pub fn edge_enhance_more(image: &DynamicImage, _: &PipelineConfig) -> TransformResult {
    filter(image, &filters::EDGE_ENHANCE_MORE)
}

pub fn emboss(image: &DynamicImage, _: &PipelineConfig) -> TransformResult {
    filter(image, &filters::EMBOSS)
}

pub fn find_edges(image: &DynamicImage, _: &PipelineConfig) -> TransformResult {
    filter(image, &filters::FIND_EDGES)
}

pub fn sharpen(image: &DynamicImage, _: &PipelineConfig) -> TransformResult {
    filter(image, &filters::SHARPEN)
}

pub fn smooth(image: &DynamicImage, _: &PipelineConfig) -> TransformResult {
    filter(image, &filters::SMOOTH)
}

pub fn smooth_more(image: &DynamicImage, _: &PipelineConfig) -> TransformResult {
    filter(image, &filters::SMOOTH_MORE)
}

// ---------------------------------------------------------------------------
// enhancements
//
// Each interpolates between a degenerate image and the original:
// out = degenerate + factor * (original - degenerate).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enhancement {
    Color,
    Contrast,
    Brightness,
    Sharpness,
}

impl Enhancement {
    fn name(self) -> &'static str {
        match self {
            Enhancement::Color => "color",
            Enhancement::Contrast => "contrast",
            Enhancement::Brightness => "brightness",
            Enhancement::Sharpness => "sharpness",
        }
    }

    fn degenerate(self, src: &RgbaImage) -> RgbaImage {
        match self {
            Enhancement::Color => {
                let gray = DynamicImage::ImageRgba8(src.clone()).to_luma8();
                RgbaImage::from_fn(src.width(), src.height(), |x, y| {
                    let l = gray.get_pixel(x, y).0[0];
                    Rgba([l, l, l, src.get_pixel(x, y).0[3]])
                })
            }
            Enhancement::Contrast => {
                let gray = DynamicImage::ImageRgba8(src.clone()).to_luma8();
                let n = u64::from(gray.width()) * u64::from(gray.height());
                let total: u64 = gray.pixels().map(|p| u64::from(p.0[0])).sum();
                let mean = if n == 0 {
                    0
                } else {
                    (total as f64 / n as f64 + 0.5) as u8
                };
                RgbaImage::from_pixel(src.width(), src.height(), Rgba([mean, mean, mean, 255]))
            }
            Enhancement::Brightness => {
                RgbaImage::from_pixel(src.width(), src.height(), Rgba([0, 0, 0, 255]))
            }
            Enhancement::Sharpness => filters::convolve(src, &filters::SMOOTH),
        }
    }

    pub fn apply(self, image: &DynamicImage, factor: f32) -> Result<DynamicImage, TransformError> {
        let mut out = rgba8_for(image, self.name())?;
        let degenerate = self.degenerate(&out);
        for (px, d) in out.pixels_mut().zip(degenerate.pixels()) {
            for c in 0..3 {
                let base = f32::from(d.0[c]);
                let v = base + factor * (f32::from(px.0[c]) - base);
                px.0[c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
        Ok(convert_like(DynamicImage::ImageRgba8(out), image.color()))
    }
}

fn enhance(image: &DynamicImage, raw: &str, kind: Enhancement) -> TransformResult {
    let factor = match validate::parse_factor(raw) {
        Ok(f) => f,
        Err(_) => {
            return Ok(Outcome::warn(format!(
                "Invalid {} factor. No enhancing performed.",
                kind.name()
            )));
        }
    };
    let out = kind.apply(image, factor)?;
    Ok(Outcome::image(
        out,
        format!("Enhanced {} of image with factor {factor}.", kind.name()),
    ))
}

pub fn color(image: &DynamicImage, config: &PipelineConfig) -> TransformResult {
    enhance(image, &config.color.factor, Enhancement::Color)
}

pub fn contrast(image: &DynamicImage, config: &PipelineConfig) -> TransformResult {
    enhance(image, &config.contrast.factor, Enhancement::Contrast)
}

pub fn brightness(image: &DynamicImage, config: &PipelineConfig) -> TransformResult {
    enhance(image, &config.brightness.factor, Enhancement::Brightness)
}

pub fn sharpness(image: &DynamicImage, config: &PipelineConfig) -> TransformResult {
    enhance(image, &config.sharpness.factor, Enhancement::Sharpness)
}

// ---------------------------------------------------------------------------
// advanced

/// Changes only the output extension; pixels are untouched.
pub fn convert_filetype(_: &DynamicImage, config: &PipelineConfig) -> TransformResult {
    let raw = &config.filetype.format;
    match validate::parse_filetype(raw) {
        Ok(extension) => Ok(Outcome::Extension {
            extension,
            message: format!("Converted image to filetype {}.", raw.trim()),
        }),
        Err(e) => Ok(Outcome::rejected(e, "Filetype unchanged.")),
    }
}

pub fn convert_mode(image: &DynamicImage, config: &PipelineConfig) -> TransformResult {
    let mode = config.mode.mode;
    let out = match mode {
        ColorMode::Bilevel => {
            let mut gray = image.to_luma8();
            imageops::dither(&mut gray, &imageops::BiLevel);
            DynamicImage::ImageLuma8(gray)
        }
        ColorMode::L => DynamicImage::ImageLuma8(image.to_luma8()),
        ColorMode::La => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        ColorMode::Rgb => DynamicImage::ImageRgb8(image.to_rgb8()),
        ColorMode::Rgba => DynamicImage::ImageRgba8(image.to_rgba8()),
        ColorMode::L16 => DynamicImage::ImageLuma16(image.to_luma16()),
        ColorMode::Rgb16 => DynamicImage::ImageRgb16(image.to_rgb16()),
        ColorMode::Rgba16 => DynamicImage::ImageRgba16(image.to_rgba16()),
        ColorMode::Rgb32F => DynamicImage::ImageRgb32F(image.to_rgb32f()),
        ColorMode::Rgba32F => DynamicImage::ImageRgba32F(image.to_rgba32f()),
    };
    Ok(Outcome::image(
        out,
        format!("Converted image to mode {}.", mode.name()),
    ))
}

/// Captures the selected metrics from the image as it stands now.
pub fn statistics(image: &DynamicImage, config: &PipelineConfig) -> TransformResult {
    Ok(Outcome::Statistics(stats::report(image, &config.stats)))
}

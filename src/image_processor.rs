use crate::config::FillColor;
use crate::error::TransformError;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader, ImageResult, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// A decoded source image plus what is known about where it came from.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    pub image: DynamicImage,
    pub format: Option<ImageFormat>,
    pub path: PathBuf,
}

impl ImageHandle {
    /// Decode `path`, sniffing the format from content before trusting the
    /// extension.
    pub fn open(path: &Path) -> ImageResult<Self> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader.format();
        let image = reader.decode()?;
        Ok(Self {
            image,
            format,
            path: path.to_path_buf(),
        })
    }

    pub fn from_image(image: DynamicImage, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = ImageFormat::from_path(&path).ok();
        Self {
            image,
            format,
            path,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extension with its leading dot, as written; empty if there is none.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default()
    }

    pub fn format_name(&self) -> String {
        match self.format {
            Some(f) => format!("{f:?}").to_uppercase(),
            None => "UNKNOWN".to_string(),
        }
    }
}

/// Short tag for the pixel representation, used in log lines.
pub fn mode_name(image: &DynamicImage) -> &'static str {
    match image.color() {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "I;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGBF",
        ColorType::Rgba32F => "RGBAF",
        _ => "unknown",
    }
}

fn is_8bit(color: ColorType) -> bool {
    matches!(
        color,
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8
    )
}

/// Pixel operations work on 8-bit images only; this widens any 8-bit layout
/// to RGBA so one code path covers them all.
pub fn rgba8_for(
    image: &DynamicImage,
    operation: &'static str,
) -> Result<RgbaImage, TransformError> {
    if !is_8bit(image.color()) {
        return Err(TransformError::UnsupportedMode {
            operation,
            mode: mode_name(image),
        });
    }
    Ok(image.to_rgba8())
}

/// Convert `image` to the given layout. Unknown layouts pass through.
pub fn convert_like(image: DynamicImage, color: ColorType) -> DynamicImage {
    if image.color() == color {
        return image;
    }
    match color {
        ColorType::L8 => DynamicImage::ImageLuma8(image.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(image.to_rgb8()),
        ColorType::Rgba8 => DynamicImage::ImageRgba8(image.to_rgba8()),
        ColorType::L16 => DynamicImage::ImageLuma16(image.to_luma16()),
        ColorType::La16 => DynamicImage::ImageLumaA16(image.to_luma_alpha16()),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(image.to_rgb16()),
        ColorType::Rgba16 => DynamicImage::ImageRgba16(image.to_rgba16()),
        ColorType::Rgb32F => DynamicImage::ImageRgb32F(image.to_rgb32f()),
        ColorType::Rgba32F => DynamicImage::ImageRgba32F(image.to_rgba32f()),
        _ => image,
    }
}

/// Place `top` at `(x, y)` on a `width`x`height` canvas of `fill`. The
/// result keeps `top`'s layout.
pub fn paste_on_canvas(
    top: &DynamicImage,
    width: u32,
    height: u32,
    x: i64,
    y: i64,
    fill: FillColor,
) -> DynamicImage {
    let color = top.color();
    let canvas = if is_8bit(color) {
        let mut canvas = RgbaImage::from_pixel(width, height, fill.rgba());
        image::imageops::replace(&mut canvas, &top.to_rgba8(), x, y);
        DynamicImage::ImageRgba8(canvas)
    } else {
        let Rgba([r, g, b, a]) = fill.rgba();
        let norm = |c: u8| f32::from(c) / 255.0;
        let mut canvas = image::Rgba32FImage::from_pixel(
            width,
            height,
            Rgba([norm(r), norm(g), norm(b), norm(a)]),
        );
        image::imageops::replace(&mut canvas, &top.to_rgba32f(), x, y);
        DynamicImage::ImageRgba32F(canvas)
    };
    convert_like(canvas, color)
}

//! Format-specific persistence.
//!
//! The output extension picks one of three branches: the single-frame
//! scientific format, the formats that know about frames, interlacing and
//! optimization, and everything else, which takes quality and progressive
//! settings. Option combinations the encoders cannot honor are errors.

use crate::config::SaveOptions;
use crate::error::SaveError;
use crate::log::LogSink;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Spider,
    MultiFrame,
    Default,
}

fn branch(ext: &str) -> Branch {
    match ext {
        "spi" => Branch::Spider,
        "png" | "gif" | "mpo" | "pdf" | "tiff" | "webp" => Branch::MultiFrame,
        _ => Branch::Default,
    }
}

/// Encode `image` to `path`, choosing encoder settings by `extension`
/// (dotted, any case).
pub fn save_image(
    image: &DynamicImage,
    path: &Path,
    extension: &str,
    options: &SaveOptions,
    log: &LogSink,
) -> Result<(), SaveError> {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    match branch(&ext) {
        Branch::Spider => Err(SaveError::UnsupportedFormat("SPIDER")),
        Branch::MultiFrame => save_multi_frame(image, path, &ext, options, log),
        Branch::Default => save_default(image, path, &ext, options),
    }
}

fn create(path: &Path) -> Result<BufWriter<File>, SaveError> {
    Ok(BufWriter::new(File::create(path)?))
}

// Images here always have a single frame, so `save_all_frames` has nothing
// extra to write.
fn save_multi_frame(
    image: &DynamicImage,
    path: &Path,
    ext: &str,
    options: &SaveOptions,
    log: &LogSink,
) -> Result<(), SaveError> {
    match ext {
        "png" => {
            let compression = if options.optimize {
                CompressionType::Best
            } else {
                CompressionType::Default
            };
            let mut out = create(path)?;
            let encoder = PngEncoder::new_with_quality(&mut out, compression, FilterType::Adaptive);
            image.write_with_encoder(encoder)?;
            out.flush()?;
        }
        "gif" => {
            if options.interlace {
                return Err(SaveError::UnsupportedOption {
                    format: "GIF",
                    option: "interlace",
                });
            }
            let mut out = create(path)?;
            image.write_to(&mut out, ImageFormat::Gif)?;
            out.flush()?;
        }
        "webp" => {
            if !options.lossless {
                log.warn(format!(
                    "WebP quality {} ignored, writing lossless.",
                    options.webp_quality
                ));
            }
            let mut out = create(path)?;
            image.write_with_encoder(WebPEncoder::new_lossless(&mut out))?;
            out.flush()?;
        }
        "tiff" => {
            let mut out = create(path)?;
            image.write_to(&mut out, ImageFormat::Tiff)?;
            out.flush()?;
        }
        "pdf" => return Err(SaveError::UnsupportedFormat("PDF")),
        _ => return Err(SaveError::UnsupportedFormat("MPO")),
    }
    Ok(())
}

fn save_default(
    image: &DynamicImage,
    path: &Path,
    ext: &str,
    options: &SaveOptions,
) -> Result<(), SaveError> {
    match ext {
        "jpg" | "jpeg" | "jfif" | "jpe" => {
            if options.progressive {
                return Err(SaveError::UnsupportedOption {
                    format: "JPEG",
                    option: "progressive",
                });
            }
            let mut out = create(path)?;
            let encoder = JpegEncoder::new_with_quality(&mut out, options.jpeg_quality.max(1));
            image.write_with_encoder(encoder)?;
            out.flush()?;
        }
        "blp" => {
            return Err(SaveError::UnsupportedFormat(if options.blp1 {
                "BLP1"
            } else {
                "BLP2"
            }));
        }
        _ => {
            let format = ImageFormat::from_extension(ext)
                .filter(|f| f.writing_enabled())
                .ok_or_else(|| SaveError::UnknownExtension(format!(".{ext}")))?;
            let mut out = create(path)?;
            image.write_to(&mut out, format)?;
            out.flush()?;
        }
    }
    Ok(())
}

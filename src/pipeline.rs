//! Pipeline executor.
//!
//! Operations live in one static table in their fixed global order. The
//! executor walks the table once per image, skipping disabled entries
//! without touching them, and wraps every enabled entry so that a failure
//! (including a panic inside the imaging library) costs exactly one `ERROR`
//! line and leaves the previous image in place.

use crate::config::PipelineConfig;
use crate::error::TransformError;
use crate::image_processor::{ImageHandle, mode_name};
use crate::log::{LogSink, Severity};
use crate::transform::{self, Outcome, TransformResult};
use image::DynamicImage;
use std::panic::{AssertUnwindSafe, catch_unwind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Geometry,
    Point,
    Filter,
    Enhance,
    Advanced,
}

impl Stage {
    /// Tag used for success lines of operations in this stage.
    pub fn tag(self) -> Severity {
        match self {
            Stage::Advanced => Severity::Advanced,
            _ => Severity::Transform,
        }
    }
}

/// One entry of the operation table.
pub struct Operation {
    pub name: &'static str,
    pub stage: Stage,
    pub enabled: fn(&PipelineConfig) -> bool,
    pub apply: fn(&DynamicImage, &PipelineConfig) -> TransformResult,
}

macro_rules! op {
    ($name:literal, $stage:ident, $field:ident, $apply:path) => {
        Operation {
            name: $name,
            stage: Stage::$stage,
            enabled: |c| c.$field.enabled,
            apply: $apply,
        }
    };
}

pub static OPERATIONS: [Operation; 29] = [
    op!("resize", Geometry, resize, transform::resize),
    op!("transpose", Geometry, transpose, transform::transpose),
    op!("crop", Geometry, crop, transform::crop),
    op!("scale", Geometry, scale, transform::scale),
    op!("expand", Geometry, expand, transform::expand),
    op!("flip", Point, flip, transform::flip),
    op!("mirror", Point, mirror, transform::mirror),
    op!("equalize", Point, equalize, transform::equalize),
    op!("grayscale", Point, grayscale, transform::grayscale),
    op!("invert", Point, invert, transform::invert),
    op!("posterize", Point, posterize, transform::posterize),
    op!("solarize", Point, solarize, transform::solarize),
    op!("blur", Filter, blur, transform::blur),
    op!("contour", Filter, contour, transform::contour),
    op!("detail", Filter, detail, transform::detail),
    op!("edge enhance", Filter, edge_enhance, transform::edge_enhance),
    op!("edge enhance more", Filter, edge_enhance_more, transform::edge_enhance_more),
    op!("emboss", Filter, emboss, transform::emboss),
    op!("find edges", Filter, find_edges, transform::find_edges),
    op!("sharpen", Filter, sharpen, transform::sharpen),
    op!("smooth", Filter, smooth, transform::smooth),
    op!("smooth more", Filter, smooth_more, transform::smooth_more),
    op!("color", Enhance, color, transform::color),
    op!("contrast", Enhance, contrast, transform::contrast),
    op!("brightness", Enhance, brightness, transform::brightness),
    op!("sharpness", Enhance, sharpness, transform::sharpness),
    op!("filetype conversion", Advanced, filetype, transform::convert_filetype),
    op!("mode conversion", Advanced, mode, transform::convert_mode),
    op!("statistics", Advanced, stats, transform::statistics),
];

/// What one image's pass through the pipeline produced.
#[derive(Debug)]
pub struct JobResult {
    pub image: DynamicImage,
    /// Base name of the source file.
    pub name: String,
    /// Output extension with its dot; the source's unless converted.
    pub extension: String,
    /// Sidecar text, present only if at least one metric was written.
    pub statistics: Option<String>,
    /// `ERROR` lines logged while processing this image.
    pub errors: usize,
}

/// Run `op` with panics turned into errors.
fn isolated(op: &Operation, image: &DynamicImage, config: &PipelineConfig) -> TransformResult {
    catch_unwind(AssertUnwindSafe(|| (op.apply)(image, config)))
        .unwrap_or(Err(TransformError::Panicked(op.name)))
}

/// Run every enabled operation over `handle`'s image in table order.
pub fn execute(handle: ImageHandle, config: &PipelineConfig, log: &LogSink) -> JobResult {
    let file_name = handle.file_name();
    log.file(format!(
        "Processing {} ({}, {}x{}, {})...",
        file_name,
        handle.format_name(),
        handle.image.width(),
        handle.image.height(),
        mode_name(&handle.image)
    ));

    let mut result = JobResult {
        name: handle.stem(),
        extension: handle.extension(),
        image: handle.image,
        statistics: None,
        errors: 0,
    };

    for op in OPERATIONS.iter().filter(|op| (op.enabled)(config)) {
        match isolated(op, &result.image, config) {
            Ok(Outcome::Image { image, message }) => {
                result.image = image;
                log.push(op.stage.tag(), message);
            }
            Ok(Outcome::Extension { extension, message }) => {
                result.extension = extension;
                log.push(op.stage.tag(), message);
            }
            Ok(Outcome::Statistics(report)) => {
                for (metric, e) in &report.failures {
                    log.error(format!("{} {}: {e}", op.name, metric.name()));
                    result.errors += 1;
                }
                if report.lines > 0 {
                    log.push(
                        op.stage.tag(),
                        format!("Captured {} image statistic(s).", report.lines),
                    );
                    result.statistics = Some(report.text);
                }
            }
            Ok(Outcome::Skipped { severity, message }) => log.push(severity, message),
            Err(e) => {
                log.error(format!("{}: {e}", op.name));
                result.errors += 1;
            }
        }
    }

    log.file(format!("Successfully processed {file_name}."));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorMode;
    use image::{GenericImageView, Rgb, RgbImage};

    fn handle(width: u32, height: u32) -> ImageHandle {
        let image = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 50]));
        ImageHandle::from_image(image.into(), "/src/Photo.PNG")
    }

    #[test]
    fn test_table_is_in_stage_order() {
        assert!(OPERATIONS.windows(2).all(|w| w[0].stage <= w[1].stage));
        let names: Vec<_> = OPERATIONS.iter().map(|op| op.name).collect();
        let pos = |n| names.iter().position(|x| *x == n).unwrap();
        assert!(pos("resize") < pos("expand"));
        assert!(pos("filetype conversion") < pos("mode conversion"));
        assert_eq!(names.last(), Some(&"statistics"));
    }

    #[test]
    fn test_nothing_enabled_logs_only_file_lines() {
        let log = LogSink::new();
        let result = execute(handle(4, 3), &PipelineConfig::default(), &log);
        let lines: Vec<_> = log.snapshot().iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "[FILE] Processing Photo.PNG (PNG, 4x3, RGB)...",
                "[FILE] Successfully processed Photo.PNG.",
            ]
        );
        assert_eq!(result.name, "Photo");
        assert_eq!(result.extension, ".PNG");
        assert_eq!(result.errors, 0);
        assert!(result.statistics.is_none());
    }

    #[test]
    fn test_warn_does_not_stop_later_operations() {
        let mut config = PipelineConfig::default();
        config.resize.enabled = true;
        config.resize.size = "nonsense".to_string();
        config.flip.enabled = true;
        let log = LogSink::new();
        let result = execute(handle(4, 3), &config, &log);
        assert_eq!(log.count(Severity::Warn), 1);
        assert_eq!(log.count(Severity::Transform), 1);
        assert_eq!(result.errors, 0);
        assert_eq!(result.image.dimensions(), (4, 3));
    }

    #[test]
    fn test_failure_keeps_previous_image_and_continues() {
        let mut config = PipelineConfig::default();
        config.mode.enabled = true;
        config.mode.mode = ColorMode::Rgb16;
        config.blur.enabled = true;
        let log = LogSink::new();

        // blur runs before mode conversion, so feed a deep image directly
        let deep = ImageHandle::from_image(DynamicImage::new_rgb16(6, 6), "deep.tif");
        let result = execute(deep, &config, &log);
        assert_eq!(result.errors, 1);
        assert_eq!(log.count(Severity::Error), 1);
        assert_eq!(log.count(Severity::Advanced), 1);
        assert_eq!(result.image.color(), image::ColorType::Rgb16);
        let error = log
            .snapshot()
            .into_iter()
            .find(|e| e.severity == Severity::Error)
            .unwrap();
        assert_eq!(error.message, "blur: blur is not supported for mode RGB;16");
    }

    #[test]
    fn test_oversized_scale_costs_one_error() {
        let mut config = PipelineConfig::default();
        config.scale.enabled = true;
        config.scale.factor = "100000".to_string();
        config.mirror.enabled = true;
        let log = LogSink::new();
        let result = execute(handle(10, 10), &config, &log);
        assert_eq!(result.errors, 1);
        assert_eq!(log.count(Severity::Error), 1);
        assert_eq!(result.image.dimensions(), (10, 10));
        // later operations still run
        assert_eq!(log.count(Severity::Transform), 1);
        let error = log
            .snapshot()
            .into_iter()
            .find(|e| e.severity == Severity::Error)
            .unwrap();
        assert_eq!(
            error.message,
            "scale: resulting size 1000000x1000000 exceeds 178956970 pixels"
        );
    }

    #[test]
    fn test_advanced_stage_order() {
        let mut config = PipelineConfig::default();
        config.filetype.enabled = true;
        config.filetype.format = "TIFF".to_string();
        config.mode.enabled = true;
        config.mode.mode = ColorMode::L;
        config.stats.enabled = true;
        config.stats.count = true;
        config.stats.extrema = true;
        let log = LogSink::new();
        let result = execute(handle(4, 3), &config, &log);

        assert_eq!(result.extension, ".tiff");
        assert_eq!(result.image.color(), image::ColorType::L8);
        // one band: statistics saw the converted image
        assert!(result.statistics.as_deref().unwrap().contains("count:[12]\n"));

        let advanced: Vec<_> = log
            .snapshot()
            .into_iter()
            .filter(|e| e.severity == Severity::Advanced)
            .map(|e| e.message)
            .collect();
        assert_eq!(
            advanced,
            vec![
                "Converted image to filetype TIFF.",
                "Converted image to mode L.",
                "Captured 2 image statistic(s).",
            ]
        );
    }

    #[test]
    fn test_stats_without_metrics_has_no_sidecar() {
        let mut config = PipelineConfig::default();
        config.stats.enabled = true;
        let result = execute(handle(2, 2), &config, &LogSink::new());
        assert!(result.statistics.is_none());
    }

    #[test]
    fn test_panicking_operation_is_isolated() {
        fn boom(_: &DynamicImage, _: &PipelineConfig) -> TransformResult {
            panic!("library bug")
        }
        let op = Operation {
            name: "boom",
            stage: Stage::Filter,
            enabled: |_| true,
            apply: boom,
        };
        let image = DynamicImage::new_rgb8(1, 1);
        let err = isolated(&op, &image, &PipelineConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "boom panicked");
    }
}

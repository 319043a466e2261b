//! Option store: every toggle and parameter the pipeline consults.
//!
//! A [`PipelineConfig`] is captured once when a batch starts and is only read
//! from then on. Textual parameters are kept raw; the validators in
//! [`crate::validate`] interpret them at the moment the operation runs, so a
//! bad value only skips that one operation.

use crate::error::ConfigError;
use image::imageops::FilterType;
use rgb::RGBA8;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Resampling filter used by resize and scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Resample {
    Nearest,
    Lanczos,
    Bilinear,
    Bicubic,
    Box,
    Hamming,
}

impl Resample {
    pub fn name(self) -> &'static str {
        match self {
            Resample::Nearest => "NEAREST",
            Resample::Lanczos => "LANCZOS",
            Resample::Bilinear => "BILINEAR",
            Resample::Bicubic => "BICUBIC",
            Resample::Box => "BOX",
            Resample::Hamming => "HAMMING",
        }
    }

    /// Closest filter offered by the `image` crate.
    pub fn filter_type(self) -> FilterType {
        match self {
            Resample::Nearest => FilterType::Nearest,
            Resample::Lanczos => FilterType::Lanczos3,
            Resample::Bilinear | Resample::Box => FilterType::Triangle,
            Resample::Bicubic | Resample::Hamming => FilterType::CatmullRom,
        }
    }
}

/// How resize reconciles the source and target aspect ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum FitStrategy {
    /// Largest size inside the target, aspect ratio kept, nothing cropped.
    #[default]
    Contain,
    /// Smallest size covering the target, aspect ratio kept.
    Cover,
    /// Scaled and center-cropped to exactly the target.
    Fit,
    /// Contained, then centered on a target-sized canvas of the fill color.
    Pad,
}

impl FitStrategy {
    pub fn name(self) -> &'static str {
        match self {
            FitStrategy::Contain => "Contain",
            FitStrategy::Cover => "Cover",
            FitStrategy::Fit => "Fit",
            FitStrategy::Pad => "Pad",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum TransposeMode {
    #[default]
    #[serde(rename = "FLIP_LEFT_RIGHT")]
    FlipLeftRight,
    #[serde(rename = "FLIP_TOP_BOTTOM")]
    FlipTopBottom,
    /// Counter-clockwise.
    #[serde(rename = "ROTATE_90")]
    Rotate90,
    #[serde(rename = "ROTATE_180")]
    Rotate180,
    /// Counter-clockwise.
    #[serde(rename = "ROTATE_270")]
    Rotate270,
}

impl TransposeMode {
    pub fn name(self) -> &'static str {
        match self {
            TransposeMode::FlipLeftRight => "FLIP_LEFT_RIGHT",
            TransposeMode::FlipTopBottom => "FLIP_TOP_BOTTOM",
            TransposeMode::Rotate90 => "ROTATE_90",
            TransposeMode::Rotate180 => "ROTATE_180",
            TransposeMode::Rotate270 => "ROTATE_270",
        }
    }
}

/// Target pixel representation for mode conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ColorMode {
    /// Black and white, stored as 8-bit luma holding only 0 and 255.
    #[default]
    #[serde(rename = "1")]
    Bilevel,
    #[serde(rename = "L")]
    L,
    #[serde(rename = "LA")]
    La,
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "RGBA")]
    Rgba,
    #[serde(rename = "I;16")]
    L16,
    #[serde(rename = "RGB;16")]
    Rgb16,
    #[serde(rename = "RGBA;16")]
    Rgba16,
    #[serde(rename = "RGBF")]
    Rgb32F,
    #[serde(rename = "RGBAF")]
    Rgba32F,
}

impl ColorMode {
    pub fn name(self) -> &'static str {
        match self {
            ColorMode::Bilevel => "1",
            ColorMode::L => "L",
            ColorMode::La => "LA",
            ColorMode::Rgb => "RGB",
            ColorMode::Rgba => "RGBA",
            ColorMode::L16 => "I;16",
            ColorMode::Rgb16 => "RGB;16",
            ColorMode::Rgba16 => "RGBA;16",
            ColorMode::Rgb32F => "RGBF",
            ColorMode::Rgba32F => "RGBAF",
        }
    }
}

/// One per-band statistic that can be written to the sidecar file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatMetric {
    Extrema,
    Count,
    Sum,
    Sum2,
    Mean,
    Median,
    Rms,
    Var,
    Stddev,
}

impl StatMetric {
    pub const ALL: [StatMetric; 9] = [
        StatMetric::Extrema,
        StatMetric::Count,
        StatMetric::Sum,
        StatMetric::Sum2,
        StatMetric::Mean,
        StatMetric::Median,
        StatMetric::Rms,
        StatMetric::Var,
        StatMetric::Stddev,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatMetric::Extrema => "extrema",
            StatMetric::Count => "count",
            StatMetric::Sum => "sum",
            StatMetric::Sum2 => "sum2",
            StatMetric::Mean => "mean",
            StatMetric::Median => "median",
            StatMetric::Rms => "rms",
            StatMetric::Var => "var",
            StatMetric::Stddev => "stddev",
        }
    }
}

/// Border/pad color, written as `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct FillColor(pub RGBA8);

impl Default for FillColor {
    fn default() -> Self {
        FillColor(RGBA8::new(0, 0, 0, 255))
    }
}

impl FromStr for FillColor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ConfigError::FillColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(bad)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
        let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(FillColor(RGBA8::new(channel(0)?, channel(2)?, channel(4)?, alpha)))
    }
}

impl TryFrom<String> for FillColor {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for FillColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.0;
        write!(f, "#{:02x}{:02x}{:02x}", c.r, c.g, c.b)?;
        if c.a != 255 {
            write!(f, "{:02x}", c.a)?;
        }
        Ok(())
    }
}

impl FillColor {
    pub fn rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.0.r, self.0.g, self.0.b, self.0.a])
    }
}

/// A parameterless operation: only the checkbox.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct Switch {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResizeOptions {
    pub enabled: bool,
    pub size: String,
    pub resample: Resample,
    pub strategy: FitStrategy,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            size: "100%".to_string(),
            resample: Resample::Bicubic,
            strategy: FitStrategy::Contain,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct TransposeOptions {
    pub enabled: bool,
    pub mode: TransposeMode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CropOptions {
    pub enabled: bool,
    pub region: String,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            region: "0%,0%,0%,0%".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScaleOptions {
    pub enabled: bool,
    pub factor: String,
    pub resample: Resample,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            factor: "1.0".to_string(),
            resample: Resample::Bicubic,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExpandOptions {
    pub enabled: bool,
    pub border: String,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            border: "0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PosterizeOptions {
    pub enabled: bool,
    pub bits: String,
}

impl Default for PosterizeOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            bits: "8".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolarizeOptions {
    pub enabled: bool,
    pub threshold: String,
}

impl Default for SolarizeOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: "256".to_string(),
        }
    }
}

/// Color, contrast, brightness and sharpness share this shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnhanceOptions {
    pub enabled: bool,
    pub factor: String,
}

impl Default for EnhanceOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            factor: "1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FiletypeOptions {
    pub enabled: bool,
    pub format: String,
}

impl Default for FiletypeOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            format: "PNG".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct ModeOptions {
    pub enabled: bool,
    pub mode: ColorMode,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct StatsOptions {
    pub enabled: bool,
    pub extrema: bool,
    pub count: bool,
    pub sum: bool,
    pub sum2: bool,
    pub mean: bool,
    pub median: bool,
    pub rms: bool,
    pub var: bool,
    pub stddev: bool,
}

impl StatsOptions {
    pub fn is_selected(&self, metric: StatMetric) -> bool {
        match metric {
            StatMetric::Extrema => self.extrema,
            StatMetric::Count => self.count,
            StatMetric::Sum => self.sum,
            StatMetric::Sum2 => self.sum2,
            StatMetric::Mean => self.mean,
            StatMetric::Median => self.median,
            StatMetric::Rms => self.rms,
            StatMetric::Var => self.var,
            StatMetric::Stddev => self.stddev,
        }
    }

    /// Selected metrics in sidecar order.
    pub fn selected(&self) -> impl Iterator<Item = StatMetric> + '_ {
        StatMetric::ALL.into_iter().filter(|m| self.is_selected(*m))
    }

    /// Enable capture with every metric selected.
    pub fn all() -> Self {
        Self {
            enabled: true,
            extrema: true,
            count: true,
            sum: true,
            sum2: true,
            mean: true,
            median: true,
            rms: true,
            var: true,
            stddev: true,
        }
    }
}

/// Encoder knobs, keyed by output extension at save time.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SaveOptions {
    /// BLP: write BLP1 instead of BLP2.
    pub blp1: bool,
    /// Multi-frame formats: write every frame.
    pub save_all_frames: bool,
    /// GIF: interlaced output.
    pub interlace: bool,
    pub optimize: bool,
    /// JPEG: progressive encoding.
    pub progressive: bool,
    /// JPEG quality, 0-95.
    pub jpeg_quality: u8,
    /// WebP: lossless encoding.
    pub lossless: bool,
    /// WebP quality, 0-100.
    pub webp_quality: u8,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            blp1: false,
            save_all_frames: false,
            interlace: false,
            optimize: false,
            progressive: false,
            jpeg_quality: 75,
            lossless: false,
            webp_quality: 80,
        }
    }
}

impl SaveOptions {
    pub const MAX_JPEG_QUALITY: u8 = 95;
    pub const MAX_WEBP_QUALITY: u8 = 100;

    fn clamp(&mut self) {
        self.jpeg_quality = self.jpeg_quality.min(Self::MAX_JPEG_QUALITY);
        self.webp_quality = self.webp_quality.min(Self::MAX_WEBP_QUALITY);
    }
}

/// Snapshot of every option for one batch run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    // geometry
    pub resize: ResizeOptions,
    pub transpose: TransposeOptions,
    pub crop: CropOptions,
    pub scale: ScaleOptions,
    pub expand: ExpandOptions,

    // point operations
    pub flip: Switch,
    pub mirror: Switch,
    pub equalize: Switch,
    pub grayscale: Switch,
    pub invert: Switch,
    pub posterize: PosterizeOptions,
    pub solarize: SolarizeOptions,

    // filters
    pub blur: Switch,
    pub contour: Switch,
    pub detail: Switch,
    pub edge_enhance: Switch,
    pub edge_enhance_more: Switch,
    pub emboss: Switch,
    pub find_edges: Switch,
    pub sharpen: Switch,
    pub smooth: Switch,
    pub smooth_more: Switch,

    // enhancements
    pub color: EnhanceOptions,
    pub contrast: EnhanceOptions,
    pub brightness: EnhanceOptions,
    pub sharpness: EnhanceOptions,

    // advanced
    pub filetype: FiletypeOptions,
    pub mode: ModeOptions,
    pub stats: StatsOptions,

    pub fill_color: FillColor,
    pub save: SaveOptions,
    /// Skip the name-collision confirmation.
    pub overwrite: bool,
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: PipelineConfig = serde_json::from_str(json)?;
        config.save.clamp();
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

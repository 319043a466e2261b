//! Per-band image statistics for the `.txt` sidecar.
//!
//! Everything is derived from one 256-bin histogram per band. Deep images are
//! reduced to 8 bits per band first.

use crate::config::{StatMetric, StatsOptions};
use crate::error::TransformError;
use image::{ColorType, DynamicImage};

pub struct Statistics {
    bands: Vec<[u64; 256]>,
}

impl Statistics {
    pub fn of(image: &DynamicImage) -> Self {
        let (channels, raw): (usize, Vec<u8>) = match image.color() {
            ColorType::L8 | ColorType::L16 => (1, image.to_luma8().into_raw()),
            ColorType::La8 | ColorType::La16 => (2, image.to_luma_alpha8().into_raw()),
            ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => {
                (3, image.to_rgb8().into_raw())
            }
            _ => (4, image.to_rgba8().into_raw()),
        };
        let mut bands = vec![[0u64; 256]; channels];
        for px in raw.chunks_exact(channels) {
            for (band, &v) in bands.iter_mut().zip(px) {
                band[usize::from(v)] += 1;
            }
        }
        Self { bands }
    }

    fn count(band: &[u64; 256]) -> u64 {
        band.iter().sum()
    }

    fn sum(band: &[u64; 256]) -> f64 {
        band.iter()
            .enumerate()
            .map(|(i, &n)| i as f64 * n as f64)
            .sum()
    }

    fn sum2(band: &[u64; 256]) -> f64 {
        band.iter()
            .enumerate()
            .map(|(i, &n)| (i * i) as f64 * n as f64)
            .sum()
    }

    fn nonempty(band: &[u64; 256]) -> Result<u64, TransformError> {
        match Self::count(band) {
            0 => Err(TransformError::EmptyImage),
            n => Ok(n),
        }
    }

    fn extrema(band: &[u64; 256]) -> Result<(usize, usize), TransformError> {
        let lo = band.iter().position(|&n| n > 0);
        let hi = band.iter().rposition(|&n| n > 0);
        lo.zip(hi).ok_or(TransformError::EmptyImage)
    }

    /// First value whose cumulative count passes half the population.
    fn median(band: &[u64; 256]) -> Result<usize, TransformError> {
        let half = Self::nonempty(band)? / 2;
        let mut seen = 0;
        for (i, &n) in band.iter().enumerate() {
            seen += n;
            if seen > half {
                return Ok(i);
            }
        }
        Err(TransformError::EmptyImage)
    }

    fn mean(band: &[u64; 256]) -> Result<f64, TransformError> {
        Ok(Self::sum(band) / Self::nonempty(band)? as f64)
    }

    fn var(band: &[u64; 256]) -> Result<f64, TransformError> {
        let n = Self::nonempty(band)? as f64;
        let sum = Self::sum(band);
        Ok((Self::sum2(band) - sum * sum / n) / n)
    }

    fn floats(
        &self,
        f: impl Fn(&[u64; 256]) -> Result<f64, TransformError>,
    ) -> Result<String, TransformError> {
        let values = self.bands.iter().map(f).collect::<Result<Vec<_>, _>>()?;
        Ok(format!("{values:?}"))
    }

    /// One metric rendered as a list with one entry per band.
    pub fn metric(&self, metric: StatMetric) -> Result<String, TransformError> {
        match metric {
            StatMetric::Extrema => {
                let pairs = self
                    .bands
                    .iter()
                    .map(Self::extrema)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(match pairs.as_slice() {
                    [single] => format!("{single:?}"),
                    _ => format!("{pairs:?}"),
                })
            }
            StatMetric::Count => {
                let counts: Vec<u64> = self.bands.iter().map(Self::count).collect();
                Ok(format!("{counts:?}"))
            }
            StatMetric::Sum => self.floats(|b| Ok(Self::sum(b))),
            StatMetric::Sum2 => self.floats(|b| Ok(Self::sum2(b))),
            StatMetric::Mean => self.floats(Self::mean),
            StatMetric::Median => {
                let medians = self
                    .bands
                    .iter()
                    .map(Self::median)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("{medians:?}"))
            }
            StatMetric::Rms => {
                self.floats(|b| Ok((Self::sum2(b) / Self::nonempty(b)? as f64).sqrt()))
            }
            StatMetric::Var => self.floats(Self::var),
            StatMetric::Stddev => self.floats(|b| Ok(Self::var(b)?.sqrt())),
        }
    }
}

/// Outcome of capturing the selected metrics.
#[derive(Debug, Default)]
pub struct Report {
    /// `name:value` lines, newline-terminated.
    pub text: String,
    pub lines: usize,
    /// Metrics that could not be computed, omitted from `text`.
    pub failures: Vec<(StatMetric, TransformError)>,
}

pub fn report(image: &DynamicImage, options: &StatsOptions) -> Report {
    let stats = Statistics::of(image);
    let mut report = Report::default();
    for metric in options.selected() {
        match stats.metric(metric) {
            Ok(value) => {
                report.text.push_str(&format!("{}:{}\n", metric.name(), value));
                report.lines += 1;
            }
            Err(e) => report.failures.push((metric, e)),
        }
    }
    report
}

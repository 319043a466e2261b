//! Parameter validators.
//!
//! Each validator turns the raw text of one option into a typed value or a
//! [`ValidationError`]. Nothing here touches pixels; the transforms call these
//! and log a `WARN` on rejection.

use crate::error::ValidationError;

/// One dimension of a resize or crop field: absolute pixels or a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dim {
    Pixels(u32),
    Percent(u32),
}

impl Dim {
    fn parse(field: &str) -> Option<Dim> {
        match field.strip_suffix('%') {
            Some(pct) => parse_digits(pct).map(Dim::Percent),
            None => parse_digits(field).map(Dim::Pixels),
        }
    }

    /// Pixels measured from the near edge, truncated like an integer cast.
    pub fn resolve(self, extent: u32) -> u32 {
        match self {
            Dim::Pixels(n) => n,
            Dim::Percent(p) => (f64::from(p) / 100.0 * f64::from(extent)) as u32,
        }
    }

    /// Pixels measured from the far edge when given as a percentage.
    pub fn resolve_inset(self, extent: u32) -> u32 {
        match self {
            Dim::Pixels(n) => n,
            Dim::Percent(_) => extent.saturating_sub(self.resolve(extent)),
        }
    }
}

/// Whether a `>`/`<` suffix gates the resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeGate {
    /// `>`: resize only when the original exceeds the threshold.
    Larger(u32),
    /// `<`: resize only when the original is below the threshold.
    Smaller(u32),
}

impl ResizeGate {
    /// `true` if an image of this size should be resized.
    pub fn admits(self, width: u32, height: u32) -> bool {
        match self {
            ResizeGate::Larger(t) => width > t || height > t,
            ResizeGate::Smaller(t) => width < t || height < t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSpec {
    pub width: Dim,
    pub height: Dim,
    pub gate: Option<ResizeGate>,
}

impl ResizeSpec {
    /// Target size for an image of the given dimensions.
    pub fn target(&self, width: u32, height: u32) -> Result<(u32, u32), ValidationError> {
        let target = (self.width.resolve(width), self.height.resolve(height));
        if target.0 == 0 || target.1 == 0 {
            return Err(ValidationError::Range("resize parameter(s)"));
        }
        Ok(target)
    }
}

/// Crop box as written, before it is resolved against an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropSpec {
    pub left: Dim,
    pub upper: Dim,
    pub right: Dim,
    pub lower: Dim,
}

/// Resolved crop box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub left: u32,
    pub upper: u32,
    pub right: u32,
    pub lower: u32,
}

impl CropBox {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.lower - self.upper
    }
}

impl CropSpec {
    /// Percent `right`/`lower` are insets from the far edge; percent
    /// `left`/`upper` are offsets from the near edge.
    pub fn resolve(&self, width: u32, height: u32) -> Result<CropBox, ValidationError> {
        let cb = CropBox {
            left: self.left.resolve(width),
            upper: self.upper.resolve(height),
            right: self.right.resolve_inset(width),
            lower: self.lower.resolve_inset(height),
        };
        if cb.left < cb.right && cb.upper < cb.lower && cb.right != 0 && cb.lower != 0 {
            Ok(cb)
        } else {
            Err(ValidationError::Range("cropping dimensions"))
        }
    }
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// `SIZE` is `N`, `N%`, or `AxB` where each side is `N` or `N%`.
fn parse_size(s: &str) -> Option<(Dim, Dim)> {
    match s.split_once('x') {
        Some((w, h)) => Some((Dim::parse(w)?, Dim::parse(h)?)),
        None => {
            let d = Dim::parse(s)?;
            Some((d, d))
        }
    }
}

/// Parse `SIZE[{'>'|'<'}WxH]`.
///
/// The gate threshold is square and taken from the first field of the
/// suffix; the suffix must be two plain pixel counts.
pub fn parse_resize(input: &str) -> Result<ResizeSpec, ValidationError> {
    let input = input.trim();
    let (size, gate) = match (input.split_once('>'), input.split_once('<')) {
        (Some(_), Some(_)) => return Err(ValidationError::Syntax("resize")),
        (Some((size, rest)), None) => (size, Some((rest, true))),
        (None, Some((size, rest))) => (size, Some((rest, false))),
        (None, None) => (input, None),
    };

    let (width, height) = parse_size(size).ok_or(ValidationError::Syntax("resize"))?;

    let gate = match gate {
        None => None,
        Some((rest, larger)) => {
            if rest.contains(['>', '<']) {
                return Err(ValidationError::Syntax("resize"));
            }
            let (tw, th) = rest
                .split_once('x')
                .ok_or(ValidationError::Range("resize parameter(s)"))?;
            let threshold = parse_digits(tw).ok_or(ValidationError::Range("resize parameter(s)"))?;
            parse_digits(th).ok_or(ValidationError::Range("resize parameter(s)"))?;
            Some(if larger {
                ResizeGate::Larger(threshold)
            } else {
                ResizeGate::Smaller(threshold)
            })
        }
    };

    Ok(ResizeSpec {
        width,
        height,
        gate,
    })
}

/// Parse `LEFT,UPPER,RIGHT,LOWER`; whitespace may follow each comma.
pub fn parse_crop(input: &str) -> Result<CropSpec, ValidationError> {
    let fields: Vec<&str> = input.split(',').collect();
    if fields.len() != 4 {
        return Err(ValidationError::Syntax("cropping"));
    }
    let mut dims = [Dim::Pixels(0); 4];
    for (i, field) in fields.iter().enumerate() {
        let field = if i == 0 { *field } else { field.trim_start() };
        dims[i] = Dim::parse(field).ok_or(ValidationError::Syntax("cropping"))?;
    }
    Ok(CropSpec {
        left: dims[0],
        upper: dims[1],
        right: dims[2],
        lower: dims[3],
    })
}

/// Strictly positive, finite.
pub fn parse_scale(input: &str) -> Result<f64, ValidationError> {
    match input.trim().parse::<f64>() {
        Ok(f) if f.is_finite() && f > 0.0 => Ok(f),
        _ => Err(ValidationError::Range("scaling factor")),
    }
}

/// Non-negative pixel count.
pub fn parse_border(input: &str) -> Result<u32, ValidationError> {
    parse_digits(input.trim()).ok_or(ValidationError::Range("border width"))
}

/// Bits to keep per channel, 1 through 8.
pub fn parse_posterize(input: &str) -> Result<u8, ValidationError> {
    match parse_digits(input.trim()) {
        Some(bits @ 1..=8) => Ok(bits as u8),
        _ => Err(ValidationError::Range("posterize argument")),
    }
}

pub fn parse_solarize(input: &str) -> Result<u32, ValidationError> {
    parse_digits(input.trim()).ok_or(ValidationError::Range("solarize argument"))
}

/// Enhancement factor: non-negative, finite. `1.0` leaves the image as is.
pub fn parse_factor(input: &str) -> Result<f32, ValidationError> {
    match input.trim().parse::<f32>() {
        Ok(f) if f.is_finite() && f >= 0.0 => Ok(f),
        _ => Err(ValidationError::Range("enhancement factor")),
    }
}

/// Output extension for filetype conversion, lower-cased and dotted.
pub fn parse_filetype(input: &str) -> Result<String, ValidationError> {
    let name = input.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::Syntax("filetype"));
    }
    Ok(format!(".{}", name.to_ascii_lowercase()))
}

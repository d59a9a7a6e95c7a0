use crate::Scalar;
use std::{
    fmt,
    ops::{Add, Mul},
    str::FromStr,
};

/// Named colors in `name #rrggbb(aa)` format, one per line
const SVG_COLORS: &str = include_str!("svg-colors.txt");

/// Common interface to all color representations
pub trait Color: Copy {
    /// Blend other color on top of this color
    fn blend_over(self, other: Self) -> Self;

    /// Scale alpha component of the color by `alpha`
    fn with_alpha(self, alpha: Scalar) -> Self;

    /// Convert color to sRGBA list
    fn to_rgba(self) -> [u8; 4];

    /// Convert color to sRGB list (alpha is discarded)
    fn to_rgb(self) -> [u8; 3] {
        let [r, g, b, _] = self.to_rgba();
        [r, g, b]
    }

    /// Calculate LUMA of the color.
    fn luma(self) -> f32 {
        let [r, g, b] = self.to_rgb();
        0.2126 * (r as f32 / 255.0) + 0.7152 * (g as f32 / 255.0) + 0.0722 * (b as f32 / 255.0)
    }

    /// Pick color that produces the best contrast with self
    fn best_contrast(self, c0: Self, c1: Self) -> Self {
        let luma = self.luma();
        if (luma - c0.luma()).abs() < (luma - c1.luma()).abs() {
            c1
        } else {
            c0
        }
    }
}

/// sRGB color with straight (not premultiplied) alpha, stored as `[r, g, b, a]` bytes
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, bytemuck::Pod, bytemuck::Zeroable,
)]
#[repr(transparent)]
pub struct RGBA([u8; 4]);

impl RGBA {
    pub const TRANSPARENT: RGBA = RGBA::new(0, 0, 0, 0);
    pub const BLACK: RGBA = RGBA::new(0, 0, 0, 255);
    pub const WHITE: RGBA = RGBA::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    pub const fn alpha(self) -> u8 {
        self.0[3]
    }

    pub const fn blue(self) -> u8 {
        self.0[2]
    }

    pub const fn green(self) -> u8 {
        self.0[1]
    }

    pub const fn red(self) -> u8 {
        self.0[0]
    }

    /// Fully opaque color
    pub const fn is_opaque(self) -> bool {
        self.alpha() == 255
    }

    /// Fully transparent color
    pub const fn is_transparent(self) -> bool {
        self.alpha() == 0
    }

    /// Look up color by its SVG name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        SVG_COLORS.lines().find_map(|line| {
            let (color_name, hex) = line.split_once(' ')?;
            if color_name.eq_ignore_ascii_case(name) {
                parse_hex(hex.trim().strip_prefix('#')?).ok()
            } else {
                None
            }
        })
    }
}

impl Color for RGBA {
    fn to_rgba(self) -> [u8; 4] {
        self.0
    }

    fn blend_over(self, other: Self) -> Self {
        LinColor::from(self)
            .blend_over(LinColor::from(other))
            .into()
    }

    fn with_alpha(self, alpha: Scalar) -> Self {
        let [r, g, b, a] = self.0;
        let alpha = crate::clamp(alpha, 0.0, 1.0);
        RGBA::new(r, g, b, (a as Scalar * alpha + 0.5) as u8)
    }
}

impl From<LinColor> for RGBA {
    fn from(lin: LinColor) -> Self {
        let [r, g, b, a]: [f32; 4] = lin.into();
        if a <= f32::EPSILON {
            return RGBA::default();
        }
        let a = a.min(1.0);
        let channel = |value: f32| (linear_to_srgb((value / a).clamp(0.0, 1.0)) * 255.0 + 0.5) as u8;
        RGBA::new(channel(r), channel(g), channel(b), (a * 255.0 + 0.5) as u8)
    }
}

impl From<[u8; 4]> for RGBA {
    fn from(rgba: [u8; 4]) -> Self {
        Self(rgba)
    }
}

impl fmt::Debug for RGBA {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [bg_r, bg_g, bg_b] = self.to_rgb();
        let [fg_r, fg_g, fg_b] = self.best_contrast(RGBA::WHITE, RGBA::BLACK).to_rgb();
        write!(
            fmt,
            "\x1b[38;2;{};{};{};48;2;{};{};{}m",
            fg_r, fg_g, fg_b, bg_r, bg_g, bg_b
        )?;
        write!(fmt, "{}", self)?;
        write!(fmt, "\x1b[m")
    }
}

impl fmt::Display for RGBA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)?;
        if a != 255 {
            write!(f, "{:02x}", a)?;
        }
        Ok(())
    }
}

impl FromStr for RGBA {
    type Err = ColorError;

    /// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(..)`, `rgba(..)` or a color name
    fn from_str(color: &str) -> Result<Self, Self::Err> {
        let color = color.trim();
        if let Some(hex) = color.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = color.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            return parse_function(color, args);
        }
        RGBA::from_name(color).ok_or_else(|| ColorError::UnknownName(color.to_owned()))
    }
}

// hex digits after `#`
fn parse_hex(hex: &str) -> Result<RGBA, ColorError> {
    let invalid = || ColorError::InvalidHex(format!("#{}", hex));
    let digit = |byte: u8| match byte {
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'0'..=b'9' => Ok(byte - b'0'),
        _ => Err(invalid()),
    };
    let bytes = hex.as_bytes();
    let channels = match bytes.len() {
        // #rgb(a) every digit is duplicated
        3 | 4 => bytes
            .iter()
            .map(|byte| Ok(digit(*byte)? * 17))
            .collect::<Result<Vec<u8>, ColorError>>()?,
        6 | 8 => bytes
            .chunks(2)
            .map(|pair| Ok((digit(pair[0])? << 4) | digit(pair[1])?))
            .collect::<Result<Vec<u8>, ColorError>>()?,
        _ => return Err(invalid()),
    };
    let alpha = channels.get(3).copied().unwrap_or(255);
    Ok(RGBA::new(channels[0], channels[1], channels[2], alpha))
}

// arguments of `rgb(` or `rgba(` function, `args` still contains closing bracket
fn parse_function(color: &str, args: &str) -> Result<RGBA, ColorError> {
    let invalid = || ColorError::InvalidFunction(color.to_owned());
    let args = args.strip_suffix(')').ok_or_else(invalid)?;
    let args: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_ascii_whitespace())
        .filter(|arg| !arg.is_empty())
        .collect();
    if args.len() != 3 && args.len() != 4 {
        return Err(invalid());
    }
    let number = |arg: &str| -> Result<(Scalar, bool), ColorError> {
        let (arg, percent) = match arg.strip_suffix('%') {
            Some(arg) => (arg, true),
            None => (arg, false),
        };
        let value: Scalar = lexical_core::parse(arg.as_bytes()).map_err(|_| invalid())?;
        if value.is_finite() {
            Ok((value, percent))
        } else {
            Err(invalid())
        }
    };
    let mut channels = [0u8; 4];
    for (index, arg) in args[..3].iter().enumerate() {
        let (value, percent) = number(arg)?;
        let value = if percent { value * 2.55 } else { value };
        channels[index] = crate::clamp(value.round(), 0.0, 255.0) as u8;
    }
    channels[3] = match args.get(3) {
        None => 255,
        Some(arg) => {
            let (value, percent) = number(arg)?;
            let value = if percent { value / 100.0 } else { value };
            (crate::clamp(value, 0.0, 1.0) * 255.0).round() as u8
        }
    };
    Ok(RGBA(channels))
}

#[cfg(feature = "serde")]
impl serde::Serialize for RGBA {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RGBA {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let color = <std::borrow::Cow<'de, str> as serde::Deserialize>::deserialize(deserializer)?;
        color.parse().map_err(serde::de::Error::custom)
    }
}

/// Alpha premultiplied RGBA color in the linear color space (no gamma correction)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinColor([f32; 4]);

impl LinColor {
    #[inline(always)]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        LinColor([r, g, b, a])
    }

    #[inline(always)]
    pub fn alpha(self) -> f32 {
        self.0[3]
    }
}

impl Color for LinColor {
    #[inline(always)]
    fn to_rgba(self) -> [u8; 4] {
        RGBA::from(self).to_rgba()
    }

    #[inline(always)]
    fn blend_over(self, other: Self) -> Self {
        other + self * (1.0 - other.alpha())
    }

    #[inline(always)]
    fn with_alpha(self, alpha: Scalar) -> Self {
        self * (alpha as f32)
    }
}

impl Add<Self> for LinColor {
    type Output = Self;

    #[inline(always)]
    fn add(self, other: Self) -> Self::Output {
        let Self([r0, g0, b0, a0]) = self;
        let Self([r1, g1, b1, a1]) = other;
        Self([r0 + r1, g0 + g1, b0 + b1, a0 + a1])
    }
}

impl Mul<f32> for LinColor {
    type Output = Self;

    #[inline(always)]
    fn mul(self, scale: f32) -> Self::Output {
        Self(self.0.map(|c| c * scale))
    }
}

impl From<RGBA> for LinColor {
    fn from(color: RGBA) -> Self {
        let a = color.alpha() as f32 / 255.0;
        let r = srgb_to_linear(color.red() as f32 / 255.0) * a;
        let g = srgb_to_linear(color.green() as f32 / 255.0) * a;
        let b = srgb_to_linear(color.blue() as f32 / 255.0) * a;
        LinColor::new(r, g, b, a)
    }
}

impl From<LinColor> for [f32; 4] {
    fn from(color: LinColor) -> Self {
        color.0
    }
}

impl fmt::Display for LinColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        RGBA::from(*self).fmt(f)
    }
}

/// Convert Linear RGB color component into a SRGB color component.
///
/// Approximation of the precise implementation
/// ```no_run
/// pub fn linear_to_srgb(value: f32) -> f32 {
///     if value <= 0.0031308 {
///         value * 12.92
///     } else {
///         1.055 * value.powf(1.0 / 2.4) - 0.055
///     }
/// }
/// ```
#[inline]
pub fn linear_to_srgb(x0: f32) -> f32 {
    if x0 <= 0.0031308 {
        x0 * 12.92
    } else {
        // least square fit of `f(x) = 1.055 * x.powf(1.0 / 2.4) - 0.055` on [0.0031308..1.0]
        let x1 = x0.sqrt();
        let x2 = x1.sqrt();
        let x3 = x2.sqrt();
        -0.01848558 * x0 + 0.6445592 * x1 + 0.70994765 * x2 - 0.33605254 * x3
    }
}

#[inline]
pub fn srgb_to_linear(value: f32) -> f32 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Error while parsing color value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// Malformed `#` color
    InvalidHex(String),
    /// Malformed `rgb()` or `rgba()` color
    InvalidFunction(String),
    /// Color name is not known
    UnknownName(String),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::InvalidHex(color) => write!(
                f,
                "color expected to be #RGB(A) or #RRGGBB(AA) in hexadecimal format: {}",
                color
            ),
            ColorError::InvalidFunction(color) => {
                write!(f, "malformed color function: {}", color)
            }
            ColorError::UnknownName(name) => write!(f, "unknown color name: {}", name),
        }
    }
}

impl std::error::Error for ColorError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_color_u8() {
        let c = RGBA::new(1, 2, 3, 4);
        assert_eq!([1, 2, 3, 4], c.to_rgba());
        assert_eq!(1, c.red());
        assert_eq!(2, c.green());
        assert_eq!(3, c.blue());
        assert_eq!(4, c.alpha());
        assert_eq!(bytemuck::bytes_of(&c), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_color_u8_parse() -> Result<(), ColorError> {
        assert_eq!(RGBA::new(1, 2, 3, 4), "#01020304".parse::<RGBA>()?);
        assert_eq!(RGBA::new(170, 187, 204, 255), "#aabbcc".parse::<RGBA>()?);
        assert_eq!(RGBA::new(0, 0, 0, 255), "#000000".parse::<RGBA>()?);
        assert_eq!(RGBA::new(255, 0, 170, 255), "#f0a".parse::<RGBA>()?);
        assert_eq!(RGBA::new(255, 0, 170, 136), "#F0A8".parse::<RGBA>()?);
        assert!(matches!(
            "#12345".parse::<RGBA>(),
            Err(ColorError::InvalidHex(_))
        ));
        assert!(matches!(
            "#gg0000".parse::<RGBA>(),
            Err(ColorError::InvalidHex(_))
        ));
        Ok(())
    }

    #[test]
    fn test_color_function_parse() -> Result<(), ColorError> {
        assert_eq!(RGBA::new(255, 128, 0, 255), "rgb(255, 128, 0)".parse()?);
        assert_eq!(RGBA::new(255, 0, 0, 255), "RGB(100%,0%,0%)".parse()?);
        assert_eq!(RGBA::new(0, 0, 255, 128), "rgba(0 0 255 / 0.5)".parse()?);
        assert_eq!(RGBA::new(255, 0, 0, 255), "rgb(300, -5, 0)".parse()?);
        assert!(matches!(
            "rgb(1, 2)".parse::<RGBA>(),
            Err(ColorError::InvalidFunction(_))
        ));
        assert!(matches!(
            "rgb(1, 2, x)".parse::<RGBA>(),
            Err(ColorError::InvalidFunction(_))
        ));
        Ok(())
    }

    #[test]
    fn test_color_name_parse() -> Result<(), ColorError> {
        assert_eq!(RGBA::new(255, 0, 0, 255), "red".parse()?);
        assert_eq!(RGBA::new(0, 128, 0, 255), " Green ".parse()?);
        assert_eq!(RGBA::TRANSPARENT, "transparent".parse()?);
        assert_eq!(
            "notacolor".parse::<RGBA>(),
            Err(ColorError::UnknownName("notacolor".to_owned()))
        );
        Ok(())
    }

    #[test]
    fn test_from_name() {
        assert_eq!(RGBA::from_name("blue"), Some(RGBA::new(0, 0, 255, 255)));
        assert_eq!(RGBA::from_name("WHITE"), Some(RGBA::WHITE));
        assert_eq!(RGBA::from_name("brown"), Some(RGBA::new(165, 42, 42, 255)));
        assert_eq!(RGBA::from_name("transparent"), Some(RGBA::TRANSPARENT));
        assert_eq!(RGBA::from_name("notacolor"), None);
        // every entry of the table resolves
        for line in SVG_COLORS.lines().filter(|line| !line.trim().is_empty()) {
            let name = line.split_whitespace().next().unwrap_or_default();
            assert!(RGBA::from_name(name).is_some(), "{} does not resolve", name);
        }
    }

    #[test]
    fn test_conversion() -> Result<(), ColorError> {
        let c: RGBA = "#ff804010".parse()?;
        let l: LinColor = c.into();
        let r: RGBA = l.into();
        assert_eq!(c, r);
        Ok(())
    }

    #[test]
    fn test_blend_over() {
        let white = RGBA::WHITE;
        assert_eq!(white.blend_over(RGBA::BLACK), RGBA::BLACK);
        assert_eq!(white.blend_over(RGBA::TRANSPARENT), white);
        let half = RGBA::new(255, 0, 0, 128);
        let blended = RGBA::TRANSPARENT.blend_over(half);
        assert_eq!(blended, half);
        let blended = white.blend_over(half);
        assert_eq!(blended.alpha(), 255);
        assert_eq!(blended.red(), 255);
        assert!(blended.green() > 0 && blended.green() < 255);
        assert_eq!(RGBA::new(10, 20, 30, 200).with_alpha(0.5).alpha(), 100);
    }

    #[test]
    fn test_lin_and_srgb() {
        for i in 0..255 {
            let v = i as f32 / 255.0;
            assert_approx_eq!(v, linear_to_srgb(srgb_to_linear(v)), 1e-4);
            assert_approx_eq!(v, srgb_to_linear(linear_to_srgb(v)), 1e-4);
        }
    }

    #[test]
    fn test_display_parse() -> Result<(), ColorError> {
        let c: RGBA = "#01020304".parse()?;
        assert_eq!(c, RGBA::new(1, 2, 3, 4));
        assert_eq!(c.to_string(), "#01020304");

        let c: RGBA = "#010203".parse()?;
        assert_eq!(c, RGBA::new(1, 2, 3, 255));
        assert_eq!(c.to_string(), "#010203");

        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() -> Result<(), Box<dyn std::error::Error>> {
        let c: RGBA = serde_json::from_str("\"#ff000080\"")?;
        assert_eq!(c, RGBA::new(255, 0, 0, 128));
        assert_eq!(serde_json::to_string(&c)?, "\"#ff000080\"");
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

use crate::error::GridClaimError;

/// An opaque sRGB team color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl TeamColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb` (leading `#` optional, case-insensitive).
    pub fn from_hex(value: &str) -> Result<Self, GridClaimError> {
        let invalid = || GridClaimError::InvalidColor(value.to_string());
        let digits = value.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match digits.len() {
            6 => {
                let v = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
                Ok(Self::new((v >> 16) as u8, (v >> 8) as u8, v as u8))
            }
            3 => {
                let v = u16::from_str_radix(digits, 16).map_err(|_| invalid())?;
                let expand = |nibble: u16| ((nibble & 0xf) as u8) * 17;
                Ok(Self::new(expand(v >> 8), expand(v >> 4), expand(v)))
            }
            _ => Err(invalid()),
        }
    }

    /// Lowercase `#rrggbb`, the format `<input type="color">` expects.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn rgba_css(self, alpha: f64) -> String {
        format!("rgba({},{},{},{alpha})", self.r, self.g, self.b)
    }
}

/// Deterministic team color via CRC32 hash of the team name.
/// The hash picks the hue; saturation and lightness are fixed so every
/// generated color stays readable over a map image.
pub fn team_color(name: &str) -> TeamColor {
    let hash = crc32fast::hash(name.as_bytes());
    let hue = (hash % 360) as f64;
    let (r, g, b) = hsl_to_rgb(hue, 0.65, 0.5);
    TeamColor::new(r, g, b)
}

/// Convert HSL to RGB. `h` in degrees, `s` and `l` in 0..1.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s.abs() < f64::EPSILON {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    let h = h / 360.0;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    (
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

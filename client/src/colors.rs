use gridclaim_shared::TeamColor;

pub const BACKGROUND: &str = "#0c0e17";
pub const PANEL_BG: &str = "#13161f";
pub const PANEL_BORDER: &str = "#282c3e";
pub const ACCENT: &str = "#f5c542";
pub const TEXT: &str = "#e2e0d8";
pub const TEXT_MUTED: &str = "#9a9590";

/// Format RGBA as a CSS color string.
pub fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

/// Readable label color on top of a team swatch.
pub fn text_on(color: TeamColor) -> &'static str {
    let luma = 0.299 * color.r as f64 + 0.587 * color.g as f64 + 0.114 * color.b as f64;
    if luma > 150.0 { "#111111" } else { "#ffffff" }
}

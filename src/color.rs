use std::str::FromStr;

use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::ColorToken;

// ---------------------------------------------------------------------------
// Color token parsing
// ---------------------------------------------------------------------------

/// Parse a `#RRGGBB` / `#RGB` token (the `#` is optional).
pub fn parse(token: &ColorToken) -> Option<[u8; 3]> {
    let rgb = Srgb::<u8>::from_str(token.as_str().trim()).ok()?;
    Some([rgb.red, rgb.green, rgb.blue])
}

/// Like [`parse`], falling back to `fallback` for tokens that do not parse.
pub fn parse_or(token: &ColorToken, fallback: [u8; 3]) -> [u8; 3] {
    parse(token).unwrap_or_else(|| {
        log::warn!("unparseable color '{token}', using fallback");
        fallback
    })
}

// ---------------------------------------------------------------------------
// Waterfall ramp: normalized magnitude → RGB
// ---------------------------------------------------------------------------

/// Map `t` in `[0, 1]` onto a blue → red hue sweep that brightens with `t`.
pub fn ramp(t: f64) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0) as f32;
    let hue = 240.0 * (1.0 - t);
    let hsl = Hsl::new(hue, 0.75, 0.1 + 0.45 * t);
    let rgb: Srgb = hsl.into_color();
    [
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    ]
}

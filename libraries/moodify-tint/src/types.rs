use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from float channels, clamping to [0, 255] and rounding
    pub fn from_f64(r: f64, g: f64, b: f64) -> Self {
        let channel = |v: f64| v.clamp(0.0, 255.0).round() as u8;
        Self::new(channel(r), channel(g), channel(b))
    }

    /// Relative luminance on the 0-255 scale (Rec. 709 weights)
    pub fn luminance(self) -> f64 {
        0.2126 * f64::from(self.r) + 0.7152 * f64::from(self.g) + 0.0722 * f64::from(self.b)
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub(crate) fn channels(self) -> [f64; 3] {
        [f64::from(self.r), f64::from(self.g), f64::from(self.b)]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.r, self.g, self.b)
    }
}

/// A color with straight (non-premultiplied) alpha in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub color: Rgb,
    pub alpha: f64,
}

impl Rgba {
    pub const fn new(color: Rgb, alpha: f64) -> Self {
        Self { color, alpha }
    }

    pub const fn opaque(color: Rgb) -> Self {
        Self { color, alpha: 1.0 }
    }
}

/// Default opacity of the blurred artwork layer
pub const DEFAULT_BLUR_OPACITY: f64 = 1.0;

/// Default alpha of the dark overlay
pub const DEFAULT_OVERLAY_ALPHA: f64 = 0.45;

/// Live styles of the layers stacked over the player
///
/// Missing values fall back to the stock player look: the blurred art at
/// full opacity, a black overlay at 45% and a black inner panel. A zero or
/// NaN opacity or alpha counts as missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerStyles {
    /// Opacity of the blurred artwork layer
    pub blur_opacity: Option<f64>,

    /// Overlay color and alpha
    pub overlay: Option<Rgba>,

    /// Inner panel background
    pub base: Option<Rgb>,
}

impl LayerStyles {
    pub fn blur_opacity(&self) -> f64 {
        clamp_unit(or_default(self.blur_opacity, DEFAULT_BLUR_OPACITY))
    }

    pub fn overlay(&self) -> Rgba {
        let color = self.overlay.map_or(Rgb::BLACK, |o| o.color);
        let alpha = or_default(self.overlay.map(|o| o.alpha), DEFAULT_OVERLAY_ALPHA);
        Rgba::new(color, clamp_unit(alpha))
    }

    pub fn base(&self) -> Rgb {
        self.base.unwrap_or(Rgb::BLACK)
    }
}

fn or_default(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if !v.is_nan() && v != 0.0 => v,
        _ => default,
    }
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Theme colors derived from the playing artwork
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    /// Average artwork color
    pub tint: Rgb,

    /// Tint as it appears through the player's layer stack
    pub tint_dark: Rgb,

    /// Readable foreground on `tint`
    pub text_on_tint: Rgb,

    /// Dark text color
    pub text_dark: Rgb,
}

impl ThemeColors {
    /// Fixed green used when no artwork can be sampled
    pub const DEFAULT: ThemeColors = ThemeColors {
        tint: Rgb::new(29, 185, 84),
        tint_dark: Rgb::new(18, 115, 50),
        text_on_tint: Rgb::WHITE,
        text_dark: Rgb::new(9, 47, 22),
    };

    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase_and_padded() {
        assert_eq!(Rgb::new(9, 47, 22).to_hex(), "#092f16");
        assert_eq!(Rgb::new(255, 171, 0).to_hex(), "#ffab00");
    }

    #[test]
    fn from_f64_clamps_and_rounds() {
        assert_eq!(Rgb::from_f64(-3.0, 27.5, 300.0), Rgb::new(0, 28, 255));
    }

    #[test]
    fn layer_defaults() {
        let layers = LayerStyles::default();
        assert_eq!(layers.blur_opacity(), 1.0);
        assert_eq!(layers.overlay(), Rgba::new(Rgb::BLACK, 0.45));
        assert_eq!(layers.base(), Rgb::BLACK);
    }

    #[test]
    fn zero_or_nan_falls_back() {
        let layers = LayerStyles {
            blur_opacity: Some(0.0),
            overlay: Some(Rgba::new(Rgb::WHITE, 0.0)),
            base: None,
        };
        assert_eq!(layers.blur_opacity(), 1.0);
        assert_eq!(layers.overlay(), Rgba::new(Rgb::WHITE, 0.45));

        let layers = LayerStyles {
            blur_opacity: Some(f64::NAN),
            overlay: Some(Rgba::new(Rgb::BLACK, f64::NAN)),
            base: None,
        };
        assert_eq!(layers.blur_opacity(), 1.0);
        assert_eq!(layers.overlay().alpha, 0.45);
    }

    #[test]
    fn out_of_range_is_clamped() {
        let layers = LayerStyles {
            blur_opacity: Some(1.7),
            overlay: Some(Rgba::new(Rgb::BLACK, -0.2)),
            base: None,
        };
        assert_eq!(layers.blur_opacity(), 1.0);
        assert_eq!(layers.overlay().alpha, 0.0);
    }

    #[test]
    fn default_theme_text_is_white() {
        let theme = ThemeColors::default();
        assert_eq!(theme.text_on_tint.to_hex(), "#ffffff");
        assert_eq!(theme.text_dark.to_hex(), "#092f16");
    }
}

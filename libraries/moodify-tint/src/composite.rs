//! Alpha compositing of the sampled tint through the player's layers
//!
//! Mirrors what the eye sees behind the player chrome: the blurred art
//! over the inner panel, then the overlay on top. All math stays in `f64`
//! and is clamped and rounded once at the end.

use crate::types::{LayerStyles, Rgb, ThemeColors};

/// Luminance above which the foreground switches to dark text
pub const LIGHT_TEXT_MAX_LUMINANCE: f64 = 150.0;

/// Dark foreground for light tints
pub const DARK_TEXT: Rgb = Rgb::new(0x0b, 0x0b, 0x0b);

/// `f * top + (1 - f) * bottom` per channel
pub fn blend(top: [f64; 3], bottom: [f64; 3], f: f64) -> [f64; 3] {
    [
        f * top[0] + (1.0 - f) * bottom[0],
        f * top[1] + (1.0 - f) * bottom[1],
        f * top[2] + (1.0 - f) * bottom[2],
    ]
}

/// Sampled color as seen through blur, overlay and panel
pub fn composite_dark(sample: Rgb, layers: &LayerStyles) -> Rgb {
    let over_base = blend(sample.channels(), layers.base().channels(), layers.blur_opacity());

    let overlay = layers.overlay();
    let [r, g, b] = blend(overlay.color.channels(), over_base, overlay.alpha);
    Rgb::from_f64(r, g, b)
}

/// Readable foreground on `color`
pub fn text_on(color: Rgb) -> Rgb {
    if color.luminance() <= LIGHT_TEXT_MAX_LUMINANCE {
        Rgb::WHITE
    } else {
        DARK_TEXT
    }
}

/// Full theme from a sampled average
pub fn derive_theme(sample: Rgb, layers: &LayerStyles) -> ThemeColors {
    let tint_dark = composite_dark(sample, layers);
    ThemeColors {
        tint: sample,
        tint_dark,
        text_on_tint: text_on(sample),
        text_dark: tint_dark,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rgba;

    #[test]
    fn red_artwork_under_default_layers() {
        let theme = derive_theme(Rgb::new(200, 50, 50), &LayerStyles::default());
        assert_eq!(theme.tint_dark, Rgb::new(110, 28, 28));
        assert_eq!(theme.text_dark.to_hex(), "#6e1c1c");
        assert_eq!(theme.text_on_tint, Rgb::WHITE);
    }

    #[test]
    fn light_artwork_gets_dark_text() {
        assert_eq!(text_on(Rgb::new(240, 240, 240)), DARK_TEXT);
        assert_eq!(DARK_TEXT.to_hex(), "#0b0b0b");
    }

    #[test]
    fn gray_threshold() {
        assert_eq!(text_on(Rgb::new(149, 149, 149)), Rgb::WHITE);
        assert_eq!(text_on(Rgb::new(152, 152, 152)), DARK_TEXT);
        // default green sits well below the threshold
        assert_eq!(text_on(ThemeColors::DEFAULT.tint), Rgb::WHITE);
    }

    #[test]
    fn half_opacity_blur_shows_panel() {
        let layers = LayerStyles {
            blur_opacity: Some(0.5),
            overlay: Some(Rgba::new(Rgb::BLACK, 0.5)),
            base: Some(Rgb::new(100, 100, 100)),
        };
        assert_eq!(composite_dark(Rgb::new(200, 0, 50), &layers), Rgb::new(75, 25, 38));
    }

    #[test]
    fn zero_opacity_composites_like_defaults() {
        let layers = LayerStyles {
            blur_opacity: Some(0.0),
            overlay: Some(Rgba::new(Rgb::BLACK, 0.0)),
            base: None,
        };
        assert_eq!(composite_dark(Rgb::new(200, 50, 50), &layers), Rgb::new(110, 28, 28));
    }

    #[test]
    fn colored_overlay() {
        let layers = LayerStyles {
            blur_opacity: None,
            overlay: Some(Rgba::new(Rgb::WHITE, 0.5)),
            base: None,
        };
        assert_eq!(composite_dark(Rgb::BLACK, &layers), Rgb::new(128, 128, 128));
    }

    #[test]
    fn identical_inputs_identical_output() {
        let layers = LayerStyles::default();
        let a = derive_theme(Rgb::new(17, 99, 201), &layers);
        let b = derive_theme(Rgb::new(17, 99, 201), &layers);
        assert_eq!(a, b);
        assert_eq!(a.tint_dark.to_hex(), b.tint_dark.to_hex());
    }
}

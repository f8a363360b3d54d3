//! Theme inputs read from the UI
//!
//! The engine does not poll any widget itself. Whatever renders the player
//! implements [`ThemeInputProvider`] and reports the blurred background
//! image and the live layer styles when asked.

use crate::css::{extract_css_url, first_css_color, parse_css_color};
use crate::error::{Result, TintError};
use crate::types::LayerStyles;

/// Source of the values a tint run composites against
pub trait ThemeInputProvider: Send + Sync {
    /// Image currently shown by the player's blurred background layer
    fn blur_image(&self) -> Option<String>;

    /// Current styles of the blur, overlay and panel layers
    fn layer_styles(&self) -> Result<LayerStyles>;
}

/// Fixed theme inputs, typically from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticThemeInputs {
    blur_image: Option<String>,
    layers: LayerStyles,
}

impl StaticThemeInputs {
    pub fn new(blur_image: Option<String>, layers: LayerStyles) -> Self {
        Self { blur_image, layers }
    }

    /// Build from computed-style strings
    ///
    /// # Arguments
    /// * `blur_background` - Background-image of the blur layer (`url(...)`)
    /// * `blur_opacity` - Opacity of the blur layer
    /// * `overlay` - Overlay background; gradients use their first color
    /// * `base` - Inner panel background color
    pub fn from_css(
        blur_background: Option<&str>,
        blur_opacity: Option<f64>,
        overlay: Option<&str>,
        base: Option<&str>,
    ) -> Result<Self> {
        let overlay = overlay
            .map(|value| {
                first_css_color(value).ok_or_else(|| TintError::InvalidColor(value.to_string()))
            })
            .transpose()?;
        let base = base
            .map(parse_css_color)
            .transpose()?
            .map(|color| color.color);

        Ok(Self {
            blur_image: blur_background.and_then(extract_css_url),
            layers: LayerStyles {
                blur_opacity,
                overlay,
                base,
            },
        })
    }
}

impl ThemeInputProvider for StaticThemeInputs {
    fn blur_image(&self) -> Option<String> {
        self.blur_image.clone()
    }

    fn layer_styles(&self) -> Result<LayerStyles> {
        Ok(self.layers)
    }
}

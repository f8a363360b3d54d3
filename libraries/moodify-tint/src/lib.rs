//! Moodify - Artwork Tint
//!
//! Derives interface theme colors from the artwork that is playing.
//!
//! A tint run resolves an image (the player's blurred background, else the
//! track artwork), downsamples it, averages the non-transparent pixels and
//! composites that average through the player's layer stack:
//!
//! ```text
//!   overlay   (default black @ 0.45)
//!   ───────
//!   blur      (average color @ blur opacity)
//!   ───────
//!   panel     (default black)
//! ```
//!
//! Any failure along the way publishes [`ThemeColors::DEFAULT`].
//!
//! # Example
//!
//! ```rust
//! use moodify_tint::{derive_theme, LayerStyles, Rgb};
//!
//! let theme = derive_theme(Rgb::new(200, 50, 50), &LayerStyles::default());
//! assert_eq!(theme.tint_dark, Rgb::new(110, 28, 28));
//! assert_eq!(theme.text_on_tint.to_hex(), "#ffffff");
//! ```

#![forbid(unsafe_code)]

pub mod composite;
pub mod css;
pub mod engine;
pub mod error;
pub mod provider;
pub mod sampler;
pub mod types;

pub use composite::{blend, composite_dark, derive_theme, text_on};
pub use css::{extract_css_url, first_css_color, parse_css_color};
pub use engine::{run_job, ArtworkLoader, TintConfig, TintEngine, TintJob, TintOutcome, TintRun};
pub use error::{Result, TintError};
pub use provider::{StaticThemeInputs, ThemeInputProvider};
pub use sampler::{average_color, ArtworkSampler};
pub use types::{LayerStyles, Rgb, Rgba, ThemeColors};

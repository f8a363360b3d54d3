/// Application configuration
use crate::error::{AppError, Result};
use moodify_client::{ClientConfig, DEFAULT_ENDPOINT};
use moodify_core::{Track, TrackMetadata};
use moodify_playback::{AutoCaptureConfig, PlaybackConfig};
use moodify_tint::{extract_css_url, StaticThemeInputs, ThemeInputProvider, TintConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "moodify.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoodifyConfig {
    #[serde(default = "default_api")]
    pub api: ApiSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,

    #[serde(default = "default_capture")]
    pub capture: CaptureSettings,

    #[serde(default = "default_theme")]
    pub theme: ThemeSettings,

    #[serde(default = "default_player")]
    pub player: PlayerSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Track shown paused when the session starts
    #[serde(default)]
    pub initial_track: Option<InitialTrack>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InitialTrack {
    pub src: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub artist: String,

    #[serde(default)]
    pub album: String,

    #[serde(default)]
    pub cover: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureSettings {
    #[serde(default = "default_threshold_secs")]
    pub threshold_secs: u64,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Image file or directory of images the file camera cycles through
    #[serde(default)]
    pub photos: Option<PathBuf>,
}

/// Visual layers the theme is composited against, as CSS values
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThemeSettings {
    #[serde(default = "default_sample_size")]
    pub sample_size: u32,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Image shown by the blur layer; a plain URI or `url("...")`
    #[serde(default)]
    pub blur_image: Option<String>,

    #[serde(default)]
    pub blur_opacity: Option<f64>,

    /// Overlay background; gradients contribute their first color
    #[serde(default = "default_overlay")]
    pub overlay: Option<String>,

    /// Inner panel background color
    #[serde(default = "default_base")]
    pub base: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerSettings {
    /// Duration assumed when a source cannot be probed
    #[serde(default = "default_fallback_duration_secs")]
    pub fallback_duration_secs: u64,
}

impl MoodifyConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `moodify.toml` is read when
    /// present. Environment variables prefixed with `MOODIFY_` override the
    /// file, with `__` between section and key (`MOODIFY_API__ENDPOINT`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        settings = match path {
            Some(path) => settings.add_source(config::File::from(path).required(true)),
            None => settings
                .add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        settings = settings.add_source(
            config::Environment::with_prefix("MOODIFY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.api.endpoint.trim();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(AppError::Config(format!(
                "API endpoint must be an http(s) URL, got {endpoint:?}"
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(AppError::Config("api.timeout_secs must be positive".into()));
        }

        if self.playback.history_size == 0 {
            return Err(AppError::Config(
                "playback.history_size must be positive".into(),
            ));
        }

        if let Some(track) = &self.playback.initial_track {
            if track.src.trim().is_empty() {
                return Err(AppError::Config(
                    "playback.initial_track.src must not be empty".into(),
                ));
            }
        }

        if self.capture.tick_interval_ms == 0 {
            return Err(AppError::Config(
                "capture.tick_interval_ms must be positive".into(),
            ));
        }

        if self.theme.sample_size == 0 {
            return Err(AppError::Config("theme.sample_size must be positive".into()));
        }

        if let Some(photos) = &self.capture.photos {
            if !photos.exists() {
                return Err(AppError::Config(format!(
                    "Photo source not found at {}",
                    photos.display()
                )));
            }
        }

        self.theme_inputs()?;
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.api.endpoint.clone(),
            timeout: Duration::from_secs(self.api.timeout_secs),
            connect_timeout: Duration::from_secs(self.api.connect_timeout_secs),
        }
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            history_size: self.playback.history_size,
            settle_delay: Duration::from_millis(self.playback.settle_delay_ms),
        }
    }

    pub fn initial_track(&self) -> Option<Track> {
        self.playback.initial_track.as_ref().map(|initial| {
            let metadata = TrackMetadata {
                title: initial.title.clone(),
                artist: initial.artist.clone(),
                album: initial.album.clone(),
                cover: initial.cover.clone(),
            };
            Track::new(metadata, initial.src.trim())
        })
    }

    pub fn capture_config(&self) -> AutoCaptureConfig {
        AutoCaptureConfig {
            threshold: Duration::from_secs(self.capture.threshold_secs),
            tick_interval: Duration::from_millis(self.capture.tick_interval_ms),
        }
    }

    pub fn tint_config(&self) -> TintConfig {
        TintConfig {
            sample_size: self.theme.sample_size,
            debounce: Duration::from_millis(self.theme.debounce_ms),
            cache_size: self.theme.cache_size,
        }
    }

    /// Layer styles parsed from the configured CSS values
    pub fn theme_inputs(&self) -> Result<StaticThemeInputs> {
        let layers = StaticThemeInputs::from_css(
            None,
            self.theme.blur_opacity,
            self.theme.overlay.as_deref(),
            self.theme.base.as_deref(),
        )?
        .layer_styles()?;

        let blur_image = self
            .theme
            .blur_image
            .as_deref()
            .map(|value| extract_css_url(value).unwrap_or_else(|| value.trim().to_string()))
            .filter(|uri| !uri.is_empty());

        Ok(StaticThemeInputs::new(blur_image, layers))
    }

    pub fn fallback_duration(&self) -> Duration {
        Duration::from_secs(self.player.fallback_duration_secs)
    }
}

impl Default for MoodifyConfig {
    fn default() -> Self {
        Self {
            api: default_api(),
            playback: default_playback(),
            capture: default_capture(),
            theme: default_theme(),
            player: default_player(),
        }
    }
}

// Default values
fn default_api() -> ApiSettings {
    ApiSettings {
        endpoint: default_endpoint(),
        timeout_secs: default_timeout_secs(),
        connect_timeout_secs: default_connect_timeout_secs(),
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        history_size: default_history_size(),
        settle_delay_ms: default_settle_delay_ms(),
        initial_track: None,
    }
}

fn default_history_size() -> usize {
    20
}

fn default_settle_delay_ms() -> u64 {
    120
}

fn default_capture() -> CaptureSettings {
    CaptureSettings {
        threshold_secs: default_threshold_secs(),
        tick_interval_ms: default_tick_interval_ms(),
        photos: None,
    }
}

fn default_threshold_secs() -> u64 {
    60
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_theme() -> ThemeSettings {
    ThemeSettings {
        sample_size: default_sample_size(),
        debounce_ms: default_debounce_ms(),
        cache_size: default_cache_size(),
        blur_image: None,
        blur_opacity: None,
        overlay: default_overlay(),
        base: default_base(),
    }
}

fn default_sample_size() -> u32 {
    64
}

fn default_debounce_ms() -> u64 {
    80
}

fn default_cache_size() -> usize {
    32
}

#[allow(clippy::unnecessary_wraps)]
fn default_overlay() -> Option<String> {
    Some("rgba(0, 0, 0, 0.45)".to_string())
}

#[allow(clippy::unnecessary_wraps)]
fn default_base() -> Option<String> {
    Some("rgb(0, 0, 0)".to_string())
}

fn default_player() -> PlayerSettings {
    PlayerSettings {
        fallback_duration_secs: default_fallback_duration_secs(),
    }
}

fn default_fallback_duration_secs() -> u64 {
    180
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_valid() {
        let config = MoodifyConfig::default();
        assert_eq!(config.api.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.playback.history_size, 20);
        assert_eq!(config.playback_config().settle_delay, Duration::from_millis(120));
        assert_eq!(config.capture_config().threshold, Duration::from_secs(60));
        assert_eq!(config.tint_config().debounce, Duration::from_millis(80));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_overrides_defaults() {
        let file = write_config(
            r##"
[api]
endpoint = "http://localhost:9000"

[playback]
history_size = 5

[theme]
overlay = "linear-gradient(rgba(10, 20, 30, 0.5), transparent)"
base = "#101010"
"##,
        );

        let config = MoodifyConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api.endpoint, "http://localhost:9000");
        assert_eq!(config.api.timeout_secs, 60);
        assert_eq!(config.playback.history_size, 5);
        assert_eq!(config.capture.tick_interval_ms, 1000);
        assert_eq!(config.theme.base.as_deref(), Some("#101010"));
        assert!(config.validate().is_ok());

        let layers = config.theme_inputs().unwrap().layer_styles().unwrap();
        assert_eq!(layers.base(), moodify_tint::Rgb::new(16, 16, 16));
        assert_eq!(layers.overlay().color, moodify_tint::Rgb::new(10, 20, 30));
        assert!(config.initial_track().is_none());
    }

    #[test]
    fn initial_track_from_file() {
        let file = write_config(
            r#"
[playback.initial_track]
title = "Sandstorm"
artist = "Darude"
album = "Before the Storm"
cover = "https://img.example.com/sandstorm.jpg"
src = "https://cdn.example.com/sandstorm.mp3"
"#,
        );

        let config = MoodifyConfig::load(Some(file.path())).unwrap();
        assert!(config.validate().is_ok());

        let track = config.initial_track().unwrap();
        assert_eq!(track.title(), "Sandstorm");
        assert_eq!(track.artist(), "Darude");
        assert_eq!(track.cover(), Some("https://img.example.com/sandstorm.jpg"));
        assert_eq!(track.src(), "https://cdn.example.com/sandstorm.mp3");
    }

    #[test]
    fn initial_track_needs_a_source() {
        let file = write_config("[playback.initial_track]\ntitle = \"Silence\"\nsrc = \" \"\n");
        let config = MoodifyConfig::load(Some(file.path())).unwrap();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = MoodifyConfig::load(Some(Path::new("/nonexistent/moodify.toml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_config("[player]\nfallback_duration_secs = 10\n");
        std::env::set_var("MOODIFY_PLAYER__FALLBACK_DURATION_SECS", "42");

        let config = MoodifyConfig::load(Some(file.path())).unwrap();
        std::env::remove_var("MOODIFY_PLAYER__FALLBACK_DURATION_SECS");

        assert_eq!(config.player.fallback_duration_secs, 42);
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let mut config = MoodifyConfig::default();
        config.api.endpoint = "ftp://example.com".into();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn default_layers_match_builtin_styles() {
        let config = MoodifyConfig::default();
        let inputs = config.theme_inputs().unwrap();
        assert_eq!(
            inputs.layer_styles().unwrap().overlay(),
            moodify_tint::LayerStyles::default().overlay()
        );
        assert!(inputs.blur_image().is_none());
    }

    #[test]
    fn blur_image_accepts_css_url() {
        let mut config = MoodifyConfig::default();
        config.theme.blur_image = Some(r#"url("https://cdn.example.com/bg.jpg")"#.into());
        let inputs = config.theme_inputs().unwrap();
        assert_eq!(
            inputs.blur_image().as_deref(),
            Some("https://cdn.example.com/bg.jpg")
        );

        config.theme.blur_image = Some("covers/bg.jpg".into());
        let inputs = config.theme_inputs().unwrap();
        assert_eq!(inputs.blur_image().as_deref(), Some("covers/bg.jpg"));
    }

    #[test]
    fn rejects_invalid_layer_colors() {
        let mut config = MoodifyConfig::default();
        config.theme.base = Some("not-a-color".into());
        assert!(config.validate().is_err());
    }
}

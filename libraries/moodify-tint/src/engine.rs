//! Tint engine
//!
//! Decides when a tint run starts and which results are still current.
//! Runs are tagged with a generation; any run started later (new artwork,
//! debounced layer change) makes earlier results stale, and stale results
//! are dropped without touching the published theme.

use crate::composite::derive_theme;
use crate::error::{Result, TintError};
use crate::provider::ThemeInputProvider;
use crate::sampler::{ArtworkSampler, DEFAULT_SAMPLE_SIZE};
use crate::types::{LayerStyles, Rgb, ThemeColors};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Loads artwork bytes for a URI
#[async_trait]
pub trait ArtworkLoader: Send + Sync {
    async fn load(&self, uri: &str) -> Result<Bytes>;
}

/// Tint engine settings
#[derive(Debug, Clone)]
pub struct TintConfig {
    /// Side of the square artwork is downsampled to (default: 64)
    pub sample_size: u32,

    /// Quiet period after a layer style change (default: 80ms)
    pub debounce: Duration,

    /// Cached artwork averages (default: 32)
    pub cache_size: usize,
}

impl Default for TintConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            debounce: Duration::from_millis(80),
            cache_size: 32,
        }
    }
}

/// Work for one tint run
#[derive(Debug, Clone, PartialEq)]
pub struct TintJob {
    pub generation: u64,
    pub uri: String,
    pub layers: LayerStyles,
}

/// What starting a run produced
#[derive(Debug, Clone, PartialEq)]
pub enum TintRun {
    /// Nothing to load; this theme is already published
    Immediate(ThemeColors),

    /// Artwork must be loaded and sampled off the event loop
    Load(TintJob),
}

/// Result of a finished [`TintJob`]
#[derive(Debug)]
pub struct TintOutcome {
    pub generation: u64,
    pub result: Result<ThemeColors>,
}

/// Theme state and run bookkeeping
pub struct TintEngine {
    config: TintConfig,
    sampler: ArtworkSampler,
    current: ThemeColors,
    artwork: Option<String>,
    generation: u64,
    debounce_deadline: Option<Instant>,
}

impl TintEngine {
    pub fn new(config: TintConfig) -> Self {
        let sampler = ArtworkSampler::new(config.sample_size, config.cache_size);
        Self {
            config,
            sampler,
            current: ThemeColors::DEFAULT,
            artwork: None,
            generation: 0,
            debounce_deadline: None,
        }
    }

    /// Published theme
    pub fn current(&self) -> ThemeColors {
        self.current
    }

    /// Artwork of the active track
    pub fn artwork(&self) -> Option<&str> {
        self.artwork.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Shared sampler, for running jobs
    pub fn sampler(&self) -> &ArtworkSampler {
        &self.sampler
    }

    /// The active track's artwork changed
    ///
    /// Returns `None` when the artwork is unchanged.
    pub fn artwork_changed(
        &mut self,
        artwork: Option<&str>,
        inputs: &dyn ThemeInputProvider,
    ) -> Option<TintRun> {
        if self.artwork.as_deref() == artwork {
            return None;
        }
        self.artwork = artwork.map(str::to_string);
        Some(self.start_run(inputs))
    }

    /// A layer style changed; schedules a debounced run
    ///
    /// Repeated changes inside the quiet period push the deadline back.
    pub fn layers_changed(&mut self, now: Instant) {
        self.debounce_deadline = Some(now + self.config.debounce);
    }

    /// When the pending debounced run is due
    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debounce_deadline
    }

    /// Start the debounced run, if one is pending
    pub fn fire_debounced(&mut self, inputs: &dyn ThemeInputProvider) -> Option<TintRun> {
        self.debounce_deadline.take()?;
        Some(self.start_run(inputs))
    }

    /// Start a run with the current inputs
    ///
    /// Any earlier run still in flight becomes stale, and so does a pending
    /// debounced run.
    pub fn start_run(&mut self, inputs: &dyn ThemeInputProvider) -> TintRun {
        self.generation += 1;
        self.debounce_deadline = None;

        let Some(uri) = inputs.blur_image().or_else(|| self.artwork.clone()) else {
            debug!(generation = self.generation, "No artwork, using default theme");
            return TintRun::Immediate(self.publish(ThemeColors::DEFAULT));
        };

        match inputs.layer_styles() {
            Ok(layers) => TintRun::Load(TintJob {
                generation: self.generation,
                uri,
                layers,
            }),
            Err(e) => {
                warn!(error = %e, "Layer styles unavailable, using default theme");
                TintRun::Immediate(self.publish(ThemeColors::DEFAULT))
            }
        }
    }

    /// Apply a finished job
    ///
    /// Returns the newly published theme, or `None` for a stale result.
    pub fn complete(&mut self, outcome: TintOutcome) -> Option<ThemeColors> {
        if outcome.generation != self.generation {
            debug!(
                generation = outcome.generation,
                current = self.generation,
                "Discarding stale tint result"
            );
            return None;
        }

        let theme = match outcome.result {
            Ok(theme) => theme,
            Err(e) => {
                debug!(error = %e, "Tint run failed, using default theme");
                ThemeColors::DEFAULT
            }
        };
        Some(self.publish(theme))
    }

    fn publish(&mut self, theme: ThemeColors) -> ThemeColors {
        self.current = theme;
        theme
    }
}

impl Default for TintEngine {
    fn default() -> Self {
        Self::new(TintConfig::default())
    }
}

/// Load, sample and composite one job
///
/// Decoding runs on the blocking pool. Cached averages skip the load.
pub async fn run_job(
    job: TintJob,
    loader: &dyn ArtworkLoader,
    sampler: &ArtworkSampler,
) -> TintOutcome {
    let result = sample_job(&job, loader, sampler)
        .await
        .map(|average| derive_theme(average, &job.layers));

    TintOutcome {
        generation: job.generation,
        result,
    }
}

async fn sample_job(
    job: &TintJob,
    loader: &dyn ArtworkLoader,
    sampler: &ArtworkSampler,
) -> Result<Rgb> {
    if let Some(hit) = sampler.cached(&job.uri) {
        return Ok(hit);
    }

    let bytes = loader.load(&job.uri).await?;
    let sampler = sampler.clone();
    let key = job.uri.clone();
    tokio::task::spawn_blocking(move || sampler.sample(&key, &bytes))
        .await
        .map_err(|e| TintError::Task(e.to_string()))?
}

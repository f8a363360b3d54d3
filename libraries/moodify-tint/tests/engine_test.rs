//! End-to-end tint runs against in-memory artwork

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgba as Pixel, RgbaImage};
use moodify_tint::{
    run_job, ArtworkLoader, LayerStyles, Rgb, Rgba, StaticThemeInputs, ThemeColors, TintConfig,
    TintEngine, TintError, TintRun,
};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

struct MemoryLoader {
    images: HashMap<String, Bytes>,
    loads: AtomicUsize,
}

impl MemoryLoader {
    fn new(images: &[(&str, Bytes)]) -> Self {
        Self {
            images: images
                .iter()
                .map(|(uri, bytes)| ((*uri).to_string(), bytes.clone()))
                .collect(),
            loads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ArtworkLoader for MemoryLoader {
    async fn load(&self, uri: &str) -> moodify_tint::Result<Bytes> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.images
            .get(uri)
            .cloned()
            .ok_or_else(|| TintError::load(uri, "not found"))
    }
}

fn solid_png(r: u8, g: u8, b: u8) -> Bytes {
    let image = RgbaImage::from_pixel(120, 120, Pixel([r, g, b, 255]));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    Bytes::from(out.into_inner())
}

fn load_job(run: Option<TintRun>) -> moodify_tint::TintJob {
    match run {
        Some(TintRun::Load(job)) => job,
        other => panic!("expected load, got {other:?}"),
    }
}

#[tokio::test]
async fn red_artwork_produces_red_theme() {
    let loader = MemoryLoader::new(&[("cover://red", solid_png(200, 50, 50))]);
    let mut engine = TintEngine::new(TintConfig::default());
    let inputs = StaticThemeInputs::default();

    let job = load_job(engine.artwork_changed(Some("cover://red"), &inputs));
    let outcome = run_job(job, &loader, engine.sampler()).await;
    let theme = engine.complete(outcome).unwrap();

    assert_eq!(theme.tint, Rgb::new(200, 50, 50));
    assert_eq!(theme.tint_dark, Rgb::new(110, 28, 28));
    assert_eq!(theme.text_on_tint.to_hex(), "#ffffff");
    assert_eq!(engine.current(), theme);
}

#[tokio::test]
async fn missing_artwork_falls_back_to_default() {
    let loader = MemoryLoader::new(&[]);
    let mut engine = TintEngine::default();
    let inputs = StaticThemeInputs::default();

    let job = load_job(engine.artwork_changed(Some("cover://gone"), &inputs));
    let outcome = run_job(job, &loader, engine.sampler()).await;

    assert_eq!(engine.complete(outcome), Some(ThemeColors::DEFAULT));
}

#[tokio::test]
async fn undecodable_artwork_falls_back_to_default() {
    let loader = MemoryLoader::new(&[("cover://html", Bytes::from_static(b"<html></html>"))]);
    let mut engine = TintEngine::default();
    let inputs = StaticThemeInputs::default();

    let job = load_job(engine.artwork_changed(Some("cover://html"), &inputs));
    let outcome = run_job(job, &loader, engine.sampler()).await;
    assert!(matches!(outcome.result, Err(TintError::Decode(_))));
    assert_eq!(engine.complete(outcome), Some(ThemeColors::DEFAULT));
}

#[tokio::test]
async fn layer_change_reuses_cached_sample() {
    let loader = MemoryLoader::new(&[("cover://blue", solid_png(20, 40, 220))]);
    let mut engine = TintEngine::default();
    let dark = StaticThemeInputs::default();

    let job = load_job(engine.artwork_changed(Some("cover://blue"), &dark));
    let outcome = run_job(job, &loader, engine.sampler()).await;
    engine.complete(outcome);

    // overlay becomes half white
    let light = StaticThemeInputs::new(
        None,
        LayerStyles {
            overlay: Some(Rgba::new(Rgb::WHITE, 0.5)),
            ..LayerStyles::default()
        },
    );
    engine.layers_changed(tokio::time::Instant::now());
    let job = load_job(engine.fire_debounced(&light));
    let outcome = run_job(job, &loader, engine.sampler()).await;
    let theme = engine.complete(outcome).unwrap();

    assert_eq!(theme.tint_dark, Rgb::new(138, 148, 238));
    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn switching_artwork_mid_run_discards_old_result() {
    let loader = MemoryLoader::new(&[
        ("cover://red", solid_png(200, 50, 50)),
        ("cover://green", solid_png(10, 200, 10)),
    ]);
    let mut engine = TintEngine::default();
    let inputs = StaticThemeInputs::default();

    let red = load_job(engine.artwork_changed(Some("cover://red"), &inputs));
    let green = load_job(engine.artwork_changed(Some("cover://green"), &inputs));

    // green finishes first, red straggles in afterwards
    let green_outcome = run_job(green, &loader, engine.sampler()).await;
    let red_outcome = run_job(red, &loader, engine.sampler()).await;

    let published = engine.complete(green_outcome).unwrap();
    assert_eq!(published.tint, Rgb::new(10, 200, 10));
    assert!(engine.complete(red_outcome).is_none());
    assert_eq!(engine.current().tint, Rgb::new(10, 200, 10));
}

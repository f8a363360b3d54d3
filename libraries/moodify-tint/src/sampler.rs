use crate::error::{Result, TintError};
use crate::types::Rgb;
use image::{imageops::FilterType, DynamicImage};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Side length artwork is downsampled to before averaging
pub const DEFAULT_SAMPLE_SIZE: u32 = 64;

/// Samples average artwork colors with LRU caching
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct ArtworkSampler {
    sample_size: u32,
    cache: Arc<Mutex<LruCache<String, Rgb>>>,
}

impl ArtworkSampler {
    /// Create a sampler
    ///
    /// # Arguments
    /// * `sample_size` - Side of the square the artwork is resized to
    /// * `cache_size` - Maximum number of cached averages (0 keeps one)
    pub fn new(sample_size: u32, cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            sample_size: sample_size.max(1),
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Previously sampled average for `key`
    pub fn cached(&self, key: &str) -> Option<Rgb> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get(key).copied()
    }

    /// Decode `bytes` and average them, caching under `key`
    pub fn sample(&self, key: &str, bytes: &[u8]) -> Result<Rgb> {
        if let Some(hit) = self.cached(key) {
            debug!(key = %key, "Artwork sample cache hit");
            return Ok(hit);
        }

        let image = image::load_from_memory(bytes)?;
        let average = average_color(&image, self.sample_size)?;

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.put(key.to_string(), average);
        Ok(average)
    }

    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.clear();
    }
}

impl Default for ArtworkSampler {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_SIZE, 32)
    }
}

/// Average color over the non-transparent pixels of a `size`×`size` thumbnail
///
/// Every pixel with alpha > 0 counts equally, whatever its alpha.
pub fn average_color(image: &DynamicImage, size: u32) -> Result<Rgb> {
    let thumbnail = image
        .resize_exact(size, size, FilterType::Triangle)
        .to_rgba8();

    let (mut r, mut g, mut b, mut count) = (0u64, 0u64, 0u64, 0u64);
    for pixel in thumbnail.pixels() {
        let [pr, pg, pb, pa] = pixel.0;
        if pa == 0 {
            continue;
        }
        r += u64::from(pr);
        g += u64::from(pg);
        b += u64::from(pb);
        count += 1;
    }

    if count == 0 {
        return Err(TintError::Transparent);
    }

    let mean = |sum: u64| (sum as f64 / count as f64).round() as u8;
    Ok(Rgb::new(mean(r), mean(g), mean(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(image: &RgbaImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn solid_color_averages_to_itself() {
        let image = RgbaImage::from_pixel(200, 120, Rgba([200, 50, 50, 255]));
        let average = average_color(&DynamicImage::ImageRgba8(image), 64).unwrap();
        assert_eq!(average, Rgb::new(200, 50, 50));
    }

    #[test]
    fn transparent_pixels_are_skipped() {
        // left half transparent white, right half opaque blue
        let image = RgbaImage::from_fn(64, 64, |x, _| {
            if x < 32 {
                Rgba([255, 255, 255, 0])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let average = average_color(&DynamicImage::ImageRgba8(image), 64).unwrap();
        assert_eq!(average, Rgb::new(0, 0, 255));
    }

    #[test]
    fn fully_transparent_fails() {
        let image = RgbaImage::from_pixel(16, 16, Rgba([10, 10, 10, 0]));
        assert!(matches!(
            average_color(&DynamicImage::ImageRgba8(image), 64),
            Err(TintError::Transparent)
        ));
    }

    #[test]
    fn halves_average_evenly() {
        let image = RgbaImage::from_fn(64, 64, |_, y| {
            if y < 32 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([200, 100, 50, 255])
            }
        });
        let average = average_color(&DynamicImage::ImageRgba8(image), 64).unwrap();
        assert_eq!(average, Rgb::new(100, 50, 25));
    }

    #[test]
    fn sample_caches_by_key() {
        let sampler = ArtworkSampler::new(64, 4);
        let bytes = png(&RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255])));

        assert_eq!(sampler.sample("cover-a", &bytes).unwrap(), Rgb::new(1, 2, 3));
        assert_eq!(sampler.cached("cover-a"), Some(Rgb::new(1, 2, 3)));

        // cached value wins over new bytes under the same key
        assert_eq!(sampler.sample("cover-a", b"not an image").unwrap(), Rgb::new(1, 2, 3));

        sampler.clear_cache();
        assert!(sampler.cached("cover-a").is_none());
    }

    #[test]
    fn undecodable_bytes_fail() {
        let sampler = ArtworkSampler::default();
        assert!(matches!(
            sampler.sample("junk", b"definitely not a png"),
            Err(TintError::Decode(_))
        ));
    }
}

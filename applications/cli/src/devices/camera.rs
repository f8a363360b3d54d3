/// Camera backed by image files
use async_trait::async_trait;
use bytes::Bytes;
use moodify_core::{CaptureDevice, MoodifyError, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif"];

/// Serves stills from disk
///
/// A file source returns the same frame on every capture; a directory
/// source cycles through its images in name order, re-listing on every
/// capture so photos dropped in while running are picked up.
pub struct FileCamera {
    source: PathBuf,
    cursor: AtomicUsize,
}

impl FileCamera {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    async fn next_frame_path(&self) -> Result<PathBuf> {
        let metadata = tokio::fs::metadata(&self.source)
            .await
            .map_err(|e| MoodifyError::capture(format!("{}: {e}", self.source.display())))?;
        if metadata.is_file() {
            return Ok(self.source.clone());
        }

        let mut frames = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.source).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_image(&path) {
                frames.push(path);
            }
        }
        frames.sort();

        if frames.is_empty() {
            return Err(MoodifyError::capture(format!(
                "no images in {}",
                self.source.display()
            )));
        }

        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % frames.len();
        Ok(frames.swap_remove(index))
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[async_trait]
impl CaptureDevice for FileCamera {
    async fn capture(&self) -> Result<Bytes> {
        let path = self.next_frame_path().await?;
        let bytes = tokio::fs::read(&path).await?;
        if bytes.is_empty() {
            return Err(MoodifyError::EmptyCapture);
        }

        debug!(path = %path.display(), size = bytes.len(), "Captured frame");
        Ok(Bytes::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn single_file_repeats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.jpg");
        std::fs::write(&path, b"jpeg").unwrap();

        let camera = FileCamera::new(&path);
        assert_eq!(&camera.capture().await.unwrap()[..], b"jpeg");
        assert_eq!(&camera.capture().await.unwrap()[..], b"jpeg");
    }

    #[tokio::test]
    async fn directory_cycles_through_images() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        std::fs::write(dir.path().join("b.JPG"), b"b").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"skip").unwrap();

        let camera = FileCamera::new(dir.path());
        let frames = [
            camera.capture().await.unwrap(),
            camera.capture().await.unwrap(),
            camera.capture().await.unwrap(),
        ];
        assert_eq!(&frames[0][..], b"a");
        assert_eq!(&frames[1][..], b"b");
        assert_eq!(&frames[2][..], b"a");
    }

    #[tokio::test]
    async fn empty_frame_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.png");
        std::fs::write(&path, b"").unwrap();

        let camera = FileCamera::new(&path);
        assert!(matches!(
            camera.capture().await,
            Err(MoodifyError::EmptyCapture)
        ));
    }

    #[tokio::test]
    async fn missing_source_fails() {
        let camera = FileCamera::new("/nonexistent/photos");
        assert!(matches!(
            camera.capture().await,
            Err(MoodifyError::Capture(_))
        ));
    }

    #[tokio::test]
    async fn directory_without_images_fails() {
        let dir = tempfile::tempdir().unwrap();
        let camera = FileCamera::new(dir.path());
        assert!(camera.capture().await.is_err());
    }
}

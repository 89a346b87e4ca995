//! Frame capture from a live video stream.
//!
//! The camera is an external resource with strict lifecycle rules: a stream
//! is owned by exactly one [`FrameCapture`] at a time, and every media track
//! is stopped exactly once, whether a frame is produced, the stream is
//! retaken, or an error interrupts either.
//!
//! The captured pixels are exactly the interior guide rectangle the user is
//! asked to align the document within, computed as a configurable fraction
//! of the live video dimensions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::RgbaImage;

use crate::error::{DocsnapError, Result};

/// Crop rectangle in pixels, fully contained in the source frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Interior guide rectangle as a centered fraction of the video dimensions.
///
/// The default matches the capture overlay: 80% of the width and height,
/// leaving a 10% margin on each side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideConfig {
    width_fraction: f64,
    height_fraction: f64,
}

impl GuideConfig {
    /// Fractions must be in `(0, 1]`.
    pub fn new(width_fraction: f64, height_fraction: f64) -> Result<Self> {
        for fraction in [width_fraction, height_fraction] {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(DocsnapError::InvalidGuide(format!(
                    "fraction {fraction} outside (0, 1]"
                )));
            }
        }
        Ok(Self {
            width_fraction,
            height_fraction,
        })
    }

    /// Compute the centered guide region for a video of the given size.
    pub fn region(&self, video_width: u32, video_height: u32) -> Result<GuideRegion> {
        if video_width == 0 || video_height == 0 {
            return Err(DocsnapError::InvalidGuide(format!(
                "video dimensions {video_width}x{video_height} are empty"
            )));
        }

        let width = ((f64::from(video_width) * self.width_fraction).round() as u32).max(1);
        let height = ((f64::from(video_height) * self.height_fraction).round() as u32).max(1);
        let region = GuideRegion {
            x: (video_width - width.min(video_width)) / 2,
            y: (video_height - height.min(video_height)) / 2,
            width: width.min(video_width),
            height: height.min(video_height),
        };

        // Containment invariant, kept explicit against rounding drift.
        if region.x + region.width > video_width || region.y + region.height > video_height {
            return Err(DocsnapError::InvalidGuide(format!(
                "region {region:?} exceeds {video_width}x{video_height}"
            )));
        }
        Ok(region)
    }
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            width_fraction: 0.8,
            height_fraction: 0.8,
        }
    }
}

/// One captured frame: the guide region's pixels in a new owned buffer.
///
/// Transient: exists only between capture and extraction.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbaImage,
    region: GuideRegion,
}

impl Frame {
    pub fn new(image: RgbaImage, region: GuideRegion) -> Self {
        Self { image, region }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// The crop rectangle that was applied to the source video.
    pub fn region(&self) -> GuideRegion {
        self.region
    }
}

/// A live video stream handle supplied by a [`VideoSource`].
pub trait VideoStream: Send + Sync {
    /// Current video dimensions in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Snapshot of the current frame's pixels.
    ///
    /// Fails with [`DocsnapError::NoActiveStream`] when the stream can no
    /// longer produce pixels.
    fn snapshot(&self) -> Result<RgbaImage>;

    /// Stop every media track on this stream. Idempotent.
    fn stop(&mut self);

    /// Number of tracks still live on this stream.
    fn live_tracks(&self) -> usize;
}

/// Capability to acquire a camera stream.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Acquire a fresh stream.
    ///
    /// Fails with [`DocsnapError::CameraUnavailable`] when access is refused
    /// or no compatible device exists.
    async fn acquire(&self) -> Result<Box<dyn VideoStream>>;
}

/// Owns the active camera stream and produces guide-region [`Frame`]s.
pub struct FrameCapture {
    source: Arc<dyn VideoSource>,
    stream: Option<Box<dyn VideoStream>>,
    guide: GuideConfig,
}

impl FrameCapture {
    /// Create a capture unit with no stream attached yet; call
    /// [`reacquire`](Self::reacquire) to go live.
    pub fn new(source: Arc<dyn VideoSource>, guide: GuideConfig) -> Self {
        Self {
            source,
            stream: None,
            guide,
        }
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// Crop the current frame to the guide region and release the stream.
    ///
    /// The stream's tracks are stopped on every exit path, success or error.
    /// Fails with [`DocsnapError::NoActiveStream`] when no stream is held.
    pub fn capture(&mut self) -> Result<Frame> {
        let mut stream = self.stream.take().ok_or(DocsnapError::NoActiveStream)?;
        let result = crop_to_guide(stream.as_ref(), self.guide);
        stream.stop();
        tracing::debug!(ok = result.is_ok(), "Captured frame, stream released");
        result
    }

    /// Discard any held stream (stopping its tracks) and acquire a fresh one.
    pub async fn reacquire(&mut self) -> Result<()> {
        self.release();
        let stream = self.source.acquire().await?;
        let (width, height) = stream.dimensions();
        tracing::debug!(width, height, "Acquired camera stream");
        self.stream = Some(stream);
        Ok(())
    }

    /// Stop and drop the held stream, if any. Idempotent.
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            tracing::debug!("Released camera stream");
        }
    }
}

impl Drop for FrameCapture {
    fn drop(&mut self) {
        self.release();
    }
}

fn crop_to_guide(stream: &dyn VideoStream, guide: GuideConfig) -> Result<Frame> {
    let (video_width, video_height) = stream.dimensions();
    let region = guide.region(video_width, video_height)?;
    let full = stream.snapshot()?;
    let image =
        image::imageops::crop_imm(&full, region.x, region.y, region.width, region.height)
            .to_image();
    Ok(Frame::new(image, region))
}

/// Video source serving one still image per acquisition.
///
/// Stands in for a camera in tests and in the CLI, where the "live feed" is
/// a file. Track bookkeeping behaves like a real stream so resource-release
/// semantics can be observed.
pub struct StillSource {
    image: RgbaImage,
    issued: Mutex<Vec<Arc<AtomicUsize>>>,
}

impl StillSource {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            issued: Mutex::new(Vec::new()),
        }
    }

    /// Live-track counters of every stream this source has issued, in
    /// acquisition order.
    pub fn issued_track_counters(&self) -> Vec<Arc<AtomicUsize>> {
        self.issued.lock().expect("track list poisoned").clone()
    }
}

#[async_trait]
impl VideoSource for StillSource {
    async fn acquire(&self) -> Result<Box<dyn VideoStream>> {
        let stream = StillStream::new(self.image.clone());
        self.issued
            .lock()
            .expect("track list poisoned")
            .push(stream.track_counter());
        Ok(Box::new(stream))
    }
}

/// Stream handle issued by [`StillSource`]: a single frozen frame with one
/// media track.
pub struct StillStream {
    image: RgbaImage,
    tracks: Arc<AtomicUsize>,
}

impl StillStream {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            tracks: Arc::new(AtomicUsize::new(1)),
        }
    }

    /// Shared live-track counter, observable after the stream is consumed.
    pub fn track_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.tracks)
    }
}

impl VideoStream for StillStream {
    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn snapshot(&self) -> Result<RgbaImage> {
        if self.live_tracks() == 0 {
            return Err(DocsnapError::NoActiveStream);
        }
        Ok(self.image.clone())
    }

    fn stop(&mut self) {
        self.tracks.store(0, Ordering::SeqCst);
    }

    fn live_tracks(&self) -> usize {
        self.tracks.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn test_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255])
        })
    }

    #[test]
    fn test_default_guide_leaves_ten_percent_margins() {
        let region = GuideConfig::default().region(100, 100).unwrap();
        assert_eq!(
            region,
            GuideRegion {
                x: 10,
                y: 10,
                width: 80,
                height: 80
            }
        );
    }

    #[test]
    fn test_guide_fraction_validation() {
        assert!(GuideConfig::new(0.0, 0.5).is_err());
        assert!(GuideConfig::new(0.5, 1.5).is_err());
        assert!(GuideConfig::new(1.0, 1.0).is_ok());
    }

    #[test]
    fn test_guide_region_contained_for_odd_sizes() {
        let config = GuideConfig::default();
        for (w, h) in [(1, 1), (3, 7), (641, 479), (1920, 1080)] {
            let region = config.region(w, h).unwrap();
            assert!(region.x + region.width <= w);
            assert!(region.y + region.height <= h);
            assert!(region.width >= 1 && region.height >= 1);
        }
    }

    #[test]
    fn test_empty_video_rejected() {
        assert!(GuideConfig::default().region(0, 100).is_err());
    }

    #[tokio::test]
    async fn test_capture_crops_guide_region_pixels() {
        let source = Arc::new(StillSource::new(test_image(100, 100)));
        let mut capture = FrameCapture::new(source, GuideConfig::default());
        capture.reacquire().await.unwrap();

        let frame = capture.capture().unwrap();
        assert_eq!(frame.image().dimensions(), (80, 80));
        assert_eq!(
            frame.region(),
            GuideRegion {
                x: 10,
                y: 10,
                width: 80,
                height: 80
            }
        );
        // Top-left of the crop is pixel (10, 10) of the source.
        assert_eq!(frame.image().get_pixel(0, 0), &Rgba([10, 10, 0, 255]));
    }

    #[tokio::test]
    async fn test_capture_stops_all_tracks() {
        let source = Arc::new(StillSource::new(test_image(40, 40)));
        let mut capture = FrameCapture::new(Arc::clone(&source) as Arc<dyn VideoSource>, GuideConfig::default());
        capture.reacquire().await.unwrap();

        capture.capture().unwrap();

        let counters = source.issued_track_counters();
        assert_eq!(counters.len(), 1);
        assert_eq!(counters[0].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_capture_without_stream_fails() {
        let source = Arc::new(StillSource::new(test_image(40, 40)));
        let mut capture = FrameCapture::new(source, GuideConfig::default());
        assert!(matches!(
            capture.capture(),
            Err(DocsnapError::NoActiveStream)
        ));
    }

    #[tokio::test]
    async fn test_stream_released_exactly_once_per_capture() {
        let source = Arc::new(StillSource::new(test_image(40, 40)));
        let mut capture = FrameCapture::new(source, GuideConfig::default());
        capture.reacquire().await.unwrap();

        capture.capture().unwrap();
        // The stream was consumed; a second capture needs reacquisition.
        assert!(matches!(
            capture.capture(),
            Err(DocsnapError::NoActiveStream)
        ));

        capture.reacquire().await.unwrap();
        assert!(capture.capture().is_ok());
    }

    #[tokio::test]
    async fn test_reacquire_stops_previous_stream() {
        let source = Arc::new(StillSource::new(test_image(40, 40)));
        let mut capture = FrameCapture::new(Arc::clone(&source) as Arc<dyn VideoSource>, GuideConfig::default());
        capture.reacquire().await.unwrap();
        capture.reacquire().await.unwrap();

        let counters = source.issued_track_counters();
        assert_eq!(counters.len(), 2);
        assert_eq!(counters[0].load(Ordering::SeqCst), 0, "old stream stopped");
        assert_eq!(counters[1].load(Ordering::SeqCst), 1, "new stream live");
    }
}

//! Integration tests for background compositing and result reconciliation
//!
//! These tests verify that:
//! - Detached batches are flattened into the cached image
//! - Results of superseded jobs never replace a newer cache
//! - Results from before undo/clear are dropped and the current state is resubmitted
//! - Failed jobs leave their strokes drawn live until a later job succeeds

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use image::{Rgba, RgbaImage};
use quill_ink::StrokeCollection;
use quill_paint::Point;
use quill_raster::{
    DamageRegion, ImageRasterizer, PixelSize, RasterError, RoundCapStroker, SoftwareRasterizer,
};
use quill_surface::{CompositorConfig, Surface, SurfaceConfig};
use tracing_subscriber::EnvFilter;

const RED: [u8; 4] = [255, 0, 0, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];
const WAIT: Duration = Duration::from_secs(10);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config(threshold: usize, worker_threads: usize) -> SurfaceConfig {
    SurfaceConfig {
        transfer_threshold: threshold,
        compositor: CompositorConfig {
            worker_threads,
            ..CompositorConfig::default()
        },
        ..SurfaceConfig::default()
    }
}

fn surface_with(
    config: SurfaceConfig,
    rasterizer: Arc<dyn ImageRasterizer>,
) -> Surface<DamageRegion> {
    Surface::with_backend(
        PixelSize::new(64, 64),
        config,
        DamageRegion::default(),
        Arc::new(RoundCapStroker),
        rasterizer,
    )
    .unwrap()
}

/// Start a horizontal stroke at `(4, y)`
fn start_line(surface: &mut Surface<DamageRegion>, y: f32) {
    surface.pointer_down(Point::new(4.0, y));
}

/// Extend the current stroke by `moves` points, 2px apart
fn extend_line(surface: &mut Surface<DamageRegion>, moves: usize) {
    let last = surface.committed().last_point().unwrap();
    for i in 1..=moves {
        assert!(surface.pointer_move(Point::new(last.x + 2.0 * i as f32, last.y)));
    }
}

fn pixel(image: &RgbaImage, x: u32, y: u32) -> [u8; 4] {
    image.get_pixel(x, y).0
}

/// Sleeps before rasterizing batches smaller than `slow_below` points
struct DelayRasterizer {
    inner: SoftwareRasterizer,
    slow_below: usize,
    delay: Duration,
}

impl DelayRasterizer {
    fn new(slow_below: usize, delay: Duration) -> Self {
        Self {
            inner: SoftwareRasterizer::default(),
            slow_below,
            delay,
        }
    }
}

impl ImageRasterizer for DelayRasterizer {
    fn rasterize(
        &self,
        size: PixelSize,
        base: Option<&RgbaImage>,
        strokes: &StrokeCollection,
    ) -> Result<RgbaImage, RasterError> {
        if strokes.total_point_count() < self.slow_below {
            thread::sleep(self.delay);
        }
        self.inner.rasterize(size, base, strokes)
    }
}

/// Fails the first `failures` calls, then rasterizes normally
struct FlakyRasterizer {
    inner: SoftwareRasterizer,
    failures: AtomicUsize,
}

impl FlakyRasterizer {
    fn new(failures: usize) -> Self {
        Self {
            inner: SoftwareRasterizer::default(),
            failures: AtomicUsize::new(failures),
        }
    }
}

impl ImageRasterizer for FlakyRasterizer {
    fn rasterize(
        &self,
        size: PixelSize,
        base: Option<&RgbaImage>,
        strokes: &StrokeCollection,
    ) -> Result<RgbaImage, RasterError> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(RasterError::Interrupted("injected failure".to_string()));
        }
        self.inner.rasterize(size, base, strokes)
    }
}

#[test]
fn test_batch_is_adopted_into_cache() {
    init_tracing();
    let mut surface = surface_with(config(10, 1), Arc::new(SoftwareRasterizer::default()));

    start_line(&mut surface, 20.0);
    extend_line(&mut surface, 7);
    assert!(surface.pending_request().is_some());
    assert_eq!(surface.live().total_point_count(), 1);

    assert!(surface.wait_for_compositor(WAIT));

    let stats = surface.stats();
    assert_eq!(stats.submitted, 1);
    assert_eq!(stats.adopted, 1);
    assert!(surface.in_flight().is_none());
    assert!(surface.pending_request().is_none());
    assert!(surface.host().is_full());

    let cached = surface.cached_image().unwrap();
    assert_eq!(pixel(cached, 8, 20), RED);
    assert_eq!(pixel(cached, 8, 40), CLEAR);

    let frame = surface.render_image();
    assert_eq!(pixel(&frame, 8, 20), RED);
    assert_eq!(pixel(&frame, 8, 40), CLEAR);
}

#[test]
fn test_superseded_result_is_dropped() {
    init_tracing();
    // The first, smaller batch finishes after the merged one
    let rasterizer = DelayRasterizer::new(15, Duration::from_millis(300));
    let mut surface = surface_with(config(10, 2), Arc::new(rasterizer));

    start_line(&mut surface, 20.0);
    extend_line(&mut surface, 7);
    let first = surface.pending_request().unwrap();

    extend_line(&mut surface, 9);
    let second = surface.pending_request().unwrap();
    assert!(second > first);
    assert_eq!(surface.in_flight().unwrap().total_point_count(), 20);

    assert!(surface.wait_for_compositor(WAIT));

    let stats = surface.stats();
    assert_eq!(stats.submitted, 2);
    assert_eq!(stats.adopted, 1);
    assert_eq!(stats.discarded_stale, 1);
    assert!(surface.in_flight().is_none());

    // The adopted image covers both batches
    let cached = surface.cached_image().unwrap();
    assert_eq!(pixel(cached, 8, 20), RED);
    assert_eq!(pixel(cached, 30, 20), RED);
}

#[test]
fn test_clear_discards_and_resubmits() {
    init_tracing();
    let rasterizer = DelayRasterizer::new(usize::MAX, Duration::from_millis(200));
    let mut surface = surface_with(config(10, 1), Arc::new(rasterizer));

    start_line(&mut surface, 20.0);
    extend_line(&mut surface, 7);
    assert!(surface.pending_request().is_some());

    surface.clear();
    assert!(surface.pending_request().is_none());

    // Below the threshold: only the stale result triggers a composite
    start_line(&mut surface, 40.0);
    extend_line(&mut surface, 2);
    assert_eq!(surface.live().transferrable_point_count(), 5);
    assert!(surface.pending_request().is_none());

    assert!(surface.wait_for_compositor(WAIT));

    let stats = surface.stats();
    assert_eq!(stats.discarded_after_reset, 1);
    assert_eq!(stats.submitted, 2);
    assert_eq!(stats.adopted, 1);
    assert_eq!(surface.live().transferrable_point_count(), 1);

    let cached = surface.cached_image().unwrap();
    assert_eq!(pixel(cached, 8, 40), RED);
    assert_eq!(pixel(cached, 8, 20), CLEAR);
}

#[test]
fn test_undo_discards_in_flight_job() {
    init_tracing();
    let rasterizer = DelayRasterizer::new(usize::MAX, Duration::from_millis(200));
    let mut surface = surface_with(config(10, 1), Arc::new(rasterizer));

    start_line(&mut surface, 20.0);
    extend_line(&mut surface, 7);
    assert!(surface.undo());
    assert!(!surface.contains_drawing());

    assert!(surface.wait_for_compositor(WAIT));

    let stats = surface.stats();
    assert_eq!(stats.discarded_after_reset, 1);
    assert_eq!(stats.adopted, 0);
    // Nothing left to resubmit
    assert_eq!(stats.submitted, 1);
    assert!(surface.cached_image().is_none());
    assert!(surface.render_image().pixels().all(|p| p.0 == CLEAR));
}

#[test]
fn test_failed_job_keeps_batch_live() {
    init_tracing();
    let mut surface = surface_with(config(10, 1), Arc::new(FlakyRasterizer::new(1)));

    start_line(&mut surface, 20.0);
    extend_line(&mut surface, 7);
    assert!(surface.wait_for_compositor(WAIT));

    assert_eq!(surface.stats().failed, 1);
    assert!(surface.pending_request().is_none());
    assert!(surface.cached_image().is_none());
    assert_eq!(surface.in_flight().unwrap().total_point_count(), 10);
    assert_eq!(pixel(&surface.render_image(), 8, 20), RED);

    // The next batch merges with the failed one and retries it
    extend_line(&mut surface, 9);
    assert_eq!(surface.in_flight().unwrap().total_point_count(), 20);
    assert!(surface.wait_for_compositor(WAIT));

    assert_eq!(surface.stats().adopted, 1);
    assert!(surface.in_flight().is_none());
    let cached = surface.cached_image().unwrap();
    assert_eq!(pixel(cached, 8, 20), RED);
    assert_eq!(pixel(cached, 30, 20), RED);
}

#[test]
fn test_undo_falls_back_to_live_strokes() {
    init_tracing();
    let mut surface = surface_with(config(500, 1), Arc::new(FlakyRasterizer::new(usize::MAX)));

    start_line(&mut surface, 20.0);
    extend_line(&mut surface, 10);
    start_line(&mut surface, 40.0);
    extend_line(&mut surface, 10);

    assert!(surface.undo());
    assert_eq!(surface.stats().failed, 1);
    assert!(surface.cached_image().is_none());
    assert_eq!(surface.in_flight().unwrap().stroke_count(), 1);

    let frame = surface.render_image();
    assert_eq!(pixel(&frame, 8, 20), RED);
    assert_eq!(pixel(&frame, 8, 40), CLEAR);
}

#[test]
fn test_undo_rebuilds_cache() {
    init_tracing();
    let mut surface = surface_with(config(500, 1), Arc::new(SoftwareRasterizer::default()));

    start_line(&mut surface, 20.0);
    extend_line(&mut surface, 10);
    surface.pointer_up(Point::new(40.0, 20.0));
    start_line(&mut surface, 40.0);
    extend_line(&mut surface, 10);
    surface.pointer_up(Point::new(40.0, 40.0));

    assert!(surface.undo());
    assert!(surface.live().is_empty());
    let cached = surface.cached_image().unwrap();
    assert_eq!(pixel(cached, 8, 20), RED);
    assert_eq!(pixel(cached, 8, 40), CLEAR);
    assert_eq!(surface.render_image(), cached.clone());
}

#[test]
fn test_render_replaces_target_contents() {
    let mut surface = surface_with(config(500, 1), Arc::new(SoftwareRasterizer::default()));
    let mut target = RgbaImage::from_pixel(64, 64, Rgba([255, 255, 255, 255]));

    surface.render(&mut target);
    assert!(target.pixels().all(|p| p.0 == CLEAR));

    start_line(&mut surface, 20.0);
    extend_line(&mut surface, 5);
    surface.render(&mut target);
    assert_eq!(pixel(&target, 8, 20), RED);
    assert_eq!(pixel(&target, 8, 30), CLEAR);
}

#[test]
fn test_config_file_drives_surface() {
    let path = std::env::temp_dir().join(format!("quill-surface-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        "transfer_threshold = 4\nmin_point_distance = 3.0\n\n[brush]\ncolor = 0x0000FF\n",
    )
    .unwrap();
    let config = SurfaceConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let mut surface = Surface::new(PixelSize::new(32, 32), config, DamageRegion::default()).unwrap();
    surface.pointer_down(Point::new(4.0, 4.0));
    assert!(!surface.pointer_move(Point::new(6.0, 4.0)));
    assert!(surface.pointer_move(Point::new(8.0, 4.0)));
    assert!(surface.pending_request().is_some());

    assert!(surface.wait_for_compositor(WAIT));
    let cached = surface.cached_image().unwrap();
    assert_eq!(pixel(cached, 6, 4), [0, 0, 255, 255]);
}

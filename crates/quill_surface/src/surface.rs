//! Drawing surface orchestration
//!
//! A [`Surface`] turns pointer input into strokes and keeps three layers
//! for rendering:
//!
//! 1. `cached_image`: everything the compositor has already flattened
//! 2. `in_flight`: the batch currently being flattened, drawn as vectors
//! 3. `live`: strokes not handed off yet, drawn as vectors
//!
//! `committed` holds every stroke of the drawing and is only used to
//! rebuild the cache on undo.
//!
//! Once `live` holds enough transferrable points, they are split off and
//! merged into `in_flight`, and the whole `in_flight` batch is submitted
//! on top of the current cache. Only the newest submission may replace the
//! cache, so older results are dropped by request id. Undo and clear bump
//! a reset epoch; results from an earlier epoch are dropped too.

use std::sync::Arc;
use std::time::{Duration, Instant};

use image::{imageops, Rgba, RgbaImage};
use quill_ink::{Brush, LatestStrokeCollection, StrokeCollection};
use quill_paint::{Point, Rect};
use quill_raster::{
    draw_strokes, ImageRasterizer, InvalidationHost, PathRenderer, PixelSize, RoundCapStroker,
    SoftwareRasterizer,
};
use tracing::{debug, trace, warn};

use crate::compositor::{CompositeJob, CompositeResult, Compositor, RequestId};
use crate::config::SurfaceConfig;
use crate::error::Result;

/// Raw points around the newest one that a new point can visually affect
const TAIL_POINTS: usize = 3;

/// Extra pixels around dirty rects for anti-aliasing
const AA_MARGIN: f32 = 1.0;

/// Counters of compositor traffic
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    /// Jobs submitted to the compositor
    pub submitted: u64,
    /// Results adopted as the cached image
    pub adopted: u64,
    /// Results dropped because a newer job was submitted after them
    pub discarded_stale: u64,
    /// Results dropped because undo or clear happened after submission
    pub discarded_after_reset: u64,
    /// Jobs (or undo rebuilds) that failed to rasterize
    pub failed: u64,
}

type DrawingCallback = Box<dyn FnMut(bool) + Send>;

/// Incremental freehand drawing surface
pub struct Surface<H: InvalidationHost> {
    config: SurfaceConfig,
    size: PixelSize,
    brush: Brush,

    committed: StrokeCollection,
    live: LatestStrokeCollection,
    in_flight: Option<Arc<StrokeCollection>>,
    cached_image: Option<Arc<RgbaImage>>,
    pending_request: Option<RequestId>,
    reset_epoch: u64,

    compositor: Compositor,
    renderer: Arc<dyn PathRenderer>,
    host: H,

    drawing: bool,
    on_drawing_changed: Option<DrawingCallback>,
    stats: SurfaceStats,
}

impl<H: InvalidationHost> Surface<H> {
    /// Create a surface rendering with [`RoundCapStroker`] and [`SoftwareRasterizer`]
    pub fn new(size: PixelSize, config: SurfaceConfig, host: H) -> Result<Self> {
        let renderer: Arc<dyn PathRenderer> = Arc::new(RoundCapStroker);
        let rasterizer = Arc::new(SoftwareRasterizer::new(Arc::clone(&renderer)));
        Self::with_backend(size, config, host, renderer, rasterizer)
    }

    /// Create a surface with custom rendering collaborators.
    ///
    /// `renderer` draws the vector layers every frame; `rasterizer` builds
    /// the cached image, both in the background and on undo.
    pub fn with_backend(
        size: PixelSize,
        config: SurfaceConfig,
        host: H,
        renderer: Arc<dyn PathRenderer>,
        rasterizer: Arc<dyn ImageRasterizer>,
    ) -> Result<Self> {
        config.validate()?;
        size.validate()?;
        let brush = config.brush.to_brush()?;
        let compositor = Compositor::new(&config.compositor, rasterizer)?;

        Ok(Self {
            committed: StrokeCollection::new().with_min_point_distance(config.min_point_distance),
            live: LatestStrokeCollection::new().with_min_point_distance(config.min_point_distance),
            in_flight: None,
            cached_image: None,
            pending_request: None,
            reset_epoch: 0,
            compositor,
            renderer,
            host,
            drawing: false,
            on_drawing_changed: None,
            stats: SurfaceStats::default(),
            config,
            size,
            brush,
        })
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Start a stroke with the current brush
    pub fn pointer_down(&mut self, point: Point) {
        self.committed.new_stroke(point, self.brush);
        self.live.new_stroke(point, self.brush);
        self.invalidate_tail();
        self.set_drawing(true);
    }

    /// Extend the current stroke. Returns whether the point was kept.
    pub fn pointer_move(&mut self, point: Point) -> bool {
        self.extend_stroke(point)
    }

    /// Extend and finish the current stroke
    pub fn pointer_up(&mut self, point: Point) -> bool {
        let accepted = self.extend_stroke(point);
        self.set_drawing(false);
        accepted
    }

    fn extend_stroke(&mut self, point: Point) -> bool {
        // `live` ends with the same point as `committed`, so both gates agree.
        // After an undo `live` is empty and the rest of the gesture is ignored.
        if !self.live.add_point(point) {
            return false;
        }
        self.committed.add_point(point);
        self.invalidate_tail();

        if self.live.transferrable_point_count() >= self.config.transfer_threshold {
            self.transfer();
        }
        true
    }

    fn invalidate_tail(&mut self) {
        let Some(stroke) = self.committed.last_stroke() else {
            return;
        };
        let points = stroke.points();
        let tail = &points[points.len().saturating_sub(TAIL_POINTS)..];
        if let Some(rect) = Rect::bounding(tail) {
            let padding = stroke.brush().width() * self.config.invalidation_padding + AA_MARGIN;
            self.host.invalidate(rect.inflate(padding));
        }
    }

    /// Detach every transferrable point of `live` and composite it
    fn transfer(&mut self) {
        let transferrable = self.live.transferrable_point_count();
        if transferrable > 0 {
            let batch = self.live.split_in_two(transferrable);
            debug!(
                points = batch.total_point_count(),
                strokes = batch.stroke_count(),
                "detached batch for compositing"
            );
            self.merge_in_flight(batch);
        }
        self.submit_in_flight();
    }

    fn merge_in_flight(&mut self, batch: StrokeCollection) {
        let merged = match self.in_flight.take() {
            Some(previous) => {
                let mut merged = Arc::try_unwrap(previous).unwrap_or_else(|shared| (*shared).clone());
                merged.append(batch);
                merged
            }
            None => batch,
        };
        self.in_flight = Some(Arc::new(merged));
    }

    fn submit_in_flight(&mut self) {
        let Some(strokes) = self.in_flight.clone() else {
            return;
        };
        let request_id = self.compositor.submit(CompositeJob {
            size: self.size,
            base: self.cached_image.clone(),
            strokes,
            epoch: self.reset_epoch,
        });
        self.pending_request = Some(request_id);
        self.stats.submitted += 1;
    }

    // =========================================================================
    // Compositor results
    // =========================================================================

    /// Apply every finished compositor result. Returns how many were handled.
    pub fn poll_compositor(&mut self) -> usize {
        let mut handled = 0;
        while let Some(result) = self.compositor.try_next() {
            self.apply_result(result);
            handled += 1;
        }
        handled
    }

    /// Block until every submitted job has reported back, applying results
    /// as they arrive.
    ///
    /// Returns `false` if `timeout` passed first.
    pub fn wait_for_compositor(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.poll_compositor();
        while self.compositor.outstanding() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.compositor.wait_next(remaining) {
                Some(result) => self.apply_result(result),
                None => return false,
            }
        }
        true
    }

    fn apply_result(&mut self, result: CompositeResult) {
        let CompositeResult {
            request_id,
            epoch,
            outcome,
        } = result;

        if epoch != self.reset_epoch {
            trace!(%request_id, epoch, current = self.reset_epoch, "dropping result from before reset");
            self.stats.discarded_after_reset += 1;
            if self.pending_request.is_none() {
                self.resubmit_after_reset();
            }
            return;
        }

        if self.pending_request != Some(request_id) {
            trace!(%request_id, pending = ?self.pending_request, "dropping superseded result");
            self.stats.discarded_stale += 1;
            return;
        }

        self.pending_request = None;
        match outcome {
            Ok(image) => {
                debug!(%request_id, "adopting composited image");
                self.cached_image = Some(Arc::new(image));
                self.in_flight = None;
                self.stats.adopted += 1;
                self.host.invalidate_all();
            }
            Err(err) => {
                warn!(%request_id, error = %err, "compositing failed, batch stays live");
                self.stats.failed += 1;
            }
        }
    }

    fn resubmit_after_reset(&mut self) {
        if self.live.transferrable_point_count() == 0 && self.in_flight.is_none() {
            return;
        }
        debug!(epoch = self.reset_epoch, "resubmitting after reset");
        self.transfer();
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Paint the current drawing into `target`, replacing its contents
    pub fn render(&self, target: &mut RgbaImage) {
        for pixel in target.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
        if self.committed.is_empty() {
            return;
        }

        if let Some(cached) = &self.cached_image {
            imageops::replace(target, &**cached, 0, 0);
        }
        if let Some(in_flight) = &self.in_flight {
            draw_strokes(self.renderer.as_ref(), target, in_flight.iter());
        }
        draw_strokes(self.renderer.as_ref(), target, self.live.iter());
    }

    /// Render into a new image of the surface size
    pub fn render_image(&self) -> RgbaImage {
        let mut target = RgbaImage::new(self.size.width, self.size.height);
        self.render(&mut target);
        target
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Remove the most recent stroke. Returns `false` if there was none.
    pub fn undo(&mut self) -> bool {
        self.reset_epoch += 1;
        self.in_flight = None;
        self.pending_request = None;

        if self.committed.remove_last_stroke().is_none() {
            return false;
        }
        self.live.clear();

        if self.committed.is_empty() {
            self.cached_image = None;
        } else {
            let rebuilt = self
                .compositor
                .rasterizer()
                .rasterize(self.size, None, &self.committed);
            match rebuilt {
                Ok(image) => self.cached_image = Some(Arc::new(image)),
                Err(err) => {
                    warn!(error = %err, "rebuilding cache after undo failed, drawing strokes live");
                    self.stats.failed += 1;
                    self.cached_image = None;
                    self.in_flight = Some(Arc::new(self.committed.clone()));
                }
            }
        }

        debug!(
            epoch = self.reset_epoch,
            strokes = self.committed.stroke_count(),
            "undo"
        );
        self.host.invalidate_all();
        true
    }

    /// Remove every stroke
    pub fn clear(&mut self) {
        self.reset_epoch += 1;
        self.committed.clear();
        self.live.clear();
        self.in_flight = None;
        self.cached_image = None;
        self.pending_request = None;

        debug!(epoch = self.reset_epoch, "cleared surface");
        self.host.invalidate_all();
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn contains_drawing(&self) -> bool {
        !self.committed.is_empty()
    }

    /// Whether a stroke is in progress (between pointer down and up)
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Register a callback for drawing start/end
    pub fn on_drawing_changed<F>(&mut self, callback: F)
    where
        F: FnMut(bool) + Send + 'static,
    {
        self.on_drawing_changed = Some(Box::new(callback));
    }

    fn set_drawing(&mut self, drawing: bool) {
        if self.drawing == drawing {
            return;
        }
        self.drawing = drawing;
        if let Some(callback) = &mut self.on_drawing_changed {
            callback(drawing);
        }
    }

    /// Brush for strokes started from now on
    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    pub fn size(&self) -> PixelSize {
        self.size
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn stats(&self) -> SurfaceStats {
        self.stats
    }

    pub fn committed(&self) -> &StrokeCollection {
        &self.committed
    }

    pub fn live(&self) -> &LatestStrokeCollection {
        &self.live
    }

    pub fn in_flight(&self) -> Option<&StrokeCollection> {
        self.in_flight.as_deref()
    }

    pub fn cached_image(&self) -> Option<&RgbaImage> {
        self.cached_image.as_deref()
    }

    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending_request
    }

    pub fn reset_epoch(&self) -> u64 {
        self.reset_epoch
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: InvalidationHost + std::fmt::Debug> std::fmt::Debug for Surface<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("size", &self.size)
            .field("brush", &self.brush)
            .field("committed_points", &self.committed.total_point_count())
            .field("live_points", &self.live.total_point_count())
            .field("pending_request", &self.pending_request)
            .field("reset_epoch", &self.reset_epoch)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

//! Background compositing
//!
//! The [`Compositor`] rasterizes stroke batches on top of a base image off
//! the coordinating thread. Every job gets a request id that increases
//! monotonically; the result comes back tagged with that id and the reset
//! epoch the job was submitted in, so the surface can tell current results
//! from superseded ones. Jobs are never cancelled: superseded ones run to
//! completion and their results are ignored.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use quill_ink::StrokeCollection;
use quill_raster::{ImageRasterizer, PixelSize, RasterError};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::config::CompositorConfig;
use crate::error::Result;

/// Identifies one submitted job
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Work for one background composite
#[derive(Clone, Debug)]
pub struct CompositeJob {
    pub size: PixelSize,
    /// Image to draw on top of; `None` starts from a transparent image
    pub base: Option<Arc<RgbaImage>>,
    pub strokes: Arc<StrokeCollection>,
    /// Reset epoch of the surface at submission time
    pub epoch: u64,
}

/// Outcome of a [`CompositeJob`]
#[derive(Debug)]
pub struct CompositeResult {
    pub request_id: RequestId,
    pub epoch: u64,
    pub outcome: std::result::Result<RgbaImage, RasterError>,
}

/// Runs composite jobs on a private tokio runtime and queues their results
pub struct Compositor {
    runtime: Runtime,
    rasterizer: Arc<dyn ImageRasterizer>,
    results_tx: mpsc::Sender<CompositeResult>,
    results_rx: mpsc::Receiver<CompositeResult>,
    last_request_id: RequestId,
    outstanding: usize,
}

impl Compositor {
    pub fn new(config: &CompositorConfig, rasterizer: Arc<dyn ImageRasterizer>) -> Result<Self> {
        let threads = config.worker_threads.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(threads)
            .max_blocking_threads(threads)
            .thread_name("quill-compositor")
            .enable_time()
            .build()?;
        let (results_tx, results_rx) = mpsc::channel(config.queue_capacity.max(1));

        debug!(
            worker_threads = threads,
            queue_capacity = config.queue_capacity,
            "compositor started"
        );

        Ok(Self {
            runtime,
            rasterizer,
            results_tx,
            results_rx,
            last_request_id: RequestId::default(),
            outstanding: 0,
        })
    }

    pub fn rasterizer(&self) -> &Arc<dyn ImageRasterizer> {
        &self.rasterizer
    }

    /// Id of the most recent submission
    pub fn last_request_id(&self) -> RequestId {
        self.last_request_id
    }

    /// Jobs submitted whose results have not been received yet
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Start a job and return its request id
    pub fn submit(&mut self, job: CompositeJob) -> RequestId {
        self.last_request_id = self.last_request_id.next();
        self.outstanding += 1;

        let request_id = self.last_request_id;
        let rasterizer = Arc::clone(&self.rasterizer);
        let results = self.results_tx.clone();
        let CompositeJob {
            size,
            base,
            strokes,
            epoch,
        } = job;

        debug!(
            %request_id,
            epoch,
            points = strokes.total_point_count(),
            has_base = base.is_some(),
            "submitting composite job"
        );

        self.runtime.spawn(async move {
            let outcome = tokio::task::spawn_blocking(move || {
                rasterizer.rasterize(size, base.as_deref(), &strokes)
            })
            .await
            .unwrap_or_else(|err| Err(RasterError::Interrupted(err.to_string())));

            let result = CompositeResult {
                request_id,
                epoch,
                outcome,
            };
            if results.send(result).await.is_err() {
                trace!(%request_id, "compositor gone before job finished");
            }
        });

        request_id
    }

    /// Next finished result, if one is queued
    pub fn try_next(&mut self) -> Option<CompositeResult> {
        let result = self.results_rx.try_recv().ok()?;
        self.outstanding = self.outstanding.saturating_sub(1);
        Some(result)
    }

    /// Block the calling thread until a result arrives or `timeout` passes
    pub fn wait_next(&mut self, timeout: Duration) -> Option<CompositeResult> {
        let results = &mut self.results_rx;
        let result = self
            .runtime
            .block_on(async { tokio::time::timeout(timeout, results.recv()).await })
            .ok()
            .flatten()?;
        self.outstanding = self.outstanding.saturating_sub(1);
        Some(result)
    }
}

impl fmt::Debug for Compositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compositor")
            .field("last_request_id", &self.last_request_id)
            .field("outstanding", &self.outstanding)
            .finish_non_exhaustive()
    }
}

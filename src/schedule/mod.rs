//! Batch rendering of output frames against a cycled animation.
//!
//! `FrameScheduler` owns one [`EngineSlot`] per animation frame. Output frame
//! `i` is rendered with animation frame `(i / repeat) % animation_len`; the
//! assignment is computed up front on the submitting thread, so results are
//! reproducible even though jobs complete in any order.
//!
//! `run` spawns every job into a rayon scope. Each job registers its use of a
//! slot before it is spawned; once all jobs are submitted, every slot is
//! closed so engines are released as soon as their last job finishes rather
//! than at the end of the batch. A failing job is logged and recorded in the
//! [`RunReport`]; it never stops the other jobs.

mod config;
mod slot;

pub use config::RenderConfig;
pub use slot::{EngineSlot, SlotState, SlotStats, UseTicket};

use crate::engine::QuadtreeEngine;
use crate::image::codec::FrameCodec;
use crate::template::LeafTemplate;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{MosaicError, MosaicResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// One output frame to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameJob {
    /// Output frame index, used for reporting.
    pub index: usize,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// A job that did not produce its output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameFailure {
    pub index: usize,
    pub input: PathBuf,
    pub error: MosaicError,
}

/// Outcome of a render batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Jobs whose output was written.
    pub rendered: usize,
    /// Jobs that failed, sorted by output index.
    pub failures: Vec<FrameFailure>,
}

impl RunReport {
    /// Number of jobs that ran.
    pub fn total(&self) -> usize {
        self.rendered + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Renders output frames with lazily built, shared per-animation-frame engines.
///
/// A scheduler runs a single batch: slots are closed when `run` returns, and
/// jobs submitted to a second run fail with [`MosaicError::EngineRetired`].
#[derive(Debug)]
pub struct FrameScheduler<C> {
    codec: C,
    config: RenderConfig,
    slots: Vec<EngineSlot>,
}

impl<C: FrameCodec> FrameScheduler<C> {
    /// Creates a scheduler for the given animation frames.
    pub fn new(codec: C, animation: Vec<PathBuf>, config: RenderConfig) -> MosaicResult<Self> {
        config.validate()?;
        if animation.is_empty() {
            return Err(MosaicError::InvalidParameters {
                reason: "at least one animation frame is required",
            });
        }
        let slots = animation.into_iter().map(EngineSlot::new).collect();
        Ok(Self {
            codec,
            config,
            slots,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Engine slots, one per animation frame, in animation order.
    pub fn slots(&self) -> &[EngineSlot] {
        &self.slots
    }

    /// Slot index for each of `count` output frames.
    pub fn assignments(&self, count: usize) -> Vec<usize> {
        (0..count)
            .map(|i| (i / self.config.repeat) % self.slots.len())
            .collect()
    }

    /// Renders `jobs` on a new thread pool sized by `config.threads`.
    pub fn run(&self, jobs: &[FrameJob]) -> MosaicResult<RunReport> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads.unwrap_or(0))
            .build()
            .map_err(|err| MosaicError::ThreadPool {
                reason: err.to_string(),
            })?;
        Ok(self.run_on(&pool, jobs))
    }

    /// Renders `jobs` on an existing pool, blocking until all have finished.
    pub fn run_on(&self, pool: &rayon::ThreadPool, jobs: &[FrameJob]) -> RunReport {
        let _span = trace_span!(
            "render_batch",
            frames = jobs.len(),
            animation_frames = self.slots.len()
        )
        .entered();

        let assignments = self.assignments(jobs.len());
        let failures = Mutex::new(Vec::new());
        let rendered = AtomicUsize::new(0);
        let record_failure = |job: &FrameJob, error: MosaicError| {
            trace_warn!(
                "frame_failed",
                index = job.index,
                input = &*job.input.to_string_lossy(),
                error = error.to_string().as_str()
            );
            failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(FrameFailure {
                    index: job.index,
                    input: job.input.clone(),
                    error,
                });
        };

        pool.scope(|scope| {
            for (job, &slot_idx) in jobs.iter().zip(&assignments) {
                let ticket = match self.slots[slot_idx].schedule() {
                    Ok(ticket) => ticket,
                    Err(err) => {
                        record_failure(job, err);
                        continue;
                    }
                };
                let rendered = &rendered;
                let record_failure = &record_failure;
                scope.spawn(move |_| match self.render_job(job, ticket) {
                    Ok(()) => {
                        let done = rendered.fetch_add(1, Ordering::Relaxed) + 1;
                        trace_event!("frame_done", index = job.index, rendered = done);
                    }
                    Err(err) => record_failure(job, err),
                });
            }
            for slot in &self.slots {
                slot.close_scheduling();
            }
        });

        let mut failures = failures.into_inner().unwrap_or_else(PoisonError::into_inner);
        failures.sort_by_key(|f| f.index);
        RunReport {
            rendered: rendered.into_inner(),
            failures,
        }
    }

    fn render_job(&self, job: &FrameJob, mut ticket: UseTicket<'_>) -> MosaicResult<()> {
        let frame = self.codec.decode(&job.input)?;
        let mosaic = ticket
            .engine(|source| self.build_engine(source))?
            .process_frame(frame)?;
        drop(ticket);

        let output = match self.config.output_height {
            Some(height) => mosaic.fit_to_height(height)?,
            None => mosaic,
        };
        self.codec.encode(&output, &job.output)
    }

    fn build_engine(&self, source: &Path) -> MosaicResult<QuadtreeEngine> {
        let surface = self.codec.decode(source)?;
        let template = if self.config.normalize_leaf {
            LeafTemplate::normalized(surface)
        } else {
            LeafTemplate::new(surface)
        };
        Ok(
            QuadtreeEngine::new(template, self.config.params, self.config.policy)?
                .with_strategy(self.config.strategy),
        )
    }
}

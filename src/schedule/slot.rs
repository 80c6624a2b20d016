//! Lazily built, use-counted engine slots.
//!
//! A slot owns the engine for one animation frame. The engine is built on the
//! first `UseTicket::engine` call and torn down once scheduling has been closed
//! and every scheduled use has completed. Tickets hold an `Arc` to the engine,
//! and a use only counts as completed after its ticket has released that
//! `Arc`, so teardown never races a job that is still rendering.
//!
//! State transitions:
//! `Unbuilt -> Building -> Ready -> Draining -> Destroyed`, with
//! `Building -> Unbuilt` when the build fails and `Unbuilt -> Destroyed` for
//! slots that were closed without ever being built.

use crate::engine::QuadtreeEngine;
use crate::trace::trace_event;
use crate::util::{MosaicError, MosaicResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lifecycle of a slot's engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SlotState {
    Unbuilt = 0,
    Building = 1,
    Ready = 2,
    /// Scheduling is closed; the engine lives until outstanding uses finish.
    Draining = 3,
    Destroyed = 4,
}

impl SlotState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Unbuilt,
            1 => Self::Building,
            2 => Self::Ready,
            3 => Self::Draining,
            _ => Self::Destroyed,
        }
    }
}

/// Counters for observing a slot's lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotStats {
    /// Engines successfully built.
    pub builds: usize,
    /// Engines torn down.
    pub teardowns: usize,
    /// Uses registered through [`EngineSlot::schedule`].
    pub scheduled: usize,
    /// Tickets dropped.
    pub completed: usize,
}

#[derive(Default)]
struct Ledger {
    engine: Option<Arc<QuadtreeEngine>>,
    scheduled: usize,
    completed: usize,
    closed: bool,
}

/// Engine slot for one animation source frame.
pub struct EngineSlot {
    source: PathBuf,
    state: AtomicU8,
    ledger: Mutex<Ledger>,
    builds: AtomicUsize,
    teardowns: AtomicUsize,
}

impl std::fmt::Debug for EngineSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineSlot")
            .field("source", &self.source)
            .field("state", &self.state())
            .field("stats", &self.stats())
            .finish()
    }
}

impl EngineSlot {
    /// Creates an unbuilt slot for the animation frame at `source`.
    pub fn new(source: PathBuf) -> Self {
        Self {
            source,
            state: AtomicU8::new(SlotState::Unbuilt as u8),
            ledger: Mutex::new(Ledger::default()),
            builds: AtomicUsize::new(0),
            teardowns: AtomicUsize::new(0),
        }
    }

    /// Path of the animation frame this slot builds its engine from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn state(&self) -> SlotState {
        SlotState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn stats(&self) -> SlotStats {
        let ledger = self.lock();
        SlotStats {
            builds: self.builds.load(Ordering::Relaxed),
            teardowns: self.teardowns.load(Ordering::Relaxed),
            scheduled: ledger.scheduled,
            completed: ledger.completed,
        }
    }

    /// Registers one future use of the engine.
    ///
    /// The returned ticket counts as completed when it is dropped, whether or
    /// not it ever obtained the engine.
    pub fn schedule(&self) -> MosaicResult<UseTicket<'_>> {
        let mut ledger = self.lock();
        if ledger.closed {
            return Err(self.retired());
        }
        ledger.scheduled += 1;
        Ok(UseTicket {
            slot: self,
            engine: None,
        })
    }

    /// Declares that no further uses will be scheduled.
    ///
    /// Tears the engine down immediately if every scheduled use has already
    /// completed; otherwise the last completing ticket does it.
    pub fn close_scheduling(&self) {
        let mut ledger = self.lock();
        if ledger.closed {
            return;
        }
        ledger.closed = true;
        if ledger.completed == ledger.scheduled {
            self.retire(&mut ledger);
        } else if ledger.engine.is_some() {
            self.set_state(SlotState::Draining);
        }
    }

    fn acquire(
        &self,
        build: impl FnOnce(&Path) -> MosaicResult<QuadtreeEngine>,
    ) -> MosaicResult<Arc<QuadtreeEngine>> {
        let mut ledger = self.lock();
        if let Some(engine) = &ledger.engine {
            return Ok(Arc::clone(engine));
        }
        if self.state() == SlotState::Destroyed {
            return Err(self.retired());
        }

        // Built under the ledger lock so concurrent first uses wait for one build.
        self.set_state(SlotState::Building);
        let engine = match build(&self.source) {
            Ok(engine) => Arc::new(engine),
            Err(err) => {
                self.set_state(SlotState::Unbuilt);
                return Err(err);
            }
        };
        self.builds.fetch_add(1, Ordering::Relaxed);
        ledger.engine = Some(Arc::clone(&engine));
        self.set_state(if ledger.closed {
            SlotState::Draining
        } else {
            SlotState::Ready
        });
        trace_event!("engine_built", source = &*self.source.to_string_lossy());
        Ok(engine)
    }

    fn complete(&self, engine: Option<Arc<QuadtreeEngine>>) {
        drop(engine);
        let mut ledger = self.lock();
        ledger.completed += 1;
        debug_assert!(ledger.completed <= ledger.scheduled);
        if ledger.closed && ledger.completed == ledger.scheduled {
            self.retire(&mut ledger);
        }
    }

    fn retire(&self, ledger: &mut Ledger) {
        if self.state() == SlotState::Destroyed {
            return;
        }
        if let Some(engine) = ledger.engine.take() {
            debug_assert_eq!(Arc::strong_count(&engine), 1);
            drop(engine);
            self.teardowns.fetch_add(1, Ordering::Relaxed);
            trace_event!(
                "engine_retired",
                source = &*self.source.to_string_lossy()
            );
        }
        self.set_state(SlotState::Destroyed);
    }

    fn set_state(&self, state: SlotState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn retired(&self) -> MosaicError {
        MosaicError::EngineRetired {
            source_path: self.source.display().to_string(),
        }
    }
}

/// One scheduled use of a slot's engine.
#[derive(Debug)]
pub struct UseTicket<'a> {
    slot: &'a EngineSlot,
    engine: Option<Arc<QuadtreeEngine>>,
}

impl UseTicket<'_> {
    /// Returns the slot's engine, building it with `build` if this is the
    /// slot's first use.
    pub fn engine(
        &mut self,
        build: impl FnOnce(&Path) -> MosaicResult<QuadtreeEngine>,
    ) -> MosaicResult<&QuadtreeEngine> {
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => self.slot.acquire(build)?,
        };
        Ok(&**self.engine.insert(engine))
    }
}

impl Drop for UseTicket<'_> {
    fn drop(&mut self) {
        self.slot.complete(self.engine.take());
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineSlot, SlotState};
    use crate::engine::{DecompositionParams, QuadtreeEngine};
    use crate::image::{PixelSurface, RgbColor};
    use crate::policy::SubdivisionPolicy;
    use crate::template::LeafTemplate;
    use crate::util::{MosaicError, MosaicResult};
    use std::path::{Path, PathBuf};

    fn build(_: &Path) -> MosaicResult<QuadtreeEngine> {
        let leaf = PixelSurface::solid(4, 4, 4, RgbColor::WHITE)?;
        QuadtreeEngine::new(
            LeafTemplate::new(leaf),
            DecompositionParams::default(),
            SubdivisionPolicy::Monochrome { threshold: 8 },
        )
    }

    #[test]
    fn engine_outlives_close_until_last_ticket_drops() {
        let slot = EngineSlot::new(PathBuf::from("anim/0.png"));
        let mut first = slot.schedule().unwrap();
        let second = slot.schedule().unwrap();
        assert_eq!(slot.state(), SlotState::Unbuilt);

        first.engine(build).unwrap();
        assert_eq!(slot.state(), SlotState::Ready);

        slot.close_scheduling();
        assert_eq!(slot.state(), SlotState::Draining);

        drop(second);
        assert_eq!(slot.state(), SlotState::Draining);
        assert_eq!(slot.stats().teardowns, 0);

        drop(first);
        assert_eq!(slot.state(), SlotState::Destroyed);
        let stats = slot.stats();
        assert_eq!((stats.builds, stats.teardowns), (1, 1));
        assert_eq!((stats.scheduled, stats.completed), (2, 2));
    }

    #[test]
    fn unused_slot_is_destroyed_without_building() {
        let slot = EngineSlot::new(PathBuf::from("anim/1.png"));
        slot.close_scheduling();
        assert_eq!(slot.state(), SlotState::Destroyed);
        assert_eq!(slot.stats().builds, 0);
        assert!(matches!(
            slot.schedule().unwrap_err(),
            MosaicError::EngineRetired { .. }
        ));
    }

    #[test]
    fn failed_build_returns_to_unbuilt_and_retries() {
        let slot = EngineSlot::new(PathBuf::from("anim/2.png"));
        let mut ticket = slot.schedule().unwrap();
        let err = ticket
            .engine(|_| {
                Err(MosaicError::InvalidParameters {
                    reason: "broken leaf",
                })
            })
            .unwrap_err();
        assert_eq!(
            err,
            MosaicError::InvalidParameters {
                reason: "broken leaf"
            }
        );
        assert_eq!(slot.state(), SlotState::Unbuilt);

        ticket.engine(build).unwrap();
        assert_eq!(slot.stats().builds, 1);
        drop(ticket);
        slot.close_scheduling();
        assert_eq!(slot.state(), SlotState::Destroyed);
    }
}

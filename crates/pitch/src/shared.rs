use std::sync::{Arc, Mutex, PoisonError, Weak};

use kara_lyrics_sync::EnergySource;

use crate::detect::PitchReading;
use crate::error::Result;
use crate::worker::{PitchWorker, WorkerOptions};

#[derive(Default)]
struct Slot {
    worker: Weak<PitchWorker>,
    spawned: u64,
}

/// Hands out handles to one shared [`PitchWorker`].
///
/// Construct once and pass it to whatever needs pitch data. The worker is
/// started by the first [`PitchWorkerPool::acquire`] and stopped when the last
/// handle is dropped; a later `acquire` starts a fresh one.
#[derive(Clone)]
pub struct PitchWorkerPool {
    options: WorkerOptions,
    slot: Arc<Mutex<Slot>>,
}

impl PitchWorkerPool {
    pub fn new(options: WorkerOptions) -> Self {
        Self {
            options,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub fn acquire(&self) -> Result<PitchWorkerHandle> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(worker) = slot.worker.upgrade() {
            return Ok(PitchWorkerHandle::new(worker));
        }

        let worker = Arc::new(PitchWorker::spawn(self.options)?);
        slot.worker = Arc::downgrade(&worker);
        slot.spawned += 1;
        Ok(PitchWorkerHandle::new(worker))
    }

    /// Live handles to the current worker; `0` when it is stopped.
    pub fn handle_count(&self) -> usize {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.worker.strong_count()
    }

    /// Workers started over the pool's lifetime.
    pub fn spawned(&self) -> u64 {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .spawned
    }
}

/// A counted reference to the shared worker.
#[derive(Clone)]
pub struct PitchWorkerHandle {
    worker: Arc<PitchWorker>,
    gain: f32,
}

impl PitchWorkerHandle {
    /// Speech-level RMS sits well below 1; this maps it onto the same
    /// `[0, 1]` scale as precomputed envelopes.
    pub const DEFAULT_GAIN: f32 = 4.0;

    fn new(worker: Arc<PitchWorker>) -> Self {
        Self {
            worker,
            gain: Self::DEFAULT_GAIN,
        }
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    pub fn push(&self, samples: Vec<f32>) -> Result<()> {
        self.worker.push(samples)
    }

    pub fn latest(&self) -> Option<PitchReading> {
        self.worker.latest()
    }

    pub fn same_worker(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.worker, &other.worker)
    }
}

impl EnergySource for PitchWorkerHandle {
    /// Live energy ignores the playback time: it is whatever was sung last.
    fn energy_at(&self, _time_s: f64) -> Option<f32> {
        let reading = self.latest()?;
        Some((reading.rms * self.gain).clamp(0.0, 1.0))
    }
}

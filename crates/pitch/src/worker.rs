use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::detect::{PitchDetector, PitchReading};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkerOptions {
    pub sample_rate: u32,
    /// Samples per analysis frame.
    pub frame_len: usize,
    /// Chunks queued beyond this are dropped rather than blocking the caller.
    pub queue_depth: usize,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            frame_len: 1024,
            queue_depth: 32,
        }
    }
}

/// Pitch detection on a dedicated thread.
///
/// Audio goes in through [`PitchWorker::push`], which never blocks; the most
/// recent reading is always available from [`PitchWorker::latest`]. Readers
/// never wait on the analysis.
pub struct PitchWorker {
    audio_tx: mpsc::Sender<Vec<f32>>,
    readings: watch::Receiver<Option<PitchReading>>,
    cancellation_token: CancellationToken,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl PitchWorker {
    pub fn spawn(options: WorkerOptions) -> Result<Self> {
        let detector = PitchDetector::new(options.sample_rate, options.frame_len)?;
        let (audio_tx, audio_rx) = mpsc::channel::<Vec<f32>>(options.queue_depth.max(1));
        let (reading_tx, readings) = watch::channel(None);
        let cancellation_token = CancellationToken::new();
        let worker_token = cancellation_token.clone();

        let handle = std::thread::Builder::new()
            .name("pitch-worker".into())
            .spawn(move || {
                run_pitch_worker(detector, options.frame_len, audio_rx, reading_tx, worker_token);
            })?;

        tracing::info!(
            sample_rate = options.sample_rate,
            frame_len = options.frame_len,
            "pitch_worker_started"
        );
        Ok(Self {
            audio_tx,
            readings,
            cancellation_token,
            handle: Some(handle),
        })
    }

    /// Queue mono samples for analysis. A full queue drops the chunk.
    pub fn push(&self, samples: Vec<f32>) -> Result<()> {
        match self.audio_tx.try_send(samples) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::debug!("pitch_chunk_dropped");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(Error::WorkerClosed),
        }
    }

    /// `None` until the first full frame has been analysed.
    pub fn latest(&self) -> Option<PitchReading> {
        *self.readings.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PitchReading>> {
        self.readings.clone()
    }

    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }
}

impl Drop for PitchWorker {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
        if let Some(handle) = self.handle.take() {
            std::thread::spawn(move || {
                if let Err(panic) = handle.join() {
                    tracing::error!(?panic, "pitch_worker_panicked");
                }
            });
        }
        tracing::info!("pitch_worker_stopped");
    }
}

fn run_pitch_worker(
    detector: PitchDetector,
    frame_len: usize,
    mut audio_rx: mpsc::Receiver<Vec<f32>>,
    reading_tx: watch::Sender<Option<PitchReading>>,
    cancellation_token: CancellationToken,
) {
    let mut buffer: Vec<f32> = Vec::with_capacity(frame_len * 2);

    while let Some(samples) = audio_rx.blocking_recv() {
        if cancellation_token.is_cancelled() {
            break;
        }

        buffer.extend_from_slice(&samples);

        // Only the newest complete frame matters to readers.
        let complete = buffer.len() / frame_len * frame_len;
        if complete == 0 {
            continue;
        }
        let frame = &buffer[complete - frame_len..complete];
        reading_tx.send_replace(Some(detector.detect(frame)));
        buffer.drain(..complete);
    }
}

mod detect;
mod error;
mod shared;
mod worker;

pub use detect::{PitchDetector, PitchReading, rms};
pub use error::{Error, Result};
pub use shared::{PitchWorkerHandle, PitchWorkerPool};
pub use worker::{PitchWorker, WorkerOptions};

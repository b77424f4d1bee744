pub mod config;
pub mod energy;
pub mod engine;
pub mod error;
pub mod id;
pub mod locator;
pub mod lyrics;
pub mod offset;
pub mod scroll;
pub mod session;
pub mod smoother;
pub mod stabilizer;
pub mod types;

pub use config::{Config, EnergyConfig, ScrollConfig, SyncConfig};
pub use energy::{EnergyEnvelope, EnergyReadout, EnergySampler, EnergySource};
pub use engine::SyncEngine;
pub use error::{Error, Result};
pub use id::{IdGenerator, SequentialIdGen, UuidIdGen};
pub use locator::Locator;
pub use lyrics::Lyrics;
pub use offset::Offset;
pub use scroll::{AutoScrollController, LineLayout, ScrollCommand, ScrollMode, Spring};
pub use session::{FrameInput, FrameOutput, KaraokeSession, TrackData};
pub use smoother::ProgressSmoother;
pub use stabilizer::{Stabilized, WordStabilizer};
pub use types::{DisplayMode, LyricLine, LyricWord, PlaybackTick, SyncState};

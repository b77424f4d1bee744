mod client;
mod error;
mod loader;
mod offset;
mod transport;
mod types;

pub use client::KaraokeClient;
pub use error::Error;
pub use loader::{OffsetKey, TrackLoader, TrackRequest};
pub use offset::{DEFAULT_OFFSET_DEBOUNCE, OffsetWriter};
pub use transport::ReqwestHttp;
pub use types::*;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    #[error("frame length {frame_len} cannot resolve {min_hz} Hz at {sample_rate} Hz")]
    FrameTooShort {
        frame_len: usize,
        min_hz: f32,
        sample_rate: u32,
    },

    #[error("failed to spawn pitch worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("pitch worker has stopped")]
    WorkerClosed,
}

pub type Result<T> = std::result::Result<T, Error>;

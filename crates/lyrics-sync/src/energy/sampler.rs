use ringbuf::HeapRb;
use ringbuf::traits::{Consumer, Observer, RingBuffer};

use super::EnergySource;
use crate::config::EnergyConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct EnergyReadout {
    pub raw: f32,
    pub smoothed: f32,
    /// No source was available; both values are zero.
    pub idle: bool,
}

impl EnergyReadout {
    pub const IDLE: Self = Self {
        raw: 0.0,
        smoothed: 0.0,
        idle: true,
    };
}

/// Rate-capped energy readout with a fixed-size smoothed history.
///
/// The sampler reads its source at most once per sample interval, measured
/// from the last accepted sample rather than from a fixed grid, so a stalled
/// host loses samples instead of catching up on them.
pub struct EnergySampler {
    interval_ms: f64,
    alpha: f32,
    last_sample_ms: Option<f64>,
    readout: EnergyReadout,
    history: HeapRb<f32>,
}

impl EnergySampler {
    pub fn new(config: &EnergyConfig) -> Self {
        Self {
            interval_ms: config.sample_interval_ms(),
            alpha: config.smoothing_alpha,
            last_sample_ms: None,
            readout: EnergyReadout::IDLE,
            history: HeapRb::new(config.history_len.max(1)),
        }
    }

    pub fn readout(&self) -> EnergyReadout {
        self.readout
    }

    /// Smoothed samples, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().copied()
    }

    pub fn history_len(&self) -> usize {
        self.history.occupied_len()
    }

    pub fn reset(&mut self) {
        self.last_sample_ms = None;
        self.readout = EnergyReadout::IDLE;
        self.history.clear();
    }

    /// Returns the new readout when a sample was taken this frame.
    pub fn tick(
        &mut self,
        now_ms: f64,
        playback_time_s: f64,
        source: Option<&dyn EnergySource>,
    ) -> Option<EnergyReadout> {
        if self
            .last_sample_ms
            .is_some_and(|last| now_ms - last < self.interval_ms)
        {
            return None;
        }
        self.last_sample_ms = Some(now_ms);

        let Some(raw) = source.and_then(|s| s.energy_at(playback_time_s)) else {
            self.readout = EnergyReadout::IDLE;
            return Some(self.readout);
        };

        let previous = if self.readout.idle {
            0.0
        } else {
            self.readout.smoothed
        };
        let smoothed = self.alpha * raw + (1.0 - self.alpha) * previous;
        self.history.push_overwrite(smoothed);
        self.readout = EnergyReadout {
            raw,
            smoothed,
            idle: false,
        };
        Some(self.readout)
    }
}

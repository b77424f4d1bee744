mod sampler;

pub use sampler::{EnergyReadout, EnergySampler};

/// Anything that can report vocal energy in `[0, 1]` at a playback time.
///
/// `None` means the source has nothing to say (not loaded, failed, empty);
/// the sampler then reports an idle state.
pub trait EnergySource {
    fn energy_at(&self, time_s: f64) -> Option<f32>;
}

/// Precomputed low-rate vocal-energy series for one track.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnergyEnvelope {
    pub values: Vec<f32>,
    pub sample_rate_hz: f64,
    pub duration_seconds: f64,
}

impl EnergyEnvelope {
    /// O(1) lookup at `floor(t · rate)`, clamped to the ends of the series.
    /// Returns `0.0` for an empty or unusable envelope.
    pub fn energy_at_time(&self, time_s: f64) -> f32 {
        self.energy_at(time_s).unwrap_or(0.0)
    }

    fn index_at(&self, time_s: f64) -> Option<usize> {
        let last = self.values.len().checked_sub(1)?;
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) || time_s.is_nan() {
            return None;
        }
        let raw = (time_s * self.sample_rate_hz).floor();
        Some(if raw <= 0.0 {
            0
        } else {
            (raw as usize).min(last)
        })
    }
}

impl EnergySource for EnergyEnvelope {
    fn energy_at(&self, time_s: f64) -> Option<f32> {
        let value = self.values[self.index_at(time_s)?];
        Some(if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn envelope() -> EnergyEnvelope {
        EnergyEnvelope {
            values: vec![0.1, 0.5, 0.9],
            sample_rate_hz: 1.0,
            duration_seconds: 3.0,
        }
    }

    #[test]
    fn lookup_scenario() {
        let env = envelope();
        assert_relative_eq!(env.energy_at_time(0.4), 0.1);
        assert_relative_eq!(env.energy_at_time(1.4), 0.5);
        assert_relative_eq!(env.energy_at_time(10.0), 0.9);
        assert_relative_eq!(env.energy_at_time(-1.0), 0.1);
    }

    #[test]
    fn empty_envelope_is_silent() {
        let env = EnergyEnvelope::default();
        assert_eq!(env.energy_at(1.0), None);
        assert_relative_eq!(env.energy_at_time(1.0), 0.0);
    }

    #[test]
    fn zero_rate_is_unusable() {
        let env = EnergyEnvelope {
            sample_rate_hz: 0.0,
            ..envelope()
        };
        assert_eq!(env.energy_at(1.0), None);
    }

    #[test]
    fn deserializes_backend_fields() {
        let env: EnergyEnvelope = serde_json::from_str(
            r#"{"values":[0.0,1.0],"sample_rate_hz":20,"duration_seconds":0.1}"#,
        )
        .unwrap();
        assert_eq!(env.values.len(), 2);
        assert_relative_eq!(env.sample_rate_hz, 20.0);
    }

    #[quickcheck_macros::quickcheck]
    fn prop_lookup_stays_in_unit_range(values: Vec<f32>, t: f64) -> bool {
        let env = EnergyEnvelope {
            values,
            sample_rate_hz: 20.0,
            duration_seconds: 0.0,
        };
        match env.energy_at(t) {
            Some(v) => (0.0..=1.0).contains(&v),
            None => env.values.is_empty() || t.is_nan(),
        }
    }
}

use crate::error::{Error, Result};

/// Frames quieter than this are reported unvoiced without running the
/// autocorrelation.
const SILENCE_RMS: f32 = 0.01;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PitchReading {
    /// `None` when the frame is silent or has no clear period.
    pub frequency_hz: Option<f32>,
    /// Normalized autocorrelation at the chosen lag, in `[-1, 1]`.
    pub clarity: f32,
    pub rms: f32,
}

pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

/// Time-domain pitch estimate by normalized autocorrelation.
#[derive(Debug, Clone)]
pub struct PitchDetector {
    sample_rate: u32,
    min_lag: usize,
    max_lag: usize,
    clarity_threshold: f32,
}

impl PitchDetector {
    pub const MIN_HZ: f32 = 80.0;
    pub const MAX_HZ: f32 = 1000.0;
    pub const DEFAULT_CLARITY: f32 = 0.6;

    /// `frame_len` is the number of samples each [`PitchDetector::detect`]
    /// call will see; it must cover at least two periods of the lowest
    /// detectable frequency.
    pub fn new(sample_rate: u32, frame_len: usize) -> Result<Self> {
        if sample_rate < (Self::MAX_HZ as u32) * 2 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        let min_lag = (sample_rate as f32 / Self::MAX_HZ).floor() as usize;
        let max_lag = (sample_rate as f32 / Self::MIN_HZ).ceil() as usize;
        if frame_len < max_lag * 2 {
            return Err(Error::FrameTooShort {
                frame_len,
                min_hz: Self::MIN_HZ,
                sample_rate,
            });
        }

        Ok(Self {
            sample_rate,
            min_lag: min_lag.max(1),
            max_lag,
            clarity_threshold: Self::DEFAULT_CLARITY,
        })
    }

    pub fn with_clarity_threshold(mut self, threshold: f32) -> Self {
        self.clarity_threshold = threshold;
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn detect(&self, frame: &[f32]) -> PitchReading {
        let rms = rms(frame);
        if !rms.is_finite() || rms < SILENCE_RMS {
            return PitchReading {
                rms: if rms.is_finite() { rms } else { 0.0 },
                ..Default::default()
            };
        }

        let max_lag = self.max_lag.min(frame.len().saturating_sub(1));
        if max_lag <= self.min_lag {
            return PitchReading {
                rms,
                ..Default::default()
            };
        }

        // Indexed by lag; lags below `min_lag` are only used to find the end
        // of the zero-lag lobe.
        let corr: Vec<f32> = (0..=max_lag)
            .map(|lag| normalized_autocorrelation(frame, lag))
            .collect();

        let Some(lag) = pick_period(&corr, self.min_lag) else {
            return PitchReading {
                rms,
                ..Default::default()
            };
        };
        let clarity = corr[lag];
        if clarity < self.clarity_threshold {
            return PitchReading {
                clarity,
                rms,
                frequency_hz: None,
            };
        }

        let refined = refine_lag(&corr, lag);
        PitchReading {
            frequency_hz: Some(self.sample_rate as f32 / refined),
            clarity,
            rms,
        }
    }
}

fn normalized_autocorrelation(frame: &[f32], lag: usize) -> f32 {
    let (head, tail) = (&frame[..frame.len() - lag], &frame[lag..]);
    let mut cross = 0.0f32;
    let mut energy_head = 0.0f32;
    let mut energy_tail = 0.0f32;
    for (a, b) in head.iter().zip(tail) {
        cross += a * b;
        energy_head += a * a;
        energy_tail += b * b;
    }
    let norm = (energy_head * energy_tail).sqrt();
    if norm > 0.0 { cross / norm } else { 0.0 }
}

/// Lag of the fundamental period, no shorter than `min_lag`.
///
/// Skips the lobe around zero lag, then takes the first lag reaching 90% of
/// the highest remaining correlation and climbs to its local peak. Taking the
/// first strong peak rather than the highest one avoids octave errors at
/// multiples of the period.
fn pick_period(corr: &[f32], min_lag: usize) -> Option<usize> {
    let lobe_end = corr.iter().position(|&r| r < 0.0)?;
    let start = lobe_end.max(min_lag);
    let search = corr.get(start..)?;
    let max = search.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max <= 0.0 {
        return None;
    }

    let mut lag = start + search.iter().position(|&r| r >= 0.9 * max)?;
    while lag + 1 < corr.len() && corr[lag + 1] > corr[lag] {
        lag += 1;
    }
    Some(lag)
}

/// Parabolic interpolation of the peak at `lag`.
fn refine_lag(corr: &[f32], lag: usize) -> f32 {
    let fallback = lag as f32;
    if lag == 0 || lag + 1 >= corr.len() {
        return fallback;
    }
    let (a, b, c) = (corr[lag - 1], corr[lag], corr[lag + 1]);
    let denom = a - 2.0 * b + c;
    if denom.abs() < f32::EPSILON {
        return fallback;
    }
    let shift = 0.5 * (a - c) / denom;
    if shift.is_finite() && shift.abs() <= 0.5 {
        fallback + shift
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const RATE: u32 = 16_000;
    const FRAME: usize = 1024;

    fn sine(freq: f32, amplitude: f32) -> Vec<f32> {
        (0..FRAME)
            .map(|i| {
                let t = i as f32 / RATE as f32;
                amplitude * (2.0 * std::f32::consts::PI * freq * t).sin()
            })
            .collect()
    }

    fn detector() -> PitchDetector {
        PitchDetector::new(RATE, FRAME).unwrap()
    }

    #[test]
    fn detects_a3() {
        let reading = detector().detect(&sine(220.0, 0.5));
        let hz = reading.frequency_hz.unwrap();
        assert!((hz - 220.0).abs() / 220.0 < 0.02, "detected {hz}");
        assert!(reading.clarity > 0.9);
    }

    #[test]
    fn detects_range_edges() {
        for freq in [90.0, 440.0, 880.0] {
            let hz = detector().detect(&sine(freq, 0.5)).frequency_hz.unwrap();
            assert!((hz - freq).abs() / freq < 0.02, "{freq} detected as {hz}");
        }
    }

    #[test]
    fn harmonics_do_not_cause_octave_errors() {
        let frame: Vec<f32> = sine(200.0, 0.4)
            .into_iter()
            .zip(sine(400.0, 0.3))
            .zip(sine(600.0, 0.2))
            .map(|((a, b), c)| a + b + c)
            .collect();
        let hz = detector().detect(&frame).frequency_hz.unwrap();
        assert!((hz - 200.0).abs() / 200.0 < 0.02, "detected {hz}");
    }

    #[test]
    fn silence_is_unvoiced() {
        let reading = detector().detect(&vec![0.0; FRAME]);
        assert_eq!(reading.frequency_hz, None);
        assert_eq!(reading.rms, 0.0);
    }

    #[test]
    fn noise_has_no_clear_period() {
        // xorshift, so the test is deterministic
        let mut state = 0x2545_f491u32;
        let noise: Vec<f32> = (0..FRAME)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as f32 / u32::MAX as f32 - 0.5
            })
            .collect();
        assert_eq!(detector().detect(&noise).frequency_hz, None);
    }

    #[test]
    fn rms_of_sine() {
        assert_relative_eq!(
            rms(&sine(250.0, 1.0)),
            std::f32::consts::FRAC_1_SQRT_2,
            epsilon = 1e-2
        );
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn rejects_unusable_setup() {
        assert!(matches!(
            PitchDetector::new(1000, FRAME),
            Err(Error::InvalidSampleRate(1000))
        ));
        assert!(matches!(
            PitchDetector::new(RATE, 128),
            Err(Error::FrameTooShort { .. })
        ));
    }

    #[quickcheck_macros::quickcheck]
    fn prop_never_panics(samples: Vec<f32>) -> bool {
        let range = PitchDetector::MIN_HZ * 0.9..=PitchDetector::MAX_HZ * 1.1;
        detector()
            .detect(&samples)
            .frequency_hz
            .is_none_or(|hz| range.contains(&hz))
    }
}

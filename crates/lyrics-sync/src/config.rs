use serde::Deserialize;

use crate::error::{Error, Result};

/// Tunables for every component of the sync core.
///
/// All sections default independently, so a config file only needs to name
/// the values it overrides:
///
/// ```json
/// { "sync": { "word_dwell_ms": 120 }, "scroll": { "reduced_motion": true } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub scroll: ScrollConfig,
    pub energy: EnergyConfig,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.sync.validate()?;
        self.scroll.validate()?;
        self.energy.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Sequences shorter than this are searched linearly.
    pub linear_scan_threshold: usize,
    /// Span given to the last line when it carries no `end_time`.
    pub default_line_duration_s: f64,
    /// How long a one-word advance must be observed before it is committed.
    pub word_dwell_ms: f64,
    /// EMA weight of the newest word-progress sample.
    pub progress_alpha: f64,
    /// Offsets are clamped into `[-offset_range_s, offset_range_s]`.
    pub offset_range_s: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            linear_scan_threshold: 20,
            default_line_duration_s: 10.0,
            word_dwell_ms: 80.0,
            progress_alpha: 0.3,
            offset_range_s: 300.0,
        }
    }
}

impl SyncConfig {
    fn validate(&self) -> Result<()> {
        ensure(
            self.default_line_duration_s > 0.0,
            "sync.default_line_duration_s",
            "must be positive",
        )?;
        ensure(
            self.word_dwell_ms >= 0.0,
            "sync.word_dwell_ms",
            "must not be negative",
        )?;
        ensure(
            unit_alpha(self.progress_alpha),
            "sync.progress_alpha",
            "must be in (0, 1]",
        )?;
        ensure(
            self.offset_range_s >= 0.0,
            "sync.offset_range_s",
            "must not be negative",
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Scroll events this soon after a programmatic scroll are our own.
    pub programmatic_grace_ms: f64,
    /// Quiet period after the last user scroll before auto-scroll resumes.
    pub manual_quiet_ms: f64,
    /// Minimum age of a line change before it is scrolled to.
    pub line_change_debounce_ms: f64,
    /// Where the active line is pinned, as a fraction of viewport height.
    pub anchor_fraction: f64,
    pub spring_mass: f64,
    pub spring_stiffness: f64,
    /// `None` derives the critical damping `2·√(k·m)`.
    pub spring_damping: Option<f64>,
    /// Distance and speed under which the spring snaps to rest.
    pub settle_epsilon: f64,
    /// Upper bound on the integration step after a stalled frame.
    pub max_step_ms: f64,
    pub reduced_motion: bool,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            programmatic_grace_ms: 500.0,
            manual_quiet_ms: 3000.0,
            line_change_debounce_ms: 50.0,
            anchor_fraction: 0.3,
            spring_mass: 1.0,
            spring_stiffness: 170.0,
            spring_damping: None,
            settle_epsilon: 0.5,
            max_step_ms: 64.0,
            reduced_motion: false,
        }
    }
}

impl ScrollConfig {
    pub fn spring_damping(&self) -> f64 {
        self.spring_damping
            .unwrap_or_else(|| 2.0 * (self.spring_stiffness * self.spring_mass).sqrt())
    }

    fn validate(&self) -> Result<()> {
        ensure(
            (0.0..=1.0).contains(&self.anchor_fraction),
            "scroll.anchor_fraction",
            "must be in [0, 1]",
        )?;
        ensure(
            self.spring_mass > 0.0,
            "scroll.spring_mass",
            "must be positive",
        )?;
        ensure(
            self.spring_stiffness > 0.0,
            "scroll.spring_stiffness",
            "must be positive",
        )?;
        ensure(
            self.spring_damping.is_none_or(|d| d >= 0.0),
            "scroll.spring_damping",
            "must not be negative",
        )?;
        ensure(
            self.settle_epsilon > 0.0,
            "scroll.settle_epsilon",
            "must be positive",
        )?;
        ensure(
            self.max_step_ms > 0.0,
            "scroll.max_step_ms",
            "must be positive",
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Upper bound on how often the sampler reads the source.
    pub sample_rate_hz: f64,
    pub smoothing_alpha: f32,
    /// Ring-buffer capacity for the waveform history.
    pub history_len: usize,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 30.0,
            smoothing_alpha: 0.15,
            history_len: 64,
        }
    }
}

impl EnergyConfig {
    pub fn sample_interval_ms(&self) -> f64 {
        1000.0 / self.sample_rate_hz
    }

    fn validate(&self) -> Result<()> {
        ensure(
            self.sample_rate_hz > 0.0,
            "energy.sample_rate_hz",
            "must be positive",
        )?;
        ensure(
            unit_alpha(f64::from(self.smoothing_alpha)),
            "energy.smoothing_alpha",
            "must be in (0, 1]",
        )?;
        ensure(
            self.history_len > 0,
            "energy.history_len",
            "must be positive",
        )
    }
}

fn unit_alpha(alpha: f64) -> bool {
    alpha > 0.0 && alpha <= 1.0
}

fn ensure(ok: bool, field: &'static str, reason: &'static str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidConfig { field, reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let config =
            Config::from_json(r#"{"sync":{"word_dwell_ms":120},"scroll":{"reduced_motion":true}}"#)
                .unwrap();
        assert_relative_eq!(config.sync.word_dwell_ms, 120.0);
        assert_relative_eq!(config.sync.progress_alpha, 0.3);
        assert!(config.scroll.reduced_motion);
        assert_eq!(config.energy, EnergyConfig::default());
    }

    #[test]
    fn rejects_out_of_range_alpha() {
        let err = Config::from_json(r#"{"sync":{"progress_alpha":0}}"#).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfig {
                field: "sync.progress_alpha",
                ..
            }
        ));
    }

    #[test]
    fn damping_defaults_to_critical() {
        let scroll = ScrollConfig {
            spring_mass: 2.0,
            spring_stiffness: 50.0,
            ..Default::default()
        };
        assert_relative_eq!(scroll.spring_damping(), 20.0);
    }

    #[test]
    fn sample_interval_follows_rate() {
        assert_relative_eq!(EnergyConfig::default().sample_interval_ms(), 1000.0 / 30.0);
    }
}

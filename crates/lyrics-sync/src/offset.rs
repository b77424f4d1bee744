/// User-adjustable lyric offset in seconds, added to the raw playback time
/// before lookup. Always within `[-range, range]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offset {
    seconds: f64,
    range: f64,
}

impl Offset {
    pub fn new(seconds: f64, range: f64) -> Self {
        let mut offset = Self {
            seconds: 0.0,
            range: range.abs(),
        };
        offset.set(seconds);
        offset
    }

    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    /// Non-finite input resets the offset to zero.
    pub fn set(&mut self, seconds: f64) -> f64 {
        self.seconds = if seconds.is_finite() {
            seconds.clamp(-self.range, self.range)
        } else {
            0.0
        };
        self.seconds
    }

    pub fn adjust(&mut self, delta: f64) -> f64 {
        self.set(self.seconds + delta)
    }

    pub fn apply(&self, playback_time_s: f64) -> f64 {
        playback_time_s + self.seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn clamps_into_range() {
        let mut offset = Offset::new(500.0, 300.0);
        assert_relative_eq!(offset.seconds(), 300.0);
        assert_relative_eq!(offset.set(-301.0), -300.0);
    }

    #[test]
    fn adjust_accumulates() {
        let mut offset = Offset::new(0.0, 300.0);
        offset.adjust(0.25);
        offset.adjust(0.25);
        assert_relative_eq!(offset.seconds(), 0.5);
        assert_relative_eq!(offset.apply(10.0), 10.5);
    }

    #[test]
    fn non_finite_resets_to_zero() {
        let mut offset = Offset::new(1.0, 300.0);
        assert_relative_eq!(offset.set(f64::NAN), 0.0);
    }
}

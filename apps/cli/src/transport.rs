use std::time::Instant;

/// A wall-clock playback position standing in for a media element.
///
/// Position is `anchor_s` plus the time elapsed since `anchor_at` while
/// playing; every state change re-anchors.
#[derive(Debug, Clone)]
pub struct Transport {
    anchor_s: f64,
    anchor_at: Instant,
    playing: bool,
    duration_s: f64,
}

impl Transport {
    pub fn new(duration_s: f64, now: Instant) -> Self {
        Self {
            anchor_s: 0.0,
            anchor_at: now,
            playing: false,
            duration_s: duration_s.max(0.0),
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration_s
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self, now: Instant) -> f64 {
        let elapsed = if self.playing {
            now.saturating_duration_since(self.anchor_at).as_secs_f64()
        } else {
            0.0
        };
        (self.anchor_s + elapsed).min(self.duration_s)
    }

    pub fn play(&mut self, now: Instant) {
        if self.at_end(now) {
            self.anchor_s = 0.0;
        } else {
            self.anchor_s = self.position(now);
        }
        self.anchor_at = now;
        self.playing = true;
    }

    pub fn pause(&mut self, now: Instant) {
        self.anchor_s = self.position(now);
        self.anchor_at = now;
        self.playing = false;
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.playing {
            self.pause(now);
        } else {
            self.play(now);
        }
    }

    pub fn seek(&mut self, now: Instant, delta_s: f64) {
        self.anchor_s = (self.position(now) + delta_s).clamp(0.0, self.duration_s);
        self.anchor_at = now;
    }

    pub fn seek_to(&mut self, now: Instant, position_s: f64) {
        self.anchor_s = position_s.clamp(0.0, self.duration_s);
        self.anchor_at = now;
    }

    pub fn at_end(&self, now: Instant) -> bool {
        self.position(now) >= self.duration_s
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_relative_eq;

    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn advances_only_while_playing() {
        let t0 = Instant::now();
        let mut transport = Transport::new(60.0, t0);
        assert_eq!(transport.position(t0 + secs(5.0)), 0.0);

        transport.play(t0);
        assert_relative_eq!(transport.position(t0 + secs(2.5)), 2.5, epsilon = 1e-6);

        transport.pause(t0 + secs(3.0));
        assert_relative_eq!(transport.position(t0 + secs(10.0)), 3.0, epsilon = 1e-6);
    }

    #[test]
    fn seek_clamps_to_track() {
        let t0 = Instant::now();
        let mut transport = Transport::new(20.0, t0);
        transport.seek(t0, -5.0);
        assert_eq!(transport.position(t0), 0.0);
        transport.seek(t0, 50.0);
        assert_eq!(transport.position(t0), 20.0);
        assert!(transport.at_end(t0));
    }

    #[test]
    fn play_at_end_restarts() {
        let t0 = Instant::now();
        let mut transport = Transport::new(10.0, t0);
        transport.play(t0);
        let later = t0 + secs(12.0);
        assert!(transport.at_end(later));

        transport.pause(later);
        transport.play(later);
        assert_relative_eq!(transport.position(later + secs(1.0)), 1.0, epsilon = 1e-6);
    }
}

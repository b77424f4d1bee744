//! Turns the locator's raw word index into one that only ever moves forward,
//! one word at a time.
//!
//! Word timestamps come from transcription and are noisy: the raw index can
//! flicker between neighbours, regress, or leap several words at once. Rules,
//! evaluated once per frame:
//!
//! 1. A line change (forward *or* backward) commits word `0` and clears all
//!    hysteresis, whatever the raw index says. A backward line change is how
//!    a seek shows up at this layer, so it is a reset, never noise.
//! 2. Raw equal to committed: keep it and drop any pending advance.
//! 3. Raw below committed (or before the first word): ignored. The pending
//!    advance is dropped since it was not observed continuously.
//! 4. Raw exactly one ahead: commit once it has been observed continuously
//!    for the dwell time.
//! 5. Raw further ahead: commit exactly one step now and drop the pending
//!    advance.

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    index: usize,
    since_ms: f64,
}

/// Result of one stabilizer evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stabilized {
    pub index: Option<usize>,
    /// `true` when this evaluation committed a new index, including the reset
    /// to `0` on line entry. Progress smoothing restarts on every change.
    pub changed: bool,
}

#[derive(Debug, Clone)]
pub struct WordStabilizer {
    dwell_ms: f64,
    line: Option<usize>,
    committed: Option<usize>,
    pending: Option<Pending>,
}

impl WordStabilizer {
    pub fn new(dwell_ms: f64) -> Self {
        Self {
            dwell_ms,
            line: None,
            committed: None,
            pending: None,
        }
    }

    pub fn committed(&self) -> Option<usize> {
        self.committed
    }

    pub fn reset(&mut self) {
        self.line = None;
        self.committed = None;
        self.pending = None;
    }

    /// `word_count` is the number of timed words in `line`; `raw` is the
    /// locator's answer for that line at this frame.
    pub fn evaluate(
        &mut self,
        line: Option<usize>,
        word_count: usize,
        raw: Option<usize>,
        now_ms: f64,
    ) -> Stabilized {
        if line != self.line {
            self.line = line;
            self.pending = None;
            self.committed = line.filter(|_| word_count > 0).map(|_| 0);
            return Stabilized {
                index: self.committed,
                changed: true,
            };
        }

        let Some(committed) = self.committed else {
            return self.hold();
        };

        let raw = match raw {
            Some(raw) if raw >= committed => raw.min(word_count.saturating_sub(1)),
            _ => {
                self.pending = None;
                return self.hold();
            }
        };

        if raw == committed {
            self.pending = None;
            return self.hold();
        }

        if raw > committed + 1 {
            tracing::debug!(from = committed, raw, "lyrics_word_skip_capped");
            return self.commit(committed + 1);
        }

        let since_ms = match self.pending {
            Some(pending) if pending.index == raw => pending.since_ms,
            _ => {
                self.pending = Some(Pending {
                    index: raw,
                    since_ms: now_ms,
                });
                now_ms
            }
        };

        if now_ms - since_ms >= self.dwell_ms {
            self.commit(raw)
        } else {
            self.hold()
        }
    }

    fn commit(&mut self, index: usize) -> Stabilized {
        self.committed = Some(index);
        self.pending = None;
        Stabilized {
            index: self.committed,
            changed: true,
        }
    }

    fn hold(&self) -> Stabilized {
        Stabilized {
            index: self.committed,
            changed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen};

    const DWELL: f64 = 80.0;

    #[test]
    fn dwell_suppresses_single_frame_flicker() {
        // Line with words [0, 500) and [500, 1000).
        let mut stabilizer = WordStabilizer::new(DWELL);
        assert_eq!(stabilizer.evaluate(Some(0), 2, Some(0), 0.0).index, Some(0));
        assert_eq!(stabilizer.evaluate(Some(0), 2, Some(0), 480.0).index, Some(0));
        assert_eq!(stabilizer.evaluate(Some(0), 2, Some(1), 520.0).index, Some(0));
        assert_eq!(stabilizer.evaluate(Some(0), 2, Some(0), 560.0).index, Some(0));
        // The candidate must be re-observed for a full dwell after reverting.
        assert_eq!(stabilizer.evaluate(Some(0), 2, Some(1), 580.0).index, Some(0));
        assert_eq!(stabilizer.evaluate(Some(0), 2, Some(1), 640.0).index, Some(0));
    }

    #[test]
    fn advance_commits_after_dwell() {
        let mut stabilizer = WordStabilizer::new(DWELL);
        stabilizer.evaluate(Some(0), 3, Some(0), 0.0);
        assert!(!stabilizer.evaluate(Some(0), 3, Some(1), 500.0).changed);
        assert!(!stabilizer.evaluate(Some(0), 3, Some(1), 579.0).changed);
        let committed = stabilizer.evaluate(Some(0), 3, Some(1), 580.0);
        assert_eq!(committed, Stabilized { index: Some(1), changed: true });
    }

    #[test]
    fn zero_dwell_commits_on_first_observation() {
        let mut stabilizer = WordStabilizer::new(0.0);
        stabilizer.evaluate(Some(0), 3, Some(0), 0.0);
        assert_eq!(stabilizer.evaluate(Some(0), 3, Some(1), 10.0).index, Some(1));
    }

    #[test]
    fn never_moves_backward_within_line() {
        let mut stabilizer = WordStabilizer::new(0.0);
        stabilizer.evaluate(Some(0), 4, Some(0), 0.0);
        stabilizer.evaluate(Some(0), 4, Some(1), 10.0);
        stabilizer.evaluate(Some(0), 4, Some(2), 20.0);
        assert_eq!(stabilizer.evaluate(Some(0), 4, Some(0), 30.0).index, Some(2));
        assert_eq!(stabilizer.evaluate(Some(0), 4, None, 40.0).index, Some(2));
    }

    #[test]
    fn skip_is_capped_to_one_step() {
        let mut stabilizer = WordStabilizer::new(DWELL);
        stabilizer.evaluate(Some(0), 6, Some(0), 0.0);
        let first = stabilizer.evaluate(Some(0), 6, Some(4), 10.0);
        assert_eq!(first, Stabilized { index: Some(1), changed: true });
        let second = stabilizer.evaluate(Some(0), 6, Some(4), 20.0);
        assert_eq!(second.index, Some(2));
    }

    #[test]
    fn line_entry_forces_word_zero() {
        let mut stabilizer = WordStabilizer::new(DWELL);
        stabilizer.evaluate(Some(0), 3, Some(0), 0.0);
        stabilizer.evaluate(Some(0), 3, Some(2), 10.0);
        let entered = stabilizer.evaluate(Some(1), 5, Some(3), 20.0);
        assert_eq!(entered, Stabilized { index: Some(0), changed: true });
    }

    #[test]
    fn backward_line_change_resets_like_a_seek() {
        let mut stabilizer = WordStabilizer::new(0.0);
        stabilizer.evaluate(Some(3), 4, Some(0), 0.0);
        stabilizer.evaluate(Some(3), 4, Some(1), 10.0);
        stabilizer.evaluate(Some(3), 4, Some(2), 20.0);
        let seeked = stabilizer.evaluate(Some(1), 4, Some(3), 30.0);
        assert_eq!(seeked, Stabilized { index: Some(0), changed: true });
    }

    #[test]
    fn line_without_words_has_no_index() {
        let mut stabilizer = WordStabilizer::new(DWELL);
        assert_eq!(stabilizer.evaluate(Some(2), 0, None, 0.0).index, None);
        assert_eq!(stabilizer.evaluate(Some(2), 0, None, 10.0).index, None);
        assert_eq!(stabilizer.evaluate(None, 0, None, 20.0).index, None);
    }

    #[test]
    fn reset_forgets_committed_state() {
        let mut stabilizer = WordStabilizer::new(0.0);
        stabilizer.evaluate(Some(0), 3, Some(0), 0.0);
        stabilizer.evaluate(Some(0), 3, Some(1), 10.0);
        stabilizer.reset();
        assert_eq!(stabilizer.committed(), None);
        assert_eq!(stabilizer.evaluate(Some(0), 3, Some(2), 20.0).index, Some(0));
    }

    /// A noisy raw-index trace for one line: each frame is (raw, dt_ms).
    #[derive(Debug, Clone)]
    struct NoisyTrace {
        word_count: usize,
        frames: Vec<(Option<usize>, u8)>,
    }

    impl Arbitrary for NoisyTrace {
        fn arbitrary(g: &mut Gen) -> Self {
            let word_count = 1 + usize::arbitrary(g) % 12;
            let len = usize::arbitrary(g) % 200;
            let frames = (0..len)
                .map(|_| {
                    let raw = if u8::arbitrary(g) % 10 == 0 {
                        None
                    } else {
                        Some(usize::arbitrary(g) % word_count)
                    };
                    (raw, u8::arbitrary(g))
                })
                .collect();
            NoisyTrace { word_count, frames }
        }
    }

    fn run(trace: &NoisyTrace) -> Vec<Option<usize>> {
        let mut stabilizer = WordStabilizer::new(DWELL);
        let mut now = 0.0;
        let mut out = vec![stabilizer.evaluate(Some(0), trace.word_count, None, now).index];
        for &(raw, dt) in &trace.frames {
            now += f64::from(dt);
            out.push(stabilizer.evaluate(Some(0), trace.word_count, raw, now).index);
        }
        out
    }

    #[quickcheck_macros::quickcheck]
    fn prop_non_decreasing_within_line(trace: NoisyTrace) -> bool {
        run(&trace).windows(2).all(|w| w[0] <= w[1])
    }

    #[quickcheck_macros::quickcheck]
    fn prop_advances_at_most_one_step(trace: NoisyTrace) -> bool {
        run(&trace).windows(2).all(|w| match (w[0], w[1]) {
            (Some(a), Some(b)) => b <= a + 1,
            _ => true,
        })
    }

    #[quickcheck_macros::quickcheck]
    fn prop_stays_within_line(trace: NoisyTrace) -> bool {
        run(&trace)
            .into_iter()
            .all(|i| i.is_some_and(|i| i < trace.word_count))
    }

    #[quickcheck_macros::quickcheck]
    fn prop_line_change_resets_to_zero(trace: NoisyTrace, next_raw: usize) -> bool {
        let mut stabilizer = WordStabilizer::new(DWELL);
        let mut now = 0.0;
        for &(raw, dt) in &trace.frames {
            now += f64::from(dt);
            stabilizer.evaluate(Some(0), trace.word_count, raw, now);
        }
        let entered = stabilizer.evaluate(Some(1), trace.word_count, Some(next_raw), now);
        entered.index == Some(0) && entered.changed
    }
}

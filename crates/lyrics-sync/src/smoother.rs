use crate::types::LyricWord;

/// Exponential moving average over word progress, for gradient fills.
///
/// Reset whenever the stabilized word index changes so the fill never bleeds
/// from one word into the next.
#[derive(Debug, Clone)]
pub struct ProgressSmoother {
    alpha: f64,
    value: f64,
}

impl ProgressSmoother {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(f64::MIN_POSITIVE, 1.0),
            value: 0.0,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    pub fn update(&mut self, raw: f64) -> f64 {
        let raw = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) };
        self.value = (self.alpha * raw + (1.0 - self.alpha) * self.value).clamp(0.0, 1.0);
        self.value
    }
}

/// Instantaneous progress through `word`, clamped to `[0, 1]`. Zero-length
/// words are complete as soon as they are reached.
pub fn word_progress(word: &LyricWord, time_ms: f64) -> f64 {
    let start = word.start_time_ms as f64;
    let end = word.end_time_ms as f64;
    fraction(start, end, time_ms)
}

/// Unsmoothed progress through a line's `[start_s, end_s)` span.
pub fn line_progress(start_s: f64, end_s: f64, time_s: f64) -> f64 {
    fraction(start_s, end_s, time_s)
}

fn fraction(start: f64, end: f64, t: f64) -> f64 {
    if t.is_nan() {
        return 0.0;
    }
    if end <= start {
        return if t >= start { 1.0 } else { 0.0 };
    }
    ((t - start) / (end - start)).clamp(0.0, 1.0)
}

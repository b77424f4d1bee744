//! Stand-ins for audio the terminal player does not have: an energy envelope
//! derived from lyric timing, and a sung guide tone to feed the pitch worker.

use kara_lyrics_sync::locator::effective_end;
use kara_lyrics_sync::{EnergyEnvelope, LyricLine};

const ENVELOPE_RATE_HZ: f64 = 20.0;
const DEFAULT_LINE_S: f64 = 10.0;
const TAIL_S: f64 = 2.0;

/// Major-scale steps cycled across sung spans.
const SCALE: [f32; 7] = [0.0, 2.0, 4.0, 5.0, 7.0, 9.0, 11.0];
const ROOT_HZ: f32 = 196.0;
const VOICE_AMPLITUDE: f32 = 0.2;

/// Sung intervals in seconds: each timed word, or each whole line when the
/// line has no word timing.
fn sung_spans(lines: &[LyricLine]) -> Vec<(f64, f64)> {
    let mut spans = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if line.has_words() {
            spans.extend(
                line.words
                    .iter()
                    .map(|w| (w.start_time_ms as f64 / 1000.0, w.end_time_ms as f64 / 1000.0)),
            );
        } else if let Some(end) = effective_end(lines, i, DEFAULT_LINE_S) {
            spans.push((line.start_time, end));
        }
    }
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
    spans
}

fn span_at(spans: &[(f64, f64)], t: f64) -> Option<usize> {
    let i = spans.partition_point(|&(start, _)| start <= t).checked_sub(1)?;
    (t < spans[i].1).then_some(i)
}

/// A plausible vocal-energy series: a swell across every sung span over a
/// low floor.
pub fn envelope_for(lines: &[LyricLine]) -> EnergyEnvelope {
    let spans = sung_spans(lines);
    let duration = spans.iter().map(|&(_, end)| end).fold(0.0, f64::max) + TAIL_S;
    let count = (duration * ENVELOPE_RATE_HZ).ceil() as usize;

    let values = (0..count)
        .map(|i| {
            let t = i as f64 / ENVELOPE_RATE_HZ;
            match span_at(&spans, t) {
                Some(s) => {
                    let (start, end) = spans[s];
                    let progress = ((t - start) / (end - start).max(f64::EPSILON)).clamp(0.0, 1.0);
                    (0.35 + 0.5 * (std::f64::consts::PI * progress).sin()) as f32
                }
                None => 0.05,
            }
        })
        .collect();

    EnergyEnvelope {
        values,
        sample_rate_hz: ENVELOPE_RATE_HZ,
        duration_seconds: duration,
    }
}

/// Sine "singer" following the lyric timing, one scale step per span.
pub struct GuideVoice {
    sample_rate: u32,
    spans: Vec<(f64, f64)>,
    phase: f32,
}

impl GuideVoice {
    pub fn new(lines: &[LyricLine], sample_rate: u32) -> Self {
        Self {
            sample_rate,
            spans: sung_spans(lines),
            phase: 0.0,
        }
    }

    pub fn frequency_at(&self, t: f64) -> Option<f32> {
        let span = span_at(&self.spans, t)?;
        Some(ROOT_HZ * 2f32.powf(SCALE[span % SCALE.len()] / 12.0))
    }

    /// Samples covering `[from_s, to_s)`, at most half a second of them.
    /// An empty or backward range renders nothing.
    pub fn render(&mut self, from_s: f64, to_s: f64) -> Vec<f32> {
        let span = (to_s - from_s).min(0.5);
        if span.is_nan() || span <= 0.0 {
            return Vec::new();
        }
        let start = to_s - span;
        let count = (span * self.sample_rate as f64) as usize;
        let step = 1.0 / self.sample_rate as f64;

        (0..count)
            .map(|i| match self.frequency_at(start + i as f64 * step) {
                Some(hz) => {
                    self.phase = (self.phase + hz / self.sample_rate as f32).fract();
                    VOICE_AMPLITUDE * (2.0 * std::f32::consts::PI * self.phase).sin()
                }
                None => 0.0,
            })
            .collect()
    }
}

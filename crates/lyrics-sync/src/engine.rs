use crate::config::SyncConfig;
use crate::locator::Locator;
use crate::lyrics::Lyrics;
use crate::offset::Offset;
use crate::smoother::{ProgressSmoother, line_progress, word_progress};
use crate::stabilizer::WordStabilizer;
use crate::types::{PlaybackTick, SyncState};

/// Per-frame lyric synchronization: locate, stabilize, smooth.
///
/// Owns every piece of per-track sync memory so that [`SyncEngine::load`]
/// can replace all of it in one step.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    lyrics: Lyrics,
    locator: Locator,
    offset: Offset,
    stabilizer: WordStabilizer,
    smoother: ProgressSmoother,
    last_line: Option<usize>,
}

impl SyncEngine {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            lyrics: Lyrics::default(),
            locator: Locator::from(config),
            offset: Offset::new(0.0, config.offset_range_s),
            stabilizer: WordStabilizer::new(config.word_dwell_ms),
            smoother: ProgressSmoother::new(config.progress_alpha),
            last_line: None,
        }
    }

    pub fn lyrics(&self) -> &Lyrics {
        &self.lyrics
    }

    /// Swap in a new track's lyrics and offset, discarding all sync memory.
    pub fn load(&mut self, lyrics: Lyrics, offset_s: f64) {
        self.reset();
        self.lyrics = lyrics;
        self.offset.set(offset_s);
    }

    /// Drop dwell timers, the smoothing accumulator and the last seen line.
    /// Lyrics and offset are kept.
    pub fn reset(&mut self) {
        self.stabilizer.reset();
        self.smoother.reset();
        self.last_line = None;
    }

    pub fn offset(&self) -> f64 {
        self.offset.seconds()
    }

    /// Returns the clamped offset actually applied.
    pub fn set_offset(&mut self, seconds: f64) -> f64 {
        self.offset.set(seconds)
    }

    pub fn adjust_offset(&mut self, delta: f64) -> f64 {
        self.offset.adjust(delta)
    }

    /// Line active at raw playback time `time_s`, without touching any
    /// per-frame state.
    pub fn line_at(&self, time_s: f64) -> Option<usize> {
        self.locator.find_line(self.lyrics.lines(), self.offset.apply(time_s))
    }

    pub fn tick(&mut self, tick: PlaybackTick) -> SyncState<'_> {
        let lines = self.lyrics.lines();
        let Some(first) = lines.first() else {
            return SyncState::idle();
        };

        let time_s = self.offset.apply(tick.time_s);
        let time_ms = time_s * 1000.0;
        let line_index = self.locator.find_line(lines, time_s);

        if line_index != self.last_line {
            tracing::debug!(
                from = ?self.last_line,
                to = ?line_index,
                time_s,
                "lyrics_line_changed"
            );
            self.last_line = line_index;
        }

        let current_line = line_index.and_then(|i| lines.get(i));
        let word_count = current_line.map_or(0, |line| line.words.len());
        let raw_word = current_line.and_then(|line| self.locator.find_word(line, time_ms));

        let stabilized = self
            .stabilizer
            .evaluate(line_index, word_count, raw_word, tick.now_ms);
        if stabilized.changed {
            self.smoother.reset();
        }

        let word = current_line
            .zip(stabilized.index)
            .and_then(|(line, i)| line.words.get(i));
        let word_progress = match word {
            Some(word) => self.smoother.update(word_progress(word, time_ms)),
            None => 0.0,
        };

        let line_progress = line_index
            .and_then(|i| {
                let end = self.locator.effective_end(lines, i)?;
                Some(line_progress(lines[i].start_time, end, time_s))
            })
            .unwrap_or(0.0);

        let next_line = match line_index {
            Some(i) => lines.get(i + 1),
            None => Some(first),
        };

        let last_index = lines.len() - 1;
        let is_after_end = self
            .locator
            .effective_end(lines, last_index)
            .is_some_and(|end| time_s >= end);

        SyncState {
            current_line_index: line_index,
            current_word_index: stabilized.index,
            word_progress,
            line_progress,
            current_line,
            next_line,
            is_before_start: time_s < first.start_time,
            is_after_end,
        }
    }
}

use crate::id::{IdGenerator, UuidIdGen};
use crate::types::LyricLine;

/// An immutable, lookup-ready lyric sequence for one session.
///
/// Construction repairs what the locator relies on: lines with a non-finite
/// start are dropped, lines are stably sorted by start time, each line's
/// words are sorted by start time, and lines without an id receive one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lyrics {
    lines: Vec<LyricLine>,
}

impl Lyrics {
    pub fn new(lines: Vec<LyricLine>) -> Self {
        Self::with_id_gen(lines, &mut UuidIdGen)
    }

    pub fn with_id_gen(lines: Vec<LyricLine>, id_gen: &mut impl IdGenerator) -> Self {
        let total = lines.len();
        let mut lines: Vec<LyricLine> = lines
            .into_iter()
            .filter(|l| l.start_time.is_finite())
            .collect();

        if lines.len() != total {
            tracing::warn!(
                dropped = total - lines.len(),
                "lyrics_dropped_untimed_lines"
            );
        }

        if !lines.is_sorted_by(|a, b| a.start_time <= b.start_time) {
            tracing::warn!(lines = lines.len(), "lyrics_resorted");
            lines.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        }

        for line in &mut lines {
            if line.end_time.is_some_and(|end| !end.is_finite()) {
                line.end_time = None;
            }
            if !line.words.is_sorted_by_key(|w| w.start_time_ms) {
                line.words.sort_by_key(|w| w.start_time_ms);
            }
            if line.id.is_empty() {
                line.id = id_gen.next_id();
            }
        }

        Self { lines }
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn has_word_timing(&self) -> bool {
        self.lines.iter().any(LyricLine::has_words)
    }
}

impl From<Vec<LyricLine>> for Lyrics {
    fn from(lines: Vec<LyricLine>) -> Self {
        Self::new(lines)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricWord {
    pub text: String,
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// One timed lyric line as delivered by the backend.
///
/// `end_time` is optional on the wire; see [`crate::locator::effective_end`]
/// for the value used when it is absent. `words` is empty for line-level
/// lyrics.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricLine {
    #[serde(default)]
    pub id: String,
    pub text: String,
    pub start_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<LyricWord>,
}

impl LyricLine {
    pub fn has_words(&self) -> bool {
        !self.words.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Progressive per-word highlight.
    Karaoke,
    /// Whole-line highlight driven by line progress.
    Line,
}

/// Inputs sampled from the host transport for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackTick {
    /// Raw transport position in seconds, before the offset is applied.
    pub time_s: f64,
    /// Host frame clock in milliseconds. Drives dwell timers only.
    pub now_ms: f64,
}

/// Complete synchronization snapshot for one frame.
///
/// This is the rendering contract: a renderer needs nothing else to draw the
/// active line, the word highlight and the gradient fill. Produced by
/// [`crate::engine::SyncEngine::tick`] and borrowed from the engine, so it
/// lives until the next tick.
#[derive(Debug, Clone, Copy, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState<'a> {
    /// `None` when no line is active (empty lyrics, or before the first line).
    pub current_line_index: Option<usize>,
    /// Stabilized word index. `None` for line-level lyrics.
    pub current_word_index: Option<usize>,
    /// Smoothed progress through the current word, in `[0, 1]`.
    pub word_progress: f64,
    /// Unsmoothed progress through the current line, in `[0, 1]`.
    pub line_progress: f64,
    pub current_line: Option<&'a LyricLine>,
    pub next_line: Option<&'a LyricLine>,
    pub is_before_start: bool,
    pub is_after_end: bool,
}

impl SyncState<'_> {
    pub fn idle() -> Self {
        Self {
            current_line_index: None,
            current_word_index: None,
            word_progress: 0.0,
            line_progress: 0.0,
            current_line: None,
            next_line: None,
            is_before_start: false,
            is_after_end: false,
        }
    }

    pub fn display_mode(&self) -> DisplayMode {
        match self.current_line {
            Some(line) if line.has_words() => DisplayMode::Karaoke,
            _ => DisplayMode::Line,
        }
    }
}

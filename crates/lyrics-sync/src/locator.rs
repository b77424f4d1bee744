//! Stateless lookup of the active line and word for a playback position.
//!
//! Both lookups resolve to the **last** element whose start is at or before
//! the query. With end times derived from the next line's start this is the
//! unique `i` with `start[i] <= t < end[i]`. When explicit end times leave a
//! gap between two lines, the earlier line stays active through the gap; past
//! the final line's end, the final line stays active.
//!
//! Short sequences are scanned linearly, longer ones are bisected. The two
//! strategies are interchangeable and must agree on every input.

use crate::config::SyncConfig;
use crate::types::{LyricLine, LyricWord};

/// End of `lines[index]`: its explicit `end_time`, else the next line's
/// start, else `start_time + default_duration_s`.
pub fn effective_end(lines: &[LyricLine], index: usize, default_duration_s: f64) -> Option<f64> {
    let line = lines.get(index)?;
    Some(match (line.end_time, lines.get(index + 1)) {
        (Some(end), _) => end,
        (None, Some(next)) => next.start_time,
        (None, None) => line.start_time + default_duration_s,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Locator {
    pub linear_scan_threshold: usize,
    pub default_line_duration_s: f64,
}

impl Default for Locator {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for Locator {
    fn from(config: &SyncConfig) -> Self {
        Self {
            linear_scan_threshold: config.linear_scan_threshold,
            default_line_duration_s: config.default_line_duration_s,
        }
    }
}

impl Locator {
    /// Index of the active line at `time_s`, or `None` before the first line.
    pub fn find_line(&self, lines: &[LyricLine], time_s: f64) -> Option<usize> {
        if lines.len() < self.linear_scan_threshold {
            find_line_linear(lines, time_s)
        } else {
            find_line_binary(lines, time_s)
        }
    }

    /// Index of the active word at `time_ms`, or `None` before the first word
    /// (and always for line-level lyrics).
    pub fn find_word(&self, line: &LyricLine, time_ms: f64) -> Option<usize> {
        if line.words.len() < self.linear_scan_threshold {
            find_word_linear(&line.words, time_ms)
        } else {
            find_word_binary(&line.words, time_ms)
        }
    }

    pub fn effective_end(&self, lines: &[LyricLine], index: usize) -> Option<f64> {
        effective_end(lines, index, self.default_line_duration_s)
    }
}

pub fn find_line_linear(lines: &[LyricLine], time_s: f64) -> Option<usize> {
    last_started_linear(lines.iter().map(|l| l.start_time), time_s)
}

pub fn find_line_binary(lines: &[LyricLine], time_s: f64) -> Option<usize> {
    lines
        .partition_point(|l| l.start_time <= time_s)
        .checked_sub(1)
}

pub fn find_word_linear(words: &[LyricWord], time_ms: f64) -> Option<usize> {
    last_started_linear(words.iter().map(|w| w.start_time_ms as f64), time_ms)
}

pub fn find_word_binary(words: &[LyricWord], time_ms: f64) -> Option<usize> {
    words
        .partition_point(|w| w.start_time_ms as f64 <= time_ms)
        .checked_sub(1)
}

fn last_started_linear(starts: impl Iterator<Item = f64>, time: f64) -> Option<usize> {
    let mut found = None;
    for (i, start) in starts.enumerate() {
        if start > time || start.is_nan() || time.is_nan() {
            break;
        }
        found = Some(i);
    }
    found
}

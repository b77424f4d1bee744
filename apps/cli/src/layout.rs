use kara_lyrics_sync::LineLayout;

/// Terminal geometry of the lyric list: one row per line plus blank spacing,
/// measured in rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    pub line_count: usize,
    /// Rows each line occupies, including the gap below it.
    pub spacing: u16,
    pub viewport_rows: u16,
}

impl RowLayout {
    pub const SPACING: u16 = 2;

    pub fn new(line_count: usize, viewport_rows: u16) -> Self {
        Self {
            line_count,
            spacing: Self::SPACING,
            viewport_rows,
        }
    }

    pub fn content_rows(&self) -> f64 {
        self.line_count as f64 * f64::from(self.spacing)
    }
}

impl LineLayout for RowLayout {
    fn line_top(&self, index: usize) -> Option<f64> {
        (index < self.line_count).then(|| index as f64 * f64::from(self.spacing))
    }

    fn viewport_height(&self) -> f64 {
        f64::from(self.viewport_rows)
    }

    fn max_scroll(&self) -> f64 {
        (self.content_rows() - self.viewport_height()).max(0.0)
    }
}

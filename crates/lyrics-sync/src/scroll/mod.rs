//! # Auto-scroll
//!
//! Keeps the active line pinned at a fixed fraction of the viewport while the
//! user is not scrolling, and gets out of the way when they are.
//!
//! ```text
//!            user scroll (outside grace window)
//!   ┌──────┐ ───────────────────────────────▶ ┌────────┐
//!   │ Auto │                                  │ Manual │
//!   └──────┘ ◀─────────────────────────────── └────────┘
//!            quiet period elapsed && playing
//! ```
//!
//! Scroll events do not say who caused them. Every position the controller
//! writes refreshes a "programmatic" timestamp; an event arriving within the
//! grace window after it is attributed to the controller, anything later to
//! the user.

mod spring;

pub use spring::{Spring, SpringState};

use crate::config::ScrollConfig;

/// Geometry of the rendered lyric list, supplied by the host.
///
/// This is the attachment point for the active line element: the controller
/// never measures anything itself.
pub trait LineLayout {
    /// Offset of line `index` from the top of the scrollable content.
    fn line_top(&self, index: usize) -> Option<f64>;
    fn viewport_height(&self) -> f64;
    /// Largest valid scroll position.
    fn max_scroll(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollMode {
    Auto,
    Manual,
}

/// A scroll position the host must apply this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollCommand {
    /// One frame of spring motion.
    Step { top: f64 },
    /// A single discrete move (reduced motion).
    Jump { top: f64 },
}

impl ScrollCommand {
    pub fn top(&self) -> f64 {
        match *self {
            Self::Step { top } | Self::Jump { top } => top,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AutoScrollController {
    config: ScrollConfig,
    mode: ScrollMode,
    spring: Spring,
    last_programmatic_ms: Option<f64>,
    last_user_scroll_ms: Option<f64>,
    active_line: Option<usize>,
    line_changed_ms: f64,
    last_tick_ms: Option<f64>,
}

impl AutoScrollController {
    pub fn new(config: ScrollConfig) -> Self {
        let spring = Spring::new(&config);
        Self {
            config,
            mode: ScrollMode::Auto,
            spring,
            last_programmatic_ms: None,
            last_user_scroll_ms: None,
            active_line: None,
            line_changed_ms: f64::NEG_INFINITY,
            last_tick_ms: None,
        }
    }

    pub fn mode(&self) -> ScrollMode {
        self.mode
    }

    pub fn spring(&self) -> &Spring {
        &self.spring
    }

    pub fn reduced_motion(&self) -> bool {
        self.config.reduced_motion
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.config.reduced_motion = reduced;
        if reduced && self.spring.is_animating() {
            let target = self.spring.target();
            self.spring.snap_to(target);
        }
    }

    /// Report a scroll event observed on the viewport.
    ///
    /// Returns `true` when the event was attributed to the user, which hands
    /// control to them and cancels any in-flight animation at `observed_top`.
    pub fn on_scroll(&mut self, now_ms: f64, observed_top: f64) -> bool {
        let programmatic = self
            .last_programmatic_ms
            .is_some_and(|at| now_ms - at <= self.config.programmatic_grace_ms);
        if programmatic {
            return false;
        }

        if self.mode == ScrollMode::Auto {
            tracing::debug!(top = observed_top, "auto_scroll_manual_override");
        }
        self.mode = ScrollMode::Manual;
        self.last_user_scroll_ms = Some(now_ms);
        self.spring.snap_to(observed_top);
        true
    }

    /// Evaluate one frame. Returns the position to apply, if any.
    pub fn tick(
        &mut self,
        now_ms: f64,
        playing: bool,
        active_line: Option<usize>,
        layout: &dyn LineLayout,
    ) -> Option<ScrollCommand> {
        let dt_ms = self
            .last_tick_ms
            .map_or(0.0, |last| (now_ms - last).clamp(0.0, self.config.max_step_ms));
        self.last_tick_ms = Some(now_ms);

        if active_line != self.active_line {
            self.active_line = active_line;
            self.line_changed_ms = now_ms;
        }

        if self.mode == ScrollMode::Manual {
            let quiet = self
                .last_user_scroll_ms
                .is_none_or(|at| now_ms - at >= self.config.manual_quiet_ms);
            if !(playing && quiet) {
                return None;
            }
            self.mode = ScrollMode::Auto;
            tracing::debug!("auto_scroll_resumed");
        }

        let settled_on_line = now_ms - self.line_changed_ms >= self.config.line_change_debounce_ms;
        let target = active_line
            .filter(|_| playing && settled_on_line)
            .and_then(|line| self.target_for(line, layout));

        if self.config.reduced_motion {
            let target = target?;
            if (target - self.spring.position()).abs() < self.config.settle_epsilon {
                return None;
            }
            self.spring.snap_to(target);
            self.last_programmatic_ms = Some(now_ms);
            return Some(ScrollCommand::Jump { top: target });
        }

        if let Some(target) = target {
            self.spring.retarget(target);
        }

        if !self.spring.is_animating() {
            return None;
        }
        let top = self.spring.step(dt_ms / 1000.0);
        self.last_programmatic_ms = Some(now_ms);
        Some(ScrollCommand::Step { top })
    }

    fn target_for(&self, line: usize, layout: &dyn LineLayout) -> Option<f64> {
        let top = layout.line_top(line)?;
        let desired = top - layout.viewport_height() * self.config.anchor_fraction;
        Some(desired.clamp(0.0, layout.max_scroll().max(0.0)))
    }
}

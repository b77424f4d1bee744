use std::time::Instant;

use crossterm::event::KeyCode;
use kara_karaoke_api::{OffsetKey, OffsetWriter};
use kara_lyrics_sync::locator::effective_end;
use kara_lyrics_sync::{
    Config, DisplayMode, EnergyReadout, FrameInput, KaraokeSession, LineLayout, LyricLine,
    ScrollMode, SyncState,
};
use kara_pitch::{PitchReading, PitchWorkerHandle, PitchWorkerPool, WorkerOptions};

use crate::layout::RowLayout;
use crate::source::LoadedTrack;
use crate::synth::GuideVoice;
use crate::transport::Transport;

const SEEK_STEP_S: f64 = 5.0;
const OFFSET_STEP_S: f64 = 0.1;
/// Silence after the last line before the transport stops.
const TAIL_S: f64 = 3.0;

/// What the renderer needs from the last frame, detached from the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    pub line: Option<usize>,
    pub word: Option<usize>,
    pub word_progress: f64,
    pub line_progress: f64,
    pub display_mode: DisplayMode,
    pub before_start: bool,
    pub after_end: bool,
}

impl From<&SyncState<'_>> for FrameView {
    fn from(state: &SyncState<'_>) -> Self {
        Self {
            line: state.current_line_index,
            word: state.current_word_index,
            word_progress: state.word_progress,
            line_progress: state.line_progress,
            display_mode: state.display_mode(),
            before_start: state.is_before_start,
            after_end: state.is_after_end,
        }
    }
}

impl Default for FrameView {
    fn default() -> Self {
        Self::from(&SyncState::idle())
    }
}

pub struct OffsetSink {
    pub writer: OffsetWriter,
    pub key: OffsetKey,
}

struct LiveVoice {
    handle: PitchWorkerHandle,
    voice: GuideVoice,
    cursor_s: f64,
}

pub struct App {
    pub title: String,
    session: KaraokeSession,
    transport: Transport,
    view: FrameView,
    energy: EnergyReadout,
    scroll_top: f64,
    viewport_rows: u16,
    offset_sink: Option<OffsetSink>,
    pitch_pool: PitchWorkerPool,
    voice: Option<LiveVoice>,
    origin: Instant,
    last_now: Instant,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        track: LoadedTrack,
        offset_sink: Option<OffsetSink>,
        now: Instant,
    ) -> Self {
        let default_line_s = config.sync.default_line_duration_s;
        let mut session = KaraokeSession::new(config);
        session.load_track(track.data);

        let lines = session.engine().lyrics().lines();
        let end = lines
            .len()
            .checked_sub(1)
            .and_then(|last| effective_end(lines, last, default_line_s))
            .unwrap_or(0.0);

        Self {
            title: track.title,
            session,
            transport: Transport::new(end + TAIL_S, now),
            view: FrameView::default(),
            energy: EnergyReadout::IDLE,
            scroll_top: 0.0,
            viewport_rows: 0,
            offset_sink,
            pitch_pool: PitchWorkerPool::new(WorkerOptions::default()),
            voice: None,
            origin: now,
            last_now: now,
            should_quit: false,
        }
    }

    pub fn lines(&self) -> &[LyricLine] {
        self.session.engine().lyrics().lines()
    }

    pub fn view(&self) -> &FrameView {
        &self.view
    }

    pub fn energy(&self) -> EnergyReadout {
        self.energy
    }

    pub fn energy_history(&self) -> impl Iterator<Item = f32> + '_ {
        self.session.sampler().history()
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn scroll_mode(&self) -> ScrollMode {
        self.session.scroll_mode()
    }

    pub fn reduced_motion(&self) -> bool {
        self.session.reduced_motion()
    }

    pub fn offset(&self) -> f64 {
        self.session.offset()
    }

    pub fn position(&self) -> f64 {
        self.transport.position(self.last_now)
    }

    pub fn duration(&self) -> f64 {
        self.transport.duration()
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn live_energy(&self) -> bool {
        self.voice.is_some()
    }

    pub fn pitch(&self) -> Option<PitchReading> {
        self.voice.as_ref().and_then(|live| live.handle.latest())
    }

    /// Rows available to the lyric list; follows the terminal size.
    pub fn set_viewport_rows(&mut self, rows: u16) {
        self.viewport_rows = rows;
    }

    pub fn layout(&self) -> RowLayout {
        RowLayout::new(self.lines().len(), self.viewport_rows)
    }

    pub fn play(&mut self, now: Instant) {
        self.transport.play(now);
    }

    pub fn seek_to(&mut self, now: Instant, position_s: f64) {
        self.transport.seek_to(now, position_s);
    }

    fn now_ms(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.origin).as_secs_f64() * 1000.0
    }

    pub fn tick(&mut self, now: Instant) {
        self.last_now = now;
        if self.transport.is_playing() && self.transport.at_end(now) {
            self.transport.pause(now);
        }

        let now_ms = self.now_ms(now);
        let position = self.transport.position(now);
        self.feed_voice(position);

        let layout = self.layout();
        let output = self.session.frame(FrameInput {
            now_ms,
            playback_time_s: position,
            playing: self.transport.is_playing(),
            layout: Some(&layout),
        });
        let view = FrameView::from(&output.sync);
        let scroll = output.scroll;
        if let Some(energy) = output.energy {
            self.energy = energy;
        }

        if let Some(command) = scroll {
            self.scroll_top = command.top();
            // Applying a position raises a scroll event like any other.
            self.session.on_user_scroll(now_ms, self.scroll_top);
        }
        self.view = view;
    }

    fn feed_voice(&mut self, position: f64) {
        let Some(live) = self.voice.as_mut() else {
            return;
        };
        let samples = live.voice.render(live.cursor_s, position);
        live.cursor_s = position;
        if samples.is_empty() {
            return;
        }
        if let Err(error) = live.handle.push(samples) {
            tracing::warn!(%error, "guide_voice_push_failed");
        }
    }

    pub fn handle_key(&mut self, code: KeyCode, now: Instant) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => self.transport.toggle(now),
            KeyCode::Left => self.transport.seek(now, -SEEK_STEP_S),
            KeyCode::Right => self.transport.seek(now, SEEK_STEP_S),
            KeyCode::Home => self.transport.seek_to(now, 0.0),
            KeyCode::Char('[') => self.nudge_offset(-OFFSET_STEP_S),
            KeyCode::Char(']') => self.nudge_offset(OFFSET_STEP_S),
            KeyCode::Char('0') => self.set_offset(0.0),
            KeyCode::Char('m') => {
                let reduced = !self.session.reduced_motion();
                self.session.set_reduced_motion(reduced);
            }
            KeyCode::Up => self.scroll_by(now, -f64::from(RowLayout::SPACING)),
            KeyCode::Down => self.scroll_by(now, f64::from(RowLayout::SPACING)),
            KeyCode::Char('e') => self.toggle_live_energy(),
            _ => {}
        }
    }

    fn scroll_by(&mut self, now: Instant, rows: f64) {
        let max = self.layout().max_scroll();
        self.scroll_top = (self.scroll_top + rows).clamp(0.0, max);
        let now_ms = self.now_ms(now);
        self.session.on_user_scroll(now_ms, self.scroll_top);
    }

    fn nudge_offset(&mut self, delta: f64) {
        self.session.adjust_offset(delta);
        self.persist_offset();
    }

    fn set_offset(&mut self, seconds: f64) {
        self.session.set_offset(seconds);
        self.persist_offset();
    }

    fn persist_offset(&self) {
        if let Some(sink) = &self.offset_sink {
            sink.writer.schedule(sink.key.clone(), self.session.offset());
        }
    }

    fn toggle_live_energy(&mut self) {
        if self.voice.take().is_some() {
            self.session.set_energy_source(None);
            tracing::info!("live_energy_disabled");
            return;
        }

        let handle = match self.pitch_pool.acquire() {
            Ok(handle) => handle,
            Err(error) => {
                tracing::error!(%error, "pitch_worker_unavailable");
                return;
            }
        };
        let voice = GuideVoice::new(self.lines(), WorkerOptions::default().sample_rate);
        self.session.set_energy_source(Some(Box::new(handle.clone())));
        self.voice = Some(LiveVoice {
            handle,
            voice,
            cursor_s: self.position(),
        });
        tracing::info!("live_energy_enabled");
    }

    /// Flush any pending offset write.
    pub async fn close(self) {
        if let Some(sink) = self.offset_sink {
            sink.writer.close().await;
        }
    }
}

use crate::config::Config;
use crate::energy::{EnergyEnvelope, EnergyReadout, EnergySampler, EnergySource};
use crate::engine::SyncEngine;
use crate::lyrics::Lyrics;
use crate::scroll::{AutoScrollController, LineLayout, ScrollCommand, ScrollMode};
use crate::types::{LyricLine, PlaybackTick, SyncState};

/// Everything needed to start synchronizing one track.
#[derive(Debug, Clone, Default)]
pub struct TrackData {
    pub lyrics: Vec<LyricLine>,
    /// `None` when the backend has no envelope (yet) for this track.
    pub envelope: Option<EnergyEnvelope>,
    /// Persisted offset for this track, in seconds.
    pub offset_s: f64,
}

pub struct FrameInput<'a> {
    pub now_ms: f64,
    /// Raw transport position, before the offset.
    pub playback_time_s: f64,
    pub playing: bool,
    /// Rendered line geometry. Without it the frame skips auto-scroll.
    pub layout: Option<&'a dyn LineLayout>,
}

#[derive(Debug, Clone, Copy)]
pub struct FrameOutput<'a> {
    pub sync: SyncState<'a>,
    pub scroll: Option<ScrollCommand>,
    /// Present on frames where the energy sampler took a sample.
    pub energy: Option<EnergyReadout>,
}

/// One playback session: sync engine, auto-scroll and energy sampling driven
/// by a single per-frame call from the host.
pub struct KaraokeSession {
    config: Config,
    engine: SyncEngine,
    scroll: AutoScrollController,
    sampler: EnergySampler,
    envelope: Option<EnergyEnvelope>,
    live_source: Option<Box<dyn EnergySource + Send>>,
}

impl KaraokeSession {
    pub fn new(config: Config) -> Self {
        Self {
            engine: SyncEngine::new(&config.sync),
            scroll: AutoScrollController::new(config.scroll.clone()),
            sampler: EnergySampler::new(&config.energy),
            envelope: None,
            live_source: None,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn scroll_mode(&self) -> ScrollMode {
        self.scroll.mode()
    }

    pub fn sampler(&self) -> &EnergySampler {
        &self.sampler
    }

    /// Replace all per-track state with `track`.
    ///
    /// The new engine, controller and sampler are built before anything is
    /// swapped in, so no state from the previous track survives.
    pub fn load_track(&mut self, track: TrackData) {
        let lyrics = Lyrics::new(track.lyrics);
        tracing::info!(
            lines = lyrics.len(),
            word_timing = lyrics.has_word_timing(),
            envelope = track.envelope.is_some(),
            offset_s = track.offset_s,
            "karaoke_track_loaded"
        );

        let mut engine = SyncEngine::new(&self.config.sync);
        engine.load(lyrics, track.offset_s);
        let mut scroll = AutoScrollController::new(self.config.scroll.clone());
        scroll.set_reduced_motion(self.scroll.reduced_motion());

        self.engine = engine;
        self.scroll = scroll;
        self.sampler = EnergySampler::new(&self.config.energy);
        self.envelope = track.envelope;
    }

    /// Drop the current track entirely.
    pub fn reset(&mut self) {
        tracing::info!("karaoke_session_reset");
        self.load_track(TrackData::default());
    }

    /// Prefer live readings over the precomputed envelope while set.
    pub fn set_energy_source(&mut self, source: Option<Box<dyn EnergySource + Send>>) {
        self.live_source = source;
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.scroll.set_reduced_motion(reduced);
    }

    pub fn reduced_motion(&self) -> bool {
        self.scroll.reduced_motion()
    }

    pub fn offset(&self) -> f64 {
        self.engine.offset()
    }

    pub fn set_offset(&mut self, seconds: f64) -> f64 {
        self.engine.set_offset(seconds)
    }

    pub fn adjust_offset(&mut self, delta: f64) -> f64 {
        self.engine.adjust_offset(delta)
    }

    /// Envelope value at `time_s`, `0.0` when no envelope is loaded.
    pub fn energy_at_time(&self, time_s: f64) -> f32 {
        self.envelope
            .as_ref()
            .map_or(0.0, |envelope| envelope.energy_at_time(time_s))
    }

    /// Report a scroll event seen on the lyric viewport. Returns `true` when
    /// it was attributed to the user.
    pub fn on_user_scroll(&mut self, now_ms: f64, observed_top: f64) -> bool {
        self.scroll.on_scroll(now_ms, observed_top)
    }

    pub fn frame(&mut self, input: FrameInput<'_>) -> FrameOutput<'_> {
        let sync = self.engine.tick(PlaybackTick {
            time_s: input.playback_time_s,
            now_ms: input.now_ms,
        });

        let scroll = input.layout.and_then(|layout| {
            self.scroll
                .tick(input.now_ms, input.playing, sync.current_line_index, layout)
        });

        let source: Option<&dyn EnergySource> = match (&self.live_source, &self.envelope) {
            (Some(live), _) => Some(live.as_ref()),
            (None, Some(envelope)) => Some(envelope),
            (None, None) => None,
        };
        let energy = self
            .sampler
            .tick(input.now_ms, input.playback_time_s, source);

        FrameOutput {
            sync,
            scroll,
            energy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LyricWord;

    struct Rows(usize);

    impl LineLayout for Rows {
        fn line_top(&self, index: usize) -> Option<f64> {
            (index < self.0).then(|| index as f64 * 40.0)
        }

        fn viewport_height(&self) -> f64 {
            400.0
        }

        fn max_scroll(&self) -> f64 {
            (self.0 as f64 * 40.0 - 400.0).max(0.0)
        }
    }

    struct Loud;

    impl EnergySource for Loud {
        fn energy_at(&self, _time_s: f64) -> Option<f32> {
            Some(1.0)
        }
    }

    fn track(lines: usize) -> TrackData {
        TrackData {
            lyrics: (0..lines)
                .map(|i| {
                    let start = i as f64 * 2.0;
                    let start_ms = (start * 1000.0) as i64;
                    LyricLine {
                        id: String::new(),
                        text: format!("line {i}"),
                        start_time: start,
                        end_time: Some(start + 2.0),
                        words: vec![
                            LyricWord {
                                text: "a".into(),
                                start_time_ms: start_ms,
                                end_time_ms: start_ms + 1000,
                                confidence: None,
                            },
                            LyricWord {
                                text: "b".into(),
                                start_time_ms: start_ms + 1000,
                                end_time_ms: start_ms + 2000,
                                confidence: None,
                            },
                        ],
                    }
                })
                .collect(),
            envelope: Some(EnergyEnvelope {
                values: vec![0.5; 10],
                sample_rate_hz: 1.0,
                duration_seconds: 10.0,
            }),
            offset_s: 0.0,
        }
    }

    fn input(now_ms: f64, time_s: f64, layout: &dyn LineLayout) -> FrameInput<'_> {
        FrameInput {
            now_ms,
            playback_time_s: time_s,
            playing: true,
            layout: Some(layout),
        }
    }

    #[test]
    fn frame_composes_sync_scroll_and_energy() {
        let layout = Rows(30);
        let mut session = KaraokeSession::new(Config::default());
        session.load_track(track(30));

        let first = session.frame(input(0.0, 20.5, &layout));
        assert_eq!(first.sync.current_line_index, Some(10));
        assert_eq!(first.sync.current_word_index, Some(0));
        assert!(first.scroll.is_none());
        assert!(first.energy.is_some_and(|e| !e.idle));

        let later = session.frame(input(100.0, 20.6, &layout));
        assert!(later.scroll.is_some());
        assert!(later.energy.is_some());
    }

    #[test]
    fn load_track_discards_previous_state() {
        let layout = Rows(30);
        let mut session = KaraokeSession::new(Config::default());
        session.load_track(track(30));
        session.frame(input(0.0, 20.2, &layout));
        session.frame(input(10.0, 21.5, &layout));
        session.frame(input(200.0, 21.5, &layout));
        assert_eq!(
            session.frame(input(210.0, 21.5, &layout)).sync.current_word_index,
            Some(1)
        );
        session.on_user_scroll(5000.0, 10.0);
        assert_eq!(session.scroll_mode(), ScrollMode::Manual);

        let mut next = track(30);
        next.offset_s = 1.0;
        session.load_track(next);
        assert_eq!(session.scroll_mode(), ScrollMode::Auto);
        assert_eq!(session.sampler().history_len(), 0);
        assert_eq!(session.offset(), 1.0);

        let state = session.frame(input(220.0, 20.5, &layout)).sync;
        assert_eq!(state.current_line_index, Some(10));
        assert_eq!(state.current_word_index, Some(0));
    }

    #[test]
    fn reset_clears_track() {
        let mut session = KaraokeSession::new(Config::default());
        session.load_track(track(3));
        session.reset();
        assert!(session.engine().lyrics().is_empty());
        assert_eq!(session.energy_at_time(1.0), 0.0);
    }

    #[test]
    fn live_source_overrides_envelope() {
        let mut session = KaraokeSession::new(Config::default());
        session.load_track(track(3));
        session.set_energy_source(Some(Box::new(Loud)));
        let out = session.frame(FrameInput {
            now_ms: 0.0,
            playback_time_s: 0.0,
            playing: true,
            layout: None,
        });
        assert_eq!(out.energy.map(|e| e.raw), Some(1.0));
        assert!(out.scroll.is_none());
    }

    #[test]
    fn missing_envelope_is_idle() {
        let mut session = KaraokeSession::new(Config::default());
        session.load_track(TrackData {
            envelope: None,
            ..track(3)
        });
        let out = session.frame(FrameInput {
            now_ms: 0.0,
            playback_time_s: 1.0,
            playing: true,
            layout: None,
        });
        assert!(out.energy.is_some_and(|e| e.idle));
    }

    #[test]
    fn reduced_motion_survives_track_change() {
        let mut session = KaraokeSession::new(Config::default());
        session.set_reduced_motion(true);
        session.load_track(track(3));
        assert!(session.reduced_motion());
    }
}

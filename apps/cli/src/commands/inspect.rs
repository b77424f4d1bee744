use std::time::{Duration, Instant};

use kara_lyrics_sync::Config;

use crate::app::{App, FrameView};
use crate::source::{self, SourceArgs};

/// Jump the transport from one position to another mid-run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seek {
    pub from_s: f64,
    pub to_s: f64,
}

fn parse_seek(value: &str) -> Result<Seek, String> {
    let (from, to) = value
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got `{value}`"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| format!("`{s}` is not a playback position"))
    };
    Ok(Seek {
        from_s: parse(from)?,
        to_s: parse(to)?,
    })
}

#[derive(clap::Args)]
pub struct Args {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Simulated frame rate.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub fps: u32,

    /// Stop at this playback position instead of the end of the track.
    #[arg(long)]
    pub until: Option<f64>,

    /// Seek once playback reaches FROM, to TO (seconds).
    #[arg(long, value_parser = parse_seek)]
    pub seek: Option<Seek>,

    /// Height of the simulated lyric viewport, in rows.
    #[arg(long, default_value_t = 12)]
    pub rows: u16,
}

#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    pub frames: u64,
    pub transitions: u64,
    pub lines_reached: usize,
}

/// Step `app` on a simulated clock until `until` (or the end of the track),
/// calling `on_transition` whenever the active line or word changes.
pub fn simulate(
    app: &mut App,
    fps: u32,
    until: Option<f64>,
    mut seek: Option<Seek>,
    mut on_transition: impl FnMut(&App, &FrameView),
) -> Summary {
    let frame = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
    let until = until.unwrap_or(f64::INFINITY).min(app.duration());
    let mut now = Instant::now();
    let mut summary = Summary::default();
    let mut last = FrameView::default();

    app.play(now);
    loop {
        now += frame;
        if let Some(jump) = seek.filter(|jump| app.position() >= jump.from_s) {
            tracing::info!(from_s = jump.from_s, to_s = jump.to_s, "inspect_seek");
            app.seek_to(now, jump.to_s);
            seek = None;
        }

        app.tick(now);
        summary.frames += 1;

        let view = *app.view();
        if view.line != last.line || view.word != last.word {
            summary.transitions += 1;
            if let Some(line) = view.line {
                summary.lines_reached = summary.lines_reached.max(line + 1);
            }
            on_transition(app, &view);
        }
        last = view;

        if app.position() >= until || !app.is_playing() {
            break;
        }
    }
    summary
}

fn index(value: Option<usize>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub async fn run(args: Args, config: Config) -> anyhow::Result<()> {
    let track = source::load(&args.source, crate::env::env()).await?;
    let mut app = App::new(config, track, None, Instant::now());
    app.set_viewport_rows(args.rows);

    println!("{} ({} lines)", app.title, app.lines().len());
    println!(
        "{:>8}  {:>4}  {:>4}  {:>5}  {:>5}  {:>6}  {:<6}  {:>6}",
        "time", "line", "word", "word%", "line%", "scroll", "mode", "energy"
    );

    let summary = simulate(&mut app, args.fps, args.until, args.seek, |app, view| {
        tracing::info!(
            time_s = app.position(),
            line = ?view.line,
            word = ?view.word,
            scroll_top = app.scroll_top(),
            "inspect_transition"
        );
        println!(
            "{:>8.3}  {:>4}  {:>4}  {:>5.2}  {:>5.2}  {:>6.1}  {:<6}  {:>6.2}",
            app.position(),
            index(view.line),
            index(view.word),
            view.word_progress,
            view.line_progress,
            app.scroll_top(),
            format!("{:?}", app.scroll_mode()),
            app.energy().smoothed,
        );
    });

    println!(
        "{} frames, {} transitions, reached line {} of {}.",
        summary.frames,
        summary.transitions,
        summary.lines_reached,
        app.lines().len()
    );
    Ok(())
}

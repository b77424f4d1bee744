use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use kara_karaoke_api::OffsetWriter;
use kara_lyrics_sync::Config;
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;

use crate::app::{App, OffsetSink};
use crate::source::{self, SourceArgs};
use crate::ui;

const FRAME: Duration = Duration::from_millis(16);

#[derive(clap::Args)]
pub struct Args {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Start playing immediately.
    #[arg(long)]
    pub autoplay: bool,

    /// Where logs go while the terminal is taken over.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("karaoke.log"))
    }
}

fn setup_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        original(info);
    }));
}

pub async fn run(args: Args, config: Config) -> anyhow::Result<()> {
    let env = crate::env::env();
    let track = source::load(&args.source, env).await?;

    let offset_sink = match (&track.client, &track.offset_key) {
        (Some(client), Some(key)) => Some(OffsetSink {
            writer: OffsetWriter::spawn(
                client.clone(),
                Duration::from_millis(env.offset_debounce_ms),
            ),
            key: key.clone(),
        }),
        _ => None,
    };
    let app = App::new(config, track, offset_sink, Instant::now());
    let autoplay = args.autoplay;

    let app = tokio::task::spawn_blocking(move || {
        setup_panic_hook();
        let mut terminal = ratatui::init();
        let result = event_loop(&mut terminal, app, autoplay);
        ratatui::restore();
        result
    })
    .await??;

    println!(
        "Stopped at {:.1}s of {:.1}s ({} lines, offset {:+.2}s).",
        app.position(),
        app.duration(),
        app.lines().len(),
        app.offset(),
    );
    app.close().await;
    Ok(())
}

fn event_loop(terminal: &mut DefaultTerminal, mut app: App, autoplay: bool) -> std::io::Result<App> {
    if autoplay {
        app.play(Instant::now());
    }

    loop {
        let size = terminal.size()?;
        let viewport = ui::lyrics_viewport(Rect::new(0, 0, size.width, size.height));
        app.set_viewport_rows(viewport.height);

        app.tick(Instant::now());
        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(FRAME)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, Instant::now());
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(app)
}

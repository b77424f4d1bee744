use std::path::PathBuf;

use anyhow::Context;
use kara_karaoke_api::{KaraokeClient, OffsetKey, ReqwestHttp, TrackLoader, TrackRequest};
use kara_lyrics_sync::{EnergyEnvelope, LyricLine, TrackData};

use crate::env::Env;
use crate::synth;

#[derive(Clone, Copy, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Fixture {
    /// Word-timed lyrics.
    Demo,
    /// The same song with line timing only.
    DemoLines,
}

impl Fixture {
    pub fn json(&self) -> &'static str {
        match self {
            Self::Demo => include_str!("../fixtures/demo.json"),
            Self::DemoLines => include_str!("../fixtures/lines.json"),
        }
    }
}

/// On-disk lyrics: the same line shape the backend serves, plus an optional
/// envelope.
#[derive(Debug, serde::Deserialize)]
pub struct LyricsFile {
    #[serde(default)]
    pub title: Option<String>,
    pub lines: Vec<LyricLine>,
    #[serde(default)]
    pub envelope: Option<EnergyEnvelope>,
}

#[derive(clap::Args)]
pub struct SourceArgs {
    /// Built-in lyrics, used when neither --lyrics nor --session is given.
    #[arg(short, long, default_value_t = Fixture::Demo)]
    pub fixture: Fixture,

    /// Lyrics JSON file.
    #[arg(long, conflicts_with = "session")]
    pub lyrics: Option<PathBuf>,

    /// Fetch lyrics for this session from the backend.
    #[arg(long)]
    pub session: Option<String>,

    /// Track whose energy envelope to fetch.
    #[arg(long, requires = "session")]
    pub track: Option<String>,

    /// Reference id of the persisted offset.
    #[arg(long, requires_all = ["session", "recording"])]
    pub reference: Option<String>,

    /// Recording id of the persisted offset.
    #[arg(long, requires = "reference")]
    pub recording: Option<String>,

    /// Starting offset in seconds. Overrides the persisted one.
    #[arg(long, allow_hyphen_values = true)]
    pub offset: Option<f64>,

    #[arg(long)]
    pub api_base_url: Option<String>,

    #[arg(long)]
    pub api_token: Option<String>,
}

pub struct LoadedTrack {
    pub title: String,
    pub data: TrackData,
    /// Set when offset changes should be written back.
    pub offset_key: Option<OffsetKey>,
    pub client: Option<KaraokeClient<ReqwestHttp>>,
}

pub async fn load(args: &SourceArgs, env: &Env) -> anyhow::Result<LoadedTrack> {
    let mut track = match &args.session {
        Some(session_id) => load_remote(args, env, session_id).await?,
        None => load_local(args)?,
    };
    if let Some(offset_s) = args.offset {
        track.data.offset_s = offset_s;
    }
    Ok(track)
}

async fn load_remote(args: &SourceArgs, env: &Env, session_id: &str) -> anyhow::Result<LoadedTrack> {
    let base_url = args
        .api_base_url
        .as_deref()
        .or(env.api_base_url.as_deref())
        .context("--session needs --api-base-url or KARAOKE_API_BASE_URL")?;
    let token = args.api_token.as_deref().or(env.api_token.as_deref());

    let client = KaraokeClient::new(ReqwestHttp::new(base_url, token)?);
    let offset_key = match (&args.reference, &args.recording) {
        (Some(reference_id), Some(recording_id)) => Some(OffsetKey {
            reference_id: reference_id.clone(),
            recording_id: recording_id.clone(),
        }),
        _ => None,
    };

    let loader = TrackLoader::new(client.clone());
    let data = loader
        .load(&TrackRequest {
            session_id: session_id.to_string(),
            track_id: args.track.clone(),
            offset: offset_key.clone(),
        })
        .await
        .with_context(|| format!("failed to load session {session_id}"))?;

    Ok(LoadedTrack {
        title: session_id.to_string(),
        data,
        offset_key,
        client: Some(client),
    })
}

fn load_local(args: &SourceArgs) -> anyhow::Result<LoadedTrack> {
    let (file, fallback_title) = match &args.lyrics {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let file: LyricsFile = serde_json::from_str(&json)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            (file, path.display().to_string())
        }
        None => {
            let file: LyricsFile = serde_json::from_str(args.fixture.json())
                .context("built-in fixture must parse")?;
            (file, args.fixture.to_string())
        }
    };

    let envelope = file
        .envelope
        .unwrap_or_else(|| synth::envelope_for(&file.lines));
    Ok(LoadedTrack {
        title: file.title.unwrap_or(fallback_title),
        data: TrackData {
            lyrics: file.lines,
            envelope: Some(envelope),
            offset_s: 0.0,
        },
        offset_key: None,
        client: None,
    })
}

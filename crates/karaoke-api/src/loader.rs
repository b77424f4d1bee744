use kara_http::HttpClient;
use kara_lyrics_sync::TrackData;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::client::KaraokeClient;
use crate::error::Error;

/// Where a track's persisted offset lives on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetKey {
    pub reference_id: String,
    pub recording_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRequest {
    pub session_id: String,
    /// Track whose energy envelope to fetch. `None` skips the envelope.
    pub track_id: Option<String>,
    /// `None` starts the track at a zero offset.
    pub offset: Option<OffsetKey>,
}

/// Fetches everything a session needs for one track.
///
/// Starting a load cancels the one before it, so at most one result is ever
/// delivered for a burst of track changes. Only missing lyrics fail a load:
/// an unavailable envelope or offset degrades to `None` / `0.0`.
pub struct TrackLoader<C> {
    client: KaraokeClient<C>,
    current: Mutex<Option<CancellationToken>>,
}

impl<C: HttpClient> TrackLoader<C> {
    pub fn new(client: KaraokeClient<C>) -> Self {
        Self {
            client,
            current: Mutex::new(None),
        }
    }

    pub fn client(&self) -> &KaraokeClient<C> {
        &self.client
    }

    /// Abort the in-flight load, if any.
    pub async fn cancel(&self) {
        if let Some(token) = self.current.lock().await.take() {
            token.cancel();
        }
    }

    pub async fn load(&self, request: &TrackRequest) -> Result<TrackData, Error> {
        let token = CancellationToken::new();
        if let Some(previous) = self.current.lock().await.replace(token.clone()) {
            previous.cancel();
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!(session_id = %request.session_id, "track_load_superseded");
                Err(Error::Cancelled)
            }
            result = self.fetch(request) => result,
        }
    }

    async fn fetch(&self, request: &TrackRequest) -> Result<TrackData, Error> {
        let energy = async {
            match &request.track_id {
                Some(track_id) => Some(self.client.fetch_energy(track_id).await),
                None => None,
            }
        };
        let offset = async {
            match &request.offset {
                Some(key) => Some(
                    self.client
                        .fetch_offset(&key.reference_id, &key.recording_id)
                        .await,
                ),
                None => None,
            }
        };

        let (lyrics, energy, offset) = tokio::join!(
            self.client.fetch_lyrics(&request.session_id),
            energy,
            offset
        );
        let lyrics = lyrics?;

        let envelope = match energy {
            Some(Ok(envelope)) => Some(envelope),
            Some(Err(error)) => {
                tracing::warn!(%error, "energy_envelope_unavailable");
                None
            }
            None => None,
        };
        let offset_s = match offset {
            Some(Ok(offset_s)) => offset_s,
            Some(Err(error)) => {
                tracing::warn!(%error, "offset_fetch_failed");
                0.0
            }
            None => 0.0,
        };

        tracing::info!(
            session_id = %request.session_id,
            lines = lyrics.len(),
            envelope = envelope.is_some(),
            offset_s,
            "track_fetched"
        );
        Ok(TrackData {
            lyrics,
            envelope,
            offset_s,
        })
    }
}

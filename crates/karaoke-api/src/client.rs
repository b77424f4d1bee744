use kara_http::HttpClient;
use kara_lyrics_sync::{EnergyEnvelope, LyricLine};

use crate::error::Error;
use crate::types::{EnergyResponse, LyricsResponse, OffsetRecord, parse_response};

#[derive(Clone)]
pub struct KaraokeClient<C> {
    http: C,
}

impl<C: HttpClient> KaraokeClient<C> {
    pub fn new(http: C) -> Self {
        Self { http }
    }

    pub async fn fetch_lyrics(&self, session_id: &str) -> Result<Vec<LyricLine>, Error> {
        let path = format!("/sessions/{}/lyrics", session_id);
        let bytes = self.http.get(&path).await.map_err(Error::Http)?;
        let resp: LyricsResponse = parse_response(&bytes)?;
        Ok(resp.lines)
    }

    pub async fn fetch_energy(&self, track_id: &str) -> Result<EnergyEnvelope, Error> {
        let path = format!("/tracks/{}/energy", track_id);
        let bytes = self.http.get(&path).await.map_err(Error::Http)?;
        parse_response::<EnergyResponse>(&bytes)?.into_envelope()
    }

    pub async fn fetch_offset(&self, reference_id: &str, recording_id: &str) -> Result<f64, Error> {
        let path = format!("/offsets/{}/{}", reference_id, recording_id);
        let bytes = self.http.get(&path).await.map_err(Error::Http)?;
        let record: OffsetRecord = parse_response(&bytes)?;
        Ok(record.offset_seconds)
    }

    /// Returns the offset the backend stored, which may differ from the one
    /// sent if the backend clamps it.
    pub async fn save_offset(
        &self,
        reference_id: &str,
        recording_id: &str,
        offset_seconds: f64,
    ) -> Result<f64, Error> {
        let path = format!("/offsets/{}/{}", reference_id, recording_id);
        let body = serde_json::to_vec(&OffsetRecord { offset_seconds })?;
        let bytes = self.http.put(&path, body).await.map_err(Error::Http)?;
        let record: OffsetRecord = parse_response(&bytes)?;
        Ok(record.offset_seconds)
    }
}

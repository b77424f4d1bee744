use kara_lyrics_sync::{EnergyEnvelope, LyricLine};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::Error;

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct LyricsResponse {
    pub lines: Vec<LyricLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Ready,
    Processing,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct EnergyResponse {
    pub status: EnvelopeStatus,
    #[serde(default)]
    pub values: Vec<f32>,
    #[serde(default)]
    pub sample_rate_hz: f64,
    #[serde(default)]
    pub duration_seconds: f64,
}

impl EnergyResponse {
    /// Only a `ready` response carries a usable envelope.
    pub fn into_envelope(self) -> Result<EnergyEnvelope, Error> {
        match self.status {
            EnvelopeStatus::Ready => Ok(EnergyEnvelope {
                values: self.values,
                sample_rate_hz: self.sample_rate_hz,
                duration_seconds: self.duration_seconds,
            }),
            status => Err(Error::EnvelopeUnavailable { status }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetRecord {
    pub offset_seconds: f64,
}

pub(crate) fn parse_response<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    match serde_json::from_slice::<T>(bytes) {
        Ok(response) => Ok(response),
        Err(err) => match serde_json::from_slice::<ApiErrorResponse>(bytes) {
            Ok(error_resp) => Err(Error::Api {
                code: error_resp.error.code,
                message: error_resp.error.message,
            }),
            Err(_) => Err(Error::Json(err)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lyrics_lines() {
        let body = br#"{"lines":[{"id":"a","text":"hi","startTime":1.5,"endTime":2.0,
            "words":[{"text":"hi","startTimeMs":1500,"endTimeMs":2000}]}]}"#;
        let resp: LyricsResponse = parse_response(body).unwrap();
        assert_eq!(resp.lines.len(), 1);
        assert_eq!(resp.lines[0].words[0].start_time_ms, 1500);
    }

    #[test]
    fn error_body_becomes_api_error() {
        let body = br#"{"error":{"code":"not_found","message":"no such session"}}"#;
        let err = parse_response::<LyricsResponse>(body).unwrap_err();
        assert!(matches!(err, Error::Api { code, .. } if code == "not_found"));
    }

    #[test]
    fn garbage_is_json_error() {
        let err = parse_response::<OffsetRecord>(b"not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let resp: EnergyResponse = parse_response(br#"{"status":"queued"}"#).unwrap();
        assert_eq!(resp.status, EnvelopeStatus::Unknown);
        assert!(matches!(
            resp.into_envelope(),
            Err(Error::EnvelopeUnavailable {
                status: EnvelopeStatus::Unknown
            })
        ));
    }

    #[test]
    fn ready_status_yields_envelope() {
        let resp: EnergyResponse = parse_response(
            br#"{"status":"ready","values":[0.1,0.2],"sample_rate_hz":20,"duration_seconds":0.1}"#,
        )
        .unwrap();
        let envelope = resp.into_envelope().unwrap();
        assert_eq!(envelope.values, vec![0.1, 0.2]);
    }
}

use karaoke_api::{Error, KaraokeClient, OffsetKey, ReqwestHttp, TrackLoader, TrackRequest};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LYRICS: &str = r#"{"lines":[
    {"id":"l1","text":"hello world","startTime":1.0,"endTime":2.0,
     "words":[{"text":"hello","startTimeMs":1000,"endTimeMs":1500},
              {"text":"world","startTimeMs":1500,"endTimeMs":2000}]},
    {"id":"l2","text":"goodbye","startTime":3.0}
]}"#;

async fn backend() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sessions/s1/lyrics"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LYRICS))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tracks/t1/energy"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"status":"ready","values":[0.1,0.5,0.9],"sample_rate_hz":1,"duration_seconds":3}"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/offsets/ref/rec"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"offset_seconds":0.3}"#))
        .mount(&server)
        .await;

    server
}

fn client(server: &MockServer) -> KaraokeClient<ReqwestHttp> {
    KaraokeClient::new(ReqwestHttp::new(server.uri(), Some("secret")).unwrap())
}

#[tokio::test]
async fn loads_track_over_http() {
    let server = backend().await;
    let loader = TrackLoader::new(client(&server));

    let track = loader
        .load(&TrackRequest {
            session_id: "s1".into(),
            track_id: Some("t1".into()),
            offset: Some(OffsetKey {
                reference_id: "ref".into(),
                recording_id: "rec".into(),
            }),
        })
        .await
        .unwrap();

    assert_eq!(track.lyrics.len(), 2);
    assert_eq!(track.lyrics[0].words.len(), 2);
    assert_eq!(track.envelope.unwrap().energy_at_time(1.4), 0.5);
    assert_eq!(track.offset_s, 0.3);
}

#[tokio::test]
async fn server_error_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sessions/s1/lyrics"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).fetch_lyrics("s1").await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}

#[tokio::test]
async fn error_body_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sessions/s1/lyrics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"error":{"code":"expired","message":"session expired"}}"#),
        )
        .mount(&server)
        .await;

    let err = client(&server).fetch_lyrics("s1").await.unwrap_err();
    assert!(matches!(err, Error::Api { code, .. } if code == "expired"));
}

#[tokio::test]
async fn puts_offset_json() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/offsets/ref/rec"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({ "offset_seconds": -1.5 })))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"offset_seconds":-1.5}"#))
        .expect(1)
        .mount(&server)
        .await;

    let stored = client(&server).save_offset("ref", "rec", -1.5).await.unwrap();
    assert_eq!(stored, -1.5);
}

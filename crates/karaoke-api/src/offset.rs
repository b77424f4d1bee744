use std::time::Duration;

use kara_http::HttpClient;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::KaraokeClient;
use crate::loader::OffsetKey;

pub const DEFAULT_OFFSET_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug)]
struct PendingWrite {
    key: OffsetKey,
    offset_s: f64,
}

/// Persists offset changes with a trailing debounce.
///
/// A burst of adjustments produces one write carrying the last value, issued
/// once no new value has arrived for the debounce period. Writes go out one
/// at a time. Failures are logged and dropped; the in-memory offset stays
/// authoritative.
pub struct OffsetWriter {
    tx: mpsc::UnboundedSender<PendingWrite>,
    task: JoinHandle<()>,
}

impl OffsetWriter {
    pub fn spawn<C>(client: KaraokeClient<C>, debounce: Duration) -> Self
    where
        C: HttpClient + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(client, debounce, rx));
        Self { tx, task }
    }

    pub fn schedule(&self, key: OffsetKey, offset_s: f64) {
        if self.tx.send(PendingWrite { key, offset_s }).is_err() {
            tracing::warn!("offset_writer_closed");
        }
    }

    /// Write whatever is still pending and wait for the writer to finish.
    pub async fn close(self) {
        drop(self.tx);
        if let Err(error) = self.task.await {
            tracing::error!(%error, "offset_writer_panicked");
        }
    }
}

async fn run<C: HttpClient>(
    client: KaraokeClient<C>,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<PendingWrite>,
) {
    while let Some(mut latest) = rx.recv().await {
        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(next) if next.key == latest.key => latest = next,
                    Some(next) => {
                        write(&client, &latest).await;
                        latest = next;
                    }
                    None => break,
                },
                _ = tokio::time::sleep(debounce) => break,
            }
        }
        write(&client, &latest).await;
    }
}

async fn write<C: HttpClient>(client: &KaraokeClient<C>, pending: &PendingWrite) {
    let PendingWrite { key, offset_s } = pending;
    match client
        .save_offset(&key.reference_id, &key.recording_id, *offset_s)
        .await
    {
        Ok(stored) => tracing::debug!(offset_s = stored, "offset_saved"),
        Err(error) => tracing::warn!(%error, offset_s, "offset_write_failed"),
    }
}

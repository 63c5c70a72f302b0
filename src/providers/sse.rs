// Server-Sent Events plumbing shared by the HTTP adapters

use anyhow::Result;
use futures::stream::StreamExt;
use tokio::sync::mpsc;

use super::types::StreamChunk;

const CHANNEL_CAPACITY: usize = 100;

/// Accumulates raw bytes and hands back complete `data:` payloads
///
/// Lines are split on `\n` at the byte level so multi-byte characters
/// straddling two network chunks are reassembled before decoding.
#[derive(Debug, Default)]
pub(crate) struct SseBuffer {
    buffer: Vec<u8>,
}

impl SseBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed bytes, returning the payload of every completed `data:` line
    pub(crate) fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            if let Some(payload) = data_payload(&String::from_utf8_lossy(&line_bytes)) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flush a trailing line that arrived without a newline
    pub(crate) fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        data_payload(&String::from_utf8_lossy(&rest))
    }
}

fn data_payload(line: &str) -> Option<String> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() {
        None
    } else {
        Some(payload.to_string())
    }
}

/// What an adapter made of one `data:` payload
pub(crate) enum SseEvent {
    /// Chunks to forward (may be empty for keep-alives and bookkeeping events)
    Chunks(Vec<StreamChunk>),
    /// The vendor's end-of-stream marker
    Done,
}

/// Spawn a task that pumps a streaming response into a channel
///
/// `parse` is called for every `data:` payload. An `Err` from `parse` is sent
/// down the channel and ends the stream. Dropping the receiver stops the task.
pub(crate) fn spawn_pump<F>(
    provider: &'static str,
    response: reqwest::Response,
    mut parse: F,
) -> mpsc::Receiver<Result<StreamChunk>>
where
    F: FnMut(&str) -> Result<SseEvent> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        tracing::debug!(provider, "[STREAM] streaming task started");
        let mut stream = response.bytes_stream();
        let mut buffer = SseBuffer::new();
        let mut open = true;

        'outer: while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(provider, "Stream error: {}", e);
                    let _ = tx.send(Err(e.into())).await;
                    open = false;
                    break;
                }
            };

            for payload in buffer.feed(&bytes) {
                if !forward(&tx, parse(&payload)).await {
                    open = false;
                    break 'outer;
                }
            }
        }

        if open {
            if let Some(payload) = buffer.finish() {
                forward(&tx, parse(&payload)).await;
            }
        }

        tracing::debug!(provider, "[STREAM] streaming task finished");
    });

    rx
}

/// Send parsed chunks; returns false once the stream should stop
async fn forward(
    tx: &mpsc::Sender<Result<StreamChunk>>,
    event: Result<SseEvent>,
) -> bool {
    match event {
        Ok(SseEvent::Chunks(chunks)) => {
            for chunk in chunks {
                if tx.send(Ok(chunk)).await.is_err() {
                    // Receiver dropped, client went away
                    return false;
                }
            }
            true
        }
        Ok(SseEvent::Done) => {
            tracing::debug!("[STREAM] received end marker");
            false
        }
        Err(e) => {
            let _ = tx.send(Err(e)).await;
            false
        }
    }
}

// Streaming response body
//
// Turns a dispatched ChatStream into an HTTP body. Chunks are written as
// soon as they arrive, in vendor order, one frame per chunk.

use axum::body::{Body, Bytes};
use futures::stream::{self, Stream};
use prometheus::IntCounter;
use std::io;

use crate::chat::ChatStream;
use crate::config::StreamProtocol;
use crate::providers::StreamChunk;

/// Both protocols are served as plain text
pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Header the AI SDK client checks for the data stream protocol
pub const DATA_STREAM_HEADER: &str = "x-vercel-ai-data-stream";

/// Frame one text chunk
pub fn encode_text(protocol: StreamProtocol, text: &str) -> Bytes {
    match protocol {
        StreamProtocol::Text => Bytes::copy_from_slice(text.as_bytes()),
        StreamProtocol::Data => data_part('0', text),
    }
}

/// Frame a mid-stream error; `None` means the protocol has no error frame
pub fn encode_error(protocol: StreamProtocol, message: &str) -> Option<Bytes> {
    match protocol {
        StreamProtocol::Text => None,
        StreamProtocol::Data => Some(data_part('3', message)),
    }
}

fn data_part(code: char, value: &str) -> Bytes {
    // Serializing a &str cannot fail
    let json = serde_json::to_string(value).unwrap_or_default();
    Bytes::from(format!("{}:{}\n", code, json))
}

struct BodyState {
    stream: ChatStream,
    protocol: StreamProtocol,
    chunks_sent: IntCounter,
    request_id: String,
    finish_reason: Option<String>,
    done: bool,
}

/// Byte stream for a chat response
///
/// Ends when the provider channel closes. An upstream error ends the body
/// too: as an error frame for `Data`, or as a body error for `Text`.
pub fn body_stream(
    stream: ChatStream,
    protocol: StreamProtocol,
    chunks_sent: IntCounter,
    request_id: String,
) -> impl Stream<Item = Result<Bytes, io::Error>> + Send + 'static {
    let state = BodyState {
        stream,
        protocol,
        chunks_sent,
        request_id,
        finish_reason: None,
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.done {
            return None;
        }

        loop {
            match state.stream.chunks.recv().await {
                Some(Ok(StreamChunk::TextDelta(text))) => {
                    if text.is_empty() {
                        continue;
                    }
                    state.chunks_sent.inc();
                    let frame = encode_text(state.protocol, &text);
                    return Some((Ok(frame), state));
                }
                Some(Ok(StreamChunk::Finished { reason })) => {
                    state.finish_reason = reason;
                }
                Some(Err(e)) => {
                    state.done = true;
                    let message = format!("{:#}", e);
                    tracing::error!(
                        request_id = %state.request_id,
                        provider = %state.stream.provider,
                        error = %message,
                        "Upstream stream failed"
                    );
                    let item = match encode_error(state.protocol, &message) {
                        Some(frame) => Ok(frame),
                        None => Err(io::Error::new(io::ErrorKind::Other, message)),
                    };
                    return Some((item, state));
                }
                None => {
                    tracing::debug!(
                        request_id = %state.request_id,
                        provider = %state.stream.provider,
                        finish_reason = ?state.finish_reason,
                        "Stream finished"
                    );
                    return None;
                }
            }
        }
    })
}

/// Wrap a chat stream as an axum body
pub fn into_body(
    stream: ChatStream,
    protocol: StreamProtocol,
    chunks_sent: IntCounter,
    request_id: String,
) -> Body {
    Body::from_stream(body_stream(stream, protocol, chunks_sent, request_id))
}

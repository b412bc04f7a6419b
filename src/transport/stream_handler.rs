use crate::errors::{ResponsesError, ResponsesResult};
use crate::transport::{RecordStream, ResponseParser};
use bytes::Bytes;
use futures::{future, Stream, StreamExt};
use pin_project_lite::pin_project;
use reqwest::Response;
use serde_json::Value;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::debug;

const DONE_SENTINEL: &str = "[DONE]";

pub struct StreamHandler;

impl StreamHandler {
    pub async fn handle_stream(response: Response) -> ResponsesResult<RecordStream> {
        let response = ResponseParser::ensure_success(response).await?;
        debug!(status = response.status().as_u16(), "Event stream opened");
        Ok(Self::records(response.bytes_stream()))
    }

    /// Frames a byte stream as server-sent events and yields each `data`
    /// payload as JSON. Ends at the `[DONE]` sentinel or when the bytes end.
    pub fn records<S, E>(bytes: S) -> RecordStream
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<ResponsesError>,
    {
        let records = SseStream::new(bytes)
            .take_while(|event| future::ready(!matches!(event, Ok(e) if e.is_done())))
            .filter_map(|event| {
                future::ready(match event {
                    Ok(event) if event.data.is_empty() => None,
                    Ok(event) => Some(event.json()),
                    Err(e) => Some(Err(e)),
                })
            });
        Box::pin(records)
    }
}

pin_project! {
    pub struct SseStream<S> {
        #[pin]
        inner: S,
        buffer: Vec<u8>,
        finished: bool,
    }
}

impl<S> SseStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            finished: false,
        }
    }
}

// Returns the end of the first complete event block and the length of its terminator.
fn find_boundary(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = buffer.windows(2).position(|w| w == b"\n\n").map(|pos| (pos, 2));
    let crlf = buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| (pos, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

impl<S, E> Stream for SseStream<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<ResponsesError>,
{
    type Item = ResponsesResult<SseEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            // One chunk may carry several events; drain them before reading more.
            if let Some((pos, len)) = find_boundary(this.buffer) {
                let block: Vec<u8> = this.buffer.drain(..pos + len).collect();
                let event = SseEvent::from_bytes(&block[..pos]);
                if event.is_empty() {
                    continue;
                }
                return Poll::Ready(Some(Ok(event)));
            }

            if *this.finished {
                if this.buffer.is_empty() {
                    return Poll::Ready(None);
                }
                let block: Vec<u8> = this.buffer.drain(..).collect();
                let event = SseEvent::from_bytes(&block);
                if event.is_empty() {
                    return Poll::Ready(None);
                }
                return Poll::Ready(Some(Ok(event)));
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => this.buffer.extend_from_slice(&chunk),
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e.into()))),
                Poll::Ready(None) => *this.finished = true,
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SseEvent {
    pub event_type: Option<String>,
    pub data: String,
    pub id: Option<String>,
}

impl SseEvent {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        let mut event_type = None;
        let mut data_lines = Vec::new();
        let mut id = None;

        for line in text.lines() {
            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            if let Some(stripped) = line.strip_prefix("event:") {
                event_type = Some(stripped.trim().to_string());
            } else if let Some(stripped) = line.strip_prefix("data:") {
                data_lines.push(stripped.strip_prefix(' ').unwrap_or(stripped));
            } else if let Some(stripped) = line.strip_prefix("id:") {
                id = Some(stripped.trim().to_string());
            }
        }

        Self {
            event_type,
            data: data_lines.join("\n"),
            id,
        }
    }

    fn is_empty(&self) -> bool {
        self.event_type.is_none() && self.data.is_empty() && self.id.is_none()
    }

    pub fn is_done(&self) -> bool {
        self.data.trim() == DONE_SENTINEL
    }

    /// The `data` payload as a JSON record.
    pub fn json(&self) -> ResponsesResult<Value> {
        serde_json::from_str(&self.data).map_err(|e| {
            ResponsesError::malformed(format!("stream record is not valid JSON: {}", e))
        })
    }
}

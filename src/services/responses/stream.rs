use crate::errors::{CancelReason, ResponsesError, ResponsesResult, WaitPhase};
use crate::services::responses::aggregator::SequenceTracker;
use crate::services::responses::{
    EventDecoder, Response, ResponseAggregator, ResponseEvent, ResponseUpdate,
};
use crate::transport::RecordStream;
use futures::{Future, Stream, StreamExt};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Instant, Sleep};
use tracing::{debug, warn};

/// A live response stream.
///
/// Yields one [`ResponseUpdate`] per applied event, then ends once the
/// response completes. A failure is yielded once as `Err` and ends the stream.
/// The assembled result is read with [`finalize`](Self::finalize).
///
/// Dropping or cancelling the stream drops the transport stream with it,
/// which closes the connection.
pub struct ResponseStream {
    inner: Option<RecordStream>,
    aggregator: ResponseAggregator,
    idle_timeout: Option<Duration>,
    idle: Option<Pin<Box<Sleep>>>,
    done: bool,
}

impl ResponseStream {
    pub fn new(records: RecordStream) -> Self {
        Self {
            inner: Some(records),
            aggregator: ResponseAggregator::new(),
            idle_timeout: None,
            idle: None,
            done: false,
        }
    }

    /// Bounds every wait for the next event. Exceeding it cancels the stream.
    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Read access to partial state.
    pub fn aggregator(&self) -> &ResponseAggregator {
        &self.aggregator
    }

    /// Best current view of the response, see [`ResponseAggregator::partial_response`].
    pub fn partial_response(&self) -> Option<Response> {
        self.aggregator.partial_response()
    }

    pub fn is_finished(&self) -> bool {
        self.done
    }

    pub async fn next_update(&mut self) -> Option<ResponsesResult<ResponseUpdate>> {
        self.next().await
    }

    /// Waits at most `timeout` for the next update. On expiry the stream is
    /// cancelled and `Cancelled(Timeout)` is returned.
    pub async fn next_update_timeout(
        &mut self,
        timeout: Duration,
    ) -> Option<ResponsesResult<ResponseUpdate>> {
        match tokio::time::timeout(timeout, self.next()).await {
            Ok(update) => update,
            Err(_) => {
                let reason = timeout_reason(timeout, WaitPhase::NextEvent);
                self.abandon(reason);
                Some(Err(ResponsesError::Cancelled(reason)))
            }
        }
    }

    /// Abandons the stream. Later `finalize` calls report `Cancelled` unless
    /// the response had already completed.
    pub fn cancel(&mut self) {
        self.abandon(CancelReason::Explicit);
    }

    /// Drains the remaining events and returns the terminal result.
    /// Safe to call repeatedly.
    pub async fn finalize(&mut self) -> ResponsesResult<Response> {
        self.drain().await;
        self.aggregator.finalize()
    }

    /// Like [`finalize`](Self::finalize), bounded by `timeout`. On expiry the
    /// stream is cancelled and `Cancelled(Timeout)` is returned.
    pub async fn finalize_timeout(&mut self, timeout: Duration) -> ResponsesResult<Response> {
        if tokio::time::timeout(timeout, self.drain()).await.is_err() {
            self.abandon(timeout_reason(timeout, WaitPhase::Finalize));
        }
        self.aggregator.finalize()
    }

    /// Drains the stream and returns the concatenated output text.
    pub async fn collect_text(mut self) -> ResponsesResult<String> {
        let response = self.finalize().await?;
        Ok(response.output_text().unwrap_or_default())
    }

    async fn drain(&mut self) {
        while self.next().await.is_some() {}
    }

    fn abandon(&mut self, reason: CancelReason) {
        self.aggregator.cancel(reason);
        self.release();
        self.done = true;
    }

    fn release(&mut self) {
        if self.inner.take().is_some() {
            debug!(
                events_seen = self.aggregator.events_seen(),
                "Event stream released"
            );
        }
        self.idle = None;
    }

    fn reset_idle(&mut self) {
        if let (Some(idle), Some(timeout)) = (self.idle.as_mut(), self.idle_timeout) {
            idle.as_mut().reset(Instant::now() + timeout);
        }
    }

    // Polls the idle timer; true once it has fired.
    fn idle_expired(&mut self, cx: &mut Context<'_>) -> bool {
        let Some(timeout) = self.idle_timeout else {
            return false;
        };
        let idle = self
            .idle
            .get_or_insert_with(|| Box::pin(tokio::time::sleep(timeout)));
        idle.as_mut().poll(cx).is_ready()
    }

    fn fail(&mut self, err: ResponsesError) -> Poll<Option<ResponsesResult<ResponseUpdate>>> {
        let err = self.aggregator.fail(err);
        warn!(error = %err, "Response stream failed");
        self.release();
        self.done = true;
        Poll::Ready(Some(Err(err)))
    }
}

fn timeout_reason(timeout: Duration, phase: WaitPhase) -> CancelReason {
    CancelReason::Timeout {
        timeout_ms: timeout.as_millis() as u64,
        phase,
    }
}

impl Stream for ResponseStream {
    type Item = ResponsesResult<ResponseUpdate>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.done {
                return Poll::Ready(None);
            }
            if this.aggregator.is_terminal() {
                this.release();
                this.done = true;
                return Poll::Ready(None);
            }

            let Some(inner) = this.inner.as_mut() else {
                this.done = true;
                return Poll::Ready(None);
            };

            match inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(record))) => {
                    this.reset_idle();
                    let applied = EventDecoder::decode(record)
                        .and_then(|event| this.aggregator.consume(event));
                    match applied {
                        Ok(Some(update)) => return Poll::Ready(Some(Ok(update))),
                        Ok(None) => continue,
                        Err(err) => return this.fail(err),
                    }
                }
                Poll::Ready(Some(Err(err))) => return this.fail(err),
                Poll::Ready(None) => {
                    this.release();
                    this.aggregator.end_of_stream();
                    this.done = true;
                    return match this.aggregator.finalize() {
                        Ok(_) => Poll::Ready(None),
                        Err(err) => Poll::Ready(Some(Err(err))),
                    };
                }
                Poll::Pending => {
                    if this.idle_expired(cx) {
                        let timeout = this.idle_timeout.unwrap_or_default();
                        let reason = timeout_reason(timeout, WaitPhase::NextEvent);
                        warn!(%reason, "No event within idle timeout");
                        this.abandon(reason);
                        return Poll::Ready(Some(Err(ResponsesError::Cancelled(reason))));
                    }
                    return Poll::Pending;
                }
            }
        }
    }
}

pin_project! {
    /// Decoded events with strictly increasing sequence numbers, for callers
    /// that want the raw feed instead of assembled updates. The first error
    /// ends the stream.
    pub struct ResponseEventStream {
        #[pin]
        inner: RecordStream,
        sequence: SequenceTracker,
        done: bool,
    }
}

impl ResponseEventStream {
    pub fn new(records: RecordStream) -> Self {
        Self {
            inner: records,
            sequence: SequenceTracker::default(),
            done: false,
        }
    }
}

impl Stream for ResponseEventStream {
    type Item = ResponsesResult<ResponseEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }

        let item = match this.inner.poll_next(cx) {
            Poll::Ready(Some(Ok(record))) => EventDecoder::decode(record).and_then(|event| {
                this.sequence.observe(event.sequence_number())?;
                Ok(event)
            }),
            Poll::Ready(Some(Err(err))) => Err(err),
            Poll::Ready(None) => {
                *this.done = true;
                return Poll::Ready(None);
            }
            Poll::Pending => return Poll::Pending,
        };

        match &item {
            Err(_) => *this.done = true,
            Ok(event) if event.is_terminal() => *this.done = true,
            Ok(_) => {}
        }
        Poll::Ready(Some(item))
    }
}

use crate::errors::{CancelReason, ErrorMapper, ResponsesError, ResponsesResult, TransportError};
use crate::services::responses::events::{
    event_types, ContentPartAddedEvent, ContentTextDeltaEvent, ErrorEvent, OutputItemAddedEvent,
    SnapshotEvent, SummaryPartAddedEvent, SummaryTextDeltaEvent,
};
use crate::services::responses::{
    ContentPart, OutputItem, Response, ResponseEvent, ResponseStatus, SummaryPart,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, trace, warn};

/// Lifecycle of one aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    Idle,
    Created,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl AggregatorState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AggregatorState::Completed | AggregatorState::Failed | AggregatorState::Cancelled
        )
    }
}

/// Incremental change surfaced to the consumer for one applied event.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseUpdate {
    Snapshot {
        sequence_number: u64,
        response: Response,
    },
    ItemAdded {
        sequence_number: u64,
        output_index: Option<u32>,
        item: OutputItem,
    },
    SummaryPartAdded {
        sequence_number: u64,
        item_id: String,
        summary_index: u32,
        part: Option<SummaryPart>,
    },
    ContentPartAdded {
        sequence_number: u64,
        item_id: String,
        content_index: u32,
        part: Option<ContentPart>,
    },
    SummaryTextDelta {
        sequence_number: u64,
        item_id: String,
        summary_index: u32,
        delta: String,
        obfuscation: Option<String>,
    },
    ContentTextDelta {
        sequence_number: u64,
        item_id: String,
        content_index: u32,
        delta: String,
    },
}

impl ResponseUpdate {
    pub fn sequence_number(&self) -> u64 {
        match self {
            ResponseUpdate::Snapshot { sequence_number, .. }
            | ResponseUpdate::ItemAdded { sequence_number, .. }
            | ResponseUpdate::SummaryPartAdded { sequence_number, .. }
            | ResponseUpdate::ContentPartAdded { sequence_number, .. }
            | ResponseUpdate::SummaryTextDelta { sequence_number, .. }
            | ResponseUpdate::ContentTextDelta { sequence_number, .. } => *sequence_number,
        }
    }

    /// The message text fragment, if this update carries one.
    pub fn text_delta(&self) -> Option<&str> {
        match self {
            ResponseUpdate::ContentTextDelta { delta, .. } => Some(delta),
            _ => None,
        }
    }

    pub fn summary_delta(&self) -> Option<&str> {
        match self {
            ResponseUpdate::SummaryTextDelta { delta, .. } => Some(delta),
            _ => None,
        }
    }
}

/// Strictly-increasing sequence number check shared by every stream consumer.
#[derive(Debug, Clone, Default)]
pub(crate) struct SequenceTracker {
    last: Option<u64>,
}

impl SequenceTracker {
    pub(crate) fn observe(&mut self, received: u64) -> ResponsesResult<()> {
        if let Some(previous) = self.last {
            if received <= previous {
                return Err(ResponsesError::SequenceViolation { previous, received });
            }
        }
        self.last = Some(received);
        Ok(())
    }

    pub(crate) fn last(&self) -> Option<u64> {
        self.last
    }
}

#[derive(Debug, Clone, Default)]
struct ItemAccumulator {
    output_index: Option<u32>,
    item: Option<OutputItem>,
    announced: bool,
    arrival: usize,
    content_text: BTreeMap<u32, String>,
    summary_text: BTreeMap<u32, String>,
}

impl ItemAccumulator {
    // Only the indices the item actually carries are overwritten.
    fn seed_from(&mut self, item: &OutputItem) {
        match item {
            OutputItem::Message(message) => {
                for (index, part) in message.content.iter().enumerate() {
                    if let Some(text) = part.as_text() {
                        self.content_text.insert(index as u32, text.to_string());
                    }
                }
            }
            OutputItem::Reasoning(reasoning) => {
                for (index, part) in reasoning.summary.iter().enumerate() {
                    if let Some(text) = part.as_text() {
                        self.summary_text.insert(index as u32, text.to_string());
                    }
                }
            }
            OutputItem::Unknown(_) => {}
        }
    }

    // Item with buffered text applied on top of its last known form.
    fn materialize(&self) -> Option<OutputItem> {
        let mut item = self.item.clone()?;
        match &mut item {
            // Parts the item already has are overwritten in place; buffered
            // indices past its end are appended in index order, never padded.
            OutputItem::Message(message) => {
                for (&index, text) in &self.content_text {
                    match message.content.get_mut(index as usize) {
                        Some(ContentPart::OutputText { text: slot, .. }) => slot.clone_from(text),
                        Some(_) => {}
                        None => message.content.push(ContentPart::text(text.clone())),
                    }
                }
            }
            OutputItem::Reasoning(reasoning) => {
                for (&index, text) in &self.summary_text {
                    match reasoning.summary.get_mut(index as usize) {
                        Some(SummaryPart::SummaryText { text: slot }) => slot.clone_from(text),
                        Some(_) => {}
                        None => reasoning.summary.push(SummaryPart::text(text.clone())),
                    }
                }
            }
            OutputItem::Unknown(_) => {}
        }
        Some(item)
    }
}

/// Folds an ordered event sequence into one [`Response`].
///
/// The aggregator owns all partial state for a single stream. Feed it with
/// [`consume`](Self::consume); read the outcome with
/// [`finalize`](Self::finalize). Any sequence violation, malformed event,
/// failure event or cancellation is terminal and sticky: later calls report
/// the same error.
#[derive(Debug, Default)]
pub struct ResponseAggregator {
    state: Option<AggregatorState>,
    sequence: SequenceTracker,
    events_seen: usize,
    snapshot: Option<Response>,
    items: HashMap<String, ItemAccumulator>,
    outcome: Option<ResponsesResult<Response>>,
}

impl ResponseAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AggregatorState {
        self.state.unwrap_or(AggregatorState::Idle)
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn last_sequence_number(&self) -> Option<u64> {
        self.sequence.last()
    }

    /// Events accepted so far, including ones with an unrecognized tag.
    pub fn events_seen(&self) -> usize {
        self.events_seen
    }

    /// Latest snapshot as sent by the server, without accumulated deltas.
    pub fn latest_snapshot(&self) -> Option<&Response> {
        self.snapshot.as_ref()
    }

    pub fn content_text(&self, item_id: &str, content_index: u32) -> Option<&str> {
        self.items
            .get(item_id)?
            .content_text
            .get(&content_index)
            .map(String::as_str)
    }

    pub fn summary_text(&self, item_id: &str, summary_index: u32) -> Option<&str> {
        self.items
            .get(item_id)?
            .summary_text
            .get(&summary_index)
            .map(String::as_str)
    }

    /// Best current view of the response: the final result once completed,
    /// otherwise the latest snapshot with every accumulated item and text
    /// buffer applied, ordered by output index.
    pub fn partial_response(&self) -> Option<Response> {
        if let Some(Ok(response)) = &self.outcome {
            return Some(response.clone());
        }

        let mut response = self.snapshot.clone()?;
        let mut pending: Vec<&ItemAccumulator> = Vec::new();

        for accumulator in self.items.values() {
            let Some(item) = accumulator.materialize() else {
                continue;
            };
            let existing = item
                .id()
                .and_then(|id| response.output.iter().position(|o| o.id() == Some(id)));
            match existing {
                Some(position) => response.output[position] = item,
                None => pending.push(accumulator),
            }
        }

        pending.sort_by_key(|acc| (acc.output_index.unwrap_or(u32::MAX), acc.arrival));
        for accumulator in pending {
            let Some(item) = accumulator.materialize() else {
                continue;
            };
            match accumulator.output_index.map(|index| index as usize) {
                Some(index) if index <= response.output.len() => response.output.insert(index, item),
                _ => response.output.push(item),
            }
        }

        Some(response)
    }

    /// Applies one event. Returns the update to surface, if the event produced one.
    pub fn consume(&mut self, event: ResponseEvent) -> ResponsesResult<Option<ResponseUpdate>> {
        match &self.outcome {
            Some(Err(err)) => return Err(err.clone()),
            Some(Ok(_)) => {
                warn!(
                    event_type = event.event_type(),
                    sequence_number = event.sequence_number(),
                    "Ignoring event after response.completed"
                );
                return Ok(None);
            }
            None => {}
        }

        if let Err(err) = self.sequence.observe(event.sequence_number()) {
            warn!(error = %err, "Event out of order");
            return Err(self.fail(err));
        }
        self.events_seen += 1;

        trace!(
            event_type = event.event_type(),
            sequence_number = event.sequence_number(),
            "Applying event"
        );

        match self.apply(event) {
            Ok(update) => Ok(update),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Records that the transport delivered its last record. Without a prior
    /// `response.completed` this ends the aggregation as incomplete.
    pub fn end_of_stream(&mut self) {
        if self.outcome.is_none() {
            let err = ResponsesError::IncompleteStream {
                events_seen: self.events_seen,
                last_sequence: self.sequence.last(),
            };
            warn!(error = %err, "Stream ended early");
            self.fail(err);
        }
    }

    /// Ends the aggregation with a failure originating outside the event
    /// sequence (transport error, undecodable record). No-op once terminal.
    pub fn fail(&mut self, err: ResponsesError) -> ResponsesError {
        if self.outcome.is_none() {
            self.state = Some(if err.is_cancelled() {
                AggregatorState::Cancelled
            } else {
                AggregatorState::Failed
            });
            self.outcome = Some(Err(err.clone()));
        }
        err
    }

    /// Abandons the aggregation. A stream that already reached a terminal
    /// state keeps its outcome.
    pub fn cancel(&mut self, reason: CancelReason) {
        if self.outcome.is_none() {
            debug!(%reason, events_seen = self.events_seen, "Response stream cancelled");
            self.fail(ResponsesError::Cancelled(reason));
        }
    }

    /// Returns the terminal result. Calling this before a terminal state is
    /// reached means no more events will come, so the aggregation ends as
    /// incomplete. Idempotent.
    pub fn finalize(&mut self) -> ResponsesResult<Response> {
        self.end_of_stream();
        match &self.outcome {
            Some(outcome) => outcome.clone(),
            None => Err(ResponsesError::IncompleteStream {
                events_seen: self.events_seen,
                last_sequence: self.sequence.last(),
            }),
        }
    }

    fn apply(&mut self, event: ResponseEvent) -> ResponsesResult<Option<ResponseUpdate>> {
        match event {
            ResponseEvent::Created(snapshot) => {
                if self.state() != AggregatorState::Idle {
                    return Err(ResponsesError::malformed(format!(
                        "response.created received in state {:?}",
                        self.state()
                    )));
                }
                Ok(self.apply_snapshot(AggregatorState::Created, snapshot))
            }
            ResponseEvent::InProgress(snapshot) => {
                Ok(self.apply_snapshot(AggregatorState::InProgress, snapshot))
            }
            ResponseEvent::Completed(snapshot) => {
                self.require_started(event_types::RESPONSE_COMPLETED)?;
                self.apply_completed(snapshot).map(|_| None)
            }
            ResponseEvent::Failed(snapshot) => {
                self.require_started(event_types::RESPONSE_FAILED)?;
                Err(Self::failed_snapshot(snapshot))
            }
            ResponseEvent::Error(error) => Err(Self::error_event(error)),
            ResponseEvent::OutputItemAdded(added) => self.apply_item_added(added),
            ResponseEvent::ReasoningSummaryPartAdded(added) => self.apply_summary_part(added),
            ResponseEvent::ReasoningSummaryTextDelta(delta) => self.apply_summary_delta(delta),
            ResponseEvent::MessageContentPartAdded(added) => self.apply_content_part(added),
            ResponseEvent::MessageContentTextDelta(delta) => self.apply_content_delta(delta),
            ResponseEvent::Unknown(unknown) => {
                debug!(
                    event_type = %unknown.event_type,
                    sequence_number = unknown.sequence_number,
                    "Skipping unrecognized event"
                );
                Ok(None)
            }
        }
    }

    // A terminal snapshot is only valid once the response has been announced.
    fn require_started(&self, event_type: &str) -> ResponsesResult<()> {
        if self.state() == AggregatorState::Idle {
            return Err(ResponsesError::malformed(format!(
                "{} received before response.created",
                event_type
            )));
        }
        Ok(())
    }

    fn apply_snapshot(
        &mut self,
        state: AggregatorState,
        snapshot: SnapshotEvent,
    ) -> Option<ResponseUpdate> {
        self.state = Some(state);
        let response = snapshot.response?;

        for (index, item) in response.output.iter().enumerate() {
            let Some(id) = item.id() else { continue };
            let arrival = self.items.len();
            let accumulator = self
                .items
                .entry(id.to_string())
                .or_insert_with(|| ItemAccumulator {
                    arrival,
                    ..Default::default()
                });
            accumulator.output_index = Some(index as u32);
            accumulator.item = Some(item.clone());
            accumulator.seed_from(item);
        }

        self.snapshot = Some(response.clone());
        Some(ResponseUpdate::Snapshot {
            sequence_number: snapshot.sequence_number,
            response,
        })
    }

    fn apply_completed(&mut self, snapshot: SnapshotEvent) -> ResponsesResult<()> {
        let response = snapshot
            .response
            .ok_or_else(|| ResponsesError::malformed("response.completed carries no response"))?;

        let mut ids = HashSet::new();
        for item in &response.output {
            if let Some(id) = item.id() {
                if !ids.insert(id) {
                    return Err(ResponsesError::malformed(format!(
                        "response.completed lists output item {} twice",
                        id
                    )));
                }
            }
        }

        if response.status != ResponseStatus::Completed {
            warn!(status = ?response.status, "response.completed snapshot has unexpected status");
        }
        if response.output.is_empty() {
            warn!(response_id = %response.id, "response.completed snapshot has no output items");
        }
        if let Some(Err(mismatch)) = response.usage.as_ref().map(|usage| usage.check_totals()) {
            warn!(%mismatch, "Inconsistent usage on completed response");
        }
        // The final snapshot is authoritative; drift is only reported.
        for (item_id, field, index) in self.text_drift(&response) {
            warn!(
                %item_id,
                field,
                index,
                "Accumulated text differs from completed response"
            );
        }

        debug!(
            response_id = %response.id,
            events_seen = self.events_seen,
            output_items = response.output.len(),
            "Response completed"
        );

        self.snapshot = Some(response.clone());
        self.state = Some(AggregatorState::Completed);
        self.outcome = Some(Ok(response));
        Ok(())
    }

    // (item id, field, index) of every final text that differs from what the
    // deltas accumulated.
    fn text_drift(&self, response: &Response) -> Vec<(String, &'static str, usize)> {
        let mut drift = Vec::new();
        for item in &response.output {
            let Some((id, accumulator)) = item
                .id()
                .and_then(|id| self.items.get(id).map(|acc| (id, acc)))
            else {
                continue;
            };
            let (field, final_texts, buffers): (&'static str, Vec<Option<&str>>, _) = match item {
                OutputItem::Message(message) => (
                    "content",
                    message.content.iter().map(ContentPart::as_text).collect(),
                    &accumulator.content_text,
                ),
                OutputItem::Reasoning(reasoning) => (
                    "summary",
                    reasoning.summary.iter().map(SummaryPart::as_text).collect(),
                    &accumulator.summary_text,
                ),
                OutputItem::Unknown(_) => continue,
            };
            for (index, text) in final_texts.into_iter().enumerate() {
                let (Some(text), Some(buffered)) = (text, buffers.get(&(index as u32))) else {
                    continue;
                };
                if buffered != text {
                    drift.push((id.to_string(), field, index));
                }
            }
        }
        drift
    }

    fn failed_snapshot(snapshot: SnapshotEvent) -> ResponsesError {
        let (response_id, code, message) = match snapshot.response {
            Some(response) => {
                let (code, message) = response
                    .error
                    .map(|e| (e.code, e.message))
                    .unwrap_or((None, "response failed".to_string()));
                (response.id, code, message)
            }
            None => (String::new(), None, "response failed".to_string()),
        };
        ResponsesError::Transport(TransportError::ResponseFailed {
            response_id,
            code,
            message,
        })
    }

    fn error_event(error: ErrorEvent) -> ResponsesError {
        ErrorMapper::map_error_type(
            error.error_type.as_deref(),
            error.code,
            error.message.unwrap_or_else(|| "stream reported an error".to_string()),
            error.param,
        )
    }

    fn apply_item_added(
        &mut self,
        added: OutputItemAddedEvent,
    ) -> ResponsesResult<Option<ResponseUpdate>> {
        let item = added
            .item
            .ok_or_else(|| ResponsesError::malformed("response.output_item.added carries no item"))?;

        if let Some(id) = item.id() {
            let arrival = self.items.len();
            let accumulator = self
                .items
                .entry(id.to_string())
                .or_insert_with(|| ItemAccumulator {
                    arrival,
                    ..Default::default()
                });
            if accumulator.announced {
                return Err(ResponsesError::malformed(format!(
                    "output item {} added twice",
                    id
                )));
            }
            accumulator.announced = true;
            accumulator.output_index = added.output_index.or(accumulator.output_index);
            accumulator.item = Some(item.clone());
            accumulator.seed_from(&item);
        }

        Ok(Some(ResponseUpdate::ItemAdded {
            sequence_number: added.sequence_number,
            output_index: added.output_index,
            item,
        }))
    }

    fn apply_summary_part(
        &mut self,
        added: SummaryPartAddedEvent,
    ) -> ResponsesResult<Option<ResponseUpdate>> {
        let (item_id, summary_index) =
            require_target(added.item_id, added.summary_index, "summary_index", "summary part")?;

        let accumulator = self.accumulator(&item_id, added.output_index);
        let buffer = accumulator.summary_text.entry(summary_index).or_default();
        if buffer.is_empty() {
            if let Some(text) = added.part.as_ref().and_then(SummaryPart::as_text) {
                buffer.push_str(text);
            }
        }

        Ok(Some(ResponseUpdate::SummaryPartAdded {
            sequence_number: added.sequence_number,
            item_id,
            summary_index,
            part: added.part,
        }))
    }

    fn apply_content_part(
        &mut self,
        added: ContentPartAddedEvent,
    ) -> ResponsesResult<Option<ResponseUpdate>> {
        let (item_id, content_index) =
            require_target(added.item_id, added.content_index, "content_index", "content part")?;

        let accumulator = self.accumulator(&item_id, added.output_index);
        let buffer = accumulator.content_text.entry(content_index).or_default();
        if buffer.is_empty() {
            if let Some(text) = added.part.as_ref().and_then(ContentPart::as_text) {
                buffer.push_str(text);
            }
        }

        Ok(Some(ResponseUpdate::ContentPartAdded {
            sequence_number: added.sequence_number,
            item_id,
            content_index,
            part: added.part,
        }))
    }

    fn apply_summary_delta(
        &mut self,
        delta: SummaryTextDeltaEvent,
    ) -> ResponsesResult<Option<ResponseUpdate>> {
        let (item_id, summary_index) =
            require_target(delta.item_id, delta.summary_index, "summary_index", "summary delta")?;

        let Some(text) = delta.delta else {
            return Ok(None);
        };
        self.accumulator(&item_id, delta.output_index)
            .summary_text
            .entry(summary_index)
            .or_default()
            .push_str(&text);

        Ok(Some(ResponseUpdate::SummaryTextDelta {
            sequence_number: delta.sequence_number,
            item_id,
            summary_index,
            delta: text,
            obfuscation: delta.obfuscation,
        }))
    }

    fn apply_content_delta(
        &mut self,
        delta: ContentTextDeltaEvent,
    ) -> ResponsesResult<Option<ResponseUpdate>> {
        let (item_id, content_index) =
            require_target(delta.item_id, delta.content_index, "content_index", "text delta")?;

        let Some(text) = delta.delta else {
            return Ok(None);
        };
        self.accumulator(&item_id, delta.output_index)
            .content_text
            .entry(content_index)
            .or_default()
            .push_str(&text);

        Ok(Some(ResponseUpdate::ContentTextDelta {
            sequence_number: delta.sequence_number,
            item_id,
            content_index,
            delta: text,
        }))
    }

    // Parts and deltas may reference an item before its added event.
    fn accumulator(&mut self, item_id: &str, output_index: Option<u32>) -> &mut ItemAccumulator {
        let arrival = self.items.len();
        let accumulator = self.items.entry(item_id.to_string()).or_insert_with(|| {
            debug!(item_id, "Event references an item not announced yet");
            ItemAccumulator {
                arrival,
                ..Default::default()
            }
        });
        if accumulator.output_index.is_none() {
            accumulator.output_index = output_index;
        }
        accumulator
    }
}

fn require_target(
    item_id: Option<String>,
    index: Option<u32>,
    index_name: &str,
    what: &str,
) -> ResponsesResult<(String, u32)> {
    let item_id =
        item_id.ok_or_else(|| ResponsesError::malformed(format!("{} has no item_id", what)))?;
    let index = index
        .ok_or_else(|| ResponsesError::malformed(format!("{} has no {}", what, index_name)))?;
    Ok((item_id, index))
}

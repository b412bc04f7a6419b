use crate::errors::{ResponsesError, ResponsesResult};
use crate::services::responses::{ContentPart, OutputItem, Response, SummaryPart};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Wire tags of the events this crate understands.
pub mod event_types {
    pub const RESPONSE_CREATED: &str = "response.created";
    pub const RESPONSE_IN_PROGRESS: &str = "response.in_progress";
    pub const RESPONSE_COMPLETED: &str = "response.completed";
    pub const RESPONSE_FAILED: &str = "response.failed";
    pub const OUTPUT_ITEM_ADDED: &str = "response.output_item.added";
    pub const REASONING_SUMMARY_PART_ADDED: &str = "response.reasoning_summary_part.added";
    pub const REASONING_SUMMARY_TEXT_DELTA: &str = "response.reasoning_summary_text.delta";
    pub const CONTENT_PART_ADDED: &str = "response.content_part.added";
    pub const OUTPUT_TEXT_DELTA: &str = "response.output_text.delta";
    /// Older spelling of [`CONTENT_PART_ADDED`], still decoded.
    pub const MESSAGE_CONTENT_PART_ADDED: &str = "response.message_content.part.added";
    /// Older spelling of [`OUTPUT_TEXT_DELTA`], still decoded.
    pub const MESSAGE_CONTENT_TEXT_DELTA: &str = "response.message_content.text.delta";
    pub const ERROR: &str = "error";
}

/// One decoded stream record.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEvent {
    Created(SnapshotEvent),
    InProgress(SnapshotEvent),
    Completed(SnapshotEvent),
    Failed(SnapshotEvent),
    OutputItemAdded(OutputItemAddedEvent),
    ReasoningSummaryPartAdded(SummaryPartAddedEvent),
    ReasoningSummaryTextDelta(SummaryTextDeltaEvent),
    MessageContentPartAdded(ContentPartAddedEvent),
    MessageContentTextDelta(ContentTextDeltaEvent),
    Error(ErrorEvent),
    /// A tag this crate does not interpret. Still sequence-checked.
    Unknown(UnknownEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEvent {
    pub sequence_number: u64,
    pub response: Option<Response>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputItemAddedEvent {
    pub sequence_number: u64,
    pub output_index: Option<u32>,
    pub item: Option<OutputItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryPartAddedEvent {
    pub sequence_number: u64,
    pub item_id: Option<String>,
    pub output_index: Option<u32>,
    pub summary_index: Option<u32>,
    pub part: Option<SummaryPart>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTextDeltaEvent {
    pub sequence_number: u64,
    pub item_id: Option<String>,
    pub output_index: Option<u32>,
    pub summary_index: Option<u32>,
    pub delta: Option<String>,
    /// Padding token some servers attach to deltas; carried through untouched.
    pub obfuscation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentPartAddedEvent {
    pub sequence_number: u64,
    pub item_id: Option<String>,
    pub output_index: Option<u32>,
    pub content_index: Option<u32>,
    pub part: Option<ContentPart>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentTextDeltaEvent {
    pub sequence_number: u64,
    pub item_id: Option<String>,
    pub output_index: Option<u32>,
    pub content_index: Option<u32>,
    pub delta: Option<String>,
    pub obfuscation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEvent {
    pub sequence_number: u64,
    pub error_type: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
    pub param: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnknownEvent {
    pub event_type: String,
    pub sequence_number: u64,
}

impl ResponseEvent {
    pub fn sequence_number(&self) -> u64 {
        match self {
            ResponseEvent::Created(e)
            | ResponseEvent::InProgress(e)
            | ResponseEvent::Completed(e)
            | ResponseEvent::Failed(e) => e.sequence_number,
            ResponseEvent::OutputItemAdded(e) => e.sequence_number,
            ResponseEvent::ReasoningSummaryPartAdded(e) => e.sequence_number,
            ResponseEvent::ReasoningSummaryTextDelta(e) => e.sequence_number,
            ResponseEvent::MessageContentPartAdded(e) => e.sequence_number,
            ResponseEvent::MessageContentTextDelta(e) => e.sequence_number,
            ResponseEvent::Error(e) => e.sequence_number,
            ResponseEvent::Unknown(e) => e.sequence_number,
        }
    }

    pub fn event_type(&self) -> &str {
        match self {
            ResponseEvent::Created(_) => event_types::RESPONSE_CREATED,
            ResponseEvent::InProgress(_) => event_types::RESPONSE_IN_PROGRESS,
            ResponseEvent::Completed(_) => event_types::RESPONSE_COMPLETED,
            ResponseEvent::Failed(_) => event_types::RESPONSE_FAILED,
            ResponseEvent::OutputItemAdded(_) => event_types::OUTPUT_ITEM_ADDED,
            ResponseEvent::ReasoningSummaryPartAdded(_) => event_types::REASONING_SUMMARY_PART_ADDED,
            ResponseEvent::ReasoningSummaryTextDelta(_) => event_types::REASONING_SUMMARY_TEXT_DELTA,
            ResponseEvent::MessageContentPartAdded(_) => event_types::CONTENT_PART_ADDED,
            ResponseEvent::MessageContentTextDelta(_) => event_types::OUTPUT_TEXT_DELTA,
            ResponseEvent::Error(_) => event_types::ERROR,
            ResponseEvent::Unknown(e) => &e.event_type,
        }
    }

    /// Snapshot payload carried by the lifecycle tags.
    pub fn response(&self) -> Option<&Response> {
        match self {
            ResponseEvent::Created(e)
            | ResponseEvent::InProgress(e)
            | ResponseEvent::Completed(e)
            | ResponseEvent::Failed(e) => e.response.as_ref(),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResponseEvent::Completed(_) | ResponseEvent::Failed(_) | ResponseEvent::Error(_)
        )
    }
}

/// Turns one raw wire record into a typed [`ResponseEvent`].
///
/// A record without a string `type` or an unsigned integer `sequence_number`
/// is malformed. Fields the tag does not use are ignored; a field the tag uses
/// but with the wrong shape is malformed. `null` counts as absent.
pub struct EventDecoder;

impl EventDecoder {
    pub fn decode(record: Value) -> ResponsesResult<ResponseEvent> {
        let map = match record {
            Value::Object(map) => map,
            other => {
                return Err(ResponsesError::malformed(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let mut fields = RecordFields::new(map)?;
        let sequence_number = fields.sequence_number;

        let event = match fields.event_type.as_str() {
            event_types::RESPONSE_CREATED => ResponseEvent::Created(fields.snapshot()?),
            event_types::RESPONSE_IN_PROGRESS => ResponseEvent::InProgress(fields.snapshot()?),
            event_types::RESPONSE_COMPLETED => ResponseEvent::Completed(fields.snapshot()?),
            event_types::RESPONSE_FAILED => ResponseEvent::Failed(fields.snapshot()?),
            event_types::OUTPUT_ITEM_ADDED => {
                ResponseEvent::OutputItemAdded(OutputItemAddedEvent {
                    sequence_number,
                    output_index: fields.take("output_index")?,
                    item: fields.take("item")?,
                })
            }
            event_types::REASONING_SUMMARY_PART_ADDED => {
                ResponseEvent::ReasoningSummaryPartAdded(SummaryPartAddedEvent {
                    sequence_number,
                    item_id: fields.take("item_id")?,
                    output_index: fields.take("output_index")?,
                    summary_index: fields.take("summary_index")?,
                    part: fields.take("part")?,
                })
            }
            event_types::REASONING_SUMMARY_TEXT_DELTA => {
                ResponseEvent::ReasoningSummaryTextDelta(SummaryTextDeltaEvent {
                    sequence_number,
                    item_id: fields.take("item_id")?,
                    output_index: fields.take("output_index")?,
                    summary_index: fields.take("summary_index")?,
                    delta: fields.take("delta")?,
                    obfuscation: fields.take("obfuscation")?,
                })
            }
            event_types::CONTENT_PART_ADDED | event_types::MESSAGE_CONTENT_PART_ADDED => {
                ResponseEvent::MessageContentPartAdded(ContentPartAddedEvent {
                    sequence_number,
                    item_id: fields.take("item_id")?,
                    output_index: fields.take("output_index")?,
                    content_index: fields.take("content_index")?,
                    part: fields.take("part")?,
                })
            }
            event_types::OUTPUT_TEXT_DELTA | event_types::MESSAGE_CONTENT_TEXT_DELTA => {
                ResponseEvent::MessageContentTextDelta(ContentTextDeltaEvent {
                    sequence_number,
                    item_id: fields.take("item_id")?,
                    output_index: fields.take("output_index")?,
                    content_index: fields.take("content_index")?,
                    delta: fields.take("delta")?,
                    obfuscation: fields.take("obfuscation")?,
                })
            }
            event_types::ERROR => ResponseEvent::Error(fields.error()?),
            _ => ResponseEvent::Unknown(UnknownEvent {
                event_type: fields.event_type,
                sequence_number,
            }),
        };

        Ok(event)
    }

    pub fn decode_str(data: &str) -> ResponsesResult<ResponseEvent> {
        let record: Value = serde_json::from_str(data)
            .map_err(|e| ResponsesError::malformed(format!("record is not valid JSON: {}", e)))?;
        Self::decode(record)
    }
}

struct RecordFields {
    event_type: String,
    sequence_number: u64,
    map: Map<String, Value>,
}

impl RecordFields {
    fn new(mut map: Map<String, Value>) -> ResponsesResult<Self> {
        let event_type = match map.remove("type") {
            Some(Value::String(tag)) => tag,
            Some(other) => {
                return Err(ResponsesError::malformed(format!(
                    "event `type` must be a string, got {}",
                    json_kind(&other)
                )))
            }
            None => return Err(ResponsesError::malformed("event has no `type`")),
        };

        let sequence_number = match map.remove("sequence_number") {
            Some(value) => value.as_u64().ok_or_else(|| {
                ResponsesError::malformed(format!(
                    "{}: `sequence_number` must be a non-negative integer, got {}",
                    event_type, value
                ))
            })?,
            None => {
                return Err(ResponsesError::malformed(format!(
                    "{}: event has no `sequence_number`",
                    event_type
                )))
            }
        };

        Ok(Self {
            event_type,
            sequence_number,
            map,
        })
    }

    fn take<T: DeserializeOwned>(&mut self, key: &str) -> ResponsesResult<Option<T>> {
        match self.map.remove(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                ResponsesError::malformed(format!("{}: field `{}`: {}", self.event_type, key, e))
            }),
        }
    }

    fn snapshot(&mut self) -> ResponsesResult<SnapshotEvent> {
        Ok(SnapshotEvent {
            sequence_number: self.sequence_number,
            response: self.take("response")?,
        })
    }

    // Error details arrive either flat on the record or nested under `error`.
    fn error(&mut self) -> ResponsesResult<ErrorEvent> {
        if let Some(Value::Object(nested)) = self.map.remove("error") {
            self.map.extend(nested);
        }

        Ok(ErrorEvent {
            sequence_number: self.sequence_number,
            error_type: self.take("type")?,
            code: self.take_lossy_string("code"),
            message: self.take("message")?,
            param: self.take("param")?,
        })
    }

    // Error codes show up as either strings or numbers.
    fn take_lossy_string(&mut self, key: &str) -> Option<String> {
        match self.map.remove(key)? {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

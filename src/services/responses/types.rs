use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// One finalized (or snapshot) response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: String,

    #[serde(default = "default_object")]
    pub object: String,

    #[serde(default)]
    pub created_at: i64,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub output: Vec<OutputItem>,

    pub status: ResponseStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Reasoning configuration as echoed by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseErrorDetail>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incomplete_details: Option<Value>,
}

fn default_object() -> String {
    "response".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    Incomplete,
    Cancelled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Developer,
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    InProgress,
    Completed,
    Incomplete,
    #[serde(other)]
    Unknown,
}

/// One entry of `Response::output`.
///
/// Decoding dispatches on the `type` field; an unfamiliar type keeps its raw
/// JSON in `Unknown` instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputItem {
    Message(OutputMessage),
    Reasoning(ReasoningItem),
    Unknown(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputMessage {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub content: Vec<ContentPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningItem {
    pub id: String,

    /// Opaque trace token; re-supplied verbatim to continue reasoning in a later request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_content: Option<String>,

    #[serde(default)]
    pub summary: Vec<SummaryPart>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    OutputText {
        text: String,
        annotations: Vec<Value>,
    },
    Refusal {
        refusal: String,
    },
    Unknown(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryPart {
    SummaryText { text: String },
    Unknown(Value),
}

impl OutputItem {
    pub fn id(&self) -> Option<&str> {
        match self {
            OutputItem::Message(message) => Some(&message.id),
            OutputItem::Reasoning(reasoning) => Some(&reasoning.id),
            OutputItem::Unknown(raw) => raw.get("id").and_then(Value::as_str),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            OutputItem::Message(_) => "message",
            OutputItem::Reasoning(_) => "reasoning",
            OutputItem::Unknown(raw) => raw.get("type").and_then(Value::as_str).unwrap_or(""),
        }
    }

    pub fn as_message(&self) -> Option<&OutputMessage> {
        match self {
            OutputItem::Message(message) => Some(message),
            _ => None,
        }
    }

    pub fn as_reasoning(&self) -> Option<&ReasoningItem> {
        match self {
            OutputItem::Reasoning(reasoning) => Some(reasoning),
            _ => None,
        }
    }
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::OutputText {
            text: text.into(),
            annotations: Vec::new(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::OutputText { text, .. } => Some(text),
            _ => None,
        }
    }
}

impl SummaryPart {
    pub fn text(text: impl Into<String>) -> Self {
        SummaryPart::SummaryText { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SummaryPart::SummaryText { text } => Some(text),
            SummaryPart::Unknown(_) => None,
        }
    }
}

// The tagged unions below are decoded through `Value` so that an unfamiliar
// `type` lands in the `Unknown` variant with its payload intact.

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedOutputItem<'a> {
    Message(&'a OutputMessage),
    Reasoning(&'a ReasoningItem),
}

impl Serialize for OutputItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OutputItem::Message(message) => TaggedOutputItem::Message(message).serialize(serializer),
            OutputItem::Reasoning(reasoning) => {
                TaggedOutputItem::Reasoning(reasoning).serialize(serializer)
            }
            OutputItem::Unknown(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for OutputItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        match raw.get("type").and_then(Value::as_str) {
            Some("message") => serde_json::from_value(raw)
                .map(OutputItem::Message)
                .map_err(de::Error::custom),
            Some("reasoning") => serde_json::from_value(raw)
                .map(OutputItem::Reasoning)
                .map_err(de::Error::custom),
            _ => Ok(OutputItem::Unknown(raw)),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedContentPart {
    OutputText {
        #[serde(default)]
        text: String,
        #[serde(default)]
        annotations: Vec<Value>,
    },
    Refusal {
        #[serde(default)]
        refusal: String,
    },
}

impl Serialize for ContentPart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ContentPart::OutputText { text, annotations } => TaggedContentPart::OutputText {
                text: text.clone(),
                annotations: annotations.clone(),
            }
            .serialize(serializer),
            ContentPart::Refusal { refusal } => TaggedContentPart::Refusal {
                refusal: refusal.clone(),
            }
            .serialize(serializer),
            ContentPart::Unknown(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ContentPart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        match raw.get("type").and_then(Value::as_str) {
            Some("output_text") | Some("refusal") => {
                let tagged: TaggedContentPart =
                    serde_json::from_value(raw).map_err(de::Error::custom)?;
                Ok(match tagged {
                    TaggedContentPart::OutputText { text, annotations } => {
                        ContentPart::OutputText { text, annotations }
                    }
                    TaggedContentPart::Refusal { refusal } => ContentPart::Refusal { refusal },
                })
            }
            _ => Ok(ContentPart::Unknown(raw)),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedSummaryPart {
    SummaryText {
        #[serde(default)]
        text: String,
    },
}

impl Serialize for SummaryPart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SummaryPart::SummaryText { text } => {
                TaggedSummaryPart::SummaryText { text: text.clone() }.serialize(serializer)
            }
            SummaryPart::Unknown(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SummaryPart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        match raw.get("type").and_then(Value::as_str) {
            Some("summary_text") => {
                let TaggedSummaryPart::SummaryText { text } =
                    serde_json::from_value(raw).map_err(de::Error::custom)?;
                Ok(SummaryPart::SummaryText { text })
            }
            _ => Ok(SummaryPart::Unknown(raw)),
        }
    }
}

/// Token accounting for one response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens_details: Option<InputTokensDetails>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens_details: Option<OutputTokensDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputTokensDetails {
    #[serde(default)]
    pub cached_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTokensDetails {
    #[serde(default)]
    pub reasoning_tokens: Option<u32>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("usage total {total} does not equal input {input} + output {output}")]
pub struct UsageMismatch {
    pub input: u32,
    pub output: u32,
    pub total: u32,
}

impl Usage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens: Some(input_tokens),
            output_tokens: Some(output_tokens),
            total_tokens: Some(input_tokens.saturating_add(output_tokens)),
            input_tokens_details: None,
            output_tokens_details: None,
        }
    }

    /// Checks `total = input + output` whenever both counts are known and output is non-zero.
    pub fn check_totals(&self) -> Result<(), UsageMismatch> {
        match (self.input_tokens, self.output_tokens, self.total_tokens) {
            (Some(input), Some(output), Some(total))
                if output > 0 && input.checked_add(output) != Some(total) =>
            {
                Err(UsageMismatch {
                    input,
                    output,
                    total,
                })
            }
            _ => Ok(()),
        }
    }
}

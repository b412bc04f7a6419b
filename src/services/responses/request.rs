use crate::errors::ResponsesResult;
use crate::services::responses::{ReasoningItem, ResponseRequestValidator, Role, SummaryPart};
use serde::{Deserialize, Serialize};

/// A validated request. Only obtainable through [`ResponseRequest::new`], so
/// every value of this type has passed [`ResponseRequestValidator`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseRequest {
    model: String,
    input: Vec<ResponseInputItem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<ReasoningConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    include: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,

    stream: bool,

    // Responses are never persisted server-side; reasoning continuity relies
    // on the encrypted trace instead.
    store: bool,
}

/// Everything a caller supplies to build a [`ResponseRequest`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    pub model: String,
    pub input: Vec<ResponseInputItem>,
    pub reasoning: Option<ReasoningConfig>,
    pub include: Option<Vec<String>>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub instructions: Option<String>,
    pub stream: bool,
}

impl RequestParams {
    pub fn new(model: impl Into<String>, input: Vec<ResponseInputItem>) -> Self {
        Self {
            model: model.into(),
            input,
            ..Default::default()
        }
    }

    pub fn with_reasoning(mut self, reasoning: ReasoningConfig) -> Self {
        self.reasoning = Some(reasoning);
        self
    }

    pub fn with_include(mut self, include: Vec<String>) -> Self {
        self.include = Some(include);
        self
    }

    /// Asks the server to return the encrypted reasoning trace on reasoning items.
    pub fn with_encrypted_reasoning(self) -> Self {
        self.with_include(vec![INCLUDE_ENCRYPTED_REASONING.to_string()])
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn build(self) -> ResponsesResult<ResponseRequest> {
        ResponseRequest::new(self)
    }
}

pub const INCLUDE_ENCRYPTED_REASONING: &str = "reasoning.encrypted_content";

impl ResponseRequest {
    pub fn new(params: RequestParams) -> ResponsesResult<Self> {
        ResponseRequestValidator::validate(&params)?;

        Ok(Self {
            model: params.model,
            input: params.input,
            reasoning: params.reasoning,
            include: params.include,
            temperature: params.temperature,
            max_output_tokens: params.max_output_tokens,
            instructions: params.instructions,
            stream: params.stream,
            store: false,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn input(&self) -> &[ResponseInputItem] {
        &self.input
    }

    pub fn reasoning(&self) -> Option<&ReasoningConfig> {
        self.reasoning.as_ref()
    }

    pub fn include(&self) -> Option<&[String]> {
        self.include.as_deref()
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    pub fn max_output_tokens(&self) -> Option<u32> {
        self.max_output_tokens
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    pub fn is_stream(&self) -> bool {
        self.stream
    }

    pub fn store(&self) -> bool {
        self.store
    }

    pub(crate) fn into_stream_mode(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// One entry of the request input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseInputItem {
    Message { role: Role, content: String },
    Reasoning(ReasoningInput),
}

/// A prior reasoning item fed back for continuity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasoningInput {
    #[serde(default)]
    pub content: Vec<ReasoningContentPart>,

    #[serde(default)]
    pub summary: Vec<SummaryPart>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReasoningContentPart {
    ReasoningText { text: String },
}

impl ResponseInputItem {
    pub fn message(role: Role, content: impl Into<String>) -> Self {
        ResponseInputItem::Message {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::message(Role::System, content)
    }

    pub fn developer(content: impl Into<String>) -> Self {
        Self::message(Role::Developer, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::message(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::message(Role::Assistant, content)
    }

    /// Continuation input carrying a reasoning item's summary and encrypted
    /// trace from an earlier response. Content parts are left empty.
    pub fn reasoning_continuation(item: &ReasoningItem) -> Self {
        ResponseInputItem::Reasoning(ReasoningInput {
            content: Vec::new(),
            summary: item.summary.clone(),
            encrypted_content: item.encrypted_content.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasoningConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<ReasoningEffort>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReasoningSummary>,
}

impl ReasoningConfig {
    pub fn new(effort: ReasoningEffort) -> Self {
        Self {
            effort: Some(effort),
            summary: None,
        }
    }

    pub fn with_summary(mut self, summary: ReasoningSummary) -> Self {
        self.summary = Some(summary);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningSummary {
    Auto,
    Concise,
    Detailed,
}

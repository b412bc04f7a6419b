use crate::services::responses::{OutputItem, OutputMessage, ReasoningItem, Response};

impl Response {
    /// Text of the first output-text part of the first message item.
    pub fn first_message_text(&self) -> Option<&str> {
        self.messages()
            .next()?
            .content
            .iter()
            .find_map(|part| part.as_text())
    }

    /// All output-text parts of all message items, concatenated in output
    /// order with no separator. `None` when there is no output text at all.
    pub fn output_text(&self) -> Option<String> {
        let mut parts = self
            .messages()
            .flat_map(|message| message.content.iter().filter_map(|part| part.as_text()))
            .peekable();
        parts.peek()?;
        Some(parts.collect())
    }

    pub fn messages(&self) -> impl Iterator<Item = &OutputMessage> {
        self.output.iter().filter_map(OutputItem::as_message)
    }

    pub fn reasoning_items(&self) -> impl Iterator<Item = &ReasoningItem> {
        self.output.iter().filter_map(OutputItem::as_reasoning)
    }

    /// Encrypted trace of the first reasoning item that has one.
    pub fn encrypted_reasoning(&self) -> Option<&str> {
        self.reasoning_items()
            .find_map(|reasoning| reasoning.encrypted_content.as_deref())
    }

    /// Concatenated summary text of every reasoning item.
    pub fn reasoning_summary(&self) -> Option<String> {
        let mut parts = self
            .reasoning_items()
            .flat_map(|reasoning| reasoning.summary.iter().filter_map(|part| part.as_text()))
            .peekable();
        parts.peek()?;
        Some(parts.collect())
    }

    pub fn find_item(&self, id: &str) -> Option<&OutputItem> {
        self.output.iter().find(|item| item.id() == Some(id))
    }
}

//! Complete response bodies

use crate::services::responses::Usage;
use serde_json::{json, Value};

/// Usage block; panics on counts that break total = input + output so a bad
/// fixture can never slip into a test.
pub fn usage_json(input: u32, output: u32, total: u32) -> Value {
    let usage = Usage {
        total_tokens: Some(total),
        ..Usage::new(input, output)
    };
    if let Err(mismatch) = usage.check_totals() {
        panic!("invalid usage fixture: {mismatch}");
    }
    json!({
        "input_tokens": input,
        "input_tokens_details": {"cached_tokens": 0},
        "output_tokens": output,
        "output_tokens_details": {"reasoning_tokens": 0},
        "total_tokens": total
    })
}

pub fn message_item_json(id: &str, text: &str) -> Value {
    json!({
        "type": "message",
        "id": id,
        "status": "completed",
        "role": "assistant",
        "content": [{"type": "output_text", "text": text, "annotations": []}]
    })
}

/// Completed response with a single assistant message.
pub fn response_with_text_json(text: &str) -> Value {
    json!({
        "id": "resp_1",
        "object": "response",
        "created_at": 1741476542,
        "status": "completed",
        "model": "gpt-4o-mini-2024-07-18",
        "output": [message_item_json("msg_1", text)],
        "usage": usage_json(12, 3, 15),
        "metadata": {}
    })
}

pub fn reasoning_item_json() -> Value {
    json!({
        "type": "reasoning",
        "id": "rs_1",
        "encrypted_content": "gAAAAB-trace",
        "summary": [{"type": "summary_text", "text": "Considering greeting"}]
    })
}

/// Completed response with a reasoning item followed by a message.
pub fn reasoning_response_json() -> Value {
    json!({
        "id": "resp_2",
        "object": "response",
        "created_at": 1741476600,
        "status": "completed",
        "model": "o4-mini-2025-04-16",
        "output": [reasoning_item_json(), message_item_json("msg_1", "Hello")],
        "reasoning": {"effort": "low", "summary": "auto"},
        "usage": usage_json(20, 80, 100)
    })
}

/// Response cut short by the token cap.
pub fn incomplete_response_json() -> Value {
    json!({
        "id": "resp_3",
        "object": "response",
        "created_at": 1741476700,
        "status": "incomplete",
        "model": "gpt-4o-mini-2024-07-18",
        "output": [],
        "max_output_tokens": 16,
        "incomplete_details": {"reason": "max_output_tokens"},
        "usage": usage_json(12, 16, 28)
    })
}

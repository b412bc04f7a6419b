//! Stream record fixtures

use crate::fixtures::{
    message_item_json, reasoning_item_json, reasoning_response_json, response_with_text_json,
};
use serde_json::{json, Value};

fn in_flight_response() -> Value {
    json!({
        "id": "resp_1",
        "object": "response",
        "created_at": 1741476542,
        "status": "in_progress",
        "model": "gpt-4o-mini-2024-07-18",
        "output": []
    })
}

pub fn created_event(sequence_number: u64) -> Value {
    json!({
        "type": "response.created",
        "sequence_number": sequence_number,
        "response": in_flight_response()
    })
}

pub fn in_progress_event(sequence_number: u64) -> Value {
    json!({
        "type": "response.in_progress",
        "sequence_number": sequence_number,
        "response": in_flight_response()
    })
}

pub fn message_added_event(sequence_number: u64, item_id: &str, output_index: u32) -> Value {
    json!({
        "type": "response.output_item.added",
        "sequence_number": sequence_number,
        "output_index": output_index,
        "item": {
            "type": "message",
            "id": item_id,
            "status": "in_progress",
            "role": "assistant",
            "content": []
        }
    })
}

pub fn content_part_added_event(sequence_number: u64, item_id: &str, content_index: u32) -> Value {
    json!({
        "type": "response.content_part.added",
        "sequence_number": sequence_number,
        "item_id": item_id,
        "output_index": 0,
        "content_index": content_index,
        "part": {"type": "output_text", "text": "", "annotations": []}
    })
}

pub fn content_delta_event(
    sequence_number: u64,
    item_id: &str,
    content_index: u32,
    delta: &str,
) -> Value {
    json!({
        "type": "response.output_text.delta",
        "sequence_number": sequence_number,
        "item_id": item_id,
        "output_index": 0,
        "content_index": content_index,
        "delta": delta
    })
}

pub fn completed_event(sequence_number: u64, text: &str) -> Value {
    json!({
        "type": "response.completed",
        "sequence_number": sequence_number,
        "response": response_with_text_json(text)
    })
}

/// created, in_progress, one message streamed as "Hel" + "lo", completed.
pub fn hello_stream_events() -> Vec<Value> {
    vec![
        created_event(0),
        in_progress_event(1),
        message_added_event(2, "msg_1", 0),
        content_part_added_event(3, "msg_1", 0),
        content_delta_event(4, "msg_1", 0, "Hel"),
        content_delta_event(5, "msg_1", 0, "lo"),
        json!({
            "type": "response.output_text.done",
            "sequence_number": 6,
            "item_id": "msg_1",
            "output_index": 0,
            "content_index": 0,
            "text": "Hello"
        }),
        completed_event(7, "Hello"),
    ]
}

/// A reasoning item with a streamed summary, then a streamed message.
pub fn reasoning_stream_events() -> Vec<Value> {
    let mut reasoning_item = reasoning_item_json();
    reasoning_item["summary"] = json!([]);

    let mut message_item = message_item_json("msg_1", "");
    message_item["content"] = json!([]);

    vec![
        created_event(0),
        json!({
            "type": "response.output_item.added",
            "sequence_number": 1,
            "output_index": 0,
            "item": reasoning_item
        }),
        json!({
            "type": "response.reasoning_summary_part.added",
            "sequence_number": 2,
            "item_id": "rs_1",
            "output_index": 0,
            "summary_index": 0,
            "part": {"type": "summary_text", "text": ""}
        }),
        json!({
            "type": "response.reasoning_summary_text.delta",
            "sequence_number": 3,
            "item_id": "rs_1",
            "output_index": 0,
            "summary_index": 0,
            "delta": "Considering ",
            "obfuscation": "x1"
        }),
        json!({
            "type": "response.reasoning_summary_text.delta",
            "sequence_number": 4,
            "item_id": "rs_1",
            "output_index": 0,
            "summary_index": 0,
            "delta": "greeting"
        }),
        json!({
            "type": "response.output_item.added",
            "sequence_number": 5,
            "output_index": 1,
            "item": message_item
        }),
        content_delta_event(6, "msg_1", 0, "Hello"),
        json!({
            "type": "response.completed",
            "sequence_number": 7,
            "response": reasoning_response_json()
        }),
    ]
}

/// Formats records as a server-sent event body, terminated by `[DONE]`.
pub fn sse_body(records: &[Value]) -> String {
    let mut body = String::new();
    for record in records {
        let event_type = record["type"].as_str().unwrap_or("message");
        body.push_str(&format!("event: {}\ndata: {}\n\n", event_type, record));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

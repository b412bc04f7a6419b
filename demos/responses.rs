//! Example: Blocking response with reasoning continuation
//!
//! Sends a reasoning request with encrypted reasoning included, then feeds
//! the returned reasoning item back into a follow-up turn.
//!
//! ## Usage
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! cargo run --example responses
//! ```

use integrations_responses::observability::{LogFormat, LoggingConfig};
use integrations_responses::prelude::*;
use integrations_responses::ReasoningSummary;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    LoggingConfig::new().with_format(LogFormat::Compact).init()?;

    let client = ResponsesClientBuilder::new().from_env()?.build()?;

    let question = ResponseInputItem::user("What is the smallest prime greater than 100?");
    let request = RequestParams::new("o4-mini", vec![question.clone()])
        .with_reasoning(ReasoningConfig::new(ReasoningEffort::Low).with_summary(ReasoningSummary::Auto))
        .with_encrypted_reasoning()
        .with_max_output_tokens(2048)
        .build()?;

    let first = client.responses().create(request).await?;
    println!("Answer: {}", first.output_text().unwrap_or_default());
    if let Some(summary) = first.reasoning_summary() {
        println!("Reasoning summary: {}", summary);
    }

    // Replay the reasoning so the model keeps its chain of thought across turns.
    let mut input = vec![question];
    input.extend(first.reasoning_items().map(ResponseInputItem::reasoning_continuation));
    if let Some(answer) = first.output_text() {
        input.push(ResponseInputItem::assistant(answer));
    }
    input.push(ResponseInputItem::user("And the one after that?"));

    let follow_up = RequestParams::new("o4-mini", input)
        .with_reasoning(ReasoningConfig::new(ReasoningEffort::Low))
        .with_encrypted_reasoning()
        .build()?;

    let second = client.responses().create(follow_up).await?;
    println!("Follow-up: {}", second.output_text().unwrap_or_default());

    if let Some(usage) = &second.usage {
        println!(
            "Tokens: {} in, {} out",
            usage.input_tokens.unwrap_or_default(),
            usage.output_tokens.unwrap_or_default()
        );
    }

    Ok(())
}

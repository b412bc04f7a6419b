//! Example: Streaming response
//!
//! Prints text deltas as they arrive, then the assembled response.
//!
//! ## Usage
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! cargo run --example streaming
//! ```

use futures::StreamExt;
use integrations_responses::prelude::*;
use std::io::Write;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ResponsesConfig::from_env()?.with_stream_idle_timeout(Duration::from_secs(30));
    let client = ResponsesClientBuilder::new().with_config(config).build()?;

    let request = RequestParams::new(
        "gpt-4o-mini",
        vec![ResponseInputItem::user(
            "Tell me a short story about a robot learning to paint. Keep it under 200 words.",
        )],
    )
    .build()?;

    let mut stream = client.responses().create_stream(request).await?;

    while let Some(update) = stream.next().await {
        match update {
            Ok(update) => {
                if let Some(delta) = update.text_delta() {
                    print!("{}", delta);
                    std::io::stdout().flush()?;
                }
            }
            Err(e) => {
                eprintln!("\nStream failed: {}", e);
                if let Some(partial) = stream.partial_response() {
                    eprintln!("Partial text: {:?}", partial.output_text());
                }
                return Err(e.into());
            }
        }
    }

    let response = stream.finalize().await?;
    println!("\n\nResponse {} finished with status {:?}", response.id, response.status);

    Ok(())
}

//! `embedgate infer` -- one-shot inference without starting the server.

use embedgate_types::request::{InferenceRequest, InferenceResponse};

use crate::state::AppState;

/// Dispatch one request through the configured backend and print the result.
pub async fn run_infer(
    state: &AppState,
    modality: String,
    input: Vec<f32>,
    json: bool,
) -> anyhow::Result<()> {
    let request = InferenceRequest::new(modality, input);
    let dispatched = state.dispatcher.handle(&request).await?;

    if json {
        let message = dispatched.message().map(str::to_string);
        let source = dispatched.source.label();
        let response = InferenceResponse::ok(dispatched.embedding, message);
        let mut value = serde_json::to_value(&response)?;
        value["source"] = serde_json::Value::from(source);
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let source = if dispatched.source.is_fallback() {
        console::style(dispatched.source.label()).yellow()
    } else {
        console::style(dispatched.source.label()).green()
    };
    let preview: Vec<String> = dispatched
        .embedding
        .as_slice()
        .iter()
        .take(6)
        .map(|v| format!("{v:.4}"))
        .collect();

    println!();
    println!(
        "  {} {} embedding via {}",
        console::style("✓").green(),
        dispatched.embedding.len(),
        source
    );
    if let Some(message) = dispatched.message() {
        println!("  {}", console::style(message).dim());
    }
    println!("  [{}, ...]", preview.join(", "));
    println!();
    Ok(())
}

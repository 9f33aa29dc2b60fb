//! Smoke-test client: one completion request against the deployed endpoint.
//!
//! This is an interactive diagnostic, not a harness: every branch returns
//! normally and the process exits 0 whether the model answered or not.

use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const MODEL_ID: &str = "meta-llama/Meta-Llama-3.1-8B-Instruct";

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn haiku_probe() -> Self {
        Self {
            model: MODEL_ID.to_string(),
            prompt: "Write a haiku about a software engineer fixing a bug.".to_string(),
            max_tokens: 50,
            temperature: 0.7,
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Success { latency_ms: f64, text: String },
    /// Endpoint unreachable (connection refused or timed out).
    ConnectFailed(String),
    /// Anything else: HTTP error status, malformed body.
    Error(String),
}

/// Send exactly one completion request. No retry; a timeout or connection
/// error is terminal for this run.
pub async fn run_completion_probe(base_url: &str, timeout: Duration) -> Outcome {
    let url = format!("{}/v1/completions", base_url.trim_end_matches('/'));
    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => return Outcome::Error(e.to_string()),
    };

    let payload = CompletionRequest::haiku_probe();
    let started = Instant::now();

    let resp = match client.post(&url).json(&payload).send().await {
        Ok(resp) => resp,
        Err(e) if e.is_connect() || e.is_timeout() => {
            return Outcome::ConnectFailed(e.to_string())
        }
        Err(e) => return Outcome::Error(e.to_string()),
    };

    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Outcome::Error(format!("HTTP {}: {}", status.as_u16(), body));
    }

    let body: Value = match resp.json().await {
        Ok(body) => body,
        Err(e) => return Outcome::Error(format!("Malformed response body: {}", e)),
    };

    match body["choices"][0]["text"].as_str() {
        Some(text) => Outcome::Success {
            latency_ms,
            text: text.trim().to_string(),
        },
        None => Outcome::Error("No choices[0].text in response".to_string()),
    }
}

pub fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Success { latency_ms, text } => {
            println!("\n✅ SUCCESS! Model responded.");
            println!("⏱️ Latency: {:.2} ms", latency_ms);
            println!("{}", "-".repeat(40));
            println!("🤖 Output:\n{}", text);
            println!("{}", "-".repeat(40));
        }
        Outcome::ConnectFailed(e) => {
            println!("\n❌ CONNECTION FAILED: {}", e);
            println!("Tip: Check if the container is fully ready (look for 'Uvicorn running' in docker logs).");
            println!("Tip: Check if the security group allows port 8000 from your IP.");
        }
        Outcome::Error(e) => {
            println!("\n❌ ERROR: {}", e);
        }
    }
}

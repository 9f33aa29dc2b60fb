use llama_smoke::{report, run_completion_probe, DEFAULT_TIMEOUT};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let ip = std::env::var("INSTANCE_PUBLIC_IP").unwrap_or_default();
    let ip = ip.trim();
    if ip.is_empty() {
        eprintln!("⚠️ INSTANCE_PUBLIC_IP is not set. Paste the deploy output, e.g.:");
        eprintln!("   INSTANCE_PUBLIC_IP=3.14.159.26 cargo run -p llama-smoke");
        return;
    }

    let base_url = format!("http://{}:8000", ip);
    println!("🚀 Connecting to AI server at {}...", base_url);

    let outcome = run_completion_probe(&base_url, DEFAULT_TIMEOUT).await;
    report(&outcome);
}

use anyhow::{Context, Result};
use llama_provider::scaleway::ScalewayEngine;
use llama_provider::submit;
use llama_stack::{DeploymentPlan, MODEL_ID};

/// One-shot deploy: read the environment, build the plan, submit it, print
/// the public IP output. No state is kept between runs.
#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    println!("🚀 llama-deploy: provisioning a single vLLM GPU instance\n");

    let plan = DeploymentPlan::from_env();

    println!("📋 Plan:");
    println!("   Zone: {}", plan.environment.zone);
    println!(
        "   Project: {}",
        plan.environment.project_id.as_deref().unwrap_or("(default)")
    );
    println!("   Instance type: {}", plan.request.commercial_type);
    println!("   Root volume: {} GB", plan.request.volume_size_gb);
    println!("   Key pair: {}", plan.request.key_pair_name);
    println!("   Model: {}\n", MODEL_ID);

    let secret_key = std::env::var("SCW_SECRET_KEY").context("SCW_SECRET_KEY not set")?;
    let engine = ScalewayEngine::new(plan.environment.project_id.clone(), secret_key)?;

    let outputs = submit(&engine, &plan).await?;

    println!("\n✅ Deployment complete");
    println!("   Server: {}", outputs.server_id);
    println!("   Security group: {}", outputs.security_group_id);
    println!("   Image: {}", outputs.image_id);
    println!("InstancePublicIP = {}", outputs.public_ip);
    println!(
        "\nNext: INSTANCE_PUBLIC_IP={} cargo run -p llama-smoke",
        outputs.public_ip
    );

    Ok(())
}

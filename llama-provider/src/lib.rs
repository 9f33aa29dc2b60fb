//! Submission engine: turns a [`DeploymentPlan`] into actual cloud
//! resources, in the declared order, and reports the resulting public IP.

use anyhow::Result;
use async_trait::async_trait;
use llama_stack::{DeploymentPlan, ImageSelector, InstanceRequest, SecurityBoundary};
use std::time::Duration;
use tokio::time::sleep;

pub mod scaleway;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

/// The provider operations this deployment needs, nothing more.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Resolve the account's default VPC for the region; no custom network
    /// topology is ever created.
    async fn resolve_default_vpc(&self, region: &str) -> Result<Option<String>>;

    /// Create the security group and its ingress rules, returning the group
    /// id. Outbound stays allow-all.
    async fn create_security_group(
        &self,
        zone: &str,
        boundary: &SecurityBoundary,
    ) -> Result<String>;

    /// Resolve the selector to a concrete image id. The newest matching
    /// image wins, so the result can change between deployments.
    async fn resolve_image(&self, zone: &str, selector: &ImageSelector) -> Result<String>;

    /// Look up a pre-existing SSH key by name. Absence is an error surfaced
    /// to the operator; the key is never created here.
    async fn lookup_ssh_key(&self, name: &str) -> Result<String>;

    async fn create_instance(
        &self,
        zone: &str,
        request: &InstanceRequest,
        image_id: &str,
        security_group_id: &str,
    ) -> Result<String>;

    async fn poweron(&self, zone: &str, server_id: &str) -> Result<()>;

    async fn get_instance_ip(&self, zone: &str, server_id: &str) -> Result<Option<String>>;
}

/// Named outputs of a completed submission.
#[derive(Debug, Clone)]
pub struct StackOutputs {
    pub server_id: String,
    pub security_group_id: String,
    pub image_id: String,
    pub public_ip: String,
}

/// Walk the plan through the provider: default network, security boundary,
/// image resolution, credential lookup, instance creation, power-on, public
/// IP. Provider failures propagate unmodified.
pub async fn submit(provider: &dyn CloudProvider, plan: &DeploymentPlan) -> Result<StackOutputs> {
    // An empty operator address would turn into a malformed or overly broad
    // CIDR at the provider; refuse before touching the account.
    if !plan.request.boundary.has_resolvable_peer() {
        anyhow::bail!(
            "IP_ADDRESS is empty; refusing to submit ingress rules with a malformed CIDR"
        );
    }

    let zone = &plan.environment.zone;
    let region = plan.environment.region();

    match provider.resolve_default_vpc(&region).await? {
        Some(vpc_id) => println!("✅ Default VPC: {}", vpc_id),
        None => println!("⚠️ No default VPC found in {}; continuing without one", region),
    }

    let security_group_id = provider
        .create_security_group(zone, &plan.request.boundary)
        .await?;
    println!("✅ Security group: {}", security_group_id);

    let image_id = provider.resolve_image(zone, &plan.request.image).await?;
    println!("✅ Boot image: {}", image_id);

    let key_id = provider.lookup_ssh_key(&plan.request.key_pair_name).await?;
    println!("✅ SSH key '{}': {}", plan.request.key_pair_name, key_id);

    let server_id = provider
        .create_instance(zone, &plan.request, &image_id, &security_group_id)
        .await?;
    println!("✅ Server created: {}", server_id);

    provider.poweron(zone, &server_id).await?;
    println!("✅ Server powering on");

    let public_ip = wait_for_public_ip(provider, zone, &server_id).await?;

    Ok(StackOutputs {
        server_id,
        security_group_id,
        image_id,
        public_ip,
    })
}

/// Poll until the dynamic public IP is attached. Bounded: the engine owns
/// convergence, we only wait long enough to print the output.
pub async fn wait_for_public_ip(
    provider: &dyn CloudProvider,
    zone: &str,
    server_id: &str,
) -> Result<String> {
    const ATTEMPTS: u32 = 30;
    for attempt in 1..=ATTEMPTS {
        if let Some(ip) = provider.get_instance_ip(zone, server_id).await? {
            return Ok(ip);
        }
        println!(
            "🔍 Waiting for public IP ({}/{})...",
            attempt, ATTEMPTS
        );
        sleep(Duration::from_secs(2)).await;
    }
    Err(anyhow::anyhow!(
        "Server {} has no public IP after {} attempts",
        server_id,
        ATTEMPTS
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEngine;
    use llama_stack::Environment;

    fn plan(token: Option<&str>, ip: Option<&str>) -> DeploymentPlan {
        DeploymentPlan::new(
            Environment {
                project_id: Some("proj-1234".to_string()),
                zone: "fr-par-2".to_string(),
            },
            token,
            ip,
        )
    }

    #[tokio::test]
    async fn submit_walks_resources_in_declared_order() {
        let engine = MockEngine::default();
        let outputs = submit(&engine, &plan(Some("abc123"), Some("1.2.3.4")))
            .await
            .unwrap();
        assert_eq!(outputs.public_ip, "203.0.113.10");
        assert_eq!(
            engine.calls(),
            vec![
                "resolve_default_vpc",
                "create_security_group",
                "resolve_image",
                "lookup_ssh_key",
                "create_instance",
                "poweron",
                "get_instance_ip",
            ]
        );
    }

    #[tokio::test]
    async fn submit_refuses_an_empty_operator_ip_before_any_call() {
        let engine = MockEngine::default();
        let err = submit(&engine, &plan(Some("abc123"), None))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("IP_ADDRESS"));
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn submit_passes_the_boundary_and_boot_script_through() {
        let engine = MockEngine::default();
        submit(&engine, &plan(Some("abc123"), Some("1.2.3.4")))
            .await
            .unwrap();
        let boundary = engine.last_boundary().unwrap();
        assert_eq!(boundary.ingress.len(), 2);
        assert_eq!(boundary.ingress[0].ip_range, "1.2.3.4/32");
        let cloud_init = engine.last_cloud_init().unwrap();
        assert!(cloud_init.starts_with("#cloud-config"));
        assert!(cloud_init.contains("HUGGING_FACE_HUB_TOKEN=abc123"));
    }

    #[tokio::test]
    async fn wait_for_public_ip_retries_until_attached() {
        let engine = MockEngine::with_ip_after_polls(2);
        let ip = wait_for_public_ip(&engine, "fr-par-2", "srv-1")
            .await
            .unwrap();
        assert_eq!(ip, "203.0.113.10");
        assert_eq!(
            engine
                .calls()
                .iter()
                .filter(|c| *c == "get_instance_ip")
                .count(),
            2
        );
    }
}

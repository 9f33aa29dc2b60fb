use crate::{BootScript, Environment, InstanceRequest, SecurityBoundary};
use thiserror::Error;

/// Missing-configuration findings. These are warnings by design: the plan is
/// still produced so the operator can inspect what would be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigWarning {
    #[error("HF_TOKEN is not set. The container might fail to download the model.")]
    MissingHfToken,
    #[error("IP_ADDRESS is not set. The ingress rules cannot be submitted.")]
    MissingOperatorIp,
}

/// Complete infrastructure request: environment, instance request and any
/// configuration warnings collected while building it.
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    pub environment: Environment,
    pub request: InstanceRequest,
    pub warnings: Vec<ConfigWarning>,
}

impl DeploymentPlan {
    /// Read `HF_TOKEN` and `IP_ADDRESS` alongside the environment defaults.
    pub fn from_env() -> Self {
        let hf_token = std::env::var("HF_TOKEN").ok();
        let operator_ip = std::env::var("IP_ADDRESS").ok();
        Self::new(
            Environment::from_env(),
            hf_token.as_deref(),
            operator_ip.as_deref(),
        )
    }

    /// Never fails: missing token or operator IP degrade the plan (empty
    /// token assignment, unsubmittable boundary) and are reported as
    /// warnings, both printed and returned.
    pub fn new(
        environment: Environment,
        hf_token: Option<&str>,
        operator_ip: Option<&str>,
    ) -> Self {
        let mut warnings = Vec::new();

        let hf_token = hf_token.map(str::trim).filter(|s| !s.is_empty());
        if hf_token.is_none() {
            warnings.push(ConfigWarning::MissingHfToken);
        }

        let boundary = SecurityBoundary::for_operator_ip(operator_ip);
        if !boundary.has_resolvable_peer() {
            warnings.push(ConfigWarning::MissingOperatorIp);
        }

        for warning in &warnings {
            eprintln!("⚠️ WARNING: {}", warning);
        }

        let boot = BootScript::vllm(hf_token.unwrap_or(""));
        let request = InstanceRequest::vllm_server(boundary, boot);

        Self {
            environment,
            request,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_env() -> Environment {
        Environment {
            project_id: Some("proj-1234".to_string()),
            zone: "fr-par-2".to_string(),
        }
    }

    #[test]
    fn full_configuration_yields_no_warnings() {
        let plan = DeploymentPlan::new(test_env(), Some("abc123"), Some("1.2.3.4"));
        assert!(plan.warnings.is_empty());
        for rule in &plan.request.boundary.ingress {
            assert_eq!(rule.ip_range, "1.2.3.4/32");
        }
        assert!(plan
            .request
            .boot
            .shell()
            .contains("HUGGING_FACE_HUB_TOKEN=abc123"));
    }

    #[test]
    fn every_missing_combination_still_produces_a_plan() {
        let combos: [(Option<&str>, Option<&str>); 3] =
            [(None, Some("1.2.3.4")), (Some("abc123"), None), (None, None)];
        for (token, ip) in combos {
            let plan = DeploymentPlan::new(test_env(), token, ip);
            assert_eq!(plan.request.boundary.ingress.len(), 2);
            assert!(!plan.warnings.is_empty());
        }
    }

    #[test]
    fn missing_token_warns_and_renders_empty_assignment() {
        let plan = DeploymentPlan::new(test_env(), None, Some("1.2.3.4"));
        assert_eq!(plan.warnings, vec![ConfigWarning::MissingHfToken]);
        assert!(plan
            .request
            .boot
            .shell()
            .contains("HUGGING_FACE_HUB_TOKEN= \\"));
    }

    #[test]
    fn missing_ip_warns_and_marks_boundary_unsubmittable() {
        let plan = DeploymentPlan::new(test_env(), Some("abc123"), None);
        assert_eq!(plan.warnings, vec![ConfigWarning::MissingOperatorIp]);
        assert!(!plan.request.boundary.has_resolvable_peer());
    }

    #[test]
    fn request_has_the_fixed_shape() {
        let plan = DeploymentPlan::new(test_env(), Some("abc123"), Some("1.2.3.4"));
        assert_eq!(plan.request.commercial_type, "L4-1-24G");
        assert_eq!(plan.request.volume_size_gb, 100);
        assert_eq!(plan.request.key_pair_name, "llama-infra-key");
        assert!(plan.request.name.starts_with("llama3-inference-"));
    }
}

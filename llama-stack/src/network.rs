use serde::{Deserialize, Serialize};

pub const SSH_PORT: u16 = 22;
pub const API_PORT: u16 = 8000;

/// One inbound TCP rule. `ip_range` is always a `/32` built from the
/// operator address; nothing in this crate widens it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    pub port: u16,
    pub ip_range: String,
    pub description: String,
}

/// Stateful firewall boundary for the instance: SSH and the vLLM API are
/// reachable from a single operator address only, all outbound allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityBoundary {
    pub name: String,
    pub description: String,
    pub allowed_ip: Option<String>,
    pub ingress: Vec<IngressRule>,
    pub allow_all_outbound: bool,
}

impl SecurityBoundary {
    pub fn for_operator_ip(operator_ip: Option<&str>) -> Self {
        let allowed_ip = operator_ip
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let ip_range = allowed_ip
            .as_deref()
            .map(|ip| format!("{}/32", ip))
            .unwrap_or_default();
        let ingress = vec![
            IngressRule {
                port: SSH_PORT,
                ip_range: ip_range.clone(),
                description: "SSH access".to_string(),
            },
            IngressRule {
                port: API_PORT,
                ip_range,
                description: "vLLM API access".to_string(),
            },
        ];
        Self {
            name: format!("llama-sg-{}", uuid::Uuid::new_v4()),
            description: "Allow SSH and vLLM access".to_string(),
            allowed_ip,
            ingress,
            allow_all_outbound: true,
        }
    }

    /// False when the operator address was never configured. The submission
    /// engine refuses to create rules for such a boundary instead of
    /// shipping a malformed CIDR to the provider.
    pub fn has_resolvable_peer(&self) -> bool {
        self.allowed_ip.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_has_exactly_two_scoped_ingress_rules() {
        let boundary = SecurityBoundary::for_operator_ip(Some("1.2.3.4"));
        assert_eq!(boundary.ingress.len(), 2);
        assert_eq!(boundary.ingress[0].port, 22);
        assert_eq!(boundary.ingress[1].port, 8000);
        for rule in &boundary.ingress {
            assert_eq!(rule.ip_range, "1.2.3.4/32");
        }
        assert!(boundary.allow_all_outbound);
        assert!(boundary.has_resolvable_peer());
    }

    #[test]
    fn missing_operator_ip_still_builds_but_is_not_submittable() {
        let boundary = SecurityBoundary::for_operator_ip(None);
        assert_eq!(boundary.ingress.len(), 2);
        assert!(!boundary.has_resolvable_peer());
    }

    #[test]
    fn whitespace_only_ip_counts_as_missing() {
        let boundary = SecurityBoundary::for_operator_ip(Some("   "));
        assert!(!boundary.has_resolvable_peer());
    }
}

use serde::{Deserialize, Serialize};

/// Boot image selected by criteria instead of a pinned id.
///
/// Resolving the newest matching provider image keeps the NVIDIA driver
/// stack current on every deploy. The flip side is that two deployments can
/// resolve different images; callers who need a reproducible rollout must
/// pin an explicit image id at the engine level instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSelector {
    /// Whitespace-separated tokens, all of which must appear in the image
    /// name (case-insensitive).
    pub name_pattern: String,
    pub arch: String,
    /// Restrict the lookup to provider-published images.
    pub public_only: bool,
}

impl ImageSelector {
    /// Ubuntu GPU OS image with the NVIDIA stack preinstalled, x86_64.
    pub fn vllm_host() -> Self {
        Self {
            name_pattern: "ubuntu gpu os".to_string(),
            arch: "x86_64".to_string(),
            public_only: true,
        }
    }

    pub fn matches(&self, name: &str, arch: &str, public: bool) -> bool {
        if self.public_only && !public {
            return false;
        }
        if arch != self.arch {
            return false;
        }
        let name = name.to_lowercase();
        self.name_pattern
            .split_whitespace()
            .all(|token| name.contains(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_gpu_os_images_case_insensitively() {
        let selector = ImageSelector::vllm_host();
        assert!(selector.matches("Ubuntu 22.04 Jammy GPU OS 12", "x86_64", true));
        assert!(selector.matches("ubuntu 24.04 noble gpu os 13", "x86_64", true));
    }

    #[test]
    fn rejects_wrong_arch_private_and_non_gpu_images() {
        let selector = ImageSelector::vllm_host();
        assert!(!selector.matches("Ubuntu 22.04 Jammy GPU OS 12", "arm64", true));
        assert!(!selector.matches("Ubuntu 22.04 Jammy GPU OS 12", "x86_64", false));
        assert!(!selector.matches("Ubuntu 22.04 Jammy", "x86_64", true));
        assert!(!selector.matches("Debian 12 GPU OS", "x86_64", true));
    }
}

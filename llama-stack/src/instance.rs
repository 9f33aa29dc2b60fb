use crate::{BootScript, ImageSelector, SecurityBoundary};
use serde::{Deserialize, Serialize};

/// Single GPU able to hold an 8B model at 8k context.
pub const INSTANCE_TYPE: &str = "L4-1-24G";
pub const ROOT_VOLUME_GB: u64 = 100;
/// Created out-of-band in the console; never created by this descriptor.
pub const KEY_PAIR_NAME: &str = "llama-infra-key";

/// Desired instance shape plus its attachments. Submitted once; the
/// provisioning engine materializes the actual server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceRequest {
    pub name: String,
    pub commercial_type: String,
    pub volume_size_gb: u64,
    pub key_pair_name: String,
    pub image: ImageSelector,
    pub boundary: SecurityBoundary,
    pub boot: BootScript,
}

impl InstanceRequest {
    pub fn vllm_server(boundary: SecurityBoundary, boot: BootScript) -> Self {
        Self {
            name: format!("llama3-inference-{}", uuid::Uuid::new_v4()),
            commercial_type: INSTANCE_TYPE.to_string(),
            volume_size_gb: ROOT_VOLUME_GB,
            key_pair_name: KEY_PAIR_NAME.to_string(),
            image: ImageSelector::vllm_host(),
            boundary,
            boot,
        }
    }
}

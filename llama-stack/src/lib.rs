//! Deployment descriptor for a single vLLM GPU instance.
//!
//! Everything in this crate is plain data: the target environment, the
//! network boundary, the boot-image selection criteria, the first-boot
//! script and the instance request itself. Submission to the cloud API
//! lives in `llama-provider`; this crate only describes what to create.

mod boot;
mod environment;
mod image;
mod instance;
mod network;
mod plan;

pub use boot::{BootScript, CACHE_DIR, GPU_MEMORY_UTILIZATION, MAX_MODEL_LEN, MODEL_ID, VLLM_IMAGE};
pub use environment::Environment;
pub use image::ImageSelector;
pub use instance::{InstanceRequest, INSTANCE_TYPE, KEY_PAIR_NAME, ROOT_VOLUME_GB};
pub use network::{IngressRule, SecurityBoundary, API_PORT, SSH_PORT};
pub use plan::{ConfigWarning, DeploymentPlan};

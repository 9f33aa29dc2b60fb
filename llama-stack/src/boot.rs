use serde::{Deserialize, Serialize};

pub const MODEL_ID: &str = "meta-llama/Meta-Llama-3.1-8B-Instruct";
pub const MAX_MODEL_LEN: u32 = 8192;
pub const GPU_MEMORY_UTILIZATION: &str = "0.95";
pub const VLLM_IMAGE: &str = "vllm/vllm-openai:latest";
pub const CACHE_DIR: &str = "/root/.cache/huggingface";

/// Ordered command sequence executed once at first boot. The contents are
/// opaque to the provisioning engine; no structured validation happens
/// before submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootScript {
    commands: Vec<String>,
}

impl BootScript {
    /// Cache directory setup followed by one detached vLLM container launch.
    /// An absent HF token is rendered as an empty assignment, never omitted,
    /// so the container sees the variable either way.
    pub fn vllm(hf_token: &str) -> Self {
        let run = [
            "docker run -d".to_string(),
            "  --name llama3-inference".to_string(),
            "  --runtime nvidia".to_string(),
            "  --gpus all".to_string(),
            format!("  -v {0}:{0}", CACHE_DIR),
            format!("  --env HUGGING_FACE_HUB_TOKEN={}", hf_token),
            "  -p 8000:8000".to_string(),
            "  --ipc=host".to_string(),
            "  --restart always".to_string(),
            format!("  {}", VLLM_IMAGE),
            format!("  --model {}", MODEL_ID),
            format!("  --max-model-len {}", MAX_MODEL_LEN),
            format!("  --gpu-memory-utilization {}", GPU_MEMORY_UTILIZATION),
        ]
        .join(" \\\n");

        Self {
            commands: vec![format!("mkdir -p {}", CACHE_DIR), run],
        }
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Flat shell rendering, one command per entry.
    pub fn shell(&self) -> String {
        self.commands.join("\n")
    }

    /// `#cloud-config` rendering: the commands land in a bootstrap script
    /// written at boot and invoked from `runcmd`.
    pub fn cloud_init(&self) -> String {
        let mut cloud = String::new();
        cloud.push_str("#cloud-config\n");
        cloud.push_str("write_files:\n");
        cloud.push_str("  - path: /usr/local/bin/llama-bootstrap.sh\n");
        cloud.push_str("    permissions: '0755'\n");
        cloud.push_str("    content: |\n");
        cloud.push_str("      #!/usr/bin/env bash\n");
        cloud.push_str("      set -euo pipefail\n");
        for command in &self.commands {
            for line in command.lines() {
                cloud.push_str("      ");
                cloud.push_str(line);
                cloud.push('\n');
            }
        }
        cloud.push_str("runcmd:\n");
        cloud.push_str("  - [ bash, -lc, /usr/local/bin/llama-bootstrap.sh ]\n");
        cloud
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_launch_carries_gpu_ports_and_model() {
        let script = BootScript::vllm("abc123");
        let shell = script.shell();
        assert!(shell.contains("docker run -d"));
        assert!(shell.contains("--gpus all"));
        assert!(shell.contains("--runtime nvidia"));
        assert!(shell.contains("-p 8000:8000"));
        assert!(shell.contains("--ipc=host"));
        assert!(shell.contains("--restart always"));
        assert!(shell.contains("meta-llama/Meta-Llama-3.1-8B-Instruct"));
        assert!(shell.contains("--max-model-len 8192"));
        assert!(shell.contains("--gpu-memory-utilization 0.95"));
    }

    #[test]
    fn token_is_embedded_verbatim() {
        let script = BootScript::vllm("abc123");
        assert!(script.shell().contains("HUGGING_FACE_HUB_TOKEN=abc123"));
    }

    #[test]
    fn empty_token_is_an_empty_assignment_not_omitted() {
        let script = BootScript::vllm("");
        let shell = script.shell();
        assert!(shell.contains("HUGGING_FACE_HUB_TOKEN= \\"));
    }

    #[test]
    fn cache_dir_creation_comes_first() {
        let script = BootScript::vllm("abc123");
        assert_eq!(script.commands()[0], "mkdir -p /root/.cache/huggingface");
    }

    #[test]
    fn cloud_init_wraps_the_commands_in_a_bootstrap_script() {
        let rendered = BootScript::vllm("abc123").cloud_init();
        assert!(rendered.starts_with("#cloud-config\n"));
        assert!(rendered.contains("      mkdir -p /root/.cache/huggingface\n"));
        assert!(rendered.contains("      docker run -d \\\n"));
        assert!(rendered.contains("runcmd:\n  - [ bash, -lc, /usr/local/bin/llama-bootstrap.sh ]\n"));
    }
}

use crate::CloudProvider;
use anyhow::Result;
use async_trait::async_trait;
use llama_stack::{ImageSelector, InstanceRequest, SecurityBoundary};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const MOCK_PUBLIC_IP: &str = "203.0.113.10";

/// In-memory engine recording every call, for submission-flow tests.
#[derive(Default)]
pub struct MockEngine {
    calls: Mutex<Vec<String>>,
    boundary: Mutex<Option<SecurityBoundary>>,
    cloud_init: Mutex<Option<String>>,
    ip_polls: AtomicUsize,
    ip_after_polls: usize,
}

impl MockEngine {
    /// Withhold the public IP until the nth poll (default: available on the
    /// first).
    pub fn with_ip_after_polls(ip_after_polls: usize) -> Self {
        Self {
            ip_after_polls,
            ..Self::default()
        }
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_boundary(&self) -> Option<SecurityBoundary> {
        self.boundary.lock().unwrap().clone()
    }

    pub fn last_cloud_init(&self) -> Option<String> {
        self.cloud_init.lock().unwrap().clone()
    }
}

#[async_trait]
impl CloudProvider for MockEngine {
    async fn resolve_default_vpc(&self, _region: &str) -> Result<Option<String>> {
        self.record("resolve_default_vpc");
        Ok(Some("vpc-mock".to_string()))
    }

    async fn create_security_group(
        &self,
        _zone: &str,
        boundary: &SecurityBoundary,
    ) -> Result<String> {
        self.record("create_security_group");
        *self.boundary.lock().unwrap() = Some(boundary.clone());
        Ok("sg-mock".to_string())
    }

    async fn resolve_image(&self, _zone: &str, _selector: &ImageSelector) -> Result<String> {
        self.record("resolve_image");
        Ok("img-mock".to_string())
    }

    async fn lookup_ssh_key(&self, _name: &str) -> Result<String> {
        self.record("lookup_ssh_key");
        Ok("key-mock".to_string())
    }

    async fn create_instance(
        &self,
        _zone: &str,
        request: &InstanceRequest,
        _image_id: &str,
        _security_group_id: &str,
    ) -> Result<String> {
        self.record("create_instance");
        *self.cloud_init.lock().unwrap() = Some(request.boot.cloud_init());
        Ok("srv-mock".to_string())
    }

    async fn poweron(&self, _zone: &str, _server_id: &str) -> Result<()> {
        self.record("poweron");
        Ok(())
    }

    async fn get_instance_ip(&self, _zone: &str, _server_id: &str) -> Result<Option<String>> {
        self.record("get_instance_ip");
        let polls = self.ip_polls.fetch_add(1, Ordering::SeqCst) + 1;
        if polls >= self.ip_after_polls.max(1) {
            Ok(Some(MOCK_PUBLIC_IP.to_string()))
        } else {
            Ok(None)
        }
    }
}

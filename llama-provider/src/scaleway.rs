use crate::CloudProvider;
use anyhow::Result;
use async_trait::async_trait;
use llama_stack::{ImageSelector, InstanceRequest, SecurityBoundary};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const API_BASE: &str = "https://api.scaleway.com";

pub struct ScalewayEngine {
    client: Client,
    project_id: Option<String>,
    secret_key: String,
}

impl ScalewayEngine {
    pub fn new(project_id: Option<String>, secret_key: String) -> Result<Self> {
        // Default reqwest client has no overall timeout. If the API stalls,
        // the deploy would hang forever.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .build()?;
        let project_id = project_id
            .as_deref()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        Ok(Self {
            client,
            project_id,
            secret_key: secret_key.trim().to_string(),
        })
    }

    fn headers(&self) -> Result<reqwest::header::HeaderMap> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "X-Auth-Token",
            reqwest::header::HeaderValue::from_str(&self.secret_key)?,
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        Ok(headers)
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        let resp = self
            .client
            .post(url)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            eprintln!(
                "❌ [Scaleway API] POST {} failed: status={}, response={}",
                url,
                status.as_u16(),
                text
            );
            return Err(anyhow::anyhow!(
                "Scaleway POST {} failed: status={} body={}",
                url,
                status.as_u16(),
                text
            ));
        }
        eprintln!(
            "✅ [Scaleway API] POST {} succeeded: status={}",
            url,
            status.as_u16()
        );
        Ok(resp.json().await?)
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<serde_json::Value> {
        let resp = self
            .client
            .get(url)
            .headers(self.headers()?)
            .query(query)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            eprintln!(
                "❌ [Scaleway API] GET {} failed: status={}, response={}",
                url,
                status.as_u16(),
                text
            );
            return Err(anyhow::anyhow!(
                "Scaleway GET {} failed: status={} body={}",
                url,
                status.as_u16(),
                text
            ));
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl CloudProvider for ScalewayEngine {
    async fn resolve_default_vpc(&self, region: &str) -> Result<Option<String>> {
        let url = format!("{}/vpc/v2/regions/{}/vpcs", API_BASE, region);
        let mut query = vec![("is_default", "true")];
        if let Some(project) = &self.project_id {
            query.push(("project_id", project.as_str()));
        }
        eprintln!(
            "🔵 [Scaleway API] GET {} - Resolving default VPC: region={}",
            url, region
        );
        let resp = self.get_json(&url, &query).await?;
        let vpc_id = resp["vpcs"]
            .as_array()
            .and_then(|vpcs| vpcs.first())
            .and_then(|vpc| vpc["id"].as_str())
            .map(|s| s.to_string());
        Ok(vpc_id)
    }

    async fn create_security_group(
        &self,
        zone: &str,
        boundary: &SecurityBoundary,
    ) -> Result<String> {
        let url = format!("{}/instance/v1/zones/{}/security_groups", API_BASE, zone);
        let mut body = json!({
            "name": boundary.name,
            "description": boundary.description,
            "stateful": true,
            "inbound_default_policy": "drop",
            "outbound_default_policy": if boundary.allow_all_outbound { "accept" } else { "drop" },
        });
        if let Some(project) = &self.project_id {
            body["project"] = json!(project);
        }

        eprintln!(
            "🔵 [Scaleway API] POST {} - Creating security group: name={}, zone={}",
            url, boundary.name, zone
        );
        let resp = self.post_json(&url, &body).await?;
        let group_id = resp["security_group"]["id"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("No security group id in create response"))?
            .to_string();

        let rules_url = format!(
            "{}/instance/v1/zones/{}/security_groups/{}/rules",
            API_BASE, zone, group_id
        );
        for rule in &boundary.ingress {
            let rule_body = json!({
                "protocol": "TCP",
                "direction": "inbound",
                "action": "accept",
                "ip_range": rule.ip_range,
                "dest_port_from": rule.port,
            });
            eprintln!(
                "🔵 [Scaleway API] POST {} - Ingress rule: port={}, ip_range={} ({})",
                rules_url, rule.port, rule.ip_range, rule.description
            );
            self.post_json(&rules_url, &rule_body).await?;
        }

        Ok(group_id)
    }

    async fn resolve_image(&self, zone: &str, selector: &ImageSelector) -> Result<String> {
        let url = format!("{}/instance/v1/zones/{}/images", API_BASE, zone);
        eprintln!(
            "🔵 [Scaleway API] GET {} - Resolving image: pattern=\"{}\", arch={}",
            url, selector.name_pattern, selector.arch
        );
        // The images endpoint has limited server-side filters; match the
        // selector client-side like the rest of the listing consumers do.
        let resp = self.get_json(&url, &[("public", "true")]).await?;
        let images = resp["images"]
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("No 'images' array in response"))?;

        let mut candidates: Vec<(&str, &str, &str)> = images
            .iter()
            .filter_map(|img| {
                let id = img["id"].as_str()?;
                let name = img["name"].as_str()?;
                let arch = img["arch"].as_str().unwrap_or("");
                let public = img["public"].as_bool().unwrap_or(true);
                let created = img["creation_date"].as_str().unwrap_or("");
                selector
                    .matches(name, arch, public)
                    .then_some((id, name, created))
            })
            .collect();

        if candidates.is_empty() {
            return Err(anyhow::anyhow!(
                "No image in zone {} matches pattern \"{}\" (arch {})",
                zone,
                selector.name_pattern,
                selector.arch
            ));
        }

        // Newest first. ISO-8601 timestamps sort lexicographically.
        candidates.sort_by(|a, b| b.2.cmp(a.2));
        let (image_id, image_name, _) = candidates[0];
        println!(
            "✅ Boot image resolved: {} ({}) for zone {}",
            image_id, image_name, zone
        );
        Ok(image_id.to_string())
    }

    async fn lookup_ssh_key(&self, name: &str) -> Result<String> {
        let url = format!("{}/iam/v1alpha1/ssh-keys", API_BASE);
        let mut query = vec![("name", name)];
        if let Some(project) = &self.project_id {
            query.push(("project_id", project.as_str()));
        }
        eprintln!(
            "🔵 [Scaleway API] GET {} - Looking up SSH key: name={}",
            url, name
        );
        let resp = self.get_json(&url, &query).await?;
        let key_id = resp["ssh_keys"]
            .as_array()
            .and_then(|keys| keys.iter().find(|k| k["name"].as_str() == Some(name)))
            .and_then(|k| k["id"].as_str())
            .map(|s| s.to_string());
        key_id.ok_or_else(|| {
            anyhow::anyhow!(
                "SSH key '{}' not found; create it in the console before deploying",
                name
            )
        })
    }

    async fn create_instance(
        &self,
        zone: &str,
        request: &InstanceRequest,
        image_id: &str,
        security_group_id: &str,
    ) -> Result<String> {
        let url = format!("{}/instance/v1/zones/{}/servers", API_BASE, zone);
        let mut body = json!({
            "name": request.name,
            "commercial_type": request.commercial_type,
            "image": image_id,
            "security_group": security_group_id,
            "tags": ["llama-infra"],
            "dynamic_ip_required": true,
            "volumes": {
                "0": {
                    "size": request.volume_size_gb * 1_000_000_000,
                    "volume_type": "l_ssd",
                }
            },
            "user_data": {
                "cloud-init": request.boot.cloud_init(),
            },
        });
        if let Some(project) = &self.project_id {
            body["project"] = json!(project);
        }

        // The payload embeds the registry token via cloud-init; log a
        // summary instead of the full body.
        eprintln!(
            "🔵 [Scaleway API] POST {} - Creating instance: type={}, image={}, zone={}, volume={}GB",
            url, request.commercial_type, image_id, zone, request.volume_size_gb
        );
        let resp = self.post_json(&url, &body).await?;
        let server_id = resp["server"]["id"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("No server id in create response"))?
            .to_string();
        eprintln!(
            "✅ [Scaleway API] Server created: id={}, state={}",
            server_id,
            resp["server"]["state"].as_str().unwrap_or("unknown")
        );
        Ok(server_id)
    }

    async fn poweron(&self, zone: &str, server_id: &str) -> Result<()> {
        let url = format!(
            "{}/instance/v1/zones/{}/servers/{}/action",
            API_BASE, zone, server_id
        );
        eprintln!(
            "🔵 [Scaleway API] POST {} - Starting server: server_id={}",
            url, server_id
        );
        self.post_json(&url, &json!({ "action": "poweron" })).await?;
        Ok(())
    }

    async fn get_instance_ip(&self, zone: &str, server_id: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/instance/v1/zones/{}/servers/{}",
            API_BASE, zone, server_id
        );
        let resp = self.get_json(&url, &[]).await?;
        let ip = resp["server"]["public_ip"]["address"]
            .as_str()
            .map(|s| s.to_string());
        if ip.is_none() {
            if let Some(state) = resp["server"]["state"].as_str() {
                eprintln!(
                    "🔍 [Scaleway API] Server {} state={}, public IP not attached yet",
                    server_id, state
                );
            }
        }
        Ok(ip)
    }
}

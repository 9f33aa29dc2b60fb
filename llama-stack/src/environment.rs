use serde::{Deserialize, Serialize};

/// Target project/zone pair, read once from the process environment at
/// startup and immutable for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub project_id: Option<String>,
    pub zone: String,
}

impl Environment {
    pub const DEFAULT_ZONE: &'static str = "fr-par-2";

    /// Read `SCW_PROJECT_ID` / `SCW_ZONE`. A missing project id is kept as
    /// `None`; the provisioning engine rejects the request on its own if the
    /// account context is incomplete.
    pub fn from_env() -> Self {
        let project_id = std::env::var("SCW_PROJECT_ID")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let zone = std::env::var("SCW_ZONE").unwrap_or_else(|_| Self::DEFAULT_ZONE.to_string());
        Self { project_id, zone }
    }

    /// Zone codes embed their region as the first two segments
    /// (`fr-par-2` -> `fr-par`).
    pub fn region(&self) -> String {
        let mut parts = self.zone.split('-');
        match (parts.next(), parts.next()) {
            (Some(country), Some(city)) => format!("{}-{}", country, city),
            _ => self.zone.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_is_derived_from_zone() {
        let env = Environment {
            project_id: None,
            zone: "fr-par-2".to_string(),
        };
        assert_eq!(env.region(), "fr-par");
    }

    #[test]
    fn malformed_zone_falls_back_to_itself() {
        let env = Environment {
            project_id: None,
            zone: "parzone".to_string(),
        };
        assert_eq!(env.region(), "parzone");
    }
}

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppCfg {
    #[serde(default)]
    pub oracle: OracleCfg,
    #[serde(default)]
    pub companies: CompaniesCfg,
    #[serde(default)]
    pub routine: RoutineCfg,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OracleBackend {
    /// Local sentence-embedding model, hypotheses ranked by cosine similarity.
    #[default]
    Embedding,
    /// Remote zero-shot-classification endpoint.
    Remote,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OracleCfg {
    #[serde(default)]
    pub backend: OracleBackend,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(rename = "baseUrl", default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
    #[serde(rename = "rateLimitRpm", default = "default_rpm")]
    pub rate_limit_rpm: u32,
}

impl Default for OracleCfg {
    fn default() -> Self {
        Self {
            backend: OracleBackend::default(),
            model: default_model(),
            temperature: default_temperature(),
            base_url: "".to_string(),
            api_key: "".to_string(),
            timeout: default_timeout(),
            rate_limit_rpm: default_rpm(),
        }
    }
}
fn default_model() -> String {
    "all-minilm-l6-v2".into()
}
fn default_temperature() -> f64 {
    0.05
}
fn default_timeout() -> Duration {
    Duration::from_secs(30)
}
fn default_rpm() -> u32 {
    120
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CompaniesCfg {
    /// Optional JSON file merged over the built-in company table.
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoutinePolicy {
    /// Oracle routine score with the materiality override.
    #[default]
    Semantic,
    /// Legacy keyword detector with superlative/completion/special overrides.
    Heuristic,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RoutineCfg {
    #[serde(default)]
    pub policy: RoutinePolicy,
}

impl AppCfg {
    pub fn load(path: &str) -> Result<Self> {
        let cfg = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(config::Environment::default().separator("__"))
            .build()
            .context("building config")?;

        let app: AppCfg = cfg.try_deserialize().context("deserializing config")?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.oracle.temperature > 0.0,
            "oracle.temperature must be > 0"
        );
        anyhow::ensure!(
            self.oracle.rate_limit_rpm > 0,
            "oracle.rateLimitRpm must be > 0"
        );
        if self.oracle.backend == OracleBackend::Remote {
            anyhow::ensure!(
                !self.oracle.base_url.is_empty(),
                "oracle.baseUrl required for the remote backend"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_env_var_override() {
        unsafe {
            env::set_var("ORACLE__API_KEY", "env-key-123");
        }

        let cfg = Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()
            .unwrap();

        let val = cfg.get_string("oracle.api_key").unwrap();
        assert_eq!(val, "env-key-123");

        unsafe {
            env::remove_var("ORACLE__API_KEY");
        }
    }

    #[test]
    fn test_defaults_validate() {
        let cfg = AppCfg::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.oracle.backend, OracleBackend::Embedding);
        assert_eq!(cfg.routine.policy, RoutinePolicy::Semantic);
    }

    #[test]
    fn test_remote_backend_requires_url() {
        let mut cfg = AppCfg::default();
        cfg.oracle.backend = OracleBackend::Remote;
        assert!(cfg.validate().is_err());

        cfg.oracle.base_url = "http://localhost:8080/zero-shot".to_string();
        assert!(cfg.validate().is_ok());
    }
}

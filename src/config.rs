use serde::Deserialize;
use tokio::fs;

use crate::errors::ClientResult;

pub const DEFAULT_BROKER_URL: &str = "https://apiv2.gofile.io";
pub const DEFAULT_WORKER_URL: &str = "https://{server}.gofile.io";

pub async fn load_config(path: &str) -> ClientResult<Config> {
    let contents = fs::read_to_string(path).await?;
    let parsed = toml::from_str(&contents)?;
    Ok(parsed)
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_broker_url")]
    pub broker_url: String,
    /// Worker base url, `{server}` is replaced with the name handed out by the broker.
    #[serde(default = "default_worker_url")]
    pub worker_url: String,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            broker_url: default_broker_url(),
            worker_url: default_worker_url(),
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentationConfig {
    #[serde(default = "default_directives")]
    pub directives: Vec<String>,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            directives: default_directives(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub instrumentation: InstrumentationConfig,
}

fn default_broker_url() -> String {
    DEFAULT_BROKER_URL.to_string()
}

fn default_worker_url() -> String {
    DEFAULT_WORKER_URL.to_string()
}

fn default_directives() -> Vec<String> {
    vec!["cipherfiles_client=info".to_string()]
}

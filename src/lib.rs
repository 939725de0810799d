//! Client for a two-tier file hosting service: a broker hands out a worker server,
//! and uploads, info lookups, downloads and removals then go to that worker.

pub mod config;
mod delete;
mod download;
pub mod errors;
mod info;
pub mod instrumentation;
pub mod models;
pub mod options;
mod resolver;
mod upload;
mod utilities;

#[cfg(test)]
mod tests;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

pub use config::{load_config, Config, ServiceConfig};
pub use download::{DownloadStream, Payload, Representation};
pub use errors::{ClientError, ClientResult};
pub use models::{FileEntry, FileManifest, ServerBinding, UploadInfo, UploadResult};
pub use options::{Expiration, UploadOptions, ValidatedOptions};
pub use upload::UploadTarget;
pub use utilities::hash_passphrase;

/// Handle shared by all operations. Holds the connection pool and endpoints, never a
/// server binding.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    service: ServiceConfig,
}

impl Client {
    pub fn new(service: ServiceConfig) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(agent) = &service.user_agent {
            let value = HeaderValue::from_str(agent)?;
            headers.insert(USER_AGENT, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ClientError::HttpClient)?;

        Ok(Self { http, service })
    }

    pub async fn from_config_file(path: &str) -> ClientResult<Self> {
        let config = load_config(path).await?;
        Self::new(config.service)
    }

    pub fn service(&self) -> &ServiceConfig {
        &self.service
    }

    fn worker_endpoint(&self, binding: &ServerBinding, path: &str) -> String {
        binding.endpoint(&self.service.worker_url, path)
    }
}

/// Targets the public service.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialised, like [`reqwest::Client::new`].
/// [`Client::new`] reports that as [`ClientError::HttpClient`] instead.
impl Default for Client {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
            service: ServiceConfig::default(),
        }
    }
}

impl Client {
    /// Sends a request and unwraps the `{status, data}` envelope. Failures come back as a
    /// human readable detail so each operation can wrap it in its own error.
    async fn exchange<T>(&self, request: reqwest::RequestBuilder) -> Result<T, String>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = request.send().await.map_err(errors::describe)?;
        let status = response.status();
        tracing::debug!(url = %response.url(), %status, "got response");

        let body = response.text().await.map_err(errors::describe)?;
        models::parse_envelope(status, &body).inspect_err(|detail| {
            tracing::warn!("service refused request: {detail}");
        })
    }
}

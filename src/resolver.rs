use crate::{
    errors::{ClientError, ClientResult},
    instrumentation,
    models::ServerBinding,
    Client,
};

impl Client {
    /// Asks the broker which worker should serve the next request. Passing the upload code
    /// routes to the worker already holding that upload.
    pub async fn resolve_server(&self, upload_code: Option<&str>) -> ClientResult<ServerBinding> {
        let url = format!("{}/getServer", self.service.broker_url.trim_end_matches('/'));

        let mut request = self.http.get(url);
        if let Some(code) = upload_code {
            request = request.query(&[("c", code)]);
        }

        let binding: ServerBinding = self
            .exchange(request)
            .await
            .map_err(|detail| ClientError::ServerResolution { detail })?;

        if binding.server.is_empty() {
            return Err(ClientError::ServerResolution {
                detail: "broker returned an empty server name".to_string(),
            });
        }

        instrumentation::record_server(&binding.server);
        Ok(binding)
    }
}

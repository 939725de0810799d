use crate::{
    errors::{ClientError, ClientResult},
    instrumentation, Client,
};

impl Client {
    /// Deletes an upload. The service answers wrong keys, unknown codes and already
    /// removed uploads the same way, so they all surface as [`ClientError::Removal`].
    pub async fn remove(
        &self,
        upload_code: &str,
        removal_code: &str,
    ) -> ClientResult<serde_json::Value> {
        instrumentation::traced("remove", self.send_removal(upload_code, removal_code)).await
    }

    async fn send_removal(
        &self,
        upload_code: &str,
        removal_code: &str,
    ) -> ClientResult<serde_json::Value> {
        let binding = self.resolve_server(Some(upload_code)).await?;

        let request = self
            .http
            .get(self.worker_endpoint(&binding, "deleteUpload"))
            .query(&[("c", upload_code), ("rc", removal_code)]);

        let confirmation = self
            .exchange(request)
            .await
            .map_err(|detail| ClientError::Removal { detail })?;

        tracing::info!("removed upload `{upload_code}`");
        Ok(confirmation)
    }
}

use crate::{
    errors::{ClientError, ClientResult},
    instrumentation,
    models::UploadInfo,
    utilities::hash_passphrase,
    Client,
};

impl Client {
    /// Fetches metadata of an existing upload. A non-empty passphrase is hashed before it
    /// leaves the process.
    pub async fn get_info(
        &self,
        upload_code: &str,
        passphrase: Option<&str>,
    ) -> ClientResult<UploadInfo> {
        instrumentation::traced("get-info", self.fetch_info(upload_code, passphrase)).await
    }

    pub(crate) async fn fetch_info(
        &self,
        upload_code: &str,
        passphrase: Option<&str>,
    ) -> ClientResult<UploadInfo> {
        let binding = self.resolve_server(Some(upload_code)).await?;

        let mut query = vec![("c", upload_code.to_string())];
        if let Some(passphrase) = passphrase.filter(|p| !p.is_empty()) {
            query.push(("p", hash_passphrase(passphrase)));
        }

        let request = self
            .http
            .get(self.worker_endpoint(&binding, "getUpload"))
            .query(&query);

        self.exchange(request)
            .await
            .map_err(|detail| ClientError::InfoFetch { detail })
    }
}

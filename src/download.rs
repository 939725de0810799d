use bytes::Bytes;
use futures::{future, stream::BoxStream, StreamExt, TryStreamExt};
use tokio::io::{self, AsyncRead};
use tokio_util::io::StreamReader;

use crate::{
    errors::{describe, ClientError, ClientResult},
    instrumentation,
    models::FileEntry,
    Client,
};

pub type DownloadStream = BoxStream<'static, io::Result<Bytes>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Representation {
    #[default]
    Buffer,
    Stream,
}

pub enum Payload {
    Buffer(Bytes),
    Stream(DownloadStream),
}

impl Payload {
    pub fn into_reader(self) -> Box<dyn AsyncRead + Send + Unpin> {
        match self {
            Payload::Buffer(bytes) => Box::new(std::io::Cursor::new(bytes)),
            Payload::Stream(stream) => Box::new(StreamReader::new(stream)),
        }
    }

    /// Collects a streamed payload into memory.
    pub async fn into_bytes(self) -> io::Result<Bytes> {
        match self {
            Payload::Buffer(bytes) => Ok(bytes),
            Payload::Stream(stream) => {
                let chunks: Vec<Bytes> = stream.try_collect().await?;
                Ok(chunks.concat().into())
            }
        }
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::Buffer(bytes) => f.debug_tuple("Buffer").field(&bytes.len()).finish(),
            Payload::Stream(_) => f.debug_tuple("Stream").finish(),
        }
    }
}

impl Client {
    /// Downloads every file of an upload at once. The result follows the manifest order,
    /// and one failed file fails the whole call.
    pub async fn download_all(
        &self,
        upload_code: &str,
        passphrase: Option<&str>,
        representation: Representation,
    ) -> ClientResult<Vec<Payload>> {
        let fut = self.fetch_all(upload_code, passphrase, representation);
        instrumentation::traced("download-all", fut).await
    }

    pub async fn download_buffers(
        &self,
        upload_code: &str,
        passphrase: Option<&str>,
    ) -> ClientResult<Vec<Bytes>> {
        let payloads = self
            .download_all(upload_code, passphrase, Representation::Buffer)
            .await?;

        let mut buffers = Vec::with_capacity(payloads.len());
        for payload in payloads {
            buffers.push(payload.into_bytes().await?);
        }
        Ok(buffers)
    }

    async fn fetch_all(
        &self,
        upload_code: &str,
        passphrase: Option<&str>,
        representation: Representation,
    ) -> ClientResult<Vec<Payload>> {
        let info = self.fetch_info(upload_code, passphrase).await?;
        tracing::debug!("downloading {} file(s) of `{}`", info.files.len(), info.code);

        // join_all keeps siblings running after a failure and returns in input order
        let downloads = info
            .files
            .values()
            .map(|entry| self.fetch_file(entry, representation));
        let results = future::join_all(downloads).await;

        results.into_iter().collect()
    }

    async fn fetch_file(
        &self,
        entry: &FileEntry,
        representation: Representation,
    ) -> ClientResult<Payload> {
        let failed = |detail: String| ClientError::Download {
            link: entry.link.clone(),
            detail,
        };

        let response = self
            .http
            .get(&entry.link)
            .send()
            .await
            .map_err(|why| failed(describe(why)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("download of `{}` failed with {status}", entry.name);
            return Err(failed(format!("{status}: {body}")));
        }

        match representation {
            Representation::Buffer => {
                let bytes = response.bytes().await.map_err(|why| failed(describe(why)))?;
                Ok(Payload::Buffer(bytes))
            }
            Representation::Stream => {
                let stream = response
                    .bytes_stream()
                    .map_err(io::Error::other)
                    .boxed();
                Ok(Payload::Stream(stream))
            }
        }
    }
}

use std::path::Path;

use reqwest::{
    multipart::{Form, Part},
    Body,
};
use tokio::{fs::File, io::AsyncRead};
use tokio_util::io::ReaderStream;

use crate::{
    errors::{describe, ClientError, ClientResult},
    instrumentation,
    models::UploadResult,
    options::UploadOptions,
    Client,
};

const FILES_FIELD: &str = "filesUploaded";
const CATEGORY: &str = "file";

#[derive(Debug)]
enum Source {
    Buffer(Vec<u8>),
    Stream { body: Body, length: Option<u64> },
}

/// One file of an upload. A buffer always carries a name, a stream may leave it to the
/// service.
#[derive(Debug)]
pub struct UploadTarget {
    source: Source,
    name: Option<String>,
}

impl UploadTarget {
    pub fn buffer(bytes: impl Into<Vec<u8>>, name: impl Into<String>) -> ClientResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ClientError::InvalidFile(
                "an in-memory buffer needs a file name".to_string(),
            ));
        }

        Ok(Self {
            source: Source::Buffer(bytes.into()),
            name: Some(name),
        })
    }

    pub fn stream<R>(reader: R, name: Option<String>) -> Self
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        Self {
            source: Source::Stream {
                body: Body::wrap_stream(ReaderStream::new(reader)),
                length: None,
            },
            name: name.filter(|name| !name.is_empty()),
        }
    }

    /// Opens a file for streaming, naming it after the last path component.
    pub async fn from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).await?;
        let length = file.metadata().await?.len();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string);

        Ok(Self {
            source: Source::Stream {
                body: Body::wrap_stream(ReaderStream::new(file)),
                length: Some(length),
            },
            name,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn into_part(self) -> ClientResult<Part> {
        let part = match self.source {
            Source::Buffer(bytes) => {
                let mime = infer::get(&bytes).map(|kind| kind.mime_type());
                let part = Part::bytes(bytes);
                match mime {
                    Some(mime) => part
                        .mime_str(mime)
                        .map_err(|why| ClientError::InvalidFile(describe(why)))?,
                    None => part,
                }
            }
            Source::Stream {
                body,
                length: Some(length),
            } => Part::stream_with_length(body, length),
            Source::Stream { body, length: None } => Part::stream(body),
        };

        Ok(match self.name {
            Some(name) => part.file_name(name),
            None => part,
        })
    }
}

impl Client {
    pub async fn upload_buffer(
        &self,
        bytes: impl Into<Vec<u8>>,
        name: &str,
        options: UploadOptions,
    ) -> ClientResult<UploadResult> {
        let target = UploadTarget::buffer(bytes, name)?;
        self.upload_many(vec![target], options).await
    }

    pub async fn upload_stream<R>(
        &self,
        reader: R,
        name: Option<&str>,
        options: UploadOptions,
    ) -> ClientResult<UploadResult>
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        let target = UploadTarget::stream(reader, name.map(str::to_string));
        self.upload_many(vec![target], options).await
    }

    /// Uploads every file in one multipart request. Either all of them end up under the
    /// returned code or the call fails.
    pub async fn upload_many(
        &self,
        files: Vec<UploadTarget>,
        options: UploadOptions,
    ) -> ClientResult<UploadResult> {
        instrumentation::traced("upload", self.send_upload(files, options)).await
    }

    async fn send_upload(
        &self,
        files: Vec<UploadTarget>,
        options: UploadOptions,
    ) -> ClientResult<UploadResult> {
        if files.is_empty() {
            return Err(ClientError::InvalidFile(
                "you need to upload at least one file".to_string(),
            ));
        }

        // binding comes first, so a broker failure wins over an invalid option
        let binding = self.resolve_server(None).await?;
        let options = options.validate()?;

        let file_count = files.len();
        let mut form = Form::new();
        for file in files {
            form = form.part(FILES_FIELD, file.into_part()?);
        }
        form = options.apply(form.text("category", CATEGORY));

        let request = self
            .http
            .post(self.worker_endpoint(&binding, "upload"))
            .multipart(form);

        let result: UploadResult = self
            .exchange(request)
            .await
            .map_err(|detail| ClientError::Upload { detail })?;

        tracing::info!("uploaded {file_count} file(s) as `{}`", result.code);
        Ok(result)
    }
}

use tokio::io;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Couldn't get an upload server from the broker: {detail}")]
    ServerResolution { detail: String },
    #[error("Upload option `{field}` is invalid.")]
    InvalidOption { field: &'static str },
    #[error("Invalid file: {0}")]
    InvalidFile(String),
    #[error("Upload was rejected: {detail}")]
    Upload { detail: String },
    #[error("Couldn't fetch upload info: {detail}")]
    InfoFetch { detail: String },
    #[error("Couldn't download {link}: {detail}")]
    Download { link: String, detail: String },
    #[error("Couldn't remove upload: {detail}")]
    Removal { detail: String },

    #[error("Invalid configuration file: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Invalid user agent: {0}")]
    UserAgent(#[from] reqwest::header::InvalidHeaderValue),
    #[error("Couldn't build the HTTP client: {0}")]
    HttpClient(reqwest::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ClientError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::ServerResolution { .. } => "server-resolution",
            ClientError::InvalidOption { .. } => "invalid-option",
            ClientError::InvalidFile(_) => "invalid-file",
            ClientError::Upload { .. } => "upload-failed",
            ClientError::InfoFetch { .. } => "info-fetch-failed",
            ClientError::Download { .. } => "download-failed",
            ClientError::Removal { .. } => "removal-failed",
            ClientError::Config(_)
            | ClientError::UserAgent(_)
            | ClientError::HttpClient(_)
            | ClientError::Io(_) => "other",
        }
    }

    /// Offending option name for [`ClientError::InvalidOption`].
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ClientError::InvalidOption { field } => Some(*field),
            _ => None,
        }
    }
}

/// Renders an error with its whole source chain, e.g. `error sending request: connection refused`.
pub(crate) fn describe<E>(err: E) -> String
where
    E: Into<anyhow::Error>,
{
    format!("{:#}", err.into())
}

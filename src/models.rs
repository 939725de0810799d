use std::fmt;

use chrono::{DateTime, Utc};
use serde::{
    de::{DeserializeOwned, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

const STATUS_OK: &str = "ok";

#[derive(Deserialize)]
struct Envelope {
    status: Option<String>,
}

#[derive(Deserialize)]
struct Payload<T> {
    data: Option<T>,
}

/// Unwraps a `{status, data}` response. On failure the raw body is returned as the detail.
///
/// `data` is read straight from the body rather than through a `serde_json::Value`, which
/// would reorder the keys of the file manifest.
pub(crate) fn parse_envelope<T>(http_status: reqwest::StatusCode, body: &str) -> Result<T, String>
where
    T: DeserializeOwned,
{
    let failure = || format!("{http_status}: {body}");

    let envelope: Envelope = serde_json::from_str(body).map_err(|_| failure())?;
    if envelope.status.as_deref() != Some(STATUS_OK) {
        return Err(failure());
    }

    let payload: Payload<T> =
        serde_json::from_str(body).map_err(|why| format!("{why}; {}", failure()))?;
    match payload.data {
        Some(data) => Ok(data),
        // a missing or null `data` is only acceptable where null is
        None => serde_json::from_value(serde_json::Value::Null)
            .map_err(|why| format!("{why}; {}", failure())),
    }
}

/// Worker host handed out by the broker. Only valid for the operation that asked for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerBinding {
    pub server: String,
}

impl ServerBinding {
    pub fn endpoint(&self, worker_url: &str, path: &str) -> String {
        let base = worker_url.replace("{server}", &self.server);
        format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub code: String,
    pub removal_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadInfo {
    pub code: String,
    pub server: String,
    #[serde(default)]
    pub upload_time: i64,
    #[serde(default)]
    pub total_size: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub zip_available: bool,
    #[serde(default)]
    pub files: FileManifest,
    /// Anything else the service sends, kept untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UploadInfo {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.upload_time, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub md5: String,
    #[serde(default)]
    pub mimetype: String,
    pub link: String,
}

/// Files of an upload in the order the service enumerates them: integer keys first in
/// ascending numeric order, every other key in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileManifest(Vec<(String, FileEntry)>);

impl FileManifest {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileEntry)> {
        self.0.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &FileEntry> {
        self.0.iter().map(|(_, entry)| entry)
    }

    pub fn get(&self, key: &str) -> Option<&FileEntry> {
        self.iter().find(|(k, _)| *k == key).map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Canonical array index: no sign, no leading zero, below `u32::MAX`.
fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse::<u32>().ok().filter(|index| *index != u32::MAX)
}

impl From<Vec<(String, FileEntry)>> for FileManifest {
    fn from(mut entries: Vec<(String, FileEntry)>) -> Self {
        // stable sort, other keys keep their document order
        entries.sort_by_key(|(key, _)| match array_index(key) {
            Some(index) => (0, index),
            None => (1, 0),
        });
        Self(entries)
    }
}

impl<'de> Deserialize<'de> for FileManifest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ManifestVisitor;

        impl<'de> Visitor<'de> for ManifestVisitor {
            type Value = FileManifest;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of file entries")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries: Vec<(String, FileEntry)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));

                while let Some((key, entry)) = access.next_entry::<String, FileEntry>()? {
                    // a repeated key overwrites in place
                    match entries.iter_mut().find(|(k, _)| *k == key) {
                        Some(slot) => slot.1 = entry,
                        None => entries.push((key, entry)),
                    }
                }

                Ok(entries.into())
            }
        }

        deserializer.deserialize_map(ManifestVisitor)
    }
}

impl Serialize for FileManifest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

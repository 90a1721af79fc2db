//! Content DTOs: metadata objects, file descriptors and content entries.
//!
//! # Design
//! `PartialEq` on these types is plain structural equality. Comparing a
//! locally built entry with one that went through the service needs a looser
//! rule, because the server fills in values (file sizes, timestamps) the
//! caller never set. That rule lives in the explicit `matches` methods.
//!
//! `matches` only checks optional attributes present on both sides, so it is
//! symmetric for a pair but not transitive across three descriptors with
//! different optional fields populated. Use it for assertions, not as a key.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::client::{decode, encode};
use crate::envelope::Entry;
use crate::error::ApiResult;
use crate::lenient;

/// Normalise a server path: strip all leading and trailing slashes, then
/// prefix a single `/`.
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

/// One metadata value expressed in a vocabulary.
///
/// Keys other than the four known fields are kept in `attrs` and written
/// back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaObject {
    #[serde(default, deserialize_with = "lenient::string")]
    pub vocab: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub meta_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub lang: String,
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

impl MetaObject {
    pub fn new(
        vocab: impl Into<String>,
        meta_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            vocab: vocab.into(),
            meta_name: meta_name.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn from_dict(value: Value) -> ApiResult<Self> {
        decode(value)
    }

    pub fn to_dict(&self) -> ApiResult<Value> {
        encode(self)
    }

    /// Identity within a content entry: (meta_name, vocab, lang).
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.meta_name, &self.vocab, &self.lang)
    }
}

/// A file attached to a content entry.
///
/// Numeric attributes hold the JSON value the server sent (a number or a
/// numeric string), so a fetched descriptor is written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    #[serde(default, deserialize_with = "lenient::string")]
    pub path: String,
    /// Server-provided; never written back.
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing)]
    pub filename: Option<String>,
    /// Server-provided; never written back.
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing)]
    pub extension: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub media_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<Value>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub container: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub bitrate: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub width: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub height: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub frames: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub framerate: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub samplerate: Option<Value>,
}

impl FileDescriptor {
    pub fn new(path: &str, container: impl Into<String>) -> Self {
        Self {
            path: normalize_path(path),
            container: container.into(),
            ..Self::default()
        }
    }

    pub fn set_path(&mut self, path: &str) {
        self.path = normalize_path(path);
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<Value>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_duration(mut self, duration: impl Into<Value>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn with_bitrate(mut self, bitrate: impl Into<Value>) -> Self {
        self.bitrate = Some(bitrate.into());
        self
    }

    pub fn with_dimensions(mut self, width: impl Into<Value>, height: impl Into<Value>) -> Self {
        self.width = Some(width.into());
        self.height = Some(height.into());
        self
    }

    pub fn with_frames(mut self, frames: impl Into<Value>, framerate: impl Into<Value>) -> Self {
        self.frames = Some(frames.into());
        self.framerate = Some(framerate.into());
        self
    }

    pub fn with_samplerate(mut self, samplerate: impl Into<Value>) -> Self {
        self.samplerate = Some(samplerate.into());
        self
    }

    pub fn from_dict(value: Value) -> ApiResult<Self> {
        decode(value)
    }

    pub fn to_dict(&self) -> ApiResult<Value> {
        encode(self)
    }

    /// Partial match: `path` and `container` must be equal, every other
    /// attribute is only compared when both sides carry it. Numeric
    /// attributes compare as integers truncated toward zero, so `"29.97"`
    /// matches `29`.
    pub fn matches(&self, other: &FileDescriptor) -> bool {
        self.path == other.path
            && self.container == other.container
            && agree(&self.media_type, &other.media_type)
            && agree_numeric(&self.duration, &other.duration)
            && agree_numeric(&self.size, &other.size)
            && agree_numeric(&self.bitrate, &other.bitrate)
            && agree_numeric(&self.width, &other.width)
            && agree_numeric(&self.height, &other.height)
            && agree_numeric(&self.frames, &other.frames)
            && agree_numeric(&self.framerate, &other.framerate)
            && agree_numeric(&self.samplerate, &other.samplerate)
    }
}

fn agree<T: PartialEq>(a: &Option<T>, b: &Option<T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

// Non-numeric values fall back to comparing the raw JSON.
fn agree_numeric(a: &Option<Value>, b: &Option<Value>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => match (lenient::truncated(a), lenient::truncated(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
        _ => true,
    }
}

/// A content instance of the metadata service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentEntry {
    pub name: String,
    /// Last update time, set by the server.
    pub meta_updated: Option<String>,
    /// External (YouTube) identifier, `yt_id` on the wire.
    pub external_id: Option<String>,
    /// Path of the thumbnail in use, `thumb_used` on the wire.
    pub thumbnail: String,
    pub update_files: bool,
    pub tags: Vec<String>,
    pub meta: Vec<MetaObject>,
    pub files: Vec<FileDescriptor>,
}

impl ContentEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_meta(mut self, meta: MetaObject) -> Self {
        self.meta.push(meta);
        self
    }

    pub fn with_file(mut self, file: FileDescriptor) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_thumbnail(mut self, path: &str) -> Self {
        self.set_thumbnail(path);
        self
    }

    pub fn set_thumbnail(&mut self, path: &str) {
        self.thumbnail = normalize_path(path);
    }

    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }

    pub fn with_update_files(mut self, update_files: bool) -> Self {
        self.update_files = update_files;
        self
    }

    /// Parse `{"entry": {"content": {"params", "file", "file_params"}}}`.
    pub fn from_entry(value: Value) -> ApiResult<Self> {
        decode(value)
    }

    /// Serialize to the entry envelope. `tag`, `meta` and `yt_id` are left
    /// out when empty; `meta_updated` is never written.
    pub fn to_entry(&self) -> ApiResult<Value> {
        encode(self)
    }

    /// Partial match used to compare a local entry with a server copy.
    ///
    /// Name and tag list (in order) must be equal. Files are matched by path
    /// and metadata by (meta_name, vocab, lang); the order of either list is
    /// irrelevant but the lengths must agree.
    pub fn matches(&self, other: &ContentEntry) -> bool {
        self.name == other.name
            && self.tags == other.tags
            && self.files_match(&other.files)
            && self.meta_match(&other.meta)
    }

    fn files_match(&self, files: &[FileDescriptor]) -> bool {
        self.files.len() == files.len()
            && self.files.iter().all(|f| {
                files
                    .iter()
                    .find(|g| g.path == f.path)
                    .is_some_and(|g| f.matches(g))
            })
    }

    fn meta_match(&self, meta: &[MetaObject]) -> bool {
        self.meta.len() == meta.len()
            && self.meta.iter().all(|m| {
                meta.iter()
                    .find(|n| n.key() == m.key())
                    .is_some_and(|n| m == n)
            })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ContentBody {
    #[serde(default, deserialize_with = "lenient::vec")]
    file: Vec<FileDescriptor>,
    #[serde(default)]
    params: ContentParams,
    #[serde(default)]
    file_params: FileParams,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ContentParams {
    #[serde(default, deserialize_with = "lenient::string")]
    name: String,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing)]
    meta_updated: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    yt_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::vec",
        skip_serializing_if = "Vec::is_empty"
    )]
    tag: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient::vec",
        skip_serializing_if = "Vec::is_empty"
    )]
    meta: Vec<MetaObject>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct FileParams {
    #[serde(default, deserialize_with = "lenient::string")]
    thumb_used: String,
    #[serde(
        default,
        deserialize_with = "lenient::flag",
        serialize_with = "lenient::serialize_flag"
    )]
    update_files: bool,
}

impl From<&ContentEntry> for ContentBody {
    fn from(entry: &ContentEntry) -> Self {
        ContentBody {
            file: entry.files.clone(),
            params: ContentParams {
                name: entry.name.clone(),
                meta_updated: None,
                yt_id: entry.external_id.clone(),
                tag: entry.tags.clone(),
                meta: entry.meta.clone(),
            },
            file_params: FileParams {
                thumb_used: entry.thumbnail.clone(),
                update_files: entry.update_files,
            },
        }
    }
}

impl From<ContentBody> for ContentEntry {
    fn from(body: ContentBody) -> Self {
        ContentEntry {
            name: body.params.name,
            meta_updated: body.params.meta_updated,
            external_id: body.params.yt_id,
            thumbnail: body.file_params.thumb_used,
            update_files: body.file_params.update_files,
            tags: body.params.tag,
            meta: body.params.meta,
            files: body.file,
        }
    }
}

impl Serialize for ContentEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Entry::new(ContentBody::from(self)).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ContentEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Entry::<ContentBody>::deserialize(deserializer).map(|entry| entry.into_content().into())
    }
}

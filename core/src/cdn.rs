//! Facade for the CDN storage service (RASS): items are files on the CDN,
//! dirs are directories, and `/meta/` exposes their technical metadata.

use std::path::Path;

use serde_json::Value;

use crate::client::RawsClient;
use crate::config::ServiceConfig;
use crate::error::ApiResult;
use crate::http::{Transport, UreqTransport};
use crate::media::MediaSource;
use crate::query::{self, Query};

#[derive(Debug, Clone)]
pub struct CdnService<T = UreqTransport> {
    client: RawsClient<T>,
}

fn item_uri(path: &str) -> String {
    format!("/item/{}", path.trim_start_matches('/'))
}

fn dir_uri(path: &str) -> String {
    format!("/dir/{}", path.trim_start_matches('/'))
}

impl CdnService<UreqTransport> {
    pub fn connect(config: ServiceConfig) -> Self {
        Self::new(RawsClient::connect(config))
    }
}

impl<T: Transport> CdnService<T> {
    pub fn new(client: RawsClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RawsClient<T> {
        &self.client
    }

    /// Delete any resource by URI.
    pub fn delete(&self, uri: &str) -> ApiResult<bool> {
        self.client.delete(uri, &[])
    }

    // Items

    /// HEAD an item URL; 200 when it exists, `HttpError` otherwise.
    pub fn get_item_header(&self, uri: &str) -> ApiResult<u16> {
        self.client.head(uri)
    }

    pub fn get_item_header_from_path(&self, path: &str) -> ApiResult<u16> {
        self.get_item_header(&item_uri(path))
    }

    /// Upload `local_path` into `dirpath` as `filename`.
    ///
    /// With `force_create` the file is POSTed to the directory and the server
    /// appends a suffix if the name is taken. Without it the file is PUT to
    /// `dirpath/filename` and an existing file is an error.
    pub fn create_item(
        &self,
        dirpath: &str,
        filename: &str,
        local_path: impl AsRef<Path>,
        force_create: bool,
    ) -> ApiResult<Value> {
        let media = MediaSource::from_path(local_path, filename)?;
        self.create_item_from_media(dirpath, &media, force_create)
    }

    /// Same as `create_item` for content already in memory; the media
    /// filename is used as the target name.
    pub fn create_item_from_media(
        &self,
        dirpath: &str,
        media: &MediaSource,
        force_create: bool,
    ) -> ApiResult<Value> {
        let uri = item_uri(dirpath);
        if force_create {
            self.client.post(None, &uri, &[], Some(media))
        } else {
            let uri = format!("{}/{}", uri.trim_end_matches('/'), media.filename);
            self.client.put(None, &uri, &[], Some(media))
        }
    }

    pub fn item_exists(&self, path: &str) -> ApiResult<bool> {
        self.item_url_exists(&item_uri(path))
    }

    pub fn item_url_exists(&self, uri: &str) -> ApiResult<bool> {
        self.client.exists(uri)
    }

    /// Delete a file from the CDN together with its item resource.
    pub fn delete_item(&self, path: &str) -> ApiResult<bool> {
        self.client.delete(&item_uri(path), &[])
    }

    // Directories

    /// Create a directory. With `force_create` the server appends a suffix
    /// when the name is taken (POST); otherwise an existing directory is an
    /// error (PUT).
    pub fn create_dir(&self, path: &str, force_create: bool) -> ApiResult<Value> {
        let uri = dir_uri(path);
        if force_create {
            self.client.post(None, &uri, &[], None)
        } else {
            self.client.put(None, &uri, &[], None)
        }
    }

    pub fn dir_exists(&self, path: &str) -> ApiResult<bool> {
        self.client.exists(&dir_uri(path))
    }

    pub fn get_dir_list(&self, path: &str, query: Option<&Query>) -> ApiResult<Value> {
        let uri = query::apply(dir_uri(path), query);
        self.client.get(&uri, &[])
    }

    pub fn delete_dir(&self, path: &str, recursive: bool) -> ApiResult<bool> {
        let mut uri = dir_uri(path);
        if recursive {
            let mut query = Query::new();
            query.set("recursive", "1");
            uri = query.render(&uri);
        }
        self.client.delete(&uri, &[])
    }

    // Metadata

    /// Metadata of a file or directory; pass `/` for the root directory.
    pub fn get_meta_info(&self, path: &str, query: Option<&Query>) -> ApiResult<Value> {
        let uri = format!(
            "/meta/{}/{}",
            self.client.username(),
            path.trim_start_matches('/')
        );
        self.client.get(&query::apply(uri, query), &[])
    }

    /// Metadata of a single file.
    pub fn get_file_info(&self, path: &str, query: Option<&Query>) -> ApiResult<Value> {
        self.get_meta_info(path, query)
    }

    /// Metadata feed of the files in a directory.
    pub fn get_dir_info(&self, path: &str, query: Option<&Query>) -> ApiResult<Value> {
        self.get_meta_info(path, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::http::HttpMethod;
    use crate::testing::{config, RecordingTransport};

    const BASE: &str = "http://raws.example.com";

    fn service(transport: &RecordingTransport) -> CdnService<&RecordingTransport> {
        CdnService::new(RawsClient::new(config(), transport))
    }

    fn clip() -> MediaSource {
        MediaSource::from_bytes(b"frames".to_vec(), "video/mp4", "clip.mp4")
    }

    #[test]
    fn forced_item_creation_posts_to_directory() {
        let transport = RecordingTransport::new().respond(201, r#"{"entry":{}}"#);
        service(&transport)
            .create_item_from_media("/videos/", &clip(), true)
            .unwrap();

        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, format!("{BASE}/item/videos/"));
        assert_eq!(req.header("slug"), Some("clip.mp4"));
        assert_eq!(req.header("content-type"), Some("video/mp4"));
        assert_eq!(req.body.as_deref(), Some(&b"frames"[..]));
    }

    #[test]
    fn exact_item_creation_puts_to_file_path() {
        let transport = RecordingTransport::new().respond(201, "{}");
        service(&transport)
            .create_item_from_media("videos/", &clip(), false)
            .unwrap();

        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, format!("{BASE}/item/videos/clip.mp4"));
    }

    #[test]
    fn create_item_reads_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("local.mp3");
        std::fs::write(&local, b"ID3").unwrap();

        let transport = RecordingTransport::new().respond(201, "{}");
        service(&transport)
            .create_item("/music", "song.mp3", &local, true)
            .unwrap();

        let req = transport.last();
        assert_eq!(req.header("slug"), Some("song.mp3"));
        assert_eq!(req.header("content-type"), Some("audio/mpeg"));
        assert_eq!(req.header("content-length"), Some("3"));
    }

    #[test]
    fn create_item_with_missing_file_sends_nothing() {
        let transport = RecordingTransport::new();
        let err = service(&transport)
            .create_item("/music", "song.mp3", "/no/such/file.mp3", true)
            .unwrap_err();
        assert!(matches!(err, ApiError::Media(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn item_header_from_path() {
        let transport = RecordingTransport::new().respond(200, "");
        let status = service(&transport)
            .get_item_header_from_path("/videos/clip.mp4")
            .unwrap();
        assert_eq!(status, 200);
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Head);
        assert_eq!(req.path, format!("{BASE}/item/videos/clip.mp4"));
    }

    #[test]
    fn item_exists_maps_status_to_bool() {
        let transport = RecordingTransport::new().respond(200, "").respond(404, "");
        let svc = service(&transport);
        assert!(svc.item_exists("videos/clip.mp4").unwrap());
        assert!(!svc.item_exists("videos/clip.mp4").unwrap());
    }

    #[test]
    fn dir_exists_is_head_based() {
        let transport = RecordingTransport::new().respond(404, "").respond(200, "");
        let svc = service(&transport);

        assert!(!svc.dir_exists("foo/bar").unwrap());
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Head);
        assert_eq!(req.path, format!("{BASE}/dir/foo/bar"));

        assert!(svc.dir_exists("foo/bar").unwrap());
    }

    #[test]
    fn dir_exists_propagates_transport_failure() {
        let transport = RecordingTransport::new().fail("connection reset");
        let err = service(&transport).dir_exists("foo/bar").unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn create_dir_verb_depends_on_force() {
        let transport = RecordingTransport::new()
            .respond(201, r#"{"entry":{}}"#)
            .respond(201, r#"{"entry":{}}"#);
        let svc = service(&transport);

        svc.create_dir("/new/dir/", true).unwrap();
        assert_eq!(transport.last().method, HttpMethod::Post);
        assert_eq!(transport.last().path, format!("{BASE}/dir/new/dir/"));

        svc.create_dir("new/dir/", false).unwrap();
        assert_eq!(transport.last().method, HttpMethod::Put);
    }

    #[test]
    fn recursive_delete_adds_query() {
        let transport = RecordingTransport::new().respond(204, "").respond(204, "");
        let svc = service(&transport);

        svc.delete_dir("old/", false).unwrap();
        assert_eq!(transport.last().path, format!("{BASE}/dir/old/"));

        svc.delete_dir("old/", true).unwrap();
        assert_eq!(transport.last().path, format!("{BASE}/dir/old/?recursive=1"));
    }

    #[test]
    fn dir_list_merges_query() {
        let transport = RecordingTransport::new().respond(200, r#"{"feed":{}}"#);
        let mut query = Query::new();
        query.set("kind", "file");
        service(&transport)
            .get_dir_list("/videos/", Some(&query))
            .unwrap();
        assert_eq!(transport.last().path, format!("{BASE}/dir/videos/?kind=file"));
    }

    #[test]
    fn meta_info_is_rooted_at_user() {
        let transport = RecordingTransport::new()
            .respond(200, "{}")
            .respond(200, "{}")
            .respond(200, "{}");
        let svc = service(&transport);

        svc.get_file_info("/videos/clip.mp4", None).unwrap();
        assert_eq!(transport.last().path, format!("{BASE}/meta/joe/videos/clip.mp4"));

        svc.get_dir_info("/", None).unwrap();
        assert_eq!(transport.last().path, format!("{BASE}/meta/joe/"));

        svc.get_meta_info("videos/", None).unwrap();
        assert_eq!(transport.last().path, format!("{BASE}/meta/joe/videos/"));
    }

    #[test]
    fn delete_item_reports_missing_file() {
        let transport = RecordingTransport::new().respond(404, "item not found");
        let err = service(&transport).delete_item("/videos/gone.mp4").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(transport.last().path, format!("{BASE}/item/videos/gone.mp4"));
    }
}

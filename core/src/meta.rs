//! Facade for the content metadata service (META).
//!
//! Paths are rooted at the account name: `/content/{user}/`,
//! `/contentdir/{user}/`, `/vocab/{user}/` and `/ext/{format}/{user}/`.
//! Updates are POSTs to the instance path; the server has no PUT here.

use serde_json::Value;

use crate::client::{decode, RawsClient};
use crate::config::ServiceConfig;
use crate::content::ContentEntry;
use crate::envelope::Feed;
use crate::error::ApiResult;
use crate::http::{Transport, UreqTransport};
use crate::query::{self, Query};
use crate::vocab::Vocabulary;

#[derive(Debug, Clone)]
pub struct MetaService<T = UreqTransport> {
    client: RawsClient<T>,
}

impl MetaService<UreqTransport> {
    pub fn connect(config: ServiceConfig) -> Self {
        Self::new(RawsClient::connect(config))
    }
}

impl<T: Transport> MetaService<T> {
    pub fn new(client: RawsClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RawsClient<T> {
        &self.client
    }

    fn user(&self) -> &str {
        self.client.username()
    }

    fn content_uri(&self, name: &str) -> String {
        format!("/content/{}/{name}/", self.user())
    }

    fn vocab_uri(&self, name: &str) -> String {
        format!("/vocab/{}/{name}/", self.user())
    }

    /// Delete any resource by URI.
    pub fn delete(&self, uri: &str) -> ApiResult<bool> {
        self.client.delete(uri, &[])
    }

    // Content

    /// Create a content instance; the entry needs a name and at least one file.
    pub fn create_content(&self, entry: &ContentEntry) -> ApiResult<ContentEntry> {
        let uri = format!("/content/{}/", self.user());
        let response = self.client.post(Some(&entry.to_entry()?), &uri, &[], None)?;
        decode(response)
    }

    pub fn update_content(
        &self,
        entry: &ContentEntry,
        query: Option<&Query>,
    ) -> ApiResult<ContentEntry> {
        let uri = query::apply(self.content_uri(&entry.name), query);
        let response = self.client.post(Some(&entry.to_entry()?), &uri, &[], None)?;
        decode(response)
    }

    pub fn delete_content(&self, entry: &ContentEntry) -> ApiResult<bool> {
        self.client.delete(&self.content_uri(&entry.name), &[])
    }

    pub fn get_content_list(&self, query: Option<&Query>) -> ApiResult<Feed<ContentEntry>> {
        let uri = query::apply(format!("/content/{}/", self.user()), query);
        Feed::from_value(self.client.get(&uri, &[])?)
    }

    pub fn get_content_instance(
        &self,
        name: &str,
        query: Option<&Query>,
    ) -> ApiResult<ContentEntry> {
        let uri = query::apply(self.content_uri(name), query);
        decode(self.client.get(&uri, &[])?)
    }

    /// List the content (virtual or real) below a directory; `None` is the
    /// root directory.
    pub fn get_content_dir_list(
        &self,
        dirpath: Option<&str>,
        query: Option<&Query>,
    ) -> ApiResult<Value> {
        let path = match dirpath {
            Some(dir) if !dir.is_empty() => format!("/{}", dir.trim_start_matches('/')),
            _ => "/".to_string(),
        };
        let uri = query::apply(format!("/contentdir/{}{path}", self.user()), query);
        self.client.get(&uri, &[])
    }

    // Vocabularies

    pub fn create_vocab(&self, vocab: &Vocabulary) -> ApiResult<Vocabulary> {
        let uri = format!("/vocab/{}/", self.user());
        decode(self.client.post(Some(&vocab.to_entry()?), &uri, &[], None)?)
    }

    pub fn update_vocab(&self, vocab: &Vocabulary) -> ApiResult<Vocabulary> {
        self.update_vocab_name(vocab, &vocab.name)
    }

    /// Post `vocab` to the instance called `name`, which renames it when
    /// `vocab.name` differs.
    pub fn update_vocab_name(&self, vocab: &Vocabulary, name: &str) -> ApiResult<Vocabulary> {
        let uri = self.vocab_uri(name);
        decode(self.client.post(Some(&vocab.to_entry()?), &uri, &[], None)?)
    }

    pub fn delete_vocab(&self, vocab: &Vocabulary) -> ApiResult<bool> {
        self.client.delete(&self.vocab_uri(&vocab.name), &[])
    }

    pub fn get_vocab_list(&self, query: Option<&Query>) -> ApiResult<Feed<Vocabulary>> {
        let uri = query::apply(format!("/vocab/{}/", self.user()), query);
        Feed::from_value(self.client.get(&uri, &[])?)
    }

    pub fn get_vocab_instance(&self, name: &str) -> ApiResult<Vocabulary> {
        decode(self.client.get(&self.vocab_uri(name), &[])?)
    }

    // External feeds

    pub fn get_ext_json(&self, query: Option<&Query>) -> ApiResult<Value> {
        let uri = query::apply(format!("/ext/json/{}/", self.user()), query);
        self.client.get(&uri, &[])
    }

    /// Atom feed, returned as the raw document.
    pub fn get_ext_atom(&self, query: Option<&Query>) -> ApiResult<String> {
        let uri = query::apply(format!("/ext/atom/{}/", self.user()), query);
        self.client.get_text(&uri, "application/atom")
    }

    /// Media RSS feed, returned as the raw document. `rtmp` selects the
    /// JW Player RTMP flavour.
    pub fn get_ext_mrss(&self, rtmp: bool, query: Option<&Query>) -> ApiResult<String> {
        let kind = if rtmp { "mrss-jw-rtmp" } else { "mrss" };
        let uri = query::apply(format!("/ext/{kind}/{}/", self.user()), query);
        self.client.get_text(&uri, "application/xml")
    }
}

//! Blocking client library for the RAWS JSON services: content metadata
//! (META), CDN storage (RASS) and transcoding (RATS).
//!
//! # Overview
//! Each facade (`MetaService`, `CdnService`, `JobService`) turns a domain
//! call into one HTTP exchange: it builds the resource path, serializes the
//! DTO, and delegates to `RawsClient`, which attaches auth and headers,
//! sends the request through a `Transport`, and maps the status to a value
//! or an `ApiError`.
//!
//! # Design
//! - The transport is injected at construction; `UreqTransport` is the
//!   default. Tests swap in a recording double.
//! - DTOs are value types with serde (de)serialization to the
//!   `entry.content` envelope. Their `PartialEq` is structural; the looser
//!   comparison used against server copies is the explicit `matches`.
//! - No retries, no redirect following, no caching.
//!
//! ```no_run
//! use raws_core::{ContentEntry, FileDescriptor, MetaService, ServiceConfig};
//!
//! let meta = MetaService::connect(ServiceConfig::new("joe", "secret", "meta.example.com", true));
//! let entry = ContentEntry::new("video1")
//!     .with_tags(["sport", "2024"])
//!     .with_file(FileDescriptor::new("/videos/video1.mp4", "mp4"));
//! let created = meta.create_content(&entry)?;
//! assert!(created.matches(&entry));
//! # Ok::<(), raws_core::ApiError>(())
//! ```

pub mod cdn;
pub mod client;
pub mod config;
pub mod content;
pub mod envelope;
pub mod error;
pub mod http;
pub mod job;
pub mod jobs;
mod lenient;
pub mod media;
pub mod meta;
pub mod query;
pub mod vocab;

#[cfg(test)]
mod testing;

pub use cdn::CdnService;
pub use client::RawsClient;
pub use config::ServiceConfig;
pub use content::{normalize_path, ContentEntry, FileDescriptor, MetaObject};
pub use envelope::{Entry, Feed};
pub use error::{ApiError, ApiResult};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use job::JobRequest;
pub use jobs::JobService;
pub use media::MediaSource;
pub use meta::MetaService;
pub use query::Query;
pub use vocab::Vocabulary;

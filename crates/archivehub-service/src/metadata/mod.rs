//! Remote file metadata: type classification and the network probe.

pub mod classify;
pub mod probe;

pub use classify::{classify_by_extension, classify_by_mime, classify_file_type};
pub use probe::{HttpMetadataProbe, MetadataProbe, RemoteMetadata};

//! Core traits defined in `archivehub-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;

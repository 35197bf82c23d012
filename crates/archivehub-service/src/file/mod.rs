//! File lifecycle services.

pub mod service;

pub use service::{CreateFileRequest, FileService, UpdateFileRequest};

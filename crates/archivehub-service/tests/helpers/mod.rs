//! Shared fixtures for the hierarchy service tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use archivehub_cache::memory::MemoryCacheProvider;
use archivehub_core::config::cache::MemoryCacheConfig;
use archivehub_core::error::AppError;
use archivehub_core::result::AppResult;
use archivehub_core::traits::cache::CacheProvider;
use archivehub_core::types::DirectoryId;
use archivehub_database::memory::{MemoryDirectoryStore, MemoryFileStore};
use archivehub_database::store::DirectoryStore;
use archivehub_entity::directory::{CreateDirectory, Directory};
use archivehub_entity::file::File;
use archivehub_service::{
    CreateDirectoryRequest, CreateFileRequest, DirectoryService, FileService, MetadataProbe,
    RemoteMetadata,
};

/// Deterministic probe: answers from a URL table, fails for anything else.
#[derive(Debug, Default)]
pub struct StubProbe {
    answers: Mutex<HashMap<String, RemoteMetadata>>,
    calls: AtomicUsize,
}

impl StubProbe {
    pub fn answer(&self, url: &str, mime_type: Option<&str>, size: Option<i64>) {
        self.answers.lock().unwrap().insert(
            url.to_string(),
            RemoteMetadata {
                mime_type: mime_type.map(str::to_string),
                size,
            },
        );
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataProbe for StubProbe {
    async fn probe(&self, url: &str) -> AppResult<RemoteMetadata> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::external_service(format!("HEAD {url} answered 404")))
    }
}

/// Directory store whose next `list_all` can be held open after reading.
///
/// Once armed, the next `list_all` takes its snapshot, signals `reached`, and
/// then waits for `release` before returning that snapshot.
#[derive(Debug, Default)]
pub struct GatedDirectoryStore {
    inner: MemoryDirectoryStore,
    armed: AtomicBool,
    pub reached: Notify,
    pub release: Notify,
}

impl GatedDirectoryStore {
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DirectoryStore for GatedDirectoryStore {
    async fn find_by_id(&self, id: DirectoryId) -> AppResult<Option<Directory>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_path(&self, path: &str) -> AppResult<Option<Directory>> {
        self.inner.find_by_path(path).await
    }

    async fn list_by_parent(&self, parent_id: Option<DirectoryId>) -> AppResult<Vec<Directory>> {
        self.inner.list_by_parent(parent_id).await
    }

    async fn list_all(&self) -> AppResult<Vec<Directory>> {
        let rows = self.inner.list_all().await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.reached.notify_one();
            self.release.notified().await;
        }
        Ok(rows)
    }

    async fn list_by_path_prefix(&self, prefix: &str) -> AppResult<Vec<Directory>> {
        self.inner.list_by_path_prefix(prefix).await
    }

    async fn exists_by_parent_and_slug(
        &self,
        parent_id: Option<DirectoryId>,
        slug: &str,
        exclude: Option<DirectoryId>,
    ) -> AppResult<bool> {
        self.inner
            .exists_by_parent_and_slug(parent_id, slug, exclude)
            .await
    }

    async fn count_children(&self, id: DirectoryId) -> AppResult<u64> {
        self.inner.count_children(id).await
    }

    async fn create(&self, data: &CreateDirectory) -> AppResult<Directory> {
        self.inner.create(data).await
    }

    async fn update(&self, directory: &Directory) -> AppResult<Directory> {
        self.inner.update(directory).await
    }

    async fn delete(&self, id: DirectoryId) -> AppResult<bool> {
        self.inner.delete(id).await
    }
}

pub fn memory_cache() -> Arc<dyn CacheProvider> {
    Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig {
        max_capacity: 100,
    }))
}

/// Services wired against the in-memory stores and cache.
pub struct TestApp {
    pub directories: Arc<MemoryDirectoryStore>,
    pub files: Arc<MemoryFileStore>,
    pub cache: Option<Arc<dyn CacheProvider>>,
    pub probe: Arc<StubProbe>,
    pub directory_service: Arc<DirectoryService>,
    pub file_service: FileService,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(Some(memory_cache()))
    }

    pub fn without_cache() -> Self {
        Self::build(None)
    }

    fn build(cache: Option<Arc<dyn CacheProvider>>) -> Self {
        let directories = Arc::new(MemoryDirectoryStore::new());
        let files = Arc::new(MemoryFileStore::new());
        let probe = Arc::new(StubProbe::default());

        let directory_service = Arc::new(DirectoryService::new(
            directories.clone(),
            files.clone(),
            cache.clone(),
            Duration::from_secs(1800),
        ));
        let file_service = FileService::new(
            files.clone(),
            directories.clone(),
            directory_service.clone(),
            probe.clone(),
        );

        Self {
            directories,
            files,
            cache,
            probe,
            directory_service,
            file_service,
        }
    }

    pub async fn dir(&self, parent: Option<&Directory>, name: &str) -> Directory {
        self.dir_with(parent, name, 0, true).await
    }

    pub async fn dir_with(
        &self,
        parent: Option<&Directory>,
        name: &str,
        order: i32,
        published: bool,
    ) -> Directory {
        self.directory_service
            .create(CreateDirectoryRequest {
                parent_id: parent.map(|p| p.id),
                name: name.to_string(),
                order,
                published,
                ..Default::default()
            })
            .await
            .expect("create directory")
    }

    pub async fn file(&self, directory: &Directory, name: &str, url: &str) -> File {
        self.file_service
            .create(file_request(directory.id, name, url))
            .await
            .expect("create file")
    }
}

pub fn file_request(directory_id: DirectoryId, name: &str, url: &str) -> CreateFileRequest {
    CreateFileRequest {
        directory_id,
        name: name.to_string(),
        file_url: url.to_string(),
        published: true,
        ..Default::default()
    }
}

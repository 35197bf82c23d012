//! File repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use archivehub_core::error::{AppError, ErrorKind};
use archivehub_core::result::AppResult;
use archivehub_core::types::{DirectoryId, FileId};
use archivehub_entity::file::{CreateFile, File};

use super::map_write_err;
use crate::store::FileStore;

/// Repository for file CRUD scoped to directories.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn find_by_path(&self, path: &str) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE LOWER(path) = LOWER($1)")
            .bind(path)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find file by path", e)
            })
    }

    async fn list_by_directory(&self, directory_id: DirectoryId) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE directory_id = $1 ORDER BY sort_order ASC, LOWER(name) ASC",
        )
        .bind(directory_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn list_all(&self) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files ORDER BY path ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list all files", e))
    }

    async fn exists_by_directory_and_slug(
        &self,
        directory_id: DirectoryId,
        slug: &str,
        exclude: Option<FileId>,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM files \
                WHERE directory_id = $1 AND LOWER(slug) = LOWER($2) \
                  AND ($3::uuid IS NULL OR id <> $3) \
             )",
        )
        .bind(directory_id)
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check file slug", e))
    }

    async fn count_by_directory(&self, directory_id: DirectoryId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE directory_id = $1")
            .bind(directory_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count files", e))?;
        Ok(count as u64)
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files \
                (id, directory_id, name, slug, path, description, file_url, preview_url, \
                 mime_type, file_type, file_size, published, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *",
        )
        .bind(FileId::new())
        .bind(data.directory_id)
        .bind(&data.name)
        .bind(&data.slug)
        .bind(&data.path)
        .bind(&data.description)
        .bind(&data.file_url)
        .bind(&data.preview_url)
        .bind(&data.mime_type)
        .bind(data.file_type)
        .bind(data.file_size)
        .bind(data.published)
        .bind(data.order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_err(e, "Failed to create file", &data.path))
    }

    async fn update(&self, file: &File) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET directory_id = $2, name = $3, slug = $4, path = $5, \
             description = $6, file_url = $7, preview_url = $8, mime_type = $9, \
             file_type = $10, file_size = $11, published = $12, sort_order = $13, \
             updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(file.id)
        .bind(file.directory_id)
        .bind(&file.name)
        .bind(&file.slug)
        .bind(&file.path)
        .bind(&file.description)
        .bind(&file.file_url)
        .bind(&file.preview_url)
        .bind(&file.mime_type)
        .bind(file.file_type)
        .bind(file.file_size)
        .bind(file.published)
        .bind(file.order)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_err(e, "Failed to update file", &file.path))?
        .ok_or_else(|| AppError::not_found(format!("File {} not found", file.id)))
    }

    async fn delete(&self, id: FileId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }
}

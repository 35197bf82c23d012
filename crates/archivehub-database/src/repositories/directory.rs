//! Directory repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use archivehub_core::error::{AppError, ErrorKind};
use archivehub_core::result::AppResult;
use archivehub_core::types::DirectoryId;
use archivehub_entity::directory::{CreateDirectory, Directory};

use super::map_write_err;
use crate::store::DirectoryStore;

/// Repository for directory CRUD and hierarchy queries.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    /// Create a new directory repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryStore for DirectoryRepository {
    async fn find_by_id(&self, id: DirectoryId) -> AppResult<Option<Directory>> {
        sqlx::query_as::<_, Directory>("SELECT * FROM directories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find directory", e))
    }

    async fn find_by_path(&self, path: &str) -> AppResult<Option<Directory>> {
        sqlx::query_as::<_, Directory>("SELECT * FROM directories WHERE LOWER(path) = LOWER($1)")
            .bind(path)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find directory by path", e)
            })
    }

    async fn list_by_parent(&self, parent_id: Option<DirectoryId>) -> AppResult<Vec<Directory>> {
        sqlx::query_as::<_, Directory>(
            "SELECT * FROM directories WHERE parent_id IS NOT DISTINCT FROM $1 \
             ORDER BY sort_order ASC, LOWER(name) ASC",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list directories", e))
    }

    async fn list_all(&self) -> AppResult<Vec<Directory>> {
        sqlx::query_as::<_, Directory>("SELECT * FROM directories ORDER BY path ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list all directories", e)
            })
    }

    async fn list_by_path_prefix(&self, prefix: &str) -> AppResult<Vec<Directory>> {
        sqlx::query_as::<_, Directory>(
            "SELECT * FROM directories WHERE starts_with(LOWER(path), LOWER($1)) ORDER BY path ASC",
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list descendants", e))
    }

    async fn exists_by_parent_and_slug(
        &self,
        parent_id: Option<DirectoryId>,
        slug: &str,
        exclude: Option<DirectoryId>,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM directories \
                WHERE parent_id IS NOT DISTINCT FROM $1 AND LOWER(slug) = LOWER($2) \
                  AND ($3::uuid IS NULL OR id <> $3) \
             )",
        )
        .bind(parent_id)
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check slug", e))
    }

    async fn count_children(&self, id: DirectoryId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM directories WHERE parent_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count children", e)
            })?;
        Ok(count as u64)
    }

    async fn create(&self, data: &CreateDirectory) -> AppResult<Directory> {
        sqlx::query_as::<_, Directory>(
            "INSERT INTO directories \
                (id, parent_id, name, slug, path, description, sort_order, published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(DirectoryId::new())
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(&data.slug)
        .bind(&data.path)
        .bind(&data.description)
        .bind(data.order)
        .bind(data.published)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_err(e, "Failed to create directory", &data.path))
    }

    async fn update(&self, directory: &Directory) -> AppResult<Directory> {
        sqlx::query_as::<_, Directory>(
            "UPDATE directories SET parent_id = $2, name = $3, slug = $4, path = $5, \
             description = $6, sort_order = $7, published = $8, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(directory.id)
        .bind(directory.parent_id)
        .bind(&directory.name)
        .bind(&directory.slug)
        .bind(&directory.path)
        .bind(&directory.description)
        .bind(directory.order)
        .bind(directory.published)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_err(e, "Failed to update directory", &directory.path))?
        .ok_or_else(|| AppError::not_found(format!("Directory {} not found", directory.id)))
    }

    async fn delete(&self, id: DirectoryId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM directories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete directory", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}

//! Category repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use grimoire_core::{new_id, Category, CategoryPatch, CategoryRepository, NewCategory, Result};

use crate::map_write_error;

const CATEGORY_COLUMNS: &str = "id, title, keywords, created_at_utc, wizard_ids";

/// PostgreSQL implementation of CategoryRepository.
pub struct PgCategoryRepository {
    pool: Pool<Postgres>,
}

impl PgCategoryRepository {
    /// Create a new PgCategoryRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn category_from_row(r: &PgRow) -> Category {
    Category {
        id: r.get("id"),
        title: r.get("title"),
        keywords: r.get("keywords"),
        created_at: r.get("created_at_utc"),
        wizard_ids: r.get("wizard_ids"),
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn insert(&self, new: NewCategory) -> Result<Category> {
        let id = new_id();
        let now = Utc::now();

        let row = sqlx::query(&format!(
            "INSERT INTO category (id, title, keywords, created_at_utc, wizard_ids)
             VALUES ($1, $2, $3, $4, '{{}}')
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .bind(&new.title)
        .bind(&new.keywords)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "A category with this title already exists"))?;

        Ok(category_from_row(&row))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Category>> {
        let row = sqlx::query(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(category_from_row))
    }

    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Option<Category>> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        let row = sqlx::query(&format!(
            "UPDATE category
             SET title = COALESCE($2, title),
                 keywords = COALESCE($3, keywords)
             WHERE id = $1
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.keywords)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "A category with this title already exists"))?;

        Ok(row.as_ref().map(category_from_row))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Category>> {
        let row = sqlx::query(&format!(
            "DELETE FROM category WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(category_from_row))
    }

    async fn add_wizard(&self, category_id: Uuid, wizard_id: Uuid) -> Result<bool> {
        // Single-statement set-union: concurrent registrations cannot
        // overwrite each other.
        let result = sqlx::query(
            "UPDATE category
             SET wizard_ids = CASE
                 WHEN $2 = ANY(wizard_ids) THEN wizard_ids
                 ELSE array_append(wizard_ids, $2)
             END
             WHERE id = $1",
        )
        .bind(category_id)
        .bind(wizard_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_wizard(&self, category_id: Uuid, wizard_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE category SET wizard_ids = array_remove(wizard_ids, $2) WHERE id = $1",
        )
        .bind(category_id)
        .bind(wizard_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

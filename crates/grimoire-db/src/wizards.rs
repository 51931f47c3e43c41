//! Wizard repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use grimoire_core::{new_id, NewWizard, Result, Wizard, WizardPatch, WizardRepository};

use crate::map_write_error;

const WIZARD_COLUMNS: &str = "id, name, content, timestamp_utc, category_id";

const DUPLICATE_NAME: &str = "A wizard with this name already exists";

/// PostgreSQL implementation of WizardRepository.
///
/// Natural order is the `seq` column, which increases with every insert.
pub struct PgWizardRepository {
    pool: Pool<Postgres>,
}

impl PgWizardRepository {
    /// Create a new PgWizardRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn wizard_from_row(r: &PgRow) -> Wizard {
    Wizard {
        id: r.get("id"),
        name: r.get("name"),
        content: r.get("content"),
        timestamp: r.get("timestamp_utc"),
        category_id: r.get("category_id"),
    }
}

#[async_trait]
impl WizardRepository for PgWizardRepository {
    async fn insert(&self, new: NewWizard) -> Result<Wizard> {
        let row = sqlx::query(&format!(
            "INSERT INTO wizard (id, name, content, timestamp_utc, category_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {WIZARD_COLUMNS}"
        ))
        .bind(new_id())
        .bind(&new.name)
        .bind(&new.content)
        .bind(Utc::now())
        .bind(new.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_NAME))?;

        Ok(wizard_from_row(&row))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Wizard>> {
        let row = sqlx::query(&format!("SELECT {WIZARD_COLUMNS} FROM wizard WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(wizard_from_row))
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Wizard>> {
        let rows = sqlx::query(&format!(
            "SELECT {WIZARD_COLUMNS} FROM wizard ORDER BY seq LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(wizard_from_row).collect())
    }

    async fn count(&self) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM wizard")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn update(&self, id: Uuid, patch: WizardPatch) -> Result<Option<Wizard>> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        let row = sqlx::query(&format!(
            "UPDATE wizard
             SET name = COALESCE($2, name),
                 content = COALESCE($3, content),
                 category_id = COALESCE($4, category_id)
             WHERE id = $1
             RETURNING {WIZARD_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.content)
        .bind(patch.category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, DUPLICATE_NAME))?;

        Ok(row.as_ref().map(wizard_from_row))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Wizard>> {
        let row = sqlx::query(&format!(
            "DELETE FROM wizard WHERE id = $1 RETURNING {WIZARD_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(wizard_from_row))
    }

    async fn delete_by_category(&self, category_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM wizard WHERE category_id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

//! Item repository for database operations.

use async_trait::async_trait;
use sqlx::PgPool;

use atelier_core::{ItemId, Price};

use super::{ItemStore, RepositoryError};
use crate::models::item::{Item, ItemFields, ItemPatch};

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i32,
    name: String,
    price: f64,
    description: String,
}

impl TryFrom<ItemRow> for Item {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;

        Ok(Self {
            id: ItemId::new(row.id),
            name: row.name,
            price,
            description: row.description,
        })
    }
}

/// `PostgreSQL`-backed item repository.
#[derive(Clone)]
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemStore for ItemRepository {
    async fn list(&self) -> Result<Vec<Item>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT id, name, price, description
            FROM fashion_items
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Item::try_from).collect()
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT id, name, price, description
            FROM fashion_items
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Item::try_from).transpose()
    }

    async fn insert(&self, fields: &ItemFields) -> Result<Item, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            INSERT INTO fashion_items (name, price, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, price, description
            ",
        )
        .bind(&fields.name)
        .bind(fields.price.get())
        .bind(&fields.description)
        .fetch_one(&self.pool)
        .await?;

        Item::try_from(row)
    }

    async fn replace(
        &self,
        id: ItemId,
        fields: &ItemFields,
    ) -> Result<Option<Item>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            UPDATE fashion_items
            SET name = $2, price = $3, description = $4
            WHERE id = $1
            RETURNING id, name, price, description
            ",
        )
        .bind(id.as_i32())
        .bind(&fields.name)
        .bind(fields.price.get())
        .bind(&fields.description)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Item::try_from).transpose()
    }

    async fn patch(&self, id: ItemId, patch: &ItemPatch) -> Result<Option<Item>, RepositoryError> {
        // Absent fields bind NULL and keep the stored value.
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            UPDATE fashion_items
            SET name = COALESCE($2, name),
                price = COALESCE($3, price),
                description = COALESCE($4, description)
            WHERE id = $1
            RETURNING id, name, price, description
            ",
        )
        .bind(id.as_i32())
        .bind(patch.name.as_deref())
        .bind(patch.price.map(Price::get))
        .bind(patch.description.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Item::try_from).transpose()
    }

    async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM fashion_items WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

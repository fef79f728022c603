// src/db/inventory_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::inventory::{InventoryItem, InventoryTransaction, InventoryTxnType},
};

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn list_items(&self, hotel_id: Uuid) -> Result<Vec<InventoryItem>, AppError> {
        let items = sqlx::query_as::<_, InventoryItem>(
            "SELECT * FROM inventory_items WHERE hotel_id = $1 ORDER BY name ASC",
        )
        .bind(hotel_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn find_item(&self, hotel_id: Uuid, item_id: Uuid) -> Result<Option<InventoryItem>, AppError> {
        let item = sqlx::query_as::<_, InventoryItem>(
            "SELECT * FROM inventory_items WHERE id = $1 AND hotel_id = $2",
        )
        .bind(item_id)
        .bind(hotel_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    /// Itens no nível de reposição ou abaixo.
    pub async fn list_low_stock(&self, hotel_id: Uuid) -> Result<Vec<InventoryItem>, AppError> {
        let items = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT * FROM inventory_items
            WHERE hotel_id = $1 AND quantity <= reorder_level
            ORDER BY (quantity - reorder_level) ASC, name ASC
            "#,
        )
        .bind(hotel_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn list_transactions(&self, hotel_id: Uuid, item_id: Uuid) -> Result<Vec<InventoryTransaction>, AppError> {
        let txns = sqlx::query_as::<_, InventoryTransaction>(
            r#"
            SELECT * FROM inventory_transactions
            WHERE hotel_id = $1 AND item_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(hotel_id)
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(txns)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    pub async fn create_item<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        name: &str,
        sku: &str,
        category: Option<&str>,
        unit: &str,
        reorder_level: Decimal,
        unit_cost: Option<Decimal>,
    ) -> Result<InventoryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InventoryItem>(
            r#"
            INSERT INTO inventory_items (hotel_id, name, sku, category, unit, reorder_level, unit_cost)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(hotel_id)
        .bind(name)
        .bind(sku)
        .bind(category)
        .bind(unit)
        .bind(reorder_level)
        .bind(unit_cost)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "inventory_item"))
    }

    /// Trava o item: movimentações concorrentes do mesmo item ficam em fila.
    pub async fn lock_item<'e, E>(&self, executor: E, hotel_id: Uuid, item_id: Uuid) -> Result<InventoryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InventoryItem>(
            "SELECT * FROM inventory_items WHERE id = $1 AND hotel_id = $2 FOR UPDATE",
        )
        .bind(item_id)
        .bind(hotel_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("inventory_item".into()))
    }

    pub async fn set_quantity<'e, E>(&self, executor: E, item_id: Uuid, quantity: Decimal) -> Result<InventoryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, InventoryItem>(
            "UPDATE inventory_items SET quantity = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(item_id)
        .bind(quantity)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn record_transaction<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        item_id: Uuid,
        txn_type: InventoryTxnType,
        quantity: Decimal,
        balance_after: Decimal,
        notes: Option<&str>,
        performed_by: Option<Uuid>,
    ) -> Result<InventoryTransaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let txn = sqlx::query_as::<_, InventoryTransaction>(
            r#"
            INSERT INTO inventory_transactions (hotel_id, item_id, txn_type, quantity, balance_after, notes, performed_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(hotel_id)
        .bind(item_id)
        .bind(txn_type)
        .bind(quantity)
        .bind(balance_after)
        .bind(notes)
        .bind(performed_by)
        .fetch_one(executor)
        .await?;
        Ok(txn)
    }
}

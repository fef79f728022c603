// src/services/inventory_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InventoryRepository,
    models::inventory::{InventoryItem, InventoryTransaction, InventoryTxnType},
};

/// Dados de cadastro de um item.
#[derive(Debug, Clone)]
pub struct NewItem<'a> {
    pub name: &'a str,
    pub sku: &'a str,
    pub category: Option<&'a str>,
    pub unit: &'a str,
    pub reorder_level: Decimal,
    pub unit_cost: Option<Decimal>,
    pub initial_quantity: Decimal,
}

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
    pool: PgPool,
}

impl InventoryService {
    pub fn new(inventory_repo: InventoryRepository, pool: PgPool) -> Self {
        Self { inventory_repo, pool }
    }

    // --- CREATE ITEM ---
    pub async fn create_item(
        &self,
        hotel_id: Uuid,
        new: &NewItem<'_>,
        performed_by: Option<Uuid>,
    ) -> Result<InventoryItem, AppError> {
        if new.initial_quantity < Decimal::ZERO || new.reorder_level < Decimal::ZERO {
            return Err(AppError::InvalidInput("quantity".into()));
        }

        let mut tx = self.pool.begin().await?;

        let mut item = self
            .inventory_repo
            .create_item(
                &mut *tx,
                hotel_id,
                new.name,
                new.sku,
                new.category,
                new.unit,
                new.reorder_level,
                new.unit_cost,
            )
            .await?;

        // Saldo inicial entra como movimentação, para o histórico bater com o saldo
        if new.initial_quantity > Decimal::ZERO {
            item = self
                .inventory_repo
                .set_quantity(&mut *tx, item.id, new.initial_quantity)
                .await?;
            self.inventory_repo
                .record_transaction(
                    &mut *tx,
                    hotel_id,
                    item.id,
                    InventoryTxnType::In,
                    new.initial_quantity,
                    new.initial_quantity,
                    Some("Saldo inicial"),
                    performed_by,
                )
                .await?;
        }

        tx.commit().await?;
        Ok(item)
    }

    // --- MOVIMENTAÇÃO (ENTRADA / SAÍDA) ---
    pub async fn create_transaction(
        &self,
        hotel_id: Uuid,
        item_id: Uuid,
        txn_type: InventoryTxnType,
        quantity: Decimal,
        notes: Option<&str>,
        performed_by: Option<Uuid>,
    ) -> Result<InventoryTransaction, AppError> {
        if quantity <= Decimal::ZERO {
            return Err(AppError::InvalidInput("quantity".into()));
        }

        let mut tx = self.pool.begin().await?;

        // 1. Trava o item e calcula o novo saldo
        let item = self.inventory_repo.lock_item(&mut *tx, hotel_id, item_id).await?;
        let balance_after = txn_type.apply(item.quantity, quantity)?;

        // 2. Atualiza o saldo
        let updated = self.inventory_repo.set_quantity(&mut *tx, item.id, balance_after).await?;

        // 3. Grava o histórico
        let txn = self
            .inventory_repo
            .record_transaction(&mut *tx, hotel_id, item.id, txn_type, quantity, balance_after, notes, performed_by)
            .await?;

        tx.commit().await?;

        if updated.is_low_stock() {
            tracing::warn!("📦 Estoque baixo: {} ({} {})", updated.name, updated.quantity, updated.unit);
        }
        Ok(txn)
    }

    // --- LEITURA ---

    pub async fn list_items(&self, hotel_id: Uuid) -> Result<Vec<InventoryItem>, AppError> {
        self.inventory_repo.list_items(hotel_id).await
    }

    pub async fn get_item(&self, hotel_id: Uuid, item_id: Uuid) -> Result<InventoryItem, AppError> {
        self.inventory_repo
            .find_item(hotel_id, item_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("inventory_item".into()))
    }

    pub async fn list_low_stock(&self, hotel_id: Uuid) -> Result<Vec<InventoryItem>, AppError> {
        self.inventory_repo.list_low_stock(hotel_id).await
    }

    pub async fn list_transactions(&self, hotel_id: Uuid, item_id: Uuid) -> Result<Vec<InventoryTransaction>, AppError> {
        let item = self.get_item(hotel_id, item_id).await?;
        self.inventory_repo.list_transactions(hotel_id, item.id).await
    }
}

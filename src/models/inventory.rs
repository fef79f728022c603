// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- Tipo de movimentação ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "inventory_txn_type", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum InventoryTxnType {
    In,  // Vira "IN"
    Out, // Vira "OUT"
}

impl InventoryTxnType {
    /// Saldo depois de aplicar a movimentação. Saída maior que o saldo é recusada.
    pub fn apply(self, current: Decimal, quantity: Decimal) -> Result<Decimal, AppError> {
        match self {
            InventoryTxnType::In => Ok(current + quantity),
            InventoryTxnType::Out if current < quantity => Err(AppError::InsufficientStock {
                available: current,
                requested: quantity,
            }),
            InventoryTxnType::Out => Ok(current - quantity),
        }
    }
}

// --- Itens (catálogo + saldo) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    #[schema(ignore)]
    pub hotel_id: Uuid,
    #[schema(example = "Toalha de banho")]
    pub name: String,
    #[schema(example = "LIN-TOW-001")]
    pub sku: String,
    #[schema(example = "Enxoval")]
    pub category: Option<String>,
    #[schema(example = "un")]
    pub unit: String,
    #[schema(example = "120")]
    pub quantity: Decimal,
    #[schema(example = "30")]
    pub reorder_level: Decimal,
    pub unit_cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_level
    }
}

// --- Histórico imutável ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryTransaction {
    pub id: Uuid,
    #[schema(ignore)]
    pub hotel_id: Uuid,
    pub item_id: Uuid,
    pub txn_type: InventoryTxnType,
    #[schema(example = "10")]
    pub quantity: Decimal,
    #[schema(example = "110")]
    pub balance_after: Decimal,
    pub notes: Option<String>,
    pub performed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    #[test]
    fn stock_in_adds() {
        assert_eq!(InventoryTxnType::In.apply(d(5), d(10)).unwrap(), d(15));
    }

    #[test]
    fn stock_out_to_exactly_zero_is_allowed() {
        assert_eq!(InventoryTxnType::Out.apply(d(5), d(5)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn stock_out_never_goes_negative() {
        match InventoryTxnType::Out.apply(d(5), d(6)) {
            Err(AppError::InsufficientStock { available, requested }) => {
                assert_eq!(available, d(5));
                assert_eq!(requested, d(6));
            }
            other => panic!("esperava estoque insuficiente, veio {other:?}"),
        }
    }

    #[test]
    fn ledger_sequence_keeps_quantity_consistent() {
        let moves = [
            (InventoryTxnType::In, d(20)),
            (InventoryTxnType::Out, d(7)),
            (InventoryTxnType::Out, d(20)), // recusada
            (InventoryTxnType::In, d(2)),
            (InventoryTxnType::Out, d(15)),
        ];
        let mut quantity = Decimal::ZERO;
        let mut accepted = 0;
        for (kind, qty) in moves {
            if let Ok(next) = kind.apply(quantity, qty) {
                quantity = next;
                accepted += 1;
            }
            assert!(quantity >= Decimal::ZERO);
        }
        assert_eq!(accepted, 4);
        assert_eq!(quantity, Decimal::ZERO);
    }
}

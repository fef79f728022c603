// src/models/folio.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "folio_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FolioStatus {
    Open,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "charge_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeType {
    Room,
    FoodBeverage,
    Laundry,
    Minibar,
    Service,
    Tax,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    BankTransfer,
    Gateway,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "folio_payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FolioPaymentStatus {
    Pending,
    Success,
    Failed,
    Refunded,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Folio {
    pub id: Uuid,
    #[schema(ignore)]
    pub hotel_id: Uuid,
    pub booking_id: Uuid,
    pub status: FolioStatus,
    #[schema(example = "1000.00")]
    pub total_charges: Decimal,
    #[schema(example = "400.00")]
    pub total_payments: Decimal,
    #[schema(example = "600.00")]
    pub balance: Decimal,
    pub settled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    pub id: Uuid,
    pub folio_id: Uuid,
    pub charge_type: ChargeType,
    #[schema(example = "Jantar no restaurante")]
    pub description: String,
    #[schema(example = "450.00")]
    pub amount: Decimal,
    #[schema(example = 1)]
    pub quantity: i32,
    pub posted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub folio_id: Uuid,
    pub method: PaymentMethod,
    #[schema(example = "400.00")]
    pub amount: Decimal,
    pub status: FolioPaymentStatus,
    #[schema(example = "order_NXq1b2c3d4e5f6")]
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub refund_id: Option<String>,
    pub refund_amount: Option<Decimal>,
    pub refund_reason: Option<String>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Folio com todas as linhas (resposta do GET).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolioDetail {
    #[serde(flatten)]
    pub folio: Folio,
    pub charges: Vec<Charge>,
    pub payments: Vec<Payment>,
}

// --- Regras do livro-razão ---

/// Totais derivados. Sempre recalculados a partir de todas as linhas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FolioTotals {
    pub total_charges: Decimal,
    pub total_payments: Decimal,
    pub balance: Decimal,
}

impl FolioTotals {
    /// Cobranças entram como `amount × quantity` (lançadas ou não);
    /// pagamentos só contam com status SUCCESS.
    pub fn compute(charges: &[Charge], payments: &[Payment]) -> Self {
        let total_charges: Decimal = charges
            .iter()
            .map(|c| c.amount * Decimal::from(c.quantity))
            .sum();
        let total_payments: Decimal = payments
            .iter()
            .filter(|p| p.status == FolioPaymentStatus::Success)
            .map(|p| p.amount)
            .sum();

        Self {
            total_charges,
            total_payments,
            balance: total_charges - total_payments,
        }
    }
}

impl Folio {
    /// Fechamento só com saldo zerado ou credor.
    pub fn ensure_settleable(&self) -> Result<(), AppError> {
        if self.status == FolioStatus::Settled {
            return Err(AppError::FolioSettled);
        }
        if self.balance > Decimal::ZERO {
            return Err(AppError::OutstandingBalance(self.balance));
        }
        Ok(())
    }

    /// Cobranças e pagamentos novos exigem folio aberto.
    pub fn ensure_open(&self) -> Result<(), AppError> {
        match self.status {
            FolioStatus::Open => Ok(()),
            FolioStatus::Settled => Err(AppError::FolioSettled),
        }
    }

    /// Status após recalcular: um estorno que volta a deixar saldo devedor reabre o folio.
    pub fn status_after(&self, totals: &FolioTotals) -> FolioStatus {
        match self.status {
            FolioStatus::Settled if totals.balance > Decimal::ZERO => FolioStatus::Open,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charge(amount: i64, quantity: i32, posted: bool) -> Charge {
        Charge {
            id: Uuid::new_v4(),
            folio_id: Uuid::nil(),
            charge_type: ChargeType::Room,
            description: "Diária".into(),
            amount: Decimal::new(amount, 0),
            quantity,
            posted,
            created_at: Utc::now(),
        }
    }

    fn payment(amount: i64, status: FolioPaymentStatus) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            folio_id: Uuid::nil(),
            method: PaymentMethod::Cash,
            amount: Decimal::new(amount, 0),
            status,
            gateway_order_id: None,
            gateway_payment_id: None,
            refund_id: None,
            refund_amount: None,
            refund_reason: None,
            refunded_at: None,
            created_at: Utc::now(),
        }
    }

    fn folio_with(totals: FolioTotals, status: FolioStatus) -> Folio {
        Folio {
            id: Uuid::new_v4(),
            hotel_id: Uuid::nil(),
            booking_id: Uuid::new_v4(),
            status,
            total_charges: totals.total_charges,
            total_payments: totals.total_payments,
            balance: totals.balance,
            settled_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn balance_counts_quantity_and_only_successful_payments() {
        let totals = FolioTotals::compute(
            &[charge(500, 2, true), charge(120, 3, false)],
            &[
                payment(300, FolioPaymentStatus::Success),
                payment(200, FolioPaymentStatus::Failed),
                payment(100, FolioPaymentStatus::Pending),
                payment(50, FolioPaymentStatus::Refunded),
            ],
        );
        assert_eq!(totals.total_charges, Decimal::new(1360, 0));
        assert_eq!(totals.total_payments, Decimal::new(300, 0));
        assert_eq!(totals.balance, Decimal::new(1060, 0));
    }

    #[test]
    fn unposted_charges_count_toward_the_balance() {
        let totals = FolioTotals::compute(&[charge(2000, 1, false)], &[]);
        assert_eq!(totals.balance, Decimal::new(2000, 0));
        assert!(folio_with(totals, FolioStatus::Open).ensure_settleable().is_err());
    }

    #[test]
    fn settlement_scenario_1000_400_600() {
        let mut charges = vec![charge(1000, 1, true)];
        let mut payments = vec![payment(400, FolioPaymentStatus::Success)];

        let totals = FolioTotals::compute(&charges, &payments);
        assert_eq!(totals.balance, Decimal::new(600, 0));
        let folio = folio_with(totals, FolioStatus::Open);
        match folio.ensure_settleable() {
            Err(AppError::OutstandingBalance(b)) => assert_eq!(b, Decimal::new(600, 0)),
            other => panic!("esperava saldo devedor, veio {other:?}"),
        }

        payments.push(payment(600, FolioPaymentStatus::Success));
        let totals = FolioTotals::compute(&charges, &payments);
        assert_eq!(totals.balance, Decimal::ZERO);
        assert!(folio_with(totals, FolioStatus::Open).ensure_settleable().is_ok());

        // Totais não dependem da ordem das linhas.
        charges.reverse();
        payments.reverse();
        assert_eq!(FolioTotals::compute(&charges, &payments), totals);
    }

    #[test]
    fn overpaid_folio_can_settle() {
        let totals = FolioTotals::compute(&[charge(1000, 1, true)], &[payment(1200, FolioPaymentStatus::Success)]);
        assert_eq!(totals.balance, Decimal::new(-200, 0));
        assert!(folio_with(totals, FolioStatus::Open).ensure_settleable().is_ok());
    }

    #[test]
    fn settled_folio_rejects_new_lines_and_second_settle() {
        let totals = FolioTotals::compute(&[], &[]);
        let folio = folio_with(totals, FolioStatus::Settled);
        assert!(matches!(folio.ensure_open(), Err(AppError::FolioSettled)));
        assert!(matches!(folio.ensure_settleable(), Err(AppError::FolioSettled)));
    }

    #[test]
    fn refund_reopens_settled_folio_with_debt() {
        let settled = folio_with(
            FolioTotals::compute(&[charge(1000, 1, true)], &[payment(1000, FolioPaymentStatus::Success)]),
            FolioStatus::Settled,
        );
        let after_refund = FolioTotals::compute(&[charge(1000, 1, true)], &[payment(1000, FolioPaymentStatus::Refunded)]);
        assert_eq!(settled.status_after(&after_refund), FolioStatus::Open);

        let still_paid = FolioTotals::compute(&[charge(1000, 1, true)], &[payment(1000, FolioPaymentStatus::Success)]);
        assert_eq!(settled.status_after(&still_paid), FolioStatus::Settled);
    }
}

// src/models/booking.rs

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{common::error::AppError, models::guest::KycStatus};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "booking_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
    NoShow,
}

/// Eventos que movem uma reserva pelo ciclo de vida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingEvent {
    CheckIn,
    CheckOut,
    Cancel,
    NoShow,
}

impl BookingStatus {
    /// Status que ocupam capacidade (contam na disponibilidade).
    /// Usado direto nas consultas (`status = ANY($n)`).
    pub const ACTIVE: [BookingStatus; 2] = [BookingStatus::Confirmed, BookingStatus::CheckedIn];

    /// Tabela central de transições. Qualquer par fora dela é rejeitado.
    pub fn next(self, event: BookingEvent) -> Option<BookingStatus> {
        use BookingEvent as E;
        use BookingStatus as S;
        match (self, event) {
            (S::Confirmed, E::CheckIn) => Some(S::CheckedIn),
            (S::CheckedIn, E::CheckOut) => Some(S::CheckedOut),
            (S::Confirmed, E::Cancel) => Some(S::Cancelled),
            (S::Confirmed, E::NoShow) => Some(S::NoShow),
            _ => None,
        }
    }

    /// Ponto único de entrada das mudanças de status.
    pub fn apply(self, event: BookingEvent) -> Result<BookingStatus, AppError> {
        self.next(event).ok_or_else(|| AppError::InvalidTransition {
            entity: "booking",
            from: self.to_string(),
            to: event.target_label().to_string(),
        })
    }
}

impl BookingEvent {
    fn target_label(self) -> &'static str {
        match self {
            BookingEvent::CheckIn => "CHECKED_IN",
            BookingEvent::CheckOut => "CHECKED_OUT",
            BookingEvent::Cancel => "CANCELLED",
            BookingEvent::NoShow => "NO_SHOW",
        }
    }

    /// Ação registrada no histórico da reserva.
    pub fn activity_action(self) -> &'static str {
        match self {
            BookingEvent::CheckIn => "CHECK_IN",
            BookingEvent::CheckOut => "CHECK_OUT",
            BookingEvent::Cancel => "CANCELLED",
            BookingEvent::NoShow => "NO_SHOW",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::CheckedIn => "CHECKED_IN",
            BookingStatus::CheckedOut => "CHECKED_OUT",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::NoShow => "NO_SHOW",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "booking_payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingPaymentStatus {
    Pending,
    Partial,
    Paid,
    Refunded,
}

impl BookingPaymentStatus {
    /// Deriva o status de pagamento a partir dos totais do folio.
    /// `has_refund`: algum pagamento foi estornado.
    pub fn derive(total_paid: Decimal, balance: Decimal, has_refund: bool) -> Self {
        if total_paid > Decimal::ZERO {
            if balance <= Decimal::ZERO {
                BookingPaymentStatus::Paid
            } else {
                BookingPaymentStatus::Partial
            }
        } else if has_refund {
            BookingPaymentStatus::Refunded
        } else {
            BookingPaymentStatus::Pending
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "booking_source", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingSource {
    Direct,
    WalkIn,
    Phone,
    Website,
    Ota,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    #[schema(ignore)]
    pub hotel_id: Uuid,
    pub guest_id: Uuid,
    pub room_type_id: Uuid,
    pub room_id: Option<Uuid>,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub payment_status: BookingPaymentStatus,
    pub kyc_status: KycStatus,
    #[schema(example = "9000.00")]
    pub total_amount: Decimal,
    #[schema(example = "0.00")]
    pub paid_amount: Decimal,
    #[schema(example = 2)]
    pub adults: i32,
    #[schema(example = 0)]
    pub children: i32,
    pub source: BookingSource,
    #[schema(example = "booking.com")]
    pub channel: Option<String>,
    pub external_ref: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Histórico append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingActivity {
    pub id: Uuid,
    pub booking_id: Uuid,
    #[schema(example = "CHECK_IN")]
    pub action: String,
    pub description: Option<String>,
    pub performed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingEvent::{Cancel, CheckIn, CheckOut};
    use BookingStatus::{Cancelled, CheckedIn, CheckedOut, Confirmed};

    const ALL_STATUSES: [BookingStatus; 5] = [Confirmed, CheckedIn, CheckedOut, Cancelled, BookingStatus::NoShow];
    const ALL_EVENTS: [BookingEvent; 4] = [CheckIn, CheckOut, Cancel, BookingEvent::NoShow];

    #[test]
    fn transition_table_is_exactly_four_edges() {
        let allowed: Vec<_> = ALL_STATUSES
            .iter()
            .flat_map(|s| ALL_EVENTS.iter().filter_map(move |e| s.next(*e).map(|to| (*s, *e, to))))
            .collect();

        assert_eq!(
            allowed,
            vec![
                (Confirmed, CheckIn, CheckedIn),
                (Confirmed, Cancel, Cancelled),
                (Confirmed, BookingEvent::NoShow, BookingStatus::NoShow),
                (CheckedIn, CheckOut, CheckedOut),
            ]
        );
    }

    #[test]
    fn terminal_states_reject_everything() {
        for status in [CheckedOut, Cancelled, BookingStatus::NoShow] {
            for event in ALL_EVENTS {
                assert!(status.apply(event).is_err(), "{status} aceitou {event:?}");
            }
        }
    }

    #[test]
    fn checked_out_cannot_check_in_again() {
        let err = CheckedOut.apply(CheckIn).unwrap_err();
        match err {
            AppError::InvalidTransition { from, to, .. } => {
                assert_eq!(from, "CHECKED_OUT");
                assert_eq!(to, "CHECKED_IN");
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn check_out_requires_check_in() {
        assert!(Confirmed.apply(CheckOut).is_err());
        assert_eq!(CheckedIn.apply(CheckOut).unwrap(), CheckedOut);
    }

    #[test]
    fn no_show_is_only_reachable_from_confirmed() {
        assert_eq!(Confirmed.apply(BookingEvent::NoShow).unwrap(), BookingStatus::NoShow);
        assert!(CheckedIn.apply(BookingEvent::NoShow).is_err());
    }

    #[test]
    fn only_confirmed_and_checked_in_hold_capacity() {
        assert_eq!(BookingStatus::ACTIVE, [Confirmed, CheckedIn]);
        // Toda reserva ativa ainda pode sair do status por check-in ou check-out
        for status in BookingStatus::ACTIVE {
            assert!(status.next(CheckIn).is_some() || status.next(CheckOut).is_some());
        }
    }

    #[test]
    fn payment_status_derivation() {
        let d = |v: i64| Decimal::new(v, 0);
        assert_eq!(BookingPaymentStatus::derive(d(0), d(1000), false), BookingPaymentStatus::Pending);
        assert_eq!(BookingPaymentStatus::derive(d(400), d(600), false), BookingPaymentStatus::Partial);
        assert_eq!(BookingPaymentStatus::derive(d(1000), d(0), false), BookingPaymentStatus::Paid);
        assert_eq!(BookingPaymentStatus::derive(d(1200), d(-200), true), BookingPaymentStatus::Paid);
        assert_eq!(BookingPaymentStatus::derive(d(0), d(1000), true), BookingPaymentStatus::Refunded);
    }

    #[test]
    fn status_serializes_like_the_database_enum() {
        assert_eq!(serde_json::to_string(&CheckedIn).unwrap(), "\"CHECKED_IN\"");
        assert_eq!(serde_json::to_string(&BookingSource::WalkIn).unwrap(), "\"WALK_IN\"");
        assert_eq!(CheckedIn.to_string(), "CHECKED_IN");
    }
}

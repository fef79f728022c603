// src/models/availability.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Período de estadia. Invariante: `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl StayPeriod {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Datas de calendário viram meia-noite UTC.
    pub fn from_dates(check_in: NaiveDate, check_out: NaiveDate) -> Option<Self> {
        Self::new(midnight_utc(check_in), midnight_utc(check_out))
    }

    /// Teste de três cláusulas usado na contagem por tipo de quarto:
    /// a estadia existente começa dentro do novo período, termina dentro dele,
    /// ou o cobre por inteiro.
    pub fn conflicts_with(&self, existing: &StayPeriod) -> bool {
        let starts_inside = existing.start >= self.start && existing.start < self.end;
        let ends_inside = existing.end > self.start && existing.end <= self.end;
        let covers = existing.start <= self.start && existing.end >= self.end;
        starts_inside || ends_inside || covers
    }

    /// Sobreposição estrita de intervalos meio-abertos, usada por quarto físico.
    pub fn overlaps(&self, other: &StayPeriod) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Número de diárias (mínimo 1; frações de dia contam como diária cheia).
    pub fn nights(&self) -> i64 {
        let seconds = (self.end - self.start).num_seconds();
        let nights = (seconds + 86_399) / 86_400;
        nights.max(1)
    }
}

pub fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

/// Regra de capacidade: aceita se as reservas ativas sobrepostas
/// forem menos que os quartos utilizáveis. Zero quartos sempre rejeita.
pub fn has_capacity(overlapping: i64, total_rooms: i64) -> bool {
    total_rooms > 0 && overlapping < total_rooms
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    pub room_type_id: Uuid,
    #[schema(example = 12)]
    pub total_rooms: i64,
    #[schema(example = 9)]
    pub booked: i64,
    #[schema(example = 3)]
    pub available: i64,
    pub is_available: bool,
}

impl AvailabilityReport {
    pub fn new(room_type_id: Uuid, total_rooms: i64, booked: i64) -> Self {
        Self {
            room_type_id,
            total_rooms,
            booked,
            available: (total_rooms - booked).max(0),
            is_available: has_capacity(booked, total_rooms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(from: (u32, u32), to: (u32, u32)) -> StayPeriod {
        StayPeriod::from_dates(
            NaiveDate::from_ymd_opt(2024, from.0, from.1).unwrap(),
            NaiveDate::from_ymd_opt(2024, to.0, to.1).unwrap(),
        )
        .unwrap()
    }

    /// Quantas estadias ativas conflitam com o pedido (o que a query faz no banco).
    fn count_conflicts(request: &StayPeriod, active: &[StayPeriod]) -> i64 {
        active.iter().filter(|p| request.conflicts_with(p)).count() as i64
    }

    #[test]
    fn rejects_inverted_or_empty_ranges() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(StayPeriod::from_dates(d, d).is_none());
        assert!(StayPeriod::from_dates(d.succ_opt().unwrap(), d).is_none());
    }

    #[test]
    fn back_to_back_stays_do_not_conflict() {
        let first = period((6, 1), (6, 3));
        let next = period((6, 3), (6, 5));
        assert!(!next.conflicts_with(&first));
        assert!(!next.overlaps(&first));
        assert!(!first.overlaps(&next));
    }

    #[test]
    fn three_clause_test_matches_half_open_overlap() {
        let request = period((6, 10), (6, 15));
        let cases = [
            (period((6, 8), (6, 11)), true),   // termina dentro
            (period((6, 12), (6, 20)), true),  // começa dentro
            (period((6, 1), (6, 30)), true),   // cobre tudo
            (period((6, 11), (6, 12)), true),  // contido
            (period((6, 1), (6, 10)), false),  // termina no check-in
            (period((6, 15), (6, 18)), false), // começa no check-out
        ];
        for (existing, expected) in cases {
            assert_eq!(request.conflicts_with(&existing), expected, "{existing:?}");
            assert_eq!(request.overlaps(&existing), expected, "{existing:?}");
        }
    }

    #[test]
    fn capacity_boundary() {
        let total = 3;
        assert!(has_capacity(total - 1, total));
        assert!(!has_capacity(total, total));
        assert!(!has_capacity(0, 0));
    }

    #[test]
    fn two_deluxe_rooms_scenario() {
        let total_deluxe = 2;
        let mut active = Vec::new();

        let stay1 = period((6, 1), (6, 3));
        assert!(has_capacity(count_conflicts(&stay1, &active), total_deluxe));
        active.push(stay1);

        let stay2 = period((6, 2), (6, 4));
        assert!(has_capacity(count_conflicts(&stay2, &active), total_deluxe));
        active.push(stay2);

        let stay3 = period((6, 2), (6, 3));
        assert_eq!(count_conflicts(&stay3, &active), 2);
        assert!(!has_capacity(count_conflicts(&stay3, &active), total_deluxe));
    }

    #[test]
    fn nights_round_up_partial_days() {
        assert_eq!(period((6, 1), (6, 3)).nights(), 2);
        let start = midnight_utc(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let short = StayPeriod::new(start, start + chrono::Duration::hours(5)).unwrap();
        assert_eq!(short.nights(), 1);
        let long = StayPeriod::new(start, start + chrono::Duration::hours(30)).unwrap();
        assert_eq!(long.nights(), 2);
    }

    #[test]
    fn report_never_goes_negative() {
        let report = AvailabilityReport::new(Uuid::nil(), 2, 3);
        assert_eq!(report.available, 0);
        assert!(!report.is_available);
    }
}

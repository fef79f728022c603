// src/models/brand.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "brand_plan", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BrandPlan {
    Free,
    Starter,
    Professional,
    Enterprise,
}

impl BrandPlan {
    /// Quantos hotéis uma marca pode ter neste plano (`None` = ilimitado).
    pub fn max_hotels(self) -> Option<i64> {
        match self {
            BrandPlan::Free => Some(1),
            BrandPlan::Starter => Some(3),
            BrandPlan::Professional => Some(10),
            BrandPlan::Enterprise => None,
        }
    }

    pub fn allows_another_hotel(self, current: i64) -> bool {
        self.max_hotels().is_none_or(|max| current < max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: Uuid,
    #[schema(example = "Aurora Stays")]
    pub name: String,
    #[schema(example = "aurora-stays")]
    pub slug: String,
    pub plan: BrandPlan,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_limits() {
        assert!(BrandPlan::Free.allows_another_hotel(0));
        assert!(!BrandPlan::Free.allows_another_hotel(1));
        assert!(BrandPlan::Starter.allows_another_hotel(2));
        assert!(!BrandPlan::Professional.allows_another_hotel(10));
        assert!(BrandPlan::Enterprise.allows_another_hotel(10_000));
    }
}

// src/models/website.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteConfig {
    pub hotel_id: Uuid,
    #[schema(example = "hotel-aurora")]
    pub slug: String,
    #[schema(example = "Hotel Aurora, Udaipur")]
    pub title: String,
    pub tagline: Option<String>,
    #[schema(example = "#0F766E")]
    pub theme_color: Option<String>,
    pub hero_image_url: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub is_published: bool,
    pub updated_at: DateTime<Utc>,
}

// src/db/messaging_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::messaging::{MessageChannel, MessageTemplate},
};

#[derive(Clone)]
pub struct MessagingRepository {
    pool: PgPool,
}

impl MessagingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_templates(&self, hotel_id: Uuid) -> Result<Vec<MessageTemplate>, AppError> {
        let templates = sqlx::query_as::<_, MessageTemplate>(
            "SELECT * FROM message_templates WHERE hotel_id = $1 ORDER BY code ASC",
        )
        .bind(hotel_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(templates)
    }

    pub async fn find_by_code(&self, hotel_id: Uuid, code: &str) -> Result<Option<MessageTemplate>, AppError> {
        let template = sqlx::query_as::<_, MessageTemplate>(
            "SELECT * FROM message_templates WHERE hotel_id = $1 AND code = $2",
        )
        .bind(hotel_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(template)
    }

    pub async fn create_template<'e, E>(
        &self,
        executor: E,
        hotel_id: Uuid,
        code: &str,
        channel: MessageChannel,
        subject: Option<&str>,
        body: &str,
    ) -> Result<MessageTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, MessageTemplate>(
            r#"
            INSERT INTO message_templates (hotel_id, code, channel, subject, body)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(hotel_id)
        .bind(code)
        .bind(channel)
        .bind(subject)
        .bind(body)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "template"))
    }
}

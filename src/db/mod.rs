use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::warn;

use crate::error::StoreError;
use crate::models::alert::{Alert, AlertRow, Channel, TriggerType};
use crate::processor::transition::Transition;

#[cfg(test)]
pub mod memory;
pub mod queries;

pub type DbPool = Pool<Postgres>;

pub async fn init_pool(database_url: &str) -> Result<DbPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Persistence seam for the engine. `due` runs the selection predicate for one
/// (channel, trigger) pair; `apply` commits one alert's post-delivery update
/// atomically.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn due(
        &self,
        channel: Channel,
        trigger: TriggerType,
        as_of: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Alert>, StoreError>;

    async fn apply(&self, transition: &Transition) -> Result<(), StoreError>;
}

pub struct PgAlertStore {
    pool: DbPool,
}

impl PgAlertStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertStore for PgAlertStore {
    async fn due(
        &self,
        channel: Channel,
        trigger: TriggerType,
        as_of: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Alert>, StoreError> {
        let query = match (channel, trigger) {
            (Channel::Email, TriggerType::Regular) => queries::SELECT_DUE_EMAIL_REGULAR,
            (Channel::Email, TriggerType::Early) => queries::SELECT_DUE_EMAIL_EARLY,
            (Channel::Push, TriggerType::Regular) => queries::SELECT_DUE_PUSH_REGULAR,
            (Channel::Push, TriggerType::Early) => queries::SELECT_DUE_PUSH_EARLY,
        };

        let rows: Vec<AlertRow> = sqlx::query_as(query)
            .bind(as_of)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let mut alerts = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            match Alert::try_from(row) {
                Ok(alert) => alerts.push(alert),
                Err(e) => {
                    warn!(alert_id = %id, error = %e, "skipping malformed alert row");
                }
            }
        }
        Ok(alerts)
    }

    async fn apply(&self, transition: &Transition) -> Result<(), StoreError> {
        match transition {
            Transition::MarkEarly {
                alert_id,
                channel,
                occurrence,
            } => {
                let query = match channel {
                    Channel::Email => queries::MARK_EMAIL_EARLY_SENT,
                    Channel::Push => queries::MARK_PUSH_EARLY_SENT,
                };
                sqlx::query(query)
                    .bind(alert_id)
                    .bind(occurrence)
                    .execute(&self.pool)
                    .await?;
            }
            Transition::MarkRegular {
                alert_id,
                channel,
                occurrence,
            } => {
                let query = match channel {
                    Channel::Email => queries::MARK_EMAIL_SENT,
                    Channel::Push => queries::MARK_PUSH_SENT,
                };
                sqlx::query(query)
                    .bind(alert_id)
                    .bind(occurrence)
                    .execute(&self.pool)
                    .await?;
            }
            Transition::Reschedule {
                alert_id,
                channel,
                occurrence,
                next_alert_date,
                early_reminder_date,
                send_early_reminder,
            } => {
                let query = match channel {
                    Channel::Email => queries::RESCHEDULE_AFTER_EMAIL,
                    Channel::Push => queries::RESCHEDULE_AFTER_PUSH,
                };
                sqlx::query(query)
                    .bind(alert_id)
                    .bind(occurrence)
                    .bind(next_alert_date)
                    .bind(early_reminder_date)
                    .bind(send_early_reminder)
                    .execute(&self.pool)
                    .await?;
            }
            Transition::Retire {
                alert_id,
                channel,
                occurrence,
            } => {
                let query = match channel {
                    Channel::Email => queries::RETIRE_AFTER_EMAIL,
                    Channel::Push => queries::RETIRE_AFTER_PUSH,
                };
                sqlx::query(query)
                    .bind(alert_id)
                    .bind(occurrence)
                    .execute(&self.pool)
                    .await?;
            }
        }
        Ok(())
    }
}

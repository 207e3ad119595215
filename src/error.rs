use thiserror::Error;
use uuid::Uuid;

/// Calculation-time failures. These are fatal to a single alert's schedule,
/// never to the whole batch: the engine logs them and leaves the alert
/// untouched for manual inspection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("unrecognized alert period `{0}`")]
    InvalidPeriod(String),

    #[error("custom period alert has no end date")]
    MissingEndDate,

    #[error("early reminder offset {0} is outside 1..=365 days")]
    InvalidOffset(i32),
}

/// Failures turning a database row into a domain [`Alert`](crate::models::alert::Alert).
/// A malformed row is skipped with a warning so it cannot block the batch.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("alert must reference exactly one of a catalog product or a custom name")]
    AmbiguousTarget,
}

/// Persistence failures. These abort the current run; per-alert updates that
/// already committed stay valid.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("alert {0} not found")]
    NotFound(Uuid),
}

use chrono::NaiveDate;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{DecodeError, ScheduleError};

/// Notification channel. Each channel keeps its own dedup markers so email
/// and push never interfere with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Email,
    Push,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Push => "push",
        }
    }
}

/// Trigger type: the main occurrence notification, or the configurable
/// advance warning some days before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerType {
    Early,
    Regular,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::Early => "early",
            TriggerType::Regular => "regular",
        }
    }
}

/// Recurrence period, stored as a text column (`1_month`, `custom`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPeriod {
    OneMonth,
    ThreeMonths,
    OneYear,
    TwoYears,
    ThreeYears,
    Custom,
}

impl AlertPeriod {
    pub fn parse(s: &str) -> Result<Self, ScheduleError> {
        match s {
            "1_month" => Ok(AlertPeriod::OneMonth),
            "3_months" => Ok(AlertPeriod::ThreeMonths),
            "1_year" => Ok(AlertPeriod::OneYear),
            "2_years" => Ok(AlertPeriod::TwoYears),
            "3_years" => Ok(AlertPeriod::ThreeYears),
            "custom" => Ok(AlertPeriod::Custom),
            other => Err(ScheduleError::InvalidPeriod(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertPeriod::OneMonth => "1_month",
            AlertPeriod::ThreeMonths => "3_months",
            AlertPeriod::OneYear => "1_year",
            AlertPeriod::TwoYears => "2_years",
            AlertPeriod::ThreeYears => "3_years",
            AlertPeriod::Custom => "custom",
        }
    }

    /// Calendar offset for fixed periods; `None` for `custom`, whose single
    /// occurrence is derived from the contract end date instead.
    pub fn months(&self) -> Option<u32> {
        match self {
            AlertPeriod::OneMonth => Some(1),
            AlertPeriod::ThreeMonths => Some(3),
            AlertPeriod::OneYear => Some(12),
            AlertPeriod::TwoYears => Some(24),
            AlertPeriod::ThreeYears => Some(36),
            AlertPeriod::Custom => None,
        }
    }
}

/// What the reminder is about: a catalog product (with its comparison
/// deeplink) or a free-text contract the user named themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractTarget {
    Catalog {
        product_id: Uuid,
        name: String,
        deeplink: Option<String>,
    },
    Custom {
        name: String,
    },
}

impl ContractTarget {
    pub fn name(&self) -> &str {
        match self {
            ContractTarget::Catalog { name, .. } => name,
            ContractTarget::Custom { name } => name,
        }
    }

    pub fn deeplink(&self) -> Option<&str> {
        match self {
            ContractTarget::Catalog { deeplink, .. } => deeplink.as_deref(),
            ContractTarget::Custom { .. } => None,
        }
    }
}

/// A contract reminder. Dedup markers hold the occurrence date last notified
/// on that channel/trigger, never the wall-clock send time.
#[derive(Debug, Clone)]
pub struct Alert {
    pub id: Uuid,
    pub target: ContractTarget,
    pub email: Option<String>,
    pub push_token: Option<String>,
    pub period: AlertPeriod,
    pub is_periodic: bool,
    pub end_date: Option<NaiveDate>,
    pub next_alert_date: NaiveDate,
    pub send_early_reminder: bool,
    pub early_reminder_days: i32,
    pub early_reminder_date: Option<NaiveDate>,
    pub last_email_sent: Option<NaiveDate>,
    pub last_email_early_sent: Option<NaiveDate>,
    pub last_push_sent: Option<NaiveDate>,
    pub last_push_early_sent: Option<NaiveDate>,
    pub is_active: bool,
    pub unsubscribe_token: String,
}

impl Alert {
    /// The date that makes this alert due for the given trigger.
    pub fn target_date(&self, trigger: TriggerType) -> Option<NaiveDate> {
        match trigger {
            TriggerType::Regular => Some(self.next_alert_date),
            TriggerType::Early => self.early_reminder_date,
        }
    }

    /// Dedup marker for a channel/trigger pair.
    pub fn last_sent(&self, channel: Channel, trigger: TriggerType) -> Option<NaiveDate> {
        match (channel, trigger) {
            (Channel::Email, TriggerType::Regular) => self.last_email_sent,
            (Channel::Email, TriggerType::Early) => self.last_email_early_sent,
            (Channel::Push, TriggerType::Regular) => self.last_push_sent,
            (Channel::Push, TriggerType::Early) => self.last_push_early_sent,
        }
    }
}

/// Raw `alerts` row joined with `products`, as returned by the due-selection
/// queries. Decoded into [`Alert`] fallibly so one malformed row cannot take
/// down a batch.
#[derive(Debug, FromRow)]
pub struct AlertRow {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_name: Option<String>,
    pub deeplink: Option<String>,
    pub custom_product_name: Option<String>,
    pub email: Option<String>,
    pub push_token: Option<String>,
    pub alert_period: String,
    pub is_periodic: bool,
    pub end_date: Option<NaiveDate>,
    pub next_alert_date: NaiveDate,
    pub send_early_reminder: bool,
    pub early_reminder_days: i32,
    pub early_reminder_date: Option<NaiveDate>,
    pub last_email_sent: Option<NaiveDate>,
    pub last_email_early_sent: Option<NaiveDate>,
    pub last_push_sent: Option<NaiveDate>,
    pub last_push_early_sent: Option<NaiveDate>,
    pub is_active: bool,
    pub unsubscribe_token: String,
}

impl TryFrom<AlertRow> for Alert {
    type Error = DecodeError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        let target = match (row.product_id, row.custom_product_name) {
            (Some(product_id), None) => ContractTarget::Catalog {
                product_id,
                // A dangling product reference leaves the join empty.
                name: row.product_name.ok_or(DecodeError::AmbiguousTarget)?,
                deeplink: row.deeplink,
            },
            (None, Some(name)) => ContractTarget::Custom { name },
            _ => return Err(DecodeError::AmbiguousTarget),
        };

        Ok(Alert {
            id: row.id,
            target,
            email: row.email,
            push_token: row.push_token,
            period: AlertPeriod::parse(&row.alert_period).map_err(DecodeError::Schedule)?,
            is_periodic: row.is_periodic,
            end_date: row.end_date,
            next_alert_date: row.next_alert_date,
            send_early_reminder: row.send_early_reminder,
            early_reminder_days: row.early_reminder_days,
            early_reminder_date: row.early_reminder_date,
            last_email_sent: row.last_email_sent,
            last_email_early_sent: row.last_email_early_sent,
            last_push_sent: row.last_push_sent,
            last_push_early_sent: row.last_push_early_sent,
            is_active: row.is_active,
            unsubscribe_token: row.unsubscribe_token,
        })
    }
}

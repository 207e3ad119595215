//! In-memory [`AlertStore`] used by engine tests. Implements the same
//! selection predicates and atomic per-alert updates as the Postgres store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::db::AlertStore;
use crate::error::StoreError;
use crate::models::alert::{Alert, Channel, TriggerType};
use crate::processor::transition::Transition;

#[derive(Default)]
pub struct MemoryAlertStore {
    // BTreeMap keeps the id tiebreak deterministic.
    alerts: Mutex<BTreeMap<Uuid, Alert>>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, alert: Alert) {
        self.alerts.lock().unwrap().insert(alert.id, alert);
    }

    pub fn get(&self, id: Uuid) -> Option<Alert> {
        self.alerts.lock().unwrap().get(&id).cloned()
    }
}

fn is_due(alert: &Alert, channel: Channel, trigger: TriggerType, as_of: NaiveDate) -> bool {
    if !alert.is_active {
        return false;
    }
    let has_target = match channel {
        Channel::Email => alert.email.is_some(),
        Channel::Push => alert.push_token.is_some(),
    };
    if !has_target {
        return false;
    }
    match trigger {
        TriggerType::Regular => {
            alert.next_alert_date <= as_of
                && alert
                    .last_sent(channel, trigger)
                    .map_or(true, |sent| sent < alert.next_alert_date)
        }
        TriggerType::Early => {
            alert.send_early_reminder
                && alert.early_reminder_date.map_or(false, |early| {
                    early <= as_of
                        && alert
                            .last_sent(channel, trigger)
                            .map_or(true, |sent| sent < early)
                })
        }
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn due(
        &self,
        channel: Channel,
        trigger: TriggerType,
        as_of: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Alert>, StoreError> {
        let alerts = self.alerts.lock().unwrap();
        let mut due: Vec<Alert> = alerts
            .values()
            .filter(|a| is_due(a, channel, trigger, as_of))
            .cloned()
            .collect();
        due.sort_by_key(|a| (a.target_date(trigger), a.id));
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn apply(&self, transition: &Transition) -> Result<(), StoreError> {
        let mut alerts = self.alerts.lock().unwrap();
        let alert = alerts
            .get_mut(&transition.alert_id())
            .ok_or(StoreError::NotFound(transition.alert_id()))?;
        if !alert.is_active {
            // Matches the SQL guard: retired alerts are never mutated.
            return Ok(());
        }
        match transition {
            Transition::MarkEarly {
                channel,
                occurrence,
                ..
            } => match channel {
                Channel::Email => alert.last_email_early_sent = Some(*occurrence),
                Channel::Push => alert.last_push_early_sent = Some(*occurrence),
            },
            Transition::MarkRegular {
                channel,
                occurrence,
                ..
            } => match channel {
                Channel::Email => alert.last_email_sent = Some(*occurrence),
                Channel::Push => alert.last_push_sent = Some(*occurrence),
            },
            Transition::Reschedule {
                channel,
                occurrence,
                next_alert_date,
                early_reminder_date,
                send_early_reminder,
                ..
            } => {
                match channel {
                    Channel::Email => alert.last_email_sent = Some(*occurrence),
                    Channel::Push => alert.last_push_sent = Some(*occurrence),
                }
                alert.next_alert_date = *next_alert_date;
                alert.early_reminder_date = *early_reminder_date;
                alert.send_early_reminder = *send_early_reminder;
            }
            Transition::Retire {
                channel,
                occurrence,
                ..
            } => {
                match channel {
                    Channel::Email => alert.last_email_sent = Some(*occurrence),
                    Channel::Push => alert.last_push_sent = Some(*occurrence),
                }
                alert.is_active = false;
            }
        }
        Ok(())
    }
}

//! Plans the state update that follows a confirmed delivery. Planning is pure
//! and happens before dispatch, so a calculation error excludes the alert from
//! the send instead of stranding a delivered notification without its update.

use chrono::NaiveDate;
use tracing::warn;
use uuid::Uuid;

use crate::error::ScheduleError;
use crate::models::alert::{Alert, AlertPeriod, Channel, TriggerType};
use crate::schedule;

/// One alert's post-delivery update. Applied by the store as a single
/// statement, so markers and rescheduling can never diverge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Early reminder delivered: record the occurrence on the early marker.
    /// Nothing else changes.
    MarkEarly {
        alert_id: Uuid,
        channel: Channel,
        occurrence: NaiveDate,
    },
    /// Regular reminder delivered while another configured channel still has
    /// to notify this occurrence: record the marker but hold the schedule, so
    /// the other channel can still select the alert for the same occurrence.
    MarkRegular {
        alert_id: Uuid,
        channel: Channel,
        occurrence: NaiveDate,
    },
    /// Regular reminder delivered on a periodic alert: record the occurrence
    /// and advance the schedule to the next cycle.
    Reschedule {
        alert_id: Uuid,
        channel: Channel,
        occurrence: NaiveDate,
        next_alert_date: NaiveDate,
        early_reminder_date: Option<NaiveDate>,
        send_early_reminder: bool,
    },
    /// Regular reminder delivered on a one-shot or custom alert: record the
    /// occurrence and retire the alert.
    Retire {
        alert_id: Uuid,
        channel: Channel,
        occurrence: NaiveDate,
    },
}

impl Transition {
    pub fn alert_id(&self) -> Uuid {
        match self {
            Transition::MarkEarly { alert_id, .. }
            | Transition::MarkRegular { alert_id, .. }
            | Transition::Reschedule { alert_id, .. }
            | Transition::Retire { alert_id, .. } => *alert_id,
        }
    }
}

/// Computes the transition for a delivery of `trigger` on `channel`.
///
/// `occurrence` is the target date that made the alert due (it becomes the
/// dedup marker value); `as_of` anchors the recomputation of the next cycle
/// for periodic alerts.
pub fn plan_delivery(
    alert: &Alert,
    channel: Channel,
    trigger: TriggerType,
    occurrence: NaiveDate,
    as_of: NaiveDate,
) -> Result<Transition, ScheduleError> {
    match trigger {
        TriggerType::Early => Ok(Transition::MarkEarly {
            alert_id: alert.id,
            channel,
            occurrence,
        }),
        TriggerType::Regular => {
            // Rescheduling (or retiring) collapses the occurrence for every
            // channel, so it waits until each configured channel has its
            // regular marker caught up. Until then, only mark.
            if other_channel_pending(alert, channel, occurrence) {
                return Ok(Transition::MarkRegular {
                    alert_id: alert.id,
                    channel,
                    occurrence,
                });
            }
            if alert.is_periodic && alert.period != AlertPeriod::Custom {
                let next = schedule::next_occurrence(alert.period, alert.end_date, as_of)?;
                let (early, send_early) = match schedule::early_reminder_date(
                    next,
                    alert.early_reminder_days,
                    alert.send_early_reminder,
                ) {
                    Ok(date) => (date, alert.send_early_reminder),
                    Err(ScheduleError::InvalidOffset(days)) => {
                        warn!(
                            alert_id = %alert.id,
                            days,
                            "early reminder offset out of range, disabling early reminders"
                        );
                        (None, false)
                    }
                    Err(e) => return Err(e),
                };
                Ok(Transition::Reschedule {
                    alert_id: alert.id,
                    channel,
                    occurrence,
                    next_alert_date: next,
                    early_reminder_date: early,
                    send_early_reminder: send_early,
                })
            } else {
                Ok(Transition::Retire {
                    alert_id: alert.id,
                    channel,
                    occurrence,
                })
            }
        }
    }
}

/// True when the other channel has a target and has not yet notified this
/// occurrence on the regular trigger.
fn other_channel_pending(alert: &Alert, channel: Channel, occurrence: NaiveDate) -> bool {
    let (has_target, marker) = match channel {
        Channel::Email => (
            alert.push_token.is_some(),
            alert.last_sent(Channel::Push, TriggerType::Regular),
        ),
        Channel::Push => (
            alert.email.is_some(),
            alert.last_sent(Channel::Email, TriggerType::Regular),
        ),
    };
    has_target && marker.map_or(true, |sent| sent < occurrence)
}

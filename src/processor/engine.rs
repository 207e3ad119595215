//! One periodic run for a channel: select due alerts, dispatch notifications,
//! and apply the per-alert state transitions for confirmed deliveries.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::AlertStore;
use crate::error::StoreError;
use crate::models::alert::{Alert, Channel, TriggerType};
use crate::notify::dispatch::group_by_token;
use crate::notify::{email_message, push_message, Notifier};
use crate::processor::transition::{plan_delivery, Transition};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Due-selection cap per store call.
    pub batch_size: i64,
    /// Batch-count budget per (channel, trigger) pair, bounding run time.
    pub max_batches: u32,
    /// Link target for unsubscribe URLs and tokens without a deeplink.
    pub base_url: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub selected: usize,
    pub delivered: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Runs early then regular triggers for one channel. Store errors abort the
/// run; transitions already applied stay committed and everything else is
/// simply re-eligible next run.
pub async fn run_channel(
    store: &dyn AlertStore,
    notifier: &dyn Notifier,
    channel: Channel,
    as_of: NaiveDate,
    config: &EngineConfig,
) -> Result<RunSummary, StoreError> {
    let mut summary = RunSummary::default();
    for trigger in [TriggerType::Early, TriggerType::Regular] {
        if let Err(e) =
            run_trigger(store, notifier, channel, trigger, as_of, config, &mut summary).await
        {
            // Committed per-alert updates stay valid; everything else is
            // re-eligible next run.
            warn!(
                channel = channel.as_str(),
                delivered = summary.delivered,
                failed = summary.failed,
                "run aborted mid-batch"
            );
            return Err(e);
        }
    }
    info!(
        channel = channel.as_str(),
        selected = summary.selected,
        delivered = summary.delivered,
        failed = summary.failed,
        skipped = summary.skipped,
        "channel run complete"
    );
    Ok(summary)
}

async fn run_trigger(
    store: &dyn AlertStore,
    notifier: &dyn Notifier,
    channel: Channel,
    trigger: TriggerType,
    as_of: NaiveDate,
    config: &EngineConfig,
    summary: &mut RunSummary,
) -> Result<(), StoreError> {
    // Failed or skipped alerts keep stale markers and would be selected again
    // by the very next batch; the seen-set stops the run from spinning on
    // them. Across runs the dedup markers bound retries to once per occurrence
    // per day.
    let mut seen: HashSet<Uuid> = HashSet::new();

    for _ in 0..config.max_batches {
        // Alerts that failed or were skipped stay due and keep their spot at
        // the head of the ordering; widening the limit by the seen count lets
        // the next batch reach past them.
        let limit = config.batch_size + seen.len() as i64;
        let batch = store.due(channel, trigger, as_of, limit).await?;
        let fresh: Vec<Alert> = batch
            .into_iter()
            .filter(|alert| seen.insert(alert.id))
            .collect();
        if fresh.is_empty() {
            break;
        }
        summary.selected += fresh.len();

        // Plan every transition before dispatching: an alert whose schedule
        // cannot be computed is excluded from the send and left untouched, so
        // a delivery can never end up without its state update.
        let mut plans: HashMap<Uuid, Transition> = HashMap::new();
        let mut ready: Vec<Alert> = Vec::new();
        for alert in fresh {
            let Some(occurrence) = alert.target_date(trigger) else {
                warn!(alert_id = %alert.id, "due alert has no target date, skipping");
                summary.skipped += 1;
                continue;
            };
            match plan_delivery(&alert, channel, trigger, occurrence, as_of) {
                Ok(transition) => {
                    plans.insert(alert.id, transition);
                    ready.push(alert);
                }
                Err(e) => {
                    warn!(
                        alert_id = %alert.id,
                        error = %e,
                        "schedule calculation failed, leaving alert for inspection"
                    );
                    summary.skipped += 1;
                }
            }
        }

        match channel {
            Channel::Email => {
                dispatch_email(store, notifier, trigger, &ready, &plans, config, summary).await?;
            }
            Channel::Push => {
                dispatch_push(store, notifier, trigger, ready, &plans, config, summary).await?;
            }
        }
    }
    Ok(())
}

async fn dispatch_email(
    store: &dyn AlertStore,
    notifier: &dyn Notifier,
    trigger: TriggerType,
    batch: &[Alert],
    plans: &HashMap<Uuid, Transition>,
    config: &EngineConfig,
    summary: &mut RunSummary,
) -> Result<(), StoreError> {
    for alert in batch {
        let Some(to) = alert.email.as_deref() else {
            continue;
        };
        let message = email_message(alert, trigger, &config.base_url);
        if notifier.send_email(to, &message.subject, &message.body).await {
            if let Some(transition) = plans.get(&alert.id) {
                store.apply(transition).await?;
            }
            summary.delivered += 1;
            info!(
                alert_id = %alert.id,
                trigger = trigger.as_str(),
                "sent email reminder"
            );
        } else {
            summary.failed += 1;
            warn!(alert_id = %alert.id, "email delivery failed, will retry next run");
        }
    }
    Ok(())
}

async fn dispatch_push(
    store: &dyn AlertStore,
    notifier: &dyn Notifier,
    trigger: TriggerType,
    batch: Vec<Alert>,
    plans: &HashMap<Uuid, Transition>,
    config: &EngineConfig,
    summary: &mut RunSummary,
) -> Result<(), StoreError> {
    for group in group_by_token(batch) {
        let message = push_message(&group.alerts, trigger, &config.base_url);
        // One outcome per token group: a delivered aggregate message counts
        // for every alert behind it.
        if notifier
            .send_push(&group.token, &message.title, &message.body, &message.payload)
            .await
        {
            for alert in &group.alerts {
                if let Some(transition) = plans.get(&alert.id) {
                    store.apply(transition).await?;
                }
                summary.delivered += 1;
            }
            info!(
                alerts = group.alerts.len(),
                trigger = trigger.as_str(),
                "sent push reminder"
            );
        } else {
            summary.failed += group.alerts.len();
            warn!(
                alerts = group.alerts.len(),
                "push delivery failed, will retry next run"
            );
        }
    }
    Ok(())
}

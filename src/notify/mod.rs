use async_trait::async_trait;
use serde_json::{json, Value};

use crate::models::alert::{Alert, TriggerType};

pub mod delivery;
pub mod dispatch;

/// External send capability. Implementations return whether the provider
/// accepted the message; `false` leaves the alert untouched so the next run
/// retries it naturally.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> bool;

    async fn send_push(&self, token: &str, title: &str, body: &str, payload: &Value) -> bool;
}

#[derive(Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, PartialEq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub payload: Value,
}

pub fn email_message(alert: &Alert, trigger: TriggerType, base_url: &str) -> EmailMessage {
    let name = alert.target.name();
    let deeplink = alert.target.deeplink().unwrap_or(base_url);
    let unsubscribe_url = format!(
        "{}/unsubscribe.php?token={}",
        base_url, alert.unsubscribe_token
    );

    let (subject, intro) = match trigger {
        TriggerType::Regular => (
            format!("🔔 Contractwekker voor {name} - Het is tijd!"),
            format!(
                "Je hebt een tijdje geleden een contractwekker ingesteld voor {name}. \
                 Deze is nu afgegaan! Tijd om je contract te bekijken en eventueel \
                 over te stappen naar een betere deal."
            ),
        ),
        TriggerType::Early => (
            format!("⏰ Vroege herinnering voor {name}"),
            format!(
                "Je contract '{name}' loopt binnenkort af - nog {} dagen tot de hoofdherinnering.",
                alert.early_reminder_days
            ),
        ),
    };

    let body = format!(
        "{intro}\n\nBekijk nieuwe {name} opties: {deeplink}\n\n\
         Wil je geen herinneringen meer ontvangen? Meld je af via {unsubscribe_url}\n"
    );

    EmailMessage { subject, body }
}

/// Push message for one token group. A single alert gets a per-contract
/// message with its deeplink; several alerts behind the same token collapse
/// into one aggregate message whose outcome applies to the whole group.
pub fn push_message(group: &[Alert], trigger: TriggerType, base_url: &str) -> PushMessage {
    if let [alert] = group {
        let name = alert.target.name();
        let url = alert.target.deeplink().unwrap_or(base_url);
        let (title, body) = match trigger {
            TriggerType::Early => (
                "⏰ Vroege herinnering".to_string(),
                format!(
                    "Je contract '{name}' - nog {} dagen tot hoofdherinnering",
                    alert.early_reminder_days
                ),
            ),
            TriggerType::Regular => (
                "⏰ Contractwekker".to_string(),
                format!("Je contract '{name}' loopt binnenkort af. Tijd om over te stappen!"),
            ),
        };
        PushMessage {
            title,
            body,
            payload: json!({ "url": url, "alert_id": alert.id }),
        }
    } else {
        PushMessage {
            title: "⏰ Contractwekker".to_string(),
            body: format!(
                "Je hebt {} contracten die binnenkort aflopen!",
                group.len()
            ),
            payload: json!({ "url": base_url, "count": group.len() }),
        }
    }
}

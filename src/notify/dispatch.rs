//! Groups a due push batch by delivery token. One device (token) gets at most
//! one message per batch; the group's single delivery outcome fans out to
//! every alert behind it.

use crate::models::alert::Alert;

#[derive(Debug)]
pub struct PushGroup {
    pub token: String,
    pub alerts: Vec<Alert>,
}

/// Selection order is preserved: groups appear in the order their first alert
/// was selected, and alerts keep their order within a group.
pub fn group_by_token(batch: Vec<Alert>) -> Vec<PushGroup> {
    let mut groups: Vec<PushGroup> = Vec::new();
    for alert in batch {
        let Some(token) = alert.push_token.clone() else {
            // Selection requires a token; a missing one here is a store bug.
            continue;
        };
        match groups.iter_mut().find(|g| g.token == token) {
            Some(group) => group.alerts.push(alert),
            None => groups.push(PushGroup {
                token,
                alerts: vec![alert],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::alert::{AlertPeriod, ContractTarget};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn alert(token: &str) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            target: ContractTarget::Custom {
                name: "Contract".to_string(),
            },
            email: None,
            push_token: Some(token.to_string()),
            period: AlertPeriod::OneMonth,
            is_periodic: true,
            end_date: None,
            next_alert_date: NaiveDate::from_ymd_opt(2025, 8, 24).unwrap(),
            send_early_reminder: false,
            early_reminder_days: 30,
            early_reminder_date: None,
            last_email_sent: None,
            last_email_early_sent: None,
            last_push_sent: None,
            last_push_early_sent: None,
            is_active: true,
            unsubscribe_token: "tok".to_string(),
        }
    }

    #[test]
    fn shared_tokens_collapse_into_one_group() {
        let a = alert("t1");
        let b = alert("t2");
        let c = alert("t1");
        let groups = group_by_token(vec![a.clone(), b.clone(), c.clone()]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].token, "t1");
        assert_eq!(groups[0].alerts.len(), 2);
        assert_eq!(groups[0].alerts[0].id, a.id);
        assert_eq!(groups[0].alerts[1].id, c.id);
        assert_eq!(groups[1].token, "t2");
        assert_eq!(groups[1].alerts[0].id, b.id);
    }
}

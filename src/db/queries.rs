//! SQL for the alert store. The due-selection predicates mirror the dedup
//! rule: a marker equal to or after its target date means "already notified
//! for that occurrence"; a stale or null marker means the alert is still due.

pub const SELECT_DUE_EMAIL_REGULAR: &str = r#"
SELECT a.id, a.product_id, p.name AS product_name, p.deeplink, a.custom_product_name,
       a.email, a.push_token, a.alert_period, a.is_periodic, a.end_date,
       a.next_alert_date, a.send_early_reminder, a.early_reminder_days, a.early_reminder_date,
       a.last_email_sent, a.last_email_early_sent, a.last_push_sent, a.last_push_early_sent,
       a.is_active, a.unsubscribe_token
FROM alerts a
LEFT JOIN products p ON a.product_id = p.id
WHERE a.is_active
  AND a.email IS NOT NULL
  AND a.next_alert_date <= $1
  AND (a.last_email_sent IS NULL OR a.last_email_sent < a.next_alert_date)
ORDER BY a.next_alert_date ASC, a.id ASC
LIMIT $2;
"#;

pub const SELECT_DUE_EMAIL_EARLY: &str = r#"
SELECT a.id, a.product_id, p.name AS product_name, p.deeplink, a.custom_product_name,
       a.email, a.push_token, a.alert_period, a.is_periodic, a.end_date,
       a.next_alert_date, a.send_early_reminder, a.early_reminder_days, a.early_reminder_date,
       a.last_email_sent, a.last_email_early_sent, a.last_push_sent, a.last_push_early_sent,
       a.is_active, a.unsubscribe_token
FROM alerts a
LEFT JOIN products p ON a.product_id = p.id
WHERE a.is_active
  AND a.email IS NOT NULL
  AND a.send_early_reminder
  AND a.early_reminder_date IS NOT NULL
  AND a.early_reminder_date <= $1
  AND (a.last_email_early_sent IS NULL OR a.last_email_early_sent < a.early_reminder_date)
ORDER BY a.early_reminder_date ASC, a.id ASC
LIMIT $2;
"#;

pub const SELECT_DUE_PUSH_REGULAR: &str = r#"
SELECT a.id, a.product_id, p.name AS product_name, p.deeplink, a.custom_product_name,
       a.email, a.push_token, a.alert_period, a.is_periodic, a.end_date,
       a.next_alert_date, a.send_early_reminder, a.early_reminder_days, a.early_reminder_date,
       a.last_email_sent, a.last_email_early_sent, a.last_push_sent, a.last_push_early_sent,
       a.is_active, a.unsubscribe_token
FROM alerts a
LEFT JOIN products p ON a.product_id = p.id
WHERE a.is_active
  AND a.push_token IS NOT NULL
  AND a.next_alert_date <= $1
  AND (a.last_push_sent IS NULL OR a.last_push_sent < a.next_alert_date)
ORDER BY a.next_alert_date ASC, a.id ASC
LIMIT $2;
"#;

pub const SELECT_DUE_PUSH_EARLY: &str = r#"
SELECT a.id, a.product_id, p.name AS product_name, p.deeplink, a.custom_product_name,
       a.email, a.push_token, a.alert_period, a.is_periodic, a.end_date,
       a.next_alert_date, a.send_early_reminder, a.early_reminder_days, a.early_reminder_date,
       a.last_email_sent, a.last_email_early_sent, a.last_push_sent, a.last_push_early_sent,
       a.is_active, a.unsubscribe_token
FROM alerts a
LEFT JOIN products p ON a.product_id = p.id
WHERE a.is_active
  AND a.push_token IS NOT NULL
  AND a.send_early_reminder
  AND a.early_reminder_date IS NOT NULL
  AND a.early_reminder_date <= $1
  AND (a.last_push_early_sent IS NULL OR a.last_push_early_sent < a.early_reminder_date)
ORDER BY a.early_reminder_date ASC, a.id ASC
LIMIT $2;
"#;

pub const MARK_EMAIL_EARLY_SENT: &str = r#"
UPDATE alerts
SET last_email_early_sent = $2,
    updated_at = NOW()
WHERE id = $1 AND is_active;
"#;

pub const MARK_PUSH_EARLY_SENT: &str = r#"
UPDATE alerts
SET last_push_early_sent = $2,
    updated_at = NOW()
WHERE id = $1 AND is_active;
"#;

pub const MARK_EMAIL_SENT: &str = r#"
UPDATE alerts
SET last_email_sent = $2,
    updated_at = NOW()
WHERE id = $1 AND is_active;
"#;

pub const MARK_PUSH_SENT: &str = r#"
UPDATE alerts
SET last_push_sent = $2,
    updated_at = NOW()
WHERE id = $1 AND is_active;
"#;

pub const RESCHEDULE_AFTER_EMAIL: &str = r#"
UPDATE alerts
SET last_email_sent = $2,
    next_alert_date = $3,
    early_reminder_date = $4,
    send_early_reminder = $5,
    updated_at = NOW()
WHERE id = $1 AND is_active;
"#;

pub const RESCHEDULE_AFTER_PUSH: &str = r#"
UPDATE alerts
SET last_push_sent = $2,
    next_alert_date = $3,
    early_reminder_date = $4,
    send_early_reminder = $5,
    updated_at = NOW()
WHERE id = $1 AND is_active;
"#;

pub const RETIRE_AFTER_EMAIL: &str = r#"
UPDATE alerts
SET last_email_sent = $2,
    is_active = FALSE,
    updated_at = NOW()
WHERE id = $1 AND is_active;
"#;

pub const RETIRE_AFTER_PUSH: &str = r#"
UPDATE alerts
SET last_push_sent = $2,
    is_active = FALSE,
    updated_at = NOW()
WHERE id = $1 AND is_active;
"#;

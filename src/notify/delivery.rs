//! Production transports behind the [`Notifier`] trait: async SMTP for email
//! and the Expo push HTTP API for push. Transport failures are logged and
//! reported as an undelivered outcome, never as an engine error.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::notify::Notifier;

pub struct DeliveryClient {
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
    http: reqwest::Client,
    expo_push_url: String,
}

impl DeliveryClient {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let mailer = match &config.smtp_host {
            Some(host) => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
                    .port(config.smtp_port);
                if !config.smtp_username.is_empty() {
                    builder = builder.credentials(Credentials::new(
                        config.smtp_username.clone(),
                        config.smtp_password.clone(),
                    ));
                }
                Some(builder.build())
            }
            None => {
                warn!("SMTP_HOST not set, email delivery disabled");
                None
            }
        };

        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email).parse()?;

        Ok(Self {
            mailer,
            from,
            http: reqwest::Client::new(),
            expo_push_url: config.expo_push_url.clone(),
        })
    }
}

#[async_trait]
impl Notifier for DeliveryClient {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> bool {
        let Some(mailer) = &self.mailer else {
            warn!(to, "email delivery disabled, message not sent");
            return false;
        };

        let to_mailbox: Mailbox = match to.parse() {
            Ok(m) => m,
            Err(e) => {
                error!(to, error = %e, "invalid recipient address");
                return false;
            }
        };

        let message = match Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
        {
            Ok(m) => m,
            Err(e) => {
                error!(to, error = %e, "failed to build email");
                return false;
            }
        };

        match mailer.send(message).await {
            Ok(_) => true,
            Err(e) => {
                error!(to, error = %e, "SMTP send failed");
                false
            }
        }
    }

    async fn send_push(&self, token: &str, title: &str, body: &str, payload: &Value) -> bool {
        // Tokens registered by development builds never reach Expo.
        if token.starts_with("development-token") {
            info!("skipping development push token");
            return false;
        }

        let messages = json!([{
            "to": token,
            "sound": "default",
            "title": title,
            "body": body,
            "data": payload,
        }]);

        match self.http.post(&self.expo_push_url).json(&messages).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                error!(status = %response.status(), "Expo push rejected");
                false
            }
            Err(e) => {
                error!(error = %e, "Expo push request failed");
                false
            }
        }
    }
}

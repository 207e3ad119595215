use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    pub run_interval_secs: u64,
    pub batch_size: i64,
    pub max_batches: u32,
    pub max_consecutive_failures: u32,
    pub failure_cooldown_secs: u64,
    pub base_url: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
    pub expo_push_url: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let db_host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
        let db_port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
        let db_name = env::var("DB_DATABASE").unwrap_or_else(|_| "contractwekker".to_string());
        let db_user = env::var("DB_USER").unwrap_or_else(|_| "contractwekker".to_string());
        let db_pwd = env::var("DB_PWD").unwrap_or_else(|_| "contractwekker".to_string());

        let database_url = format!(
            "postgres://{}:{}@{}:{}/{}",
            db_user, db_pwd, db_host, db_port, db_name
        );

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let run_interval_secs = env::var("RUN_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);
        let batch_size = env::var("BATCH_SIZE")
            .unwrap_or_else(|_| "50".to_string())
            .parse()
            .unwrap_or(50);
        let max_batches = env::var("MAX_BATCHES")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .unwrap_or(20);
        let max_consecutive_failures = env::var("MAX_CONSECUTIVE_FAILURES")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);
        let failure_cooldown_secs = env::var("FAILURE_COOLDOWN_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .unwrap_or(300);

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| "https://www.contractwekker.nl".to_string());

        let smtp_host = env::var("SMTP_HOST").ok();
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .unwrap_or(587);
        let smtp_username = env::var("SMTP_USERNAME").unwrap_or_default();
        let smtp_password = env::var("SMTP_PASSWORD").unwrap_or_default();
        let from_email =
            env::var("FROM_EMAIL").unwrap_or_else(|_| "noreply@contractwekker.nl".to_string());
        let from_name = env::var("FROM_NAME").unwrap_or_else(|_| "Contractwekker".to_string());

        let expo_push_url = env::var("EXPO_PUSH_URL")
            .unwrap_or_else(|_| "https://exp.host/--/api/v2/push/send".to_string());

        Ok(Self {
            database_url,
            log_level,
            run_interval_secs,
            batch_size,
            max_batches,
            max_consecutive_failures,
            failure_cooldown_secs,
            base_url,
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            from_email,
            from_name,
            expo_push_url,
        })
    }
}

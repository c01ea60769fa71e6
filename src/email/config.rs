use std::time::Duration;

use crate::db::DbPool;
use crate::models::settings::Setting;

/// SMTP connection parameters, read from the settings store on each load.
/// The sender address is deliberately not part of this: it is re-resolved
/// from settings on every send, so changing it needs no reload.
#[derive(Debug, Clone, PartialEq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub encryption: SmtpEncryption,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpEncryption {
    /// Plain connection upgraded via STARTTLS (typically port 587).
    Starttls,
    /// Implicit TLS from the first byte (typically port 465).
    Tls,
    /// No encryption. Local relays only.
    None,
}

impl SmtpConfig {
    pub fn load(pool: &DbPool) -> Result<SmtpConfig, String> {
        let host = Setting::require(pool, "email_smtp_host")?;
        let username = Setting::require(pool, "email_smtp_username")?;
        let password = Setting::require(pool, "email_smtp_password")?;

        let port: u16 = Setting::get(pool, "email_smtp_port")
            .and_then(|v| v.parse().ok())
            .unwrap_or(587);

        let encryption = match Setting::get_or(pool, "email_smtp_encryption", "starttls").as_str() {
            "tls" | "ssl" => SmtpEncryption::Tls,
            "none" => SmtpEncryption::None,
            _ => SmtpEncryption::Starttls,
        };

        let timeout_secs: u64 = Setting::get(pool, "email_smtp_timeout_secs")
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        // Password never appears in logs, at any level
        log::debug!(
            "[email] SMTP config: host=[{}] port=[{}] username=[{}] encryption=[{:?}] timeout=[{}s]",
            host,
            port,
            username,
            encryption,
            timeout_secs
        );

        Ok(SmtpConfig {
            host,
            port,
            username,
            password,
            encryption,
            timeout_secs,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

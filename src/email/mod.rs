pub mod config;
pub mod message;
pub mod smtp;
pub mod template;

use std::sync::{Arc, Mutex};

use serde_json::Value;
use thiserror::Error;

use crate::db::DbPool;
use crate::models::settings::Setting;

use self::config::SmtpConfig;
use self::message::{EmailAttachment, EmailBody, OutgoingEmail};

pub use self::smtp::SmtpMailer;
pub use self::template::MailTemplates;

/// The one error type mail operations raise, tagged by failure category
/// so callers can branch without string inspection. Display text never
/// includes subject, content or variables; those go to the debug log.
#[derive(Debug, Error)]
pub enum MailError {
    /// A required setting is missing or the transport rejected the configuration.
    #[error("mail configuration error: {0}")]
    Config(String),
    /// The message could not be built or handed off to the SMTP server.
    #[error("failed to send email to {to}: {reason}")]
    Send { to: String, reason: String },
    /// A templated send failed; carries the template name for upstream reporting.
    #[error("failed to send template email to {to} (template {template}): {reason}")]
    Template {
        to: String,
        template: String,
        reason: String,
    },
}

impl MailError {
    pub fn is_config(&self) -> bool {
        matches!(self, MailError::Config(_))
    }

    pub fn template_name(&self) -> Option<&str> {
        match self {
            MailError::Template { template, .. } => Some(template),
            _ => None,
        }
    }
}

/// Applies connection settings and delivers messages. Implemented by
/// [`SmtpMailer`] in production and by counting mocks in tests.
pub trait MailTransport: Send + Sync {
    fn apply_config(&self, config: &SmtpConfig) -> Result<(), String>;
    fn send(&self, email: &OutgoingEmail) -> Result<(), String>;
}

/// Renders a named template against JSON data into an HTML string.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, data: &Value) -> Result<String, String>;
}

#[derive(Debug, PartialEq)]
enum ConfigState {
    Unloaded,
    Loaded,
}

/// Mail dispatch service. Reads its SMTP configuration lazily from the
/// settings store, applies it to the injected transport exactly once,
/// and exposes the three send operations plus an explicit reload.
pub struct Mailer {
    pool: DbPool,
    transport: Arc<dyn MailTransport>,
    templates: Arc<dyn TemplateRenderer>,
    state: Mutex<ConfigState>,
}

impl Mailer {
    /// Build the service and attempt an initial configuration load.
    /// An incomplete configuration at startup is logged and tolerated;
    /// sends fail with a configuration error until settings are completed.
    pub fn new(
        pool: DbPool,
        transport: Arc<dyn MailTransport>,
        templates: Arc<dyn TemplateRenderer>,
    ) -> Mailer {
        let mailer = Mailer {
            pool,
            transport,
            templates,
            state: Mutex::new(ConfigState::Unloaded),
        };
        mailer.reload_config();
        mailer
    }

    /// Reset the configuration state and re-apply settings eagerly.
    /// Best-effort: failures are logged, never returned.
    pub fn reload_config(&self) {
        let mut state = self.state.lock().unwrap();
        *state = ConfigState::Unloaded;
        match self.load_and_apply() {
            Ok(()) => *state = ConfigState::Loaded,
            Err(e) => log::warn!(
                "[email] Mail is not configured: {} (emails will not be sent until settings are completed)",
                e
            ),
        }
    }

    /// Send a plain-text email.
    pub fn send_mail(&self, to: &str, subject: &str, content: &str) -> Result<(), MailError> {
        self.ensure_loaded()?;
        let (from, reply_to) = self.sender()?;

        let email = OutgoingEmail {
            from,
            reply_to,
            to: to.to_string(),
            subject: subject.to_string(),
            body: EmailBody::Text(content.to_string()),
            attachment: None,
        };

        if let Err(reason) = self.transport.send(&email) {
            log::debug!(
                "[email] Send failed: to=[{}] from=[{}] subject=[{}] content=[{}]",
                to,
                email.from,
                subject,
                content
            );
            return Err(MailError::Send {
                to: to.to_string(),
                reason,
            });
        }

        log::info!("[email] Sent email to {}", to);
        Ok(())
    }

    /// Render `template` against `data` and send the result as an HTML email.
    pub fn send_template_mail(
        &self,
        to: &str,
        subject: &str,
        template: &str,
        data: &Value,
    ) -> Result<(), MailError> {
        self.ensure_loaded()?;
        let (from, reply_to) = self.sender()?;

        let html = self.templates.render(template, data).map_err(|reason| {
            log::debug!(
                "[email] Template render failed: to=[{}] subject=[{}] template=[{}] variables=[{}]",
                to,
                subject,
                template,
                data
            );
            MailError::Template {
                to: to.to_string(),
                template: template.to_string(),
                reason,
            }
        })?;

        let email = OutgoingEmail {
            from,
            reply_to,
            to: to.to_string(),
            subject: subject.to_string(),
            body: EmailBody::Html(html),
            attachment: None,
        };

        if let Err(reason) = self.transport.send(&email) {
            log::debug!(
                "[email] Send failed: to=[{}] from=[{}] subject=[{}] template=[{}] variables=[{}]",
                to,
                email.from,
                subject,
                template,
                data
            );
            return Err(MailError::Template {
                to: to.to_string(),
                template: template.to_string(),
                reason,
            });
        }

        log::info!("[email] Sent template email to {} ({})", to, template);
        Ok(())
    }

    /// Render `template` against `data` and send it with one file attached.
    pub fn send_attach_mail(
        &self,
        to: &str,
        subject: &str,
        template: &str,
        data: &Value,
        attachment_path: &str,
    ) -> Result<(), MailError> {
        self.ensure_loaded()?;
        let (from, reply_to) = self.sender()?;

        let html = self.templates.render(template, data).map_err(|reason| {
            log::debug!(
                "[email] Template render failed: to=[{}] subject=[{}] template=[{}] attachment=[{}] variables=[{}]",
                to,
                subject,
                template,
                attachment_path,
                data
            );
            MailError::Send {
                to: to.to_string(),
                reason,
            }
        })?;

        let attachment = EmailAttachment::from_path(attachment_path).map_err(|reason| {
            log::debug!(
                "[email] Attachment failed: to=[{}] subject=[{}] template=[{}] attachment=[{}]",
                to,
                subject,
                template,
                attachment_path
            );
            MailError::Send {
                to: to.to_string(),
                reason,
            }
        })?;

        let email = OutgoingEmail {
            from,
            reply_to,
            to: to.to_string(),
            subject: subject.to_string(),
            body: EmailBody::Html(html),
            attachment: Some(attachment),
        };

        if let Err(reason) = self.transport.send(&email) {
            log::debug!(
                "[email] Send failed: to=[{}] from=[{}] subject=[{}] template=[{}] attachment=[{}] variables=[{}]",
                to,
                email.from,
                subject,
                template,
                attachment_path,
                data
            );
            return Err(MailError::Send {
                to: to.to_string(),
                reason,
            });
        }

        log::info!("[email] Sent email with attachment to {} ({})", to, template);
        Ok(())
    }

    /// Load and apply the SMTP configuration if not already done.
    /// The lock is held across the whole load, so concurrent first
    /// callers serialize: one applies, the rest observe Loaded.
    fn ensure_loaded(&self) -> Result<(), MailError> {
        let mut state = self.state.lock().unwrap();
        if *state == ConfigState::Loaded {
            return Ok(());
        }

        self.load_and_apply().map_err(MailError::Config)?;

        // Only a successful apply marks the state Loaded
        *state = ConfigState::Loaded;
        Ok(())
    }

    fn load_and_apply(&self) -> Result<(), String> {
        let config = SmtpConfig::load(&self.pool)?;
        self.transport.apply_config(&config)?;
        log::info!(
            "[email] SMTP transport configured for {}:{}",
            config.host,
            config.port
        );
        Ok(())
    }

    /// Resolve the sender mailbox and optional reply-to from settings.
    /// Read fresh on every send so a changed from-address needs no reload.
    fn sender(&self) -> Result<(String, Option<String>), MailError> {
        let address =
            Setting::require(&self.pool, "email_from_address").map_err(MailError::Config)?;
        let name = Setting::get(&self.pool, "email_from_name").unwrap_or_default();

        let from = if name.is_empty() {
            address
        } else {
            format!("{} <{}>", name, address)
        };

        let reply_to = Setting::get(&self.pool, "email_reply_to").filter(|s| !s.is_empty());

        Ok((from, reply_to))
    }
}

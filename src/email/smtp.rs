use std::sync::Mutex;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use super::config::{SmtpConfig, SmtpEncryption};
use super::message::{EmailBody, OutgoingEmail};
use super::MailTransport;

/// Production transport over lettre's blocking SMTP client.
/// `apply_config` swaps the relay behind the mutex; sends clone it out
/// so the SMTP exchange itself happens outside the lock.
pub struct SmtpMailer {
    transport: Mutex<Option<SmtpTransport>>,
}

impl SmtpMailer {
    pub fn new() -> SmtpMailer {
        SmtpMailer {
            transport: Mutex::new(None),
        }
    }
}

impl MailTransport for SmtpMailer {
    fn apply_config(&self, config: &SmtpConfig) -> Result<(), String> {
        let builder = match config.encryption {
            SmtpEncryption::Starttls => SmtpTransport::starttls_relay(&config.host)
                .map_err(|e| format!("SMTP relay error: {}", e))?,
            SmtpEncryption::Tls => SmtpTransport::relay(&config.host)
                .map_err(|e| format!("SMTP relay error: {}", e))?,
            SmtpEncryption::None => SmtpTransport::builder_dangerous(&config.host),
        };

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.timeout()))
            .build();

        *self.transport.lock().unwrap() = Some(transport);
        Ok(())
    }

    fn send(&self, email: &OutgoingEmail) -> Result<(), String> {
        let mailer = self
            .transport
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| "SMTP transport not configured".to_string())?;

        let message = build_message(email)?;

        mailer
            .send(&message)
            .map_err(|e| format!("SMTP send error: {}", e))?;
        Ok(())
    }
}

fn build_message(email: &OutgoingEmail) -> Result<Message, String> {
    let mut builder = Message::builder()
        .from(
            email
                .from
                .parse()
                .map_err(|e| format!("Invalid from address: {}", e))?,
        )
        .to(email
            .to
            .parse()
            .map_err(|e| format!("Invalid to address: {}", e))?)
        .subject(email.subject.clone());

    if let Some(reply_to) = &email.reply_to {
        builder = builder.reply_to(
            reply_to
                .parse()
                .map_err(|e| format!("Invalid reply-to address: {}", e))?,
        );
    }

    let message = match (&email.body, &email.attachment) {
        (EmailBody::Text(text), None) => builder
            .header(ContentType::TEXT_PLAIN)
            .body(text.clone()),
        (EmailBody::Html(html), None) => builder.singlepart(SinglePart::html(html.clone())),
        (body, Some(attachment)) => {
            let content_type = ContentType::parse(&attachment.content_type)
                .map_err(|e| format!("Invalid attachment content type: {}", e))?;
            let file_part =
                Attachment::new(attachment.filename.clone()).body(attachment.content.clone(), content_type);
            let body_part = match body {
                EmailBody::Text(text) => SinglePart::plain(text.clone()),
                EmailBody::Html(html) => SinglePart::html(html.clone()),
            };
            builder.multipart(MultiPart::mixed().singlepart(body_part).singlepart(file_part))
        }
    }
    .map_err(|e| format!("Failed to build email: {}", e))?;

    Ok(message)
}

//! Settings-driven SMTP mail dispatch for content sites.
//!
//! The host application owns an SQLite settings table; `mailroom` reads
//! its SMTP configuration from it lazily on the first send and applies
//! it to the transport exactly once. Plain-text, templated-HTML and
//! attachment sends all go through one [`Mailer`], whose transport and
//! template renderer are injected so both can be substituted in tests.

pub mod db;
pub mod email;
pub mod models;


pub use db::DbPool;
pub use email::config::{SmtpConfig, SmtpEncryption};
pub use email::message::{EmailAttachment, EmailBody, OutgoingEmail};
pub use email::{MailError, MailTemplates, MailTransport, Mailer, SmtpMailer, TemplateRenderer};

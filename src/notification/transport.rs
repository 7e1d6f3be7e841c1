use anyhow::Context;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};

use super::NotificationError;
use crate::config::{MailSettings, TransportSecurity};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers a rendered mail. Implementations block until the relay has
/// accepted or refused the message.
#[cfg_attr(test, mockall::automock)]
pub trait Mailer: Send + Sync {
    fn send(&self, mail: &OutgoingMail) -> Result<(), NotificationError>;
}

pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(host: &str, settings: &MailSettings) -> anyhow::Result<Self> {
        let builder = match settings.security {
            TransportSecurity::StartTls => SmtpTransport::starttls_relay(host)
                .with_context(|| format!("SMTP relay {}", host))?,
            TransportSecurity::Tls => {
                SmtpTransport::relay(host).with_context(|| format!("SMTP relay {}", host))?
            }
            TransportSecurity::None => SmtpTransport::builder_dangerous(host),
        };
        let builder = builder.port(settings.smtp_port);
        let builder = match (&settings.username, &settings.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };
        let from = settings
            .from
            .parse::<Mailbox>()
            .with_context(|| format!("invalid MAIL_FROM '{}'", settings.from))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), NotificationError> {
        let to = mail
            .to
            .parse::<Mailbox>()
            .map_err(|e| NotificationError::Address(format!("{}: {}", mail.to, e)))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())
            .map_err(|e| NotificationError::Build(e.to_string()))?;

        self.transport
            .send(&message)
            .map(|_| ())
            .map_err(|e| NotificationError::Transport(e.to_string()))
    }
}

/// Used when no relay is configured: mail goes to the log only.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), NotificationError> {
        log::info!(
            "mail to {} (no SMTP relay configured): {}\n{}",
            mail.to,
            mail.subject,
            mail.body
        );
        Ok(())
    }
}

pub fn build_mailer(settings: &MailSettings) -> anyhow::Result<Box<dyn Mailer>> {
    match &settings.smtp_host {
        Some(host) => {
            log::info!("sending mail through {}:{}", host, settings.smtp_port);
            Ok(Box::new(SmtpMailer::new(host, settings)?))
        }
        None => {
            log::warn!("SMTP_HOST not set, mail will only be logged");
            Ok(Box::new(LogMailer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_settings(host: Option<&str>) -> MailSettings {
        MailSettings {
            smtp_host: host.map(str::to_string),
            smtp_port: 2525,
            security: TransportSecurity::None,
            username: None,
            password: None,
            from: "Aura Estética <no-reply@aura.test>".to_string(),
            clinic_name: "Aura Estética".to_string(),
            clinic_email: "clinic@aura.test".to_string(),
            max_attempts: 1,
        }
    }

    #[test]
    fn log_mailer_accepts_everything() {
        let mail = OutgoingMail {
            to: "ana@example.com".to_string(),
            subject: "hello".to_string(),
            body: "body".to_string(),
        };
        assert!(LogMailer.send(&mail).is_ok());
    }

    #[test]
    fn smtp_mailer_rejects_bad_sender() {
        let mut settings = mail_settings(Some("localhost"));
        settings.from = "not an address".to_string();
        assert!(SmtpMailer::new("localhost", &settings).is_err());
    }

    #[test]
    fn smtp_mailer_rejects_bad_recipient_without_connecting() {
        let settings = mail_settings(Some("localhost"));
        let mailer = SmtpMailer::new("localhost", &settings).unwrap();
        let mail = OutgoingMail {
            to: "nobody".to_string(),
            subject: "hello".to_string(),
            body: "body".to_string(),
        };
        assert!(matches!(
            mailer.send(&mail),
            Err(NotificationError::Address(_))
        ));
    }

    #[test]
    fn unconfigured_relay_builds_log_mailer() {
        assert!(build_mailer(&mail_settings(None)).is_ok());
    }
}

use crate::{
    config::MailConfig,
    utils::error::{AppError, AppResult},
};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()>;
}

/// SMTP over implicit TLS (port 465 by default).
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn from_config(config: &MailConfig) -> AppResult<Self> {
        let host = config
            .host
            .as_deref()
            .ok_or_else(|| AppError::Mail("EMAIL_HOST is not set".to_string()))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| AppError::Mail(format!("Invalid SMTP relay {}: {}", host, e)))?
            .port(config.port);

        if let (Some(user), Some(password)) = (&config.user, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

fn mailbox(address: &str) -> AppResult<Mailbox> {
    address
        .parse()
        .map_err(|e| AppError::Mail(format!("Invalid address {}: {}", address, e)))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()> {
        let message = Message::builder()
            .from(mailbox(&email.from)?)
            .to(mailbox(&email.to)?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .map_err(|e| AppError::Mail(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Mail(format!("SMTP send failed: {}", e)))?;

        log::info!("📧 Email sent to {}: {}", email.to, email.subject);
        Ok(())
    }
}

/// Stand-in used when SMTP settings are missing; every send fails.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()> {
        Err(AppError::Mail(format!(
            "SMTP is not configured, dropped email to {}",
            email.to
        )))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smtp_requires_host() {
        let result = SmtpMailer::from_config(&MailConfig::default());
        assert!(matches!(result, Err(AppError::Mail(_))));
    }

    #[test]
    fn test_mailbox_accepts_display_name() {
        let parsed = mailbox("\"The Desk\" <desk@firm.com>").unwrap();
        assert_eq!(parsed.email.to_string(), "desk@firm.com");
        assert!(mailbox("not an address").is_err());
    }

    #[actix_web::test]
    async fn test_disabled_mailer_fails() {
        let email = OutgoingEmail {
            from: "a@b.com".into(),
            to: "c@d.com".into(),
            subject: "hi".into(),
            html: "<p>hi</p>".into(),
        };
        assert!(DisabledMailer.send(email).await.is_err());
    }
}

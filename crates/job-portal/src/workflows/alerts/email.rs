//! SMTP delivery through the `lettre` async transport.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::notifier::{DeliveryError, Notifier, Recipient};
use crate::config::EmailConfig;

/// Error type for building the SMTP notifier.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),
}

/// Sends HTML mail over a STARTTLS relay.
pub struct SmtpNotifier {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let from = Mailbox::new(
            Some("FreeJobAlert".to_string()),
            config.from_address.parse::<Address>()?,
        );

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);
        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            from,
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(
        &self,
        recipient: &Recipient,
        subject: &str,
        body: &str,
    ) -> Result<bool, DeliveryError> {
        let address = recipient
            .email
            .parse::<Address>()
            .map_err(|err| DeliveryError::Permanent(err.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(Some(recipient.full_name.clone()), address))
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())
            .map_err(|err| DeliveryError::Permanent(err.to_string()))?;

        match self.transport.send(message).await {
            Ok(response) => {
                tracing::debug!(to = %recipient.email, code = %response.code(), "email accepted by relay");
                Ok(true)
            }
            Err(err) if err.is_permanent() => Err(DeliveryError::Permanent(err.to_string())),
            Err(err) => Err(DeliveryError::Transient(err.to_string())),
        }
    }
}

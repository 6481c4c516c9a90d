use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("No outbound phone number is configured for {0}")]
    MissingSender(Channel),

    #[error("Invalid recipient: '{0}'")]
    InvalidRecipient(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Call,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Call => "call",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
}

/// Receipt for an accepted message or call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub channel: Channel,
    pub recipient: String,
    pub reference: String,
}

/// Outbound mail, SMS and voice capability used by request handlers
pub trait NotificationGateway {
    fn send_email(&mut self, message: &EmailMessage) -> Result<Delivery, GatewayError>;

    fn send_sms(&mut self, to: &str, body: &str) -> Result<Delivery, GatewayError>;

    fn place_call(&mut self, to: &str) -> Result<Delivery, GatewayError>;
}

/// Gateway that records deliveries and logs them instead of contacting a vendor
#[derive(Debug, Clone, Default)]
pub struct LoggingGateway {
    from_number: Option<String>,
    deliveries: Vec<Delivery>,
}

impl LoggingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number SMS and calls are sent from
    pub fn with_from_number(mut self, number: &str) -> Self {
        self.from_number = Some(number.to_string());
        self
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    fn record(&mut self, channel: Channel, recipient: &str) -> Delivery {
        let delivery = Delivery {
            channel,
            recipient: recipient.to_string(),
            reference: format!("{channel}-{}", self.deliveries.len() + 1),
        };
        tracing::info!(%channel, recipient, reference = %delivery.reference, "delivery accepted");
        self.deliveries.push(delivery.clone());
        delivery
    }

    fn sender(&self, channel: Channel) -> Result<&str, GatewayError> {
        self.from_number
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or(GatewayError::MissingSender(channel))
    }
}

impl NotificationGateway for LoggingGateway {
    fn send_email(&mut self, message: &EmailMessage) -> Result<Delivery, GatewayError> {
        if !message.to.contains('@') {
            return Err(GatewayError::InvalidRecipient(message.to.clone()));
        }
        tracing::debug!(
            subject = %message.subject,
            cc = message.cc.len(),
            bcc = message.bcc.len(),
            "sending email"
        );
        Ok(self.record(Channel::Email, &message.to))
    }

    fn send_sms(&mut self, to: &str, body: &str) -> Result<Delivery, GatewayError> {
        let from = self.sender(Channel::Sms)?.to_string();
        if to.trim().is_empty() {
            return Err(GatewayError::InvalidRecipient(to.to_string()));
        }
        tracing::debug!(from = %from, chars = body.chars().count(), "sending sms");
        Ok(self.record(Channel::Sms, to))
    }

    fn place_call(&mut self, to: &str) -> Result<Delivery, GatewayError> {
        let from = self.sender(Channel::Call)?.to_string();
        if to.trim().is_empty() {
            return Err(GatewayError::InvalidRecipient(to.to_string()));
        }
        tracing::debug!(from = %from, "placing call");
        Ok(self.record(Channel::Call, to))
    }
}

use std::sync::Arc;

use arama_shared::EnquiryNotification;
use arama_store::app_config::NotifyConfig;
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid mail address: {0}")]
    Address(String),
    #[error("could not build message: {0}")]
    Message(String),
    #[error("smtp transport error: {0}")]
    Transport(String),
}

/// Delivers new-enquiry alerts to the property admin.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &EnquiryNotification) -> Result<(), NotifyError>;
}

/// Used when SMTP is not configured.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, notification: &EnquiryNotification) -> Result<(), NotifyError> {
        debug!(
            "SMTP not configured, skipping notification for enquiry {}",
            notification.enquiry_id
        );
        Ok(())
    }
}

pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    /// STARTTLS relay authenticated with the configured account. Mail goes
    /// to `admin_email`, or back to the account when that is empty.
    pub fn new(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let from: Mailbox = config
            .username
            .parse()
            .map_err(|e| NotifyError::Address(format!("{}: {}", config.username, e)))?;
        let to = if config.admin_email.trim().is_empty() {
            from.clone()
        } else {
            config
                .admin_email
                .parse()
                .map_err(|e| NotifyError::Address(format!("{}: {}", config.admin_email, e)))?
        };

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { mailer, from, to })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, notification: &EnquiryNotification) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(render_subject(notification))
            .header(ContentType::TEXT_PLAIN)
            .body(render_body(notification))
            .map_err(|e| NotifyError::Message(e.to_string()))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(())
    }
}

/// SMTP when configured, otherwise the no-op notifier.
pub fn from_config(config: &NotifyConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    if config.is_configured() {
        info!("Enquiry notifications via {}", config.smtp_host);
        Ok(Arc::new(SmtpNotifier::new(config)?))
    } else {
        info!("SMTP not configured, enquiry notifications disabled");
        Ok(Arc::new(DisabledNotifier))
    }
}

pub fn render_subject(notification: &EnquiryNotification) -> String {
    format!("New Booking Enquiry from {}", notification.name)
}

pub fn render_body(n: &EnquiryNotification) -> String {
    let tier = n
        .tier_name
        .as_deref()
        .map(|name| format!("- Bedrooms: {}\n", name))
        .unwrap_or_default();
    format!(
        "New Booking Enquiry for Villa Arama Riverside\n\
         \n\
         Guest Information:\n\
         - Name: {name}\n\
         - Email: {email}\n\
         - Phone: {phone}\n\
         \n\
         Booking Details:\n\
         - Check-in: {check_in}\n\
         - Check-out: {check_out}\n\
         - Guests: {guests}\n\
         {tier}\
         - Estimated Total: ${total:.2}\n\
         \n\
         Message:\n\
         {message}\n\
         \n\
         ---\n\
         This is an automated message from Villa Arama Riverside booking system.\n",
        name = n.name,
        email = n.email.expose(),
        phone = n.phone.expose(),
        check_in = n.check_in,
        check_out = n.check_out,
        guests = n.guests,
        tier = tier,
        total = n.total_price,
        message = n.message,
    )
}

/// Bounded hand-off to the notification worker. Submitting never waits:
/// when the queue is full the alert is dropped and logged.
#[derive(Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<EnquiryNotification>,
}

impl NotificationQueue {
    pub fn start(notifier: Arc<dyn Notifier>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<EnquiryNotification>(capacity.max(1));
        let worker = tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                match notifier.notify(&notification).await {
                    Ok(()) => debug!("Notification sent for enquiry {}", notification.enquiry_id),
                    Err(e) => error!(
                        "Failed to send notification for enquiry {} ({}): {}",
                        notification.enquiry_id, notification.email, e
                    ),
                }
            }
        });
        (Self { tx }, worker)
    }

    pub fn submit(&self, notification: EnquiryNotification) {
        if let Err(e) = self.tx.try_send(notification) {
            let (reason, dropped) = match e {
                mpsc::error::TrySendError::Full(n) => ("queue full", n),
                mpsc::error::TrySendError::Closed(n) => ("worker stopped", n),
            };
            warn!(
                "Dropping notification for enquiry {}: {}",
                dropped.enquiry_id, reason
            );
        }
    }
}

//! Notification adapter that logs instead of sending

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;

use core_kernel::{DeliveryId, DomainPort, HealthCheckResult, HealthCheckable, PortError};

use crate::ports::{DeliveryReceipt, Notification, NotificationChannel, NotificationPort};

/// Records customer messages and writes them to the log
#[derive(Debug, Default)]
pub struct LoggingNotifier {
    sent: RwLock<Vec<Notification>>,
    injected_failures: AtomicU32,
}

impl LoggingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered so far, oldest first
    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.read().await.clone()
    }

    /// Fails the next `n` sends as if the gateway were down
    pub fn fail_next(&self, n: u32) {
        self.injected_failures.store(n, Ordering::SeqCst);
    }
}

fn validate_recipient(channel: NotificationChannel, recipient: &str) -> Result<(), PortError> {
    let ok = match channel {
        NotificationChannel::Email => recipient.contains('@'),
        NotificationChannel::Sms => recipient.chars().filter(|c| c.is_ascii_digit()).count() >= 7,
    };
    if !ok {
        return Err(PortError::validation_field(
            format!("{recipient:?} is not a valid {channel} recipient"),
            "recipient",
        ));
    }
    Ok(())
}

impl DomainPort for LoggingNotifier {}

#[async_trait]
impl HealthCheckable for LoggingNotifier {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("logging-notifier")
    }
}

#[async_trait]
impl NotificationPort for LoggingNotifier {
    async fn send(&self, notification: Notification) -> Result<DeliveryReceipt, PortError> {
        if self
            .injected_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(PortError::ServiceUnavailable {
                service: format!("{} gateway", notification.channel),
            });
        }
        validate_recipient(notification.channel, &notification.recipient)?;

        let receipt = DeliveryReceipt {
            delivery_id: DeliveryId::new_v7(),
            channel: notification.channel,
            recipient: notification.recipient.clone(),
            sent_at: Utc::now(),
        };
        tracing::info!(
            claim_id = %notification.claim_id,
            channel = %notification.channel,
            kind = ?notification.kind,
            recipient = %notification.recipient,
            link = %notification.link,
            delivery_id = %receipt.delivery_id,
            "Customer notification sent"
        );
        self.sent.write().await.push(notification);
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::NotificationKind;
    use core_kernel::ClaimId;

    fn notification(channel: NotificationChannel, recipient: &str) -> Notification {
        Notification {
            claim_id: ClaimId::new(),
            channel,
            recipient: recipient.into(),
            link: "https://claims.insurancecompany.com/upload/CLM-2024-002".into(),
            kind: NotificationKind::UploadLink,
        }
    }

    #[tokio::test]
    async fn test_send_records_notification() {
        let notifier = LoggingNotifier::new();
        let receipt = notifier
            .send(notification(NotificationChannel::Sms, "(555) 987-6543"))
            .await
            .unwrap();
        assert_eq!(receipt.channel, NotificationChannel::Sms);
        assert_eq!(notifier.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let notifier = LoggingNotifier::new();
        let result = notifier
            .send(notification(NotificationChannel::Email, "not-an-email"))
            .await;
        assert!(matches!(result, Err(PortError::Validation { .. })));
        assert!(notifier.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_gateway_outage_is_transient() {
        let notifier = LoggingNotifier::new();
        notifier.fail_next(1);
        let err = notifier
            .send(notification(NotificationChannel::Email, "a@example.com"))
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}

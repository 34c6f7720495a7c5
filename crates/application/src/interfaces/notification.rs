use anyhow::Result;
use async_trait::async_trait;

/// Best-effort outbound messaging. Callers surface failures and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_sms(&self, phone_e164: &str, message: &str) -> Result<()>;
}

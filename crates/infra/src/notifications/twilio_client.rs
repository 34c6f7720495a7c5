use std::time::Duration;

use anyhow::{Context, Result};
use application::interfaces::notification::NotificationSender;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info};

const TWILIO_API: &str = "https://api.twilio.com/2010-04-01";

/// Sends SMS through the Twilio Messages API.
pub struct TwilioClient {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_phone_number: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
}

impl TwilioClient {
    pub fn new(
        account_sid: String,
        auth_token: String,
        from_phone_number: String,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build twilio http client")?;

        Ok(Self {
            http,
            account_sid,
            auth_token,
            from_phone_number,
        })
    }

    fn messages_url(&self) -> String {
        format!("{TWILIO_API}/Accounts/{}/Messages.json", self.account_sid)
    }

    async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let details = serde_json::from_str::<TwilioErrorBody>(&body).ok();

        error!(
            status = %status,
            twilio_error_code = ?details.as_ref().and_then(|d| d.code),
            twilio_error_message = ?details.as_ref().and_then(|d| d.message.as_deref()),
            "twilio api request failed"
        );

        anyhow::bail!("Twilio API request failed (status {status})");
    }
}

#[async_trait]
impl NotificationSender for TwilioClient {
    async fn send_sms(&self, phone_e164: &str, message: &str) -> Result<()> {
        let form = [
            ("To", phone_e164),
            ("From", self.from_phone_number.as_str()),
            ("Body", message),
        ];

        let resp = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await?;
        let resp = Self::ensure_success(resp).await?;

        let sent: TwilioMessage = resp.json().await?;
        info!(message_sid = %sent.sid, "twilio: sms queued");
        Ok(())
    }
}

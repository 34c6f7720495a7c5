use std::time::Duration;

use anyhow::{Context, Result};
use application::interfaces::payment_gateway::{
    CreateSessionRequest, GatewayEvent, GatewayEventKind, GatewayPaymentState, GatewaySession,
    GatewaySessionStatus, PaymentGateway,
};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{error, info};

type HmacSha256 = Hmac<Sha256>;

const STRIPE_API: &str = "https://api.stripe.com/v1";
/// Maximum age of a signed webhook before it is treated as a replay.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Stripe Checkout client built on reqwest.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
    success_url: String,
    cancel_url: String,
}

#[derive(Debug, Deserialize)]
struct StripeEvent {
    #[serde(rename = "type")]
    type_: String,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct StripeCheckoutSession {
    id: String,
    url: Option<String>,
    status: Option<String>,
    payment_status: Option<String>,
    payment_intent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
    param: Option<String>,
}

impl StripeCheckoutSession {
    fn state(&self) -> GatewayPaymentState {
        match (self.payment_status.as_deref(), self.status.as_deref()) {
            (Some("paid" | "no_payment_required"), _) => GatewayPaymentState::Paid,
            (_, Some("expired")) => GatewayPaymentState::Expired,
            _ => GatewayPaymentState::Unpaid,
        }
    }

    fn into_status(self, raw: serde_json::Value) -> GatewaySessionStatus {
        GatewaySessionStatus {
            state: self.state(),
            completed: self.status.as_deref() == Some("complete"),
            session_id: self.id,
            transaction_id: self.payment_intent,
            raw,
        }
    }
}

fn event_kind(type_: &str) -> GatewayEventKind {
    match type_ {
        "checkout.session.completed" => GatewayEventKind::CheckoutCompleted,
        "checkout.session.async_payment_succeeded" => GatewayEventKind::AsyncPaymentSucceeded,
        "checkout.session.async_payment_failed" => GatewayEventKind::AsyncPaymentFailed,
        "checkout.session.expired" => GatewayEventKind::CheckoutExpired,
        other => GatewayEventKind::Other(other.to_string()),
    }
}

impl StripeClient {
    pub fn new(
        secret_key: String,
        webhook_secret: String,
        success_url: String,
        cancel_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build stripe http client")?;

        Ok(Self {
            http,
            secret_key,
            webhook_secret,
            success_url,
            cancel_url,
        })
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let details = serde_json::from_str::<StripeErrorEnvelope>(&body)
            .ok()
            .map(|envelope| envelope.error);

        error!(
            status = %status,
            stripe_request_id = ?request_id,
            stripe_error_type = ?details.as_ref().and_then(|d| d.type_.as_deref()),
            stripe_error_code = ?details.as_ref().and_then(|d| d.code.as_deref()),
            stripe_error_param = ?details.as_ref().and_then(|d| d.param.as_deref()),
            stripe_error_message = ?details.as_ref().and_then(|d| d.message.as_deref()),
            response_body = %body,
            context = %context,
            "stripe api request failed"
        );

        anyhow::bail!(
            "Stripe API request failed: {} (status {}, request_id={:?})",
            context,
            status,
            request_id
        );
    }

    fn checkout_form(&self, request: &CreateSessionRequest) -> Vec<(&'static str, String)> {
        vec![
            ("mode", "payment".to_string()),
            ("success_url", self.success_url.clone()),
            ("cancel_url", self.cancel_url.clone()),
            ("client_reference_id", request.user_id.to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", request.currency.clone()),
            (
                "line_items[0][price_data][unit_amount]",
                request.amount_minor.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                format!("Order {}", request.order_ref),
            ),
            ("metadata[user_id]", request.user_id.to_string()),
            ("metadata[order_ref]", request.order_ref.clone()),
        ]
    }

    /// Checks a `Stripe-Signature` header (`t=...,v1=...`) against the raw body.
    /// https://stripe.com/docs/webhooks/signatures
    fn verify_signature(&self, payload: &[u8], signature_header: &str, now: i64) -> Result<()> {
        let mut timestamp: Option<&str> = None;
        let mut signatures: Vec<&str> = Vec::new();

        for part in signature_header.split(',') {
            let part = part.trim();
            if let Some(rest) = part.strip_prefix("t=") {
                timestamp = Some(rest);
            } else if let Some(rest) = part.strip_prefix("v1=") {
                signatures.push(rest);
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| anyhow::anyhow!("missing timestamp in stripe-signature"))?;
        if signatures.is_empty() {
            anyhow::bail!("missing v1 in stripe-signature");
        }

        let signed_at: i64 = timestamp
            .parse()
            .context("invalid timestamp in stripe-signature")?;
        if (now - signed_at).abs() > SIGNATURE_TOLERANCE_SECS {
            anyhow::bail!("stripe-signature timestamp outside tolerance");
        }

        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);

        let matched = signatures.iter().any(|signature| {
            hex::decode(signature)
                .map(|provided| mac.clone().verify_slice(&provided).is_ok())
                .unwrap_or(false)
        });
        if !matched {
            anyhow::bail!("invalid webhook signature");
        }

        Ok(())
    }

    fn parse_event(payload: &[u8]) -> Result<GatewayEvent> {
        let event: StripeEvent = serde_json::from_slice(payload).context("malformed stripe event")?;
        let kind = event_kind(&event.type_);

        let session = match kind {
            GatewayEventKind::Other(_) => None,
            _ => {
                let raw = event.data.object;
                let session: StripeCheckoutSession = serde_json::from_value(raw.clone())
                    .context("stripe event does not carry a checkout session")?;
                Some(session.into_status(raw))
            }
        };

        Ok(GatewayEvent { kind, session })
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_session(&self, request: CreateSessionRequest) -> Result<GatewaySession> {
        // https://stripe.com/docs/api/checkout/sessions/create
        let resp = self
            .http
            .post(format!("{STRIPE_API}/checkout/sessions"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("Idempotency-Key", format!("checkout-{}", request.order_ref))
            .form(&self.checkout_form(&request))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create checkout session").await?;

        let session: StripeCheckoutSession = resp.json().await?;
        let redirect_url = session
            .url
            .ok_or_else(|| anyhow::anyhow!("Stripe Checkout session URL is missing"))?;

        info!(
            user_id = request.user_id,
            order_ref = %request.order_ref,
            session_id = %session.id,
            "stripe: checkout session created"
        );

        Ok(GatewaySession {
            session_id: session.id,
            redirect_url,
        })
    }

    async fn get_status(&self, session_id: &str) -> Result<GatewaySessionStatus> {
        // https://stripe.com/docs/api/checkout/sessions/retrieve
        let resp = self
            .http
            .get(format!("{STRIPE_API}/checkout/sessions/{session_id}"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "retrieve checkout session").await?;

        let raw: serde_json::Value = resp.json().await?;
        let session: StripeCheckoutSession = serde_json::from_value(raw.clone())?;
        Ok(session.into_status(raw))
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<GatewayEvent> {
        self.verify_signature(payload, signature, Utc::now().timestamp())?;
        Self::parse_event(payload)
    }
}

use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSessionRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub user_id: i32,
    pub order_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySession {
    pub session_id: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayPaymentState {
    /// Funds captured.
    Paid,
    /// Session open, or completed with an asynchronous method still settling.
    Unpaid,
    /// Session closed without payment.
    Expired,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewaySessionStatus {
    pub session_id: String,
    pub state: GatewayPaymentState,
    /// Whether the customer finished the hosted checkout flow.
    pub completed: bool,
    pub transaction_id: Option<String>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEventKind {
    CheckoutCompleted,
    AsyncPaymentSucceeded,
    AsyncPaymentFailed,
    CheckoutExpired,
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayEvent {
    pub kind: GatewayEventKind,
    pub session: Option<GatewaySessionStatus>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(&self, request: CreateSessionRequest) -> Result<GatewaySession>;

    async fn get_status(&self, session_id: &str) -> Result<GatewaySessionStatus>;

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<GatewayEvent>;
}

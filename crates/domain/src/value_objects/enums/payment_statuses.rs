use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// `initial -> {pending, success, failed}`, `pending -> {success, failed}`.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Initial,
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Initial => "initial",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "initial" => Some(PaymentStatus::Initial),
            "pending" => Some(PaymentStatus::Pending),
            "success" => Some(PaymentStatus::Success),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Success | PaymentStatus::Failed)
    }

    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        match (self, next) {
            (PaymentStatus::Initial, PaymentStatus::Pending) => true,
            (PaymentStatus::Initial | PaymentStatus::Pending, PaymentStatus::Success) => true,
            (PaymentStatus::Initial | PaymentStatus::Pending, PaymentStatus::Failed) => true,
            _ => false,
        }
    }

    /// Statuses a payment may still leave.
    pub fn unresolved() -> [PaymentStatus; 2] {
        [PaymentStatus::Initial, PaymentStatus::Pending]
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_cannot_transition() {
        for terminal in [PaymentStatus::Success, PaymentStatus::Failed] {
            assert!(terminal.is_terminal());
            for next in [
                PaymentStatus::Initial,
                PaymentStatus::Pending,
                PaymentStatus::Success,
                PaymentStatus::Failed,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn pending_cannot_go_back_to_initial() {
        assert!(!PaymentStatus::Pending.can_transition_to(PaymentStatus::Initial));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Success));
        assert!(PaymentStatus::Initial.can_transition_to(PaymentStatus::Pending));
    }

    #[test]
    fn from_str_rejects_unknown_values() {
        assert_eq!(PaymentStatus::from_str("success"), Some(PaymentStatus::Success));
        assert_eq!(PaymentStatus::from_str("succeeded"), None);
    }
}

use serde::{Deserialize, Serialize};

/// Intent handle returned by the payment provider. The client secret is the
/// continuation the paying client needs to finish the flow out of band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub intent_id: String,
    pub client_secret: String,
}

/// Provider-reported state of an intent. Anything that is not a definitive
/// success or failure maps to `Pending` and is never treated as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Succeeded,
    Pending,
    Failed,
}

/// Contract of the externally hosted payment provider. Implementations must
/// bound every call with a timeout; a timed-out confirmation surfaces as
/// `Unavailable` and leaves the engagement retryable.
pub trait PaymentGateway: Send + Sync {
    fn create_intent(
        &self,
        amount_minor: u64,
        currency: &str,
        method_hint: &str,
    ) -> Result<PaymentIntent, PaymentGatewayError>;

    fn retrieve_intent(&self, intent_id: &str) -> Result<IntentStatus, PaymentGatewayError>;
}

/// Transport-level gateway failure. Distinct from a payment that the
/// provider processed and declined, which arrives as `IntentStatus::Failed`.
#[derive(Debug, thiserror::Error)]
pub enum PaymentGatewayError {
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
    #[error("payment gateway rejected the request: {0}")]
    Rejected(String),
}

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use super::domain::{ActorId, Engagement, EngagementId, EngagementStatus, PaymentMode};
use super::error::MarketplaceError;
use super::payments::{IntentStatus, PaymentGateway};
use super::reputation;
use super::repository::MarketplaceRepository;

static ENGAGEMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_engagement_id() -> EngagementId {
    let id = ENGAGEMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EngagementId(format!("eng-{id:06}"))
}

const SETTLEMENT_CURRENCY: &str = "usd";
const DEFAULT_METHOD_HINT: &str = "card";

/// Continuation handed to the paying client when settlement is online. The
/// engagement stays open until the gateway confirms the referenced intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientContinuation {
    pub payment_intent_id: String,
    pub client_secret: String,
}

/// Result of a completion call: cash settles synchronously, online returns
/// the continuation and waits for confirmation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompletionOutcome {
    Settled { engagement: Engagement },
    AwaitingConfirmation {
        engagement: Engagement,
        continuation: ClientContinuation,
    },
}

/// Lifecycle engine advancing engagements from Pending through payment to
/// Completed, and folding ratings into provider reputation.
pub struct EngagementService<S, P> {
    store: Arc<S>,
    gateway: Arc<P>,
}

impl<S, P> EngagementService<S, P>
where
    S: MarketplaceRepository + 'static,
    P: PaymentGateway + 'static,
{
    pub fn new(store: Arc<S>, gateway: Arc<P>) -> Self {
        Self { store, gateway }
    }

    pub fn get(&self, id: &EngagementId) -> Result<Engagement, MarketplaceError> {
        self.store
            .fetch_engagement(id)?
            .ok_or(MarketplaceError::NotFound("engagement"))
    }

    /// Engagements the actor participates in on either side, optionally
    /// narrowed to one status.
    pub fn for_actor(
        &self,
        actor: &ActorId,
        status: Option<EngagementStatus>,
    ) -> Result<Vec<Engagement>, MarketplaceError> {
        let mut engagements = self.store.engagements_for_actor(actor)?;
        if let Some(status) = status {
            engagements.retain(|engagement| engagement.status == status);
        }
        Ok(engagements)
    }

    /// Owner marks the engagement complete. Cash settles synchronously;
    /// online opens a payment intent and parks the engagement until the
    /// gateway confirms it.
    pub fn complete(
        &self,
        id: &EngagementId,
        actor: &ActorId,
        amount_minor: u64,
        method_hint: Option<&str>,
    ) -> Result<CompletionOutcome, MarketplaceError> {
        let mut engagement = self.owned(id, actor)?;

        match engagement.status {
            EngagementStatus::Pending => {}
            EngagementStatus::AwaitingPaymentConfirmation => {
                return Err(MarketplaceError::State(
                    "payment has already been initiated for this engagement",
                ))
            }
            EngagementStatus::Completed => {
                return Err(MarketplaceError::State("engagement is already completed"))
            }
        }

        match engagement.payment_mode {
            PaymentMode::CashOnDelivery => {
                engagement.status = EngagementStatus::Completed;
                self.store.update_engagement(engagement.clone())?;
                Ok(CompletionOutcome::Settled { engagement })
            }
            PaymentMode::Online => {
                let intent = self.gateway.create_intent(
                    amount_minor,
                    SETTLEMENT_CURRENCY,
                    method_hint.unwrap_or(DEFAULT_METHOD_HINT),
                )?;

                engagement.status = EngagementStatus::AwaitingPaymentConfirmation;
                engagement.payment_intent = Some(intent.intent_id.clone());
                self.store.update_engagement(engagement.clone())?;

                Ok(CompletionOutcome::AwaitingConfirmation {
                    engagement,
                    continuation: ClientContinuation {
                        payment_intent_id: intent.intent_id,
                        client_secret: intent.client_secret,
                    },
                })
            }
        }
    }

    /// Webhook-style confirmation entry point. Idempotent: re-confirming a
    /// completed engagement with its stored intent id is a no-op success. A
    /// gateway-reported pending status is not an error; the engagement is
    /// returned unchanged for the caller to poll again.
    pub fn confirm_payment(
        &self,
        id: &EngagementId,
        intent_id: &str,
    ) -> Result<Engagement, MarketplaceError> {
        let mut engagement = self
            .store
            .fetch_engagement(id)?
            .ok_or(MarketplaceError::NotFound("engagement"))?;

        match engagement.status {
            EngagementStatus::Completed => {
                return if engagement.payment_intent.as_deref() == Some(intent_id) {
                    Ok(engagement)
                } else {
                    Err(MarketplaceError::State("engagement is already completed"))
                };
            }
            EngagementStatus::Pending => {
                return Err(MarketplaceError::State(
                    "payment has not been initiated for this engagement",
                ));
            }
            EngagementStatus::AwaitingPaymentConfirmation => {}
        }

        if engagement.payment_intent.as_deref() != Some(intent_id) {
            return Err(MarketplaceError::State(
                "payment intent does not belong to this engagement",
            ));
        }

        match self.gateway.retrieve_intent(intent_id)? {
            IntentStatus::Succeeded => {
                engagement.status = EngagementStatus::Completed;
                self.store.update_engagement(engagement.clone())?;
                Ok(engagement)
            }
            IntentStatus::Pending => Ok(engagement),
            IntentStatus::Failed => Err(MarketplaceError::Payment(
                "payment provider reported a failed intent".to_string(),
            )),
        }
    }

    /// Owner rates a completed engagement 1-5. Re-rating overwrites, and
    /// the provider's reputation is recomputed in full.
    pub fn rate(
        &self,
        id: &EngagementId,
        actor: &ActorId,
        rating: u8,
    ) -> Result<f64, MarketplaceError> {
        if !(1..=5).contains(&rating) {
            return Err(MarketplaceError::Validation(
                "rating must be between 1 and 5".to_string(),
            ));
        }

        let mut engagement = self.owned(id, actor)?;

        if engagement.status != EngagementStatus::Completed {
            return Err(MarketplaceError::State(
                "only completed engagements can be rated",
            ));
        }

        engagement.rating = Some(rating);
        self.store.update_engagement(engagement.clone())?;

        let history = self.store.engagements_for_provider(&engagement.provider)?;
        let score = reputation::recompute(&engagement.provider, &history)
            .unwrap_or(f64::from(rating));
        self.store
            .store_provider_score(&engagement.provider, score)?;

        Ok(score)
    }

    pub fn provider_score(&self, provider: &ActorId) -> Result<Option<f64>, MarketplaceError> {
        Ok(self.store.provider_score(provider)?)
    }

    fn owned(&self, id: &EngagementId, actor: &ActorId) -> Result<Engagement, MarketplaceError> {
        let engagement = self
            .store
            .fetch_engagement(id)?
            .ok_or(MarketplaceError::NotFound("engagement"))?;

        if engagement.owner.id != *actor {
            return Err(MarketplaceError::Authorization);
        }

        Ok(engagement)
    }
}

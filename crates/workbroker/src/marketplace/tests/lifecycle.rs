use super::common::*;
use crate::marketplace::domain::{EngagementId, EngagementStatus, PaymentMode};
use crate::marketplace::engagements::CompletionOutcome;
use crate::marketplace::payments::IntentStatus;
use crate::marketplace::MarketplaceError;

#[test]
fn cash_completion_settles_synchronously() {
    let harness = harness();
    let engagement = accepted_engagement(&harness, PaymentMode::CashOnDelivery);

    let outcome = harness
        .engagements
        .complete(&engagement.id, &owner_id(), 5_000, None)
        .expect("completion works");

    match outcome {
        CompletionOutcome::Settled { engagement } => {
            assert_eq!(engagement.status, EngagementStatus::Completed);
            assert!(engagement.payment_intent.is_none());
        }
        other => panic!("expected synchronous settlement, got {other:?}"),
    }

    assert_eq!(
        harness.gateway.created_intents(),
        0,
        "cash settlement never touches the gateway"
    );
}

#[test]
fn completion_is_owner_only() {
    let harness = harness();
    let engagement = accepted_engagement(&harness, PaymentMode::CashOnDelivery);

    assert!(matches!(
        harness
            .engagements
            .complete(&engagement.id, &provider_id(), 5_000, None),
        Err(MarketplaceError::Authorization)
    ));

    let stored = harness.engagements.get(&engagement.id).expect("readable");
    assert_eq!(stored.status, EngagementStatus::Pending);
}

#[test]
fn completing_twice_is_a_state_error() {
    let harness = harness();
    let engagement = accepted_engagement(&harness, PaymentMode::CashOnDelivery);

    harness
        .engagements
        .complete(&engagement.id, &owner_id(), 5_000, None)
        .expect("first completion works");

    assert!(matches!(
        harness
            .engagements
            .complete(&engagement.id, &owner_id(), 5_000, None),
        Err(MarketplaceError::State(_))
    ));
}

#[test]
fn online_completion_parks_the_engagement_until_confirmation() {
    let harness = harness();
    let engagement = accepted_engagement(&harness, PaymentMode::Online);

    let outcome = harness
        .engagements
        .complete(&engagement.id, &owner_id(), 12_500, Some("card"))
        .expect("completion works");

    let continuation = match outcome {
        CompletionOutcome::AwaitingConfirmation {
            engagement,
            continuation,
        } => {
            assert_eq!(
                engagement.status,
                EngagementStatus::AwaitingPaymentConfirmation
            );
            assert_eq!(
                engagement.payment_intent.as_deref(),
                Some(continuation.payment_intent_id.as_str())
            );
            continuation
        }
        other => panic!("expected a continuation, got {other:?}"),
    };

    // Re-completing while the intent is outstanding is refused.
    assert!(matches!(
        harness
            .engagements
            .complete(&engagement.id, &owner_id(), 12_500, None),
        Err(MarketplaceError::State(_))
    ));

    // Gateway still reports pending: not an error, nothing changes.
    let unchanged = harness
        .engagements
        .confirm_payment(&engagement.id, &continuation.payment_intent_id)
        .expect("pending confirmation is retryable");
    assert_eq!(
        unchanged.status,
        EngagementStatus::AwaitingPaymentConfirmation
    );

    harness
        .gateway
        .set_status(&continuation.payment_intent_id, IntentStatus::Succeeded);

    let confirmed = harness
        .engagements
        .confirm_payment(&engagement.id, &continuation.payment_intent_id)
        .expect("confirmation works");
    assert_eq!(confirmed.status, EngagementStatus::Completed);
    assert_eq!(
        confirmed.payment_intent.as_deref(),
        Some(continuation.payment_intent_id.as_str())
    );
}

#[test]
fn confirmation_is_idempotent_for_the_stored_intent() {
    let harness = harness();
    let engagement = accepted_engagement(&harness, PaymentMode::Online);

    let continuation = match harness
        .engagements
        .complete(&engagement.id, &owner_id(), 12_500, None)
        .expect("completion works")
    {
        CompletionOutcome::AwaitingConfirmation { continuation, .. } => continuation,
        other => panic!("expected a continuation, got {other:?}"),
    };

    harness
        .gateway
        .set_status(&continuation.payment_intent_id, IntentStatus::Succeeded);

    let first = harness
        .engagements
        .confirm_payment(&engagement.id, &continuation.payment_intent_id)
        .expect("confirmation works");
    let second = harness
        .engagements
        .confirm_payment(&engagement.id, &continuation.payment_intent_id)
        .expect("re-confirmation is a no-op");
    assert_eq!(first, second);

    // A different intent against a completed engagement is refused.
    assert!(matches!(
        harness
            .engagements
            .confirm_payment(&engagement.id, "pi_9999"),
        Err(MarketplaceError::State(_))
    ));
}

#[test]
fn confirmation_rejects_foreign_intents_and_uninitiated_payments() {
    let harness = harness();
    let engagement = accepted_engagement(&harness, PaymentMode::Online);

    // No intent opened yet.
    assert!(matches!(
        harness
            .engagements
            .confirm_payment(&engagement.id, "pi_0001"),
        Err(MarketplaceError::State(_))
    ));

    harness
        .engagements
        .complete(&engagement.id, &owner_id(), 12_500, None)
        .expect("completion works");

    assert!(matches!(
        harness
            .engagements
            .confirm_payment(&engagement.id, "pi_9999"),
        Err(MarketplaceError::State(_))
    ));
}

#[test]
fn a_failed_intent_surfaces_a_payment_error_and_stays_retryable() {
    let harness = harness();
    let engagement = accepted_engagement(&harness, PaymentMode::Online);

    let continuation = match harness
        .engagements
        .complete(&engagement.id, &owner_id(), 12_500, None)
        .expect("completion works")
    {
        CompletionOutcome::AwaitingConfirmation { continuation, .. } => continuation,
        other => panic!("expected a continuation, got {other:?}"),
    };

    harness
        .gateway
        .set_status(&continuation.payment_intent_id, IntentStatus::Failed);

    assert!(matches!(
        harness
            .engagements
            .confirm_payment(&engagement.id, &continuation.payment_intent_id),
        Err(MarketplaceError::Payment(_))
    ));

    let stored = harness.engagements.get(&engagement.id).expect("readable");
    assert_eq!(
        stored.status,
        EngagementStatus::AwaitingPaymentConfirmation,
        "a reported failure leaves the engagement awaiting, not completed"
    );
}

#[test]
fn missing_engagements_are_not_found() {
    let harness = harness();
    let ghost = EngagementId("eng-missing".to_string());

    assert!(matches!(
        harness.engagements.get(&ghost),
        Err(MarketplaceError::NotFound("engagement"))
    ));
    assert!(matches!(
        harness.engagements.complete(&ghost, &owner_id(), 1, None),
        Err(MarketplaceError::NotFound("engagement"))
    ));
    assert!(matches!(
        harness.engagements.confirm_payment(&ghost, "pi_0001"),
        Err(MarketplaceError::NotFound("engagement"))
    ));
}

#[test]
fn rating_bounds_are_enforced() {
    let harness = harness();
    let engagement = accepted_engagement(&harness, PaymentMode::CashOnDelivery);
    harness
        .engagements
        .complete(&engagement.id, &owner_id(), 5_000, None)
        .expect("completion works");

    for invalid in [0u8, 6] {
        assert!(matches!(
            harness
                .engagements
                .rate(&engagement.id, &owner_id(), invalid),
            Err(MarketplaceError::Validation(_))
        ));
    }

    for valid in [1u8, 5] {
        harness
            .engagements
            .rate(&engagement.id, &owner_id(), valid)
            .expect("in-bounds rating is accepted");
    }
}

#[test]
fn rating_requires_a_completed_engagement_and_its_owner() {
    let harness = harness();
    let engagement = accepted_engagement(&harness, PaymentMode::CashOnDelivery);

    assert!(matches!(
        harness.engagements.rate(&engagement.id, &owner_id(), 4),
        Err(MarketplaceError::State(_))
    ));

    harness
        .engagements
        .complete(&engagement.id, &owner_id(), 5_000, None)
        .expect("completion works");

    assert!(matches!(
        harness.engagements.rate(&engagement.id, &provider_id(), 4),
        Err(MarketplaceError::Authorization)
    ));
}

#[test]
fn reputation_is_recomputed_over_the_full_history() {
    let harness = harness();

    let rate_next = |rating: u8| -> f64 {
        let engagement = accepted_engagement(&harness, PaymentMode::CashOnDelivery);
        harness
            .engagements
            .complete(&engagement.id, &owner_id(), 5_000, None)
            .expect("completion works");
        harness
            .engagements
            .rate(&engagement.id, &owner_id(), rating)
            .expect("rating works")
    };

    assert_eq!(rate_next(3), 3.0);
    assert_eq!(rate_next(5), 4.0);
    assert_eq!(rate_next(4), 4.0);
    assert_eq!(rate_next(1), 3.25);

    assert_eq!(
        harness
            .engagements
            .provider_score(&provider_id())
            .expect("score readable"),
        Some(3.25)
    );
}

#[test]
fn re_rating_overwrites_instead_of_accumulating() {
    let harness = harness();
    let engagement = accepted_engagement(&harness, PaymentMode::CashOnDelivery);
    harness
        .engagements
        .complete(&engagement.id, &owner_id(), 5_000, None)
        .expect("completion works");

    assert_eq!(
        harness
            .engagements
            .rate(&engagement.id, &owner_id(), 2)
            .expect("rating works"),
        2.0
    );
    assert_eq!(
        harness
            .engagements
            .rate(&engagement.id, &owner_id(), 5)
            .expect("re-rating works"),
        5.0
    );

    let stored = harness.engagements.get(&engagement.id).expect("readable");
    assert_eq!(stored.rating, Some(5));
}

#[test]
fn listing_filters_by_participant_and_status() {
    let harness = harness();
    let completed = accepted_engagement(&harness, PaymentMode::CashOnDelivery);
    harness
        .engagements
        .complete(&completed.id, &owner_id(), 5_000, None)
        .expect("completion works");
    let pending = accepted_engagement(&harness, PaymentMode::CashOnDelivery);

    let all = harness
        .engagements
        .for_actor(&provider_id(), None)
        .expect("listing works");
    assert_eq!(all.len(), 2);

    let only_pending = harness
        .engagements
        .for_actor(&provider_id(), Some(EngagementStatus::Pending))
        .expect("listing works");
    assert_eq!(
        only_pending.iter().map(|e| e.id.clone()).collect::<Vec<_>>(),
        vec![pending.id]
    );

    assert!(harness
        .engagements
        .for_actor(&second_provider_id(), None)
        .expect("listing works")
        .is_empty());
}

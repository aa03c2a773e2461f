use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::marketplace::applications::ApplicationService;
use crate::marketplace::domain::PaymentMode;
use crate::marketplace::engagements::EngagementService;
use crate::marketplace::items::WorkItemService;
use crate::marketplace::notifications::NotificationService;
use crate::marketplace::router;

fn broker_router(harness: &Harness) -> axum::Router {
    let items = Arc::new(WorkItemService::new(
        harness.store.clone(),
        harness.directory.clone(),
        harness.notifications.clone(),
    ));
    let applications = Arc::new(ApplicationService::new(
        harness.store.clone(),
        harness.directory.clone(),
        harness.notifications.clone(),
    ));
    let engagements = Arc::new(EngagementService::new(
        harness.store.clone(),
        harness.gateway.clone(),
    ));
    let notifications = Arc::new(NotificationService::new(harness.notifications.clone()));

    router::item_router(items)
        .merge(router::application_router(applications))
        .merge(router::engagement_router(engagements))
        .merge(router::notification_router(notifications))
}

fn json_request(method: &str, uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is json")
}

#[tokio::test]
async fn posting_an_item_returns_created() {
    let harness = harness();
    let app = broker_router(&harness);

    let payload = json!({
        "actor": { "kind": "requester", "id": OWNER },
        "title": "Repair the back fence",
        "payment_mode": "online",
        "detail": {
            "kind": "job",
            "description": "Two panels came down in the storm.",
            "category": "carpentry"
        }
    });

    let response = app
        .oneshot(json_request("POST", "/api/v1/items", payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "open");
    assert_eq!(body["payment_mode"], "online");
}

#[tokio::test]
async fn blank_titles_are_unprocessable() {
    let harness = harness();
    let app = broker_router(&harness);

    let payload = json!({
        "actor": { "kind": "requester", "id": OWNER },
        "title": "   ",
        "payment_mode": "cash_on_delivery",
        "detail": { "kind": "service" }
    });

    let response = app
        .oneshot(json_request("POST", "/api/v1/items", payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn duplicate_bids_return_conflict() {
    let harness = harness();
    let item = post_job(&harness, PaymentMode::CashOnDelivery);
    let app = broker_router(&harness);

    let payload = json!({ "item_id": item.id.0, "provider_id": PROVIDER });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/applications", payload.clone()))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request("POST", "/api/v1/applications", payload))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn accepting_someone_elses_item_is_forbidden() {
    let harness = harness();
    let item = post_job(&harness, PaymentMode::CashOnDelivery);
    let application = harness
        .applications
        .submit(&item.id, &provider_id())
        .expect("bid submits");
    let app = broker_router(&harness);

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/applications/{}/accept", application.id.0),
            json!({ "actor_id": SECOND_PROVIDER }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_engagements_are_not_found() {
    let harness = harness();
    let app = broker_router(&harness);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/engagements/eng-missing")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rating_route_returns_the_recomputed_score() {
    let harness = harness();
    let engagement = accepted_engagement(&harness, PaymentMode::CashOnDelivery);
    harness
        .engagements
        .complete(&engagement.id, &owner_id(), 5_000, None)
        .expect("completion works");
    let app = broker_router(&harness);

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/engagements/{}/rating", engagement.id.0),
            json!({ "actor_id": OWNER, "rating": 4 }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["score"], 4.0);
}

#[tokio::test]
async fn inbox_route_serves_the_recipient_newest_first() {
    let harness = harness();
    let item = post_job(&harness, PaymentMode::CashOnDelivery);
    harness
        .applications
        .submit(&item.id, &provider_id())
        .expect("bid submits");
    let app = broker_router(&harness);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v1/notifications?recipient_id={OWNER}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let inbox = body.as_array().expect("inbox is an array");
    assert_eq!(inbox.len(), 1);
    assert!(inbox[0]["message"]
        .as_str()
        .expect("message is a string")
        .contains("applied"));
}

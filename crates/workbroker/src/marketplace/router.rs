use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;

use super::applications::ApplicationService;
use super::directory::IdentityDirectory;
use super::domain::{
    ActorId, ActorRef, ApplicationId, EngagementId, EngagementStatus, NotificationId,
    PaymentMode, WorkItemDetail, WorkItemDraft, WorkItemId,
};
use super::engagements::EngagementService;
use super::items::WorkItemService;
use super::notifications::{NotificationService, NotificationStore};
use super::payments::PaymentGateway;
use super::repository::MarketplaceRepository;

/// Acting identity for operations carried in the query string.
#[derive(Debug, Deserialize)]
pub(crate) struct ActorQuery {
    pub(crate) actor_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostItemRequest {
    pub(crate) actor: ActorRef,
    pub(crate) title: String,
    pub(crate) payment_mode: PaymentMode,
    pub(crate) detail: WorkItemDetail,
}

/// Router exposing the work item store.
pub fn item_router<S, D, N>(service: Arc<WorkItemService<S, D, N>>) -> Router
where
    S: MarketplaceRepository + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationStore + 'static,
{
    Router::new()
        .route("/api/v1/items", post(post_item_handler::<S, D, N>))
        .route("/api/v1/items/open", get(open_items_handler::<S, D, N>))
        .route(
            "/api/v1/items/mine/:actor_id",
            get(my_items_handler::<S, D, N>),
        )
        .route("/api/v1/items/:item_id", delete(delete_item_handler::<S, D, N>))
        .with_state(service)
}

pub(crate) async fn post_item_handler<S, D, N>(
    State(service): State<Arc<WorkItemService<S, D, N>>>,
    Json(request): Json<PostItemRequest>,
) -> Response
where
    S: MarketplaceRepository + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationStore + 'static,
{
    let PostItemRequest {
        actor,
        title,
        payment_mode,
        detail,
    } = request;

    let draft = WorkItemDraft {
        title,
        payment_mode,
        detail,
    };

    match service.post(actor, draft) {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn open_items_handler<S, D, N>(
    State(service): State<Arc<WorkItemService<S, D, N>>>,
) -> Response
where
    S: MarketplaceRepository + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationStore + 'static,
{
    match service.list_open() {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn my_items_handler<S, D, N>(
    State(service): State<Arc<WorkItemService<S, D, N>>>,
    Path(actor_id): Path<String>,
) -> Response
where
    S: MarketplaceRepository + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationStore + 'static,
{
    match service.owned_by(&ActorId(actor_id)) {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn delete_item_handler<S, D, N>(
    State(service): State<Arc<WorkItemService<S, D, N>>>,
    Path(item_id): Path<String>,
    Query(actor): Query<ActorQuery>,
) -> Response
where
    S: MarketplaceRepository + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationStore + 'static,
{
    match service.delete(&WorkItemId(item_id), &ActorId(actor.actor_id)) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "work item deleted" })),
        )
            .into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitApplicationRequest {
    pub(crate) item_id: String,
    pub(crate) provider_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActorBody {
    pub(crate) actor_id: String,
}

/// Router exposing the application ledger.
pub fn application_router<S, D, N>(service: Arc<ApplicationService<S, D, N>>) -> Router
where
    S: MarketplaceRepository + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            post(submit_application_handler::<S, D, N>),
        )
        .route(
            "/api/v1/applications/pending/:owner_id",
            get(pending_applications_handler::<S, D, N>),
        )
        .route(
            "/api/v1/applications/:application_id/accept",
            post(accept_application_handler::<S, D, N>),
        )
        .route(
            "/api/v1/applications/:application_id/reject",
            post(reject_application_handler::<S, D, N>),
        )
        .route(
            "/api/v1/applications/:application_id",
            delete(withdraw_application_handler::<S, D, N>),
        )
        .with_state(service)
}

pub(crate) async fn submit_application_handler<S, D, N>(
    State(service): State<Arc<ApplicationService<S, D, N>>>,
    Json(request): Json<SubmitApplicationRequest>,
) -> Response
where
    S: MarketplaceRepository + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationStore + 'static,
{
    match service.submit(
        &WorkItemId(request.item_id),
        &ActorId(request.provider_id),
    ) {
        Ok(application) => (StatusCode::CREATED, Json(application)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn pending_applications_handler<S, D, N>(
    State(service): State<Arc<ApplicationService<S, D, N>>>,
    Path(owner_id): Path<String>,
) -> Response
where
    S: MarketplaceRepository + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationStore + 'static,
{
    match service.pending_for_owner(&ActorId(owner_id)) {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn accept_application_handler<S, D, N>(
    State(service): State<Arc<ApplicationService<S, D, N>>>,
    Path(application_id): Path<String>,
    Json(body): Json<ActorBody>,
) -> Response
where
    S: MarketplaceRepository + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationStore + 'static,
{
    match service.accept(&ApplicationId(application_id), &ActorId(body.actor_id)) {
        Ok(engagement) => (StatusCode::OK, Json(engagement)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn reject_application_handler<S, D, N>(
    State(service): State<Arc<ApplicationService<S, D, N>>>,
    Path(application_id): Path<String>,
    Json(body): Json<ActorBody>,
) -> Response
where
    S: MarketplaceRepository + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationStore + 'static,
{
    match service.reject(&ApplicationId(application_id), &ActorId(body.actor_id)) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "application rejected" })),
        )
            .into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn withdraw_application_handler<S, D, N>(
    State(service): State<Arc<ApplicationService<S, D, N>>>,
    Path(application_id): Path<String>,
    Query(actor): Query<ActorQuery>,
) -> Response
where
    S: MarketplaceRepository + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationStore + 'static,
{
    match service.withdraw(&ApplicationId(application_id), &ActorId(actor.actor_id)) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "application withdrawn" })),
        )
            .into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompleteEngagementRequest {
    pub(crate) actor_id: String,
    pub(crate) amount_minor: u64,
    #[serde(default)]
    pub(crate) payment_method_hint: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfirmPaymentRequest {
    pub(crate) payment_intent_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RateEngagementRequest {
    pub(crate) actor_id: String,
    pub(crate) rating: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EngagementListQuery {
    pub(crate) actor_id: String,
    #[serde(default)]
    pub(crate) status: Option<EngagementStatus>,
}

/// Router exposing the engagement lifecycle engine.
pub fn engagement_router<S, P>(service: Arc<EngagementService<S, P>>) -> Router
where
    S: MarketplaceRepository + 'static,
    P: PaymentGateway + 'static,
{
    Router::new()
        .route("/api/v1/engagements", get(list_engagements_handler::<S, P>))
        .route(
            "/api/v1/engagements/:engagement_id",
            get(get_engagement_handler::<S, P>),
        )
        .route(
            "/api/v1/engagements/:engagement_id/complete",
            post(complete_engagement_handler::<S, P>),
        )
        .route(
            "/api/v1/engagements/:engagement_id/confirm-payment",
            post(confirm_payment_handler::<S, P>),
        )
        .route(
            "/api/v1/engagements/:engagement_id/rating",
            post(rate_engagement_handler::<S, P>),
        )
        .with_state(service)
}

pub(crate) async fn list_engagements_handler<S, P>(
    State(service): State<Arc<EngagementService<S, P>>>,
    Query(query): Query<EngagementListQuery>,
) -> Response
where
    S: MarketplaceRepository + 'static,
    P: PaymentGateway + 'static,
{
    match service.for_actor(&ActorId(query.actor_id), query.status) {
        Ok(engagements) => (StatusCode::OK, Json(engagements)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn get_engagement_handler<S, P>(
    State(service): State<Arc<EngagementService<S, P>>>,
    Path(engagement_id): Path<String>,
) -> Response
where
    S: MarketplaceRepository + 'static,
    P: PaymentGateway + 'static,
{
    match service.get(&EngagementId(engagement_id)) {
        Ok(engagement) => (StatusCode::OK, Json(engagement)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn complete_engagement_handler<S, P>(
    State(service): State<Arc<EngagementService<S, P>>>,
    Path(engagement_id): Path<String>,
    Json(request): Json<CompleteEngagementRequest>,
) -> Response
where
    S: MarketplaceRepository + 'static,
    P: PaymentGateway + 'static,
{
    match service.complete(
        &EngagementId(engagement_id),
        &ActorId(request.actor_id),
        request.amount_minor,
        request.payment_method_hint.as_deref(),
    ) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn confirm_payment_handler<S, P>(
    State(service): State<Arc<EngagementService<S, P>>>,
    Path(engagement_id): Path<String>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Response
where
    S: MarketplaceRepository + 'static,
    P: PaymentGateway + 'static,
{
    match service.confirm_payment(&EngagementId(engagement_id), &request.payment_intent_id) {
        Ok(engagement) => (StatusCode::OK, Json(engagement)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn rate_engagement_handler<S, P>(
    State(service): State<Arc<EngagementService<S, P>>>,
    Path(engagement_id): Path<String>,
    Json(request): Json<RateEngagementRequest>,
) -> Response
where
    S: MarketplaceRepository + 'static,
    P: PaymentGateway + 'static,
{
    match service.rate(
        &EngagementId(engagement_id),
        &ActorId(request.actor_id),
        request.rating,
    ) {
        Ok(score) => (StatusCode::OK, Json(json!({ "score": score }))).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct InboxQuery {
    pub(crate) recipient_id: String,
}

/// Router exposing the pull-based notification inbox.
pub fn notification_router<N>(service: Arc<NotificationService<N>>) -> Router
where
    N: NotificationStore + 'static,
{
    Router::new()
        .route("/api/v1/notifications", get(inbox_handler::<N>))
        .route(
            "/api/v1/notifications/:notification_id",
            delete(delete_notification_handler::<N>),
        )
        .with_state(service)
}

pub(crate) async fn inbox_handler<N>(
    State(service): State<Arc<NotificationService<N>>>,
    Query(query): Query<InboxQuery>,
) -> Response
where
    N: NotificationStore + 'static,
{
    match service.inbox(&ActorId(query.recipient_id)) {
        Ok(notifications) => (StatusCode::OK, Json(notifications)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn delete_notification_handler<N>(
    State(service): State<Arc<NotificationService<N>>>,
    Path(notification_id): Path<String>,
    Query(actor): Query<ActorQuery>,
) -> Response
where
    N: NotificationStore + 'static,
{
    match service.delete(&NotificationId(notification_id), &ActorId(actor.actor_id)) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "notification deleted" })),
        )
            .into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

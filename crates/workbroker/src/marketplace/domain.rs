use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for directory actors (requesters and providers).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

/// The two actor kinds the directory recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Requester,
    Provider,
}

impl ActorKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Requester => "Requester",
            Self::Provider => "Provider",
        }
    }
}

/// Stored owner discriminator. The kind is persisted alongside the id so no
/// reader ever has to probe multiple stores to learn what kind of actor owns
/// a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRef {
    pub kind: ActorKind,
    pub id: ActorId,
}

impl ActorRef {
    pub fn new(kind: ActorKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: ActorId(id.into()),
        }
    }
}

/// Identifier wrapper for postable work items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkItemId(pub String);

/// Discriminates the two postable variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemKind {
    Job,
    Service,
}

impl WorkItemKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::Service => "service",
        }
    }
}

/// How the eventual engagement settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    CashOnDelivery,
    Online,
}

/// A work item is Open until one of its applications is accepted, then
/// Closed forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemStatus {
    Open,
    Closed,
}

/// Variant payload: jobs carry a full description, service requests are
/// title-only and always settle cash-on-delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkItemDetail {
    Job {
        description: String,
        category: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        location: Option<String>,
    },
    Service,
}

impl WorkItemDetail {
    pub const fn kind(&self) -> WorkItemKind {
        match self {
            Self::Job { .. } => WorkItemKind::Job,
            Self::Service => WorkItemKind::Service,
        }
    }
}

/// A postable unit of work owned by exactly one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: WorkItemId,
    pub title: String,
    pub owner: ActorRef,
    pub payment_mode: PaymentMode,
    pub status: WorkItemStatus,
    pub detail: WorkItemDetail,
    pub posted_at: DateTime<Utc>,
}

impl WorkItem {
    pub const fn kind(&self) -> WorkItemKind {
        self.detail.kind()
    }

    pub fn is_open(&self) -> bool {
        self.status == WorkItemStatus::Open
    }
}

/// Caller-supplied payload for posting a new work item.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkItemDraft {
    pub title: String,
    pub payment_mode: PaymentMode,
    pub detail: WorkItemDetail,
}

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Provider display attributes captured at submission time. Later profile
/// edits do not retroactively update pending applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSnapshot {
    pub display_name: String,
    pub contact: String,
    pub experience: String,
}

/// One provider's bid on one work item. The (item, provider) pair is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub item: WorkItemId,
    pub item_kind: WorkItemKind,
    pub provider: ActorId,
    pub profile: ProviderSnapshot,
    pub submitted_at: DateTime<Utc>,
    pub accepted: bool,
}

/// Identifier wrapper for engagements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngagementId(pub String);

/// Lifecycle states of an engagement. `AwaitingPaymentConfirmation` is only
/// reachable for online settlement, between intent creation and the
/// gateway's confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementStatus {
    Pending,
    AwaitingPaymentConfirmation,
    Completed,
}

impl EngagementStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::AwaitingPaymentConfirmation => "Awaiting Payment Confirmation",
            Self::Completed => "Completed",
        }
    }
}

/// Snapshot of the originating work item carried on the engagement so
/// listings survive item deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemSource {
    pub kind: WorkItemKind,
    pub id: WorkItemId,
    pub title: String,
}

/// The binding contract created when an application is accepted. Never
/// deleted; Pending engagements may persist indefinitely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub id: EngagementId,
    pub source: WorkItemSource,
    pub provider: ActorId,
    pub owner: ActorRef,
    pub payment_mode: PaymentMode,
    pub status: EngagementStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    pub created_at: DateTime<Utc>,
}

impl Engagement {
    /// Builds the pending engagement for an accepted application. Payment
    /// mode and the owner discriminator are copied from the stored work
    /// item, never re-derived from the directory.
    pub fn from_accepted_application(
        id: EngagementId,
        application: &Application,
        item: &WorkItem,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            source: WorkItemSource {
                kind: item.kind(),
                id: item.id.clone(),
                title: item.title.clone(),
            },
            provider: application.provider.clone(),
            owner: item.owner.clone(),
            payment_mode: item.payment_mode,
            status: EngagementStatus::Pending,
            payment_intent: None,
            rating: None,
            created_at,
        }
    }

    pub fn involves(&self, actor: &ActorId) -> bool {
        self.owner.id == *actor || self.provider == *actor
    }
}

/// Identifier wrapper for stored notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub String);

/// Optional context attached to a notification for later filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NotificationContext {
    WorkItem(WorkItemId),
    Engagement(EngagementId),
}

/// A durable, pull-based message for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: ActorId,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<NotificationContext>,
    pub created_at: DateTime<Utc>,
}

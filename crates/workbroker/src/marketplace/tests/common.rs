use std::sync::Arc;

use crate::marketplace::applications::ApplicationService;
use crate::marketplace::directory::ActorRecord;
use crate::marketplace::domain::{
    ActorId, ActorKind, ActorRef, Engagement, Notification, NotificationId, PaymentMode,
    WorkItem, WorkItemDetail, WorkItemDraft,
};
use crate::marketplace::engagements::EngagementService;
use crate::marketplace::items::WorkItemService;
use crate::marketplace::notifications::{NotificationStore, NotifyError};

pub(super) use crate::marketplace::memory::{
    InMemoryDirectory as MemoryDirectory, InMemoryNotificationStore as MemoryNotifications,
    InMemoryRepository as MemoryRepository, ScriptedPaymentGateway as FakeGateway,
};

/// Notification store whose writes always fail, for exercising the
/// swallow-and-log path.
#[derive(Default)]
pub(super) struct FailingNotifications;

impl NotificationStore for FailingNotifications {
    fn persist(&self, _notification: Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Unavailable("simulated outage".to_string()))
    }

    fn fetch(&self, _id: &NotificationId) -> Result<Option<Notification>, NotifyError> {
        Err(NotifyError::Unavailable("simulated outage".to_string()))
    }

    fn inbox(&self, _recipient: &ActorId) -> Result<Vec<Notification>, NotifyError> {
        Err(NotifyError::Unavailable("simulated outage".to_string()))
    }

    fn remove(&self, _id: &NotificationId) -> Result<(), NotifyError> {
        Err(NotifyError::Unavailable("simulated outage".to_string()))
    }
}

pub(super) const OWNER: &str = "cust-1";
pub(super) const PROVIDER: &str = "pro-1";
pub(super) const SECOND_PROVIDER: &str = "pro-2";

pub(super) fn owner_id() -> ActorId {
    ActorId(OWNER.to_string())
}

pub(super) fn provider_id() -> ActorId {
    ActorId(PROVIDER.to_string())
}

pub(super) fn second_provider_id() -> ActorId {
    ActorId(SECOND_PROVIDER.to_string())
}

pub(super) fn requester_record(id: &str, name: &str) -> ActorRecord {
    ActorRecord {
        id: ActorId(id.to_string()),
        kind: ActorKind::Requester,
        display_name: name.to_string(),
        contact: format!("{id}@example.com"),
        experience: None,
    }
}

pub(super) fn provider_record(id: &str, name: &str, experience: &str) -> ActorRecord {
    ActorRecord {
        id: ActorId(id.to_string()),
        kind: ActorKind::Provider,
        display_name: name.to_string(),
        contact: format!("{id}@example.com"),
        experience: Some(experience.to_string()),
    }
}

pub(super) type Items = WorkItemService<MemoryRepository, MemoryDirectory, MemoryNotifications>;
pub(super) type Applications =
    ApplicationService<MemoryRepository, MemoryDirectory, MemoryNotifications>;
pub(super) type Engagements = EngagementService<MemoryRepository, FakeGateway>;

pub(super) struct Harness {
    pub(super) store: Arc<MemoryRepository>,
    pub(super) directory: Arc<MemoryDirectory>,
    pub(super) notifications: Arc<MemoryNotifications>,
    pub(super) gateway: Arc<FakeGateway>,
    pub(super) items: Items,
    pub(super) applications: Applications,
    pub(super) engagements: Engagements,
}

pub(super) fn harness() -> Harness {
    let store = Arc::new(MemoryRepository::default());
    let directory = Arc::new(MemoryDirectory::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let gateway = Arc::new(FakeGateway::default());

    directory.register(requester_record(OWNER, "Dana Whitfield"));
    directory.register(provider_record(PROVIDER, "Ray Okafor", "8 years residential"));
    directory.register(provider_record(SECOND_PROVIDER, "Mei Sandoval", "3 years"));

    Harness {
        items: WorkItemService::new(store.clone(), directory.clone(), notifications.clone()),
        applications: ApplicationService::new(
            store.clone(),
            directory.clone(),
            notifications.clone(),
        ),
        engagements: EngagementService::new(store.clone(), gateway.clone()),
        store,
        directory,
        notifications,
        gateway,
    }
}

pub(super) trait RecipientEvents {
    fn for_recipient(&self, recipient: &ActorId) -> Vec<Notification>;
}

impl RecipientEvents for MemoryNotifications {
    fn for_recipient(&self, recipient: &ActorId) -> Vec<Notification> {
        self.events()
            .into_iter()
            .filter(|notification| notification.recipient == *recipient)
            .collect()
    }
}

pub(super) fn job_draft(payment_mode: PaymentMode) -> WorkItemDraft {
    WorkItemDraft {
        title: "Repair the back fence".to_string(),
        payment_mode,
        detail: WorkItemDetail::Job {
            description: "Two panels came down in the storm.".to_string(),
            category: "carpentry".to_string(),
            location: Some("Des Moines".to_string()),
        },
    }
}

pub(super) fn service_draft() -> WorkItemDraft {
    WorkItemDraft {
        title: "Weekly lawn mowing".to_string(),
        payment_mode: PaymentMode::CashOnDelivery,
        detail: WorkItemDetail::Service,
    }
}

pub(super) fn owner_ref() -> ActorRef {
    ActorRef::new(ActorKind::Requester, OWNER)
}

pub(super) fn post_job(harness: &Harness, payment_mode: PaymentMode) -> WorkItem {
    harness
        .items
        .post(owner_ref(), job_draft(payment_mode))
        .expect("job posts")
}

/// Posts a job, submits the default provider's bid, and accepts it.
pub(super) fn accepted_engagement(
    harness: &Harness,
    payment_mode: PaymentMode,
) -> Engagement {
    let item = post_job(harness, payment_mode);
    let application = harness
        .applications
        .submit(&item.id, &provider_id())
        .expect("bid submits");
    harness
        .applications
        .accept(&application.id, &owner_id())
        .expect("bid accepts")
}

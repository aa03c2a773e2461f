use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use workbroker::marketplace::memory::{
    InMemoryDirectory, InMemoryNotificationStore, InMemoryRepository, ScriptedPaymentGateway,
};
use workbroker::marketplace::{
    ActorId, ActorKind, ActorRecord, ApplicationService, EngagementService, NotificationService,
    WorkItemService,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type Items =
    WorkItemService<InMemoryRepository, InMemoryDirectory, InMemoryNotificationStore>;
pub(crate) type Applications =
    ApplicationService<InMemoryRepository, InMemoryDirectory, InMemoryNotificationStore>;
pub(crate) type Engagements = EngagementService<InMemoryRepository, ScriptedPaymentGateway>;
pub(crate) type Notifications = NotificationService<InMemoryNotificationStore>;

/// The full in-memory service stack the server and demo run on. A durable
/// deployment swaps the repository, directory, and gateway for real
/// adapters without touching the services.
pub(crate) struct Stack {
    pub(crate) items: Arc<Items>,
    pub(crate) applications: Arc<Applications>,
    pub(crate) engagements: Arc<Engagements>,
    pub(crate) notifications: Arc<Notifications>,
    pub(crate) directory: Arc<InMemoryDirectory>,
    pub(crate) gateway: Arc<ScriptedPaymentGateway>,
}

pub(crate) fn build_stack() -> Stack {
    let store = Arc::new(InMemoryRepository::default());
    let directory = Arc::new(InMemoryDirectory::default());
    let notification_store = Arc::new(InMemoryNotificationStore::default());
    let gateway = Arc::new(ScriptedPaymentGateway::default());

    Stack {
        items: Arc::new(WorkItemService::new(
            store.clone(),
            directory.clone(),
            notification_store.clone(),
        )),
        applications: Arc::new(ApplicationService::new(
            store.clone(),
            directory.clone(),
            notification_store.clone(),
        )),
        engagements: Arc::new(EngagementService::new(store, gateway.clone())),
        notifications: Arc::new(NotificationService::new(notification_store)),
        directory,
        gateway,
    }
}

/// Seeds a handful of directory actors so the service is exercisable out of
/// the box; a deployed directory adapter replaces this entirely.
pub(crate) fn seed_directory(directory: &InMemoryDirectory) {
    directory.register(ActorRecord {
        id: ActorId("cust-1".to_string()),
        kind: ActorKind::Requester,
        display_name: "Dana Whitfield".to_string(),
        contact: "dana@example.com".to_string(),
        experience: None,
    });
    directory.register(ActorRecord {
        id: ActorId("pro-1".to_string()),
        kind: ActorKind::Provider,
        display_name: "Ray Okafor".to_string(),
        contact: "ray@example.com".to_string(),
        experience: Some("8 years residential".to_string()),
    });
    directory.register(ActorRecord {
        id: ActorId("pro-2".to_string()),
        kind: ActorKind::Provider,
        display_name: "Mei Sandoval".to_string(),
        contact: "mei@example.com".to_string(),
        experience: Some("3 years".to_string()),
    });
}

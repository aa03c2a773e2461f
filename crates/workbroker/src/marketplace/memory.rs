//! In-memory implementations of the collaborator ports. These back the API
//! service in its default configuration and the end-to-end test suites; a
//! durable deployment swaps them for database- and vendor-backed adapters.

use std::collections::HashMap;
use std::sync::Mutex;

use super::directory::{ActorRecord, DirectoryError, IdentityDirectory};
use super::domain::{
    ActorId, ActorKind, Application, ApplicationId, Engagement, EngagementId, Notification,
    NotificationId, WorkItem, WorkItemId, WorkItemStatus,
};
use super::notifications::{NotificationStore, NotifyError};
use super::payments::{IntentStatus, PaymentGateway, PaymentGatewayError, PaymentIntent};
use super::repository::{MarketplaceRepository, RepositoryError};

#[derive(Default)]
struct Tables {
    items: Vec<WorkItem>,
    applications: Vec<Application>,
    engagements: Vec<Engagement>,
    scores: HashMap<ActorId, f64>,
}

/// Mutex-backed repository. The single lock is what makes the acceptance
/// commit a critical section: the accepted-flag CAS, the item closure, and
/// the engagement insert cannot interleave with a competing accept.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
}

impl MarketplaceRepository for InMemoryRepository {
    fn insert_item(&self, item: WorkItem) -> Result<WorkItem, RepositoryError> {
        let mut tables = self.tables.lock().expect("repository mutex poisoned");
        tables.items.push(item.clone());
        Ok(item)
    }

    fn fetch_item(&self, id: &WorkItemId) -> Result<Option<WorkItem>, RepositoryError> {
        let tables = self.tables.lock().expect("repository mutex poisoned");
        Ok(tables.items.iter().find(|item| item.id == *id).cloned())
    }

    fn open_items(&self) -> Result<Vec<WorkItem>, RepositoryError> {
        let tables = self.tables.lock().expect("repository mutex poisoned");
        let mut open: Vec<WorkItem> = tables
            .items
            .iter()
            .filter(|item| item.status == WorkItemStatus::Open)
            .cloned()
            .collect();
        open.reverse();
        Ok(open)
    }

    fn items_owned_by(&self, owner: &ActorId) -> Result<Vec<WorkItem>, RepositoryError> {
        let tables = self.tables.lock().expect("repository mutex poisoned");
        let mut owned: Vec<WorkItem> = tables
            .items
            .iter()
            .filter(|item| item.owner.id == *owner)
            .cloned()
            .collect();
        owned.reverse();
        Ok(owned)
    }

    fn remove_item(&self, id: &WorkItemId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().expect("repository mutex poisoned");
        let before = tables.items.len();
        tables.items.retain(|item| item.id != *id);
        if tables.items.len() == before {
            return Err(RepositoryError::NotFound);
        }
        tables
            .applications
            .retain(|application| application.item != *id);
        Ok(())
    }

    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.tables.lock().expect("repository mutex poisoned");
        let duplicate = tables.applications.iter().any(|existing| {
            existing.item == application.item && existing.provider == application.provider
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        tables.applications.push(application.clone());
        Ok(application)
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        let tables = self.tables.lock().expect("repository mutex poisoned");
        Ok(tables
            .applications
            .iter()
            .find(|application| application.id == *id)
            .cloned())
    }

    fn applications_for_item(
        &self,
        item: &WorkItemId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let tables = self.tables.lock().expect("repository mutex poisoned");
        Ok(tables
            .applications
            .iter()
            .filter(|application| application.item == *item)
            .cloned()
            .collect())
    }

    fn remove_application(&self, id: &ApplicationId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().expect("repository mutex poisoned");
        let before = tables.applications.len();
        tables.applications.retain(|application| application.id != *id);
        if tables.applications.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn has_accepted_application(&self, item: &WorkItemId) -> Result<bool, RepositoryError> {
        let tables = self.tables.lock().expect("repository mutex poisoned");
        Ok(tables
            .applications
            .iter()
            .any(|application| application.item == *item && application.accepted))
    }

    fn commit_acceptance(
        &self,
        application: &ApplicationId,
        engagement: Engagement,
    ) -> Result<Engagement, RepositoryError> {
        let mut tables = self.tables.lock().expect("repository mutex poisoned");

        let item_id = {
            let stored = tables
                .applications
                .iter()
                .find(|candidate| candidate.id == *application)
                .ok_or(RepositoryError::NotFound)?;
            if stored.accepted {
                return Err(RepositoryError::Conflict);
            }
            stored.item.clone()
        };

        let item_open = tables
            .items
            .iter()
            .find(|item| item.id == item_id)
            .map(|item| item.status == WorkItemStatus::Open)
            .ok_or(RepositoryError::NotFound)?;
        if !item_open {
            return Err(RepositoryError::Conflict);
        }

        for stored in tables.applications.iter_mut() {
            if stored.id == *application {
                stored.accepted = true;
            }
        }
        for item in tables.items.iter_mut() {
            if item.id == item_id {
                item.status = WorkItemStatus::Closed;
            }
        }
        tables.engagements.push(engagement.clone());
        Ok(engagement)
    }

    fn fetch_engagement(
        &self,
        id: &EngagementId,
    ) -> Result<Option<Engagement>, RepositoryError> {
        let tables = self.tables.lock().expect("repository mutex poisoned");
        Ok(tables
            .engagements
            .iter()
            .find(|engagement| engagement.id == *id)
            .cloned())
    }

    fn update_engagement(&self, engagement: Engagement) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().expect("repository mutex poisoned");
        for stored in tables.engagements.iter_mut() {
            if stored.id == engagement.id {
                *stored = engagement;
                return Ok(());
            }
        }
        Err(RepositoryError::NotFound)
    }

    fn engagements_for_actor(
        &self,
        actor: &ActorId,
    ) -> Result<Vec<Engagement>, RepositoryError> {
        let tables = self.tables.lock().expect("repository mutex poisoned");
        let mut involved: Vec<Engagement> = tables
            .engagements
            .iter()
            .filter(|engagement| engagement.involves(actor))
            .cloned()
            .collect();
        involved.reverse();
        Ok(involved)
    }

    fn engagements_for_provider(
        &self,
        provider: &ActorId,
    ) -> Result<Vec<Engagement>, RepositoryError> {
        let tables = self.tables.lock().expect("repository mutex poisoned");
        Ok(tables
            .engagements
            .iter()
            .filter(|engagement| engagement.provider == *provider)
            .cloned()
            .collect())
    }

    fn store_provider_score(
        &self,
        provider: &ActorId,
        score: f64,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().expect("repository mutex poisoned");
        tables.scores.insert(provider.clone(), score);
        Ok(())
    }

    fn provider_score(&self, provider: &ActorId) -> Result<Option<f64>, RepositoryError> {
        let tables = self.tables.lock().expect("repository mutex poisoned");
        Ok(tables.scores.get(provider).copied())
    }
}

/// Append-only notification store; the write is the delivery.
#[derive(Default)]
pub struct InMemoryNotificationStore {
    events: Mutex<Vec<Notification>>,
}

impl InMemoryNotificationStore {
    /// Every persisted notification in arrival order, for assertions.
    pub fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }
}

impl NotificationStore for InMemoryNotificationStore {
    fn persist(&self, notification: Notification) -> Result<(), NotifyError> {
        let mut events = self.events.lock().expect("notification mutex poisoned");
        events.push(notification);
        Ok(())
    }

    fn fetch(&self, id: &NotificationId) -> Result<Option<Notification>, NotifyError> {
        let events = self.events.lock().expect("notification mutex poisoned");
        Ok(events
            .iter()
            .find(|notification| notification.id == *id)
            .cloned())
    }

    fn inbox(&self, recipient: &ActorId) -> Result<Vec<Notification>, NotifyError> {
        let events = self.events.lock().expect("notification mutex poisoned");
        let mut inbox: Vec<Notification> = events
            .iter()
            .filter(|notification| notification.recipient == *recipient)
            .cloned()
            .collect();
        inbox.reverse();
        Ok(inbox)
    }

    fn remove(&self, id: &NotificationId) -> Result<(), NotifyError> {
        let mut events = self.events.lock().expect("notification mutex poisoned");
        events.retain(|notification| notification.id != *id);
        Ok(())
    }
}

/// Registry-style directory stand-in.
#[derive(Default)]
pub struct InMemoryDirectory {
    actors: Mutex<HashMap<ActorId, ActorRecord>>,
}

impl InMemoryDirectory {
    /// Registers or replaces an actor record.
    pub fn register(&self, record: ActorRecord) {
        let mut actors = self.actors.lock().expect("directory mutex poisoned");
        actors.insert(record.id.clone(), record);
    }
}

impl IdentityDirectory for InMemoryDirectory {
    fn resolve(&self, id: &ActorId) -> Result<Option<ActorRecord>, DirectoryError> {
        let actors = self.actors.lock().expect("directory mutex poisoned");
        Ok(actors.get(id).cloned())
    }

    fn providers(&self) -> Result<Vec<ActorRecord>, DirectoryError> {
        let actors = self.actors.lock().expect("directory mutex poisoned");
        let mut providers: Vec<ActorRecord> = actors
            .values()
            .filter(|record| record.kind == ActorKind::Provider)
            .cloned()
            .collect();
        providers.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(providers)
    }
}

#[derive(Default)]
struct GatewayTables {
    sequence: u64,
    intents: HashMap<String, IntentStatus>,
}

/// Scripted payment gateway: intents start out pending until a caller marks
/// them settled or failed, mimicking the asynchronous provider.
#[derive(Default)]
pub struct ScriptedPaymentGateway {
    tables: Mutex<GatewayTables>,
}

impl ScriptedPaymentGateway {
    /// Overrides the provider-reported status of an intent.
    pub fn set_status(&self, intent_id: &str, status: IntentStatus) {
        let mut tables = self.tables.lock().expect("gateway mutex poisoned");
        tables.intents.insert(intent_id.to_string(), status);
    }

    pub fn created_intents(&self) -> usize {
        let tables = self.tables.lock().expect("gateway mutex poisoned");
        tables.intents.len()
    }
}

impl PaymentGateway for ScriptedPaymentGateway {
    fn create_intent(
        &self,
        _amount_minor: u64,
        _currency: &str,
        _method_hint: &str,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let mut tables = self.tables.lock().expect("gateway mutex poisoned");
        tables.sequence += 1;
        let intent_id = format!("pi_{:04}", tables.sequence);
        tables
            .intents
            .insert(intent_id.clone(), IntentStatus::Pending);
        Ok(PaymentIntent {
            client_secret: format!("{intent_id}_secret_test"),
            intent_id,
        })
    }

    fn retrieve_intent(&self, intent_id: &str) -> Result<IntentStatus, PaymentGatewayError> {
        let tables = self.tables.lock().expect("gateway mutex poisoned");
        tables
            .intents
            .get(intent_id)
            .copied()
            .ok_or_else(|| PaymentGatewayError::Rejected("no such intent".to_string()))
    }
}

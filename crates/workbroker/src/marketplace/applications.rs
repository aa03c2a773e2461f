use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::directory::IdentityDirectory;
use super::domain::{
    ActorId, ActorKind, Application, ApplicationId, Engagement, NotificationContext,
    ProviderSnapshot, WorkItem, WorkItemId,
};
use super::engagements::next_engagement_id;
use super::error::MarketplaceError;
use super::notifications::{self, NotificationStore};
use super::repository::{MarketplaceRepository, RepositoryError};

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Ledger service recording provider bids and carrying accepted bids into
/// the engagement lifecycle.
pub struct ApplicationService<S, D, N> {
    store: Arc<S>,
    directory: Arc<D>,
    notifications: Arc<N>,
}

impl<S, D, N> ApplicationService<S, D, N>
where
    S: MarketplaceRepository + 'static,
    D: IdentityDirectory + 'static,
    N: NotificationStore + 'static,
{
    pub fn new(store: Arc<S>, directory: Arc<D>, notifications: Arc<N>) -> Self {
        Self {
            store,
            directory,
            notifications,
        }
    }

    /// Records a provider's bid on an open item, snapshotting the
    /// provider's directory profile at submission time.
    pub fn submit(
        &self,
        item_id: &WorkItemId,
        provider_id: &ActorId,
    ) -> Result<Application, MarketplaceError> {
        let item = self
            .store
            .fetch_item(item_id)?
            .ok_or(MarketplaceError::NotFound("work item"))?;

        if !item.is_open() {
            return Err(MarketplaceError::State(
                "applications for this item are closed",
            ));
        }

        let record = self
            .directory
            .resolve(provider_id)?
            .ok_or(MarketplaceError::NotFound("provider"))?;

        if record.kind != ActorKind::Provider {
            return Err(MarketplaceError::Authorization);
        }

        let application = Application {
            id: next_application_id(),
            item: item.id.clone(),
            item_kind: item.kind(),
            provider: record.id.clone(),
            profile: ProviderSnapshot {
                display_name: record.display_name.clone(),
                contact: record.contact,
                experience: record.experience.unwrap_or_default(),
            },
            submitted_at: Utc::now(),
            accepted: false,
        };

        let stored = self
            .store
            .insert_application(application)
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    MarketplaceError::Conflict("provider has already applied to this item")
                }
                other => other.into(),
            })?;

        notifications::deliver(
            self.notifications.as_ref(),
            item.owner.id.clone(),
            format!(
                "{} has applied for your {} \"{}\".",
                record.display_name,
                item.kind().label(),
                item.title
            ),
            Some(NotificationContext::WorkItem(item.id)),
        );

        Ok(stored)
    }

    /// Unaccepted applications across every item the actor owns.
    pub fn pending_for_owner(
        &self,
        owner: &ActorId,
    ) -> Result<Vec<Application>, MarketplaceError> {
        let mut pending = Vec::new();
        for item in self.store.items_owned_by(owner)? {
            for application in self.store.applications_for_item(&item.id)? {
                if !application.accepted {
                    pending.push(application);
                }
            }
        }
        Ok(pending)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<Application, MarketplaceError> {
        self.store
            .fetch_application(id)?
            .ok_or(MarketplaceError::NotFound("application"))
    }

    /// Accepts a bid: atomically flips the accepted flag, closes the item,
    /// and creates the pending engagement. First accept wins; competing
    /// bids on the same item stay pending.
    pub fn accept(
        &self,
        id: &ApplicationId,
        actor: &ActorId,
    ) -> Result<Engagement, MarketplaceError> {
        let (application, item) = self.authorized(id, actor)?;

        if application.accepted {
            return Err(MarketplaceError::Conflict("application already accepted"));
        }

        let engagement = Engagement::from_accepted_application(
            next_engagement_id(),
            &application,
            &item,
            Utc::now(),
        );

        let engagement = self
            .store
            .commit_acceptance(&application.id, engagement)
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    MarketplaceError::Conflict("item already has an accepted application")
                }
                other => other.into(),
            })?;

        notifications::deliver(
            self.notifications.as_ref(),
            application.provider.clone(),
            format!(
                "Your application for the {} \"{}\" has been accepted.",
                item.kind().label(),
                item.title
            ),
            Some(NotificationContext::Engagement(engagement.id.clone())),
        );

        Ok(engagement)
    }

    /// Rejects a bid pre-acceptance: the application is deleted and the
    /// provider notified.
    pub fn reject(&self, id: &ApplicationId, actor: &ActorId) -> Result<(), MarketplaceError> {
        let (application, item) = self.authorized(id, actor)?;

        if application.accepted {
            return Err(MarketplaceError::State(
                "an accepted application can no longer be rejected",
            ));
        }

        self.store.remove_application(&application.id)?;

        notifications::deliver(
            self.notifications.as_ref(),
            application.provider,
            format!(
                "Your application for the {} \"{}\" has been rejected.",
                item.kind().label(),
                item.title
            ),
            Some(NotificationContext::WorkItem(item.id)),
        );

        Ok(())
    }

    /// Withdrawal by the bidding provider, or removal by the item owner.
    pub fn withdraw(&self, id: &ApplicationId, actor: &ActorId) -> Result<(), MarketplaceError> {
        let application = self
            .store
            .fetch_application(id)?
            .ok_or(MarketplaceError::NotFound("application"))?;

        let item = self
            .store
            .fetch_item(&application.item)?
            .ok_or(MarketplaceError::NotFound("work item"))?;

        if application.provider != *actor && item.owner.id != *actor {
            return Err(MarketplaceError::Authorization);
        }

        Ok(self.store.remove_application(&application.id)?)
    }

    /// Fetches the application and its item, then checks that the actor is
    /// the item owner referenced transitively by the application.
    fn authorized(
        &self,
        id: &ApplicationId,
        actor: &ActorId,
    ) -> Result<(Application, WorkItem), MarketplaceError> {
        let application = self
            .store
            .fetch_application(id)?
            .ok_or(MarketplaceError::NotFound("application"))?;

        let item = self
            .store
            .fetch_item(&application.item)?
            .ok_or(MarketplaceError::NotFound("work item"))?;

        if item.owner.id != *actor {
            return Err(MarketplaceError::Authorization);
        }

        Ok((application, item))
    }
}

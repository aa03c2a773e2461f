use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use super::directory::IdentityDirectory;
use super::domain::{
    ActorId, ActorRef, NotificationContext, PaymentMode, WorkItem, WorkItemDetail, WorkItemDraft,
    WorkItemId, WorkItemStatus,
};
use super::error::MarketplaceError;
use super::notifications::{self, NotificationStore};
use super::repository::MarketplaceRepository;

static ITEM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_item_id() -> WorkItemId {
    let id = ITEM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    WorkItemId(format!("item-{id:06}"))
}

/// Store-facing service for postable work items.
pub struct WorkItemService<S, D, N> {
    store: Arc<S>,
    directory: Arc<D>,
    notifications: Arc<N>,
}

impl<S, D, N> WorkItemService<S, D, N>
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

    /// Posts a new work item in Open status and broadcasts it to every
    /// provider in the directory. A service request always settles cash on
    /// delivery regardless of the requested mode.
    pub fn post(
        &self,
        owner: ActorRef,
        draft: WorkItemDraft,
    ) -> Result<WorkItem, MarketplaceError> {
        validate_draft(&draft)?;

        let payment_mode = match draft.detail {
            WorkItemDetail::Service => PaymentMode::CashOnDelivery,
            WorkItemDetail::Job { .. } => draft.payment_mode,
        };

        let item = WorkItem {
            id: next_item_id(),
            title: draft.title,
            owner,
            payment_mode,
            status: WorkItemStatus::Open,
            detail: draft.detail,
            posted_at: Utc::now(),
        };

        let stored = self.store.insert_item(item)?;
        self.broadcast(&stored);
        Ok(stored)
    }

    /// Items that are Open and have no accepted application. The accepted
    /// check is computed per read, never cached.
    pub fn list_open(&self) -> Result<Vec<WorkItem>, MarketplaceError> {
        let mut open = Vec::new();
        for item in self.store.open_items()? {
            if !self.store.has_accepted_application(&item.id)? {
                open.push(item);
            }
        }
        Ok(open)
    }

    pub fn owned_by(&self, owner: &ActorId) -> Result<Vec<WorkItem>, MarketplaceError> {
        Ok(self.store.items_owned_by(owner)?)
    }

    pub fn get(&self, id: &WorkItemId) -> Result<WorkItem, MarketplaceError> {
        self.store
            .fetch_item(id)?
            .ok_or(MarketplaceError::NotFound("work item"))
    }

    /// Owner-only removal. Applications referencing the item are deleted
    /// with it.
    pub fn delete(&self, id: &WorkItemId, actor: &ActorId) -> Result<(), MarketplaceError> {
        let item = self
            .store
            .fetch_item(id)?
            .ok_or(MarketplaceError::NotFound("work item"))?;

        if item.owner.id != *actor {
            return Err(MarketplaceError::Authorization);
        }

        Ok(self.store.remove_item(id)?)
    }

    /// Posting broadcast is part of the non-critical notification path: a
    /// directory or sink failure is logged and the post still succeeds.
    fn broadcast(&self, item: &WorkItem) {
        let providers = match self.directory.providers() {
            Ok(providers) => providers,
            Err(err) => {
                warn!(error = %err, "posting broadcast skipped, directory unavailable");
                return;
            }
        };

        let message = format!("A new {} \"{}\" has been posted.", item.kind().label(), item.title);
        for provider in providers {
            notifications::deliver(
                self.notifications.as_ref(),
                provider.id,
                message.clone(),
                Some(NotificationContext::WorkItem(item.id.clone())),
            );
        }
    }
}

fn validate_draft(draft: &WorkItemDraft) -> Result<(), MarketplaceError> {
    if draft.title.trim().is_empty() {
        return Err(MarketplaceError::Validation("title is required".to_string()));
    }

    if let WorkItemDetail::Job {
        description,
        category,
        ..
    } = &draft.detail
    {
        if description.trim().is_empty() {
            return Err(MarketplaceError::Validation(
                "a job requires a description".to_string(),
            ));
        }
        if category.trim().is_empty() {
            return Err(MarketplaceError::Validation(
                "a job requires a category".to_string(),
            ));
        }
    }

    Ok(())
}

use super::domain::{
    ActorId, Application, ApplicationId, Engagement, EngagementId, WorkItem, WorkItemId,
};

/// Storage port for the marketplace. One trait rather than one per aggregate
/// because acceptance must commit the application flag, the item closure,
/// and the engagement insert inside a single transactional boundary; an
/// implementation backs all three tables with one unit of serialization.
pub trait MarketplaceRepository: Send + Sync {
    fn insert_item(&self, item: WorkItem) -> Result<WorkItem, RepositoryError>;
    fn fetch_item(&self, id: &WorkItemId) -> Result<Option<WorkItem>, RepositoryError>;
    /// Items still in Open status, newest first.
    fn open_items(&self) -> Result<Vec<WorkItem>, RepositoryError>;
    fn items_owned_by(&self, owner: &ActorId) -> Result<Vec<WorkItem>, RepositoryError>;
    /// Removes the item and cascades removal of every application that
    /// references it, so no reader ever dereferences a missing item.
    fn remove_item(&self, id: &WorkItemId) -> Result<(), RepositoryError>;

    /// Fails with `Conflict` when the (item, provider) pair already has an
    /// application.
    fn insert_application(&self, application: Application)
        -> Result<Application, RepositoryError>;
    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError>;
    fn applications_for_item(
        &self,
        item: &WorkItemId,
    ) -> Result<Vec<Application>, RepositoryError>;
    fn remove_application(&self, id: &ApplicationId) -> Result<(), RepositoryError>;
    fn has_accepted_application(&self, item: &WorkItemId) -> Result<bool, RepositoryError>;

    /// The acceptance transaction. Atomically re-validates that the
    /// application is still unaccepted and its item still Open, then flips
    /// the accepted flag, closes the item, and inserts the engagement.
    /// Fails with `Conflict` when a concurrent accept got there first.
    fn commit_acceptance(
        &self,
        application: &ApplicationId,
        engagement: Engagement,
    ) -> Result<Engagement, RepositoryError>;

    fn fetch_engagement(
        &self,
        id: &EngagementId,
    ) -> Result<Option<Engagement>, RepositoryError>;
    /// Replaces the stored engagement. Engagements are never deleted.
    fn update_engagement(&self, engagement: Engagement) -> Result<(), RepositoryError>;
    /// Engagements where the actor is either the owner or the provider,
    /// newest first.
    fn engagements_for_actor(&self, actor: &ActorId) -> Result<Vec<Engagement>, RepositoryError>;
    fn engagements_for_provider(
        &self,
        provider: &ActorId,
    ) -> Result<Vec<Engagement>, RepositoryError>;

    fn store_provider_score(&self, provider: &ActorId, score: f64)
        -> Result<(), RepositoryError>;
    fn provider_score(&self, provider: &ActorId) -> Result<Option<f64>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

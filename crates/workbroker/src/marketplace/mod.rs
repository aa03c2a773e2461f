//! Engagement brokerage: work item intake, the application ledger, the
//! engagement lifecycle engine, and the reputation aggregator, with the
//! identity directory, payment provider, and notification sink behind ports.

pub mod applications;
pub mod directory;
pub mod domain;
mod error;
pub mod engagements;
pub mod items;
pub mod memory;
pub mod notifications;
pub mod payments;
pub mod reputation;
pub mod repository;
pub mod router;

#[cfg(test)]
mod tests;

pub use applications::ApplicationService;
pub use directory::{ActorRecord, DirectoryError, IdentityDirectory};
pub use domain::{
    ActorId, ActorKind, ActorRef, Application, ApplicationId, Engagement, EngagementId,
    EngagementStatus, Notification, NotificationContext, NotificationId, PaymentMode,
    ProviderSnapshot, WorkItem, WorkItemDetail, WorkItemDraft, WorkItemId, WorkItemKind,
    WorkItemSource, WorkItemStatus,
};
pub use engagements::{ClientContinuation, CompletionOutcome, EngagementService};
pub use error::MarketplaceError;
pub use items::WorkItemService;
pub use notifications::{NotificationService, NotificationStore, NotifyError};
pub use payments::{IntentStatus, PaymentGateway, PaymentGatewayError, PaymentIntent};
pub use repository::{MarketplaceRepository, RepositoryError};
pub use router::{application_router, engagement_router, item_router, notification_router};

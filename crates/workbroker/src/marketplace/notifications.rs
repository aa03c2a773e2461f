use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use super::domain::{ActorId, Notification, NotificationContext, NotificationId};
use super::error::MarketplaceError;

/// Durable sink and inbox for lifecycle notifications. The persisted write
/// is the delivery; recipients read their inbox on demand.
pub trait NotificationStore: Send + Sync {
    fn persist(&self, notification: Notification) -> Result<(), NotifyError>;
    fn fetch(&self, id: &NotificationId) -> Result<Option<Notification>, NotifyError>;
    /// Notifications for one recipient, newest first.
    fn inbox(&self, recipient: &ActorId) -> Result<Vec<Notification>, NotifyError>;
    fn remove(&self, id: &NotificationId) -> Result<(), NotifyError>;
}

/// Notification persistence failure.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification store unavailable: {0}")]
    Unavailable(String),
}

static NOTIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_notification_id() -> NotificationId {
    let id = NOTIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    NotificationId(format!("note-{id:06}"))
}

/// Best-effort fan-out. A failed write must never roll back the state
/// transition that triggered it, so the failure is logged and swallowed.
pub(crate) fn deliver<N: NotificationStore>(
    store: &N,
    recipient: ActorId,
    message: String,
    context: Option<NotificationContext>,
) {
    let notification = Notification {
        id: next_notification_id(),
        recipient,
        message,
        context,
        created_at: Utc::now(),
    };

    if let Err(err) = store.persist(notification) {
        warn!(error = %err, "notification delivery failed, continuing");
    }
}

/// Read-side service over the notification store.
pub struct NotificationService<N> {
    store: Arc<N>,
}

impl<N> NotificationService<N>
where
    N: NotificationStore + 'static,
{
    pub fn new(store: Arc<N>) -> Self {
        Self { store }
    }

    pub fn inbox(&self, recipient: &ActorId) -> Result<Vec<Notification>, MarketplaceError> {
        Ok(self.store.inbox(recipient)?)
    }

    /// Recipient-only deletion.
    pub fn delete(
        &self,
        id: &NotificationId,
        actor: &ActorId,
    ) -> Result<(), MarketplaceError> {
        let notification = self
            .store
            .fetch(id)?
            .ok_or(MarketplaceError::NotFound("notification"))?;

        if notification.recipient != *actor {
            return Err(MarketplaceError::Authorization);
        }

        Ok(self.store.remove(id)?)
    }
}

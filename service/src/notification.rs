use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use uuid::Uuid;

use crate::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationEvent {
    BookingCreated,
    PaymentUploaded,
    BookingConfirmed,
    BookingRejected,
    BookingCancelled,
    BookingExpired,
    BookingCompleted,
    BookingNoShow,
}

/// Fire-and-forget notification sink. A failed delivery must never roll back
/// the state transition that triggered it; callers log and move on.
#[automock]
#[async_trait]
pub trait NotificationService {
    async fn notify(
        &self,
        user_id: &str,
        event: NotificationEvent,
        booking_id: Uuid,
    ) -> Result<(), ServiceError>;
}

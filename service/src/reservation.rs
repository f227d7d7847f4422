use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::booking::{Booking, BookingItem};
use crate::permission::Authentication;
use crate::ServiceError;

/// What a customer asks for: one or more slots at a single venue, reserved in
/// one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub venue_id: Uuid,
    pub items: Arc<[BookingItem]>,
}

/// The booking lifecycle orchestrator.
///
/// `create` must serialize the availability check and the insert per court so
/// that two racing requests for overlapping slots can never both succeed.
/// Every other operation transitions a single booking and re-checks its
/// current status before writing.
#[automock(type Context=();)]
#[async_trait]
pub trait ReservationService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Booking, ServiceError>;

    async fn get_for_current_user(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Booking]>, ServiceError>;

    /// The owner's review queue: all bookings of a venue, newest first.
    async fn get_for_venue(
        &self,
        venue_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Booking]>, ServiceError>;

    /// Creates a booking in PENDING_PAYMENT with a payment hold, after
    /// validating every requested slot against the availability index.
    async fn create(
        &self,
        request: &ReservationRequest,
        context: Authentication<Self::Context>,
    ) -> Result<Booking, ServiceError>;

    /// Attaches an already-stored payment proof URL while the hold is alive.
    /// A booking past its hold is expired on the spot and the caller must
    /// retry with a new booking.
    async fn upload_proof(
        &self,
        booking_id: Uuid,
        proof_url: Arc<str>,
        context: Authentication<Self::Context>,
    ) -> Result<Booking, ServiceError>;

    /// Owner approves the payment proof: PAYMENT_UPLOADED -> CONFIRMED.
    async fn accept(
        &self,
        booking_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Booking, ServiceError>;

    /// Owner turns the booking down with a non-blank reason, freeing its
    /// slots: PAYMENT_UPLOADED -> REJECTED.
    async fn reject(
        &self,
        booking_id: Uuid,
        reason: &str,
        context: Authentication<Self::Context>,
    ) -> Result<Booking, ServiceError>;

    /// The booking's user withdraws while not yet decided, freeing the slots.
    async fn cancel(
        &self,
        booking_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Booking, ServiceError>;

    /// Owner flags a fully-elapsed CONFIRMED booking the customer never showed
    /// up for.
    async fn mark_no_show(
        &self,
        booking_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Booking, ServiceError>;

    /// Expires every unpaid booking whose hold lapsed before `now`. Failures
    /// on individual bookings are logged and skipped. Returns the number of
    /// bookings expired. Idempotent.
    async fn sweep_expirations(
        &self,
        now: PrimitiveDateTime,
        context: Authentication<Self::Context>,
    ) -> Result<u32, ServiceError>;

    /// Completes every CONFIRMED booking whose slots fully elapsed before
    /// `now`. Returns the number of bookings completed. Idempotent.
    async fn mark_completed(
        &self,
        now: PrimitiveDateTime,
        context: Authentication<Self::Context>,
    ) -> Result<u32, ServiceError>;
}

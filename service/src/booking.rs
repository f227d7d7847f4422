use std::fmt::{Display, Formatter};
use std::sync::Arc;

use courtly_utils::TimeRange;
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::owner_directory::BankInfo;
use crate::{ServiceError, ValidationFailureItem};

/// The booking lifecycle.
///
/// ```text
/// PENDING_PAYMENT -> PAYMENT_UPLOADED -> { CONFIRMED, REJECTED }
/// { PENDING_PAYMENT, PAYMENT_UPLOADED } -> EXPIRED | CANCELLED
/// CONFIRMED -> COMPLETED | NO_SHOW
/// ```
///
/// REJECTED, CANCELLED, EXPIRED, COMPLETED and NO_SHOW are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    PendingPayment,
    PaymentUploaded,
    Confirmed,
    Rejected,
    Cancelled,
    Expired,
    Completed,
    NoShow,
}

impl BookingStatus {
    /// A blocking booking still reserves its slots, preventing a double-sell
    /// during the payment window.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            Self::PendingPayment | Self::PaymentUploaded | Self::Confirmed
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::Cancelled | Self::Expired | Self::Completed | Self::NoShow
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayment => "PENDING_PAYMENT",
            Self::PaymentUploaded => "PAYMENT_UPLOADED",
            Self::Confirmed => "CONFIRMED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
            Self::Completed => "COMPLETED",
            Self::NoShow => "NO_SHOW",
        }
    }

    /// Upstream status strings outside the enumeration are a hard validation
    /// error, never coerced to a default.
    pub fn try_from_str(raw: &str) -> Result<Self, ServiceError> {
        match raw {
            "PENDING_PAYMENT" => Ok(Self::PendingPayment),
            "PAYMENT_UPLOADED" => Ok(Self::PaymentUploaded),
            "CONFIRMED" => Ok(Self::Confirmed),
            "REJECTED" => Ok(Self::Rejected),
            "CANCELLED" => Ok(Self::Cancelled),
            "EXPIRED" => Ok(Self::Expired),
            "COMPLETED" => Ok(Self::Completed),
            "NO_SHOW" => Ok(Self::NoShow),
            _ => Err(ServiceError::ValidationError(
                [ValidationFailureItem::InvalidValue("status".into())].into(),
            )),
        }
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<dao::booking::BookingStatusEntity> for BookingStatus {
    fn from(status: dao::booking::BookingStatusEntity) -> Self {
        match status {
            dao::booking::BookingStatusEntity::PendingPayment => Self::PendingPayment,
            dao::booking::BookingStatusEntity::PaymentUploaded => Self::PaymentUploaded,
            dao::booking::BookingStatusEntity::Confirmed => Self::Confirmed,
            dao::booking::BookingStatusEntity::Rejected => Self::Rejected,
            dao::booking::BookingStatusEntity::Cancelled => Self::Cancelled,
            dao::booking::BookingStatusEntity::Expired => Self::Expired,
            dao::booking::BookingStatusEntity::Completed => Self::Completed,
            dao::booking::BookingStatusEntity::NoShow => Self::NoShow,
        }
    }
}
impl From<BookingStatus> for dao::booking::BookingStatusEntity {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::PendingPayment => Self::PendingPayment,
            BookingStatus::PaymentUploaded => Self::PaymentUploaded,
            BookingStatus::Confirmed => Self::Confirmed,
            BookingStatus::Rejected => Self::Rejected,
            BookingStatus::Cancelled => Self::Cancelled,
            BookingStatus::Expired => Self::Expired,
            BookingStatus::Completed => Self::Completed,
            BookingStatus::NoShow => Self::NoShow,
        }
    }
}

/// One reserved slot inside a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingItem {
    pub court_id: Uuid,
    pub range: TimeRange,
    pub price_minor: i64,
}
impl TryFrom<&dao::booking::BookingItemEntity> for BookingItem {
    type Error = ServiceError;
    fn try_from(item: &dao::booking::BookingItemEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            court_id: item.court_id,
            range: TimeRange::new(item.start, item.end)?,
            price_minor: item.price_minor,
        })
    }
}
impl From<&BookingItem> for dao::booking::BookingItemEntity {
    fn from(item: &BookingItem) -> Self {
        Self {
            court_id: item.court_id,
            start: item.range.start(),
            end: item.range.end(),
            price_minor: item.price_minor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Arc<str>,
    pub venue_id: Uuid,
    pub items: Arc<[BookingItem]>,
    pub status: BookingStatus,
    pub created: Option<PrimitiveDateTime>,
    pub expire_time: Option<PrimitiveDateTime>,
    pub payment_proof_url: Option<Arc<str>>,
    pub payment_proof_uploaded_at: Option<PrimitiveDateTime>,
    pub rejection_reason: Option<Arc<str>>,
    /// The owner's bank details as they were when the booking was created.
    /// Later changes to the owner's bank info never alter a pending booking's
    /// payment target.
    pub owner_bank: BankInfo,
    pub version: Uuid,
}

impl Booking {
    /// Always derived from the items, so price conservation holds across every
    /// state transition.
    pub fn total_price_minor(&self) -> i64 {
        self.items.iter().map(|item| item.price_minor).sum()
    }

    /// End of the latest item, the moment after which the booking can be
    /// completed or flagged as no-show.
    pub fn last_item_end(&self) -> Option<PrimitiveDateTime> {
        self.items.iter().map(|item| item.range.end()).max()
    }
}

impl TryFrom<&dao::booking::BookingEntity> for Booking {
    type Error = ServiceError;
    fn try_from(booking: &dao::booking::BookingEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: booking.id,
            user_id: booking.user_id.clone(),
            venue_id: booking.venue_id,
            items: booking
                .items
                .iter()
                .map(BookingItem::try_from)
                .collect::<Result<_, _>>()?,
            status: booking.status.into(),
            created: Some(booking.created),
            expire_time: booking.expire_time,
            payment_proof_url: booking.payment_proof_url.clone(),
            payment_proof_uploaded_at: booking.payment_proof_uploaded_at,
            rejection_reason: booking.rejection_reason.clone(),
            owner_bank: BankInfo {
                bank_name: booking.bank_name.clone(),
                account_number: booking.account_number.clone(),
                account_holder_name: booking.account_holder_name.clone(),
            },
            version: booking.version,
        })
    }
}

impl TryFrom<&Booking> for dao::booking::BookingEntity {
    type Error = ServiceError;
    fn try_from(booking: &Booking) -> Result<Self, Self::Error> {
        Ok(Self {
            id: booking.id,
            user_id: booking.user_id.clone(),
            venue_id: booking.venue_id,
            items: booking
                .items
                .iter()
                .map(dao::booking::BookingItemEntity::from)
                .collect(),
            status: booking.status.into(),
            created: booking.created.ok_or(ServiceError::InternalError)?,
            expire_time: booking.expire_time,
            payment_proof_url: booking.payment_proof_url.clone(),
            payment_proof_uploaded_at: booking.payment_proof_uploaded_at,
            rejection_reason: booking.rejection_reason.clone(),
            bank_name: booking.owner_bank.bank_name.clone(),
            account_number: booking.owner_bank.account_number.clone(),
            account_holder_name: booking.owner_bank.account_holder_name.clone(),
            version: booking.version,
        })
    }
}

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::booking::Booking;
use crate::models::driver::{Driver, GeoPoint};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence capability for drivers and bookings: point lookups plus the
/// conditional updates the acceptance saga coordinates through.
///
/// The conditional updates return `Ok(None)` when nothing matched, without
/// distinguishing "absent" from "guard failed"; callers that need a friendly
/// error fetch first and treat the conditional write as the authority.
#[async_trait]
pub trait DispatchStore: Send + Sync {
    async fn insert_driver(&self, driver: Driver) -> Result<(), StoreError>;

    async fn driver(&self, id: Uuid) -> Result<Option<Driver>, StoreError>;

    async fn driver_by_email(&self, email: &str) -> Result<Option<Driver>, StoreError>;

    async fn update_driver_location(
        &self,
        id: Uuid,
        location: GeoPoint,
    ) -> Result<Option<Driver>, StoreError>;

    /// Conditional update: move the driver to en-route/unavailable, but only
    /// if `is_available` is still true at the moment of the write.
    async fn reserve_driver(&self, id: Uuid) -> Result<Option<Driver>, StoreError>;

    /// Unconditional revert to idle/available. Idempotent, safe to retry.
    async fn release_driver(&self, id: Uuid) -> Result<Option<Driver>, StoreError>;

    async fn insert_booking(&self, booking: Booking) -> Result<(), StoreError>;

    async fn booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;

    /// Conditional update: mark the booking accepted by `driver_id`, but only
    /// if its status is still `Pending` at the moment of the write.
    async fn assign_booking(
        &self,
        id: Uuid,
        driver_id: Uuid,
    ) -> Result<Option<Booking>, StoreError>;

    async fn pending_bookings(&self) -> Result<Vec<Booking>, StoreError>;

    async fn driver_count(&self) -> Result<usize, StoreError>;

    async fn booking_count(&self) -> Result<usize, StoreError>;
}

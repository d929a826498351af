use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::booking::{Booking, BookingStatus};
use crate::models::driver::{Driver, DriverStatus, GeoPoint};
use crate::store::{DispatchStore, StoreError};

/// In-memory store. DashMap's per-entry locking makes each conditional
/// update atomic: the guard is checked and the fields are written while the
/// entry lock is held.
#[derive(Default)]
pub struct MemoryStore {
    drivers: DashMap<Uuid, Driver>,
    bookings: DashMap<Uuid, Booking>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DispatchStore for MemoryStore {
    async fn insert_driver(&self, driver: Driver) -> Result<(), StoreError> {
        self.drivers.insert(driver.id, driver);
        Ok(())
    }

    async fn driver(&self, id: Uuid) -> Result<Option<Driver>, StoreError> {
        Ok(self.drivers.get(&id).map(|entry| entry.value().clone()))
    }

    async fn driver_by_email(&self, email: &str) -> Result<Option<Driver>, StoreError> {
        Ok(self
            .drivers
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn update_driver_location(
        &self,
        id: Uuid,
        location: GeoPoint,
    ) -> Result<Option<Driver>, StoreError> {
        let Some(mut driver) = self.drivers.get_mut(&id) else {
            return Ok(None);
        };

        driver.location = location;
        driver.updated_at = Utc::now();

        Ok(Some(driver.clone()))
    }

    async fn reserve_driver(&self, id: Uuid) -> Result<Option<Driver>, StoreError> {
        let Some(mut driver) = self.drivers.get_mut(&id) else {
            return Ok(None);
        };

        if !driver.is_available {
            return Ok(None);
        }

        driver.is_available = false;
        driver.status = DriverStatus::EnRoute;
        driver.updated_at = Utc::now();

        Ok(Some(driver.clone()))
    }

    async fn release_driver(&self, id: Uuid) -> Result<Option<Driver>, StoreError> {
        let Some(mut driver) = self.drivers.get_mut(&id) else {
            return Ok(None);
        };

        driver.is_available = true;
        driver.status = DriverStatus::Idle;
        driver.updated_at = Utc::now();

        Ok(Some(driver.clone()))
    }

    async fn insert_booking(&self, booking: Booking) -> Result<(), StoreError> {
        self.bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        Ok(self.bookings.get(&id).map(|entry| entry.value().clone()))
    }

    async fn assign_booking(
        &self,
        id: Uuid,
        driver_id: Uuid,
    ) -> Result<Option<Booking>, StoreError> {
        let Some(mut booking) = self.bookings.get_mut(&id) else {
            return Ok(None);
        };

        if booking.status != BookingStatus::Pending {
            return Ok(None);
        }

        booking.status = BookingStatus::Accepted;
        booking.driver_id = Some(driver_id);

        Ok(Some(booking.clone()))
    }

    async fn pending_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .bookings
            .iter()
            .filter(|entry| entry.value().status == BookingStatus::Pending)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn driver_count(&self) -> Result<usize, StoreError> {
        Ok(self.drivers.len())
    }

    async fn booking_count(&self) -> Result<usize, StoreError> {
        Ok(self.bookings.len())
    }
}

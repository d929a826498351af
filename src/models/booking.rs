use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::driver::GeoPoint;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum BookingStatus {
    Pending,
    Accepted,
    InTransit,
    Completed,
    Cancelled,
}

/// Invariant: `driver_id` is set if and only if the booking has reached
/// `Accepted`. A booking is assigned exactly once, by the acceptance saga.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub status: BookingStatus,
    pub driver_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum DriverStatus {
    Idle,
    EnRoute,
    Offline,
}

/// Invariant: `status == EnRoute` implies `is_available == false`. The pair
/// only changes together, through the store's dispatch-state operations.
#[derive(Debug, Clone, Serialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub location: GeoPoint,
    pub is_available: bool,
    pub status: DriverStatus,
    pub updated_at: DateTime<Utc>,
}

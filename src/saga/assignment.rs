//! Booking assignment saga.
//!
//! Moves one pending booking and one available driver into a mutually
//! consistent assigned state, or leaves both unchanged. There is no
//! multi-document transaction underneath: each mutation is a single
//! conditional write guarded by the field whose staleness would make it
//! unsafe, and a failed later step undoes the earlier one with an
//! idempotent compensation write.
//!
//! Steps, in order:
//! 1. `reserve_driver`: CAS on `is_available`. A no-match loses the race
//!    and nothing has changed, so there is nothing to compensate.
//! 2. `load_booking`: plain fetch, so "not found" and "already claimed"
//!    can be told apart in the response. Any failure rolls back step 1.
//! 3. `assign_booking`: CAS on `Pending` status. A no-match means another
//!    driver claimed the booking between steps 2 and 3, and rolls back
//!    step 1.

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::booking::{Booking, BookingStatus};
use crate::models::driver::Driver;
use crate::store::DispatchStore;

pub const STEP_RESERVE_DRIVER: &str = "reserve_driver";
pub const STEP_LOAD_BOOKING: &str = "load_booking";
pub const STEP_ASSIGN_BOOKING: &str = "assign_booking";

/// Post-update snapshots of both entities after a successful acceptance.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptOutcome {
    pub driver: Driver,
    pub booking: Booking,
}

/// Accepts `booking_id` on behalf of `caller`, the verified driver id.
///
/// Every failure mode maps to exactly one error kind: absent driver or
/// booking is `NotFound`, a busy driver or a lost race is `Conflict`, and a
/// failed rollback is `CompensationFailed` carrying the stranded driver id.
pub async fn accept_job(
    store: &dyn DispatchStore,
    caller: Uuid,
    booking_id: Uuid,
) -> Result<AcceptOutcome, AppError> {
    let driver = store
        .driver(caller)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("driver {caller} not found")))?;

    if !driver.is_available {
        return Err(AppError::Conflict(format!(
            "driver {caller} already has an active job"
        )));
    }

    let reserved = store.reserve_driver(caller).await?.ok_or_else(|| {
        // Lost a race against another acceptance by the same driver.
        AppError::Conflict(format!("driver {caller} already has an active job"))
    })?;
    info!(step = STEP_RESERVE_DRIVER, driver_id = %caller, "driver reserved");

    // From here on, every failure must undo the reservation.
    let booking = match load_pending_booking(store, booking_id).await {
        Ok(booking) => booking,
        Err(trigger) => return Err(compensate(store, caller, trigger).await),
    };
    info!(step = STEP_LOAD_BOOKING, booking_id = %booking_id, "booking is pending");

    let assigned = match store.assign_booking(booking.id, caller).await {
        Ok(Some(booking)) => booking,
        Ok(None) => {
            // Another driver claimed the booking between fetch and write.
            let trigger =
                AppError::Conflict(format!("booking {booking_id} was claimed by another driver"));
            return Err(compensate(store, caller, trigger).await);
        }
        Err(err) => return Err(compensate(store, caller, err.into()).await),
    };
    info!(
        step = STEP_ASSIGN_BOOKING,
        booking_id = %booking_id,
        driver_id = %caller,
        "booking assigned"
    );

    Ok(AcceptOutcome {
        driver: reserved,
        booking: assigned,
    })
}

async fn load_pending_booking(
    store: &dyn DispatchStore,
    booking_id: Uuid,
) -> Result<Booking, AppError> {
    let booking = store
        .booking(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id} not found")))?;

    if booking.status != BookingStatus::Pending {
        return Err(AppError::Conflict(format!(
            "booking {booking_id} is no longer pending"
        )));
    }

    Ok(booking)
}

/// Rolls the driver back to idle/available and returns the error to report:
/// the triggering error when the rollback succeeded, `CompensationFailed`
/// when it did not. The release write sets known-good values
/// unconditionally, so retrying it is always safe.
async fn compensate(store: &dyn DispatchStore, driver_id: Uuid, trigger: AppError) -> AppError {
    match store.release_driver(driver_id).await {
        Ok(Some(_)) => {
            warn!(driver_id = %driver_id, trigger = %trigger, "driver reservation rolled back");
            trigger
        }
        Ok(None) => {
            error!(driver_id = %driver_id, trigger = %trigger, "driver vanished during rollback");
            AppError::CompensationFailed {
                driver_id,
                reason: "driver no longer exists".to_string(),
            }
        }
        Err(err) => {
            error!(driver_id = %driver_id, trigger = %trigger, error = %err, "rollback write failed");
            AppError::CompensationFailed {
                driver_id,
                reason: err.to_string(),
            }
        }
    }
}

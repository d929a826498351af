use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthDriver;
use crate::error::AppError;
use crate::models::booking::{Booking, BookingStatus};
use crate::models::driver::GeoPoint;
use crate::saga::{accept_job, AcceptOutcome};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/pending", get(list_pending))
        .route("/bookings/:id", get(get_booking))
        .route("/bookings/:id/accept", post(accept))
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    if !payload.pickup.is_valid() || !payload.dropoff.is_valid() {
        return Err(AppError::InvalidInput(
            "pickup and dropoff must be valid coordinates".to_string(),
        ));
    }

    let booking = Booking {
        id: Uuid::new_v4(),
        pickup: payload.pickup,
        dropoff: payload.dropoff,
        status: BookingStatus::Pending,
        driver_id: None,
        created_at: Utc::now(),
    };

    state.store.insert_booking(booking.clone()).await?;
    tracing::info!(booking_id = %booking.id, "booking created");

    Ok(Json(booking))
}

async fn get_booking(
    State(state): State<Arc<AppState>>,
    AuthDriver(_): AuthDriver,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .store
        .booking(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {id} not found")))?;

    Ok(Json(booking))
}

async fn list_pending(
    State(state): State<Arc<AppState>>,
    AuthDriver(_): AuthDriver,
) -> Result<Json<Vec<Booking>>, AppError> {
    let pending = state.store.pending_bookings().await?;
    Ok(Json(pending))
}

async fn accept(
    State(state): State<Arc<AppState>>,
    AuthDriver(driver_id): AuthDriver,
    Path(id): Path<Uuid>,
) -> Result<Json<AcceptOutcome>, AppError> {
    let start = Instant::now();
    let result = accept_job(state.store.as_ref(), driver_id, id).await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(AppError::Conflict(_)) => "conflict",
        Err(AppError::NotFound(_)) => "not_found",
        Err(AppError::CompensationFailed { .. }) => "compensation_failed",
        Err(_) => "error",
    };

    state
        .metrics
        .accept_latency_seconds
        .with_label_values(&[outcome])
        .observe(start.elapsed().as_secs_f64());
    state
        .metrics
        .accepts_total
        .with_label_values(&[outcome])
        .inc();

    if let Err(AppError::CompensationFailed { .. }) = &result {
        state.metrics.compensation_failures_total.inc();
    }

    result.map(Json)
}

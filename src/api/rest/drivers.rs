use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{password, AuthDriver};
use crate::error::AppError;
use crate::models::driver::{Driver, DriverStatus, GeoPoint};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers/register", post(register))
        .route("/drivers/login", post(login))
        .route("/drivers/me", get(me))
        .route("/drivers/location", patch(update_location))
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub location: GeoPoint,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub driver: Driver,
    pub token: String,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("name cannot be empty".to_string()));
    }

    if !payload.email.contains('@') {
        return Err(AppError::InvalidInput(
            "email must be a valid address".to_string(),
        ));
    }

    if state.store.driver_by_email(&payload.email).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "driver with email {} already exists",
            payload.email
        )));
    }

    let password_hash = password::hash(payload.password, state.bcrypt_cost)?;

    let driver = Driver {
        id: Uuid::new_v4(),
        name: payload.name,
        email: payload.email,
        password_hash,
        location: state.default_location,
        is_available: true,
        status: DriverStatus::Idle,
        updated_at: Utc::now(),
    };

    state.store.insert_driver(driver.clone()).await?;
    state.metrics.registered_drivers.inc();

    let token = state.auth.issue(driver.id)?;
    tracing::info!(driver_id = %driver.id, "driver registered");

    Ok(Json(AuthResponse { driver, token }))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    // Missing account and wrong password answer identically.
    let driver = state
        .store
        .driver_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid credentials".to_string()))?;

    if !password::verify(&payload.password, &driver.password_hash)? {
        return Err(AppError::Unauthorized("invalid credentials".to_string()));
    }

    let token = state.auth.issue(driver.id)?;
    tracing::info!(driver_id = %driver.id, "driver logged in");

    Ok(Json(AuthResponse { driver, token }))
}

async fn me(
    State(state): State<Arc<AppState>>,
    AuthDriver(driver_id): AuthDriver,
) -> Result<Json<Driver>, AppError> {
    let driver = state
        .store
        .driver(driver_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("driver {driver_id} not found")))?;

    Ok(Json(driver))
}

async fn update_location(
    State(state): State<Arc<AppState>>,
    AuthDriver(driver_id): AuthDriver,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<Driver>, AppError> {
    if !payload.location.is_valid() {
        return Err(AppError::InvalidInput(
            "location out of range: lat must be in [-90, 90], lng in [-180, 180]".to_string(),
        ));
    }

    let driver = state
        .store
        .update_driver_location(driver_id, payload.location)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("driver {driver_id} not found")))?;

    Ok(Json(driver))
}

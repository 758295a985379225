use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{DroneSubmission, DroneView};
use crate::routes::{AppJson, CurrentAccount};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DeleteDroneResponse {
    pub success: bool,
}

/// Add a drone to the caller's catalog
pub async fn create_drone(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
    AppJson(payload): AppJson<DroneSubmission>,
) -> Result<(StatusCode, Json<DroneView>)> {
    let attributes = payload.into_attributes()?;
    let drone = state.drones.create(&account, attributes).await?;

    Ok((StatusCode::CREATED, Json(drone.to_public_view())))
}

/// List the caller's drones
pub async fn list_drones(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
) -> Result<Json<Vec<DroneView>>> {
    let drones = state.drones.list_for_owner(&account).await?;

    Ok(Json(drones.iter().map(|d| d.to_public_view()).collect()))
}

/// Fetch one of the caller's drones
///
/// Drones owned by someone else are answered with 403.
pub async fn get_drone(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
    Path(id): Path<String>,
) -> Result<Json<DroneView>> {
    let drone = state.drones.get(&id).await?;
    if drone.owner_id != account.id {
        tracing::warn!("Account {} attempted to read drone {}", account.id, id);
        return Err(AppError::PermissionDenied);
    }

    Ok(Json(drone.to_public_view()))
}

/// Replace a drone's attributes
pub async fn update_drone(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
    Path(id): Path<String>,
    AppJson(payload): AppJson<DroneSubmission>,
) -> Result<Json<DroneView>> {
    let attributes = payload.into_attributes()?;
    let drone = state.drones.update(&id, &account, attributes).await?;

    Ok(Json(drone.to_public_view()))
}

pub async fn delete_drone(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
    Path(id): Path<String>,
) -> Result<Json<DeleteDroneResponse>> {
    state.drones.delete(&id, &account).await?;

    Ok(Json(DeleteDroneResponse { success: true }))
}

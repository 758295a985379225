//! Ownership Registry
//!
//! Drone records, each tied to exactly one account. Ownership is keyed on
//! the owner's immutable account id, so rotating a token never orphans
//! records.

use chrono::Utc;
use sqlx::SqliteExecutor;

use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::{Account, Drone, DroneAttributes, DroneRow, DroneView};
use crate::security::generate_drone_id;

const DRONE_COLUMNS: &str = "id, name, description, price, cam_quality, flight_time, max_speed, \
                             dimensions, weight, cost_of_prod, series, owner_id, created_at";

#[derive(Clone)]
pub struct DroneRegistry {
    db: Db,
}

impl DroneRegistry {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Create a drone owned by `owner`
    pub async fn create(&self, owner: &Account, attributes: DroneAttributes) -> Result<Drone> {
        attributes.validate()?;
        let attributes = attributes.at_money_scale();

        let drone = Drone {
            id: generate_drone_id(),
            owner_id: owner.id.clone(),
            created_at: Utc::now(),
            attributes,
        };
        let a = &drone.attributes;

        sqlx::query(
            "INSERT INTO drones (id, name, description, price, cam_quality, flight_time, \
             max_speed, dimensions, weight, cost_of_prod, series, owner_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&drone.id)
        .bind(&a.name)
        .bind(&a.description)
        .bind(a.price.to_string())
        .bind(&a.cam_quality)
        .bind(&a.flight_time)
        .bind(&a.max_speed)
        .bind(&a.dimensions)
        .bind(&a.weight)
        .bind(a.cost_of_prod.map(|d| d.to_string()))
        .bind(&a.series)
        .bind(&drone.owner_id)
        .bind(drone.created_at)
        .execute(&self.db)
        .await?;

        tracing::info!("Drone {} created for account {}", drone.id, owner.id);
        Ok(drone)
    }

    /// All drones owned by `owner`, in insertion order
    pub async fn list_for_owner(&self, owner: &Account) -> Result<Vec<Drone>> {
        let rows = sqlx::query_as::<_, DroneRow>(&format!(
            "SELECT {DRONE_COLUMNS} FROM drones WHERE owner_id = ? ORDER BY rowid"
        ))
        .bind(&owner.id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Drone::try_from).collect()
    }

    pub async fn get(&self, id: &str) -> Result<Drone> {
        fetch_drone(&self.db, id).await
    }

    /// Replace a drone's attributes; only its owner may do so
    ///
    /// The ownership check and the write are one statement.
    pub async fn update(
        &self,
        id: &str,
        owner: &Account,
        attributes: DroneAttributes,
    ) -> Result<Drone> {
        attributes.validate()?;
        let a = attributes.at_money_scale();

        let row = sqlx::query_as::<_, DroneRow>(&format!(
            "UPDATE drones SET name = ?, description = ?, price = ?, cam_quality = ?, \
             flight_time = ?, max_speed = ?, dimensions = ?, weight = ?, cost_of_prod = ?, \
             series = ? WHERE id = ? AND owner_id = ? RETURNING {DRONE_COLUMNS}"
        ))
        .bind(&a.name)
        .bind(&a.description)
        .bind(a.price.to_string())
        .bind(&a.cam_quality)
        .bind(&a.flight_time)
        .bind(&a.max_speed)
        .bind(&a.dimensions)
        .bind(&a.weight)
        .bind(a.cost_of_prod.map(|d| d.to_string()))
        .bind(&a.series)
        .bind(id)
        .bind(&owner.id)
        .fetch_optional(&self.db)
        .await?;

        let Some(row) = row else {
            return Err(self.explain_miss(id, owner).await);
        };

        tracing::info!("Drone {} updated by account {}", id, owner.id);
        Drone::try_from(row)
    }

    /// Delete a drone; only its owner may do so
    pub async fn delete(&self, id: &str, owner: &Account) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM drones WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(&owner.id)
            .execute(&self.db)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(self.explain_miss(id, owner).await);
        }

        tracing::info!("Drone {} deleted by account {}", id, owner.id);
        Ok(())
    }

    /// Why a write scoped to `owner` touched no row
    async fn explain_miss(&self, id: &str, owner: &Account) -> AppError {
        match fetch_drone(&self.db, id).await {
            Ok(existing) => match ensure_owner(&existing, owner) {
                Err(e) => e,
                Ok(()) => AppError::DroneNotFound,
            },
            Err(e) => e,
        }
    }

    /// Serializable projection without owner details
    pub fn to_public_view(record: &Drone) -> DroneView {
        record.to_public_view()
    }
}

async fn fetch_drone<'e, E: SqliteExecutor<'e>>(executor: E, id: &str) -> Result<Drone> {
    let row = sqlx::query_as::<_, DroneRow>(&format!(
        "SELECT {DRONE_COLUMNS} FROM drones WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or(AppError::DroneNotFound)?;

    Drone::try_from(row)
}

fn ensure_owner(drone: &Drone, owner: &Account) -> Result<()> {
    if drone.owner_id != owner.id {
        tracing::warn!(
            "Account {} attempted to modify drone {} it does not own",
            owner.id,
            drone.id
        );
        return Err(AppError::PermissionDenied);
    }
    Ok(())
}

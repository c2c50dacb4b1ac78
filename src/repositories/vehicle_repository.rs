use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::dto::vehicle_dto::{CreateTruckRequest, UpdateTruckRequest, VehicleInput, VehiclePatch};
use crate::models::vehicle::{Truck, Vehicle};
use crate::utils::errors::{in_use_as_conflict, not_found_error, unique_as_conflict, AppResult};

pub const DUPLICATE_PLATE_MESSAGE: &str = "Já existe um veículo com essa placa";
pub const TRUCK_NOT_FOUND_MESSAGE: &str = "Cavalo não encontrado";

/// Consultas comunes a todos los vehículos (cavalos y carretas)
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn plate_taken(&self, license_plate: &str, excluding: Option<i32>) -> AppResult<bool>;
}

#[async_trait]
pub trait TruckRepository: Send + Sync {
    async fn create(&self, request: &CreateTruckRequest) -> AppResult<Truck>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Truck>>;
    async fn list_all(&self) -> AppResult<Vec<Truck>>;
    async fn update(&self, id: i32, request: &UpdateTruckRequest) -> AppResult<Truck>;
    async fn delete(&self, id: i32) -> AppResult<()>;
}

/// Columnas de vehicles con alias estables para flatten
pub(crate) const VEHICLE_COLUMNS: &str = "v.id AS vehicle_id, v.license_plate, v.brand, \
    v.model, v.year, v.renavam, v.axle, v.unit_id";

#[derive(Debug, FromRow)]
pub(crate) struct VehicleRow {
    vehicle_id: i32,
    license_plate: String,
    brand: Option<String>,
    model: Option<String>,
    year: Option<String>,
    renavam: Option<String>,
    axle: Option<i32>,
    unit_id: Option<i32>,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Self {
            id: row.vehicle_id,
            license_plate: row.license_plate,
            brand: row.brand,
            model: row.model,
            year: row.year,
            renavam: row.renavam,
            axle: row.axle,
            unit_id: row.unit_id,
        }
    }
}

#[derive(Debug, FromRow)]
struct TruckRow {
    id: i32,
    compressor: bool,
    created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    vehicle: VehicleRow,
}

impl From<TruckRow> for Truck {
    fn from(row: TruckRow) -> Self {
        Self {
            id: row.id,
            compressor: row.compressor,
            vehicle: Vehicle::from(row.vehicle),
            created_at: row.created_at,
        }
    }
}

pub(crate) async fn insert_vehicle(conn: &mut PgConnection, vehicle: &VehicleInput) -> AppResult<i32> {
    let (id,): (i32,) = sqlx::query_as(
        r#"
        INSERT INTO vehicles (license_plate, brand, model, year, renavam, axle, unit_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(&vehicle.license_plate)
    .bind(&vehicle.brand)
    .bind(&vehicle.model)
    .bind(&vehicle.year)
    .bind(&vehicle.renavam)
    .bind(vehicle.axle)
    .bind(vehicle.unit_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(unique_as_conflict(DUPLICATE_PLATE_MESSAGE))?;

    Ok(id)
}

pub(crate) async fn patch_vehicle(
    conn: &mut PgConnection,
    vehicle_id: i32,
    patch: &VehiclePatch,
) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE vehicles
        SET license_plate = COALESCE($2, license_plate),
            brand = COALESCE($3, brand),
            model = COALESCE($4, model),
            year = COALESCE($5, year),
            renavam = COALESCE($6, renavam),
            axle = COALESCE($7, axle),
            unit_id = COALESCE($8, unit_id)
        WHERE id = $1
        "#,
    )
    .bind(vehicle_id)
    .bind(&patch.license_plate)
    .bind(&patch.brand)
    .bind(&patch.model)
    .bind(&patch.year)
    .bind(&patch.renavam)
    .bind(patch.axle)
    .bind(patch.unit_id)
    .execute(&mut *conn)
    .await
    .map_err(unique_as_conflict(DUPLICATE_PLATE_MESSAGE))?;

    Ok(())
}

async fn fetch_truck(conn: &mut PgConnection, id: i32) -> AppResult<Option<Truck>> {
    let sql = format!(
        "SELECT t.id, t.compressor, t.created_at, {VEHICLE_COLUMNS} \
         FROM trucks t JOIN vehicles v ON v.id = t.vehicle_id WHERE t.id = $1"
    );
    let row = sqlx::query_as::<_, TruckRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(Truck::from))
}

pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    async fn plate_taken(&self, license_plate: &str, excluding: Option<i32>) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM vehicles WHERE license_plate = $1 AND ($2::int IS NULL OR id <> $2))",
        )
        .bind(license_plate)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }
}

pub struct PgTruckRepository {
    pool: PgPool,
}

impl PgTruckRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TruckRepository for PgTruckRepository {
    async fn create(&self, request: &CreateTruckRequest) -> AppResult<Truck> {
        let mut tx = self.pool.begin().await?;

        let vehicle_id = insert_vehicle(&mut tx, &request.vehicle).await?;
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO trucks (vehicle_id, compressor) VALUES ($1, $2) RETURNING id",
        )
        .bind(vehicle_id)
        .bind(request.compressor)
        .fetch_one(&mut *tx)
        .await?;

        let truck = fetch_truck(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error(TRUCK_NOT_FOUND_MESSAGE))?;
        tx.commit().await?;

        Ok(truck)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Truck>> {
        let mut conn = self.pool.acquire().await?;
        fetch_truck(&mut conn, id).await
    }

    async fn list_all(&self) -> AppResult<Vec<Truck>> {
        let sql = format!(
            "SELECT t.id, t.compressor, t.created_at, {VEHICLE_COLUMNS} \
             FROM trucks t JOIN vehicles v ON v.id = t.vehicle_id ORDER BY v.license_plate"
        );
        let rows = sqlx::query_as::<_, TruckRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Truck::from).collect())
    }

    async fn update(&self, id: i32, request: &UpdateTruckRequest) -> AppResult<Truck> {
        let mut tx = self.pool.begin().await?;

        let current = fetch_truck(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error(TRUCK_NOT_FOUND_MESSAGE))?;

        if let Some(vehicle) = &request.vehicle {
            patch_vehicle(&mut tx, current.vehicle.id, vehicle).await?;
        }

        if let Some(compressor) = request.compressor {
            sqlx::query("UPDATE trucks SET compressor = $2 WHERE id = $1")
                .bind(id)
                .bind(compressor)
                .execute(&mut *tx)
                .await?;
        }

        let truck = fetch_truck(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error(TRUCK_NOT_FOUND_MESSAGE))?;
        tx.commit().await?;

        Ok(truck)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        // trucks cae en cascada con vehicles
        let result = sqlx::query(
            "DELETE FROM vehicles WHERE id = (SELECT vehicle_id FROM trucks WHERE id = $1)",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(in_use_as_conflict)?;

        if result.rows_affected() == 0 {
            return Err(not_found_error(TRUCK_NOT_FOUND_MESSAGE));
        }

        Ok(())
    }
}

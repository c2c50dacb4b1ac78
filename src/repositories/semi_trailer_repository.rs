use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};

use super::vehicle_repository::{insert_vehicle, VehicleRow, VEHICLE_COLUMNS};
use crate::dto::vehicle_dto::{CreateSemiTrailerRequest, UpdateSemiTrailerRequest};
use crate::models::vehicle::{Cargo, SemiTrailer, Trailer, TrailerConfiguration, Vehicle};
use crate::utils::errors::{in_use_as_conflict, not_found_error, AppResult};

pub const SEMI_TRAILER_NOT_FOUND_MESSAGE: &str = "Conjunto não encontrado";

#[async_trait]
pub trait SemiTrailerRepository: Send + Sync {
    async fn create(&self, request: &CreateSemiTrailerRequest) -> AppResult<SemiTrailer>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<SemiTrailer>>;
    async fn list_all(&self) -> AppResult<Vec<SemiTrailer>>;
    async fn update(&self, id: i32, request: &UpdateSemiTrailerRequest) -> AppResult<SemiTrailer>;
    async fn delete(&self, id: i32) -> AppResult<()>;
    async fn list_cargos(&self) -> AppResult<Vec<Cargo>>;
}

#[derive(Debug, FromRow)]
struct SemiTrailerRow {
    id: i32,
    kind: Option<String>,
    configuration_name: String,
    number_of_trailers: i32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct TrailerRow {
    id: i32,
    semi_trailer_id: i32,
    fleet_number: Option<String>,
    #[sqlx(flatten)]
    vehicle: VehicleRow,
}

#[derive(Debug, FromRow)]
struct SemiTrailerCargoRow {
    semi_trailer_id: i32,
    id: i32,
    name: String,
}

const SEMI_TRAILER_SELECT: &str = "SELECT id, type AS kind, configuration_name, \
    number_of_trailers, created_at FROM semi_trailers";

/// Carga carretas y cargas de los conjuntos indicados y arma los agregados
async fn assemble(conn: &mut PgConnection, rows: Vec<SemiTrailerRow>) -> AppResult<Vec<SemiTrailer>> {
    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

    let sql = format!(
        "SELECT t.id, t.semi_trailer_id, t.fleet_number, {VEHICLE_COLUMNS} \
         FROM trailers t JOIN vehicles v ON v.id = t.vehicle_id \
         WHERE t.semi_trailer_id = ANY($1) ORDER BY t.id"
    );
    let trailer_rows = sqlx::query_as::<_, TrailerRow>(&sql)
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?;

    let cargo_rows = sqlx::query_as::<_, SemiTrailerCargoRow>(
        r#"
        SELECT sc.semi_trailer_id, c.id, c.name
        FROM semi_trailer_cargos sc JOIN cargos c ON c.id = sc.cargo_id
        WHERE sc.semi_trailer_id = ANY($1)
        ORDER BY sc.position
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut trailers: HashMap<i32, Vec<Trailer>> = HashMap::new();
    for row in trailer_rows {
        trailers.entry(row.semi_trailer_id).or_default().push(Trailer {
            id: row.id,
            fleet_number: row.fleet_number,
            vehicle: Vehicle::from(row.vehicle),
        });
    }

    let mut cargos: HashMap<i32, Vec<Cargo>> = HashMap::new();
    for row in cargo_rows {
        cargos.entry(row.semi_trailer_id).or_default().push(Cargo {
            id: row.id,
            name: row.name,
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| SemiTrailer {
            id: row.id,
            kind: row.kind,
            configuration: TrailerConfiguration {
                name: row.configuration_name,
                number_of_trailers: row.number_of_trailers,
            },
            cargos: cargos.remove(&row.id).unwrap_or_default(),
            trailers: trailers.remove(&row.id).unwrap_or_default(),
            created_at: row.created_at,
        })
        .collect())
}

async fn fetch_semi_trailer(conn: &mut PgConnection, id: i32) -> AppResult<Option<SemiTrailer>> {
    let sql = format!("{SEMI_TRAILER_SELECT} WHERE id = $1");
    let rows = sqlx::query_as::<_, SemiTrailerRow>(&sql)
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(assemble(conn, rows).await?.into_iter().next())
}

/// Reemplaza las cargas del conjunto, creando por nombre las que no existan
async fn replace_cargos(conn: &mut PgConnection, semi_trailer_id: i32, names: &[String]) -> AppResult<()> {
    sqlx::query("DELETE FROM semi_trailer_cargos WHERE semi_trailer_id = $1")
        .bind(semi_trailer_id)
        .execute(&mut *conn)
        .await?;

    for (position, name) in names.iter().enumerate() {
        let (cargo_id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO cargos (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            "INSERT INTO semi_trailer_cargos (semi_trailer_id, cargo_id, position) VALUES ($1, $2, $3)",
        )
        .bind(semi_trailer_id)
        .bind(cargo_id)
        .bind(position as i32)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub struct PgSemiTrailerRepository {
    pool: PgPool,
}

impl PgSemiTrailerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SemiTrailerRepository for PgSemiTrailerRepository {
    async fn create(&self, request: &CreateSemiTrailerRequest) -> AppResult<SemiTrailer> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO semi_trailers (type, configuration_name, number_of_trailers)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&request.kind)
        .bind(&request.configuration.name)
        .bind(request.configuration.number_of_trailers)
        .fetch_one(&mut *tx)
        .await?;

        for trailer in &request.trailers {
            let vehicle_id = insert_vehicle(&mut tx, &trailer.vehicle).await?;
            sqlx::query(
                "INSERT INTO trailers (semi_trailer_id, vehicle_id, fleet_number) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(vehicle_id)
            .bind(&trailer.fleet_number)
            .execute(&mut *tx)
            .await?;
        }

        replace_cargos(&mut tx, id, &request.cargos).await?;

        let semi_trailer = fetch_semi_trailer(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error(SEMI_TRAILER_NOT_FOUND_MESSAGE))?;
        tx.commit().await?;

        Ok(semi_trailer)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<SemiTrailer>> {
        let mut conn = self.pool.acquire().await?;
        fetch_semi_trailer(&mut conn, id).await
    }

    async fn list_all(&self) -> AppResult<Vec<SemiTrailer>> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!("{SEMI_TRAILER_SELECT} ORDER BY id");
        let rows = sqlx::query_as::<_, SemiTrailerRow>(&sql)
            .fetch_all(&mut *conn)
            .await?;

        assemble(&mut conn, rows).await
    }

    async fn update(&self, id: i32, request: &UpdateSemiTrailerRequest) -> AppResult<SemiTrailer> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE semi_trailers
            SET type = COALESCE($2, type),
                configuration_name = COALESCE($3, configuration_name),
                number_of_trailers = COALESCE($4, number_of_trailers)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&request.kind)
        .bind(request.configuration.as_ref().map(|c| c.name.clone()))
        .bind(request.configuration.as_ref().map(|c| c.number_of_trailers))
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error(SEMI_TRAILER_NOT_FOUND_MESSAGE));
        }

        if let Some(cargos) = &request.cargos {
            replace_cargos(&mut tx, id, cargos).await?;
        }

        let semi_trailer = fetch_semi_trailer(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error(SEMI_TRAILER_NOT_FOUND_MESSAGE))?;
        tx.commit().await?;

        Ok(semi_trailer)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let vehicle_ids: Vec<(i32,)> =
            sqlx::query_as("SELECT vehicle_id FROM trailers WHERE semi_trailer_id = $1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        let result = sqlx::query("DELETE FROM semi_trailers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(in_use_as_conflict)?;

        if result.rows_affected() == 0 {
            return Err(not_found_error(SEMI_TRAILER_NOT_FOUND_MESSAGE));
        }

        let vehicle_ids: Vec<i32> = vehicle_ids.into_iter().map(|(id,)| id).collect();
        sqlx::query("DELETE FROM vehicles WHERE id = ANY($1)")
            .bind(&vehicle_ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_cargos(&self) -> AppResult<Vec<Cargo>> {
        let rows: Vec<(i32, String)> = sqlx::query_as("SELECT id, name FROM cargos ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Cargo { id, name })
            .collect())
    }
}

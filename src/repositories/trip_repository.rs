use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::dto::dashboard_dto::DashboardCounts;
use crate::dto::trip_dto::TripFilters;
use crate::models::trip::{Trip, TripFields, TripStatus};
use crate::utils::errors::{not_found_error, AppResult};

pub const TRIP_NOT_FOUND_MESSAGE: &str = "Viagem não encontrada";

/// Viaje en progreso con los datos de exhibición ya resueltos
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct InProgressTrip {
    pub id: Uuid,
    pub status: TripStatus,
    pub truck_plate: Option<String>,
    pub trailer_plates: Option<String>,
    pub origin_name: Option<String>,
    pub origin_city: Option<String>,
    pub origin_state: Option<String>,
    pub destination_name: Option<String>,
    pub destination_city: Option<String>,
    pub destination_state: Option<String>,
}

#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn create(&self, fields: &TripFields) -> AppResult<Trip>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Trip>>;
    async fn list(&self, filters: &TripFilters) -> AppResult<Vec<Trip>>;
    async fn update(&self, id: Uuid, fields: &TripFields) -> AppResult<Trip>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Contadores del dashboard para viajes creados hasta `now`
    async fn dashboard_counts(&self, now: DateTime<Utc>) -> AppResult<DashboardCounts>;

    /// Viajes no borrador con partida o llegada en `[from, to)`
    async fn scheduled_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> AppResult<Vec<Trip>>;

    async fn in_progress(&self, limit: i64) -> AppResult<Vec<InProgressTrip>>;
}

pub struct PgTripRepository {
    pool: PgPool,
}

impl PgTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CountsRow {
    scheduled: i64,
    in_progress: i64,
    finished: i64,
    drafts: i64,
}

#[async_trait]
impl TripRepository for PgTripRepository {
    async fn create(&self, fields: &TripFields) -> AppResult<Trip> {
        let trip = sqlx::query_as::<_, Trip>(
            r#"
            INSERT INTO trips (
                id, status, draft, origin_id, destination_id, driver_id, truck_id,
                semi_trailer_id, cargo_id, departed_at, arrived_at, note, "order"
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(fields.status)
        .bind(fields.draft)
        .bind(fields.origin_id)
        .bind(fields.destination_id)
        .bind(fields.driver_id)
        .bind(fields.truck_id)
        .bind(fields.semi_trailer_id)
        .bind(fields.cargo_id)
        .bind(fields.departed_at)
        .bind(fields.arrived_at)
        .bind(&fields.note)
        .bind(&fields.order)
        .fetch_one(&self.pool)
        .await?;

        Ok(trip)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Trip>> {
        let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(trip)
    }

    async fn list(&self, filters: &TripFilters) -> AppResult<Vec<Trip>> {
        let trips = sqlx::query_as::<_, Trip>(
            r#"
            SELECT * FROM trips
            WHERE ($1::trip_status IS NULL OR status = $1)
              AND ($2::boolean IS NULL OR draft = $2)
            ORDER BY departed_at DESC NULLS LAST, created_at DESC
            LIMIT $3
            "#,
        )
        .bind(filters.status)
        .bind(filters.draft)
        .bind(filters.effective_limit())
        .fetch_all(&self.pool)
        .await?;

        Ok(trips)
    }

    async fn update(&self, id: Uuid, fields: &TripFields) -> AppResult<Trip> {
        sqlx::query_as::<_, Trip>(
            r#"
            UPDATE trips
            SET status = $2, draft = $3, origin_id = $4, destination_id = $5,
                driver_id = $6, truck_id = $7, semi_trailer_id = $8, cargo_id = $9,
                departed_at = $10, arrived_at = $11, note = $12, "order" = $13,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.status)
        .bind(fields.draft)
        .bind(fields.origin_id)
        .bind(fields.destination_id)
        .bind(fields.driver_id)
        .bind(fields.truck_id)
        .bind(fields.semi_trailer_id)
        .bind(fields.cargo_id)
        .bind(fields.departed_at)
        .bind(fields.arrived_at)
        .bind(&fields.note)
        .bind(&fields.order)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error(TRIP_NOT_FOUND_MESSAGE))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error(TRIP_NOT_FOUND_MESSAGE));
        }

        Ok(())
    }

    async fn dashboard_counts(&self, now: DateTime<Utc>) -> AppResult<DashboardCounts> {
        let row = sqlx::query_as::<_, CountsRow>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE NOT draft AND status = 'scheduled') AS scheduled,
                COUNT(*) FILTER (
                    WHERE NOT draft AND status IN ('loaded', 'departure', 'terminal', 'unloaded')
                ) AS in_progress,
                COUNT(*) FILTER (WHERE NOT draft AND status = 'finished') AS finished,
                COUNT(*) FILTER (WHERE draft) AS drafts
            FROM trips
            WHERE created_at <= $1
            "#,
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardCounts {
            scheduled: row.scheduled,
            in_progress: row.in_progress,
            finished: row.finished,
            drafts: row.drafts,
        })
    }

    async fn scheduled_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> AppResult<Vec<Trip>> {
        let trips = sqlx::query_as::<_, Trip>(
            r#"
            SELECT * FROM trips
            WHERE NOT draft
              AND ((departed_at >= $1 AND departed_at < $2)
                OR (arrived_at >= $1 AND arrived_at < $2))
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(trips)
    }

    async fn in_progress(&self, limit: i64) -> AppResult<Vec<InProgressTrip>> {
        let trips = sqlx::query_as::<_, InProgressTrip>(
            r#"
            SELECT
                t.id,
                t.status,
                tv.license_plate AS truck_plate,
                (
                    SELECT string_agg(v.license_plate, ' | ' ORDER BY tr.id)
                    FROM trailers tr JOIN vehicles v ON v.id = tr.vehicle_id
                    WHERE tr.semi_trailer_id = t.semi_trailer_id
                ) AS trailer_plates,
                COALESCE(NULLIF(oc.trade_name, ''), oc.name) AS origin_name,
                oa.city AS origin_city,
                oa.state AS origin_state,
                COALESCE(NULLIF(dc.trade_name, ''), dc.name) AS destination_name,
                da.city AS destination_city,
                da.state AS destination_state
            FROM trips t
            LEFT JOIN trucks tk ON tk.id = t.truck_id
            LEFT JOIN vehicles tv ON tv.id = tk.vehicle_id
            LEFT JOIN companies oc ON oc.id = t.origin_id
            LEFT JOIN addresses oa ON oa.company_id = t.origin_id
            LEFT JOIN companies dc ON dc.id = t.destination_id
            LEFT JOIN addresses da ON da.company_id = t.destination_id
            WHERE NOT t.draft
              AND t.status IN ('loaded', 'departure', 'terminal', 'unloaded')
            ORDER BY t.departed_at ASC NULLS LAST
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(trips)
    }
}

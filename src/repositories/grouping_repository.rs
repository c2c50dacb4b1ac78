use async_trait::async_trait;
use sqlx::PgPool;

use crate::dto::grouping_dto::GroupingRequest;
use crate::models::grouping::Grouping;
use crate::utils::errors::{in_use_as_conflict, not_found_error, AppResult};

pub const GROUPING_NOT_FOUND_MESSAGE: &str = "Agrupamento não encontrado";

#[async_trait]
pub trait GroupingRepository: Send + Sync {
    async fn create(&self, request: &GroupingRequest) -> AppResult<Grouping>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Grouping>>;
    async fn list_all(&self) -> AppResult<Vec<Grouping>>;
    async fn update(&self, id: i32, request: &GroupingRequest) -> AppResult<Grouping>;
    async fn delete(&self, id: i32) -> AppResult<()>;
}

pub struct PgGroupingRepository {
    pool: PgPool,
}

impl PgGroupingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupingRepository for PgGroupingRepository {
    async fn create(&self, request: &GroupingRequest) -> AppResult<Grouping> {
        let grouping = sqlx::query_as::<_, Grouping>(
            r#"
            INSERT INTO groupings (driver_id, truck_id, semi_trailer_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(request.driver_id)
        .bind(request.truck_id)
        .bind(request.semi_trailer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(grouping)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Grouping>> {
        let grouping = sqlx::query_as::<_, Grouping>("SELECT * FROM groupings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(grouping)
    }

    async fn list_all(&self) -> AppResult<Vec<Grouping>> {
        let groupings = sqlx::query_as::<_, Grouping>("SELECT * FROM groupings ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(groupings)
    }

    async fn update(&self, id: i32, request: &GroupingRequest) -> AppResult<Grouping> {
        sqlx::query_as::<_, Grouping>(
            r#"
            UPDATE groupings
            SET driver_id = $2, truck_id = $3, semi_trailer_id = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.driver_id)
        .bind(request.truck_id)
        .bind(request.semi_trailer_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error(GROUPING_NOT_FOUND_MESSAGE))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM groupings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(in_use_as_conflict)?;

        if result.rows_affected() == 0 {
            return Err(not_found_error(GROUPING_NOT_FOUND_MESSAGE));
        }

        Ok(())
    }
}

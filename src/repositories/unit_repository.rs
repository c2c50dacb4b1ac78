use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};

use super::company_repository::{upsert_company, CompanyRow, COMPANY_COLUMNS};
use crate::dto::company_dto::CompanyInput;
use crate::models::company::Company;
use crate::models::unit::Unit;
use crate::utils::errors::{
    conflict_error, in_use_as_conflict, not_found_error, unique_as_conflict, AppResult,
};

pub const DUPLICATE_IDENTIFIER_MESSAGE: &str = "Já existe uma unidade com esse identificador";
pub const DUPLICATE_UNIT_MESSAGE: &str = "Já existe uma unidade para essa empresa";
pub const UNIT_NOT_FOUND_MESSAGE: &str = "Unidade não encontrada";

#[async_trait]
pub trait UnitRepository: Send + Sync {
    async fn identifier_taken(&self, identifier: &str, excluding: Option<i32>) -> AppResult<bool>;

    /// Upsert de la company por documento + alta de la unidad, en una sola transacción
    async fn create_with_company(
        &self,
        identifier: Option<&str>,
        company: &CompanyInput,
    ) -> AppResult<Unit>;

    async fn find_by_company_id(&self, company_id: i32) -> AppResult<Option<Unit>>;
    async fn list_all(&self) -> AppResult<Vec<Unit>>;
    async fn set_identifier(&self, company_id: i32, identifier: Option<&str>) -> AppResult<Unit>;
    async fn delete(&self, company_id: i32) -> AppResult<()>;
}

const UNIT_SELECT: &str = "SELECT u.company_id, u.identifier, u.created_at, u.updated_at";
const UNIT_JOIN: &str =
    "units u JOIN companies c ON c.id = u.company_id LEFT JOIN addresses a ON a.company_id = c.id";

#[derive(Debug, FromRow)]
struct UnitRow {
    company_id: i32,
    identifier: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[sqlx(flatten)]
    company: CompanyRow,
}

impl From<UnitRow> for Unit {
    fn from(row: UnitRow) -> Self {
        Self {
            company_id: row.company_id,
            identifier: row.identifier,
            company: Company::from(row.company),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

async fn fetch_unit(conn: &mut PgConnection, company_id: i32) -> AppResult<Option<Unit>> {
    let sql = format!("{UNIT_SELECT}, {COMPANY_COLUMNS} FROM {UNIT_JOIN} WHERE u.company_id = $1");
    let row = sqlx::query_as::<_, UnitRow>(&sql)
        .bind(company_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(Unit::from))
}

pub struct PgUnitRepository {
    pool: PgPool,
}

impl PgUnitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitRepository for PgUnitRepository {
    async fn identifier_taken(&self, identifier: &str, excluding: Option<i32>) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM units WHERE identifier = $1 AND ($2::int IS NULL OR company_id <> $2))",
        )
        .bind(identifier)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    async fn create_with_company(
        &self,
        identifier: Option<&str>,
        company: &CompanyInput,
    ) -> AppResult<Unit> {
        let mut tx = self.pool.begin().await?;

        let company_id = upsert_company(&mut tx, company).await?;

        let existing: Option<(i32,)> =
            sqlx::query_as("SELECT company_id FROM units WHERE company_id = $1")
                .bind(company_id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            return Err(conflict_error(DUPLICATE_UNIT_MESSAGE));
        }

        sqlx::query("INSERT INTO units (company_id, identifier) VALUES ($1, $2)")
            .bind(company_id)
            .bind(identifier)
            .execute(&mut *tx)
            .await
            .map_err(unique_as_conflict(DUPLICATE_IDENTIFIER_MESSAGE))?;

        let unit = fetch_unit(&mut tx, company_id)
            .await?
            .ok_or_else(|| not_found_error(UNIT_NOT_FOUND_MESSAGE))?;
        tx.commit().await?;

        Ok(unit)
    }

    async fn find_by_company_id(&self, company_id: i32) -> AppResult<Option<Unit>> {
        let mut conn = self.pool.acquire().await?;
        fetch_unit(&mut conn, company_id).await
    }

    async fn list_all(&self) -> AppResult<Vec<Unit>> {
        let sql = format!("{UNIT_SELECT}, {COMPANY_COLUMNS} FROM {UNIT_JOIN} ORDER BY c.name");
        let rows = sqlx::query_as::<_, UnitRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Unit::from).collect())
    }

    async fn set_identifier(&self, company_id: i32, identifier: Option<&str>) -> AppResult<Unit> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE units SET identifier = $2, updated_at = NOW() WHERE company_id = $1",
        )
        .bind(company_id)
        .bind(identifier)
        .execute(&mut *tx)
        .await
        .map_err(unique_as_conflict(DUPLICATE_IDENTIFIER_MESSAGE))?;

        if result.rows_affected() == 0 {
            return Err(not_found_error(UNIT_NOT_FOUND_MESSAGE));
        }

        let unit = fetch_unit(&mut tx, company_id)
            .await?
            .ok_or_else(|| not_found_error(UNIT_NOT_FOUND_MESSAGE))?;
        tx.commit().await?;

        Ok(unit)
    }

    async fn delete(&self, company_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM units WHERE company_id = $1")
            .bind(company_id)
            .execute(&self.pool)
            .await
            .map_err(in_use_as_conflict)?;

        if result.rows_affected() == 0 {
            return Err(not_found_error(UNIT_NOT_FOUND_MESSAGE));
        }

        Ok(())
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::dto::driver_dto::{CreateDriverRequest, UpdateDriverRequest};
use crate::models::driver::{Driver, Person};
use crate::utils::errors::{in_use_as_conflict, not_found_error, unique_as_conflict, AppResult};

pub const DUPLICATE_DRIVER_DOCUMENT_MESSAGE: &str = "Já existe um motorista com esse documento";
pub const DUPLICATE_CNH_MESSAGE: &str = "Já existe um motorista com essa CNH";
pub const DRIVER_NOT_FOUND_MESSAGE: &str = "Motorista não encontrado";

#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn document_taken(&self, document: &str, excluding: Option<i32>) -> AppResult<bool>;
    async fn cnh_taken(&self, cnh: &str, excluding: Option<i32>) -> AppResult<bool>;
    async fn create(&self, request: &CreateDriverRequest) -> AppResult<Driver>;
    async fn find_by_id(&self, person_id: i32) -> AppResult<Option<Driver>>;
    async fn list_all(&self) -> AppResult<Vec<Driver>>;
    async fn update(&self, person_id: i32, request: &UpdateDriverRequest) -> AppResult<Driver>;
    async fn delete(&self, person_id: i32) -> AppResult<()>;
}

const DRIVER_SELECT: &str = "SELECT d.person_id, d.cnh, d.created_at, p.name, p.nickname, \
    p.document, p.phone_number, p.unit_id FROM drivers d JOIN people p ON p.id = d.person_id";

#[derive(Debug, FromRow)]
struct DriverRow {
    person_id: i32,
    cnh: String,
    created_at: DateTime<Utc>,
    name: String,
    nickname: Option<String>,
    document: String,
    phone_number: Option<String>,
    unit_id: Option<i32>,
}

impl From<DriverRow> for Driver {
    fn from(row: DriverRow) -> Self {
        Self {
            person_id: row.person_id,
            cnh: row.cnh,
            person: Person {
                id: row.person_id,
                name: row.name,
                nickname: row.nickname,
                document: row.document,
                phone_number: row.phone_number,
                unit_id: row.unit_id,
            },
            created_at: row.created_at,
        }
    }
}

async fn fetch_driver(conn: &mut PgConnection, person_id: i32) -> AppResult<Option<Driver>> {
    let sql = format!("{DRIVER_SELECT} WHERE d.person_id = $1");
    let row = sqlx::query_as::<_, DriverRow>(&sql)
        .bind(person_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(Driver::from))
}

pub struct PgDriverRepository {
    pool: PgPool,
}

impl PgDriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriverRepository for PgDriverRepository {
    async fn document_taken(&self, document: &str, excluding: Option<i32>) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM people WHERE document = $1 AND ($2::int IS NULL OR id <> $2))",
        )
        .bind(document)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    async fn cnh_taken(&self, cnh: &str, excluding: Option<i32>) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM drivers WHERE cnh = $1 AND ($2::int IS NULL OR person_id <> $2))",
        )
        .bind(cnh)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    async fn create(&self, request: &CreateDriverRequest) -> AppResult<Driver> {
        let mut tx = self.pool.begin().await?;
        let person = &request.person;

        let (person_id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO people (name, nickname, document, phone_number, unit_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&person.name)
        .bind(&person.nickname)
        .bind(&person.document)
        .bind(&person.phone_number)
        .bind(person.unit_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(unique_as_conflict(DUPLICATE_DRIVER_DOCUMENT_MESSAGE))?;

        sqlx::query("INSERT INTO drivers (person_id, cnh) VALUES ($1, $2)")
            .bind(person_id)
            .bind(&request.cnh)
            .execute(&mut *tx)
            .await
            .map_err(unique_as_conflict(DUPLICATE_CNH_MESSAGE))?;

        let driver = fetch_driver(&mut tx, person_id)
            .await?
            .ok_or_else(|| not_found_error(DRIVER_NOT_FOUND_MESSAGE))?;
        tx.commit().await?;

        Ok(driver)
    }

    async fn find_by_id(&self, person_id: i32) -> AppResult<Option<Driver>> {
        let mut conn = self.pool.acquire().await?;
        fetch_driver(&mut conn, person_id).await
    }

    async fn list_all(&self) -> AppResult<Vec<Driver>> {
        let sql = format!("{DRIVER_SELECT} ORDER BY p.name");
        let rows = sqlx::query_as::<_, DriverRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Driver::from).collect())
    }

    async fn update(&self, person_id: i32, request: &UpdateDriverRequest) -> AppResult<Driver> {
        let mut tx = self.pool.begin().await?;

        if let Some(person) = &request.person {
            sqlx::query(
                r#"
                UPDATE people
                SET name = COALESCE($2, name),
                    nickname = CASE WHEN $3::text IS NULL THEN nickname ELSE NULLIF($3, '') END,
                    document = COALESCE($4, document),
                    phone_number = CASE WHEN $5::text IS NULL THEN phone_number ELSE NULLIF($5, '') END,
                    unit_id = COALESCE($6, unit_id)
                WHERE id = $1
                "#,
            )
            .bind(person_id)
            .bind(&person.name)
            .bind(&person.nickname)
            .bind(&person.document)
            .bind(&person.phone_number)
            .bind(person.unit_id)
            .execute(&mut *tx)
            .await
            .map_err(unique_as_conflict(DUPLICATE_DRIVER_DOCUMENT_MESSAGE))?;
        }

        if let Some(cnh) = &request.cnh {
            sqlx::query("UPDATE drivers SET cnh = $2 WHERE person_id = $1")
                .bind(person_id)
                .bind(cnh)
                .execute(&mut *tx)
                .await
                .map_err(unique_as_conflict(DUPLICATE_CNH_MESSAGE))?;
        }

        let driver = fetch_driver(&mut tx, person_id)
            .await?
            .ok_or_else(|| not_found_error(DRIVER_NOT_FOUND_MESSAGE))?;
        tx.commit().await?;

        Ok(driver)
    }

    async fn delete(&self, person_id: i32) -> AppResult<()> {
        // drivers cae en cascada con people
        let result = sqlx::query(
            "DELETE FROM people WHERE id = $1 AND EXISTS(SELECT 1 FROM drivers WHERE person_id = $1)",
        )
        .bind(person_id)
        .execute(&self.pool)
        .await
        .map_err(in_use_as_conflict)?;

        if result.rows_affected() == 0 {
            return Err(not_found_error(DRIVER_NOT_FOUND_MESSAGE));
        }

        Ok(())
    }
}

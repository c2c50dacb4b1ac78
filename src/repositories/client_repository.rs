use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};

use super::company_repository::{upsert_company, CompanyRow, COMPANY_COLUMNS};
use crate::dto::company_dto::CompanyInput;
use crate::models::client::Client;
use crate::models::company::Company;
use crate::utils::errors::{conflict_error, in_use_as_conflict, not_found_error, AppResult};

pub const DUPLICATE_CLIENT_MESSAGE: &str = "Esse cliente já está cadastrado";
pub const CLIENT_NOT_FOUND_MESSAGE: &str = "Cliente não encontrado";

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn create_with_company(&self, company: &CompanyInput) -> AppResult<Client>;
    async fn find_by_company_id(&self, company_id: i32) -> AppResult<Option<Client>>;
    async fn list_all(&self) -> AppResult<Vec<Client>>;
    async fn delete(&self, company_id: i32) -> AppResult<()>;
}

const CLIENT_SELECT: &str = "SELECT cl.company_id, cl.created_at";
const CLIENT_JOIN: &str =
    "clients cl JOIN companies c ON c.id = cl.company_id LEFT JOIN addresses a ON a.company_id = c.id";

#[derive(Debug, FromRow)]
struct ClientRow {
    company_id: i32,
    created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    company: CompanyRow,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Self {
            company_id: row.company_id,
            company: Company::from(row.company),
            created_at: row.created_at,
        }
    }
}

async fn fetch_client(conn: &mut PgConnection, company_id: i32) -> AppResult<Option<Client>> {
    let sql =
        format!("{CLIENT_SELECT}, {COMPANY_COLUMNS} FROM {CLIENT_JOIN} WHERE cl.company_id = $1");
    let row = sqlx::query_as::<_, ClientRow>(&sql)
        .bind(company_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(Client::from))
}

pub struct PgClientRepository {
    pool: PgPool,
}

impl PgClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientRepository for PgClientRepository {
    async fn create_with_company(&self, company: &CompanyInput) -> AppResult<Client> {
        let mut tx = self.pool.begin().await?;

        let company_id = upsert_company(&mut tx, company).await?;

        let inserted = sqlx::query(
            "INSERT INTO clients (company_id) VALUES ($1) ON CONFLICT (company_id) DO NOTHING",
        )
        .bind(company_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(conflict_error(DUPLICATE_CLIENT_MESSAGE));
        }

        let client = fetch_client(&mut tx, company_id)
            .await?
            .ok_or_else(|| not_found_error(CLIENT_NOT_FOUND_MESSAGE))?;
        tx.commit().await?;

        Ok(client)
    }

    async fn find_by_company_id(&self, company_id: i32) -> AppResult<Option<Client>> {
        let mut conn = self.pool.acquire().await?;
        fetch_client(&mut conn, company_id).await
    }

    async fn list_all(&self) -> AppResult<Vec<Client>> {
        let sql = format!("{CLIENT_SELECT}, {COMPANY_COLUMNS} FROM {CLIENT_JOIN} ORDER BY c.name");
        let rows = sqlx::query_as::<_, ClientRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Client::from).collect())
    }

    async fn delete(&self, company_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE company_id = $1")
            .bind(company_id)
            .execute(&self.pool)
            .await
            .map_err(in_use_as_conflict)?;

        if result.rows_affected() == 0 {
            return Err(not_found_error(CLIENT_NOT_FOUND_MESSAGE));
        }

        Ok(())
    }
}

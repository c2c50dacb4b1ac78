use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::dto::company_dto::{AddressInput, CompanyInput, CompanyPatch};
use crate::models::company::{Address, Company, DocumentType};
use crate::utils::errors::{in_use_as_conflict, not_found_error, unique_as_conflict, AppResult};

pub const DUPLICATE_DOCUMENT_MESSAGE: &str = "Já existe uma empresa com esse documento";
pub const COMPANY_NOT_FOUND_MESSAGE: &str = "Empresa não encontrada";

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Conecta con la company del documento si existe; si no, la crea con su dirección
    async fn upsert_by_document(&self, input: &CompanyInput) -> AppResult<Company>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Company>>;
    async fn document_taken(&self, document: &str, excluding: Option<i32>) -> AppResult<bool>;
    async fn update(&self, id: i32, patch: &CompanyPatch) -> AppResult<Company>;
    async fn delete(&self, id: i32) -> AppResult<()>;
    async fn list_all(&self) -> AppResult<Vec<Company>>;
}

/// Columnas de company + dirección, con prefijo para poder hacer flatten
pub(crate) const COMPANY_COLUMNS: &str = "c.id AS c_id, c.name AS c_name, \
    c.trade_name AS c_trade_name, c.document AS c_document, \
    c.document_type AS c_document_type, c.created_at AS c_created_at, \
    c.updated_at AS c_updated_at, a.company_id AS a_company_id, \
    a.zip_code AS a_zip_code, a.state AS a_state, a.city AS a_city, a.locale AS a_locale";

pub(crate) const COMPANY_JOIN: &str = "companies c LEFT JOIN addresses a ON a.company_id = c.id";

#[derive(Debug, FromRow)]
pub(crate) struct CompanyRow {
    c_id: i32,
    c_name: String,
    c_trade_name: Option<String>,
    c_document: String,
    c_document_type: DocumentType,
    c_created_at: DateTime<Utc>,
    c_updated_at: DateTime<Utc>,
    a_company_id: Option<i32>,
    a_zip_code: Option<String>,
    a_state: Option<String>,
    a_city: Option<String>,
    a_locale: Option<String>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        let address = row.a_company_id.map(|_| Address {
            zip_code: row.a_zip_code,
            state: row.a_state,
            city: row.a_city,
            locale: row.a_locale,
        });

        Self {
            id: row.c_id,
            name: row.c_name,
            trade_name: row.c_trade_name,
            document: row.c_document,
            document_type: row.c_document_type,
            address,
            created_at: row.c_created_at,
            updated_at: row.c_updated_at,
        }
    }
}

/// Upsert por documento dentro de una conexión/transacción ya abierta.
/// Devuelve el id de la company.
pub(crate) async fn upsert_company(conn: &mut PgConnection, input: &CompanyInput) -> AppResult<i32> {
    let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM companies WHERE document = $1")
        .bind(&input.document)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (i32,) = sqlx::query_as(
        r#"
        INSERT INTO companies (name, trade_name, document, document_type)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(&input.name)
    .bind(&input.trade_name)
    .bind(&input.document)
    .bind(input.document_type)
    .fetch_one(&mut *conn)
    .await
    .map_err(unique_as_conflict(DUPLICATE_DOCUMENT_MESSAGE))?;

    if let Some(address) = &input.address {
        upsert_address(conn, id, address).await?;
    }

    Ok(id)
}

pub(crate) async fn upsert_address(
    conn: &mut PgConnection,
    company_id: i32,
    address: &AddressInput,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO addresses (company_id, zip_code, state, city, locale)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (company_id) DO UPDATE
        SET zip_code = EXCLUDED.zip_code, state = EXCLUDED.state,
            city = EXCLUDED.city, locale = EXCLUDED.locale
        "#,
    )
    .bind(company_id)
    .bind(&address.zip_code)
    .bind(&address.state)
    .bind(&address.city)
    .bind(&address.locale)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn fetch_company(conn: &mut PgConnection, id: i32) -> AppResult<Option<Company>> {
    let sql = format!("SELECT {COMPANY_COLUMNS} FROM {COMPANY_JOIN} WHERE c.id = $1");
    let row = sqlx::query_as::<_, CompanyRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(Company::from))
}

pub struct PgCompanyRepository {
    pool: PgPool,
}

impl PgCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for PgCompanyRepository {
    async fn upsert_by_document(&self, input: &CompanyInput) -> AppResult<Company> {
        let mut tx = self.pool.begin().await?;
        let id = upsert_company(&mut tx, input).await?;
        let company = fetch_company(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error(COMPANY_NOT_FOUND_MESSAGE))?;
        tx.commit().await?;

        Ok(company)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Company>> {
        let mut conn = self.pool.acquire().await?;
        fetch_company(&mut conn, id).await
    }

    async fn document_taken(&self, document: &str, excluding: Option<i32>) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM companies WHERE document = $1 AND ($2::int IS NULL OR id <> $2))",
        )
        .bind(document)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    async fn update(&self, id: i32, patch: &CompanyPatch) -> AppResult<Company> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE companies
            SET name = COALESCE($2, name),
                trade_name = CASE WHEN $3::text IS NULL THEN trade_name ELSE NULLIF($3, '') END,
                document = COALESCE($4, document),
                document_type = COALESCE($5, document_type),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.trade_name)
        .bind(&patch.document)
        .bind(patch.document_type)
        .execute(&mut *tx)
        .await
        .map_err(unique_as_conflict(DUPLICATE_DOCUMENT_MESSAGE))?;

        if updated.rows_affected() == 0 {
            return Err(not_found_error(COMPANY_NOT_FOUND_MESSAGE));
        }

        if let Some(address) = &patch.address {
            upsert_address(&mut tx, id, address).await?;
        }

        let company = fetch_company(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error(COMPANY_NOT_FOUND_MESSAGE))?;
        tx.commit().await?;

        Ok(company)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(in_use_as_conflict)?;

        if result.rows_affected() == 0 {
            return Err(not_found_error(COMPANY_NOT_FOUND_MESSAGE));
        }

        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<Company>> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM {COMPANY_JOIN} ORDER BY c.name");
        let rows = sqlx::query_as::<_, CompanyRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Company::from).collect())
    }
}

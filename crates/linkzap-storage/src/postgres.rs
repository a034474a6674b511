use async_trait::async_trait;
use jiff::Timestamp;
use linkzap_core::repository::Result;
use linkzap_core::{LinkChanges, LinkFilter, LinkRecord, LinkStore, NewLink, ShortCode, StorageError};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{debug, info};

const SCHEMA: &str = include_str!("../ddl/postgres/urls.sql");

const COLUMNS: &str =
    "id, short_code, original_url, expires_at, is_active, created_at, updated_at";

/// PostgreSQL implementation of [`LinkStore`] over the `urls` table.
///
/// Timestamps are stored as unix microseconds in `BIGINT` columns. Reads
/// return expired rows as-is; callers decide what expiry means.
#[derive(Debug, Clone)]
pub struct PostgresLinkStore {
    pool: PgPool,
}

impl PostgresLinkStore {
    /// Creates a store from an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a store by opening a new connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("connecting to PostgreSQL");
        let pool = PgPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `urls` table and its index if they do not exist.
    pub async fn create_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("ensured urls schema");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn parse_micros(column: &str, value: i64) -> Result<Timestamp> {
    Timestamp::from_microsecond(value).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{value}': {e}"))
    })
}

fn row_to_record(row: &PgRow) -> Result<LinkRecord> {
    let short_code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let short_code = ShortCode::new(&short_code)
        .map_err(|e| StorageError::InvalidData(format!("stored short code: {e}")))?;

    let expires_at: Option<i64> = row.try_get("expires_at").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let updated_at: i64 = row.try_get("updated_at").map_err(map_sqlx_error)?;

    Ok(LinkRecord {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        short_code,
        original_url: row.try_get("original_url").map_err(map_sqlx_error)?,
        expires_at: expires_at
            .map(|v| parse_micros("expires_at", v))
            .transpose()?,
        is_active: row.try_get("is_active").map_err(map_sqlx_error)?,
        created_at: parse_micros("created_at", created_at)?,
        updated_at: parse_micros("updated_at", updated_at)?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_) => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl LinkStore for PostgresLinkStore {
    async fn get(&self, id: i64) -> Result<Option<LinkRecord>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM urls WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn find(&self, filter: &LinkFilter) -> Result<Option<LinkRecord>> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM urls WHERE TRUE"));
        if let Some(code) = &filter.short_code {
            query.push(" AND short_code = ").push_bind(code.to_string());
        }
        if let Some(is_active) = filter.is_active {
            query.push(" AND is_active = ").push_bind(is_active);
        }
        query.push(" ORDER BY id LIMIT 1");

        let row = query
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn insert(&self, link: NewLink) -> Result<LinkRecord> {
        let now = Timestamp::now().as_microsecond();

        let result = sqlx::query(&format!(
            r#"
            INSERT INTO urls (short_code, original_url, expires_at, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(link.short_code.as_str())
        .bind(&link.original_url)
        .bind(link.expires_at.map(|ts| ts.as_microsecond()))
        .bind(link.is_active)
        .bind(now)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => row_to_record(&row),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(link.short_code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn update(&self, id: i64, changes: &LinkChanges) -> Result<Option<LinkRecord>> {
        let expiry_changed = changes.expires_at.is_some();
        let expires_at = changes.expires_at.flatten().map(|ts| ts.as_microsecond());

        let row = sqlx::query(&format!(
            r#"
            UPDATE urls
            SET original_url = COALESCE($2, original_url),
                is_active = COALESCE($3, is_active),
                expires_at = CASE WHEN $4 THEN $5 ELSE expires_at END,
                updated_at = $6
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.original_url.as_deref())
        .bind(changes.is_active)
        .bind(expiry_changed)
        .bind(expires_at)
        .bind(Timestamp::now().as_microsecond())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_record).transpose()
    }
}

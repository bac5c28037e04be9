//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, and the
//! [`PgContactStore`] implementation of [`ContactStore`] over a single
//! `contacts` table. Email and phone uniqueness is enforced by unique
//! constraints, so concurrent writers race at the database.

use async_trait::async_trait;
use chrono::Utc;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use rolodex_core::{
    Contact, ContactField, ContactId, ContactPatch, ContactSelector, EditLock, FilterValue,
    NewContact, SortOrder, StoreError, StoreResult, Timestamp,
};
use rolodex_storage::{ContactStore, LockAttempt};
use std::time::Duration;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "rolodex".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("ROLODEX_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("ROLODEX_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("ROLODEX_DB_NAME").unwrap_or_else(|_| "rolodex".to_string()),
            user: std::env::var("ROLODEX_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("ROLODEX_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("ROLODEX_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("ROLODEX_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.connect_timeout = Some(self.timeout);

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = deadpool_postgres::PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        pool_cfg.timeouts.create = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS contacts (
    id            UUID PRIMARY KEY,
    name          TEXT NOT NULL CHECK (btrim(name) <> ''),
    email         TEXT NOT NULL CHECK (btrim(email) <> ''),
    phone         TEXT NOT NULL CHECK (btrim(phone) <> ''),
    company       TEXT,
    address       TEXT,
    is_editing    BOOLEAN NOT NULL DEFAULT FALSE,
    editing_by    TEXT,
    editing_until TIMESTAMPTZ,
    created_at    TIMESTAMPTZ NOT NULL,
    updated_at    TIMESTAMPTZ NOT NULL,
    CONSTRAINT contacts_email_unique UNIQUE (email),
    CONSTRAINT contacts_phone_unique UNIQUE (phone)
);
CREATE INDEX IF NOT EXISTS contacts_name_idx ON contacts (name);
CREATE INDEX IF NOT EXISTS contacts_editing_until_idx ON contacts (editing_until)
    WHERE is_editing;
"#;

const COLUMNS: &str = "id, name, email, phone, company, address, is_editing, editing_by, \
                       editing_until, created_at, updated_at";

// ============================================================================
// POSTGRES CONTACT STORE
// ============================================================================

/// Contact store backed by a deadpool-postgres pool.
#[derive(Clone)]
pub struct PgContactStore {
    pool: Pool,
}

impl PgContactStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a store from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        Ok(Self::new(config.create_pool()?))
    }

    /// Create the `contacts` table and its indexes if they are missing.
    pub async fn ensure_schema(&self) -> ApiResult<()> {
        let conn = self.pool.get().await?;
        conn.batch_execute(SCHEMA).await?;
        tracing::info!("Contacts schema ready");
        Ok(())
    }

    async fn get_conn(&self) -> StoreResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            tracing::error!("Connection pool error: {:?}", e);
            StoreError::backend(e.to_string())
        })
    }
}

fn row_to_contact(row: &Row) -> Contact {
    Contact {
        id: ContactId::from_uuid(row.get("id")),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        company: row.get("company"),
        address: row.get("address"),
        is_editing: row.get("is_editing"),
        editing_by: row.get("editing_by"),
        editing_until: row.get("editing_until"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Map a unique violation to [`StoreError::Duplicate`] using the values the
/// caller tried to write.
fn write_error(err: tokio_postgres::Error, email: Option<&str>, phone: Option<&str>) -> StoreError {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        let constraint = err
            .as_db_error()
            .and_then(|db| db.constraint())
            .unwrap_or_default();
        if constraint.contains("email") {
            return StoreError::duplicate(ContactField::Email, email.unwrap_or_default());
        }
        if constraint.contains("phone") {
            return StoreError::duplicate(ContactField::Phone, phone.unwrap_or_default());
        }
    }
    backend_error(err)
}

fn backend_error(err: tokio_postgres::Error) -> StoreError {
    tracing::error!("Database error: {:?}", err);
    StoreError::backend(err.to_string())
}

// ============================================================================
// QUERY BUILDING
// ============================================================================

type SqlParam = Box<dyn ToSql + Sync + Send>;

/// Positional parameters collected while building a statement.
#[derive(Default)]
struct Params {
    values: Vec<SqlParam>,
}

impl Params {
    /// Bind a value and return its placeholder.
    fn push<T: ToSql + Sync + Send + 'static>(&mut self, value: T) -> String {
        self.values.push(Box::new(value));
        format!("${}", self.values.len())
    }

    fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|v| v.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }
}

/// Escape `LIKE` wildcards so the term matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// `WHERE` clause equivalent to [`ContactSelector::matches`].
fn where_clause(selector: &ContactSelector, params: &mut Params) -> String {
    let mut conditions = Vec::new();

    if let Some(term) = &selector.search {
        let p = params.push(like_pattern(term));
        conditions.push(format!(
            "(name ILIKE {p} OR email ILIKE {p} OR phone ILIKE {p})"
        ));
    }

    for filter in &selector.filters {
        let column = filter.field.column();
        let condition = match (&filter.value, filter.field) {
            (FilterValue::Bool(expected), ContactField::IsEditing) => {
                format!("{} = {}", column, params.push(*expected))
            }
            (FilterValue::Null, field) if field.is_optional_text() => {
                format!("{} IS NULL", column)
            }
            (FilterValue::Text(expected), field)
                if field != ContactField::IsEditing && field.is_filterable() =>
            {
                format!("{} = {}", column, params.push(expected.clone()))
            }
            _ => "FALSE".to_string(),
        };
        conditions.push(condition);
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

/// `ORDER BY` clause equivalent to [`SortOrder::compare`]. Text sorts by
/// byte order and absent values come first in ascending order.
fn order_clause(sort: SortOrder) -> String {
    let column = sort.field.column();
    let collate = match sort.field {
        ContactField::IsEditing
        | ContactField::EditingUntil
        | ContactField::CreatedAt
        | ContactField::UpdatedAt => "",
        _ => " COLLATE \"C\"",
    };
    let direction = if sort.descending {
        "DESC NULLS LAST"
    } else {
        "ASC NULLS FIRST"
    };
    format!(
        " ORDER BY {}{} {}, created_at ASC, id ASC",
        column, collate, direction
    )
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// ============================================================================
// STORE IMPLEMENTATION
// ============================================================================

#[async_trait]
impl ContactStore for PgContactStore {
    async fn insert(&self, new: NewContact) -> StoreResult<Contact> {
        let new = new.normalized();
        new.check()?;

        let now = Utc::now();
        let contact = Contact::create(new, now);
        let conn = self.get_conn().await?;
        let sql = format!(
            "INSERT INTO contacts ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, FALSE, NULL, NULL, $7, $7) \
             RETURNING {COLUMNS}"
        );
        let row = conn
            .query_one(
                &sql,
                &[
                    &contact.id.as_uuid(),
                    &contact.name,
                    &contact.email,
                    &contact.phone,
                    &contact.company,
                    &contact.address,
                    &now,
                ],
            )
            .await
            .map_err(|e| write_error(e, Some(&contact.email), Some(&contact.phone)))?;

        Ok(row_to_contact(&row))
    }

    async fn get(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        let conn = self.get_conn().await?;
        let sql = format!("SELECT {COLUMNS} FROM contacts WHERE id = $1");
        let row = conn
            .query_opt(&sql, &[&id.as_uuid()])
            .await
            .map_err(backend_error)?;
        Ok(row.as_ref().map(row_to_contact))
    }

    async fn update(&self, id: ContactId, patch: ContactPatch) -> StoreResult<Option<Contact>> {
        let patch = patch.normalized();
        patch.check()?;

        let mut params = Params::default();
        let id_param = params.push(id.as_uuid());
        let mut sets = vec![format!("updated_at = {}", params.push(Utc::now()))];
        if let Some(name) = &patch.name {
            sets.push(format!("name = {}", params.push(name.clone())));
        }
        if let Some(email) = &patch.email {
            sets.push(format!("email = {}", params.push(email.clone())));
        }
        if let Some(phone) = &patch.phone {
            sets.push(format!("phone = {}", params.push(phone.clone())));
        }
        if let Some(company) = &patch.company {
            sets.push(format!("company = NULLIF({}, '')", params.push(company.clone())));
        }
        if let Some(address) = &patch.address {
            sets.push(format!("address = NULLIF({}, '')", params.push(address.clone())));
        }

        let sql = format!(
            "UPDATE contacts SET {} WHERE id = {} RETURNING {COLUMNS}",
            sets.join(", "),
            id_param
        );
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(&sql, &params.as_refs())
            .await
            .map_err(|e| write_error(e, patch.email.as_deref(), patch.phone.as_deref()))?;
        Ok(row.as_ref().map(row_to_contact))
    }

    async fn try_lock(
        &self,
        id: ContactId,
        lock: EditLock,
        now: Timestamp,
    ) -> StoreResult<Option<LockAttempt>> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "UPDATE contacts \
             SET is_editing = TRUE, editing_by = $2, editing_until = $3, updated_at = $4 \
             WHERE id = $1 \
               AND NOT (is_editing \
                        AND COALESCE(editing_until > $4, FALSE) \
                        AND editing_by IS DISTINCT FROM $2) \
             RETURNING {COLUMNS}"
        );
        let row = conn
            .query_opt(&sql, &[&id.as_uuid(), &lock.owner, &lock.until, &now])
            .await
            .map_err(backend_error)?;
        if let Some(row) = row {
            return Ok(Some(LockAttempt::Acquired(row_to_contact(&row))));
        }

        // No row updated: either the contact is gone or a live lock blocks us
        let sql = format!("SELECT {COLUMNS} FROM contacts WHERE id = $1");
        let row = conn
            .query_opt(&sql, &[&id.as_uuid()])
            .await
            .map_err(backend_error)?;
        Ok(row.as_ref().map(|row| LockAttempt::Held(row_to_contact(row))))
    }

    async fn release_lock(&self, id: ContactId, owner: &str) -> StoreResult<Option<Contact>> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "UPDATE contacts \
             SET is_editing = FALSE, editing_by = NULL, editing_until = NULL, updated_at = $3 \
             WHERE id = $1 AND editing_by = $2 \
             RETURNING {COLUMNS}"
        );
        let row = conn
            .query_opt(&sql, &[&id.as_uuid(), &owner, &Utc::now()])
            .await
            .map_err(backend_error)?;
        if let Some(row) = row {
            return Ok(Some(row_to_contact(&row)));
        }

        let sql = format!("SELECT {COLUMNS} FROM contacts WHERE id = $1");
        let row = conn
            .query_opt(&sql, &[&id.as_uuid()])
            .await
            .map_err(backend_error)?;
        Ok(row.as_ref().map(row_to_contact))
    }

    async fn delete(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        let conn = self.get_conn().await?;
        let sql = format!("DELETE FROM contacts WHERE id = $1 RETURNING {COLUMNS}");
        let row = conn
            .query_opt(&sql, &[&id.as_uuid()])
            .await
            .map_err(backend_error)?;
        Ok(row.as_ref().map(row_to_contact))
    }

    async fn delete_many(&self, ids: &[ContactId]) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let uuids: Vec<Uuid> = ids.iter().map(ContactId::as_uuid).collect();
        let conn = self.get_conn().await?;
        conn.execute("DELETE FROM contacts WHERE id = ANY($1)", &[&uuids])
            .await
            .map_err(backend_error)
    }

    async fn find(
        &self,
        selector: &ContactSelector,
        sort: SortOrder,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Contact>> {
        let mut params = Params::default();
        let filter = where_clause(selector, &mut params);
        let offset = params.push(clamp_i64(offset));
        let limit = params.push(clamp_i64(limit));
        let sql = format!(
            "SELECT {COLUMNS} FROM contacts{}{} OFFSET {} LIMIT {}",
            filter,
            order_clause(sort),
            offset,
            limit
        );

        let conn = self.get_conn().await?;
        let rows = conn
            .query(&sql, &params.as_refs())
            .await
            .map_err(backend_error)?;
        Ok(rows.iter().map(row_to_contact).collect())
    }

    async fn count(&self, selector: &ContactSelector) -> StoreResult<u64> {
        let mut params = Params::default();
        let sql = format!(
            "SELECT COUNT(*) FROM contacts{}",
            where_clause(selector, &mut params)
        );
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(&sql, &params.as_refs())
            .await
            .map_err(backend_error)?;
        let count: i64 = row.get(0);
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn clear_expired_locks(&self, now: Timestamp) -> StoreResult<u64> {
        let conn = self.get_conn().await?;
        let cleared = conn
            .execute(
                "UPDATE contacts \
                 SET is_editing = FALSE, editing_by = NULL, editing_until = NULL, updated_at = $1 \
                 WHERE is_editing AND editing_until <= $1",
                &[&now],
            )
            .await
            .map_err(backend_error)?;
        if cleared > 0 {
            tracing::debug!(cleared, "Cleared expired edit locks");
        }
        Ok(cleared)
    }

    async fn ping(&self) -> StoreResult<()> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[]).await.map_err(backend_error)?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolodex_core::FieldFilter;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("jane"), "%jane%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_where_clause_binds_search_once() {
        let mut params = Params::default();
        let sql = where_clause(&ContactSelector::all().with_search("jane"), &mut params);
        assert_eq!(sql, " WHERE (name ILIKE $1 OR email ILIKE $1 OR phone ILIKE $1)");
        assert_eq!(params.values.len(), 1);
    }

    #[test]
    fn test_where_clause_filters() {
        let selector = ContactSelector::all().with_filters([
            FieldFilter::new(ContactField::Company, FilterValue::Text("Acme".to_string())),
            FieldFilter::new(ContactField::IsEditing, FilterValue::Bool(false)),
            FieldFilter::new(ContactField::Address, FilterValue::Null),
            FieldFilter::new(ContactField::Name, FilterValue::Bool(true)),
        ]);
        let mut params = Params::default();
        let sql = where_clause(&selector, &mut params);
        assert_eq!(
            sql,
            " WHERE company = $1 AND is_editing = $2 AND address IS NULL AND FALSE"
        );
        assert_eq!(params.values.len(), 2);
    }

    #[test]
    fn test_empty_selector_has_no_where() {
        let mut params = Params::default();
        assert_eq!(where_clause(&ContactSelector::all(), &mut params), "");
    }

    #[test]
    fn test_order_clause() {
        assert_eq!(
            order_clause(SortOrder::default()),
            " ORDER BY name COLLATE \"C\" ASC NULLS FIRST, created_at ASC, id ASC"
        );
        assert_eq!(
            order_clause(SortOrder::descending(ContactField::CreatedAt)),
            " ORDER BY created_at DESC NULLS LAST, created_at ASC, id ASC"
        );
    }

    #[test]
    fn test_db_config_default() {
        let config = DbConfig::default();
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "rolodex");
        assert_eq!(config.max_size, 16);
    }
}

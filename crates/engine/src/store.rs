//! Transactional relational substrate (spec §4.1).
//!
//! `Store` is a thin wrapper over [`risk_core::DatabasePool`] that owns
//! schema bootstrap. Every other module borrows `store.pool()` directly;
//! there is no repository abstraction layer on top, since every repository
//! in this crate speaks Postgres and nothing else.

use risk_core::DatabasePool;
use sqlx::PgPool;

const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");

#[derive(Clone)]
pub struct Store {
    db: DatabasePool,
}

impl Store {
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        self.db.get()
    }

    /// Creates every table and index named in spec §4.1 if absent. Statements
    /// are split on `;` the same way the teacher's tenant-schema bootstrap
    /// does; DDL here carries no user-controlled identifiers so no quoting
    /// step is needed.
    pub async fn bootstrap_schema(&self) -> risk_core::Result<()> {
        for statement in SCHEMA_SQL.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            sqlx::query(statement).execute(self.pool()).await?;
        }
        Ok(())
    }

    pub async fn check_health(&self) -> risk_core::Result<()> {
        self.db.check_health().await
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PostgreSQL connector (behind the `pg` feature).
//!
//! Executes each step's statements inside one transaction (Postgres has
//! transactional DDL for everything this engine emits) and holds the plan
//! lock as a session-scoped advisory lock on a dedicated connection.

use crate::capability::Capabilities;
use crate::connector::{Connector, ConnectorError, PlanLock};
use crate::render::{render_statements, render_step};
use async_trait::async_trait;
use molt_core::{MigrationStep, Schema};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Connection, PgConnection, Row};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Advisory lock key for plan application ("molt" in ASCII).
const PLAN_LOCK_KEY: i64 = 0x6d6f_6c74;

/// Connector for a PostgreSQL target.
#[derive(Clone)]
pub struct PostgresConnector {
    pool: PgPool,
    url: String,
    /// Dedicated connection holding the advisory lock while a plan applies.
    /// Advisory locks are session-scoped, so the lock must live on one
    /// connection, not on whichever the pool hands out next.
    lock_conn: Arc<Mutex<Option<PgConnection>>>,
}

impl PostgresConnector {
    /// Connect to the target database.
    pub async fn connect(url: &str) -> Result<Self, ConnectorError> {
        let pool = PgPoolOptions::new().max_connections(4).connect(url).await?;
        Ok(Self {
            pool,
            url: url.to_string(),
            lock_conn: Arc::new(Mutex::new(None)),
        })
    }

    async fn execute_statements(&self, statements: &[String]) -> Result<(), ConnectorError> {
        let mut tx = self.pool.begin().await?;
        for statement in statements {
            debug!(statement = %statement, "executing");
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl Connector for PostgresConnector {
    fn connector_type(&self) -> &'static str {
        "postgres"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::full()
    }

    async fn apply_step(&self, step: &MigrationStep) -> Result<(), ConnectorError> {
        self.execute_statements(&render_statements(step)).await
    }

    async fn revert_step(&self, step: &MigrationStep) -> Result<(), ConnectorError> {
        let inverse = step
            .invert()
            .ok_or_else(|| ConnectorError::NotInvertible(step.describe()))?;
        self.execute_statements(&render_statements(&inverse)).await
    }

    fn render_preview(&self, step: &MigrationStep) -> String {
        render_step(step)
    }

    async fn introspect(&self) -> Result<Schema, ConnectorError> {
        // Live introspection is the describer collaborator's job; this
        // connector only executes steps.
        Err(ConnectorError::Backend(
            "postgres connector does not introspect; supply the current schema from the schema source"
                .to_string(),
        ))
    }

    async fn acquire_lock(&self) -> Result<PlanLock, ConnectorError> {
        let mut guard = self.lock_conn.lock().await;
        if guard.is_some() {
            return Err(ConnectorError::LockHeld);
        }

        let mut conn = PgConnection::connect(&self.url).await?;
        let row = sqlx::query("SELECT pg_try_advisory_lock($1) AS locked")
            .bind(PLAN_LOCK_KEY)
            .fetch_one(&mut conn)
            .await?;
        let locked: bool = row.try_get("locked")?;
        if !locked {
            // Dropping the connection releases nothing; we never held the lock.
            return Err(ConnectorError::LockHeld);
        }

        *guard = Some(conn);
        Ok(PlanLock::new(PLAN_LOCK_KEY as u64))
    }

    async fn release_lock(&self, lock: PlanLock) -> Result<(), ConnectorError> {
        let mut guard = self.lock_conn.lock().await;
        let Some(mut conn) = guard.take() else {
            return Err(ConnectorError::UnknownLock(lock.token()));
        };
        sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(PLAN_LOCK_KEY)
            .execute(&mut conn)
            .await?;
        conn.close().await?;
        Ok(())
    }
}

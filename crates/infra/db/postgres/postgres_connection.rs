use std::time::Duration;

use anyhow::{Context, Result};
use diesel::{
    Connection, PgConnection,
    connection::CacheSize,
    r2d2::{ConnectionManager, CustomizeConnection, Error as R2d2Error, Pool},
};
use tracing::info;

const POOL_MAX_SIZE: u32 = 16;
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

// Transaction-mode poolers (pgbouncer, supavisor) reject named prepared statements.
#[derive(Debug, Default)]
struct PoolerCompatible;

impl CustomizeConnection<PgConnection, R2d2Error> for PoolerCompatible {
    fn on_acquire(&self, conn: &mut PgConnection) -> std::result::Result<(), R2d2Error> {
        conn.set_prepared_statement_cache_size(CacheSize::Disabled);
        Ok(())
    }
}

pub type PgPoolSquad = Pool<ConnectionManager<PgConnection>>;

/// Builds the pool and opens the first connection, so a bad `DATABASE_URL` fails startup.
pub fn establish_connection(database_url: &str) -> Result<PgPoolSquad> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(POOL_MAX_SIZE)
        .connection_timeout(POOL_CONNECTION_TIMEOUT)
        .connection_customizer(Box::new(PoolerCompatible))
        .build(manager)
        .context("failed to build postgres connection pool")?;

    info!(max_size = POOL_MAX_SIZE, "db: postgres pool ready");
    Ok(pool)
}

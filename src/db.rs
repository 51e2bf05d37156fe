//! SQLite connection pool for the loyalty ledger.
//!
//! Pooled connections use WAL mode with foreign keys enforced. A locked
//! database is waited on for up to [`BUSY_TIMEOUT`].

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError, PooledConnection};
use diesel::sqlite::SqliteConnection;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Pragmas applied to each connection as it is acquired.
#[derive(Debug)]
struct LedgerPragmas {
    busy_timeout: Duration,
}

impl LedgerPragmas {
    fn sql(&self) -> String {
        format!(
            "PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; \
             PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        )
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for LedgerPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&self.sql())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the pool for `database_url`, a SQLite file path.
pub fn establish_connection_pool(database_url: &str) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(LedgerPragmas {
            busy_timeout: BUSY_TIMEOUT,
        }))
        .build(manager)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pragmas_enable_foreign_keys_and_wait_on_locks() {
        let sql = LedgerPragmas {
            busy_timeout: Duration::from_millis(1500),
        }
        .sql();
        assert!(sql.contains("PRAGMA foreign_keys = ON;"));
        assert!(sql.contains("PRAGMA busy_timeout = 1500;"));
    }
}

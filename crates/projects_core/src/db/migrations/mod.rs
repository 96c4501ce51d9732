//! Embedded schema migrations, tracked with `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

// Versions must stay strictly increasing.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "projects",
    sql: include_str!("0001_projects.sql"),
}];

/// Schema version a fully migrated database reports.
pub fn latest_version() -> u32 {
    latest_of(MIGRATIONS)
}

/// Brings the connection's schema up to [`latest_version`].
///
/// All pending migrations share one transaction, so a failure leaves the
/// database at the version it had before the call.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    apply(conn, MIGRATIONS)
}

/// Reads the version recorded in `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn latest_of(migrations: &[Migration]) -> u32 {
    migrations.last().map_or(0, |migration| migration.version)
}

fn apply(conn: &mut Connection, migrations: &[Migration]) -> DbResult<()> {
    let from_version = schema_version(conn)?;
    let latest = latest_of(migrations);

    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Migration> = migrations
        .iter()
        .filter(|migration| migration.version > from_version)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in pending {
        tx.execute_batch(migration.sql)
            .and_then(|()| {
                tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
            })
            .map_err(|source| DbError::Migration {
                version: migration.version,
                name: migration.name,
                source,
            })?;
        debug!(
            "event=db_migrate_step module=db version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from_version} to_version={latest}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply, schema_version, Migration};
    use crate::db::DbError;
    use rusqlite::Connection;

    const GOOD: Migration = Migration {
        version: 1,
        name: "widgets",
        sql: "CREATE TABLE widget (id INTEGER PRIMARY KEY);",
    };
    const BROKEN: Migration = Migration {
        version: 2,
        name: "broken",
        sql: "CREATE TABLE gadget (id INTEGER PRIMARY KEY); INSERT INTO nowhere VALUES (1);",
    };

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [name],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn failing_migration_reports_version_and_rolls_back_the_run() {
        let mut conn = Connection::open_in_memory().unwrap();

        let err = apply(&mut conn, &[GOOD, BROKEN]).unwrap_err();
        match err {
            DbError::Migration { version, name, .. } => {
                assert_eq!(version, 2);
                assert_eq!(name, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(schema_version(&conn).unwrap(), 0);
        assert!(!table_exists(&conn, "widget"));
        assert!(!table_exists(&conn, "gadget"));
    }

    #[test]
    fn applies_only_pending_migrations() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply(&mut conn, &[GOOD]).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 1);

        // Re-running version 1 would fail on the existing table.
        apply(&mut conn, &[GOOD]).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 1);
        assert!(table_exists(&conn, "widget"));
    }
}

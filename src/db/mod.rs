pub mod channels;
pub mod conversations;
pub mod messages;
pub mod users;

use std::str::FromStr;

use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use time::{OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem, macros::format_description};
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!();

/// Opens the pool and brings the schema up to date.
///
/// An in-memory database lives and dies with its connection, so those get a
/// single connection that is never recycled.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(16)
    };

    let db_pool = pool_options.connect_with(options).await?;
    MIGRATOR.run(&db_pool).await?;
    info!(database_url, "database ready");

    Ok(db_pool)
}

/// Column named by a SQLite `UNIQUE constraint failed: table.column` error.
pub(crate) fn unique_violation_field(err: &sqlx::Error) -> Option<String> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    if !db_err.is_unique_violation() {
        return None;
    }
    if let Some(constraint) = db_err.constraint() {
        return Some(constraint.to_owned());
    }

    let columns = db_err.message().strip_prefix("UNIQUE constraint failed: ")?;
    let first = columns.split(", ").next()?;
    Some(first.rsplit('.').next().unwrap_or(first).to_owned())
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

/// Timestamps are stored as fixed-width UTC text so `ORDER BY` on the column is chronological.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z");

pub(crate) fn timestamp(at: OffsetDateTime) -> Result<String, sqlx::Error> {
    at.to_offset(UtcOffset::UTC)
        .format(TIMESTAMP_FORMAT)
        .map_err(|err| sqlx::Error::Encode(Box::new(err)))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn timestamps_sort_as_text() {
        let times = [
            datetime!(2025-01-01 0:00:05 UTC),
            datetime!(2025-01-01 0:00:05.1 UTC),
            datetime!(2025-01-01 0:00:05.12 UTC),
            datetime!(2025-01-01 0:00:05.5 UTC),
            datetime!(2025-01-01 0:00:06 -1),
        ];
        let stored: Vec<_> = times.iter().map(|at| timestamp(*at).unwrap()).collect();

        assert!(stored.iter().all(|s| s.len() == stored[0].len()));
        assert!(stored.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(stored[1], "2025-01-01T00:00:05.100000000Z");
        assert_eq!(stored[4], "2025-01-01T01:00:06.000000000Z");
    }

    #[tokio::test]
    async fn stored_timestamps_read_back() {
        let db_pool = connect("sqlite::memory:").await.unwrap();
        let at = datetime!(2025-01-01 0:00:05.12 UTC);

        let (read,): (OffsetDateTime,) = sqlx::query_as("SELECT ?")
            .bind(timestamp(at).unwrap())
            .fetch_one(&db_pool)
            .await
            .unwrap();
        assert_eq!(read, at);
    }
}

//! Versioned schema migrations.
//!
//! A linear state machine over integer versions `0 (bootstrap) -> LATEST`.
//! The installed version lives in the singleton `schema_version` row; the
//! table not existing at all is the bootstrap state. Each script runs in its
//! own transaction and stamps `schema_version` with its own number as its
//! final statement, so a crash mid-sequence resumes at the right script.

use sqlx::PgPool;

use crate::error::StorageError;

/// A schema migration.
#[derive(Debug)]
pub(crate) struct Migration {
    pub version: i32,
    pub name: &'static str,
    pub sql: &'static str,
}

/// Highest schema version this build knows how to reach.
pub const LATEST_VERSION: i32 = 3;

/// SQLSTATE for "relation does not exist".
const UNDEFINED_TABLE: &str = "42P01";

const MIGRATION_001: &str = r#"
CREATE TABLE schema_version (
    version INTEGER NOT NULL,
    upgraded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE books (
    id BIGSERIAL PRIMARY KEY,
    isbn TEXT NOT NULL,
    title TEXT NOT NULL,
    original_title TEXT,
    publication_year INTEGER,
    ratings_1 BIGINT NOT NULL DEFAULT 0,
    ratings_2 BIGINT NOT NULL DEFAULT 0,
    ratings_3 BIGINT NOT NULL DEFAULT 0,
    ratings_4 BIGINT NOT NULL DEFAULT 0,
    ratings_5 BIGINT NOT NULL DEFAULT 0,
    ratings_count BIGINT NOT NULL DEFAULT 0,
    average_rating DOUBLE PRECISION NOT NULL DEFAULT 0,
    image_url TEXT,
    small_image_url TEXT
);

CREATE INDEX idx_books_isbn ON books (isbn);
CREATE INDEX idx_books_title ON books (title);
CREATE INDEX idx_books_year ON books (publication_year);

CREATE TABLE authors (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE INDEX idx_authors_name ON authors (LOWER(TRIM(name)));

CREATE TABLE book_authors (
    book_id BIGINT NOT NULL REFERENCES books(id) ON DELETE CASCADE,
    author_id BIGINT NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
    PRIMARY KEY (book_id, author_id)
);

INSERT INTO schema_version (version) VALUES (1);
"#;

const MIGRATION_002: &str = r#"
CREATE EXTENSION IF NOT EXISTS pg_trgm;

ALTER TABLE books ADD COLUMN search_vec tsvector
    GENERATED ALWAYS AS (
        setweight(to_tsvector('english', COALESCE(title, '')), 'A') ||
        setweight(to_tsvector('english', COALESCE(original_title, '')), 'B')
    ) STORED;

CREATE INDEX idx_books_search_vec ON books USING GIN (search_vec);
CREATE INDEX idx_books_title_trgm ON books USING GIN (title gin_trgm_ops);

UPDATE schema_version SET version = 2, upgraded_at = NOW();
"#;

const MIGRATION_003: &str = r#"
CREATE UNIQUE INDEX idx_books_isbn_unique ON books (isbn);
DROP INDEX idx_books_isbn;

UPDATE schema_version SET version = 3, upgraded_at = NOW();
"#;

pub(crate) const MIGRATIONS: &[Migration] = &[
    Migration { version: 1, name: "initial catalog schema", sql: MIGRATION_001 },
    Migration { version: 2, name: "full-text search support", sql: MIGRATION_002 },
    Migration { version: 3, name: "unique isbn", sql: MIGRATION_003 },
];

/// Scripts still to apply when the store reports `installed`.
///
/// `installed > LATEST_VERSION` means the store was written by a newer
/// build; refusing to touch it is the only safe move.
pub(crate) fn upgrade_plan(installed: i32) -> Result<&'static [Migration], StorageError> {
    if installed > LATEST_VERSION {
        return Err(StorageError::Migration(format!(
            "installed schema version {installed} is newer than latest known {LATEST_VERSION}"
        )));
    }
    let start = MIGRATIONS.iter().position(|m| m.version > installed).unwrap_or(MIGRATIONS.len());
    Ok(&MIGRATIONS[start..])
}

/// Read the installed version, treating a missing `schema_version` table as
/// the bootstrap state. Any other read failure is fatal.
async fn installed_version(pool: &PgPool) -> Result<i32, StorageError> {
    match sqlx::query_scalar::<_, i32>("SELECT version FROM schema_version")
        .fetch_optional(pool)
        .await
    {
        Ok(Some(version)) => Ok(version),
        Ok(None) => Ok(0),
        Err(sqlx::Error::Database(db_err))
            if db_err.code().is_some_and(|c| c == UNDEFINED_TABLE) =>
        {
            Ok(0)
        },
        Err(err) => {
            Err(StorageError::Migration(format!("cannot read schema version: {err}")))
        },
    }
}

/// Bring the schema from whatever is installed up to [`LATEST_VERSION`].
pub(crate) async fn run_migrations(pool: &PgPool) -> Result<(), StorageError> {
    let installed = installed_version(pool).await?;
    let pending = upgrade_plan(installed)?;

    if pending.is_empty() {
        tracing::info!(version = installed, "schema already up to date");
        return Ok(());
    }

    tracing::info!(
        installed,
        target = LATEST_VERSION,
        pending = pending.len(),
        "upgrading catalog schema"
    );

    for migration in pending {
        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.sql).execute(&mut *tx).await.map_err(|err| {
            StorageError::Migration(format!(
                "script {} ({}) failed: {err}",
                migration.version, migration.name
            ))
        })?;
        tx.commit().await?;
        tracing::info!(version = migration.version, name = migration.name, "applied migration");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_table_is_gapless_and_ascending() {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version, i as i32 + 1);
        }
        assert_eq!(MIGRATIONS.last().unwrap().version, LATEST_VERSION);
    }

    #[test]
    fn bootstrap_state_applies_every_script() {
        let plan = upgrade_plan(0).unwrap();
        assert_eq!(plan.len(), MIGRATIONS.len());
        assert_eq!(plan[0].version, 1);
    }

    #[test]
    fn latest_state_applies_nothing() {
        assert!(upgrade_plan(LATEST_VERSION).unwrap().is_empty());
    }

    #[test]
    fn partial_state_resumes_after_installed() {
        let plan = upgrade_plan(1).unwrap();
        assert_eq!(plan.first().unwrap().version, 2);
        assert_eq!(plan.last().unwrap().version, LATEST_VERSION);
    }

    #[test]
    fn future_schema_is_fatal() {
        let err = upgrade_plan(LATEST_VERSION + 1).unwrap_err();
        assert!(matches!(err, StorageError::Migration(_)));
    }

    #[test]
    fn every_script_stamps_its_own_version() {
        for migration in MIGRATIONS {
            let stamp = if migration.version == 1 {
                format!("INSERT INTO schema_version (version) VALUES ({})", migration.version)
            } else {
                format!("UPDATE schema_version SET version = {}", migration.version)
            };
            let pos = migration.sql.find(&stamp);
            assert!(pos.is_some(), "script {} does not stamp its version", migration.version);
        }
    }
}

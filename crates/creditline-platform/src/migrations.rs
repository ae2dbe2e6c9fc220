use std::fs;
use std::path::{Path, PathBuf};

use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("cannot read migrations directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read migration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("migration {version} failed: {source}")]
    Apply {
        version: String,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub version: String,
    pub path: PathBuf,
}

/// Lists `*.sql` files in `dir` ordered by file name. The version is the
/// file stem, e.g. `001_initial_schema`.
pub fn discover_migrations(dir: &Path) -> Result<Vec<Migration>, MigrationError> {
    let entries = fs::read_dir(dir).map_err(|source| MigrationError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut migrations = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| MigrationError::Directory {
                path: dir.to_path_buf(),
                source,
            })?
            .path();

        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("sql") {
            continue;
        }

        let Some(version) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };

        migrations.push(Migration {
            version: version.to_string(),
            path,
        });
    }

    migrations.sort_by(|a, b| a.version.cmp(&b.version));
    Ok(migrations)
}

/// Applies pending migrations in order, each in its own transaction, and
/// returns the versions applied by this call.
pub async fn run_migrations(pool: &PgPool, dir: &Path) -> Result<Vec<String>, MigrationError> {
    let migrations = discover_migrations(dir)?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    let applied: Vec<String> = sqlx::query_scalar("SELECT version FROM schema_migrations")
        .fetch_all(pool)
        .await?;

    let mut newly_applied = Vec::new();
    for migration in migrations {
        if applied.contains(&migration.version) {
            continue;
        }

        let sql = fs::read_to_string(&migration.path).map_err(|source| MigrationError::Read {
            path: migration.path.clone(),
            source,
        })?;

        let apply_err = |source| MigrationError::Apply {
            version: migration.version.clone(),
            source,
        };

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(&sql)
            .execute(&mut *tx)
            .await
            .map_err(apply_err)?;
        sqlx::query("INSERT INTO schema_migrations (version) VALUES ($1)")
            .bind(&migration.version)
            .execute(&mut *tx)
            .await
            .map_err(apply_err)?;
        tx.commit().await.map_err(apply_err)?;

        info!(version = %migration.version, "applied migration");
        newly_applied.push(migration.version);
    }

    Ok(newly_applied)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn discovers_sql_files_in_name_order() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("010_late.sql"), "SELECT 1;").unwrap();
        fs::write(dir.join("002_second.sql"), "SELECT 1;").unwrap();
        fs::write(dir.join("001_first.sql"), "SELECT 1;").unwrap();
        fs::write(dir.join("README.md"), "notes").unwrap();
        fs::create_dir_all(dir.join("003_folder.sql")).unwrap();

        let versions: Vec<String> = discover_migrations(dir)
            .unwrap()
            .into_iter()
            .map(|migration| migration.version)
            .collect();

        assert_eq!(versions, vec!["001_first", "002_second", "010_late"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("nope");
        assert!(matches!(
            discover_migrations(&dir),
            Err(MigrationError::Directory { .. })
        ));
    }

    #[test]
    fn bundled_schema_migration_is_discoverable() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
        let migrations = discover_migrations(&dir).unwrap();

        assert_eq!(migrations[0].version, "001_initial_schema");
        let sql = fs::read_to_string(&migrations[0].path).unwrap();
        for table in crate::db::REQUIRED_TABLES {
            assert!(
                sql.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")),
                "schema migration does not create {table}"
            );
        }
    }
}

use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Таблицы приложения (минимальный bootstrap схемы).
///
/// JSON-поля хранятся как TEXT.
const SCHEMA: &[(&str, &str)] = &[
    (
        "a001_metadata_definition",
        r#"
        CREATE TABLE IF NOT EXISTS a001_metadata_definition (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            field_name TEXT NOT NULL,
            meta_type TEXT NOT NULL,
            searchable INTEGER NOT NULL DEFAULT 0,
            widget_attrs TEXT NOT NULL DEFAULT '{}',
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a002_metadata_collection",
        r#"
        CREATE TABLE IF NOT EXISTS a002_metadata_collection (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a002_metadata_collection_definition",
        r#"
        CREATE TABLE IF NOT EXISTS a002_metadata_collection_definition (
            collection_id INTEGER NOT NULL,
            definition_id INTEGER NOT NULL,
            position INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (collection_id, definition_id)
        );
        "#,
    ),
    (
        "a003_reference_record",
        r#"
        CREATE TABLE IF NOT EXISTS a003_reference_record (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            model TEXT NOT NULL,
            description TEXT NOT NULL,
            metadata_description TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a004_element",
        r#"
        CREATE TABLE IF NOT EXISTS a004_element (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            element_type_id INTEGER,
            element_metadata TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
];

fn sqlite_url(db_file: &str) -> anyhow::Result<String> {
    let path = std::path::Path::new(db_file);
    let absolute_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    // Разделители путей Windows и ведущий слэш перед буквой диска
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let prefix = if !normalized.starts_with('/') && normalized.contains(':') {
        "/"
    } else {
        ""
    };
    Ok(format!("sqlite://{}{}?mode=rwc", prefix, normalized))
}

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/metadata.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = sqlite_url(db_file)?;
    tracing::info!("Connecting to {}", db_url);
    let conn = Database::connect(&db_url).await?;

    for (table, sql) in SCHEMA {
        tracing::debug!("Ensuring table {}", table);
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", table, e))?;
    }

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_url_for_absolute_path() {
        assert_eq!(
            sqlite_url("/var/lib/metadata.db").unwrap(),
            "sqlite:///var/lib/metadata.db?mode=rwc"
        );
    }

    #[test]
    fn test_schema_covers_every_table() {
        let tables: Vec<&str> = SCHEMA.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            tables,
            vec![
                "a001_metadata_definition",
                "a002_metadata_collection",
                "a002_metadata_collection_definition",
                "a003_reference_record",
                "a004_element",
            ]
        );
        for (table, sql) in SCHEMA {
            assert!(sql.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table)));
        }
    }
}

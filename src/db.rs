use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

// profiles
//   id: uuid v7, handed back to clients
//   external_id: unique, one row per external identity
//   document: the caller's fields as a JSON object
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY NOT NULL,
    external_id TEXT NOT NULL UNIQUE,
    document TEXT NOT NULL
)
"#;

pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(database_url)
        .await?;

    migrate(&db_pool).await?;
    Ok(db_pool)
}

/// Single connection that never idles out, so `sqlite::memory:` keeps its data.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    migrate(&db_pool).await?;
    Ok(db_pool)
}

pub async fn migrate(db_pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(SCHEMA).execute(db_pool).await?;
    Ok(())
}

pub mod queries;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub use queries::categories::Category;
pub use queries::questions::{NewQuestion, Question};

use sqlx::Error;

use crate::config::DatabaseSettings;

pub async fn establish_connection(settings: &DatabaseSettings) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(&settings.url)?.create_if_missing(true);
    let mut pool = SqlitePoolOptions::new().max_connections(settings.max_connections);
    // every connection to an in-memory database is a separate database
    if settings.is_in_memory() {
        pool = pool
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    pool.connect_with(options).await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    let settings = crate::config::Settings::in_memory();
    let pool = establish_connection(&settings.database).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

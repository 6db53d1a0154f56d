use anyhow::Context;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

/// Open the connection pool and bring the schema up to date.
///
/// The scheme of `database_url` picks the driver, so the same pool type serves MySQL in
/// deployment and SQLite in tests.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<AnyPool> {
    sqlx::any::install_default_drivers();

    let db = AnyPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("could not connect to database_url")?;

    // This embeds database migrations in the application binary so we can ensure the database
    // is migrated correctly on startup
    sqlx::migrate!().run(&db).await?;

    Ok(db)
}

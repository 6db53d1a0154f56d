use anyhow::Context;
use clap::Parser;

use user_registry::config::Config;
use user_registry::http::{self, ApiContext};
use user_registry::logic::user;
use user_registry::{db, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // This returns an error if the `.env` file doesn't exist, but that's not what we want
    // since we're not going to use a `.env` file if we deploy this application.
    dotenv::dotenv().ok();

    // Initialize the logger.
    env_logger::init();

    // Parse our configuration from the environment.
    // This will exit with a help message if something is wrong.
    let config = Config::parse();
    config.log_summary();

    let database_url = config.database_url()?;
    let db = db::connect(&database_url, config.db_max_connections)
        .await
        .map_err(|e| {
            log::error!("[main] database connection failed: {e:?}");
            e
        })?;
    log::info!("[main] database connected");

    let ctx = ApiContext::new(config, db);

    if ctx.config.seed_users > 0 {
        seed::seed_users(
            &user::Handler::new(ctx.db.clone()),
            ctx.credentials.as_ref(),
            ctx.config.seed_users,
        )
        .await
        .context("failed to seed users")?;
    }

    // Finally, we spin up our API.
    http::serve(ctx).await?;

    Ok(())
}

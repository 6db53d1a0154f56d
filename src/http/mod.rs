use crate::config::Config;
use crate::credential::CredentialCheck;
use anyhow::Context;
use axum::{Extension, Router};
use sqlx::AnyPool;
use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Defines a common error type to use for all request handlers.
mod error;

// Modules introducing API routes. The names match the routes listed in the module
// documentation of each file.
mod health;
mod users;

pub use error::{Error, ResultExt};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The core type through which handler functions can access common API state.
///
/// This can be accessed by adding a parameter `Extension<ApiContext>` to a handler function's
/// parameters.
///
/// The pool is owned here and handed to each `logic` handler; nothing holds a connection
/// at module level.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<Config>,
    pub db: AnyPool,
    pub credentials: Arc<dyn CredentialCheck>,
}

impl ApiContext {
    pub fn new(config: Config, db: AnyPool) -> Self {
        let credentials = config.password_scheme.checker();

        Self {
            config: Arc::new(config),
            db,
            credentials,
        }
    }
}

pub async fn serve(ctx: ApiContext) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, ctx.config.port));
    let app = api_router(ctx);

    log::info!("server is listening at {addr}");

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .context("error running HTTP server")
}

/// Build the full application: every route, static files as the fallback, and the shared
/// layers.
pub fn api_router(ctx: ApiContext) -> Router {
    let static_files = ServeDir::new(&ctx.config.static_dir);

    // This is the order that the modules were authored in.
    Router::new()
        .merge(health::router())
        .merge(users::router())
        .fallback_service(static_files)
        .layer(
            ServiceBuilder::new()
                // Enables logging. Use `RUST_LOG=tower_http=debug`
                .layer(TraceLayer::new_for_http())
                .layer(Extension(ctx)),
        )
}

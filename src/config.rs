use anyhow::Context;

use crate::credential::PasswordScheme;

/// The configuration parameters for the application.
///
/// These can either be passed on the command line, or pulled from environment variables.
/// The latter is preferred as environment variables are one of the recommended ways to
/// get configuration from Kubernetes Secrets in deployment.
///
/// For development convenience, these can also be read from a `.env` file in the working
/// directory where the application is started.
///
/// See `.env.sample` in the repository root for details.
#[derive(clap::Parser, Debug, Clone)]
pub struct Config {
    /// Full connection URL for the database. When set, the `DB_*` parts are ignored.
    ///
    /// `mysql://` is used in deployment; `sqlite://` works for local runs and tests.
    #[clap(long, env)]
    pub database_url: Option<String>,

    #[clap(long, env, default_value = "localhost")]
    pub db_host: String,

    #[clap(long, env, default_value_t = 3306)]
    pub db_port: u16,

    #[clap(long, env, default_value = "root")]
    pub db_user: String,

    #[clap(long, env, default_value = "", hide_env_values = true)]
    pub db_password: String,

    #[clap(long, env)]
    pub db_name: Option<String>,

    /// Upper bound on open database connections held by the pool.
    #[clap(long, env, default_value_t = 5)]
    pub db_max_connections: u32,

    /// The port the HTTP server listens on.
    #[clap(long, env, default_value_t = 8080)]
    pub port: u16,

    /// How passwords are stored and checked before an edit or delete.
    #[clap(long, env, value_enum, default_value_t = PasswordScheme::Plaintext)]
    pub password_scheme: PasswordScheme,

    /// Directory served for any path no route matches.
    #[clap(long, env, default_value = "public")]
    pub static_dir: String,

    /// Insert this many randomly generated users at startup.
    #[clap(long, env, default_value_t = 0)]
    pub seed_users: usize,
}

impl Config {
    /// Resolve the database connection URL, either taken verbatim from `DATABASE_URL`
    /// or assembled from the `DB_*` parts with credentials percent-encoded.
    pub fn database_url(&self) -> anyhow::Result<String> {
        if let Some(url) = &self.database_url {
            return Ok(url.clone());
        }

        let db_name = self
            .db_name
            .as_deref()
            .context("DB_NAME must be set when DATABASE_URL is not")?;

        let mut url = url::Url::parse(&format!("mysql://{}", self.db_host))
            .with_context(|| format!("invalid DB_HOST {:?}", self.db_host))?;

        url.set_port(Some(self.db_port))
            .map_err(|_| anyhow::anyhow!("cannot set port on {url}"))?;
        url.set_username(&self.db_user)
            .map_err(|_| anyhow::anyhow!("cannot set DB_USER on {url}"))?;
        if !self.db_password.is_empty() {
            url.set_password(Some(&self.db_password))
                .map_err(|_| anyhow::anyhow!("cannot set DB_PASSWORD on {url}"))?;
        }
        url.set_path(db_name);

        Ok(url.to_string())
    }

    /// Log what the process picked up from its environment, without leaking the password.
    pub fn log_summary(&self) {
        log::info!("[config] DATABASE_URL = {}", mask(self.database_url.is_some()));
        log::info!("[config] DB_HOST = {}", self.db_host);
        log::info!("[config] DB_PORT = {}", self.db_port);
        log::info!("[config] DB_USER = {}", self.db_user);
        log::info!("[config] DB_PASSWORD = {}", mask(!self.db_password.is_empty()));
        log::info!("[config] DB_NAME = {:?}", self.db_name);
        log::info!("[config] PORT = {}", self.port);
        log::info!("[config] PASSWORD_SCHEME = {:?}", self.password_scheme);
    }
}

fn mask(set: bool) -> &'static str {
    if set {
        "SET"
    } else {
        "NOT SET"
    }
}

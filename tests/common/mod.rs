//! Shared harness: the full router backed by a real SQLite file in a temp directory,
//! migrated the same way as in production.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use clap::Parser;
use sqlx::AnyPool;
use tempfile::TempDir;
use tower::util::ServiceExt;

use user_registry::config::Config;
use user_registry::dto::user::User;
use user_registry::http::{api_router, ApiContext};
use user_registry::logic::user::{Handler, UsersHandler};

pub struct Response {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

pub struct TestApp {
    router: Router,
    pub db: AnyPool,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_scheme("plaintext").await
    }

    pub async fn with_scheme(password_scheme: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            temp_dir.path().join("test.db").display()
        );

        let config = Config::parse_from([
            "user-registry",
            "--database-url",
            db_url.as_str(),
            "--password-scheme",
            password_scheme,
            "--static-dir",
            "public",
            "--seed-users",
            "0",
        ]);
        let db = user_registry::db::connect(&db_url, 1)
            .await
            .expect("Failed to connect");

        let router = api_router(ApiContext::new(config, db.clone()));

        Self {
            router,
            db,
            _temp_dir: temp_dir,
        }
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send("GET", uri, None).await
    }

    /// Send a form-encoded body. `form` must already be URL-encoded.
    pub async fn form(&self, method: &str, uri: &str, form: &str) -> Response {
        self.send(method, uri, Some(form)).await
    }

    async fn send(&self, method: &str, uri: &str, form: Option<&str>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match form {
            Some(form) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();

        Response {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn create(&self, id: &str, username: &str, password: &str) -> Response {
        self.form(
            "POST",
            "/user",
            &format!(
                "id={id}&username={username}&email={username}%40x.com&password={password}&birthdate=1990-01-01"
            ),
        )
        .await
    }

    pub async fn find(&self, id: &str) -> Option<User> {
        Handler::new(self.db.clone()).find_user(id).await.unwrap()
    }

    pub async fn count(&self) -> i64 {
        Handler::new(self.db.clone()).count_users().await.unwrap()
    }
}

pub fn assert_redirects_to_list(response: &Response) {
    assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
    assert_eq!(response.location.as_deref(), Some("/user"));
}

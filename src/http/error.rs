use axum::response::{IntoResponse, Response};
use http::StatusCode;
use sqlx::error::{DatabaseError, ErrorKind};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// A common error type that can be used throughout the API.
///
/// Can be returned in a `Result` from an API handler function.
///
/// Every variant renders as a `text/plain` body with its own status code, so a caller
/// can tell a missing user from a credential mismatch from a database failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Return `400 Bad Request` when a required form field is missing or blank.
    #[error("error in the request body")]
    BadRequest {
        errors: BTreeMap<Cow<'static, str>, Vec<Cow<'static, str>>>,
    },

    /// Return `403 Forbidden` when the submitted credentials don't match the stored ones.
    #[error("username or password incorrect")]
    Forbidden,

    /// Return `404 Not Found`
    #[error("user not found")]
    NotFound,

    /// Return `409 Conflict` when the client-generated id is already taken.
    #[error("a user with this id already exists")]
    Conflict,

    /// Automatically return `500 Internal Server Error` on a `sqlx::Error`.
    ///
    /// The underlying message is logged but never sent back to the client.
    #[error("an error occurred with the database")]
    Sqlx(#[from] sqlx::Error),

    #[error("an error occurred while rendering the page")]
    Template(#[from] askama::Error),

    /// Return `500 Internal Server Error` on a `anyhow::Error`.
    #[error("an internal server error occurred")]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Convenient constructor for `Error::BadRequest`.
    ///
    /// Multiple messages for the same field are collected in order.
    pub fn bad_request<K, V>(errors: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Cow<'static, str>>,
        V: Into<Cow<'static, str>>,
    {
        let mut error_map = BTreeMap::new();

        for (key, val) in errors {
            error_map
                .entry(key.into())
                .or_insert_with(Vec::new)
                .push(val.into());
        }

        Self::BadRequest { errors: error_map }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Sqlx(_) | Self::Template(_) | Self::Anyhow(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest { errors } => {
                let body = errors
                    .iter()
                    .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
                    .collect::<Vec<_>>()
                    .join("\n");

                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            Self::Sqlx(ref e) => {
                log::error!("SQLx error: {:?}", e);
            }

            Self::Template(ref e) => {
                log::error!("Template error: {:?}", e);
            }

            Self::Anyhow(ref e) => {
                log::error!("Generic error: {:?}", e);
            }

            // Other errors get mapped normally.
            _ => (),
        }

        (self.status_code(), self.to_string()).into_response()
    }
}

/// A little helper trait for more easily converting database constraint errors into API errors.
///
/// ```rust,ignore
/// let user_id = sqlx::query("insert into `user` (id, ...) values (?, ...)")
///     .bind(id)
///     .execute(&db)
///     .await
///     .on_unique_violation(|_| Error::Conflict)?;
/// ```
pub trait ResultExt<T> {
    /// If `self` contains a SQLx database error for a unique or primary key violation,
    /// transform the error.
    ///
    /// Otherwise, the result is passed through unchanged.
    fn on_unique_violation(
        self,
        f: impl FnOnce(Box<dyn DatabaseError>) -> Error,
    ) -> Result<T, Error>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<Error>,
{
    fn on_unique_violation(
        self,
        map_err: impl FnOnce(Box<dyn DatabaseError>) -> Error,
    ) -> Result<T, Error> {
        self.map_err(|e| match e.into() {
            Error::Sqlx(sqlx::Error::Database(dbe)) if dbe.kind() == ErrorKind::UniqueViolation => {
                map_err(dbe)
            }
            e => e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_distinct_per_outcome() {
        assert_eq!(Error::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(Error::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            Error::Sqlx(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn bad_request_groups_messages_by_field() {
        let err = Error::bad_request([
            ("username", "must not be empty"),
            ("email", "must not be empty"),
            ("username", "is required"),
        ]);

        let Error::BadRequest { errors } = err else {
            panic!("expected BadRequest");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["username"], vec!["must not be empty", "is required"]);
    }

    #[test]
    fn non_database_errors_pass_through_unique_violation_mapping() {
        let res: Result<(), Error> = Err(Error::NotFound);
        let mapped = res.on_unique_violation(|_| Error::Conflict);
        assert!(matches!(mapped, Err(Error::NotFound)));
    }
}

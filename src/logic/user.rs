use crate::{
    dto::user::{NewUser, User},
    http::{Error, Result, ResultExt},
};

use futures::TryStreamExt;
use sqlx::AnyPool;

const SELECT_USER: &str = r#"
    select id, username, email, password, cast(birthdate as char) as birthdate
    from `user`
"#;

pub trait UsersHandler {
    fn count_users(&self) -> impl std::future::Future<Output = Result<i64, Error>> + Send;

    fn list_users(&self) -> impl std::future::Future<Output = Result<Vec<User>, Error>> + Send;

    fn find_user(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, Error>> + Send;

    fn insert_user(&self, user: &NewUser)
        -> impl std::future::Future<Output = Result<(), Error>> + Send;

    fn update_username(
        &self,
        current: &User,
        username: &str,
    ) -> impl std::future::Future<Output = Result<(), Error>> + Send;

    fn delete_user(&self, current: &User)
        -> impl std::future::Future<Output = Result<(), Error>> + Send;
}

pub struct Handler {
    db: AnyPool,
}

impl Handler {
    pub fn new(db: AnyPool) -> Self {
        Self { db }
    }
}

impl UsersHandler for Handler {
    async fn count_users(&self) -> Result<i64, Error> {
        Ok(sqlx::query_scalar::<_, i64>("select count(*) from `user`")
            .fetch_one(&self.db)
            .await?)
    }

    // Sorted by username, then id, so the listing is stable between requests.
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        let users: Vec<User> = sqlx::query_as::<_, User>(&format!("{SELECT_USER} order by username, id"))
            .fetch(&self.db)
            .try_collect()
            .await
            .map_err(|e| {
                log::debug!("[list_users] failed reading rows: {e:?}");
                Error::Sqlx(e)
            })?;

        Ok(users)
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, Error> {
        Ok(
            sqlx::query_as::<_, User>(&format!("{SELECT_USER} where id = ?"))
                .bind(id)
                .fetch_optional(&self.db)
                .await?,
        )
    }

    // `user.password` must already have gone through `CredentialCheck::protect`.
    async fn insert_user(&self, user: &NewUser) -> Result<(), Error> {
        sqlx::query(
            r#"insert into `user` (id, username, email, password, birthdate) values (?, ?, ?, ?, ?)"#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.birthdate)
        .execute(&self.db)
        .await
        .on_unique_violation(|_| Error::Conflict)?;

        Ok(())
    }

    // Applies only if the row still carries the password that `current` was checked against.
    async fn update_username(&self, current: &User, username: &str) -> Result<(), Error> {
        // MySQL reports zero affected rows for a no-op update.
        if username == current.username {
            return Ok(());
        }

        let res = sqlx::query(
            r#"
                update `user`
                set username = ?
                where id = ? and password = ?
            "#,
        )
        .bind(username)
        .bind(&current.id)
        .bind(&current.password)
        .execute(&self.db)
        .await?;

        if res.rows_affected() == 0 {
            log::info!(
                "[update_username] user {} changed or vanished since it was read",
                current.id
            );
            return Err(Error::NotFound);
        }

        Ok(())
    }

    // Applies only if the row still matches the credentials `current` was checked against.
    async fn delete_user(&self, current: &User) -> Result<(), Error> {
        let res = sqlx::query(
            r#"
                delete from `user`
                where id = ? and username = ? and password = ?
            "#,
        )
        .bind(&current.id)
        .bind(&current.username)
        .bind(&current.password)
        .execute(&self.db)
        .await?;

        if res.rows_affected() == 0 {
            log::info!(
                "[delete_user] user {} changed or vanished since it was read",
                current.id
            );
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

use crate::{
    dto::user::{DeleteUser, NewUser, UpdateUser},
    http::{ApiContext, Error, Result},
    logic::user::{self, UsersHandler},
    views::{self, AddPage, DeletePage, EditPage, IndexPage, ShowPage},
};

use axum::extract::{Extension, Path};
use axum::response::{Html, Redirect};
use axum::routing::{get, patch};
use axum::{Form, Router};

pub fn router() -> Router {
    // HTML forms can only GET or POST, so the `/edit` and `/delete` pages post back to
    // themselves and share handlers with the native PATCH and DELETE routes.
    Router::new()
        .route("/", get(home))
        .route("/user", get(list_users).post(create_user))
        .route("/user/new", get(new_user_form))
        .route("/user/:id", patch(update_user).delete(delete_user))
        .route("/user/:id/edit", get(edit_user_form).post(update_user))
        .route("/user/:id/delete", get(delete_user_form).post(delete_user))
}

async fn home(ctx: Extension<ApiContext>) -> Result<Html<String>> {
    let handler = user::Handler::new(ctx.db.clone());
    let total_users = handler.count_users().await?;

    views::render(IndexPage { total_users })
}

async fn list_users(ctx: Extension<ApiContext>) -> Result<Html<String>> {
    let handler = user::Handler::new(ctx.db.clone());
    let users = handler.list_users().await?;
    let total_users = handler.count_users().await?;

    views::render(ShowPage { users, total_users })
}

async fn new_user_form() -> Result<Html<String>> {
    views::render(AddPage {
        id: uuid::Uuid::new_v4().to_string(),
    })
}

async fn create_user(ctx: Extension<ApiContext>, Form(mut req): Form<NewUser>) -> Result<Redirect> {
    require_present([
        ("id", req.id.as_str()),
        ("username", req.username.as_str()),
        ("email", req.email.as_str()),
        ("password", req.password.as_str()),
        ("birthdate", req.birthdate.as_str()),
    ])?;

    req.password = ctx.credentials.protect(req.password).await?;

    let handler = user::Handler::new(ctx.db.clone());
    handler.insert_user(&req).await.map_err(|e| {
        log::info!("[create_user] failed to insert user {}: {e}", req.id);
        e
    })?;

    Ok(Redirect::to("/user"))
}

// No existence check: the id is only echoed back into the form.
async fn delete_user_form(Path(id): Path<String>) -> Result<Html<String>> {
    views::render(DeletePage { id })
}

async fn delete_user(
    ctx: Extension<ApiContext>,
    Path(id): Path<String>,
    Form(req): Form<DeleteUser>,
) -> Result<Redirect> {
    require_present([
        ("username", req.username.as_str()),
        ("password", req.password.as_str()),
    ])?;

    let handler = user::Handler::new(ctx.db.clone());
    let user = handler.find_user(&id).await?.ok_or(Error::NotFound)?;

    if req.username != user.username {
        log::info!("[delete_user] username mismatch for user {id}");
        return Err(Error::Forbidden);
    }
    ctx.credentials
        .verify(req.password, user.password.clone())
        .await
        .map_err(|e| {
            log::info!("[delete_user] password rejected for user {id}");
            e
        })?;

    handler.delete_user(&user).await?;

    Ok(Redirect::to("/user"))
}

async fn edit_user_form(
    ctx: Extension<ApiContext>,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let handler = user::Handler::new(ctx.db.clone());
    let user = handler.find_user(&id).await?.ok_or(Error::NotFound)?;

    views::render(EditPage { user })
}

async fn update_user(
    ctx: Extension<ApiContext>,
    Path(id): Path<String>,
    Form(req): Form<UpdateUser>,
) -> Result<Redirect> {
    require_present([
        ("username", req.username.as_str()),
        ("password", req.password.as_str()),
    ])?;

    let handler = user::Handler::new(ctx.db.clone());
    let user = handler.find_user(&id).await?.ok_or(Error::NotFound)?;

    ctx.credentials
        .verify(req.password, user.password.clone())
        .await
        .map_err(|e| {
            log::info!("[update_user] password rejected for user {id}");
            e
        })?;

    handler.update_username(&user, &req.username).await?;

    Ok(Redirect::to("/user"))
}

/// Reject the request if any of the named fields is blank.
fn require_present<'a>(fields: impl IntoIterator<Item = (&'static str, &'a str)>) -> Result<()> {
    let missing = fields
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| (field, "must not be empty"))
        .collect::<Vec<_>>();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::bad_request(missing))
    }
}

use askama::Template;
use axum::response::Html;

use crate::dto::user::User;
use crate::http::Result;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub total_users: i64,
}

#[derive(Template)]
#[template(path = "show.html")]
pub struct ShowPage {
    pub users: Vec<User>,
    pub total_users: i64,
}

#[derive(Template)]
#[template(path = "add.html")]
pub struct AddPage {
    pub id: String,
}

#[derive(Template)]
#[template(path = "edit.html")]
pub struct EditPage {
    pub user: User,
}

#[derive(Template)]
#[template(path = "delete.html")]
pub struct DeletePage {
    pub id: String,
}

/// Render a page into a response body; a template failure becomes a 500.
pub fn render(page: impl Template) -> Result<Html<String>> {
    Ok(Html(page.render()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_page_escapes_user_input() {
        let page = ShowPage {
            users: vec![User {
                id: "u1".into(),
                username: "<script>".into(),
                email: "a@x.com".into(),
                password: "s3cr3t-pw".into(),
                birthdate: "1990-01-01".into(),
            }],
            total_users: 1,
        };

        let html = page.render().unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("s3cr3t-pw"));
    }
}

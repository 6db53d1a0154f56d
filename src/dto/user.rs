/// A row of the `user` table.
#[derive(serde::Serialize, sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// `YYYY-MM-DD`
    pub birthdate: String,
}

/// Submitted by the create form.
#[derive(serde::Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct NewUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub birthdate: String,
}

/// Submitted by the edit form. Only the username can change; the password authorizes it.
#[derive(serde::Deserialize, Default, Debug)]
#[serde(default)]
pub struct UpdateUser {
    pub username: String,
    pub password: String,
}

/// Submitted by the delete confirmation form.
#[derive(serde::Deserialize, Default, Debug)]
#[serde(default)]
pub struct DeleteUser {
    pub username: String,
    pub password: String,
}

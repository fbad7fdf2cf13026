use crate::model::role::Role;
use sqlx::FromRow;

/// Login identity. Its id doubles as the profile id.
#[derive(Debug, FromRow)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub password: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
}

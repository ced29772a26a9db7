use serde::{Deserialize, Serialize};

use crate::db::models::User;
use shared::UserInfo;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub username: String,
    pub exp: usize,
    pub iat: usize,
}

/// Form body shared by registration and login. Field names are the client's
/// wire contract.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub nombre_usuario: String,
    pub contrasena: String,
}

pub fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id,
        username: user.username.clone(),
    }
}

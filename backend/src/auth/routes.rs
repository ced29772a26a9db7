use actix_web::{HttpResponse, Result, web};
use log::error;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::db::dynamodb_repository::{DynamoDbRepository, RepositoryError};
use crate::db::models::User;
use shared::{LoginResponse, RegisterResponse};

use super::jwt::JwtService;
use super::models::{CredentialsForm, user_info};

/// SHA-256 hexdigest, the scheme the existing account base was created with.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub async fn register(
    form: web::Form<CredentialsForm>,
    db_repo: web::Data<DynamoDbRepository>,
) -> Result<HttpResponse> {
    let user = User::new(
        form.nombre_usuario.clone(),
        hash_password(&form.contrasena),
    );

    match db_repo.create_user(&user).await {
        Ok(()) => Ok(HttpResponse::Created().json(RegisterResponse {
            success: true,
            message: "Usuario creado exitosamente".to_string(),
            user_id: Some(user.id),
        })),
        Err(RepositoryError::UserExists) => Ok(HttpResponse::BadRequest().json(RegisterResponse {
            success: false,
            message: "El usuario ya existe".to_string(),
            user_id: None,
        })),
        Err(e) => {
            error!("Failed to create user {}: {:?}", form.nombre_usuario, e);
            Ok(HttpResponse::InternalServerError().json(RegisterResponse {
                success: false,
                message: "Error al crear usuario".to_string(),
                user_id: None,
            }))
        }
    }
}

pub async fn login(
    form: web::Form<CredentialsForm>,
    db_repo: web::Data<DynamoDbRepository>,
    jwt_service: web::Data<JwtService>,
) -> Result<HttpResponse> {
    let rejection = json!({
        "exito": false,
        "mensaje": "Usuario o contraseña incorrectos"
    });

    let user = match db_repo.get_user_by_username(&form.nombre_usuario).await {
        Ok(user) => user,
        Err(RepositoryError::NotFound) => {
            return Ok(HttpResponse::Unauthorized().json(rejection));
        }
        Err(e) => {
            error!("Failed to look up user {}: {:?}", form.nombre_usuario, e);
            return Ok(HttpResponse::InternalServerError().json(json!({
                "exito": false,
                "mensaje": "Error al verificar usuario"
            })));
        }
    };

    if user.password_hash != hash_password(&form.contrasena) {
        return Ok(HttpResponse::Unauthorized().json(rejection));
    }

    let token = match jwt_service.generate_token(&user) {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to generate token for {}: {:?}", user.username, e);
            return Ok(HttpResponse::InternalServerError().json(json!({
                "exito": false,
                "mensaje": "Error al iniciar sesión"
            })));
        }
    };

    log::info!("User logged in: {}", user.username);
    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        message: "Inicio de sesión exitoso".to_string(),
        token,
        user: user_info(&user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_sha256_hexdigest() {
        // Known vector: sha256("admin123")
        assert_eq!(
            hash_password("admin123"),
            "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9"
        );
        assert_eq!(hash_password("admin123").len(), 64);
        assert_ne!(hash_password("admin123"), hash_password("admin124"));
    }
}

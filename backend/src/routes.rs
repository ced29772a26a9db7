use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::{error, info};
use serde_json::json;
use std::io::Write;

use crate::analysis::{AnalysisError, AnalysisService};
use crate::auth::middleware::AuthenticatedUser;
use crate::auth::routes as auth_routes;
use crate::db::dynamodb_repository::DynamoDbRepository;
use crate::db::models::ScanRecord;
use crate::storage::s3_service::S3Service;
use shared::{AnalysisResponse, HistoryEntry, HistoryResponse, StatsResponse, UserStats};

#[derive(serde::Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(welcome)))
        .service(web::resource("/api/registro").route(web::post().to(auth_routes::register)))
        .service(web::resource("/api/login").route(web::post().to(auth_routes::login)))
        .service(web::resource("/api/analizar").route(web::post().to(analyze_image)))
        .service(web::resource("/api/historial").route(web::get().to(scan_history)))
        .service(web::resource("/api/estadisticas").route(web::get().to(user_stats)));
}

async fn welcome() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "mensaje": "Bienvenido a Mayaflora API",
        "version": "1.0",
        "descripcion": "Sistema de detección de hongos en hojas de orquídeas"
    }))
}

async fn analyze_image(
    user: AuthenticatedUser,
    mut payload: Multipart,
    analysis: web::Data<AnalysisService>,
    db_repo: web::Data<DynamoDbRepository>,
    image_store: web::Data<S3Service>,
) -> Result<HttpResponse, Error> {
    let mut image_data = Vec::new();

    while let Ok(Some(mut field)) = payload.try_next().await {
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            image_data.write_all(&data)?;
        }
        // First non-empty field is the upload.
        if !image_data.is_empty() {
            break;
        }
    }

    if image_data.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "No se recibió ninguna imagen".to_string(),
        }));
    }

    let username = match db_repo.get_user_by_id(user.0).await {
        Ok(Some(account)) => account.username,
        Ok(None) => {
            return Ok(HttpResponse::Unauthorized().json(ErrorResponse {
                error: "Usuario no encontrado".to_string(),
            }));
        }
        Err(e) => {
            error!("Failed to load user {}: {:?}", user.0, e);
            return Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Error al analizar imagen".to_string(),
            }));
        }
    };

    info!("Analyzing upload of {} bytes for {}", image_data.len(), username);
    let diagnosis = match analysis.analyze(&image_data).await {
        Ok(diagnosis) => diagnosis,
        Err(err @ AnalysisError::InvalidImage) => {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse {
                error: err.to_string(),
            }));
        }
        Err(AnalysisError::Classifier { reason }) => {
            error!("Analysis aborted for {}: {}", username, reason);
            return Ok(HttpResponse::InternalServerError().json(ErrorResponse { error: reason }));
        }
    };

    // Archive and record in the background; the diagnosis is already final
    // and a persistence failure must not disturb the response.
    let db_repo = db_repo.get_ref().clone();
    let image_store = image_store.get_ref().clone();
    let user_id = user.0;
    let verdict = diagnosis.verdict;
    let confidence = diagnosis.confidence;
    let record_username = username.clone();
    actix_web::rt::spawn(async move {
        let image_key = match image_store.archive_scan(user_id, &image_data).await {
            Ok(key) => Some(key),
            Err(e) => {
                error!("Failed to archive scan image for {}: {}", record_username, e);
                None
            }
        };

        let record = ScanRecord::new(user_id, record_username, image_key, verdict, confidence);
        if let Err(e) = db_repo.record_scan(&record).await {
            error!("Failed to record scan {}: {:?}", record.id, e);
        }
    });

    Ok(HttpResponse::Ok().json(AnalysisResponse::from(diagnosis)))
}

async fn scan_history(
    user: AuthenticatedUser,
    db_repo: web::Data<DynamoDbRepository>,
) -> HttpResponse {
    match db_repo.scans_for_user(user.0).await {
        Ok(records) => {
            info!("Retrieved {} scans for user {}", records.len(), user.0);
            let history: Vec<HistoryEntry> =
                records.into_iter().map(HistoryEntry::from).collect();
            HttpResponse::Ok().json(HistoryResponse {
                success: true,
                history,
            })
        }
        Err(e) => {
            error!("Failed to fetch history for user {}: {:?}", user.0, e);
            HttpResponse::InternalServerError().json(json!({
                "exito": false,
                "mensaje": "Error al obtener historial"
            }))
        }
    }
}

async fn user_stats(
    user: AuthenticatedUser,
    db_repo: web::Data<DynamoDbRepository>,
) -> HttpResponse {
    match db_repo.scans_for_user(user.0).await {
        Ok(records) => {
            let total_scans = records.len() as u64;
            let diseased = records
                .iter()
                .filter(|record| record.verdict.is_diseased())
                .count() as u64;

            HttpResponse::Ok().json(StatsResponse {
                success: true,
                stats: UserStats {
                    total_scans,
                    diseased,
                    healthy: total_scans - diseased,
                },
            })
        }
        Err(e) => {
            error!("Failed to fetch stats for user {}: {:?}", user.0, e);
            HttpResponse::InternalServerError().json(json!({
                "exito": false,
                "mensaje": "Error al obtener estadísticas"
            }))
        }
    }
}

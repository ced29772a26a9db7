mod analysis;
mod auth;
mod config;
mod db;
mod routes;
mod storage;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use analysis::AnalysisService;
use analysis::classifier::LeafClassifier;
use analysis::config::AnalysisConfig;
use auth::jwt::JwtService;
use auth::middleware::AuthMiddleware;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use config::AppConfig;
use db::dynamodb_repository::DynamoDbRepository;
use routes::configure_routes;
use std::env;
use storage::s3_service::S3Service;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    dotenv::dotenv().ok();
    let app_config = AppConfig::from_env();

    // Initialize AWS configuration
    let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;

    // Create AWS clients
    let dynamodb_client = DynamoDbClient::new(&aws_config);
    let s3_client = S3Client::new(&aws_config);

    // Create repository and services
    let db_repo = DynamoDbRepository::new(
        dynamodb_client,
        app_config.users_table.clone(),
        app_config.scans_table.clone(),
    );
    let image_store = S3Service::new(s3_client, app_config.s3_bucket.clone());

    if app_config.huggingface_api_key.is_empty() {
        log::warn!("HUGGINGFACE_API_KEY is not set; classification requests will be rejected.");
    }
    log::info!("Classifier model: {}", app_config.huggingface_model);

    let classifier = LeafClassifier::new(
        app_config.classifier_endpoint(),
        app_config.huggingface_api_key.clone(),
    );
    let analysis_service = AnalysisService::new(AnalysisConfig::default(), classifier);

    // Create authentication services
    let jwt_service = JwtService::new(&app_config.jwt_secret);
    let auth_middleware = AuthMiddleware::new(jwt_service.clone());

    let bind_address = format!("0.0.0.0:{}", app_config.port);
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(auth_middleware.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::AUTHORIZATION,
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::new(analysis_service.clone()))
            .app_data(web::Data::new(db_repo.clone()))
            .app_data(web::Data::new(image_store.clone()))
            .app_data(web::Data::new(jwt_service.clone()))
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}

use std::env;
use url::Url;

const INFERENCE_API_BASE: &str = "https://api-inference.huggingface.co/models";
const DEFAULT_MODEL: &str = "google/vit-base-patch16-224";

/// Environment-derived service configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: String,
    pub users_table: String,
    pub scans_table: String,
    pub s3_bucket: String,
    pub jwt_secret: String,
    pub huggingface_api_key: String,
    pub huggingface_model: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT").unwrap_or_else(|_| "8000".to_string()),
            users_table: env::var("DYNAMODB_USERS_TABLE").unwrap().to_string(),
            scans_table: env::var("DYNAMODB_SCANS_TABLE").unwrap().to_string(),
            s3_bucket: env::var("S3_BUCKET_NAME").unwrap().to_string(),
            jwt_secret: env::var("JWT_SECRET").unwrap().to_string(),
            huggingface_api_key: env::var("HUGGINGFACE_API_KEY").unwrap_or_default(),
            huggingface_model: env::var("HUGGINGFACE_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }

    /// Inference endpoint for the configured model.
    pub fn classifier_endpoint(&self) -> Url {
        Url::parse(&format!(
            "{}/{}",
            INFERENCE_API_BASE, self.huggingface_model
        ))
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_embeds_the_model_name() {
        let config = AppConfig {
            port: "8000".to_string(),
            users_table: "users".to_string(),
            scans_table: "scans".to_string(),
            s3_bucket: "bucket".to_string(),
            jwt_secret: "secret".to_string(),
            huggingface_api_key: String::new(),
            huggingface_model: DEFAULT_MODEL.to_string(),
        };

        assert_eq!(
            config.classifier_endpoint().as_str(),
            "https://api-inference.huggingface.co/models/google/vit-base-patch16-224"
        );
    }
}

use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Archive for uploaded scan images. Keys are
/// `scans/<user_id>/<UTC timestamp>.jpg`; the diagnosis never depends on the
/// archive succeeding.
#[derive(Clone)]
pub struct S3Service {
    client: Client,
    bucket_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum S3ServiceError {
    #[error("S3 error: {0}")]
    S3(String),
    #[error("File too large")]
    FileTooLarge,
}

impl S3Service {
    pub fn new(client: Client, bucket_name: String) -> Self {
        Self {
            client,
            bucket_name,
        }
    }

    pub fn calculate_image_hash(image_data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(image_data);
        hex::encode(hasher.finalize())
    }

    pub fn generate_scan_key(user_id: Uuid, timestamp: &str) -> String {
        format!("scans/{}/{}.jpg", user_id, timestamp)
    }

    pub fn validate_image_size(image_data: &[u8]) -> Result<(), S3ServiceError> {
        const MAX_SIZE: usize = 50 * 1024 * 1024;
        if image_data.len() > MAX_SIZE {
            return Err(S3ServiceError::FileTooLarge);
        }
        Ok(())
    }

    /// Upload one scan image, returning the generated object key.
    pub async fn archive_scan(
        &self,
        user_id: Uuid,
        image_data: &[u8],
    ) -> Result<String, S3ServiceError> {
        S3Service::validate_image_size(image_data)?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let key = S3Service::generate_scan_key(user_id, &timestamp);
        let body = ByteStream::from(image_data.to_vec());

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .body(body)
            .content_type("image/jpeg")
            .send()
            .await
            .map_err(|e| S3ServiceError::S3(e.to_string()))?;

        log::debug!(
            "archived scan {} ({} bytes, sha256 {})",
            key,
            image_data.len(),
            S3Service::calculate_image_hash(image_data)
        );
        Ok(key)
    }
}

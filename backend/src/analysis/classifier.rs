use std::time::Duration;

use image::codecs::jpeg::JpegEncoder;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use shared::{Classification, Prediction};
use url::Url;

/// One conditional retry: the inference endpoint answers 503 while the model
/// loads, and a single fixed-delay second attempt is enough to ride that out.
/// Any other status never retries.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_warmup_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_warmup_retries: 1,
            backoff: Duration::from_secs(10),
        }
    }
}

/// Client for the hosted label-classification endpoint.
///
/// The sole I/O boundary of the analysis pipeline. Every failure mode
/// (undecodable upload, transport error, timeout, non-success status) is
/// folded into [`Classification::Failed`]; callers never see a raw transport
/// error.
#[derive(Clone)]
pub struct LeafClassifier {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl LeafClassifier {
    pub fn new(endpoint: Url, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }

    /// Classify one uploaded image.
    ///
    /// The upload is re-encoded as RGB JPEG (quality 95) before transmission
    /// so the payload semantics do not depend on the original format. An
    /// upload that does not decode fails here without any network call.
    pub async fn classify(&self, image_bytes: &[u8]) -> Classification {
        let payload = match normalize_payload(image_bytes) {
            Ok(payload) => payload,
            Err(reason) => {
                log::warn!("rejecting upload before classification: {}", reason);
                return Classification::failed(reason);
            }
        };

        log::info!(
            "classifying {} byte payload via {}",
            payload.len(),
            self.endpoint
        );
        self.request_predictions(payload).await
    }

    /// Two-attempt request loop; the second attempt only ever happens after a
    /// model-warming 503 and one backoff sleep.
    async fn request_predictions(&self, payload: Vec<u8>) -> Classification {
        let mut warmup_left = self.retry.max_warmup_retries;

        loop {
            let response = self
                .client
                .post(self.endpoint.clone())
                .bearer_auth(&self.api_key)
                .header(CONTENT_TYPE, "application/octet-stream")
                .timeout(self.timeout)
                .body(payload.clone())
                .send()
                .await;

            let response = match response {
                Ok(response) => response,
                Err(err) => {
                    log::error!("classifier request failed: {}", err);
                    return Classification::failed(format!(
                        "Error al conectar con Hugging Face: {}",
                        err
                    ));
                }
            };

            let status = response.status();
            log::debug!("classifier answered {}", status);

            if status == StatusCode::OK {
                let body = match response.text().await {
                    Ok(body) => body,
                    Err(err) => {
                        return Classification::failed(format!(
                            "Error al conectar con Hugging Face: {}",
                            err
                        ));
                    }
                };
                return match parse_predictions(&body) {
                    Ok(predictions) => Classification::Predictions(predictions),
                    Err(reason) => Classification::failed(reason),
                };
            }

            if status == StatusCode::SERVICE_UNAVAILABLE && warmup_left > 0 {
                warmup_left -= 1;
                log::info!(
                    "model warming up, retrying once in {}s",
                    self.retry.backoff.as_secs()
                );
                tokio::time::sleep(self.retry.backoff).await;
                continue;
            }

            let retried = warmup_left < self.retry.max_warmup_retries;
            log::error!("classifier error {} (retried: {})", status, retried);
            return Classification::failed(if retried {
                format!("Modelo no disponible: {}", status.as_u16())
            } else {
                format!("Error en Hugging Face: {}", status.as_u16())
            });
        }
    }
}

/// Decode-validate the upload and re-encode it canonically.
fn normalize_payload(image_bytes: &[u8]) -> Result<Vec<u8>, String> {
    let decoded = image::load_from_memory(image_bytes)
        .map_err(|err| format!("Imagen inválida: {}", err))?;
    let rgb = decoded.to_rgb8();

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, 95)
        .encode_image(&rgb)
        .map_err(|err| format!("Imagen inválida: {}", err))?;
    Ok(buffer)
}

/// Parse the endpoint's label/score array. An empty array is a failure: the
/// success variant guarantees at least one prediction.
fn parse_predictions(body: &str) -> Result<Vec<Prediction>, String> {
    let predictions: Vec<Prediction> = serde_json::from_str(body)
        .map_err(|err| format!("Respuesta de Hugging Face no válida: {}", err))?;
    if predictions.is_empty() {
        return Err("Respuesta de Hugging Face vacía".to_string());
    }
    Ok(predictions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn parses_label_score_array() {
        let body = r#"[
            {"label": "daisy", "score": 0.81},
            {"label": "leaf blight", "score": 0.12}
        ]"#;

        let predictions = parse_predictions(body).unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].label, "daisy");
        assert!((predictions[0].score - 0.81).abs() < 1e-6);
    }

    #[test]
    fn empty_prediction_array_is_a_failure() {
        assert!(parse_predictions("[]").is_err());
    }

    #[test]
    fn malformed_body_is_a_failure() {
        assert!(parse_predictions("{\"error\": \"oops\"}").is_err());
        assert!(parse_predictions("not json").is_err());
    }

    #[test]
    fn normalize_rejects_undecodable_bytes() {
        let reason = normalize_payload(b"definitely not an image").unwrap_err();
        assert!(reason.starts_with("Imagen inválida"));
    }

    #[test]
    fn normalize_produces_jpeg() {
        let image = RgbImage::from_pixel(8, 8, Rgb([10, 120, 10]));
        let mut png = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let payload = normalize_payload(&png).unwrap();
        // JPEG SOI marker
        assert_eq!(&payload[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn retry_policy_defaults_to_single_fixed_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_warmup_retries, 1);
        assert_eq!(policy.backoff, Duration::from_secs(10));
    }
}

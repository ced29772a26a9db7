pub mod classifier;
pub mod color;
pub mod config;
pub mod fusion;

use shared::Diagnosis;

use classifier::LeafClassifier;
use color::ColorAnalyzer;
use config::AnalysisConfig;
use fusion::DiagnosisEngine;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The upload does not decode as an image. Mapped to a client error; no
    /// network call is made.
    #[error("El archivo no es una imagen válida")]
    InvalidImage,
    /// The classifier could not produce a usable result. The whole diagnosis
    /// aborts; there is no color-only fallback.
    #[error("{reason}")]
    Classifier { reason: String },
}

/// One self-contained analysis pipeline: decode, score, classify, fuse.
///
/// Holds no mutable state, so any number of analyses may run concurrently on
/// independent requests.
#[derive(Clone)]
pub struct AnalysisService {
    scorer: ColorAnalyzer,
    classifier: LeafClassifier,
    engine: DiagnosisEngine,
}

impl AnalysisService {
    pub fn new(config: AnalysisConfig, classifier: LeafClassifier) -> Self {
        Self {
            scorer: ColorAnalyzer::new(config.color),
            classifier,
            engine: DiagnosisEngine::new(config.fusion),
        }
    }

    /// Run the full pipeline for one uploaded image.
    pub async fn analyze(&self, image_bytes: &[u8]) -> Result<Diagnosis, AnalysisError> {
        let decoded =
            image::load_from_memory(image_bytes).map_err(|_| AnalysisError::InvalidImage)?;
        let sample = decoded.to_rgb8();

        let color = self.scorer.score(&sample);
        log::info!(
            "color analysis: dark {:.2}%, brown {:.2}%, yellow {:.2}% -> {}/100",
            color.dark_pct,
            color.brown_pct,
            color.yellow_pct,
            color.overall
        );

        let classification = self.classifier.classify(image_bytes).await;

        let diagnosis = self.engine.fuse(&color, &classification)?;
        log::info!(
            "diagnosis: {} ({:.2}%)",
            diagnosis.verdict,
            diagnosis.confidence
        );
        Ok(diagnosis)
    }
}

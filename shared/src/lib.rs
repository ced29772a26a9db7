use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Binary outcome of a leaf scan. The string forms are the wire/store values
/// the mobile client already understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum Verdict {
    #[serde(rename = "Sana")]
    #[strum(serialize = "Sana")]
    Healthy,
    #[serde(rename = "Enferma")]
    #[strum(serialize = "Enferma")]
    Diseased,
}

impl Verdict {
    pub fn is_diseased(&self) -> bool {
        matches!(self, Verdict::Diseased)
    }
}

/// One label/score pair as returned by the inference endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

/// Outcome of one classifier round trip. `Predictions` always carries at
/// least one element; an empty response is folded into `Failed` upstream.
#[derive(Debug, Clone, Serialize, Deserialize, derive_more::From)]
pub enum Classification {
    Predictions(Vec<Prediction>),
    #[from(ignore)]
    Failed { reason: String },
}

impl Classification {
    pub fn failed(reason: impl Into<String>) -> Self {
        Classification::Failed {
            reason: reason.into(),
        }
    }

    /// Highest-scoring prediction, if any succeeded.
    pub fn best(&self) -> Option<&Prediction> {
        match self {
            Classification::Predictions(preds) => preds.iter().max_by(|a, b| {
                a.score
                    .partial_cmp(&b.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            Classification::Failed { .. } => None,
        }
    }
}

/// Pixel-heuristic score for one image: 0-100 overall plus the three band
/// percentages that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorScore {
    pub overall: u8,
    pub dark_pct: f64,
    pub brown_pct: f64,
    pub yellow_pct: f64,
}

impl ColorScore {
    pub const ZERO: ColorScore = ColorScore {
        overall: 0,
        dark_pct: 0.0,
        brown_pct: 0.0,
        yellow_pct: 0.0,
    };
}

/// Final fused result for one analyzed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub verdict: Verdict,
    pub confidence: f64,
    pub message: String,
    pub detail: String,
}

// Wire DTOs. JSON field names stay in Spanish: they are the contract with the
// deployed mobile client.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(rename = "exito")]
    pub success: bool,
    #[serde(rename = "resultado")]
    pub verdict: Verdict,
    #[serde(rename = "confianza")]
    pub confidence: f64,
    #[serde(rename = "mensaje")]
    pub message: String,
    #[serde(rename = "detalle")]
    pub detail: String,
}

impl From<Diagnosis> for AnalysisResponse {
    fn from(diagnosis: Diagnosis) -> Self {
        Self {
            success: true,
            verdict: diagnosis.verdict,
            confidence: diagnosis.confidence,
            message: diagnosis.message,
            detail: diagnosis.detail,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    #[serde(rename = "nombre_usuario")]
    pub username: String,
    #[serde(rename = "resultado")]
    pub verdict: Verdict,
    #[serde(rename = "confianza")]
    pub confidence: f64,
    #[serde(rename = "fecha_escaneo")]
    pub scanned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(rename = "exito")]
    pub success: bool,
    #[serde(rename = "historial")]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(rename = "total_escaneos")]
    pub total_scans: u64,
    #[serde(rename = "plantas_enfermas")]
    pub diseased: u64,
    #[serde(rename = "plantas_sanas")]
    pub healthy: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(rename = "exito")]
    pub success: bool,
    #[serde(rename = "estadisticas")]
    pub stats: UserStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    #[serde(rename = "nombre_usuario")]
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(rename = "exito")]
    pub success: bool,
    #[serde(rename = "mensaje")]
    pub message: String,
    #[serde(rename = "usuario_id", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "exito")]
    pub success: bool,
    #[serde(rename = "mensaje")]
    pub message: String,
    pub token: String,
    #[serde(rename = "usuario")]
    pub user: UserInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_wire_strings() {
        assert_eq!(Verdict::Healthy.to_string(), "Sana");
        assert_eq!(Verdict::Diseased.to_string(), "Enferma");
        assert_eq!("Enferma".parse::<Verdict>().unwrap(), Verdict::Diseased);
        assert_eq!(serde_json::to_string(&Verdict::Healthy).unwrap(), "\"Sana\"");
    }

    #[test]
    fn best_prediction_picks_highest_score() {
        let classification = Classification::from(vec![
            Prediction {
                label: "leaf".into(),
                score: 0.2,
            },
            Prediction {
                label: "blight".into(),
                score: 0.7,
            },
            Prediction {
                label: "pot".into(),
                score: 0.1,
            },
        ]);

        assert_eq!(classification.best().unwrap().label, "blight");
    }

    #[test]
    fn failed_classification_has_no_best() {
        assert!(Classification::failed("timeout").best().is_none());
    }

    #[test]
    fn diagnosis_roundtrip_preserves_all_fields() {
        let diagnosis = Diagnosis {
            verdict: Verdict::Diseased,
            confidence: 35.0,
            message: "Posible presencia de hongos (Confianza: 35.0%)".to_string(),
            detail: "leaf blight".to_string(),
        };

        let json = serde_json::to_string(&diagnosis).unwrap();
        let back: Diagnosis = serde_json::from_str(&json).unwrap();

        assert_eq!(diagnosis, back);
    }

    #[test]
    fn analysis_response_uses_spanish_keys() {
        let response = AnalysisResponse::from(Diagnosis {
            verdict: Verdict::Healthy,
            confidence: 70.0,
            message: "La orquídea parece estar sana (Confianza: 70.0%)".to_string(),
            detail: "No se detectaron anomalías significativas".to_string(),
        });

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["exito"], true);
        assert_eq!(value["resultado"], "Sana");
        assert_eq!(value["confianza"], 70.0);
        assert!(value.get("mensaje").is_some());
        assert!(value.get("detalle").is_some());
    }
}

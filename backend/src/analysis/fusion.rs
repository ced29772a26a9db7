use shared::{Classification, ColorScore, Diagnosis, Verdict};

use super::AnalysisError;
use super::config::FusionConfig;

/// Combines the color heuristic and the classifier output into one verdict.
///
/// The decision is an ordered cascade: the first matching rule wins, with no
/// blending across rules.
///
/// 1. dominant color score → diseased on the heuristic alone
/// 2. disease-keyword label with usable confidence → diseased
/// 3. moderate color score → diseased
/// 4. otherwise → healthy
///
/// A failed classification aborts the diagnosis instead of degrading to the
/// color-only rules; color evidence without classifier corroboration was
/// judged too weak to stand alone. Note rules 1 and 3 only consume the color
/// score, so this abort is stricter than the cascade strictly requires. Kept
/// as-is deliberately.
#[derive(Debug, Clone)]
pub struct DiagnosisEngine {
    config: FusionConfig,
}

impl DiagnosisEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn fuse(
        &self,
        color: &ColorScore,
        classification: &Classification,
    ) -> Result<Diagnosis, AnalysisError> {
        let best = match classification {
            Classification::Failed { reason } => {
                return Err(AnalysisError::Classifier {
                    reason: reason.clone(),
                });
            }
            Classification::Predictions(_) => {
                classification.best().ok_or_else(|| AnalysisError::Classifier {
                    reason: "Respuesta de Hugging Face vacía".to_string(),
                })?
            }
        };

        let cfg = &self.config;
        let overall = color.overall as f64;

        if color.overall > cfg.color_dominant {
            let confidence = f64::min(overall + cfg.dominant_bonus, cfg.dominant_cap);
            return Ok(Diagnosis {
                verdict: Verdict::Diseased,
                confidence: round2(confidence),
                message: format!(
                    "Se detectaron manchas sospechosas de hongos (Confianza: {:.1}%)",
                    confidence
                ),
                detail: format!("Análisis de color: {}/100", color.overall),
            });
        }

        let label = best.label.to_lowercase();
        let label_pct = best.score as f64 * 100.0;
        log::debug!("best prediction: {} ({:.2}%)", label, label_pct);

        if self.matches_disease_keyword(&label) && label_pct > cfg.label_min_pct {
            let confidence = (label_pct + overall) / 2.0;
            return Ok(Diagnosis {
                verdict: Verdict::Diseased,
                confidence: round2(confidence),
                message: format!(
                    "Posible presencia de hongos (Confianza: {:.1}%)",
                    confidence
                ),
                detail: label,
            });
        }

        if color.overall > cfg.color_moderate {
            let confidence = f64::max(overall, cfg.moderate_floor);
            return Ok(Diagnosis {
                verdict: Verdict::Diseased,
                confidence: round2(confidence),
                message: format!(
                    "Se detectaron anomalías en las hojas (Confianza: {:.1}%)",
                    confidence
                ),
                detail: "Manchas detectadas".to_string(),
            });
        }

        let confidence = f64::max(100.0 - overall, cfg.healthy_floor);
        Ok(Diagnosis {
            verdict: Verdict::Healthy,
            confidence: round2(confidence),
            message: format!(
                "La orquídea parece estar sana (Confianza: {:.1}%)",
                confidence
            ),
            detail: "No se detectaron anomalías significativas".to_string(),
        })
    }

    fn matches_disease_keyword(&self, label: &str) -> bool {
        self.config
            .disease_keywords
            .iter()
            .any(|keyword| label.contains(keyword))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Prediction;

    fn engine() -> DiagnosisEngine {
        DiagnosisEngine::new(FusionConfig::default())
    }

    fn score(overall: u8) -> ColorScore {
        ColorScore {
            overall,
            dark_pct: 0.0,
            brown_pct: 0.0,
            yellow_pct: 0.0,
        }
    }

    fn prediction(label: &str, confidence: f32) -> Classification {
        Classification::Predictions(vec![Prediction {
            label: label.to_string(),
            score: confidence,
        }])
    }

    #[test]
    fn dominant_color_score_wins_over_any_label() {
        // Even a confidently healthy label cannot override heavy spotting.
        let diagnosis = engine()
            .fuse(&score(65), &prediction("healthy plant", 0.99))
            .unwrap();

        assert_eq!(diagnosis.verdict, Verdict::Diseased);
        assert_eq!(diagnosis.confidence, 75.0);
        assert!(diagnosis.message.contains("manchas sospechosas"));
        assert_eq!(diagnosis.detail, "Análisis de color: 65/100");
    }

    #[test]
    fn dominant_confidence_is_capped() {
        let diagnosis = engine()
            .fuse(&score(100), &prediction("leaf", 0.5))
            .unwrap();

        assert_eq!(diagnosis.confidence, 95.0);
    }

    #[test]
    fn disease_keyword_with_usable_confidence_averages_both_signals() {
        let diagnosis = engine()
            .fuse(&score(20), &prediction("Leaf Blight", 0.5))
            .unwrap();

        assert_eq!(diagnosis.verdict, Verdict::Diseased);
        assert_eq!(diagnosis.confidence, 35.0);
        assert_eq!(diagnosis.detail, "leaf blight");
    }

    #[test]
    fn keyword_below_confidence_threshold_is_ignored() {
        // "blight" matches but 25% <= 30% threshold; clean color score wins.
        let diagnosis = engine()
            .fuse(&score(0), &prediction("leaf blight", 0.25))
            .unwrap();

        assert_eq!(diagnosis.verdict, Verdict::Healthy);
    }

    #[test]
    fn moderate_color_score_flags_spotting() {
        let diagnosis = engine()
            .fuse(&score(41), &prediction("flower pot", 0.9))
            .unwrap();

        assert_eq!(diagnosis.verdict, Verdict::Diseased);
        assert_eq!(diagnosis.confidence, 60.0);
        assert_eq!(diagnosis.detail, "Manchas detectadas");
    }

    #[test]
    fn clean_signals_yield_healthy_with_full_confidence() {
        let diagnosis = engine()
            .fuse(&score(0), &prediction("healthy plant", 0.9))
            .unwrap();

        assert_eq!(diagnosis.verdict, Verdict::Healthy);
        assert_eq!(diagnosis.confidence, 100.0);
        assert_eq!(diagnosis.detail, "No se detectaron anomalías significativas");
    }

    #[test]
    fn healthy_confidence_never_drops_below_floor() {
        let diagnosis = engine()
            .fuse(&score(40), &prediction("green leaf", 0.8))
            .unwrap();

        assert_eq!(diagnosis.verdict, Verdict::Healthy);
        assert_eq!(diagnosis.confidence, 70.0);
    }

    #[test]
    fn highest_scoring_label_drives_rule_two() {
        let classification = Classification::Predictions(vec![
            Prediction {
                label: "healthy plant".to_string(),
                score: 0.30,
            },
            Prediction {
                label: "brown rot".to_string(),
                score: 0.55,
            },
        ]);

        let diagnosis = engine().fuse(&score(10), &classification).unwrap();
        assert_eq!(diagnosis.verdict, Verdict::Diseased);
        assert_eq!(diagnosis.detail, "brown rot");
        assert_eq!(diagnosis.confidence, 32.5);
    }

    #[test]
    fn classifier_failure_aborts_even_when_color_alone_would_decide() {
        // Deliberate policy: a color score of 70 would satisfy the dominant
        // rule on its own, yet a failed classification still aborts.
        let result = engine().fuse(&score(70), &Classification::failed("Modelo no disponible: 503"));

        match result {
            Err(AnalysisError::Classifier { reason }) => {
                assert_eq!(reason, "Modelo no disponible: 503");
            }
            other => panic!("expected classifier failure, got {:?}", other),
        }
    }

    #[test]
    fn classifier_failure_aborts_for_low_color_scores_too() {
        assert!(
            engine()
                .fuse(&score(0), &Classification::failed("timeout"))
                .is_err()
        );
    }

    #[test]
    fn confidence_is_rounded_to_two_decimals() {
        // 0.333 * 100 = 33.3% label, averaged with 20 → 26.65
        let diagnosis = engine()
            .fuse(&score(20), &prediction("stem rot", 0.333))
            .unwrap();

        assert_eq!(diagnosis.confidence, 26.65);
    }
}

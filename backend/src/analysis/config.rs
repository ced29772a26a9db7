/// Fixed tables driving the color scorer and the fusion cascade.
///
/// Everything here is versioned configuration, not computed state. The values
/// are passed into the component constructors so tests can run the pipeline
/// with no ambient globals.

/// Pixel-band thresholds and per-band score contributions.
#[derive(Debug, Clone, Copy)]
pub struct ColorConfig {
    /// Luma below this counts as a dark spot.
    pub dark_luma: f64,
    /// Brown lesion band, exclusive RGB bounds.
    pub brown_red_min: u8,
    pub brown_red_max: u8,
    pub brown_green_min: u8,
    pub brown_green_max: u8,
    pub brown_blue_max: u8,
    /// Yellow mold/chlorosis band.
    pub yellow_red_min: u8,
    pub yellow_green_min: u8,
    pub yellow_blue_max: u8,
    /// Percentage a band must strictly exceed to contribute.
    pub dark_trigger_pct: f64,
    pub brown_trigger_pct: f64,
    pub yellow_trigger_pct: f64,
    /// All-or-nothing contributions; they sum to 100.
    pub dark_weight: u8,
    pub brown_weight: u8,
    pub yellow_weight: u8,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            dark_luma: 60.0,
            brown_red_min: 80,
            brown_red_max: 150,
            brown_green_min: 50,
            brown_green_max: 120,
            brown_blue_max: 80,
            yellow_red_min: 180,
            yellow_green_min: 180,
            yellow_blue_max: 120,
            dark_trigger_pct: 10.0,
            brown_trigger_pct: 3.0,
            yellow_trigger_pct: 2.0,
            dark_weight: 35,
            brown_weight: 40,
            yellow_weight: 25,
        }
    }
}

/// Thresholds, caps and floors of the verdict cascade.
#[derive(Debug, Clone, Copy)]
pub struct FusionConfig {
    /// Color score above which the heuristic alone decides.
    pub color_dominant: u8,
    /// Color score above which spotting still wins when no keyword matched.
    pub color_moderate: u8,
    /// Minimum label confidence (percent) for a keyword match to count.
    pub label_min_pct: f64,
    /// Confidence bonus and cap applied on the color-dominant rule.
    pub dominant_bonus: f64,
    pub dominant_cap: f64,
    /// Confidence floor on the moderate-spotting rule.
    pub moderate_floor: f64,
    /// Confidence floor on the healthy rule.
    pub healthy_floor: f64,
    pub disease_keywords: &'static [&'static str],
    pub healthy_keywords: &'static [&'static str],
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            color_dominant: 60,
            color_moderate: 40,
            label_min_pct: 30.0,
            dominant_bonus: 10.0,
            dominant_cap: 95.0,
            moderate_floor: 60.0,
            healthy_floor: 70.0,
            disease_keywords: DISEASE_KEYWORDS,
            healthy_keywords: HEALTHY_KEYWORDS,
        }
    }
}

/// Label substrings that indicate disease.
pub const DISEASE_KEYWORDS: &[&str] = &[
    "fungus",
    "fungi",
    "disease",
    "diseased",
    "unhealthy",
    "sick",
    "infection",
    "infected",
    "mold",
    "mould",
    "blight",
    "rot",
    "decay",
    "hongo",
    "enfermedad",
    "enferma",
    "infectada",
    "moho",
    "spot",
    "leaf spot",
    "rust",
    "wilt",
    "brown spot",
    "black spot",
    "damaged",
    "dead",
    "dying",
    "withered",
    "bacterial",
    "virus",
    "plague",
    "mushroom",
    "toadstool",
    "spore",
];

/// Label substrings that indicate a healthy plant. The cascade does not
/// consult this table today; it ships alongside the disease table for client
/// and tooling use.
pub const HEALTHY_KEYWORDS: &[&str] = &[
    "healthy",
    "normal",
    "good",
    "fresh",
    "green",
    "leaf",
    "sana",
    "saludable",
    "normal",
    "verde",
    "plant",
    "tree",
    "alive",
    "growing",
    "vibrant",
    "lush",
];

/// Bundle handed to [`crate::analysis::AnalysisService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisConfig {
    pub color: ColorConfig,
    pub fusion: FusionConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_weights_sum_to_full_scale() {
        let config = ColorConfig::default();
        assert_eq!(
            config.dark_weight as u16 + config.brown_weight as u16 + config.yellow_weight as u16,
            100
        );
    }

    #[test]
    fn keyword_tables_are_populated() {
        assert!(DISEASE_KEYWORDS.contains(&"blight"));
        assert!(DISEASE_KEYWORDS.contains(&"hongo"));
        assert!(HEALTHY_KEYWORDS.contains(&"healthy"));
    }
}

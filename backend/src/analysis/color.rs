use image::RgbImage;
use shared::ColorScore;

use super::config::ColorConfig;

/// Deterministic pixel heuristic for fungal spotting.
///
/// Scans every pixel once and scores three symptom bands: dark lesions (low
/// luma), brown lesions and yellow mold/chlorosis. Each band contributes a
/// fixed amount to the overall 0-100 score when its pixel share strictly
/// exceeds the configured trigger percentage. Pure and repeatable: the same
/// buffer always yields the same score.
#[derive(Debug, Clone)]
pub struct ColorAnalyzer {
    config: ColorConfig,
}

impl ColorAnalyzer {
    pub fn new(config: ColorConfig) -> Self {
        Self { config }
    }

    /// Score one decoded image. A degenerate (zero-pixel) image scores zero
    /// on every band rather than erroring.
    pub fn score(&self, image: &RgbImage) -> ColorScore {
        let total = image.width() as u64 * image.height() as u64;
        if total == 0 {
            return ColorScore::ZERO;
        }

        let cfg = &self.config;
        let mut dark = 0u64;
        let mut brown = 0u64;
        let mut yellow = 0u64;

        for pixel in image.pixels() {
            let [r, g, b] = pixel.0;

            let luma = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
            if luma < cfg.dark_luma {
                dark += 1;
            }

            if r > cfg.brown_red_min
                && r < cfg.brown_red_max
                && g > cfg.brown_green_min
                && g < cfg.brown_green_max
                && b < cfg.brown_blue_max
            {
                brown += 1;
            }

            if r > cfg.yellow_red_min && g > cfg.yellow_green_min && b < cfg.yellow_blue_max {
                yellow += 1;
            }
        }

        let dark_pct = dark as f64 / total as f64 * 100.0;
        let brown_pct = brown as f64 / total as f64 * 100.0;
        let yellow_pct = yellow as f64 / total as f64 * 100.0;

        // Contributions are all-or-nothing on strict comparisons; a band
        // sitting exactly on its trigger does not count.
        let mut overall = 0u8;
        if dark_pct > cfg.dark_trigger_pct {
            overall += cfg.dark_weight;
        }
        if brown_pct > cfg.brown_trigger_pct {
            overall += cfg.brown_weight;
        }
        if yellow_pct > cfg.yellow_trigger_pct {
            overall += cfg.yellow_weight;
        }

        ColorScore {
            overall,
            dark_pct,
            brown_pct,
            yellow_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    // Representative pixels for each band. The neutral pixel has luma 200 and
    // sits outside every RGB window.
    const NEUTRAL: [u8; 3] = [200, 200, 200];
    const DARK: [u8; 3] = [30, 30, 30];
    const BROWN: [u8; 3] = [120, 80, 40];
    const YELLOW: [u8; 3] = [200, 200, 50];

    fn analyzer() -> ColorAnalyzer {
        ColorAnalyzer::new(ColorConfig::default())
    }

    /// One-row image built from a pixel recipe: `count` copies of each value.
    fn strip(recipe: &[([u8; 3], u32)]) -> RgbImage {
        let width: u32 = recipe.iter().map(|(_, count)| count).sum();
        let mut pixels = recipe
            .iter()
            .flat_map(|(value, count)| std::iter::repeat(*value).take(*count as usize));
        RgbImage::from_fn(width, 1, |_, _| Rgb(pixels.next().unwrap()))
    }

    #[test]
    fn bright_clean_image_scores_zero() {
        let score = analyzer().score(&strip(&[(NEUTRAL, 100)]));
        assert_eq!(score.overall, 0);
        assert_eq!(score.dark_pct, 0.0);
        assert_eq!(score.brown_pct, 0.0);
        assert_eq!(score.yellow_pct, 0.0);
    }

    #[test]
    fn empty_image_scores_zero() {
        let empty = RgbImage::new(0, 0);
        assert_eq!(analyzer().score(&empty), ColorScore::ZERO);
    }

    #[test]
    fn each_band_contributes_its_fixed_weight() {
        let scorer = analyzer();

        // 20% dark
        let dark = scorer.score(&strip(&[(DARK, 20), (NEUTRAL, 80)]));
        assert_eq!(dark.overall, 35);

        // 10% brown
        let brown = scorer.score(&strip(&[(BROWN, 10), (NEUTRAL, 90)]));
        assert_eq!(brown.overall, 40);

        // 10% yellow
        let yellow = scorer.score(&strip(&[(YELLOW, 10), (NEUTRAL, 90)]));
        assert_eq!(yellow.overall, 25);

        // All three at once
        let all = scorer.score(&strip(&[(DARK, 20), (BROWN, 10), (YELLOW, 10), (NEUTRAL, 60)]));
        assert_eq!(all.overall, 100);
    }

    #[test]
    fn overall_is_always_a_sum_of_band_weights() {
        let scorer = analyzer();
        let images = [
            strip(&[(NEUTRAL, 100)]),
            strip(&[(DARK, 50), (NEUTRAL, 50)]),
            strip(&[(BROWN, 5), (NEUTRAL, 95)]),
            strip(&[(YELLOW, 3), (NEUTRAL, 97)]),
            strip(&[(DARK, 15), (BROWN, 4), (NEUTRAL, 81)]),
            strip(&[(DARK, 15), (YELLOW, 3), (NEUTRAL, 82)]),
            strip(&[(BROWN, 4), (YELLOW, 3), (NEUTRAL, 93)]),
            strip(&[(DARK, 15), (BROWN, 4), (YELLOW, 3), (NEUTRAL, 78)]),
        ];

        let valid = [0, 25, 35, 40, 60, 65, 75, 100];
        for image in &images {
            let score = scorer.score(image);
            assert!(valid.contains(&score.overall), "unexpected overall {}", score.overall);
        }
    }

    #[test]
    fn dark_band_boundary_is_strict() {
        let scorer = analyzer();

        // Exactly 10% dark: must not trigger the +35 contribution.
        let at_boundary = scorer.score(&strip(&[(DARK, 100), (NEUTRAL, 900)]));
        assert_eq!(at_boundary.dark_pct, 10.0);
        assert_eq!(at_boundary.overall, 0);

        // 10.1% dark: must trigger it.
        let over_boundary = scorer.score(&strip(&[(DARK, 101), (NEUTRAL, 899)]));
        assert!(over_boundary.dark_pct > 10.0);
        assert_eq!(over_boundary.overall, 35);
    }

    #[test]
    fn brown_band_window_is_exclusive() {
        let scorer = analyzer();

        // Channel values sitting exactly on the window bounds do not count.
        let on_bounds = strip(&[([80, 50, 40], 10), ([150, 120, 40], 10), (NEUTRAL, 80)]);
        let score = scorer.score(&on_bounds);
        assert_eq!(score.brown_pct, 0.0);

        // Just inside on every channel.
        let inside = strip(&[([81, 51, 79], 10), (NEUTRAL, 90)]);
        assert_eq!(scorer.score(&inside).brown_pct, 10.0);
    }

    #[test]
    fn luma_uses_standard_weighting() {
        let scorer = analyzer();

        // Pure green: luma = 0.587 * 255 = 149.7, not dark.
        let green = scorer.score(&strip(&[([0, 255, 0], 10)]));
        assert_eq!(green.dark_pct, 0.0);

        // Pure blue: luma = 0.114 * 255 = 29.07, dark.
        let blue = scorer.score(&strip(&[([0, 0, 255], 10)]));
        assert_eq!(blue.dark_pct, 100.0);

        // Pure red: luma = 0.299 * 255 = 76.2, not dark.
        let red = scorer.score(&strip(&[([255, 0, 0], 10)]));
        assert_eq!(red.dark_pct, 0.0);
    }

    #[test]
    fn identical_buffers_score_identically() {
        let scorer = analyzer();
        let image = strip(&[(DARK, 13), (BROWN, 7), (YELLOW, 5), (NEUTRAL, 75)]);
        assert_eq!(scorer.score(&image), scorer.score(&image));
    }
}

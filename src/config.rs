use crate::types::Config;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path))?;
        Ok(config)
    }

    /// Defaults apply only when the file does not exist; a broken file is
    /// still an error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Ok(Config::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.pushup;
        if p.duration_secs <= 0.0 {
            bail!("pushup.duration_secs must be positive");
        }
        if p.down_angle_deg >= p.up_angle_deg {
            bail!(
                "pushup.down_angle_deg ({}) must be below pushup.up_angle_deg ({})",
                p.down_angle_deg,
                p.up_angle_deg
            );
        }
        if !(0.0..=1.0).contains(&p.min_visibility) {
            bail!("pushup.min_visibility must be within [0, 1]");
        }

        let s = &self.skip;
        if s.duration_secs <= 0.0 || s.calibration_secs < 0.0 {
            bail!("skip durations must be positive");
        }
        if !(s.ema_alpha > 0.0 && s.ema_alpha <= 1.0) {
            bail!("skip.ema_alpha must be within (0, 1], got {}", s.ema_alpha);
        }
        if !(s.land_ratio > 0.0 && s.land_ratio <= 1.0) {
            bail!("skip.land_ratio must be within (0, 1], got {}", s.land_ratio);
        }
        if s.min_calibration_samples == 0 {
            bail!("skip.min_calibration_samples must be at least 1");
        }
        if !(0.0..=1.0).contains(&s.min_visibility) {
            bail!("skip.min_visibility must be within [0, 1]");
        }

        if self.model.input_width == 0 || self.model.input_height == 0 {
            bail!("model input dimensions must be non-zero");
        }
        if self.pushup.fourcc.chars().count() != 4 || self.skip.fourcc.chars().count() != 4 {
            bail!("fourcc codes must be exactly four characters");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BodySide, TensorLayout};

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pushup.up_angle_deg, 160.0);
        assert_eq!(config.pushup.down_angle_deg, 70.0);
        assert_eq!(config.skip.ema_alpha, 0.25);
        assert_eq!(config.skip.min_calibration_samples, 10);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
pushup:
  duration_secs: 30
  side: right
model:
  layout: nchw
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.pushup.duration_secs, 30.0);
        assert_eq!(config.pushup.side, BodySide::Right);
        assert_eq!(config.pushup.min_visibility, 0.7);
        assert_eq!(config.model.layout, TensorLayout::Nchw);
        assert_eq!(config.skip.output_dir, "skipping_sessions");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_angles() {
        let mut config = Config::default();
        config.pushup.down_angle_deg = 170.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_alpha() {
        let mut config = Config::default();
        config.skip.ema_alpha = 0.0;
        assert!(config.validate().is_err());
        config.skip.ema_alpha = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Config::load_or_default("definitely/not/here.yaml").unwrap();
        assert_eq!(config.capture.device_id, 0);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.yaml");
        let config = Config::load(path).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.display.quit_key, 'q');
        assert_eq!(config.skip.min_lower_limb, 1e-3);
        assert_eq!(config.pushup.fourcc, "XVID");
        assert_eq!(config.capture.input_path, None);
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let path =
            std::env::temp_dir().join(format!("rep-counter-bad-{}.yaml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "pushup: [not, a, map").unwrap();
        assert!(Config::load_or_default(path.to_str().unwrap()).is_err());
    }
}

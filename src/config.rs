use crate::error::{CropCareError, Result};
use crate::logic::generator::GeneratorSettings;
use crate::logic::DEFAULT_THRESHOLD;
use crate::scoring::TrainingParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_RULES_PATH: &str = "data/all_crops_stage_guide.json";
const MODEL_FILE: &str = "suitability_model.json";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub rules_path: PathBuf,
    /// Where `train` writes and `evaluate` reads the model. Defaults to the
    /// data directory.
    pub model_path: Option<PathBuf>,
    pub threshold: f64,
    pub generator: GeneratorConfig,
    pub training: TrainingParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub positives_per_stage: usize,
    pub negatives_per_stage: usize,
    pub seed: u64,
    pub outside_stretch: f64,
    pub two_feature_probability: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let settings = GeneratorSettings::default();
        Self {
            positives_per_stage: settings.positives_per_stage,
            negatives_per_stage: settings.negatives_per_stage,
            seed: 42,
            outside_stretch: settings.outside_stretch,
            two_feature_probability: settings.two_feature_probability,
        }
    }
}

impl GeneratorConfig {
    pub fn settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            positives_per_stage: self.positives_per_stage,
            negatives_per_stage: self.negatives_per_stage,
            outside_stretch: self.outside_stretch,
            two_feature_probability: self.two_feature_probability,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules_path: PathBuf::from(DEFAULT_RULES_PATH),
            model_path: None,
            threshold: DEFAULT_THRESHOLD,
            generator: GeneratorConfig::default(),
            training: TrainingParams::default(),
        }
    }
}

impl Config {
    /// Load from the override path, `config/config.yaml`, or the XDG config
    /// directory, in that order. With no override and no file, defaults apply.
    pub fn load(config_override: Option<&Path>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) if !p.exists() => {
                return Err(CropCareError::Config(format!(
                    "Config file not found at {:?}",
                    p
                )));
            }
            Some(p) => p.to_path_buf(),
            None => match Self::find_config_path() {
                Some(p) => p,
                None => {
                    tracing::warn!("No config.yaml found, using built-in defaults");
                    return Ok(Self::default());
                }
            },
        };

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| CropCareError::Config(format!("Failed to read config: {}", e)))?;
        let config = Self::from_yaml_str(&config_str)?;
        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content)?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| CropCareError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn find_config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("cropcare").join("config.yaml"))
            .filter(|p| p.exists())
    }

    /// Replace `${VAR}` with the variable's value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| CropCareError::Config(format!("Bad substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex_lite::Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        });
        Ok(result.into_owned())
    }

    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(CropCareError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )))
            }
        };

        unit("threshold", self.threshold)?;
        unit(
            "generator.two_feature_probability",
            self.generator.two_feature_probability,
        )?;
        unit("training.test_fraction", self.training.test_fraction)?;
        unit(
            "training.calibration_fraction",
            self.training.calibration_fraction,
        )?;

        if self.training.test_fraction >= 1.0 || self.training.calibration_fraction >= 1.0 {
            return Err(CropCareError::Config(
                "training fractions must leave rows to fit on".into(),
            ));
        }
        if !self.generator.outside_stretch.is_finite() || self.generator.outside_stretch <= 0.0 {
            return Err(CropCareError::Config(format!(
                "generator.outside_stretch must be positive, got {}",
                self.generator.outside_stretch
            )));
        }
        if self.training.learning_rate.is_nan() || self.training.learning_rate <= 0.0 {
            return Err(CropCareError::Config(format!(
                "training.learning_rate must be positive, got {}",
                self.training.learning_rate
            )));
        }
        if self.training.max_bins < 2 {
            return Err(CropCareError::Config(
                "training.max_bins must be at least 2".into(),
            ));
        }
        if self.training.l2_regularization < 0.0 || self.training.min_child_weight < 0.0 {
            return Err(CropCareError::Config(
                "training regularization terms must not be negative".into(),
            ));
        }
        Ok(())
    }

    pub fn data_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("CROPCARE_DATA_DIR") {
            return Ok(PathBuf::from(dir));
        }

        Ok(dirs::data_dir()
            .ok_or_else(|| CropCareError::Config("Cannot determine data directory".into()))?
            .join("cropcare"))
    }

    pub fn model_path(&self) -> Result<PathBuf> {
        match &self.model_path {
            Some(p) => Ok(p.clone()),
            None => Ok(Self::data_dir()?.join(MODEL_FILE)),
        }
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub aws: Option<AwsConfig>,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Named credentials profile (falls back to the SDK default chain)
    pub profile: Option<String>,
    /// Analysis region (falls back to the SDK default chain, then us-east-1)
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// CloudWatch lookback window for CPU utilization, in days
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Average CPU% below which a downsize is suggested
    #[serde(default = "default_low_cpu_threshold")]
    pub low_cpu_threshold: f64,
    /// Average CPU% above which a capacity warning is shown
    #[serde(default = "default_high_cpu_threshold")]
    pub high_cpu_threshold: f64,
    /// Resolve prices from the built-in table only, skipping the Price List API
    #[serde(default)]
    pub offline: bool,
}

fn default_lookback_days() -> u32 {
    14
}

fn default_low_cpu_threshold() -> f64 {
    crate::recommend::LOW_CPU_THRESHOLD
}

fn default_high_cpu_threshold() -> f64 {
    crate::recommend::HIGH_CPU_THRESHOLD
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            low_cpu_threshold: default_low_cpu_threshold(),
            high_cpu_threshold: default_high_cpu_threshold(),
            offline: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aws: Some(AwsConfig {
                profile: None, // SDK default chain
                region: None,  // SDK default chain, then us-east-1
            }),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            // Try .costctl.toml in current dir, then ~/.config/costctl/config.toml
            let local = PathBuf::from(".costctl.toml");
            if local.exists() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("costctl").join("config.toml"))
                    .unwrap_or_else(|| PathBuf::from(".costctl.toml"))
            }
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::NotFound(format!("{}: {}", config_path.display(), e)))?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                let mut msg = format!("{}: {}", config_path.display(), e);
                msg.push_str("\n  Common issues:");
                msg.push_str("\n    - Invalid TOML syntax");
                msg.push_str("\n    - Incorrect value types");
                msg.push_str("\n  Tip: Run 'costctl init' to create a fresh config file");
                ConfigError::ParseError(msg)
            })?;
            config.validate()?;
            Ok(config)
        } else {
            // Use defaults but warn if user explicitly provided a path
            if path.is_some() {
                eprintln!("WARNING: Config file not found: {}", config_path.display());
                eprintln!(
                    "   Using default configuration. Run 'costctl init' to create a config file."
                );
            }
            Ok(Config::default())
        }
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        // CloudWatch caps GetMetricStatistics at 1440 datapoints per query,
        // which at hourly buckets is 60 days.
        if self.analysis.lookback_days < 1 || self.analysis.lookback_days > 60 {
            return Err(ConfigError::InvalidValue {
                field: "analysis.lookback_days".to_string(),
                reason: format!("{} is out of range (1-60)", self.analysis.lookback_days),
            });
        }
        let low = self.analysis.low_cpu_threshold;
        let high = self.analysis.high_cpu_threshold;
        if low <= 0.0 || low >= high {
            return Err(ConfigError::InvalidValue {
                field: "analysis.low_cpu_threshold".to_string(),
                reason: format!("{} must be positive and below high_cpu_threshold ({})", low, high),
            });
        }
        if high > 100.0 {
            return Err(ConfigError::InvalidValue {
                field: "analysis.high_cpu_threshold".to_string(),
                reason: format!("{} is out of range (0-100)", high),
            });
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Region from config, if any. CLI flags take precedence over this.
    pub fn region(&self) -> Option<&str> {
        self.aws.as_ref().and_then(|a| a.region.as_deref())
    }

    /// Profile from config, if any. CLI flags take precedence over this.
    pub fn profile(&self) -> Option<&str> {
        self.aws.as_ref().and_then(|a| a.profile.as_deref())
    }
}

pub fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "output".to_string(),
            reason: format!(
                "{} already exists (use --force to overwrite)",
                output.display()
            ),
        }
        .into());
    }
    let config = Config::default();
    config.save(output)?;
    println!("Created config file: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CostctlError;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.aws.is_some());
        assert_eq!(config.analysis.lookback_days, 14);
        assert_eq!(config.analysis.low_cpu_threshold, 20.0);
        assert_eq!(config.analysis.high_cpu_threshold, 80.0);
        assert!(!config.analysis.offline);
        assert!(config.region().is_none());
        assert!(config.profile().is_none());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let mut config = Config::default();
        config.aws = Some(AwsConfig {
            profile: Some("prod".to_string()),
            region: Some("eu-west-1".to_string()),
        });
        assert!(config.save(&config_path).is_ok());
        assert!(config_path.exists());

        let loaded = Config::load(Some(&config_path)).unwrap();
        assert_eq!(loaded.profile(), Some("prod"));
        assert_eq!(loaded.region(), Some("eu-west-1"));
        assert_eq!(loaded.analysis.lookback_days, config.analysis.lookback_days);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let fake_path = temp_dir.path().join("nonexistent.toml");

        // Should return default config
        let config = Config::load(Some(&fake_path)).unwrap();
        assert_eq!(config.analysis.lookback_days, 14);
    }

    #[test]
    fn test_config_load_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        std::fs::write(&config_path, "[aws]\nregion = \"us-west-2\"\n").unwrap();

        let config = Config::load(Some(&config_path)).unwrap();
        assert_eq!(config.region(), Some("us-west-2"));
        assert_eq!(config.analysis.lookback_days, 14);
        assert_eq!(config.analysis.low_cpu_threshold, 20.0);
        assert!(!config.analysis.offline);
    }

    #[test]
    fn test_config_load_custom_thresholds() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("thresholds.toml");
        std::fs::write(&config_path, "[analysis]\nlow_cpu_threshold = 30.0\n").unwrap();

        let config = Config::load(Some(&config_path)).unwrap();
        assert_eq!(config.analysis.low_cpu_threshold, 30.0);
        assert_eq!(config.analysis.high_cpu_threshold, 80.0);
    }

    #[test]
    fn test_config_rejects_bad_thresholds() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad_thresholds.toml");

        // Low above high
        std::fs::write(
            &config_path,
            "[analysis]\nlow_cpu_threshold = 90.0\nhigh_cpu_threshold = 50.0\n",
        )
        .unwrap();
        let err = Config::load(Some(&config_path)).unwrap_err();
        assert!(matches!(
            err,
            CostctlError::Config(ConfigError::InvalidValue { .. })
        ));

        // High beyond 100%
        std::fs::write(&config_path, "[analysis]\nhigh_cpu_threshold = 150.0\n").unwrap();
        assert!(Config::load(Some(&config_path)).is_err());
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "invalid toml content {").unwrap();

        let result = Config::load(Some(&config_path));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_rejects_out_of_range_lookback() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("lookback.toml");
        std::fs::write(&config_path, "[analysis]\nlookback_days = 0\n").unwrap();

        let err = Config::load(Some(&config_path)).unwrap_err();
        assert!(matches!(
            err,
            CostctlError::Config(ConfigError::InvalidValue { .. })
        ));

        std::fs::write(&config_path, "[analysis]\nlookback_days = 90\n").unwrap();
        assert!(Config::load(Some(&config_path)).is_err());
    }

    #[test]
    fn test_init_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("init_test.toml");

        assert!(init_config(&config_path, false).is_ok());
        assert!(config_path.exists());

        // Verify it's valid TOML
        let config = Config::load(Some(&config_path)).unwrap();
        assert!(config.aws.is_some());
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("existing.toml");
        std::fs::write(&config_path, "# existing\n").unwrap();

        assert!(init_config(&config_path, false).is_err());
        assert!(init_config(&config_path, true).is_ok());
    }
}

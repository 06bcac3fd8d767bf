use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{DEFAULT_DEBOUNCE, SolverConfig};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub projection_path: String,
    pub monte_carlo_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            projection_path: "/api/fire/projection".to_string(),
            monte_carlo_path: "/api/fire/monte-carlo".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn projection_url(&self) -> String {
        join_url(&self.base_url, &self.projection_path)
    }

    pub fn monte_carlo_url(&self) -> String {
        join_url(&self.base_url, &self.monte_carlo_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Quiet period before a burst of edits triggers a recalculation.
    pub debounce_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl SchedulerConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    pub allowed_iterations: Vec<u32>,
    pub default_iterations: u32,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            allowed_iterations: vec![500, 1_000, 2_500, 5_000],
            default_iterations: 1_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub service: ServiceConfig,
    pub scheduler: SchedulerConfig,
    pub solver: SolverConfig,
    pub monte_carlo: MonteCarloConfig,
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "service.base_url must not be empty".to_string(),
            ));
        }
        if self.scheduler.debounce_ms == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.debounce_ms must be > 0".to_string(),
            ));
        }
        let solver = &self.solver;
        if !solver.max_years.is_finite() || solver.max_years <= 0.0 {
            return Err(ConfigError::Invalid(
                "solver.max_years must be > 0".to_string(),
            ));
        }
        if !solver.tolerance_years.is_finite() || solver.tolerance_years <= 0.0 {
            return Err(ConfigError::Invalid(
                "solver.tolerance_years must be > 0".to_string(),
            ));
        }
        if !solver.withdrawal_rate.is_finite()
            || solver.withdrawal_rate <= 0.0
            || solver.withdrawal_rate > 1.0
        {
            return Err(ConfigError::Invalid(
                "solver.withdrawal_rate must be in (0, 1]".to_string(),
            ));
        }
        let monte_carlo = &self.monte_carlo;
        if monte_carlo.allowed_iterations.is_empty()
            || monte_carlo.allowed_iterations.contains(&0)
        {
            return Err(ConfigError::Invalid(
                "monte_carlo.allowed_iterations must list positive counts".to_string(),
            ));
        }
        if !monte_carlo
            .allowed_iterations
            .contains(&monte_carlo.default_iterations)
        {
            return Err(ConfigError::Invalid(
                "monte_carlo.default_iterations must be one of allowed_iterations".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = EngineConfig::from_toml_str("").expect("defaults are valid");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.scheduler.debounce(), Duration::from_millis(300));
        assert_eq!(config.solver.max_years, 100.0);
    }

    #[test]
    fn partial_toml_overrides_selected_fields() {
        let config = EngineConfig::from_toml_str(
            r#"
            [service]
            base_url = "https://projections.example.com/"

            [scheduler]
            debounce_ms = 150

            [solver]
            withdrawal_rate = 0.035
            "#,
        )
        .expect("valid config");

        assert_eq!(config.scheduler.debounce_ms, 150);
        assert_eq!(config.solver.withdrawal_rate, 0.035);
        assert_eq!(config.solver.tolerance_years, 0.1);
        assert_eq!(
            config.service.projection_url(),
            "https://projections.example.com/api/fire/projection"
        );
    }

    #[test]
    fn rejects_zero_debounce() {
        let err = EngineConfig::from_toml_str("[scheduler]\ndebounce_ms = 0\n")
            .expect_err("must reject zero debounce");
        assert!(err.to_string().contains("debounce_ms"));
    }

    #[test]
    fn rejects_default_iterations_outside_menu() {
        let err = EngineConfig::from_toml_str(
            "[monte_carlo]\nallowed_iterations = [500, 5000]\ndefault_iterations = 1000\n",
        )
        .expect_err("must reject default outside menu");
        assert!(err.to_string().contains("default_iterations"));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = EngineConfig::from_toml_str("[scheduler\n").expect_err("must reject syntax");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::load(Path::new("/nonexistent/fire-scenario.toml"))
            .expect_err("must fail");
        assert!(err.to_string().contains("/nonexistent/fire-scenario.toml"));
    }
}

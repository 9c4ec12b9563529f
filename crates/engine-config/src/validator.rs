use crate::{config::ImportConfig, error::ConfigError};
use std::collections::HashSet;
use tracing::{info, warn};

/// Validates an import configuration before anything touches the cluster.
pub struct ConfigValidator<'a> {
    config: &'a ImportConfig,
}

impl<'a> ConfigValidator<'a> {
    pub fn new(config: &'a ImportConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        self.validate_interval(&mut errors);
        self.validate_thresholds(&mut errors);
        self.validate_table(&mut errors);
        self.validate_stores(&mut errors);
        self.config.security.check(&mut errors);

        if !errors.is_empty() {
            return Err(ConfigError::ValidationFailed(errors));
        }

        info!("Configuration validation completed successfully");
        Ok(())
    }

    fn validate_interval(&self, errors: &mut Vec<String>) {
        if self.config.switch_mode_interval_ms == 0 {
            errors.push("switch_mode_interval_ms must be greater than zero".to_string());
        } else if self.config.switch_mode_interval_ms < 1000 {
            warn!(
                "switch_mode_interval_ms = {} is very short, stores will be flooded with switch requests",
                self.config.switch_mode_interval_ms
            );
        }
    }

    fn validate_thresholds(&self, errors: &mut Vec<String>) {
        if !self.config.thresholds().is_consistent() {
            errors.push(format!(
                "min_state_for_normal ({}) must not be stricter than min_state_for_import ({})",
                self.config.min_state_for_normal, self.config.min_state_for_import
            ));
        }
    }

    fn validate_table(&self, errors: &mut Vec<String>) {
        if self.config.table.trim().is_empty() {
            errors.push("table must not be empty".to_string());
        }
    }

    fn validate_stores(&self, errors: &mut Vec<String>) {
        if self.config.stores.is_empty() {
            warn!("No stores configured, mode switches will reach no store");
        }

        let mut seen = HashSet::new();
        for store in &self.config.stores {
            if store.address.trim().is_empty() {
                errors.push("store address must not be empty".to_string());
            } else if !seen.insert(store.address.as_str()) {
                errors.push(format!("duplicate store address '{}'", store.address));
            }
        }
    }
}

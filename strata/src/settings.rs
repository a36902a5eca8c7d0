use crate::logger::{self, LogLevel};
use crate::naming::{PrefixNaming, VIEW_PREFIX};
use crate::{debug, info, StrataError};
use config::{Config, Environment, File};
use dotenv::dotenv;
use serde::Deserialize;
use std::sync::Once;

static DOTENV_ONCE: Once = Once::new();

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StrataSettings {
    pub log_level: LogLevel,
    pub naming: NamingSettings,
    pub reconcile: ReconcileSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamingSettings {
    pub view_prefix: String,
}

impl Default for NamingSettings {
    fn default() -> Self {
        Self { view_prefix: VIEW_PREFIX.to_string() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileSettings {
    pub detect_column_collisions: bool,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self { detect_column_collisions: true }
    }
}

impl StrataSettings {
    pub fn naming_policy(&self) -> PrefixNaming {
        PrefixNaming::new(self.naming.view_prefix.clone())
    }

    pub fn apply_logging(&self) {
        logger::set_level(self.log_level);
    }

    /// The view prefix ends up inside generated identifiers.
    pub fn validate(&self) -> Result<(), StrataError> {
        let prefix = &self.naming.view_prefix;
        if prefix.is_empty() {
            return Err(StrataError::configuration("naming.view_prefix must not be empty"));
        }
        if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StrataError::configuration(format!("naming.view_prefix `{}` must be ASCII alphanumeric or `_`", prefix)));
        }
        Ok(())
    }
}

/// Reads `path` (format taken from its extension) over built-in defaults, then applies
/// `{prefix}__SECTION__KEY` environment overrides and validates the result.
pub fn load_settings(path: &str, prefix: &str) -> Result<StrataSettings, StrataError> {
    DOTENV_ONCE.call_once(|| {
        if dotenv().is_ok() {
            info!("Loaded .env file for strata settings");
        }
    });

    let defaults = StrataSettings::default();
    let settings = Config::builder()
        .set_default("log_level", defaults.log_level.label())?
        .set_default("naming.view_prefix", defaults.naming.view_prefix)?
        .set_default("reconcile.detect_column_collisions", defaults.reconcile.detect_column_collisions)?
        .add_source(File::with_name(path).required(true))
        .add_source(Environment::with_prefix(prefix).prefix_separator("__").separator("__").try_parsing(true))
        .build()?
        .try_deserialize::<StrataSettings>()?;
    settings.validate()?;
    debug!("Settings from {} -> {:?}", path, settings);
    Ok(settings)
}

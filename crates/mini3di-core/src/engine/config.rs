use crate::core::geometry::{DEFAULT_CB_BOND_LENGTH, VirtualCenterParams};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid value for parameter '{name}': {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VirtualCenterConfig {
    pub alpha: f64,
    pub beta: f64,
    pub distance: f64,
}

impl Default for VirtualCenterConfig {
    fn default() -> Self {
        let params = VirtualCenterParams::default();
        Self {
            alpha: params.alpha,
            beta: params.beta,
            distance: params.distance,
        }
    }
}

impl From<VirtualCenterConfig> for VirtualCenterParams {
    fn from(config: VirtualCenterConfig) -> Self {
        Self {
            alpha: config.alpha,
            beta: config.beta,
            distance: config.distance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CbConfig {
    pub bond_length: f64,
}

impl Default for CbConfig {
    fn default() -> Self {
        Self {
            bond_length: DEFAULT_CB_BOND_LENGTH,
        }
    }
}

/// Geometric parameters of the encoder.
///
/// The defaults reproduce the reference 3Di alphabet; any other value yields
/// states that are not comparable with published 3Di sequences.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    pub virtual_center: VirtualCenterConfig,
    pub cb: CbConfig,
}

impl EncoderConfig {
    /// Reads a configuration from a TOML file. Missing fields take their
    /// default value.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.to_string_lossy())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "<string>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Toml {
            path: origin.to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every parameter is a finite number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            ("virtual_center.alpha", self.virtual_center.alpha),
            ("virtual_center.beta", self.virtual_center.beta),
            ("virtual_center.distance", self.virtual_center.distance),
            ("cb.bond_length", self.cb.bond_length),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    pub fn virtual_center_params(&self) -> VirtualCenterParams {
        self.virtual_center.into()
    }
}

#[derive(Default)]
pub struct EncoderConfigBuilder {
    alpha: Option<f64>,
    beta: Option<f64>,
    distance: Option<f64>,
    cb_bond_length: Option<f64>,
}

impl EncoderConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alpha(mut self, degrees: f64) -> Self {
        self.alpha = Some(degrees);
        self
    }
    pub fn beta(mut self, degrees: f64) -> Self {
        self.beta = Some(degrees);
        self
    }
    pub fn distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }
    pub fn cb_bond_length(mut self, length: f64) -> Self {
        self.cb_bond_length = Some(length);
        self
    }

    pub fn build(self) -> Result<EncoderConfig, ConfigError> {
        let defaults = EncoderConfig::default();
        let config = EncoderConfig {
            virtual_center: VirtualCenterConfig {
                alpha: self.alpha.unwrap_or(defaults.virtual_center.alpha),
                beta: self.beta.unwrap_or(defaults.virtual_center.beta),
                distance: self.distance.unwrap_or(defaults.virtual_center.distance),
            },
            cb: CbConfig {
                bond_length: self.cb_bond_length.unwrap_or(defaults.cb.bond_length),
            },
        };
        config.validate()?;
        Ok(config)
    }
}

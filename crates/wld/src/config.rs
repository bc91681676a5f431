//! Combined configuration.

use wld_ascii::ExportConfig;
use wld_core::ConfigError;
use wld_raw::DecodeConfig;

/// Options for [`load`](crate::load) and text export.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WldConfig {
    /// Decode limits.
    pub decode: DecodeConfig,
    /// Text export options.
    pub export: ExportConfig,
}

impl WldConfig {
    /// Validate both halves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.decode.validate()?;
        self.export.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(WldConfig::default().validate().is_ok());
    }

    #[test]
    fn either_half_can_fail() {
        let mut cfg = WldConfig::default();
        cfg.decode.max_pool_len = 0;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ZeroLimit {
                field: "max_pool_len"
            })
        );

        let mut cfg = WldConfig::default();
        cfg.export.root_file_name = String::new();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidFileName { .. })
        ));
    }
}

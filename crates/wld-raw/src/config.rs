//! Decode limits.

use wld_core::ConfigError;

/// Limits applied while decoding, checked before any header-declared size
/// is trusted for an allocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Maximum record count accepted from a header. Default: 1,000,000.
    pub max_record_count: u32,
    /// Maximum payload length of one record, in bytes. Default: 64 MiB.
    pub max_record_len: usize,
    /// Maximum string pool length, in bytes. Default: 64 MiB.
    pub max_pool_len: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_record_count: 1_000_000,
            max_record_len: 64 << 20,
            max_pool_len: 64 << 20,
        }
    }
}

impl DecodeConfig {
    /// Check that every limit admits at least one byte or record.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_record_count == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_record_count",
            });
        }
        if self.max_record_len == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_record_len",
            });
        }
        if self.max_pool_len == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_pool_len",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(DecodeConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_limit_is_rejected() {
        let cfg = DecodeConfig {
            max_record_len: 0,
            ..DecodeConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ZeroLimit {
                field: "max_record_len"
            })
        );
    }
}

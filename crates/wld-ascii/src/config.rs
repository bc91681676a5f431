//! Export options.

use wld_core::ConfigError;

/// Options for one text export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportConfig {
    /// Name of the root index file. Default: `_root.wce`.
    pub root_file_name: String,
    /// Write zone geometry chunks into the root file instead of giving each
    /// its own satellite. Default: `true`.
    pub inline_region_chunks: bool,
    /// Start every file with the format banner. Default: `true`.
    pub write_header: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            root_file_name: "_root.wce".into(),
            inline_region_chunks: true,
            write_header: true,
        }
    }
}

impl ExportConfig {
    /// Check that the root file name is a bare file name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.root_file_name.as_str();
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0'])
        {
            return Err(ConfigError::InvalidFileName {
                field: "root_file_name",
                name: self.root_file_name.clone(),
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
        assert!(ExportConfig::default().validate().is_ok());
    }

    #[test]
    fn path_in_root_name_is_rejected() {
        for name in ["", "..", "out/_root.wce", "a\\b"] {
            let cfg = ExportConfig {
                root_file_name: name.into(),
                ..ExportConfig::default()
            };
            assert_eq!(
                cfg.validate(),
                Err(ConfigError::InvalidFileName {
                    field: "root_file_name",
                    name: name.into(),
                }),
                "{name:?}"
            );
        }
    }
}

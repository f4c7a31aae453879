//! Composer configuration types.

use crate::headers::CURRENT_MMS_VERSION;

/// Default block size for streamed part data.
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

/// Default part name used when a part has no name, file name or location.
pub const DEFAULT_PART_NAME: &str = "smil.xml";

/// PDU composer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComposerConfig {
    /// MMS-Version octet used when the headers leave it unset.
    pub default_version: u8,
    /// Read size when copying externally stored part data.
    pub block_size: usize,
    /// Name parameter for parts that carry no naming information at all.
    pub default_part_name: String,
}

impl ComposerConfig {
    /// Creates the default configuration (MMS 1.2, 1 KiB blocks).
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_version: CURRENT_MMS_VERSION,
            block_size: DEFAULT_BLOCK_SIZE,
            default_part_name: DEFAULT_PART_NAME.to_string(),
        }
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> ComposerConfigBuilder {
        ComposerConfigBuilder::new()
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for composer configuration.
#[derive(Debug, Clone)]
pub struct ComposerConfigBuilder {
    default_version: u8,
    block_size: usize,
    default_part_name: String,
}

impl ComposerConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_version: CURRENT_MMS_VERSION,
            block_size: DEFAULT_BLOCK_SIZE,
            default_part_name: DEFAULT_PART_NAME.to_string(),
        }
    }

    /// Sets the fallback MMS-Version.
    #[must_use]
    pub const fn default_version(mut self, version: u8) -> Self {
        self.default_version = version;
        self
    }

    /// Sets the streaming block size. Zero is raised to one.
    #[must_use]
    pub const fn block_size(mut self, size: usize) -> Self {
        self.block_size = if size == 0 { 1 } else { size };
        self
    }

    /// Sets the fallback part name.
    #[must_use]
    pub fn default_part_name(mut self, name: impl Into<String>) -> Self {
        self.default_part_name = name.into();
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ComposerConfig {
        ComposerConfig {
            default_version: self.default_version,
            block_size: self.block_size,
            default_part_name: self.default_part_name,
        }
    }
}

impl Default for ComposerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::headers::MMS_VERSION_1_0;

    #[test]
    fn test_config_new() {
        let config = ComposerConfig::new();
        assert_eq!(config.default_version, 0x12);
        assert_eq!(config.block_size, 1024);
        assert_eq!(config.default_part_name, "smil.xml");
        assert_eq!(config, ComposerConfig::default());
    }

    #[test]
    fn test_config_builder() {
        let config = ComposerConfig::builder()
            .default_version(MMS_VERSION_1_0)
            .block_size(16)
            .default_part_name("part.bin")
            .build();

        assert_eq!(config.default_version, 0x10);
        assert_eq!(config.block_size, 16);
        assert_eq!(config.default_part_name, "part.bin");
    }

    #[test]
    fn test_config_builder_zero_block_size() {
        let config = ComposerConfig::builder().block_size(0).build();
        assert_eq!(config.block_size, 1);
    }
}

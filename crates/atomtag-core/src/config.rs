use serde::{Deserialize, Serialize};

use crate::error::{Result, TagError};

/// Configuration for [`TaggedObjects`](crate::TaggedObjects).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggedConfig {
    /// Attribute used by [`read`](crate::TaggedObjects::read) and
    /// [`write`](crate::TaggedObjects::write).
    pub default_attribute: String,
    /// Whether an expected tag of `"0"` means "no prior version", like `""`.
    pub zero_is_sentinel: bool,
}

impl Default for TaggedConfig {
    fn default() -> Self {
        Self {
            default_attribute: "tag".to_string(),
            zero_is_sentinel: true,
        }
    }
}

impl TaggedConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| TagError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_attribute.is_empty() {
            return Err(TagError::Config(
                "default_attribute must not be empty".to_string(),
            ));
        }
        if self.default_attribute.contains('\0') {
            return Err(TagError::Config(
                "default_attribute must not contain NUL".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = TaggedConfig::default();
        assert_eq!(c.default_attribute, "tag");
        assert!(c.zero_is_sentinel);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn toml_overrides_and_defaults() {
        let c = TaggedConfig::from_toml_str("default_attribute = \"user.version\"").unwrap();
        assert_eq!(c.default_attribute, "user.version");
        assert!(c.zero_is_sentinel);

        let c = TaggedConfig::from_toml_str("zero_is_sentinel = false").unwrap();
        assert_eq!(c.default_attribute, "tag");
        assert!(!c.zero_is_sentinel);
    }

    #[test]
    fn rejects_empty_attribute() {
        let err = TaggedConfig::from_toml_str("default_attribute = \"\"").unwrap_err();
        assert!(matches!(err, TagError::Config(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(TaggedConfig::from_toml_str("zero_is_sentinel = \"maybe\"").is_err());
    }
}

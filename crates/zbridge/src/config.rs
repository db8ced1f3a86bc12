//! Transformer configuration

use crate::convert::{ConvertOptions, DEFAULT_ROOT_TAG};
use crate::error::{Error, ErrorKind, Result};
use crate::json::Config as JsonConfig;
use crate::xml::{Config as XmlConfig, is_valid_name};

/// Settings shared by every message a transformer handles
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Wrapper tag for JSON -> XML; expected root when unwrapping
    pub root_tag: String,
    /// Emit audit records
    pub audit_enabled: bool,
    /// XML -> JSON returns the root's content instead of `{root: ...}`
    pub unwrap_root: bool,
    pub json: JsonConfig,
    pub xml: XmlConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_tag: DEFAULT_ROOT_TAG.to_string(),
            audit_enabled: true,
            unwrap_root: false,
            json: JsonConfig::default(),
            xml: XmlConfig::default(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn with_root_tag(mut self, root_tag: impl Into<String>) -> Self {
        self.root_tag = root_tag.into();
        self
    }

    #[must_use]
    pub const fn with_audit_enabled(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    #[must_use]
    pub const fn with_unwrap_root(mut self, unwrap_root: bool) -> Self {
        self.unwrap_root = unwrap_root;
        self
    }

    #[must_use]
    pub const fn with_json(mut self, json: JsonConfig) -> Self {
        self.json = json;
        self
    }

    #[must_use]
    pub const fn with_xml(mut self, xml: XmlConfig) -> Self {
        self.xml = xml;
        self
    }

    /// Check settings that can be checked without a message
    pub fn validate(&self) -> Result<()> {
        if is_valid_name(&self.root_tag) {
            Ok(())
        } else {
            Err(Error::bare(ErrorKind::UnsupportedKeyName {
                key: self.root_tag.clone(),
            }))
        }
    }

    /// Engine options for this configuration
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions::default()
            .with_root_tag(self.root_tag.clone())
            .with_unwrap_root(self.unwrap_root)
            .with_json(self.json)
            .with_xml(self.xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.root_tag, "message");
        assert!(config.audit_enabled);
        assert!(!config.unwrap_root);
        assert!(config.json.reject_duplicate_keys);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders_flow_into_options() {
        let config = Config::default()
            .with_root_tag("Order")
            .with_unwrap_root(true)
            .with_audit_enabled(false)
            .with_xml(XmlConfig::new(8, 1024));
        let options = config.convert_options();
        assert_eq!(options.root_tag, "Order");
        assert!(options.unwrap_root);
        assert_eq!(options.xml.max_depth, 8);
        assert!(!config.audit_enabled);
    }

    #[test]
    fn test_validate_rejects_bad_root_tag() {
        let err = Config::default()
            .with_root_tag("1st message")
            .validate()
            .map_err(|e| e.kind().clone());
        assert_eq!(
            err,
            Err(ErrorKind::UnsupportedKeyName {
                key: "1st message".to_string()
            })
        );
    }
}

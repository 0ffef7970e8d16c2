//! Node configuration with TOML file support.

use reissue_crypto::{blake2b_256, keypair_from_seed};
use reissue_flows::IssuerSignaturePolicy;
use reissue_types::KeyPair;
use reissue_utils::LogFormat;
use serde::{Deserialize, Serialize};

use crate::NodeError;

/// Configuration for one node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Well-known name other nodes resolve this node by.
    pub legal_name: String,

    /// Hex-encoded 32-byte seed for the node's identity key. When absent the
    /// key is derived from the legal name, which is only fit for tests.
    #[serde(default)]
    pub key_seed: Option<String>,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Forward back-chains to the issuer when requesting reissuance.
    #[serde(default = "default_true")]
    pub share_history: bool,

    /// Add the issuer's key to the signers of unlock transactions.
    #[serde(default)]
    pub issuer_signs_unlocks: bool,
}

/// Configuration of the network's notary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotaryConfig {
    #[serde(default = "default_notary_name")]
    pub name: String,

    #[serde(default)]
    pub key_seed: Option<String>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_notary_name() -> String {
    "Notary".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    pub fn new(legal_name: impl Into<String>) -> Self {
        Self {
            legal_name: legal_name.into(),
            key_seed: None,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            share_history: default_true(),
            issuer_signs_unlocks: false,
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        if config.legal_name.trim().is_empty() {
            return Err(NodeError::Config("legal_name must not be empty".into()));
        }
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn keypair(&self) -> Result<KeyPair, NodeError> {
        derive_keypair(&self.legal_name, self.key_seed.as_deref())
    }

    pub fn issuer_policy(&self) -> IssuerSignaturePolicy {
        if self.issuer_signs_unlocks {
            IssuerSignaturePolicy::Sign
        } else {
            IssuerSignaturePolicy::Observe
        }
    }
}

impl NotaryConfig {
    pub fn keypair(&self) -> Result<KeyPair, NodeError> {
        derive_keypair(&self.name, self.key_seed.as_deref())
    }
}

impl Default for NotaryConfig {
    fn default() -> Self {
        Self {
            name: default_notary_name(),
            key_seed: None,
        }
    }
}

fn derive_keypair(name: &str, seed: Option<&str>) -> Result<KeyPair, NodeError> {
    let seed = match seed {
        Some(hex_seed) => {
            let bytes = hex::decode(hex_seed)
                .map_err(|e| NodeError::Config(format!("key_seed for {name}: {e}")))?;
            <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
                NodeError::Config(format!("key_seed for {name} must be 32 bytes"))
            })?
        }
        None => blake2b_256(name.as_bytes()),
    };
    Ok(keypair_from_seed(&seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig::new("Alice");
        let toml_str = config.to_toml_string().unwrap();
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.legal_name, "Alice");
        assert_eq!(parsed.log_format, LogFormat::Human);
        assert!(parsed.share_history);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str(r#"legal_name = "Bob""#).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.issuer_policy(), IssuerSignaturePolicy::Observe);
        assert!(config.key_seed.is_none());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            legal_name = "Issuer"
            log_format = "json"
            issuer_signs_unlocks = true
            share_history = false
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.issuer_policy(), IssuerSignaturePolicy::Sign);
        assert!(!config.share_history);
    }

    #[test]
    fn empty_legal_name_is_rejected() {
        assert!(matches!(
            NodeConfig::from_toml_str(r#"legal_name = " ""#),
            Err(NodeError::Config(_))
        ));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NodeConfig::from_toml_file("/nonexistent/reissue.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }

    #[test]
    fn keys_come_from_the_seed_when_given() {
        let mut config = NodeConfig::new("Alice");
        let derived = config.keypair().unwrap();
        config.key_seed = Some(hex::encode([7u8; 32]));
        let seeded = config.keypair().unwrap();
        assert_ne!(derived.public, seeded.public);
        assert_eq!(seeded.public, keypair_from_seed(&[7u8; 32]).public);
    }

    #[test]
    fn short_seed_is_rejected() {
        let mut config = NodeConfig::new("Alice");
        config.key_seed = Some("abcd".into());
        assert!(matches!(config.keypair(), Err(NodeError::Config(_))));
    }

    #[test]
    fn config_file_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");
        std::fs::write(&path, "legal_name = \"Carol\"\nlog_level = \"debug\"\n").unwrap();
        let config = NodeConfig::from_toml_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.legal_name, "Carol");
        assert_eq!(config.log_level, "debug");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_hex_seed_selects_that_key(seed in proptest::array::uniform32(any::<u8>())) {
                let mut config = NodeConfig::new("Alice");
                config.key_seed = Some(hex::encode(seed));
                let parsed = NodeConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
                prop_assert_eq!(parsed.keypair().unwrap().public, keypair_from_seed(&seed).public);
            }
        }
    }
}

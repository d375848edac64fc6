//! Target identification and hashing.
//!
//! A target is the stateful environment steps are applied to: a named
//! network such as `local`, `sepolia`, or a raw RPC endpoint. The hash
//! gives the name a stable, filesystem-safe form for addressing the
//! target's completion record on disk.

use sha2::{Digest, Sha256};

/// Unique identifier for a deployment target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetId {
    /// Target name as declared in the manifest.
    name: String,
    /// SHA256-derived hash of the name.
    hash: String,
}

impl TargetId {
    /// Create a TargetId from a target name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let hash = Self::compute_hash(&name);
        Self { name, hash }
    }

    /// Get the target name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the hash as a string.
    ///
    /// This is a 16-character hex string (8 bytes of SHA256), safe for use
    /// as a file name regardless of what the target name contains.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    fn compute_hash(name: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_id_hash_is_16_hex_chars() {
        let target = TargetId::new("local");
        assert_eq!(target.hash().len(), 16);
        assert!(target.hash().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn target_id_same_name_same_hash() {
        assert_eq!(TargetId::new("sepolia").hash(), TargetId::new("sepolia").hash());
    }

    #[test]
    fn target_id_different_names_different_hash() {
        assert_ne!(TargetId::new("local").hash(), TargetId::new("mainnet").hash());
    }

    #[test]
    fn target_id_hash_safe_for_url_names() {
        let target = TargetId::new("http://127.0.0.1:8545");
        assert!(!target.hash().contains('/'));
        assert!(!target.hash().contains(':'));
    }

    #[test]
    fn target_id_displays_name() {
        let target = TargetId::new("sepolia");
        assert_eq!(format!("{}", target), "sepolia");
    }
}

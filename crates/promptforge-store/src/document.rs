//! Artifact encoding and digests.
//!
//! Artifacts are UTF-8 JSON, pretty-printed with 2-space indentation and
//! non-ASCII characters written as-is. The receipt digest is SHA-256 over
//! exactly the bytes written.

use sha2::{Digest, Sha256};

use promptforge_contracts::{
    artifact::Artifact,
    error::{ForgeError, ForgeResult},
};

/// Encode the artifact's document as it will appear on disk.
pub fn encode(artifact: &Artifact) -> ForgeResult<Vec<u8>> {
    serde_json::to_vec_pretty(&artifact.document()).map_err(|e| ForgeError::Storage {
        reason: format!("failed to encode artifact: {e}"),
    })
}

/// Lowercase 64-character hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use promptforge_contracts::artifact::{Artifact, ArtifactName};

    use super::{encode, sha256_hex};

    fn artifact() -> Artifact {
        Artifact {
            name: ArtifactName::Aggregate {
                prefix: "characters".to_string(),
                started_at: Utc::now(),
            },
            wrapper_key: "students".to_string(),
            records: vec![json!({ "name": "Zoë", "emoji": "🧭" })],
        }
    }

    #[test]
    fn encoding_is_pretty_and_keeps_non_ascii() {
        let text = String::from_utf8(encode(&artifact()).unwrap()).unwrap();

        assert!(text.starts_with("{\n  \"students\": [\n    {\n      \"name\": \"Zoë\""));
        assert!(text.contains("🧭"));
        assert!(!text.contains("\\u"));
    }

    #[test]
    fn digest_is_stable_hex() {
        let bytes = encode(&artifact()).unwrap();
        let digest = sha256_hex(&bytes);

        assert_eq!(digest.len(), 64);
        assert_eq!(digest, sha256_hex(&bytes));
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}

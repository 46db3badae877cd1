//! Loads the signing key from a local file.

use std::path::Path;

use alloy::signers::local::PrivateKeySigner;

use crate::error::FarmError;

/// Reads a hex private key (with or without `0x`) from `path`.
///
/// Any problem here is fatal; the key is read once and never retried.
pub fn load_signer(path: &Path) -> Result<PrivateKeySigner, FarmError> {
    let key_error = |reason: String| FarmError::KeySource {
        path: path.to_path_buf(),
        reason,
    };

    let contents = std::fs::read_to_string(path).map_err(|e| key_error(e.to_string()))?;
    let key = contents.trim();
    if key.is_empty() {
        return Err(key_error("file is empty".into()));
    }

    key.parse::<PrivateKeySigner>()
        .map_err(|e| key_error(format!("not a valid private key ({e})")))
}
